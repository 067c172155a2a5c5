// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seat layouts and per-show seat maps.
//!
//! A seat template stores a `SeatLayout` as JSON. When a customer opens a
//! show, the layout is expanded into a `SeatMap` that combines the seats
//! actually sold with a seeded pseudo-random demo occupancy. The demo
//! occupancy is cosmetic; the only seats that are ever held are the ones
//! backed by active tickets.

use crate::error::DomainError;
use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of rows in a layout (one per letter).
pub const MAX_ROWS: usize = 26;
/// Maximum number of seats in a single row.
pub const MAX_SEATS_PER_ROW: u16 = 60;

/// One row of a seat layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpec {
    /// Row label, a single uppercase letter.
    pub label: String,
    /// Number of seat positions in the row, numbered from 1.
    pub seats: u16,
    /// Pricing tier applied to every seat in the row.
    pub tier_code: String,
    /// Seat numbers that physically exist but are never sold.
    #[serde(default)]
    pub blocked: Vec<u16>,
}

/// A theatre screen layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLayout {
    /// Rows from the screen backwards.
    pub rows: Vec<RowSpec>,
    /// Seat numbers after which an aisle is drawn.
    #[serde(default)]
    pub aisles_after: Vec<u16>,
}

impl SeatLayout {
    /// Parses a layout from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the layout is invalid.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let layout: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidSeatLayout(format!("malformed layout: {e}")))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Serializes the layout for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::InvalidSeatLayout(format!("cannot serialize layout: {e}")))
    }

    /// Validates the structure of the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are no rows or more than 26
    /// - A row label is not a single uppercase letter, or is repeated
    /// - A row has no seats or more than 60
    /// - A row has no tier code
    /// - A blocked seat or aisle position is out of range
    /// - Every seat in the layout is blocked
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rows.is_empty() || self.rows.len() > MAX_ROWS {
            return Err(DomainError::InvalidSeatLayout(format!(
                "layout must have between 1 and {MAX_ROWS} rows, got {}",
                self.rows.len()
            )));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut widest: u16 = 0;

        for row in &self.rows {
            let mut chars = row.label.chars();
            let single_letter: bool = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_ascii_uppercase()
            );
            if !single_letter {
                return Err(DomainError::InvalidSeatLayout(format!(
                    "row label '{}' must be a single uppercase letter",
                    row.label
                )));
            }
            if !seen.insert(row.label.as_str()) {
                return Err(DomainError::InvalidSeatLayout(format!(
                    "row label '{}' appears more than once",
                    row.label
                )));
            }
            if row.seats == 0 || row.seats > MAX_SEATS_PER_ROW {
                return Err(DomainError::InvalidSeatLayout(format!(
                    "row {} must have between 1 and {MAX_SEATS_PER_ROW} seats",
                    row.label
                )));
            }
            if row.tier_code.trim().is_empty() {
                return Err(DomainError::InvalidSeatLayout(format!(
                    "row {} has no pricing tier",
                    row.label
                )));
            }
            if let Some(bad) = row.blocked.iter().find(|&&n| n == 0 || n > row.seats) {
                return Err(DomainError::InvalidSeatLayout(format!(
                    "row {} blocks seat {bad}, which does not exist",
                    row.label
                )));
            }
            widest = widest.max(row.seats);
        }

        if let Some(bad) = self
            .aisles_after
            .iter()
            .find(|&&n| n == 0 || n >= widest)
        {
            return Err(DomainError::InvalidSeatLayout(format!(
                "aisle after seat {bad} is outside the layout"
            )));
        }

        if self.seat_count() == 0 {
            return Err(DomainError::InvalidSeatLayout(String::from(
                "layout has no usable seats",
            )));
        }

        Ok(())
    }

    /// Counts the seats that can be sold.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| {
                let blocked: HashSet<u16> = row.blocked.iter().copied().collect();
                (1..=row.seats).filter(|n| !blocked.contains(n)).count()
            })
            .sum()
    }

    /// Returns the distinct tier codes used by the layout.
    #[must_use]
    pub fn tier_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for row in &self.rows {
            if !codes.contains(&row.tier_code) {
                codes.push(row.tier_code.clone());
            }
        }
        codes
    }
}

/// Builds a seat label such as `C7`.
#[must_use]
pub fn seat_label(row: &str, number: u16) -> String {
    format!("{row}{number}")
}

/// Splits a seat label into its row letter and seat number.
///
/// # Errors
///
/// Returns an error if the label is not an uppercase letter followed by a
/// positive number.
pub fn parse_seat_label(label: &str) -> Result<(char, u16), DomainError> {
    let mut chars = label.chars();
    let row: char = chars
        .next()
        .filter(char::is_ascii_uppercase)
        .ok_or_else(|| DomainError::InvalidSeat(label.to_string()))?;
    let number: u16 = chars
        .as_str()
        .parse::<u16>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| DomainError::InvalidSeat(label.to_string()))?;
    Ok((row, number))
}

/// Display state of a seat in a seat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatState {
    /// The seat may be selected.
    Available,
    /// The seat is held by an active ticket.
    Sold,
    /// The seat is blocked in the layout.
    Blocked,
    /// The seat is shown as taken for demonstration purposes.
    Unavailable,
}

/// A single seat in a seat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub label: String,
    pub number: u16,
    pub tier_code: String,
    pub state: SeatState,
}

/// A row of seats in a seat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRow {
    pub label: String,
    pub seats: Vec<Seat>,
}

/// The seat map of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMap {
    pub rows: Vec<SeatRow>,
    pub aisles_after: Vec<u16>,
}

impl SeatMap {
    /// Looks up a seat by label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&Seat> {
        self.rows
            .iter()
            .flat_map(|row| row.seats.iter())
            .find(|seat| seat.label == label)
    }

    /// Returns whether the seat exists and is available.
    #[must_use]
    pub fn is_selectable(&self, label: &str) -> bool {
        self.find(label)
            .is_some_and(|seat| seat.state == SeatState::Available)
    }

    /// Counts seats in the given state.
    #[must_use]
    pub fn count(&self, state: SeatState) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.seats.iter())
            .filter(|seat| seat.state == state)
            .count()
    }

    /// Checks that every label in a selection can be booked.
    ///
    /// # Errors
    ///
    /// Returns an error for the first label that is malformed, missing from
    /// the map, repeated, or not available.
    pub fn check_selection(&self, labels: &[String]) -> Result<(), DomainError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for label in labels {
            parse_seat_label(label)?;
            let seat: &Seat = self
                .find(label)
                .ok_or_else(|| DomainError::InvalidSeat(label.clone()))?;
            if !seen.insert(label.as_str()) {
                return Err(DomainError::DuplicateSeat(label.clone()));
            }
            if seat.state != SeatState::Available {
                return Err(DomainError::SeatNotSelectable(label.clone()));
            }
        }
        Ok(())
    }
}

/// Expands a layout into the seat map of a show.
///
/// Every seat position draws one value from a PRNG seeded with `seed`, in
/// layout order, whether or not the seat ends up using it. The demo pattern
/// of a show therefore stays put as real tickets are sold.
///
/// # Arguments
///
/// * `layout` - The validated seat layout
/// * `seed` - The show ID
/// * `sold_labels` - Labels held by active tickets
/// * `demo_occupancy_percent` - Share of free seats to show as taken (0-100)
#[must_use]
pub fn generate_seat_map(
    layout: &SeatLayout,
    seed: u64,
    sold_labels: &HashSet<String>,
    demo_occupancy_percent: u8,
) -> SeatMap {
    let mut rng: StdRng = StdRng::seed_from_u64(seed);
    let threshold: u32 = u32::from(demo_occupancy_percent.min(100));

    let rows: Vec<SeatRow> = layout
        .rows
        .iter()
        .map(|row| {
            let seats: Vec<Seat> = (1..=row.seats)
                .map(|number| {
                    let roll: u32 = StandardUniform.sample(&mut rng);
                    let label: String = seat_label(&row.label, number);
                    let state: SeatState = if row.blocked.contains(&number) {
                        SeatState::Blocked
                    } else if sold_labels.contains(&label) {
                        SeatState::Sold
                    } else if roll % 100 < threshold {
                        SeatState::Unavailable
                    } else {
                        SeatState::Available
                    };
                    Seat {
                        label,
                        number,
                        tier_code: row.tier_code.clone(),
                        state,
                    }
                })
                .collect();
            SeatRow {
                label: row.label.clone(),
                seats,
            }
        })
        .collect();

    SeatMap {
        rows,
        aisles_after: layout.aisles_after.clone(),
    }
}
