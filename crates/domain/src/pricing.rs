// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::ShowFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Convenience fee charged per seat, in cents.
pub const CONVENIENCE_FEE_CENTS: i64 = 150;
/// Sales tax in basis points (8%).
pub const TAX_RATE_BASIS_POINTS: i64 = 800;
/// Maximum number of seats in one booking.
pub const MAX_SEATS_PER_BOOKING: usize = 10;
/// Highest tier or override price accepted, in cents.
pub const MAX_PRICE_CENTS: i64 = 10_000_000;

/// Effective seat prices for one theatre.
///
/// Built from the global tier base prices, with the theatre's own price
/// overrides applied on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceBook {
    prices: BTreeMap<String, i64>,
}

impl PriceBook {
    /// Builds a price book.
    ///
    /// # Arguments
    ///
    /// * `tiers` - `(code, base_price_cents)` for every pricing tier
    /// * `overrides` - `(code, price_cents)` set for the theatre
    #[must_use]
    pub fn new<'a>(
        tiers: impl IntoIterator<Item = (&'a str, i64)>,
        overrides: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Self {
        let mut prices: BTreeMap<String, i64> = tiers
            .into_iter()
            .map(|(code, price)| (code.to_string(), price))
            .collect();
        for (code, price) in overrides {
            prices.insert(code.to_string(), price);
        }
        Self { prices }
    }

    /// Returns the effective price of a tier.
    #[must_use]
    pub fn price(&self, tier_code: &str) -> Option<i64> {
        self.prices.get(tier_code).copied()
    }

    /// Iterates over `(code, price_cents)` in code order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, i64)> {
        self.prices.iter().map(|(code, price)| (code.as_str(), *price))
    }
}

/// One priced seat in a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub seat_label: String,
    pub tier_code: String,
    /// Tier price plus the format surcharge.
    pub price_cents: i64,
}

/// The full price of a seat selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub lines: Vec<QuoteLine>,
    pub subtotal_cents: i64,
    pub fees_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Prices a seat selection.
///
/// # Arguments
///
/// * `price_book` - Effective tier prices for the theatre
/// * `seats` - `(seat_label, tier_code)` for each selected seat
/// * `format` - Projection format of the show
///
/// # Errors
///
/// Returns an error if:
/// - No seats are selected
/// - More than 10 seats are selected
/// - A seat's tier has no price
pub fn quote(
    price_book: &PriceBook,
    seats: &[(String, String)],
    format: ShowFormat,
) -> Result<PriceQuote, DomainError> {
    if seats.is_empty() {
        return Err(DomainError::EmptySeatSelection);
    }
    if seats.len() > MAX_SEATS_PER_BOOKING {
        return Err(DomainError::TooManySeats {
            requested: seats.len(),
            max: MAX_SEATS_PER_BOOKING,
        });
    }

    let surcharge: i64 = format.surcharge_cents();
    let lines: Vec<QuoteLine> = seats
        .iter()
        .map(|(label, tier)| {
            let base: i64 = price_book
                .price(tier)
                .ok_or_else(|| DomainError::UnknownPricingTier(tier.clone()))?;
            Ok(QuoteLine {
                seat_label: label.clone(),
                tier_code: tier.clone(),
                price_cents: base.checked_add(surcharge).ok_or_else(price_out_of_range)?,
            })
        })
        .collect::<Result<_, DomainError>>()?;

    let subtotal_cents: i64 = lines
        .iter()
        .try_fold(0_i64, |sum, line| sum.checked_add(line.price_cents))
        .ok_or_else(price_out_of_range)?;
    // seats.len() is at most MAX_SEATS_PER_BOOKING
    let seat_count: i64 = i64::try_from(lines.len()).unwrap_or(i64::MAX);
    let fees_cents: i64 = CONVENIENCE_FEE_CENTS
        .checked_mul(seat_count)
        .ok_or_else(price_out_of_range)?;
    let taxable_cents: i64 = subtotal_cents
        .checked_add(fees_cents)
        .ok_or_else(price_out_of_range)?;
    let tax_cents: i64 = tax_on(taxable_cents).ok_or_else(price_out_of_range)?;
    let total_cents: i64 = taxable_cents
        .checked_add(tax_cents)
        .ok_or_else(price_out_of_range)?;

    Ok(PriceQuote {
        lines,
        subtotal_cents,
        fees_cents,
        tax_cents,
        total_cents,
    })
}

/// Computes tax on an amount, rounding half-up to the cent.
///
/// Returns `None` if the amount is too large to tax.
#[must_use]
pub fn tax_on(amount_cents: i64) -> Option<i64> {
    amount_cents
        .checked_mul(TAX_RATE_BASIS_POINTS)?
        .checked_add(5_000)
        .map(|scaled| scaled / 10_000)
}

fn price_out_of_range() -> DomainError {
    DomainError::InvalidPricingTier(String::from("Price total is out of range"))
}
