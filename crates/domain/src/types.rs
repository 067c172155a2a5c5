// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Release status of a movie in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovieStatus {
    /// Announced but not yet playing. Default for new movies.
    #[default]
    ComingSoon,
    /// Currently playing; shows may be booked.
    NowShowing,
    /// Retired from the catalog. No new shows may be scheduled.
    Archived,
}

impl FromStr for MovieStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ComingSoon" => Ok(Self::ComingSoon),
            "NowShowing" => Ok(Self::NowShowing),
            "Archived" => Ok(Self::Archived),
            _ => Err(DomainError::InvalidStatus {
                kind: "movie",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MovieStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ComingSoon => "ComingSoon",
            Self::NowShowing => "NowShowing",
            Self::Archived => "Archived",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `ComingSoon` → `NowShowing`
    /// - `ComingSoon` → `Archived`
    /// - `NowShowing` → `Archived`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::ComingSoon, Self::NowShowing | Self::Archived)
                | (Self::NowShowing, Self::Archived)
        )
    }

    /// Returns whether new shows may be scheduled for a movie in this status.
    #[must_use]
    pub const fn accepts_new_shows(&self) -> bool {
        !matches!(self, Self::Archived)
    }
}

/// Lifecycle status of a scheduled show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShowStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl FromStr for ShowStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(Self::Scheduled),
            "Cancelled" => Ok(Self::Cancelled),
            "Completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStatus {
                kind: "show",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ShowStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    /// Only scheduled shows may move, and only to a terminal status.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Scheduled, Self::Cancelled | Self::Completed)
        )
    }

    /// Returns whether tickets may be sold for a show in this status.
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

/// Projection format of a show. Premium formats carry a per-seat surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShowFormat {
    #[default]
    Standard,
    ThreeD,
    Imax,
}

impl FromStr for ShowFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" | "2D" => Ok(Self::Standard),
            "ThreeD" | "3D" => Ok(Self::ThreeD),
            "Imax" | "IMAX" => Ok(Self::Imax),
            _ => Err(DomainError::InvalidStatus {
                kind: "show format",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ShowFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ShowFormat {
    /// Converts this format to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::ThreeD => "ThreeD",
            Self::Imax => "Imax",
        }
    }

    /// Per-seat surcharge in cents.
    #[must_use]
    pub const fn surcharge_cents(&self) -> i64 {
        match self {
            Self::Standard => 0,
            Self::ThreeD => 200,
            Self::Imax => 400,
        }
    }
}

/// Status of a booking.
///
/// Checkout confirms a booking directly; there is no pending payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus {
                kind: "booking",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BookingStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Status of an individual ticket. Only active tickets hold a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    Active,
    Cancelled,
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus {
                kind: "ticket",
                value: s.to_string(),
            }),
        }
    }
}

impl TicketStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Delivery channel of a notification template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

impl FromStr for NotificationChannel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Email" => Ok(Self::Email),
            "Sms" => Ok(Self::Sms),
            "Push" => Ok(Self::Push),
            _ => Err(DomainError::InvalidStatus {
                kind: "notification channel",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl NotificationChannel {
    /// Converts this channel to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "Sms",
            Self::Push => "Push",
        }
    }

    /// Returns whether messages on this channel carry a subject line.
    #[must_use]
    pub const fn uses_subject(&self) -> bool {
        matches!(self, Self::Email | Self::Push)
    }
}

/// Status of a notification campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CampaignStatus {
    #[default]
    Draft,
    Sent,
    Cancelled,
}

impl FromStr for CampaignStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Sent" => Ok(Self::Sent),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus {
                kind: "campaign",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl CampaignStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Only drafts may be sent or cancelled.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Draft, Self::Sent | Self::Cancelled))
    }
}

/// Target audience of a notification campaign.
///
/// Stored as two columns: the audience kind and an optional reference
/// (the role name or the movie ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// Every enabled user holding the customer role.
    AllCustomers,
    /// Every enabled user holding the named role.
    Role(String),
    /// Every enabled user with a confirmed booking for the movie.
    MovieBookers(i64),
}

impl Audience {
    /// Returns the stored audience kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AllCustomers => "AllCustomers",
            Self::Role(_) => "Role",
            Self::MovieBookers(_) => "MovieBookers",
        }
    }

    /// Returns the stored audience reference, if any.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        match self {
            Self::AllCustomers => None,
            Self::Role(role) => Some(role.clone()),
            Self::MovieBookers(movie_id) => Some(movie_id.to_string()),
        }
    }

    /// Rebuilds an audience from its stored columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown or the reference is missing
    /// or malformed.
    pub fn from_parts(kind: &str, reference: Option<&str>) -> Result<Self, DomainError> {
        match (kind, reference) {
            ("AllCustomers", _) => Ok(Self::AllCustomers),
            ("Role", Some(role)) if !role.trim().is_empty() => {
                Ok(Self::Role(role.trim().to_lowercase()))
            }
            ("MovieBookers", Some(movie_id)) => movie_id
                .trim()
                .parse::<i64>()
                .map(Self::MovieBookers)
                .map_err(|_| DomainError::InvalidAudience(format!("invalid movie id: {movie_id}"))),
            ("Role" | "MovieBookers", None) => Err(DomainError::InvalidAudience(format!(
                "audience {kind} requires a reference"
            ))),
            _ => Err(DomainError::InvalidAudience(format!(
                "unknown audience: {kind}"
            ))),
        }
    }
}

/// Severity of an operational log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(DomainError::InvalidStatus {
                kind: "log level",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LogLevel {
    /// Converts this level to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// A normalized email address.
///
/// Emails are the login identifier and are compared case-insensitively,
/// so they are normalized to lowercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email {
    value: String,
}

impl Email {
    /// Parses and normalizes an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not of the form `local@domain.tld`.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let normalized: String = value.trim().to_lowercase();
        crate::validation::validate_email(&normalized)?;
        Ok(Self { value: normalized })
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The certificates a movie may carry.
pub const RATINGS: [&str; 6] = ["G", "PG", "PG-13", "R", "NC-17", "NR"];

/// Role names seeded by the initial migration.
pub const ROLE_ADMIN: &str = "admin";
/// Role names seeded by the initial migration.
pub const ROLE_MANAGER: &str = "manager";
/// Role names seeded by the initial migration.
pub const ROLE_CUSTOMER: &str = "customer";

/// All role names known to the system, highest privilege first.
pub const ROLES: [&str; 3] = [ROLE_ADMIN, ROLE_MANAGER, ROLE_CUSTOMER];

/// A URL-safe category identifier derived from a display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug {
    value: String,
}

impl Slug {
    /// Derives a slug from a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name contains no ASCII letters or digits.
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        let value: String = crate::validation::slugify(name);
        if value.is_empty() {
            return Err(DomainError::InvalidCategory(format!(
                "'{name}' does not produce a usable slug"
            )));
        }
        Ok(Self { value })
    }

    /// Returns the slug text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
