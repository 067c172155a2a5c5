// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Movie title is empty or too long.
    InvalidTitle(String),
    /// Movie runtime is outside the accepted range.
    InvalidDuration {
        /// The rejected runtime in minutes.
        minutes: i32,
    },
    /// Movie rating is not one of the recognized certificates.
    InvalidRating(String),
    /// Language is missing or malformed.
    InvalidLanguage(String),
    /// Email address is malformed.
    InvalidEmail(String),
    /// Display name is empty or too long.
    InvalidDisplayName(String),
    /// Phone number is malformed.
    InvalidPhone(String),
    /// Theatre name, city, or address is invalid.
    InvalidTheatre(String),
    /// Timezone is not a recognized IANA zone name.
    InvalidTimezone(String),
    /// Screen count or screen number is out of range.
    InvalidScreen {
        /// The rejected screen value.
        screen: i32,
        /// The number of screens available.
        screen_count: i32,
    },
    /// Pricing tier code, name, or price is invalid.
    InvalidPricingTier(String),
    /// A seat references a pricing tier that does not exist.
    UnknownPricingTier(String),
    /// Seat layout failed validation.
    InvalidSeatLayout(String),
    /// Seat label is malformed or does not exist in the layout.
    InvalidSeat(String),
    /// Seat cannot be selected in its current state.
    SeatNotSelectable(String),
    /// The same seat was selected more than once.
    DuplicateSeat(String),
    /// No seats were selected.
    EmptySeatSelection,
    /// More seats were selected than a single booking allows.
    TooManySeats {
        /// The number of seats requested.
        requested: usize,
        /// The maximum allowed.
        max: usize,
    },
    /// A status string could not be parsed.
    InvalidStatus {
        /// The kind of status (e.g., "movie", "show").
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A status transition is not permitted.
    InvalidStatusTransition {
        /// The kind of status (e.g., "movie", "show").
        kind: &'static str,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Two shows would occupy the same screen at the same time.
    ShowOverlap {
        /// The existing show that conflicts.
        conflicting_show_id: i64,
    },
    /// A timestamp could not be parsed.
    InvalidTimestamp {
        /// The rejected timestamp string.
        value: String,
        /// The parser error message.
        error: String,
    },
    /// The booking can no longer be cancelled.
    BookingNotCancellable(String),
    /// A notification template references an unknown placeholder.
    UnknownPlaceholder(String),
    /// A notification template has an unterminated placeholder.
    MalformedTemplate(String),
    /// Notification template name, subject, or body is invalid.
    InvalidTemplate(String),
    /// Campaign audience is malformed.
    InvalidAudience(String),
    /// Category name is invalid.
    InvalidCategory(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::InvalidDuration { minutes } => {
                write!(
                    f,
                    "Invalid duration: {minutes} minutes. Must be between 1 and 600"
                )
            }
            Self::InvalidRating(rating) => write!(f, "Invalid rating: {rating}"),
            Self::InvalidLanguage(msg) => write!(f, "Invalid language: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidDisplayName(msg) => write!(f, "Invalid display name: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone number: {msg}"),
            Self::InvalidTheatre(msg) => write!(f, "Invalid theatre: {msg}"),
            Self::InvalidTimezone(tz) => write!(f, "Unknown timezone: {tz}"),
            Self::InvalidScreen {
                screen,
                screen_count,
            } => {
                write!(
                    f,
                    "Invalid screen {screen}: theatre has {screen_count} screen(s)"
                )
            }
            Self::InvalidPricingTier(msg) => write!(f, "Invalid pricing tier: {msg}"),
            Self::UnknownPricingTier(code) => write!(f, "Unknown pricing tier: {code}"),
            Self::InvalidSeatLayout(msg) => write!(f, "Invalid seat layout: {msg}"),
            Self::InvalidSeat(label) => write!(f, "Invalid seat: {label}"),
            Self::SeatNotSelectable(label) => write!(f, "Seat {label} is not available"),
            Self::DuplicateSeat(label) => write!(f, "Seat {label} was selected more than once"),
            Self::EmptySeatSelection => write!(f, "At least one seat must be selected"),
            Self::TooManySeats { requested, max } => {
                write!(
                    f,
                    "Too many seats selected: {requested}. A booking may hold at most {max}"
                )
            }
            Self::InvalidStatus { kind, value } => {
                write!(f, "Invalid {kind} status: {value}")
            }
            Self::InvalidStatusTransition { kind, from, to } => {
                write!(f, "Cannot move {kind} from {from} to {to}")
            }
            Self::ShowOverlap {
                conflicting_show_id,
            } => {
                write!(
                    f,
                    "Show overlaps with show {conflicting_show_id} on the same screen"
                )
            }
            Self::InvalidTimestamp { value, error } => {
                write!(f, "Failed to parse timestamp '{value}': {error}")
            }
            Self::BookingNotCancellable(msg) => write!(f, "Booking cannot be cancelled: {msg}"),
            Self::UnknownPlaceholder(name) => {
                write!(f, "Unknown template placeholder: {{{{{name}}}}}")
            }
            Self::MalformedTemplate(msg) => write!(f, "Malformed template: {msg}"),
            Self::InvalidTemplate(msg) => write!(f, "Invalid template: {msg}"),
            Self::InvalidAudience(msg) => write!(f, "Invalid audience: {msg}"),
            Self::InvalidCategory(msg) => write!(f, "Invalid category: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
