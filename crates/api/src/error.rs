// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use marquee_domain::DomainError;
use marquee_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. The server maps each variant to one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with existing data: a duplicate name, a row
    /// that is still referenced, or a seat that was just sold.
    Conflict {
        /// The type of resource in conflict.
        resource_type: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} conflict: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn rule_violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidTitle(_) => invalid_input("title", message),
        DomainError::InvalidDuration { .. } => invalid_input("duration_minutes", message),
        DomainError::InvalidRating(_) => invalid_input("rating", message),
        DomainError::InvalidLanguage(_) => invalid_input("language", message),
        DomainError::InvalidEmail(_) => invalid_input("email", message),
        DomainError::InvalidDisplayName(_) => invalid_input("display_name", message),
        DomainError::InvalidPhone(_) => invalid_input("phone", message),
        DomainError::InvalidTheatre(_) => invalid_input("theatre", message),
        DomainError::InvalidTimezone(_) => invalid_input("timezone", message),
        DomainError::InvalidScreen { .. } => invalid_input("screen", message),
        DomainError::InvalidPricingTier(_) => invalid_input("pricing_tier", message),
        DomainError::InvalidSeatLayout(_) => invalid_input("layout", message),
        DomainError::InvalidSeat(_)
        | DomainError::DuplicateSeat(_)
        | DomainError::EmptySeatSelection => invalid_input("seats", message),
        DomainError::InvalidStatus { kind, .. } => invalid_input(kind, message),
        DomainError::InvalidTimestamp { .. } => invalid_input("timestamp", message),
        DomainError::UnknownPlaceholder(_)
        | DomainError::MalformedTemplate(_)
        | DomainError::InvalidTemplate(_) => invalid_input("template", message),
        DomainError::InvalidAudience(_) => invalid_input("audience", message),
        DomainError::InvalidCategory(_) => invalid_input("category", message),
        DomainError::UnknownPricingTier(_) => rule_violation("known_pricing_tier", message),
        DomainError::TooManySeats { .. } => rule_violation("max_seats_per_booking", message),
        DomainError::InvalidStatusTransition { .. } => rule_violation("status_transition", message),
        DomainError::ShowOverlap { .. } => rule_violation("no_screen_overlap", message),
        DomainError::BookingNotCancellable(_) => rule_violation("booking_cancellable", message),
        DomainError::SeatNotSelectable(label) => ApiError::Conflict {
            resource_type: String::from("Seat"),
            message: format!("Seat {label} is not available"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Constraint violations become conflicts; anything else the database
/// reports is internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::UniqueViolation(message) => ApiError::Conflict {
            resource_type: String::from("Record"),
            message: format!("Already exists: {message}"),
        },
        PersistenceError::ForeignKeyViolation(message) => ApiError::Conflict {
            resource_type: String::from("Record"),
            message: format!("Still referenced or references a missing record: {message}"),
        },
        PersistenceError::SeatUnavailable(labels) => ApiError::Conflict {
            resource_type: String::from("Seat"),
            message: format!("Seat {labels} is no longer available"),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
