// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::pricing::MAX_PRICE_CENTS;
use crate::types::RATINGS;

/// Maximum length of a movie title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;
/// Maximum runtime of a movie, in minutes.
pub const MAX_DURATION_MINUTES: i32 = 600;
/// Maximum number of screens a theatre may declare.
pub const MAX_SCREEN_COUNT: i32 = 50;
/// Maximum length of a display name, in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Validates the fields of a movie.
///
/// # Arguments
///
/// * `title` - The movie title
/// * `duration_minutes` - The runtime in minutes
/// * `rating` - The certificate (e.g., "PG-13")
/// * `language` - The primary spoken language
///
/// # Errors
///
/// Returns an error if:
/// - The title is empty or longer than 200 characters
/// - The runtime is outside 1..=600 minutes
/// - The rating is not a recognized certificate
/// - The language is empty
pub fn validate_movie(
    title: &str,
    duration_minutes: i32,
    rating: &str,
    language: &str,
) -> Result<(), DomainError> {
    let title: &str = title.trim();
    if title.is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Title cannot be empty",
        )));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(DomainError::InvalidTitle(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }

    if !(1..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(DomainError::InvalidDuration {
            minutes: duration_minutes,
        });
    }

    if !RATINGS.contains(&rating) {
        return Err(DomainError::InvalidRating(rating.to_string()));
    }

    if language.trim().is_empty() {
        return Err(DomainError::InvalidLanguage(String::from(
            "Language cannot be empty",
        )));
    }

    Ok(())
}

/// Validates the fields of a theatre.
///
/// # Errors
///
/// Returns an error if the name, city, or address is empty, the timezone
/// is not a known IANA zone, or the screen count is outside 1..=50.
pub fn validate_theatre(
    name: &str,
    city: &str,
    address: &str,
    timezone: &str,
    screen_count: i32,
) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidTheatre(String::from(
            "Name cannot be empty",
        )));
    }
    if city.trim().is_empty() {
        return Err(DomainError::InvalidTheatre(String::from(
            "City cannot be empty",
        )));
    }
    if address.trim().is_empty() {
        return Err(DomainError::InvalidTheatre(String::from(
            "Address cannot be empty",
        )));
    }

    validate_timezone(timezone)?;

    if !(1..=MAX_SCREEN_COUNT).contains(&screen_count) {
        return Err(DomainError::InvalidScreen {
            screen: screen_count,
            screen_count: MAX_SCREEN_COUNT,
        });
    }

    Ok(())
}

/// Validates that a timezone is a known IANA zone name.
///
/// # Errors
///
/// Returns an error if the name cannot be resolved.
pub fn validate_timezone(timezone: &str) -> Result<(), DomainError> {
    timezone
        .parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))
}

/// Validates that a screen number exists in a theatre.
///
/// # Errors
///
/// Returns an error if `screen` is outside `1..=screen_count`.
pub const fn validate_screen(screen: i32, screen_count: i32) -> Result<(), DomainError> {
    if screen < 1 || screen > screen_count {
        return Err(DomainError::InvalidScreen {
            screen,
            screen_count,
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// This is a structural check only: one `@`, a non-empty local part,
/// and a domain containing a dot with non-empty labels.
///
/// # Errors
///
/// Returns an error if the address is malformed.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidEmail(email.to_string());

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a display name.
///
/// # Errors
///
/// Returns an error if the name is empty or longer than 100 characters.
pub fn validate_display_name(display_name: &str) -> Result<(), DomainError> {
    let trimmed: &str = display_name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDisplayName(String::from(
            "Display name cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(DomainError::InvalidDisplayName(format!(
            "Display name cannot exceed {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates a phone number.
///
/// Accepts an optional leading `+` followed by digits, spaces, dashes, and
/// parentheses, with 7 to 15 digits in total.
///
/// # Errors
///
/// Returns an error if the number contains other characters or has the
/// wrong number of digits.
pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    let trimmed: &str = phone.trim();
    let body: &str = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return Err(DomainError::InvalidPhone(phone.to_string()));
    }

    let digits: usize = body.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(DomainError::InvalidPhone(phone.to_string()));
    }

    Ok(())
}

/// Validates a pricing tier.
///
/// # Errors
///
/// Returns an error if the code is not 1-16 characters of `A-Z`, `0-9`,
/// or `_`, the name is empty, or the base price is not positive.
pub fn validate_pricing_tier(
    code: &str,
    name: &str,
    base_price_cents: i64,
) -> Result<(), DomainError> {
    if code.is_empty()
        || code.len() > 16
        || !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(DomainError::InvalidPricingTier(format!(
            "Tier code '{code}' must be 1-16 characters of A-Z, 0-9 or _"
        )));
    }

    if name.trim().is_empty() {
        return Err(DomainError::InvalidPricingTier(String::from(
            "Tier name cannot be empty",
        )));
    }

    validate_price(base_price_cents)
}

/// Validates that a price is positive and at most `MAX_PRICE_CENTS`.
///
/// # Errors
///
/// Returns an error if the price is zero, negative, or above the cap.
pub fn validate_price(price_cents: i64) -> Result<(), DomainError> {
    if price_cents <= 0 {
        return Err(DomainError::InvalidPricingTier(format!(
            "Price must be positive, got {price_cents} cents"
        )));
    }
    if price_cents > MAX_PRICE_CENTS {
        return Err(DomainError::InvalidPricingTier(format!(
            "Price cannot exceed {MAX_PRICE_CENTS} cents, got {price_cents}"
        )));
    }
    Ok(())
}

/// Converts a display name to a lowercase, hyphen-separated slug.
///
/// Runs of characters other than ASCII letters and digits collapse to a
/// single hyphen. Leading and trailing hyphens are removed.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug: String = String::with_capacity(name.len());
    let mut pending_hyphen: bool = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Validates a category name.
///
/// # Errors
///
/// Returns an error if the name is empty, longer than 60 characters, or
/// produces an empty slug.
pub fn validate_category_name(name: &str) -> Result<(), DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 60 {
        return Err(DomainError::InvalidCategory(String::from(
            "Category name must be 1-60 characters",
        )));
    }
    if slugify(trimmed).is_empty() {
        return Err(DomainError::InvalidCategory(format!(
            "'{trimmed}' does not produce a usable slug"
        )));
    }
    Ok(())
}
