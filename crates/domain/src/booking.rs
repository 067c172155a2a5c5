// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::BookingStatus;
use rand::distr::{Distribution, StandardUniform};
use time::OffsetDateTime;

/// Prefix of every booking reference.
pub const REFERENCE_PREFIX: &str = "MQ-";
/// Number of random characters after the prefix.
pub const REFERENCE_LENGTH: usize = 6;

// No 0/O, 1/I/L.
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generates a booking reference such as `MQ-7KD3QX`.
///
/// Uniqueness is enforced by the database; callers retry on collision.
pub fn generate_booking_reference<R: rand::Rng + ?Sized>(rng: &mut R) -> String {
    let mut reference: String = String::with_capacity(REFERENCE_PREFIX.len() + REFERENCE_LENGTH);
    reference.push_str(REFERENCE_PREFIX);
    for _ in 0..REFERENCE_LENGTH {
        let roll: u32 = StandardUniform.sample(rng);
        let index: usize = roll as usize % REFERENCE_ALPHABET.len();
        reference.push(char::from(REFERENCE_ALPHABET[index]));
    }
    reference
}

/// Returns whether a string has the shape of a booking reference.
#[must_use]
pub fn is_booking_reference(value: &str) -> bool {
    value.strip_prefix(REFERENCE_PREFIX).is_some_and(|rest| {
        rest.len() == REFERENCE_LENGTH && rest.bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
    })
}

/// Checks whether a booking can be cancelled.
///
/// Only confirmed bookings whose show has not yet started may be cancelled.
///
/// # Errors
///
/// Returns `DomainError::BookingNotCancellable` explaining why not.
pub fn can_cancel_booking(
    status: BookingStatus,
    show_start: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if status != BookingStatus::Confirmed {
        return Err(DomainError::BookingNotCancellable(format!(
            "booking is {status}"
        )));
    }
    if now >= show_start {
        return Err(DomainError::BookingNotCancellable(String::from(
            "the show has already started",
        )));
    }
    Ok(())
}
