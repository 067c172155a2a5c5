// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BookingStatus, DomainError, can_cancel_booking, generate_booking_reference,
    is_booking_reference, parse_timestamp,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_booking_reference_shape() {
    let mut rng: StdRng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let reference: String = generate_booking_reference(&mut rng);
        assert_eq!(reference.len(), 9);
        assert!(reference.starts_with("MQ-"));
        assert!(is_booking_reference(&reference), "{reference}");
        assert!(!reference[3..].contains(['0', 'O', '1', 'I', 'L']));
    }
}

#[test]
fn test_booking_reference_is_reproducible_from_seed() {
    let first: String = generate_booking_reference(&mut StdRng::seed_from_u64(99));
    let second: String = generate_booking_reference(&mut StdRng::seed_from_u64(99));
    assert_eq!(first, second);
}

#[test]
fn test_is_booking_reference_rejects_other_strings() {
    assert!(!is_booking_reference("MQ-ABC"));
    assert!(!is_booking_reference("XX-ABCDEF"));
    assert!(!is_booking_reference("MQ-abcdef"));
    assert!(!is_booking_reference("MQ-ABCDE0"));
}

#[test]
fn test_confirmed_booking_can_be_cancelled_before_show() {
    let now = parse_timestamp("2026-03-01T12:00:00Z").unwrap();
    let start = parse_timestamp("2026-03-01T19:00:00Z").unwrap();
    assert!(can_cancel_booking(BookingStatus::Confirmed, start, now).is_ok());
}

#[test]
fn test_booking_cannot_be_cancelled_after_start() {
    let start = parse_timestamp("2026-03-01T19:00:00Z").unwrap();
    assert!(matches!(
        can_cancel_booking(BookingStatus::Confirmed, start, start),
        Err(DomainError::BookingNotCancellable(_))
    ));
}

#[test]
fn test_cancelled_booking_cannot_be_cancelled_again() {
    let now = parse_timestamp("2026-03-01T12:00:00Z").unwrap();
    let start = parse_timestamp("2026-03-01T19:00:00Z").unwrap();
    assert!(matches!(
        can_cancel_booking(BookingStatus::Cancelled, start, now),
        Err(DomainError::BookingNotCancellable(_))
    ));
}
