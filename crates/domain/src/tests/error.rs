// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidTitle(String::from("Title cannot be empty"));
    assert_eq!(format!("{err}"), "Invalid title: Title cannot be empty");

    let err: DomainError = DomainError::InvalidDuration { minutes: 0 };
    assert_eq!(
        format!("{err}"),
        "Invalid duration: 0 minutes. Must be between 1 and 600"
    );

    let err: DomainError = DomainError::InvalidScreen {
        screen: 4,
        screen_count: 3,
    };
    assert_eq!(format!("{err}"), "Invalid screen 4: theatre has 3 screen(s)");

    let err: DomainError = DomainError::TooManySeats {
        requested: 12,
        max: 10,
    };
    assert_eq!(
        format!("{err}"),
        "Too many seats selected: 12. A booking may hold at most 10"
    );

    let err: DomainError = DomainError::InvalidStatusTransition {
        kind: "movie",
        from: String::from("Archived"),
        to: String::from("NowShowing"),
    };
    assert_eq!(format!("{err}"), "Cannot move movie from Archived to NowShowing");

    let err: DomainError = DomainError::UnknownPlaceholder(String::from("seat"));
    assert_eq!(format!("{err}"), "Unknown template placeholder: {{seat}}");

    let err: DomainError = DomainError::SeatNotSelectable(String::from("C7"));
    assert_eq!(format!("{err}"), "Seat C7 is not available");
}

#[test]
fn test_domain_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(DomainError::EmptySeatSelection);
    assert_eq!(err.to_string(), "At least one seat must be selected");
}
