// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for scheduling, seat maps and quotes.

use marquee_domain::{CONVENIENCE_FEE_CENTS, MovieStatus, SeatState, tax_on};

use crate::tests::helpers::{
    STANDARD_PRICE, PREMIUM_PRICE, ShowFixture, create_customer, create_manager,
    create_show_at, create_show_fixture, create_test_cause, create_test_persistence,
    hours_from_now,
};
use crate::{
    ApiError, CheckoutRequest, ListShowsQuery, QuoteRequest, ShowRequest, cancel_show, checkout,
    complete_show, create_show, delete_show, get_seat_map, get_show, list_shows, quote_seats,
    update_show,
};

fn show_request(fixture: &ShowFixture, screen: i32, hours: i64) -> ShowRequest {
    ShowRequest {
        movie_id: fixture.movie_id,
        theatre_id: fixture.theatre_id,
        seat_template_id: fixture.seat_template_id,
        screen,
        start_time: hours_from_now(hours),
        format: String::from("Standard"),
        language: String::from("English"),
    }
}

fn seats(labels: &[&str]) -> Vec<String> {
    labels.iter().map(ToString::to_string).collect()
}

#[test]
fn test_create_show_computes_end_time_and_local_time() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let show = create_show(
        &mut persistence,
        &show_request(&fixture, 2, 24),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(show.status, "Scheduled");
    assert_eq!(show.movie_title, "The Long Take");
    assert!(show.end_time > show.start_time);
    assert_ne!(show.local_start_time, show.start_time);
}

#[test]
fn test_create_show_rejects_overlap_on_same_screen() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let result = create_show(
        &mut persistence,
        &show_request(&fixture, 1, 49),
        &manager,
        create_test_cause(),
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "no_screen_overlap"),
        other => panic!("Expected overlap violation, got {other:?}"),
    }
}

#[test]
fn test_create_show_allows_other_screen_at_same_time() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let result = create_show(
        &mut persistence,
        &show_request(&fixture, 2, 48),
        &manager,
        create_test_cause(),
    );

    assert!(result.is_ok());
}

#[test]
fn test_create_show_rejects_past_start() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let result = create_show(
        &mut persistence,
        &show_request(&fixture, 3, -2),
        &manager,
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "start_time"),
        other => panic!("Expected InvalidInput for start_time, got {other:?}"),
    }
}

#[test]
fn test_create_show_rejects_start_at_calendar_end() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);
    let mut request: ShowRequest = show_request(&fixture, 2, 24);
    request.start_time = String::from("9999-12-31T23:00:00Z");

    let result = create_show(&mut persistence, &request, &manager, create_test_cause());

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "timestamp"),
        other => panic!("Expected InvalidInput for timestamp, got {other:?}"),
    }
}

#[test]
fn test_create_show_rejects_missing_screen() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let result = create_show(
        &mut persistence,
        &show_request(&fixture, 5, 24),
        &manager,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_create_show_rejects_archived_movie() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);
    persistence
        .set_movie_status(fixture.movie_id, MovieStatus::Archived.as_str())
        .unwrap();

    let result = create_show(
        &mut persistence,
        &show_request(&fixture, 2, 24),
        &manager,
        create_test_cause(),
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "movie_accepts_shows"),
        other => panic!("Expected movie_accepts_shows violation, got {other:?}"),
    }
}

#[test]
fn test_customer_cannot_schedule_shows() {
    let mut persistence = create_test_persistence();
    let customer = create_customer(&mut persistence, "fan@example.com");
    let fixture = create_show_fixture(&mut persistence);

    let result = create_show(
        &mut persistence,
        &show_request(&fixture, 2, 24),
        &customer,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_update_show_can_move_own_slot() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let updated = update_show(
        &mut persistence,
        fixture.show_id,
        &show_request(&fixture, 1, 49),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(updated.show_id, fixture.show_id);
    assert_eq!(updated.screen, 1);
}

#[test]
fn test_seat_map_reports_blocked_seats_and_prices() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);

    let response = get_seat_map(&mut persistence, fixture.show_id, 0).unwrap();

    assert_eq!(response.available_count, 7);
    assert_eq!(
        response.seat_map.find("B4").map(|s| s.state),
        Some(SeatState::Blocked)
    );
    let prices: Vec<(String, i64)> = response
        .prices
        .iter()
        .map(|p| (p.tier_code.clone(), p.price_cents))
        .collect();
    assert_eq!(
        prices,
        vec![
            (String::from("PREMIUM"), PREMIUM_PRICE),
            (String::from("STANDARD"), STANDARD_PRICE),
        ]
    );
}

#[test]
fn test_theatre_override_changes_quote() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);
    let standard = persistence
        .list_pricing_tiers()
        .unwrap()
        .into_iter()
        .find(|t| t.code == "STANDARD")
        .unwrap();
    persistence
        .set_theatre_price(fixture.theatre_id, standard.tier_id, 1000)
        .unwrap();

    let response = quote_seats(
        &mut persistence,
        fixture.show_id,
        &QuoteRequest {
            seats: seats(&["A1"]),
        },
        0,
    )
    .unwrap();

    assert_eq!(response.quote.subtotal_cents, 1000);
}

#[test]
fn test_quote_totals_include_fees_and_tax() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);

    let response = quote_seats(
        &mut persistence,
        fixture.show_id,
        &QuoteRequest {
            seats: seats(&["a1", "B2"]),
        },
        0,
    )
    .unwrap();

    let subtotal: i64 = STANDARD_PRICE + PREMIUM_PRICE;
    let fees: i64 = CONVENIENCE_FEE_CENTS * 2;
    assert_eq!(response.quote.lines[0].seat_label, "A1");
    assert_eq!(response.quote.subtotal_cents, subtotal);
    assert_eq!(response.quote.fees_cents, fees);
    assert_eq!(response.quote.tax_cents, tax_on(subtotal + fees).unwrap());
    assert_eq!(
        response.quote.total_cents,
        subtotal + fees + tax_on(subtotal + fees).unwrap()
    );
}

#[test]
fn test_quote_rejects_blocked_and_unknown_seats() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);

    let blocked = quote_seats(
        &mut persistence,
        fixture.show_id,
        &QuoteRequest {
            seats: seats(&["B4"]),
        },
        0,
    );
    assert!(matches!(blocked, Err(ApiError::Conflict { .. })));

    let unknown = quote_seats(
        &mut persistence,
        fixture.show_id,
        &QuoteRequest {
            seats: seats(&["Z9"]),
        },
        0,
    );
    assert!(matches!(unknown, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_quote_refused_once_show_started() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);
    let started: i64 = create_show_at(
        &mut persistence,
        fixture.movie_id,
        fixture.theatre_id,
        fixture.seat_template_id,
        -1,
    );

    let result = quote_seats(
        &mut persistence,
        started,
        &QuoteRequest {
            seats: seats(&["A1"]),
        },
        0,
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "show_on_sale"),
        other => panic!("Expected show_on_sale violation, got {other:?}"),
    }
}

#[test]
fn test_cancel_show_cancels_bookings_and_hides_show() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let customer = create_customer(&mut persistence, "fan@example.com");
    let fixture = create_show_fixture(&mut persistence);
    checkout(
        &mut persistence,
        &CheckoutRequest {
            show_id: fixture.show_id,
            seats: seats(&["A1", "A2"]),
        },
        &customer,
        0,
    )
    .unwrap();

    let response = cancel_show(
        &mut persistence,
        fixture.show_id,
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(response.cancelled_bookings, 1);

    let listed = list_shows(&mut persistence, &ListShowsQuery::default()).unwrap();
    assert!(listed.shows.is_empty());
    assert_eq!(get_show(&mut persistence, fixture.show_id).unwrap().status, "Cancelled");
    assert!(persistence.list_sold_seats(fixture.show_id).unwrap().is_empty());

    let again = cancel_show(
        &mut persistence,
        fixture.show_id,
        &manager,
        create_test_cause(),
    );
    assert!(matches!(again, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_complete_show_requires_start() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let early = complete_show(
        &mut persistence,
        fixture.show_id,
        &manager,
        create_test_cause(),
    );
    assert!(matches!(early, Err(ApiError::DomainRuleViolation { .. })));

    let started: i64 = create_show_at(
        &mut persistence,
        fixture.movie_id,
        fixture.theatre_id,
        fixture.seat_template_id,
        -3,
    );
    let completed = complete_show(&mut persistence, started, &manager, create_test_cause()).unwrap();
    assert_eq!(completed.status, "Completed");
}

#[test]
fn test_delete_show_refused_after_sales() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let customer = create_customer(&mut persistence, "fan@example.com");
    let fixture = create_show_fixture(&mut persistence);
    checkout(
        &mut persistence,
        &CheckoutRequest {
            show_id: fixture.show_id,
            seats: seats(&["A1"]),
        },
        &customer,
        0,
    )
    .unwrap();

    let result = delete_show(
        &mut persistence,
        fixture.show_id,
        &manager,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_list_shows_filters_by_theatre() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);

    let matching = list_shows(
        &mut persistence,
        &ListShowsQuery {
            theatre_id: Some(fixture.theatre_id),
            ..ListShowsQuery::default()
        },
    )
    .unwrap();
    assert_eq!(matching.shows.len(), 1);

    let other = list_shows(
        &mut persistence,
        &ListShowsQuery {
            theatre_id: Some(fixture.theatre_id + 100),
            ..ListShowsQuery::default()
        },
    )
    .unwrap();
    assert!(other.shows.is_empty());
}
