// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod catalog_tests;
mod notification_tests;
mod operations_tests;

use crate::{MovieInput, NewBooking, NewTicket, NewUser, Persistence, ShowInput, TheatreInput};
use marquee_audit::{Actor, Cause};

pub const TEST_LAYOUT_JSON: &str = r#"{"rows":[{"label":"A","seats":4,"tier_code":"STANDARD"},{"label":"B","seats":4,"tier_code":"PREMIUM"}]}"#;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_actor() -> Actor {
    Actor::with_user(1, String::from("admin@example.com"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

/// Creates a user with the given roles and returns its ID.
pub fn create_test_user(persistence: &mut Persistence, email: &str, roles: &[&str]) -> i64 {
    persistence
        .create_user(&NewUser {
            email,
            display_name: "Test User",
            phone: None,
            password: "correct-Horse-9",
            roles,
        })
        .expect("create user")
}

pub fn create_test_movie(persistence: &mut Persistence, title: &str) -> i64 {
    persistence
        .create_movie(&MovieInput {
            title,
            synopsis: "A test film.",
            duration_minutes: 120,
            rating: "PG-13",
            language: "English",
            release_date: "2030-01-01",
            poster_url: None,
        })
        .expect("create movie")
}

pub fn create_test_theatre(persistence: &mut Persistence, name: &str) -> i64 {
    persistence
        .create_theatre(&TheatreInput {
            name,
            city: "Springfield",
            address: "1 Main St",
            timezone: "America/New_York",
            screen_count: 4,
            is_active: true,
        })
        .expect("create theatre")
}

pub fn create_test_seat_template(persistence: &mut Persistence, name: &str) -> i64 {
    persistence
        .create_seat_template(name, TEST_LAYOUT_JSON, 8)
        .expect("create seat template")
}

/// Creates a movie, theatre, seat template and one show starting at
/// `start_time` on screen 1. Returns the show ID.
pub fn create_test_show(persistence: &mut Persistence, start_time: &str, end_time: &str) -> i64 {
    let movie_id: i64 = create_test_movie(persistence, "Test Movie");
    let theatre_id: i64 = create_test_theatre(persistence, "Test Theatre");
    let seat_template_id: i64 = create_test_seat_template(persistence, "Test Layout");
    persistence
        .create_show(&ShowInput {
            movie_id,
            theatre_id,
            seat_template_id,
            screen: 1,
            start_time,
            end_time,
            format: "Standard",
            language: "English",
        })
        .expect("create show")
}

pub fn create_test_booking(
    reference: &str,
    user_id: i64,
    show_id: i64,
    seats: &[&str],
) -> NewBooking {
    let tickets: Vec<NewTicket> = seats
        .iter()
        .map(|seat| NewTicket {
            seat_label: (*seat).to_string(),
            tier_code: String::from("STANDARD"),
            price_cents: 1200,
        })
        .collect();
    let count: i64 = i64::try_from(tickets.len()).unwrap();
    NewBooking {
        booking_reference: reference.to_string(),
        user_id,
        show_id,
        subtotal_cents: 1200 * count,
        fees_cents: 150 * count,
        tax_cents: 0,
        total_cents: 1350 * count,
        tickets,
    }
}
