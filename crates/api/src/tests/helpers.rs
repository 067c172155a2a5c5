// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use marquee_audit::Cause;
use marquee_domain::{
    MovieStatus, ROLE_ADMIN, ROLE_CUSTOMER, ROLE_MANAGER, format_timestamp, show_end_time,
};
use marquee_persistence::{MovieInput, NewUser, Persistence, ShowInput, TheatreInput};
use time::{Duration, OffsetDateTime};

use crate::AuthenticatedActor;

pub const TEST_PASSWORD: &str = "correct-Horse-9";

pub const TEST_LAYOUT_JSON: &str = r#"{"rows":[{"label":"A","seats":4,"tier_code":"STANDARD"},{"label":"B","seats":4,"tier_code":"PREMIUM","blocked":[4]}]}"#;

pub const STANDARD_PRICE: i64 = 1200;
pub const PREMIUM_PRICE: i64 = 1800;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-1"), String::from("API request"))
}

/// Creates an account with the given roles and returns its actor.
pub fn create_actor(persistence: &mut Persistence, email: &str, roles: &[&str]) -> AuthenticatedActor {
    create_actor_with_phone(persistence, email, None, roles)
}

pub fn create_actor_with_phone(
    persistence: &mut Persistence,
    email: &str,
    phone: Option<&str>,
    roles: &[&str],
) -> AuthenticatedActor {
    let user_id: i64 = persistence
        .create_user(&NewUser {
            email,
            display_name: "Test User",
            phone,
            password: TEST_PASSWORD,
            roles,
        })
        .expect("create user");
    let role_names: Vec<String> = roles.iter().map(ToString::to_string).collect();
    AuthenticatedActor::new(user_id, email.to_string(), &role_names)
}

pub fn create_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "admin@example.com", &[ROLE_ADMIN])
}

pub fn create_manager(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "manager@example.com", &[ROLE_MANAGER])
}

pub fn create_customer(persistence: &mut Persistence, email: &str) -> AuthenticatedActor {
    create_actor(persistence, email, &[ROLE_CUSTOMER])
}

/// A timestamp `hours` from now, in stored form.
pub fn hours_from_now(hours: i64) -> String {
    format_timestamp(OffsetDateTime::now_utc() + Duration::hours(hours)).unwrap()
}

/// A bookable show with everything it depends on.
#[derive(Debug, Clone, Copy)]
pub struct ShowFixture {
    pub movie_id: i64,
    pub theatre_id: i64,
    pub seat_template_id: i64,
    pub show_id: i64,
}

/// Seeds two pricing tiers, a theatre with four screens, an eight-seat
/// template (B4 blocked), a movie now showing, and one show on screen 1
/// starting in two days.
pub fn create_show_fixture(persistence: &mut Persistence) -> ShowFixture {
    persistence
        .create_pricing_tier("STANDARD", "Standard", STANDARD_PRICE, None)
        .unwrap();
    persistence
        .create_pricing_tier("PREMIUM", "Premium", PREMIUM_PRICE, Some("Recliners"))
        .unwrap();

    let theatre_id: i64 = persistence
        .create_theatre(&TheatreInput {
            name: "Marquee Downtown",
            city: "Springfield",
            address: "1 Main St",
            timezone: "America/New_York",
            screen_count: 4,
            is_active: true,
        })
        .unwrap();
    let seat_template_id: i64 = persistence
        .create_seat_template("Small Room", TEST_LAYOUT_JSON, 7)
        .unwrap();
    let movie_id: i64 = persistence
        .create_movie(&MovieInput {
            title: "The Long Take",
            synopsis: "One shot, no cuts.",
            duration_minutes: 120,
            rating: "PG-13",
            language: "English",
            release_date: "2026-01-01",
            poster_url: None,
        })
        .unwrap();
    persistence
        .set_movie_status(movie_id, MovieStatus::NowShowing.as_str())
        .unwrap();

    let show_id: i64 = create_show_at(persistence, movie_id, theatre_id, seat_template_id, 48);

    ShowFixture {
        movie_id,
        theatre_id,
        seat_template_id,
        show_id,
    }
}

/// Inserts a show on screen 1 starting `hours` from now, bypassing the
/// scheduling rules.
pub fn create_show_at(
    persistence: &mut Persistence,
    movie_id: i64,
    theatre_id: i64,
    seat_template_id: i64,
    hours: i64,
) -> i64 {
    let start: OffsetDateTime = OffsetDateTime::now_utc() + Duration::hours(hours);
    let start_time: String = format_timestamp(start).unwrap();
    let end_time: String = format_timestamp(show_end_time(start, 120).unwrap()).unwrap();
    persistence
        .create_show(&ShowInput {
            movie_id,
            theatre_id,
            seat_template_id,
            screen: 1,
            start_time: &start_time,
            end_time: &end_time,
            format: "Standard",
            language: "English",
        })
        .unwrap()
}
