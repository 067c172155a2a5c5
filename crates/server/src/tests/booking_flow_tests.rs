// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end booking flow over HTTP.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use marquee_api::{
    BookingDetailResponse, CancelShowResponse, ListBookingsResponse, LoginResponse, MovieInfo,
    PricingTierInfo, QuoteResponse, SeatMapResponse, SeatTemplateInfo, ShowInfo, TheatreInfo,
};
use marquee_domain::format_timestamp;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::tests::helpers::{
    bearer_request, body_json, body_text, bootstrap_and_login, create_test_app,
    register_and_login, send,
};

/// Schedules a four-seat show through the admin endpoints.
async fn schedule_show(app: &Router, admin: &LoginResponse) -> ShowInfo {
    let token: &str = &admin.session_token;

    let tier = send(
        app,
        bearer_request(
            "POST",
            "/api/admin/pricing-tiers",
            token,
            Some(&json!({ "code": "STANDARD", "name": "Standard", "base_price_cents": 1200 })),
        ),
    )
    .await;
    assert_eq!(tier.status(), StatusCode::CREATED);
    let tier: PricingTierInfo = body_json(tier).await;
    assert_eq!(tier.code, "STANDARD");

    let theatre = send(
        app,
        bearer_request(
            "POST",
            "/api/admin/theatres",
            token,
            Some(&json!({
                "name": "Marquee Riverside",
                "city": "Springfield",
                "address": "12 River Rd",
                "timezone": "America/New_York",
                "screen_count": 2,
            })),
        ),
    )
    .await;
    assert_eq!(theatre.status(), StatusCode::CREATED);
    let theatre: TheatreInfo = body_json(theatre).await;

    let template = send(
        app,
        bearer_request(
            "POST",
            "/api/admin/seat-templates",
            token,
            Some(&json!({
                "name": "Screening Room",
                "layout": { "rows": [{ "label": "A", "seats": 4, "tier_code": "STANDARD" }] },
            })),
        ),
    )
    .await;
    assert_eq!(template.status(), StatusCode::CREATED);
    let template: SeatTemplateInfo = body_json(template).await;
    assert_eq!(template.seat_count, 4);

    let movie = send(
        app,
        bearer_request(
            "POST",
            "/api/admin/movies",
            token,
            Some(&json!({
                "title": "Night Train",
                "synopsis": "A sleeper car and a secret.",
                "duration_minutes": 100,
                "rating": "PG-13",
                "language": "English",
                "release_date": "2026-11-20",
            })),
        ),
    )
    .await;
    assert_eq!(movie.status(), StatusCode::CREATED);
    let movie: MovieInfo = body_json(movie).await;

    let start_time: String =
        format_timestamp(OffsetDateTime::now_utc() + Duration::days(2)).unwrap();
    let show = send(
        app,
        bearer_request(
            "POST",
            "/api/admin/shows",
            token,
            Some(&json!({
                "movie_id": movie.movie_id,
                "theatre_id": theatre.theatre_id,
                "seat_template_id": template.seat_template_id,
                "screen": 1,
                "start_time": start_time,
                "language": "English",
            })),
        ),
    )
    .await;
    assert_eq!(show.status(), StatusCode::CREATED);
    body_json(show).await
}

#[tokio::test]
async fn test_customer_books_seats_for_a_scheduled_show() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;
    let show: ShowInfo = schedule_show(&app, &admin).await;
    let fan: LoginResponse = register_and_login(&app, "fan@example.com").await;

    let seat_map = send(
        &app,
        Request::builder()
            .uri(format!("/api/shows/{}/seats", show.show_id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(seat_map.status(), StatusCode::OK);
    let seat_map: SeatMapResponse = body_json(seat_map).await;
    assert_eq!(seat_map.available_count, 4);

    let quote = send(
        &app,
        bearer_request(
            "POST",
            &format!("/api/shows/{}/quote", show.show_id),
            &fan.session_token,
            Some(&json!({ "seats": ["A1", "A2"] })),
        ),
    )
    .await;
    assert_eq!(quote.status(), StatusCode::OK);
    let quote: QuoteResponse = body_json(quote).await;

    let booking = send(
        &app,
        bearer_request(
            "POST",
            "/api/bookings",
            &fan.session_token,
            Some(&json!({ "show_id": show.show_id, "seats": ["A1", "A2"] })),
        ),
    )
    .await;
    assert_eq!(booking.status(), StatusCode::CREATED);
    let booking: BookingDetailResponse = body_json(booking).await;
    assert_eq!(booking.booking.status, "Confirmed");
    assert_eq!(booking.tickets.len(), 2);
    assert_eq!(booking.booking.total_cents, quote.quote.total_cents);

    let mine = send(
        &app,
        bearer_request("GET", "/api/bookings", &fan.session_token, None),
    )
    .await;
    let mine: ListBookingsResponse = body_json(mine).await;
    assert_eq!(mine.bookings.len(), 1);
    assert_eq!(mine.bookings[0].booking_id, booking.booking.booking_id);
}

#[tokio::test]
async fn test_sold_seat_is_a_conflict() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;
    let show: ShowInfo = schedule_show(&app, &admin).await;
    let first: LoginResponse = register_and_login(&app, "first@example.com").await;
    let second: LoginResponse = register_and_login(&app, "second@example.com").await;

    let bought = send(
        &app,
        bearer_request(
            "POST",
            "/api/bookings",
            &first.session_token,
            Some(&json!({ "show_id": show.show_id, "seats": ["A3"] })),
        ),
    )
    .await;
    assert_eq!(bought.status(), StatusCode::CREATED);

    let again = send(
        &app,
        bearer_request(
            "POST",
            "/api/bookings",
            &second.session_token,
            Some(&json!({ "show_id": show.show_id, "seats": ["A3", "A4"] })),
        ),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_other_customers_booking_is_hidden() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;
    let show: ShowInfo = schedule_show(&app, &admin).await;
    let owner: LoginResponse = register_and_login(&app, "owner@example.com").await;
    let stranger: LoginResponse = register_and_login(&app, "stranger@example.com").await;

    let booking = send(
        &app,
        bearer_request(
            "POST",
            "/api/bookings",
            &owner.session_token,
            Some(&json!({ "show_id": show.show_id, "seats": ["A1"] })),
        ),
    )
    .await;
    let booking: BookingDetailResponse = body_json(booking).await;

    let peek = send(
        &app,
        bearer_request(
            "GET",
            &format!("/api/bookings/{}", booking.booking.booking_id),
            &stranger.session_token,
            None,
        ),
    )
    .await;
    assert_eq!(peek.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_staff_export_and_show_cancellation() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;
    let show: ShowInfo = schedule_show(&app, &admin).await;
    let fan: LoginResponse = register_and_login(&app, "fan@example.com").await;

    let booking = send(
        &app,
        bearer_request(
            "POST",
            "/api/bookings",
            &fan.session_token,
            Some(&json!({ "show_id": show.show_id, "seats": ["A1"] })),
        ),
    )
    .await;
    let booking: BookingDetailResponse = body_json(booking).await;

    let export = send(
        &app,
        bearer_request("GET", "/api/admin/bookings/export", &admin.session_token, None),
    )
    .await;
    assert_eq!(export.status(), StatusCode::OK);
    let content_type: String = export
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let csv: String = body_text(export).await;
    assert!(csv.starts_with("booking_reference,"));
    assert!(csv.contains(&booking.booking.booking_reference));

    let cancelled = send(
        &app,
        bearer_request(
            "POST",
            &format!("/api/admin/shows/{}/cancel", show.show_id),
            &admin.session_token,
            None,
        ),
    )
    .await;
    assert_eq!(cancelled.status(), StatusCode::OK);
    let cancelled: CancelShowResponse = body_json(cancelled).await;
    assert_eq!(cancelled.cancelled_bookings, 1);

    let detail = send(
        &app,
        bearer_request(
            "GET",
            &format!("/api/bookings/{}", booking.booking.booking_id),
            &fan.session_token,
            None,
        ),
    )
    .await;
    let detail: BookingDetailResponse = body_json(detail).await;
    assert_eq!(detail.booking.status, "Cancelled");
}
