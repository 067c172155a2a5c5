// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer checkout and booking endpoints.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
};
use marquee_api::{
    BookingDetailResponse, CheckoutRequest, ListBookingsResponse, PageQuery, cancel_my_booking,
    checkout, get_booking, list_my_bookings,
};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::session::SessionUser;

/// Handler for POST `/api/bookings`.
///
/// Confirms a booking for the selected seats in one transaction.
pub async fn handle_checkout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<BookingDetailResponse>), HttpError> {
    info!(
        user_id = actor.user_id,
        show_id = req.show_id,
        seats = req.seats.len(),
        "Handling checkout request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let detail: BookingDetailResponse = checkout(
        &mut persistence,
        &req,
        &actor,
        app_state.config.demo_occupancy,
    )?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Handler for GET `/api/bookings`.
pub async fn handle_list_my_bookings(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_my_bookings(&mut persistence, &page, &actor)?))
}

/// Handler for GET `/api/bookings/{booking_id}`.
pub async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_booking(&mut persistence, booking_id, &actor)?))
}

/// Handler for POST `/api/bookings/{booking_id}/cancel`.
pub async fn handle_cancel_my_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(cancel_my_booking(&mut persistence, booking_id, &actor)?))
}
