// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Back-office endpoints for accounts, bookings and the operational record.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use marquee_api::{
    BookingDetailResponse, CreateUserRequest, ListAuditEventsQuery, ListAuditEventsResponse,
    ListBookingsQuery, ListBookingsResponse, ListLogsQuery, ListLogsResponse, ListUsersQuery,
    ListUsersResponse, MessageResponse, PurgeLogsRequest, PurgeLogsResponse,
    ResetPasswordRequest, UpdateUserRolesRequest, UserInfo, cancel_booking, create_user,
    delete_user, disable_user, enable_user, export_bookings_csv, get_user, list_audit_events,
    list_bookings, list_logs, list_users, purge_logs, reset_password, update_user_roles,
};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::session::{RequestCause, RequireAdmin, RequireStaff};

// ============================================================================
// Users
// ============================================================================

/// Handler for GET `/api/admin/users`.
pub async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_users(&mut persistence, &query, &actor)?))
}

/// Handler for POST `/api/admin/users`.
pub async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), HttpError> {
    info!(admin_id = actor.user_id, roles = ?req.roles, "Handling create_user request");

    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo = create_user(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for GET `/api/admin/users/{user_id}`.
pub async fn handle_get_user(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_user(&mut persistence, user_id, &actor)?))
}

/// Handler for DELETE `/api/admin/users/{user_id}`.
pub async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_user(&mut persistence, user_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for PUT `/api/admin/users/{user_id}/roles`.
pub async fn handle_update_user_roles(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRolesRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_user_roles(
        &mut persistence,
        user_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for POST `/api/admin/users/{user_id}/disable`.
pub async fn handle_disable_user(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(disable_user(&mut persistence, user_id, &actor, cause)?))
}

/// Handler for POST `/api/admin/users/{user_id}/enable`.
pub async fn handle_enable_user(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(enable_user(&mut persistence, user_id, &actor, cause)?))
}

/// Handler for POST `/api/admin/users/{user_id}/password`.
pub async fn handle_reset_password(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Path(user_id): Path<i64>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(reset_password(
        &mut persistence,
        user_id,
        &req,
        &actor,
        cause,
    )?))
}

// ============================================================================
// Bookings
// ============================================================================

/// Handler for GET `/api/admin/bookings`.
pub async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_bookings(&mut persistence, &query, &actor)?))
}

/// Handler for GET `/api/admin/bookings/export`.
///
/// Same filters as the list, returned as a CSV attachment.
pub async fn handle_export_bookings(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let csv: String = export_bookings_csv(&mut persistence, &query, &actor)?;
    drop(persistence);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Handler for POST `/api/admin/bookings/{booking_id}/cancel`.
pub async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(cancel_booking(
        &mut persistence,
        booking_id,
        &actor,
        cause,
    )?))
}

// ============================================================================
// Logs and audit
// ============================================================================

/// Handler for GET `/api/admin/logs`.
pub async fn handle_list_logs(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<ListLogsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_logs(&mut persistence, &query, &actor)?))
}

/// Handler for POST `/api/admin/logs/purge`.
pub async fn handle_purge_logs(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    RequestCause(cause): RequestCause,
    Json(req): Json<PurgeLogsRequest>,
) -> Result<Json<PurgeLogsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(purge_logs(&mut persistence, &req, &actor, cause)?))
}

/// Handler for GET `/api/admin/audit`.
pub async fn handle_list_audit_events(
    AxumState(app_state): AxumState<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(query): Query<ListAuditEventsQuery>,
) -> Result<Json<ListAuditEventsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_audit_events(&mut persistence, &query, &actor)?))
}
