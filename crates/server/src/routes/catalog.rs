// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff endpoints for the movie catalog and the show schedule.

use axum::{
    Json,
    extract::{Path, State as AxumState},
    http::StatusCode,
};
use marquee_api::{
    CancelShowResponse, CategoryInfo, CreateCategoryRequest, MovieInfo, MovieRequest,
    SetMovieStatusRequest, ShowInfo, ShowRequest, cancel_show, complete_show, create_category,
    create_movie, create_show, delete_category, delete_movie, delete_show, set_movie_status,
    update_movie, update_show,
};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::session::{RequestCause, RequireStaff};

/// Handler for POST `/api/admin/movies`.
pub async fn handle_create_movie(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<MovieRequest>,
) -> Result<(StatusCode, Json<MovieInfo>), HttpError> {
    info!(actor_id = actor.user_id, title = %req.title, "Handling create_movie request");

    let mut persistence = app_state.persistence.lock().await;
    let movie: MovieInfo = create_movie(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Handler for PUT `/api/admin/movies/{movie_id}`.
pub async fn handle_update_movie(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(movie_id): Path<i64>,
    Json(req): Json<MovieRequest>,
) -> Result<Json<MovieInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_movie(
        &mut persistence,
        movie_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for PUT `/api/admin/movies/{movie_id}/status`.
pub async fn handle_set_movie_status(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(movie_id): Path<i64>,
    Json(req): Json<SetMovieStatusRequest>,
) -> Result<Json<MovieInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(set_movie_status(
        &mut persistence,
        movie_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for DELETE `/api/admin/movies/{movie_id}`.
pub async fn handle_delete_movie(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(movie_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_movie(&mut persistence, movie_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/api/admin/categories`.
pub async fn handle_create_category(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let category: CategoryInfo = create_category(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for DELETE `/api/admin/categories/{category_id}`.
pub async fn handle_delete_category(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(category_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_category(&mut persistence, category_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Shows
// ============================================================================

/// Handler for POST `/api/admin/shows`.
pub async fn handle_create_show(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<ShowRequest>,
) -> Result<(StatusCode, Json<ShowInfo>), HttpError> {
    info!(
        movie_id = req.movie_id,
        theatre_id = req.theatre_id,
        screen = req.screen,
        start_time = %req.start_time,
        "Handling create_show request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let show: ShowInfo = create_show(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(show)))
}

/// Handler for PUT `/api/admin/shows/{show_id}`.
pub async fn handle_update_show(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(show_id): Path<i64>,
    Json(req): Json<ShowRequest>,
) -> Result<Json<ShowInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_show(
        &mut persistence,
        show_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for POST `/api/admin/shows/{show_id}/cancel`.
///
/// Cancels the show together with its confirmed bookings.
pub async fn handle_cancel_show(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(show_id): Path<i64>,
) -> Result<Json<CancelShowResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(cancel_show(&mut persistence, show_id, &actor, cause)?))
}

/// Handler for POST `/api/admin/shows/{show_id}/complete`.
pub async fn handle_complete_show(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(show_id): Path<i64>,
) -> Result<Json<ShowInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(complete_show(&mut persistence, show_id, &actor, cause)?))
}

/// Handler for DELETE `/api/admin/shows/{show_id}`.
pub async fn handle_delete_show(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(show_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_show(&mut persistence, show_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}
