// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Endpoints open to anonymous visitors.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
};
use marquee_api::{
    ListCategoriesResponse, ListMoviesQuery, ListMoviesResponse, ListShowsQuery,
    ListShowsResponse, MovieDetailResponse, QuoteRequest, QuoteResponse, SeatMapResponse,
    ShowInfo, get_movie, get_seat_map, get_show, list_categories, list_movies, list_shows,
    quote_seats,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Handler for GET `/healthz`.
///
/// Touches nothing but the process, so it answers while the database is busy.
pub async fn handle_healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for GET `/api/movies`.
pub async fn handle_list_movies(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Json<ListMoviesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_movies(&mut persistence, &query)?))
}

/// Handler for GET `/api/movies/{movie_id}`.
pub async fn handle_get_movie(
    AxumState(app_state): AxumState<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MovieDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_movie(&mut persistence, movie_id)?))
}

/// Handler for GET `/api/categories`.
pub async fn handle_list_categories(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListCategoriesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_categories(&mut persistence)?))
}

/// Handler for GET `/api/shows`.
pub async fn handle_list_shows(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListShowsQuery>,
) -> Result<Json<ListShowsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_shows(&mut persistence, &query)?))
}

/// Handler for GET `/api/shows/{show_id}`.
pub async fn handle_get_show(
    AxumState(app_state): AxumState<AppState>,
    Path(show_id): Path<i64>,
) -> Result<Json<ShowInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_show(&mut persistence, show_id)?))
}

/// Handler for GET `/api/shows/{show_id}/seats`.
pub async fn handle_get_seat_map(
    AxumState(app_state): AxumState<AppState>,
    Path(show_id): Path<i64>,
) -> Result<Json<SeatMapResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let seat_map: SeatMapResponse =
        get_seat_map(&mut persistence, show_id, app_state.config.demo_occupancy)?;
    Ok(Json(seat_map))
}

/// Handler for POST `/api/shows/{show_id}/quote`.
///
/// Prices a seat selection without holding the seats.
pub async fn handle_quote_seats(
    AxumState(app_state): AxumState<AppState>,
    Path(show_id): Path<i64>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, HttpError> {
    info!(show_id, seats = req.seats.len(), "Handling quote_seats request");

    let mut persistence = app_state.persistence.lock().await;
    let quote: QuoteResponse =
        quote_seats(&mut persistence, show_id, &req, app_state.config.demo_occupancy)?;
    Ok(Json(quote))
}
