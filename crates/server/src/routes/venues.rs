// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff endpoints for theatres, pricing tiers and seat templates.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
};
use marquee_api::{
    CreatePricingTierRequest, ListPricingTiersResponse, ListSeatTemplatesResponse,
    ListTheatrePricingResponse, ListTheatresResponse, PricingTierInfo, SeatTemplateInfo,
    SeatTemplatePreviewResponse, SeatTemplateRequest, SetTheatrePriceRequest, TheatreInfo,
    TheatreRequest, UpdatePricingTierRequest, create_pricing_tier, create_seat_template,
    create_theatre, delete_pricing_tier, delete_seat_template, delete_theatre,
    list_pricing_tiers, list_seat_templates, list_theatre_pricing, list_theatres,
    preview_seat_template, remove_theatre_price, set_theatre_price, update_pricing_tier,
    update_seat_template, update_theatre,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::HttpError;
use crate::session::{RequestCause, RequireStaff};

/// Query parameters for listing theatres.
#[derive(Debug, Default, Deserialize)]
pub struct ListTheatresQuery {
    /// Include theatres that are closed to new shows.
    #[serde(default)]
    pub include_inactive: bool,
}

// ============================================================================
// Theatres
// ============================================================================

/// Handler for GET `/api/admin/theatres`.
pub async fn handle_list_theatres(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Query(query): Query<ListTheatresQuery>,
) -> Result<Json<ListTheatresResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_theatres(
        &mut persistence,
        query.include_inactive,
        &actor,
    )?))
}

/// Handler for POST `/api/admin/theatres`.
pub async fn handle_create_theatre(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<TheatreRequest>,
) -> Result<(StatusCode, Json<TheatreInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let theatre: TheatreInfo = create_theatre(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(theatre)))
}

/// Handler for PUT `/api/admin/theatres/{theatre_id}`.
pub async fn handle_update_theatre(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(theatre_id): Path<i64>,
    Json(req): Json<TheatreRequest>,
) -> Result<Json<TheatreInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_theatre(
        &mut persistence,
        theatre_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for DELETE `/api/admin/theatres/{theatre_id}`.
pub async fn handle_delete_theatre(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(theatre_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_theatre(&mut persistence, theatre_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/api/admin/theatres/{theatre_id}/pricing`.
pub async fn handle_list_theatre_pricing(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Path(theatre_id): Path<i64>,
) -> Result<Json<ListTheatrePricingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_theatre_pricing(
        &mut persistence,
        theatre_id,
        &actor,
    )?))
}

/// Handler for PUT `/api/admin/theatres/{theatre_id}/pricing`.
pub async fn handle_set_theatre_price(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(theatre_id): Path<i64>,
    Json(req): Json<SetTheatrePriceRequest>,
) -> Result<Json<ListTheatrePricingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(set_theatre_price(
        &mut persistence,
        theatre_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for DELETE `/api/admin/theatres/{theatre_id}/pricing/{tier_id}`.
pub async fn handle_remove_theatre_price(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path((theatre_id, tier_id)): Path<(i64, i64)>,
) -> Result<Json<ListTheatrePricingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(remove_theatre_price(
        &mut persistence,
        theatre_id,
        tier_id,
        &actor,
        cause,
    )?))
}

// ============================================================================
// Pricing tiers
// ============================================================================

/// Handler for GET `/api/admin/pricing-tiers`.
pub async fn handle_list_pricing_tiers(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
) -> Result<Json<ListPricingTiersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_pricing_tiers(&mut persistence, &actor)?))
}

/// Handler for POST `/api/admin/pricing-tiers`.
pub async fn handle_create_pricing_tier(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<CreatePricingTierRequest>,
) -> Result<(StatusCode, Json<PricingTierInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let tier: PricingTierInfo = create_pricing_tier(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(tier)))
}

/// Handler for PUT `/api/admin/pricing-tiers/{tier_id}`.
pub async fn handle_update_pricing_tier(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(tier_id): Path<i64>,
    Json(req): Json<UpdatePricingTierRequest>,
) -> Result<Json<PricingTierInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_pricing_tier(
        &mut persistence,
        tier_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for DELETE `/api/admin/pricing-tiers/{tier_id}`.
pub async fn handle_delete_pricing_tier(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(tier_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_pricing_tier(&mut persistence, tier_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Seat templates
// ============================================================================

/// Handler for GET `/api/admin/seat-templates`.
pub async fn handle_list_seat_templates(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
) -> Result<Json<ListSeatTemplatesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_seat_templates(&mut persistence, &actor)?))
}

/// Handler for POST `/api/admin/seat-templates`.
pub async fn handle_create_seat_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<SeatTemplateRequest>,
) -> Result<(StatusCode, Json<SeatTemplateInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let template: SeatTemplateInfo = create_seat_template(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Handler for PUT `/api/admin/seat-templates/{seat_template_id}`.
pub async fn handle_update_seat_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(seat_template_id): Path<i64>,
    Json(req): Json<SeatTemplateRequest>,
) -> Result<Json<SeatTemplateInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_seat_template(
        &mut persistence,
        seat_template_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for DELETE `/api/admin/seat-templates/{seat_template_id}`.
pub async fn handle_delete_seat_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(seat_template_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_seat_template(&mut persistence, seat_template_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/api/admin/seat-templates/{seat_template_id}/preview`.
pub async fn handle_preview_seat_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Path(seat_template_id): Path<i64>,
) -> Result<Json<SeatTemplatePreviewResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(preview_seat_template(
        &mut persistence,
        seat_template_id,
        &actor,
    )?))
}
