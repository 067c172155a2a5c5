// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff endpoints for notification templates and campaigns.

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
};
use marquee_api::{
    CampaignInfo, CreateCampaignRequest, ListCampaignsQuery, ListCampaignsResponse,
    ListDeliveriesResponse, ListTemplatesResponse, PageQuery, PreviewTemplateRequest,
    PreviewTemplateResponse, SendCampaignResponse, TemplateInfo, TemplateRequest,
    cancel_campaign, create_campaign, create_template, delete_template, list_campaigns,
    list_deliveries, list_templates, preview_template, send_campaign, update_template,
};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::session::{RequestCause, RequireStaff};

/// Handler for GET `/api/admin/notification-templates`.
pub async fn handle_list_templates(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
) -> Result<Json<ListTemplatesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_templates(&mut persistence, &actor)?))
}

/// Handler for POST `/api/admin/notification-templates`.
pub async fn handle_create_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<TemplateRequest>,
) -> Result<(StatusCode, Json<TemplateInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let template: TemplateInfo = create_template(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Handler for PUT `/api/admin/notification-templates/{template_id}`.
pub async fn handle_update_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(template_id): Path<i64>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<TemplateInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_template(
        &mut persistence,
        template_id,
        &req,
        &actor,
        cause,
    )?))
}

/// Handler for DELETE `/api/admin/notification-templates/{template_id}`.
pub async fn handle_delete_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(template_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    delete_template(&mut persistence, template_id, &actor, cause)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/api/admin/notification-templates/{template_id}/preview`.
pub async fn handle_preview_template(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Path(template_id): Path<i64>,
    Json(req): Json<PreviewTemplateRequest>,
) -> Result<Json<PreviewTemplateResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(preview_template(
        &mut persistence,
        template_id,
        &req,
        &actor,
    )?))
}

/// Handler for GET `/api/admin/campaigns`.
pub async fn handle_list_campaigns(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<ListCampaignsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_campaigns(&mut persistence, &query, &actor)?))
}

/// Handler for POST `/api/admin/campaigns`.
pub async fn handle_create_campaign(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let campaign: CampaignInfo = create_campaign(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// Handler for POST `/api/admin/campaigns/{campaign_id}/send`.
pub async fn handle_send_campaign(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(campaign_id): Path<i64>,
) -> Result<Json<SendCampaignResponse>, HttpError> {
    info!(campaign_id, actor_id = actor.user_id, "Handling send_campaign request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(send_campaign(
        &mut persistence,
        campaign_id,
        &actor,
        cause,
    )?))
}

/// Handler for POST `/api/admin/campaigns/{campaign_id}/cancel`.
pub async fn handle_cancel_campaign(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    RequestCause(cause): RequestCause,
    Path(campaign_id): Path<i64>,
) -> Result<Json<CampaignInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(cancel_campaign(
        &mut persistence,
        campaign_id,
        &actor,
        cause,
    )?))
}

/// Handler for GET `/api/admin/campaigns/{campaign_id}/deliveries`.
pub async fn handle_list_deliveries(
    AxumState(app_state): AxumState<AppState>,
    RequireStaff(actor): RequireStaff,
    Path(campaign_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListDeliveriesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_deliveries(
        &mut persistence,
        campaign_id,
        &page,
        &actor,
    )?))
}
