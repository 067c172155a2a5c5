// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification template and campaign handlers.
//!
//! Sending a campaign records one delivery per recipient with the text
//! rendered for them. Handing deliveries to an email, SMS or push provider
//! is outside this service.

use std::collections::BTreeMap;

use marquee_audit::{Action, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{
    Audience, CampaignStatus, DomainError, NotificationChannel, ROLE_CUSTOMER, ROLES,
    TEMPLATE_VARIABLES, format_timestamp, parse_timestamp, render_template, template_placeholders,
    validate_template,
};
use marquee_persistence::{
    CampaignData, MovieData, NewCampaign, NewDelivery, NotificationTemplateData, Persistence,
    PersistenceError, UserData,
};
use tracing::info;

use super::{
    conflict, invalid_input, load_movie, non_blank, not_found, record_audit,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    CampaignInfo, CreateCampaignRequest, DeliveryInfo, ListCampaignsQuery, ListCampaignsResponse,
    ListDeliveriesResponse, ListTemplatesResponse, PageQuery, PreviewTemplateRequest,
    PreviewTemplateResponse, SendCampaignResponse, TemplateInfo, TemplateRequest,
};

// ============================================================================
// Templates
// ============================================================================

fn load_template(
    persistence: &mut Persistence,
    template_id: i64,
) -> Result<NotificationTemplateData, ApiError> {
    persistence.get_template(template_id)?.ok_or_else(|| {
        not_found(
            "NotificationTemplate",
            format!("Template {template_id} does not exist"),
        )
    })
}

fn template_info(template: NotificationTemplateData) -> Result<TemplateInfo, ApiError> {
    let mut placeholders: Vec<String> = template_placeholders(&template.subject)?;
    for name in template_placeholders(&template.body)? {
        if !placeholders.contains(&name) {
            placeholders.push(name);
        }
    }

    Ok(TemplateInfo {
        template_id: template.template_id,
        name: template.name,
        channel: template.channel,
        subject: template.subject,
        body: template.body,
        placeholders,
        created_at: template.created_at,
        updated_at: template.updated_at,
    })
}

fn template_snapshot(template: &NotificationTemplateData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "template_id={},name={},channel={}",
        template.template_id, template.name, template.channel
    ))
}

/// Checked template fields. SMS templates never keep a subject.
struct ValidatedTemplate<'a> {
    name: &'a str,
    channel: NotificationChannel,
    subject: &'a str,
    body: &'a str,
}

fn validate_template_request(request: &TemplateRequest) -> Result<ValidatedTemplate<'_>, ApiError> {
    let channel: NotificationChannel = request.channel.trim().parse()?;
    let name: &str = request.name.trim();
    let subject: &str = if channel.uses_subject() {
        request.subject.trim()
    } else {
        ""
    };
    validate_template(name, channel, subject, &request.body)?;

    Ok(ValidatedTemplate {
        name,
        channel,
        subject,
        body: &request.body,
    })
}

fn template_name_taken(name: &str) -> impl FnOnce(PersistenceError) -> ApiError + '_ {
    move |e| match e {
        PersistenceError::UniqueViolation(_) => conflict(
            "NotificationTemplate",
            format!("A template named '{name}' exists"),
        ),
        other => ApiError::from(other),
    }
}

/// Lists notification templates.
///
/// # Errors
///
/// Returns an error if the actor is not staff.
pub fn list_templates(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListTemplatesResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_templates")?;
    let templates: Vec<TemplateInfo> = persistence
        .list_templates()?
        .into_iter()
        .map(template_info)
        .collect::<Result<_, _>>()?;
    Ok(ListTemplatesResponse { templates })
}

/// Creates a notification template.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the template is invalid,
/// or the name is taken.
pub fn create_template(
    persistence: &mut Persistence,
    request: &TemplateRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TemplateInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_template")?;
    let validated: ValidatedTemplate<'_> = validate_template_request(request)?;

    let template_id: i64 = persistence
        .create_template(
            validated.name,
            validated.channel.as_str(),
            validated.subject,
            validated.body,
        )
        .map_err(template_name_taken(validated.name))?;
    let template: NotificationTemplateData = load_template(persistence, template_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CreateTemplate"), None),
        AuditTarget::new("notification_template", template_id),
        StateSnapshot::absent(),
        template_snapshot(&template),
    )?;

    template_info(template)
}

/// Replaces a template. Deliveries already recorded keep their text.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the template is invalid.
pub fn update_template(
    persistence: &mut Persistence,
    template_id: i64,
    request: &TemplateRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TemplateInfo, ApiError> {
    AuthorizationService::require_staff(actor, "update_template")?;
    let before: NotificationTemplateData = load_template(persistence, template_id)?;
    let validated: ValidatedTemplate<'_> = validate_template_request(request)?;

    persistence
        .update_template(
            template_id,
            validated.name,
            validated.channel.as_str(),
            validated.subject,
            validated.body,
        )
        .map_err(template_name_taken(validated.name))?;
    let after: NotificationTemplateData = load_template(persistence, template_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdateTemplate"), None),
        AuditTarget::new("notification_template", template_id),
        template_snapshot(&before),
        template_snapshot(&after),
    )?;

    template_info(after)
}

/// Deletes a template no campaign uses.
///
/// # Errors
///
/// Returns an error if the actor is not staff or a campaign uses it.
pub fn delete_template(
    persistence: &mut Persistence,
    template_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_template")?;
    let template: NotificationTemplateData = load_template(persistence, template_id)?;

    let campaign_count: i64 = persistence.count_campaigns_using_template(template_id)?;
    if campaign_count > 0 {
        return Err(conflict(
            "NotificationTemplate",
            format!(
                "Template '{}' is used by {campaign_count} campaign(s)",
                template.name
            ),
        ));
    }

    persistence.delete_template(template_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("DeleteTemplate"), None),
        AuditTarget::new("notification_template", template_id),
        template_snapshot(&template),
        StateSnapshot::absent(),
    )?;

    Ok(())
}

fn sample_variables() -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("display_name", String::from("Alex Moviegoer")),
        ("email", String::from("alex@example.com")),
        ("movie_title", String::from("The Feature Presentation")),
        ("theatre_name", String::from("Marquee Downtown")),
    ])
}

/// Renders a template with sample values, optionally overridden.
///
/// # Errors
///
/// Returns an error if the actor is not staff or an override names an
/// unknown variable.
pub fn preview_template(
    persistence: &mut Persistence,
    template_id: i64,
    request: &PreviewTemplateRequest,
    actor: &AuthenticatedActor,
) -> Result<PreviewTemplateResponse, ApiError> {
    AuthorizationService::require_staff(actor, "preview_template")?;
    let template: NotificationTemplateData = load_template(persistence, template_id)?;

    let mut vars: BTreeMap<&str, String> = sample_variables();
    for (name, value) in &request.variables {
        let known: &str = TEMPLATE_VARIABLES
            .iter()
            .copied()
            .find(|v| v == name)
            .ok_or_else(|| DomainError::UnknownPlaceholder(name.clone()))?;
        vars.insert(known, value.clone());
    }

    Ok(PreviewTemplateResponse {
        subject: render_template(&template.subject, &vars)?,
        body: render_template(&template.body, &vars)?,
    })
}

// ============================================================================
// Campaigns
// ============================================================================

fn load_campaign(persistence: &mut Persistence, campaign_id: i64) -> Result<CampaignData, ApiError> {
    persistence.get_campaign(campaign_id)?.ok_or_else(|| {
        not_found(
            "Campaign",
            format!("Campaign {campaign_id} does not exist"),
        )
    })
}

fn campaign_info(campaign: CampaignData) -> CampaignInfo {
    CampaignInfo {
        campaign_id: campaign.campaign_id,
        name: campaign.name,
        template_id: campaign.template_id,
        audience: campaign.audience,
        audience_ref: campaign.audience_ref,
        status: campaign.status,
        scheduled_at: campaign.scheduled_at,
        sent_at: campaign.sent_at,
        recipient_count: campaign.recipient_count,
        created_by: campaign.created_by,
        created_at: campaign.created_at,
    }
}

fn campaign_snapshot(campaign: &CampaignData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "campaign_id={},name={},audience={},status={},recipient_count={}",
        campaign.campaign_id,
        campaign.name,
        campaign.audience,
        campaign.status,
        campaign.recipient_count
    ))
}

/// Creates a draft campaign.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the template or movie does
/// not exist, or the audience is malformed.
pub fn create_campaign(
    persistence: &mut Persistence,
    request: &CreateCampaignRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CampaignInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_campaign")?;
    let name: &str = request.name.trim();
    if name.is_empty() {
        return Err(invalid_input(
            "name",
            String::from("Campaign name cannot be empty"),
        ));
    }
    load_template(persistence, request.template_id)?;

    let audience: Audience =
        Audience::from_parts(request.audience.trim(), request.audience_ref.as_deref())?;
    match &audience {
        Audience::AllCustomers => {}
        Audience::Role(role) => {
            if !ROLES.contains(&role.as_str()) {
                return Err(DomainError::InvalidAudience(format!("unknown role: {role}")).into());
            }
        }
        Audience::MovieBookers(movie_id) => {
            load_movie(persistence, *movie_id)?;
        }
    }

    let scheduled_at: Option<String> = non_blank(request.scheduled_at.as_deref())
        .map(|s| parse_timestamp(s).and_then(format_timestamp))
        .transpose()?;
    let audience_ref: Option<String> = audience.reference();

    let campaign_id: i64 = persistence.create_campaign(&NewCampaign {
        name,
        template_id: request.template_id,
        audience: audience.kind(),
        audience_ref: audience_ref.as_deref(),
        scheduled_at: scheduled_at.as_deref(),
        created_by: actor.user_id,
    })?;
    let campaign: CampaignData = load_campaign(persistence, campaign_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CreateCampaign"), None),
        AuditTarget::new("campaign", campaign_id),
        StateSnapshot::absent(),
        campaign_snapshot(&campaign),
    )?;

    Ok(campaign_info(campaign))
}

/// Lists campaigns, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the status is unknown.
pub fn list_campaigns(
    persistence: &mut Persistence,
    query: &ListCampaignsQuery,
    actor: &AuthenticatedActor,
) -> Result<ListCampaignsResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_campaigns")?;
    let status: Option<CampaignStatus> = non_blank(query.status.as_deref())
        .map(str::parse)
        .transpose()?;

    let campaigns: Vec<CampaignInfo> = persistence
        .list_campaigns(status.map(|s| s.as_str()), query.limit)?
        .into_iter()
        .map(campaign_info)
        .collect();
    Ok(ListCampaignsResponse { campaigns })
}

fn ensure_draft(campaign: &CampaignData, target: CampaignStatus) -> Result<(), ApiError> {
    let current: CampaignStatus = campaign.status.parse()?;
    if current.can_transition_to(target) {
        Ok(())
    } else {
        Err(DomainError::InvalidStatusTransition {
            kind: "campaign",
            from: current.to_string(),
            to: target.to_string(),
        }
        .into())
    }
}

/// Resolves the enabled users a campaign reaches, ordered by ID.
fn resolve_audience(
    persistence: &mut Persistence,
    audience: &Audience,
) -> Result<Vec<UserData>, ApiError> {
    let user_ids: Vec<i64> = match audience {
        Audience::AllCustomers => persistence.list_user_ids_with_role(ROLE_CUSTOMER)?,
        Audience::Role(role) => persistence.list_user_ids_with_role(role)?,
        Audience::MovieBookers(movie_id) => {
            persistence.list_user_ids_who_booked_movie(*movie_id)?
        }
    };

    Ok(persistence
        .get_users_by_ids(&user_ids)?
        .into_iter()
        .filter(|u| !u.is_disabled)
        .collect())
}

/// Sends a draft campaign.
///
/// Every recipient's message is rendered before anything is recorded, so a
/// template that cannot be rendered for this audience leaves the campaign
/// a draft. SMS campaigns skip recipients without a phone number.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the campaign is not a
/// draft, or the template uses a variable this audience cannot supply.
pub fn send_campaign(
    persistence: &mut Persistence,
    campaign_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SendCampaignResponse, ApiError> {
    AuthorizationService::require_staff(actor, "send_campaign")?;
    let before: CampaignData = load_campaign(persistence, campaign_id)?;
    ensure_draft(&before, CampaignStatus::Sent)?;

    let template: NotificationTemplateData = load_template(persistence, before.template_id)?;
    let channel: NotificationChannel = template.channel.parse()?;
    let audience: Audience = Audience::from_parts(&before.audience, before.audience_ref.as_deref())?;
    let recipients: Vec<UserData> = resolve_audience(persistence, &audience)?;

    let movie: Option<MovieData> = match &audience {
        Audience::MovieBookers(movie_id) => Some(load_movie(persistence, *movie_id)?),
        _ => None,
    };

    let mut deliveries: Vec<NewDelivery> = Vec::with_capacity(recipients.len());
    let mut skipped_count: usize = 0;
    for user in recipients {
        let recipient: String = match channel {
            NotificationChannel::Email => user.email.clone(),
            NotificationChannel::Sms => {
                if let Some(phone) = user.phone.clone() {
                    phone
                } else {
                    skipped_count += 1;
                    continue;
                }
            }
            NotificationChannel::Push => format!("user:{}", user.user_id),
        };

        let mut vars: BTreeMap<&str, String> = BTreeMap::from([
            ("display_name", user.display_name.clone()),
            ("email", user.email.clone()),
        ]);
        if let Some(movie) = &movie {
            vars.insert("movie_title", movie.title.clone());
            if let Some(theatre_name) =
                persistence.latest_booked_theatre_name(user.user_id, movie.movie_id)?
            {
                vars.insert("theatre_name", theatre_name);
            }
        }

        deliveries.push(NewDelivery {
            user_id: user.user_id,
            recipient,
            subject: render_template(&template.subject, &vars)?,
            body: render_template(&template.body, &vars)?,
        });
    }

    let recipient_count: usize = persistence.record_deliveries(campaign_id, &deliveries)?;
    let after: CampaignData = load_campaign(persistence, campaign_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("SendCampaign"),
            Some(format!(
                "Delivered to {recipient_count} recipient(s), skipped {skipped_count}"
            )),
        ),
        AuditTarget::new("campaign", campaign_id),
        campaign_snapshot(&before),
        campaign_snapshot(&after),
    )?;

    info!(
        campaign_id,
        channel = %channel,
        recipient_count,
        skipped_count,
        "Campaign sent"
    );

    Ok(SendCampaignResponse {
        campaign_id,
        recipient_count,
        skipped_count,
        message: format!("Campaign sent to {recipient_count} recipient(s)"),
    })
}

/// Cancels a draft campaign.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the campaign is not a draft.
pub fn cancel_campaign(
    persistence: &mut Persistence,
    campaign_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CampaignInfo, ApiError> {
    AuthorizationService::require_staff(actor, "cancel_campaign")?;
    let before: CampaignData = load_campaign(persistence, campaign_id)?;
    ensure_draft(&before, CampaignStatus::Cancelled)?;

    persistence.update_campaign_status(
        campaign_id,
        CampaignStatus::Draft.as_str(),
        CampaignStatus::Cancelled.as_str(),
    )?;
    let after: CampaignData = load_campaign(persistence, campaign_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CancelCampaign"), None),
        AuditTarget::new("campaign", campaign_id),
        campaign_snapshot(&before),
        campaign_snapshot(&after),
    )?;

    Ok(campaign_info(after))
}

/// Lists the deliveries recorded for a campaign.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the campaign does not exist.
pub fn list_deliveries(
    persistence: &mut Persistence,
    campaign_id: i64,
    page: &PageQuery,
    actor: &AuthenticatedActor,
) -> Result<ListDeliveriesResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_deliveries")?;
    load_campaign(persistence, campaign_id)?;

    let deliveries: Vec<DeliveryInfo> = persistence
        .list_deliveries(campaign_id, page.limit, page.offset)?
        .into_iter()
        .map(|d| DeliveryInfo {
            delivery_id: d.delivery_id,
            user_id: d.user_id,
            recipient: d.recipient,
            subject: d.subject,
            body: d.body,
            created_at: d.created_at,
        })
        .collect();

    Ok(ListDeliveriesResponse {
        campaign_id,
        deliveries,
    })
}
