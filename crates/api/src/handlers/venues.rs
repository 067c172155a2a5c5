// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Theatre, pricing tier and seat template handlers.

use std::collections::{HashMap, HashSet};

use marquee_audit::{Action, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{
    DomainError, SeatLayout, SeatMap, ShowStatus, generate_seat_map, validate_price,
    validate_pricing_tier, validate_theatre,
};
use marquee_persistence::{
    Persistence, PersistenceError, PricingTierData, SeatTemplateData, ShowData, ShowFilter,
    TheatreData, TheatreInput, TheatrePriceData,
};
use num_traits::cast::ToPrimitive;
use tracing::info;

use super::{
    conflict, invalid_input, load_seat_template, load_theatre, non_blank, not_found,
    record_audit, theatre_snapshot,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    CreatePricingTierRequest, ListPricingTiersResponse, ListSeatTemplatesResponse,
    ListTheatrePricingResponse, ListTheatresResponse, PricingTierInfo, SeatTemplateInfo,
    SeatTemplatePreviewResponse, SeatTemplateRequest, SetTheatrePriceRequest, TheatreInfo,
    TheatrePriceInfo, TheatreRequest, UpdatePricingTierRequest,
};

// ============================================================================
// Theatres
// ============================================================================

fn theatre_info(theatre: TheatreData) -> TheatreInfo {
    TheatreInfo {
        theatre_id: theatre.theatre_id,
        name: theatre.name,
        city: theatre.city,
        address: theatre.address,
        timezone: theatre.timezone,
        screen_count: theatre.screen_count,
        is_active: theatre.is_active,
        created_at: theatre.created_at,
    }
}

fn theatre_input(request: &TheatreRequest) -> Result<TheatreInput<'_>, ApiError> {
    let input: TheatreInput<'_> = TheatreInput {
        name: request.name.trim(),
        city: request.city.trim(),
        address: request.address.trim(),
        timezone: request.timezone.trim(),
        screen_count: request.screen_count,
        is_active: request.is_active,
    };
    validate_theatre(
        input.name,
        input.city,
        input.address,
        input.timezone,
        input.screen_count,
    )?;
    Ok(input)
}

fn theatre_name_taken(name: &str) -> impl FnOnce(PersistenceError) -> ApiError + '_ {
    move |e| match e {
        PersistenceError::UniqueViolation(_) => {
            conflict("Theatre", format!("A theatre named '{name}' exists"))
        }
        other => ApiError::from(other),
    }
}

/// Lists theatres.
///
/// # Errors
///
/// Returns an error if the actor is not staff.
pub fn list_theatres(
    persistence: &mut Persistence,
    include_inactive: bool,
    actor: &AuthenticatedActor,
) -> Result<ListTheatresResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_theatres")?;
    let theatres: Vec<TheatreInfo> = persistence
        .list_theatres(include_inactive)?
        .into_iter()
        .map(theatre_info)
        .collect();
    Ok(ListTheatresResponse { theatres })
}

/// Adds a theatre.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a field is invalid, or
/// the name is taken.
pub fn create_theatre(
    persistence: &mut Persistence,
    request: &TheatreRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TheatreInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_theatre")?;
    let input: TheatreInput<'_> = theatre_input(request)?;

    let theatre_id: i64 = persistence
        .create_theatre(&input)
        .map_err(theatre_name_taken(input.name))?;
    let theatre: TheatreData = load_theatre(persistence, theatre_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("CreateTheatre"),
            Some(format!("Added {} in {}", theatre.name, theatre.city)),
        ),
        AuditTarget::new("theatre", theatre_id),
        StateSnapshot::absent(),
        theatre_snapshot(&theatre),
    )?;

    info!(theatre_id, name = %theatre.name, "Theatre created");
    Ok(theatre_info(theatre))
}

/// Replaces a theatre's details.
///
/// Screens that still have scheduled shows cannot be removed.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a field is invalid, or
/// a scheduled show uses a screen beyond the new count.
pub fn update_theatre(
    persistence: &mut Persistence,
    theatre_id: i64,
    request: &TheatreRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TheatreInfo, ApiError> {
    AuthorizationService::require_staff(actor, "update_theatre")?;
    let before: TheatreData = load_theatre(persistence, theatre_id)?;
    let input: TheatreInput<'_> = theatre_input(request)?;

    if input.screen_count < before.screen_count {
        let scheduled: Vec<ShowData> = persistence.list_shows(&ShowFilter {
            theatre_id: Some(theatre_id),
            status: Some(ShowStatus::Scheduled.as_str().to_string()),
            limit: Some(marquee_persistence::MAX_PAGE_SIZE),
            ..ShowFilter::default()
        })?;
        if let Some(show) = scheduled.iter().find(|s| s.screen > input.screen_count) {
            return Err(conflict(
                "Theatre",
                format!(
                    "Show {} is scheduled on screen {}; cannot reduce to {} screen(s)",
                    show.show_id, show.screen, input.screen_count
                ),
            ));
        }
    }

    persistence
        .update_theatre(theatre_id, &input)
        .map_err(theatre_name_taken(input.name))?;
    let after: TheatreData = load_theatre(persistence, theatre_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdateTheatre"), None),
        AuditTarget::new("theatre", theatre_id),
        theatre_snapshot(&before),
        theatre_snapshot(&after),
    )?;

    Ok(theatre_info(after))
}

/// Deletes a theatre that has never hosted a show.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or shows reference it.
pub fn delete_theatre(
    persistence: &mut Persistence,
    theatre_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_theatre")?;
    let theatre: TheatreData = load_theatre(persistence, theatre_id)?;

    let show_count: i64 = persistence.count_shows_at_theatre(theatre_id)?;
    if show_count > 0 {
        return Err(conflict(
            "Theatre",
            format!(
                "{} has {show_count} show(s); deactivate it instead",
                theatre.name
            ),
        ));
    }

    persistence.delete_theatre(theatre_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("DeleteTheatre"), None),
        AuditTarget::new("theatre", theatre_id),
        theatre_snapshot(&theatre),
        StateSnapshot::absent(),
    )?;

    Ok(())
}

// ============================================================================
// Theatre pricing
// ============================================================================

/// Lists every tier's price at a theatre, with any override.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the theatre does not exist.
pub fn list_theatre_pricing(
    persistence: &mut Persistence,
    theatre_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ListTheatrePricingResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_theatre_pricing")?;
    load_theatre(persistence, theatre_id)?;

    let overrides: HashMap<i64, i64> = persistence
        .list_theatre_pricing(theatre_id)?
        .into_iter()
        .map(|p: TheatrePriceData| (p.tier_id, p.price_cents))
        .collect();

    let prices: Vec<TheatrePriceInfo> = persistence
        .list_pricing_tiers()?
        .into_iter()
        .map(|tier| {
            let override_price_cents: Option<i64> = overrides.get(&tier.tier_id).copied();
            TheatrePriceInfo {
                tier_id: tier.tier_id,
                tier_code: tier.code,
                tier_name: tier.name,
                base_price_cents: tier.base_price_cents,
                override_price_cents,
                effective_price_cents: override_price_cents.unwrap_or(tier.base_price_cents),
            }
        })
        .collect();

    Ok(ListTheatrePricingResponse { theatre_id, prices })
}

fn load_pricing_tier(persistence: &mut Persistence, tier_id: i64) -> Result<PricingTierData, ApiError> {
    persistence
        .get_pricing_tier(tier_id)?
        .ok_or_else(|| not_found("PricingTier", format!("Pricing tier {tier_id} does not exist")))
}

/// Overrides a tier's price at one theatre.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the theatre or tier does
/// not exist, or the price is not positive.
pub fn set_theatre_price(
    persistence: &mut Persistence,
    theatre_id: i64,
    request: &SetTheatrePriceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ListTheatrePricingResponse, ApiError> {
    AuthorizationService::require_staff(actor, "set_theatre_price")?;
    let theatre: TheatreData = load_theatre(persistence, theatre_id)?;
    let tier: PricingTierData = load_pricing_tier(persistence, request.tier_id)?;
    validate_price(request.price_cents)?;

    let before: Option<i64> = persistence
        .list_theatre_pricing(theatre_id)?
        .into_iter()
        .find(|p| p.tier_id == tier.tier_id)
        .map(|p| p.price_cents);

    persistence.set_theatre_price(theatre_id, tier.tier_id, request.price_cents)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("SetTheatrePrice"),
            Some(format!(
                "{} at {} costs {} cents",
                tier.code, theatre.name, request.price_cents
            )),
        ),
        AuditTarget::new("theatre", theatre_id),
        before.map_or_else(StateSnapshot::absent, |price| {
            StateSnapshot::new(format!("tier={},price_cents={price}", tier.code))
        }),
        StateSnapshot::new(format!(
            "tier={},price_cents={}",
            tier.code, request.price_cents
        )),
    )?;

    list_theatre_pricing(persistence, theatre_id, actor)
}

/// Removes a theatre's price override so the tier's base price applies.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or no override exists.
pub fn remove_theatre_price(
    persistence: &mut Persistence,
    theatre_id: i64,
    tier_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ListTheatrePricingResponse, ApiError> {
    AuthorizationService::require_staff(actor, "remove_theatre_price")?;
    load_theatre(persistence, theatre_id)?;

    let existing: TheatrePriceData = persistence
        .list_theatre_pricing(theatre_id)?
        .into_iter()
        .find(|p| p.tier_id == tier_id)
        .ok_or_else(|| {
            not_found(
                "TheatrePrice",
                format!("Theatre {theatre_id} has no override for tier {tier_id}"),
            )
        })?;

    persistence.remove_theatre_price(theatre_id, tier_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("RemoveTheatrePrice"), None),
        AuditTarget::new("theatre", theatre_id),
        StateSnapshot::new(format!(
            "tier={},price_cents={}",
            existing.tier_code, existing.price_cents
        )),
        StateSnapshot::absent(),
    )?;

    list_theatre_pricing(persistence, theatre_id, actor)
}

// ============================================================================
// Pricing tiers
// ============================================================================

fn pricing_tier_info(tier: PricingTierData) -> PricingTierInfo {
    PricingTierInfo {
        tier_id: tier.tier_id,
        code: tier.code,
        name: tier.name,
        base_price_cents: tier.base_price_cents,
        description: tier.description,
    }
}

fn tier_snapshot(tier: &PricingTierData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "tier_id={},code={},name={},base_price_cents={}",
        tier.tier_id, tier.code, tier.name, tier.base_price_cents
    ))
}

/// Lists pricing tiers.
///
/// # Errors
///
/// Returns an error if the actor is not staff.
pub fn list_pricing_tiers(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListPricingTiersResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_pricing_tiers")?;
    let tiers: Vec<PricingTierInfo> = persistence
        .list_pricing_tiers()?
        .into_iter()
        .map(pricing_tier_info)
        .collect();
    Ok(ListPricingTiersResponse { tiers })
}

/// Creates a pricing tier.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a field is invalid, or
/// the code is taken.
pub fn create_pricing_tier(
    persistence: &mut Persistence,
    request: &CreatePricingTierRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<PricingTierInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_pricing_tier")?;
    let code: &str = request.code.trim();
    let name: &str = request.name.trim();
    validate_pricing_tier(code, name, request.base_price_cents)?;

    let tier_id: i64 = persistence
        .create_pricing_tier(
            code,
            name,
            request.base_price_cents,
            non_blank(request.description.as_deref()),
        )
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => {
                conflict("PricingTier", format!("Tier code '{code}' exists"))
            }
            other => ApiError::from(other),
        })?;
    let tier: PricingTierData = load_pricing_tier(persistence, tier_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CreatePricingTier"), None),
        AuditTarget::new("pricing_tier", tier_id),
        StateSnapshot::absent(),
        tier_snapshot(&tier),
    )?;

    Ok(pricing_tier_info(tier))
}

/// Renames or reprices a tier. The code is fixed once created.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or a field is invalid.
pub fn update_pricing_tier(
    persistence: &mut Persistence,
    tier_id: i64,
    request: &UpdatePricingTierRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<PricingTierInfo, ApiError> {
    AuthorizationService::require_staff(actor, "update_pricing_tier")?;
    let before: PricingTierData = load_pricing_tier(persistence, tier_id)?;
    let name: &str = request.name.trim();
    validate_pricing_tier(&before.code, name, request.base_price_cents)?;

    persistence.update_pricing_tier(
        tier_id,
        name,
        request.base_price_cents,
        non_blank(request.description.as_deref()),
    )?;
    let after: PricingTierData = load_pricing_tier(persistence, tier_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdatePricingTier"), None),
        AuditTarget::new("pricing_tier", tier_id),
        tier_snapshot(&before),
        tier_snapshot(&after),
    )?;

    Ok(pricing_tier_info(after))
}

/// Deletes a tier that no seat template uses. Theatre overrides for the
/// tier are removed with it.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or a seat template uses
/// the tier.
pub fn delete_pricing_tier(
    persistence: &mut Persistence,
    tier_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_pricing_tier")?;
    let tier: PricingTierData = load_pricing_tier(persistence, tier_id)?;

    for template in persistence.list_seat_templates()? {
        let layout: SeatLayout = SeatLayout::from_json(&template.layout_json)?;
        if layout.tier_codes().contains(&tier.code) {
            return Err(conflict(
                "PricingTier",
                format!(
                    "Seat template '{}' uses tier {}",
                    template.name, tier.code
                ),
            ));
        }
    }

    persistence.delete_pricing_tier(tier_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("DeletePricingTier"), None),
        AuditTarget::new("pricing_tier", tier_id),
        tier_snapshot(&tier),
        StateSnapshot::absent(),
    )?;

    Ok(())
}

// ============================================================================
// Seat templates
// ============================================================================

fn seat_template_info(
    persistence: &mut Persistence,
    template: SeatTemplateData,
) -> Result<SeatTemplateInfo, ApiError> {
    let layout: SeatLayout = SeatLayout::from_json(&template.layout_json)?;
    let show_count: i64 = persistence.count_shows_using_template(template.seat_template_id)?;
    Ok(SeatTemplateInfo {
        seat_template_id: template.seat_template_id,
        name: template.name,
        layout,
        seat_count: template.seat_count,
        created_at: template.created_at,
        show_count,
    })
}

fn template_snapshot(template: &SeatTemplateData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "seat_template_id={},name={},seat_count={}",
        template.seat_template_id, template.name, template.seat_count
    ))
}

/// A layout checked for shape and for tiers that exist, ready to store.
struct ValidatedLayout {
    name: String,
    layout_json: String,
    seat_count: i32,
}

fn validate_layout(
    persistence: &mut Persistence,
    request: &SeatTemplateRequest,
) -> Result<ValidatedLayout, ApiError> {
    let name: &str = request.name.trim();
    if name.is_empty() {
        return Err(invalid_input(
            "name",
            String::from("Template name cannot be empty"),
        ));
    }

    request.layout.validate()?;

    let known: HashSet<String> = persistence
        .list_pricing_tiers()?
        .into_iter()
        .map(|t| t.code)
        .collect();
    if let Some(unknown) = request
        .layout
        .tier_codes()
        .into_iter()
        .find(|code| !known.contains(code))
    {
        return Err(DomainError::UnknownPricingTier(unknown).into());
    }

    let seat_count: i32 = request.layout.seat_count().to_i32().ok_or_else(|| {
        invalid_input("layout", String::from("Layout has too many seats"))
    })?;

    Ok(ValidatedLayout {
        name: name.to_string(),
        layout_json: request.layout.to_json()?,
        seat_count,
    })
}

/// Lists seat templates with how many shows use each.
///
/// # Errors
///
/// Returns an error if the actor is not staff or a stored layout is corrupt.
pub fn list_seat_templates(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListSeatTemplatesResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_seat_templates")?;
    let templates: Vec<SeatTemplateInfo> = persistence
        .list_seat_templates()?
        .into_iter()
        .map(|t| seat_template_info(persistence, t))
        .collect::<Result<_, _>>()?;
    Ok(ListSeatTemplatesResponse { templates })
}

/// Creates a seat template from a layout.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the layout is invalid,
/// a row uses an unknown tier, or the name is taken.
pub fn create_seat_template(
    persistence: &mut Persistence,
    request: &SeatTemplateRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SeatTemplateInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_seat_template")?;
    let validated: ValidatedLayout = validate_layout(persistence, request)?;

    let seat_template_id: i64 = persistence
        .create_seat_template(
            &validated.name,
            &validated.layout_json,
            validated.seat_count,
        )
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => conflict(
                "SeatTemplate",
                format!("A seat template named '{}' exists", validated.name),
            ),
            other => ApiError::from(other),
        })?;
    let template: SeatTemplateData = load_seat_template(persistence, seat_template_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CreateSeatTemplate"), None),
        AuditTarget::new("seat_template", seat_template_id),
        StateSnapshot::absent(),
        template_snapshot(&template),
    )?;

    seat_template_info(persistence, template)
}

fn ensure_template_unused(
    persistence: &mut Persistence,
    template: &SeatTemplateData,
) -> Result<(), ApiError> {
    let show_count: i64 = persistence.count_shows_using_template(template.seat_template_id)?;
    if show_count > 0 {
        return Err(conflict(
            "SeatTemplate",
            format!(
                "Seat template '{}' is used by {show_count} show(s)",
                template.name
            ),
        ));
    }
    Ok(())
}

/// Replaces a seat template's name and layout while no show uses it.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a show uses the
/// template, or the layout is invalid.
pub fn update_seat_template(
    persistence: &mut Persistence,
    seat_template_id: i64,
    request: &SeatTemplateRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SeatTemplateInfo, ApiError> {
    AuthorizationService::require_staff(actor, "update_seat_template")?;
    let before: SeatTemplateData = load_seat_template(persistence, seat_template_id)?;
    ensure_template_unused(persistence, &before)?;
    let validated: ValidatedLayout = validate_layout(persistence, request)?;

    persistence.update_seat_template(
        seat_template_id,
        &validated.name,
        &validated.layout_json,
        validated.seat_count,
    )?;
    let after: SeatTemplateData = load_seat_template(persistence, seat_template_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdateSeatTemplate"), None),
        AuditTarget::new("seat_template", seat_template_id),
        template_snapshot(&before),
        template_snapshot(&after),
    )?;

    seat_template_info(persistence, after)
}

/// Deletes a seat template no show uses.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or a show uses it.
pub fn delete_seat_template(
    persistence: &mut Persistence,
    seat_template_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_seat_template")?;
    let template: SeatTemplateData = load_seat_template(persistence, seat_template_id)?;
    ensure_template_unused(persistence, &template)?;

    persistence.delete_seat_template(seat_template_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("DeleteSeatTemplate"), None),
        AuditTarget::new("seat_template", seat_template_id),
        template_snapshot(&template),
        StateSnapshot::absent(),
    )?;

    Ok(())
}

/// Renders a seat template as an empty house.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the template does not exist.
pub fn preview_seat_template(
    persistence: &mut Persistence,
    seat_template_id: i64,
    actor: &AuthenticatedActor,
) -> Result<SeatTemplatePreviewResponse, ApiError> {
    AuthorizationService::require_staff(actor, "preview_seat_template")?;
    let template: SeatTemplateData = load_seat_template(persistence, seat_template_id)?;
    let layout: SeatLayout = SeatLayout::from_json(&template.layout_json)?;
    let seat_map: SeatMap = generate_seat_map(&layout, 0, &HashSet::new(), 0);

    Ok(SeatTemplatePreviewResponse {
        seat_template_id,
        seat_count: template.seat_count,
        seat_map,
    })
}
