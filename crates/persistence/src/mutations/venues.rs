// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Theatre, pricing tier and seat template mutations.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::TheatreInput;
use crate::diesel_schema::{pricing_tiers, seat_templates, theatre_pricing, theatres};
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Creates a theatre.
///
/// # Errors
///
/// Returns an error if the name already exists or the insert fails.
pub fn create_theatre(conn: &mut _, input: &TheatreInput<'_>) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(theatres::table)
        .values((
            theatres::name.eq(input.name.trim()),
            theatres::city.eq(input.city.trim()),
            theatres::address.eq(input.address.trim()),
            theatres::timezone.eq(input.timezone),
            theatres::screen_count.eq(input.screen_count),
            theatres::is_active.eq(i32::from(input.is_active)),
            theatres::created_at.eq(&now),
        ))
        .execute(conn)?;

    let theatre_id: i64 = conn.get_last_insert_rowid()?;
    info!(theatre_id, name = input.name, "Theatre created");
    Ok(theatre_id)
}
}

backend_fn! {
/// Replaces a theatre's editable fields.
///
/// # Errors
///
/// Returns an error if the theatre does not exist or the update fails.
pub fn update_theatre(
    conn: &mut _,
    theatre_id: i64,
    input: &TheatreInput<'_>,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(theatres::table.filter(theatres::theatre_id.eq(theatre_id)))
        .set((
            theatres::name.eq(input.name.trim()),
            theatres::city.eq(input.city.trim()),
            theatres::address.eq(input.address.trim()),
            theatres::timezone.eq(input.timezone),
            theatres::screen_count.eq(input.screen_count),
            theatres::is_active.eq(i32::from(input.is_active)),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Theatre {theatre_id} not found"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Deletes a theatre and its price overrides.
///
/// # Errors
///
/// Returns an error if the theatre does not exist or shows still reference it.
pub fn delete_theatre(conn: &mut _, theatre_id: i64) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::delete(theatre_pricing::table.filter(theatre_pricing::theatre_id.eq(theatre_id)))
            .execute(conn)?;
        let rows: usize =
            diesel::delete(theatres::table.filter(theatres::theatre_id.eq(theatre_id)))
                .execute(conn)?;
        if rows == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Theatre {theatre_id} not found"
            )));
        }
        Ok(())
    })?;

    info!(theatre_id, "Theatre deleted");
    Ok(())
}
}

backend_fn! {
/// Sets a theatre's price for a tier, replacing any existing override.
///
/// # Errors
///
/// Returns an error if the theatre or tier does not exist.
pub fn set_theatre_price(
    conn: &mut _,
    theatre_id: i64,
    tier_id: i64,
    price_cents: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::delete(
            theatre_pricing::table
                .filter(theatre_pricing::theatre_id.eq(theatre_id))
                .filter(theatre_pricing::tier_id.eq(tier_id)),
        )
        .execute(conn)?;

        diesel::insert_into(theatre_pricing::table)
            .values((
                theatre_pricing::theatre_id.eq(theatre_id),
                theatre_pricing::tier_id.eq(tier_id),
                theatre_pricing::price_cents.eq(price_cents),
            ))
            .execute(conn)?;
        Ok(())
    })?;

    info!(theatre_id, tier_id, price_cents, "Theatre price set");
    Ok(())
}
}

backend_fn! {
/// Removes a theatre's price override for a tier.
///
/// # Errors
///
/// Returns `NotFound` if no override exists.
pub fn remove_theatre_price(conn: &mut _, theatre_id: i64, tier_id: i64) -> Result<(), PersistenceError> {
    let rows: usize = diesel::delete(
        theatre_pricing::table
            .filter(theatre_pricing::theatre_id.eq(theatre_id))
            .filter(theatre_pricing::tier_id.eq(tier_id)),
    )
    .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "No price override for tier {tier_id} at theatre {theatre_id}"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Creates a pricing tier.
///
/// # Errors
///
/// Returns an error if the code already exists or the insert fails.
pub fn create_pricing_tier(
    conn: &mut _,
    code: &str,
    name: &str,
    base_price_cents: i64,
    description: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(pricing_tiers::table)
        .values((
            pricing_tiers::code.eq(code),
            pricing_tiers::name.eq(name.trim()),
            pricing_tiers::base_price_cents.eq(base_price_cents),
            pricing_tiers::description.eq(description),
        ))
        .execute(conn)?;

    let tier_id: i64 = conn.get_last_insert_rowid()?;
    info!(tier_id, code, "Pricing tier created");
    Ok(tier_id)
}
}

backend_fn! {
/// Updates a pricing tier's name, base price and description.
///
/// The code is immutable because tickets record it.
///
/// # Errors
///
/// Returns an error if the tier does not exist or the update fails.
pub fn update_pricing_tier(
    conn: &mut _,
    tier_id: i64,
    name: &str,
    base_price_cents: i64,
    description: Option<&str>,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(pricing_tiers::table.filter(pricing_tiers::tier_id.eq(tier_id)))
        .set((
            pricing_tiers::name.eq(name.trim()),
            pricing_tiers::base_price_cents.eq(base_price_cents),
            pricing_tiers::description.eq(description),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Pricing tier {tier_id} not found"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Deletes a pricing tier. Theatre overrides for the tier go with it.
///
/// # Errors
///
/// Returns an error if the tier does not exist.
pub fn delete_pricing_tier(conn: &mut _, tier_id: i64) -> Result<(), PersistenceError> {
    let rows: usize =
        diesel::delete(pricing_tiers::table.filter(pricing_tiers::tier_id.eq(tier_id)))
            .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Pricing tier {tier_id} not found"
        )));
    }
    info!(tier_id, "Pricing tier deleted");
    Ok(())
}
}

backend_fn! {
/// Creates a seat template from a validated layout.
///
/// # Errors
///
/// Returns an error if the name already exists or the insert fails.
pub fn create_seat_template(
    conn: &mut _,
    name: &str,
    layout_json: &str,
    seat_count: i32,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(seat_templates::table)
        .values((
            seat_templates::name.eq(name.trim()),
            seat_templates::layout_json.eq(layout_json),
            seat_templates::seat_count.eq(seat_count),
            seat_templates::created_at.eq(&now),
        ))
        .execute(conn)?;

    let seat_template_id: i64 = conn.get_last_insert_rowid()?;
    info!(seat_template_id, seat_count, "Seat template created");
    Ok(seat_template_id)
}
}

backend_fn! {
/// Replaces a seat template's name and layout.
///
/// # Errors
///
/// Returns an error if the template does not exist or the update fails.
pub fn update_seat_template(
    conn: &mut _,
    seat_template_id: i64,
    name: &str,
    layout_json: &str,
    seat_count: i32,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(
        seat_templates::table.filter(seat_templates::seat_template_id.eq(seat_template_id)),
    )
    .set((
        seat_templates::name.eq(name.trim()),
        seat_templates::layout_json.eq(layout_json),
        seat_templates::seat_count.eq(seat_count),
    ))
    .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Seat template {seat_template_id} not found"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Deletes a seat template.
///
/// # Errors
///
/// Returns an error if the template does not exist or shows still use it.
pub fn delete_seat_template(conn: &mut _, seat_template_id: i64) -> Result<(), PersistenceError> {
    let rows: usize = diesel::delete(
        seat_templates::table.filter(seat_templates::seat_template_id.eq(seat_template_id)),
    )
    .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Seat template {seat_template_id} not found"
        )));
    }
    info!(seat_template_id, "Seat template deleted");
    Ok(())
}
}
