// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Theatre, pricing tier and seat template queries.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;

use crate::data_models::{PricingTierData, SeatTemplateData, TheatreData, TheatrePriceData};
use crate::diesel_schema::{pricing_tiers, seat_templates, shows, theatre_pricing, theatres};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = theatres)]
struct TheatreRow {
    theatre_id: i64,
    name: String,
    city: String,
    address: String,
    timezone: String,
    screen_count: i32,
    is_active: i32,
    created_at: String,
}

impl From<TheatreRow> for TheatreData {
    fn from(row: TheatreRow) -> Self {
        Self {
            theatre_id: row.theatre_id,
            name: row.name,
            city: row.city,
            address: row.address,
            timezone: row.timezone,
            screen_count: row.screen_count,
            is_active: row.is_active != 0,
            created_at: row.created_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = pricing_tiers)]
struct PricingTierRow {
    tier_id: i64,
    code: String,
    name: String,
    base_price_cents: i64,
    description: Option<String>,
}

impl From<PricingTierRow> for PricingTierData {
    fn from(row: PricingTierRow) -> Self {
        Self {
            tier_id: row.tier_id,
            code: row.code,
            name: row.name,
            base_price_cents: row.base_price_cents,
            description: row.description,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = seat_templates)]
struct SeatTemplateRow {
    seat_template_id: i64,
    name: String,
    layout_json: String,
    seat_count: i32,
    created_at: String,
}

impl From<SeatTemplateRow> for SeatTemplateData {
    fn from(row: SeatTemplateRow) -> Self {
        Self {
            seat_template_id: row.seat_template_id,
            name: row.name,
            layout_json: row.layout_json,
            seat_count: row.seat_count,
            created_at: row.created_at,
        }
    }
}

backend_fn! {
/// Retrieves a theatre by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the theatre is not found.
pub fn get_theatre(conn: &mut _, theatre_id: i64) -> Result<Option<TheatreData>, PersistenceError> {
    let row: Option<TheatreRow> = theatres::table
        .filter(theatres::theatre_id.eq(theatre_id))
        .select(TheatreRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(TheatreData::from))
}
}

backend_fn! {
/// Lists theatres ordered by city, then name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_theatres(conn: &mut _, include_inactive: bool) -> Result<Vec<TheatreData>, PersistenceError> {
    let mut query = theatres::table.select(TheatreRow::as_select()).into_boxed();
    if !include_inactive {
        query = query.filter(theatres::is_active.eq(1));
    }

    let rows: Vec<TheatreRow> = query
        .order((theatres::city.asc(), theatres::name.asc()))
        .load(conn)?;
    Ok(rows.into_iter().map(TheatreData::from).collect())
}
}

backend_fn! {
/// Lists a theatre's price overrides, ordered by tier code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_theatre_pricing(
    conn: &mut _,
    theatre_id: i64,
) -> Result<Vec<TheatrePriceData>, PersistenceError> {
    let rows: Vec<(i64, i64, String, i64)> = theatre_pricing::table
        .inner_join(pricing_tiers::table)
        .filter(theatre_pricing::theatre_id.eq(theatre_id))
        .order(pricing_tiers::code.asc())
        .select((
            theatre_pricing::theatre_id,
            theatre_pricing::tier_id,
            pricing_tiers::code,
            theatre_pricing::price_cents,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(theatre_id, tier_id, tier_code, price_cents)| TheatrePriceData {
            theatre_id,
            tier_id,
            tier_code,
            price_cents,
        })
        .collect())
}
}

backend_fn! {
/// Counts the shows scheduled at a theatre, in any status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_shows_at_theatre(conn: &mut _, theatre_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = shows::table
        .filter(shows::theatre_id.eq(theatre_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}

backend_fn! {
/// Retrieves a pricing tier by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the tier is not found.
pub fn get_pricing_tier(conn: &mut _, tier_id: i64) -> Result<Option<PricingTierData>, PersistenceError> {
    let row: Option<PricingTierRow> = pricing_tiers::table
        .filter(pricing_tiers::tier_id.eq(tier_id))
        .select(PricingTierRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(PricingTierData::from))
}
}

backend_fn! {
/// Lists all pricing tiers ordered by code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_pricing_tiers(conn: &mut _) -> Result<Vec<PricingTierData>, PersistenceError> {
    let rows: Vec<PricingTierRow> = pricing_tiers::table
        .order(pricing_tiers::code.asc())
        .select(PricingTierRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(PricingTierData::from).collect())
}
}

backend_fn! {
/// Retrieves a seat template by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the template is not found.
pub fn get_seat_template(
    conn: &mut _,
    seat_template_id: i64,
) -> Result<Option<SeatTemplateData>, PersistenceError> {
    let row: Option<SeatTemplateRow> = seat_templates::table
        .filter(seat_templates::seat_template_id.eq(seat_template_id))
        .select(SeatTemplateRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(SeatTemplateData::from))
}
}

backend_fn! {
/// Lists all seat templates ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_seat_templates(conn: &mut _) -> Result<Vec<SeatTemplateData>, PersistenceError> {
    let rows: Vec<SeatTemplateRow> = seat_templates::table
        .order(seat_templates::name.asc())
        .select(SeatTemplateRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(SeatTemplateData::from).collect())
}
}

backend_fn! {
/// Counts the shows that use a seat template, in any status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_shows_using_template(conn: &mut _, seat_template_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = shows::table
        .filter(shows::seat_template_id.eq(seat_template_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}
