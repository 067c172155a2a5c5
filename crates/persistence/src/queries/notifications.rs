// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification template, campaign and delivery queries.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;

use crate::data_models::{CampaignData, DeliveryData, NotificationTemplateData};
use crate::diesel_schema::{notification_campaigns, notification_deliveries, notification_templates};
use crate::error::PersistenceError;
use crate::page_limit;

#[derive(Queryable, Selectable)]
#[diesel(table_name = notification_templates)]
struct TemplateRow {
    template_id: i64,
    name: String,
    channel: String,
    subject: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl From<TemplateRow> for NotificationTemplateData {
    fn from(row: TemplateRow) -> Self {
        Self {
            template_id: row.template_id,
            name: row.name,
            channel: row.channel,
            subject: row.subject,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = notification_campaigns)]
struct CampaignRow {
    campaign_id: i64,
    name: String,
    template_id: i64,
    audience: String,
    audience_ref: Option<String>,
    status: String,
    scheduled_at: Option<String>,
    sent_at: Option<String>,
    recipient_count: i32,
    created_by: i64,
    created_at: String,
}

impl From<CampaignRow> for CampaignData {
    fn from(row: CampaignRow) -> Self {
        Self {
            campaign_id: row.campaign_id,
            name: row.name,
            template_id: row.template_id,
            audience: row.audience,
            audience_ref: row.audience_ref,
            status: row.status,
            scheduled_at: row.scheduled_at,
            sent_at: row.sent_at,
            recipient_count: row.recipient_count,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = notification_deliveries)]
struct DeliveryRow {
    delivery_id: i64,
    campaign_id: i64,
    user_id: i64,
    recipient: String,
    subject: String,
    body: String,
    created_at: String,
}

impl From<DeliveryRow> for DeliveryData {
    fn from(row: DeliveryRow) -> Self {
        Self {
            delivery_id: row.delivery_id,
            campaign_id: row.campaign_id,
            user_id: row.user_id,
            recipient: row.recipient,
            subject: row.subject,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

backend_fn! {
/// Retrieves a notification template by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the template is not found.
pub fn get_template(
    conn: &mut _,
    template_id: i64,
) -> Result<Option<NotificationTemplateData>, PersistenceError> {
    let row: Option<TemplateRow> = notification_templates::table
        .filter(notification_templates::template_id.eq(template_id))
        .select(TemplateRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(NotificationTemplateData::from))
}
}

backend_fn! {
/// Lists notification templates ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_templates(conn: &mut _) -> Result<Vec<NotificationTemplateData>, PersistenceError> {
    let rows: Vec<TemplateRow> = notification_templates::table
        .order(notification_templates::name.asc())
        .select(TemplateRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(NotificationTemplateData::from).collect())
}
}

backend_fn! {
/// Counts the campaigns that use a template.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_campaigns_using_template(conn: &mut _, template_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = notification_campaigns::table
        .filter(notification_campaigns::template_id.eq(template_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}

backend_fn! {
/// Retrieves a campaign by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the campaign is not found.
pub fn get_campaign(conn: &mut _, campaign_id: i64) -> Result<Option<CampaignData>, PersistenceError> {
    let row: Option<CampaignRow> = notification_campaigns::table
        .filter(notification_campaigns::campaign_id.eq(campaign_id))
        .select(CampaignRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(CampaignData::from))
}
}

backend_fn! {
/// Lists campaigns newest first, optionally by status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_campaigns(
    conn: &mut _,
    status: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<CampaignData>, PersistenceError> {
    let mut query = notification_campaigns::table
        .select(CampaignRow::as_select())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(notification_campaigns::status.eq(status));
    }

    let rows: Vec<CampaignRow> = query
        .order(notification_campaigns::campaign_id.desc())
        .limit(page_limit(limit))
        .load(conn)?;
    Ok(rows.into_iter().map(CampaignData::from).collect())
}
}

backend_fn! {
/// Lists the deliveries recorded for a campaign in recipient order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_deliveries(
    conn: &mut _,
    campaign_id: i64,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Vec<DeliveryData>, PersistenceError> {
    let rows: Vec<DeliveryRow> = notification_deliveries::table
        .filter(notification_deliveries::campaign_id.eq(campaign_id))
        .order(notification_deliveries::delivery_id.asc())
        .offset(offset.unwrap_or(0).max(0))
        .limit(page_limit(limit))
        .select(DeliveryRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(DeliveryData::from).collect())
}
}
