// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification template, campaign and delivery mutations.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use num_traits::ToPrimitive;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{NewCampaign, NewDelivery};
use crate::diesel_schema::{notification_campaigns, notification_deliveries, notification_templates};
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Creates a notification template.
///
/// # Errors
///
/// Returns an error if the name already exists or the insert fails.
pub fn create_template(
    conn: &mut _,
    name: &str,
    channel: &str,
    subject: &str,
    body: &str,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(notification_templates::table)
        .values((
            notification_templates::name.eq(name.trim()),
            notification_templates::channel.eq(channel),
            notification_templates::subject.eq(subject),
            notification_templates::body.eq(body),
            notification_templates::created_at.eq(&now),
            notification_templates::updated_at.eq(&now),
        ))
        .execute(conn)?;

    let template_id: i64 = conn.get_last_insert_rowid()?;
    info!(template_id, name, channel, "Notification template created");
    Ok(template_id)
}
}

backend_fn! {
/// Replaces a template's name, channel, subject and body.
///
/// # Errors
///
/// Returns an error if the template does not exist or the update fails.
pub fn update_template(
    conn: &mut _,
    template_id: i64,
    name: &str,
    channel: &str,
    subject: &str,
    body: &str,
) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;

    let rows: usize = diesel::update(
        notification_templates::table.filter(notification_templates::template_id.eq(template_id)),
    )
    .set((
        notification_templates::name.eq(name.trim()),
        notification_templates::channel.eq(channel),
        notification_templates::subject.eq(subject),
        notification_templates::body.eq(body),
        notification_templates::updated_at.eq(&now),
    ))
    .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Template {template_id} not found"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Deletes a notification template.
///
/// # Errors
///
/// Returns an error if the template does not exist or campaigns use it.
pub fn delete_template(conn: &mut _, template_id: i64) -> Result<(), PersistenceError> {
    let rows: usize = diesel::delete(
        notification_templates::table.filter(notification_templates::template_id.eq(template_id)),
    )
    .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Template {template_id} not found"
        )));
    }
    info!(template_id, "Notification template deleted");
    Ok(())
}
}

backend_fn! {
/// Creates a campaign in `Draft` status.
///
/// # Errors
///
/// Returns an error if the template or creator does not exist.
pub fn create_campaign(conn: &mut _, campaign: &NewCampaign<'_>) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(notification_campaigns::table)
        .values((
            notification_campaigns::name.eq(campaign.name.trim()),
            notification_campaigns::template_id.eq(campaign.template_id),
            notification_campaigns::audience.eq(campaign.audience),
            notification_campaigns::audience_ref.eq(campaign.audience_ref),
            notification_campaigns::scheduled_at.eq(campaign.scheduled_at),
            notification_campaigns::created_by.eq(campaign.created_by),
            notification_campaigns::created_at.eq(&now),
        ))
        .execute(conn)?;

    let campaign_id: i64 = conn.get_last_insert_rowid()?;
    info!(campaign_id, audience = campaign.audience, "Campaign created");
    Ok(campaign_id)
}
}

backend_fn! {
/// Moves a campaign from `expected_status` to `status`.
///
/// # Errors
///
/// Returns `NotFound` if no campaign with that ID is in `expected_status`.
pub fn update_campaign_status(
    conn: &mut _,
    campaign_id: i64,
    expected_status: &str,
    status: &str,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(
        notification_campaigns::table
            .filter(notification_campaigns::campaign_id.eq(campaign_id))
            .filter(notification_campaigns::status.eq(expected_status)),
    )
    .set(notification_campaigns::status.eq(status))
    .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "No {expected_status} campaign with ID {campaign_id}"
        )));
    }
    info!(campaign_id, status, "Campaign status changed");
    Ok(())
}
}

backend_fn! {
/// Records the rendered deliveries of a draft campaign and marks it sent.
///
/// # Returns
///
/// The number of deliveries recorded.
///
/// # Errors
///
/// Returns an error if the campaign is not a draft or an insert fails. On
/// error nothing is recorded.
pub fn record_deliveries(
    conn: &mut _,
    campaign_id: i64,
    deliveries: &[NewDelivery],
) -> Result<usize, PersistenceError> {
    let now: String = now_timestamp()?;
    let recipient_count: i32 = deliveries
        .len()
        .to_i32()
        .ok_or_else(|| PersistenceError::Other(String::from("Too many recipients")))?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let rows: usize = diesel::update(
            notification_campaigns::table
                .filter(notification_campaigns::campaign_id.eq(campaign_id))
                .filter(notification_campaigns::status.eq("Draft")),
        )
        .set((
            notification_campaigns::status.eq("Sent"),
            notification_campaigns::sent_at.eq(&now),
            notification_campaigns::recipient_count.eq(recipient_count),
        ))
        .execute(conn)?;
        if rows == 0 {
            return Err(PersistenceError::NotFound(format!(
                "No Draft campaign with ID {campaign_id}"
            )));
        }

        for delivery in deliveries {
            diesel::insert_into(notification_deliveries::table)
                .values((
                    notification_deliveries::campaign_id.eq(campaign_id),
                    notification_deliveries::user_id.eq(delivery.user_id),
                    notification_deliveries::recipient.eq(&delivery.recipient),
                    notification_deliveries::subject.eq(&delivery.subject),
                    notification_deliveries::body.eq(&delivery.body),
                    notification_deliveries::created_at.eq(&now),
                ))
                .execute(conn)?;
        }
        Ok(())
    })?;

    info!(campaign_id, recipient_count, "Campaign sent");
    Ok(deliveries.len())
}
}
