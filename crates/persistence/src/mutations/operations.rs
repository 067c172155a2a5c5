// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operational log and audit event mutations.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use marquee_audit::AuditEvent;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{app_logs, audit_events};
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Appends an operational log entry.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_log(
    conn: &mut _,
    level: &str,
    source: &str,
    message: &str,
    context: Option<&str>,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(app_logs::table)
        .values((
            app_logs::level.eq(level),
            app_logs::source.eq(source),
            app_logs::message.eq(message),
            app_logs::context.eq(context),
            app_logs::created_at.eq(&now),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}
}

backend_fn! {
/// Deletes log entries created before a timestamp.
///
/// # Returns
///
/// The number of entries deleted.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn purge_logs_before(conn: &mut _, before: &str) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(app_logs::table.filter(app_logs::created_at.lt(before)))
        .execute(conn)?;
    info!(deleted, before, "Purged operational logs");
    Ok(deleted)
}
}

backend_fn! {
/// Persists an audit event.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn persist_audit_event(conn: &mut _, event: &AuditEvent) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    let (target_type, target_id): (Option<&str>, Option<&str>) = event
        .target
        .as_ref()
        .map_or((None, None), |t| (Some(t.target_type.as_str()), Some(t.target_id.as_str())));

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::actor_user_id.eq(event.actor.user_id),
            audit_events::actor_login.eq(&event.actor.login),
            audit_events::actor_type.eq(&event.actor.actor_type),
            audit_events::cause_id.eq(&event.cause.id),
            audit_events::cause_description.eq(&event.cause.description),
            audit_events::action_name.eq(&event.action.name),
            audit_events::action_details.eq(event.action.details.as_deref()),
            audit_events::target_type.eq(target_type),
            audit_events::target_id.eq(target_id),
            audit_events::before_snapshot.eq(&event.before.data),
            audit_events::after_snapshot.eq(&event.after.data),
            audit_events::created_at.eq(&now),
        ))
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
}
