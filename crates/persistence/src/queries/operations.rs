// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operational log and audit event queries.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use marquee_audit::{Action, Actor, AuditEvent, AuditTarget, Cause, StateSnapshot};

use crate::data_models::{AppLogData, AuditFilter, LogFilter};
use crate::diesel_schema::{app_logs, audit_events};
use crate::error::PersistenceError;
use crate::page_limit;

#[derive(Queryable, Selectable)]
#[diesel(table_name = app_logs)]
struct AppLogRow {
    log_id: i64,
    level: String,
    source: String,
    message: String,
    context: Option<String>,
    created_at: String,
}

impl From<AppLogRow> for AppLogData {
    fn from(row: AppLogRow) -> Self {
        Self {
            log_id: row.log_id,
            level: row.level,
            source: row.source,
            message: row.message,
            context: row.context,
            created_at: row.created_at,
        }
    }
}

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    actor_user_id: Option<i64>,
    actor_login: String,
    actor_type: String,
    cause_id: String,
    cause_description: String,
    action_name: String,
    action_details: Option<String>,
    target_type: Option<String>,
    target_id: Option<String>,
    before_snapshot: String,
    after_snapshot: String,
    created_at: String,
}

impl From<AuditEventRow> for AuditEvent {
    fn from(row: AuditEventRow) -> Self {
        let actor: Actor = row.actor_user_id.map_or_else(
            || Actor::new(row.actor_type.clone(), row.actor_type.clone(), row.actor_login.clone()),
            |user_id| Actor::with_user(user_id, row.actor_login.clone()),
        );
        let target: Option<AuditTarget> = match (row.target_type, row.target_id) {
            (Some(target_type), Some(target_id)) => Some(AuditTarget {
                target_type,
                target_id,
            }),
            _ => None,
        };

        Self {
            event_id: Some(row.event_id),
            actor,
            cause: Cause::new(row.cause_id, row.cause_description),
            action: Action::new(row.action_name, row.action_details),
            target,
            before: StateSnapshot::new(row.before_snapshot),
            after: StateSnapshot::new(row.after_snapshot),
            created_at: Some(row.created_at),
        }
    }
}

backend_fn! {
/// Lists operational log entries matching a filter, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_logs(conn: &mut _, filter: &LogFilter) -> Result<Vec<AppLogData>, PersistenceError> {
    let mut query = app_logs::table.select(AppLogRow::as_select()).into_boxed();

    if !filter.levels.is_empty() {
        query = query.filter(app_logs::level.eq_any(filter.levels.clone()));
    }
    if let Some(source) = &filter.source {
        query = query.filter(app_logs::source.eq(source.clone()));
    }
    if let Some(since) = &filter.since {
        query = query.filter(app_logs::created_at.ge(since.clone()));
    }

    let rows: Vec<AppLogRow> = query
        .order((app_logs::created_at.desc(), app_logs::log_id.desc()))
        .limit(page_limit(filter.limit))
        .load(conn)?;
    Ok(rows.into_iter().map(AppLogData::from).collect())
}
}

backend_fn! {
/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns `NotFound` if the event does not exist, or an error if the
/// query fails.
pub fn get_audit_event(conn: &mut _, event_id: i64) -> Result<AuditEvent, PersistenceError> {
    let row: AuditEventRow = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Audit event {event_id} not found")))?;
    Ok(AuditEvent::from(row))
}
}

backend_fn! {
/// Lists audit events matching a filter, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_audit_events(conn: &mut _, filter: &AuditFilter) -> Result<Vec<AuditEvent>, PersistenceError> {
    let mut query = audit_events::table
        .select(AuditEventRow::as_select())
        .into_boxed();

    if let Some(actor_user_id) = filter.actor_user_id {
        query = query.filter(audit_events::actor_user_id.eq(actor_user_id));
    }
    if let Some(target_type) = &filter.target_type {
        query = query.filter(audit_events::target_type.eq(target_type.clone()));
    }
    if let Some(target_id) = &filter.target_id {
        query = query.filter(audit_events::target_id.eq(target_id.clone()));
    }
    if let Some(action_name) = &filter.action_name {
        query = query.filter(audit_events::action_name.eq(action_name.clone()));
    }

    let rows: Vec<AuditEventRow> = query
        .order(audit_events::event_id.desc())
        .limit(page_limit(filter.limit))
        .load(conn)?;
    Ok(rows.into_iter().map(AuditEvent::from).collect())
}
}
