// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operational log and audit trail handlers.

use marquee_audit::{Action, AuditEvent, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{LogLevel, format_timestamp, parse_timestamp};
use marquee_persistence::{AuditFilter, LogFilter, Persistence};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use super::{invalid_input, non_blank, record_audit};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    AuditEventInfo, ListAuditEventsQuery, ListAuditEventsResponse, ListLogsQuery,
    ListLogsResponse, LogInfo, PurgeLogsRequest, PurgeLogsResponse,
};

const LOG_LEVELS: [LogLevel; 4] = [
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warn,
    LogLevel::Error,
];

/// Writes one operational log entry.
///
/// Used by the server for request failures worth keeping past the process
/// log. A failed write is reported through `tracing` and otherwise ignored,
/// since the caller is usually already handling an error.
pub fn record_log(
    persistence: &mut Persistence,
    level: LogLevel,
    source: &str,
    message: &str,
    context: Option<&str>,
) {
    if let Err(e) = persistence.insert_log(level.as_str(), source.trim(), message, context) {
        warn!(error = %e, source, "Failed to write operational log entry");
    }
}

/// Lists operational log entries, newest first.
///
/// The `level` filter is a minimum: `warn` returns warnings and errors.
///
/// # Errors
///
/// Returns an error if the actor is not staff or a filter is malformed.
pub fn list_logs(
    persistence: &mut Persistence,
    query: &ListLogsQuery,
    actor: &AuthenticatedActor,
) -> Result<ListLogsResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_logs")?;

    let minimum: LogLevel = non_blank(query.level.as_deref())
        .map(str::parse)
        .transpose()?
        .unwrap_or(LogLevel::Debug);
    let levels: Vec<String> = LOG_LEVELS
        .iter()
        .filter(|level| **level >= minimum)
        .map(|level| level.as_str().to_string())
        .collect();

    let since: Option<String> = non_blank(query.since.as_deref())
        .map(|s| parse_timestamp(s).and_then(format_timestamp))
        .transpose()?;

    let logs: Vec<LogInfo> = persistence
        .list_logs(&LogFilter {
            levels,
            source: non_blank(query.source.as_deref()).map(ToString::to_string),
            since,
            limit: query.limit,
        })?
        .into_iter()
        .map(|log| LogInfo {
            log_id: log.log_id,
            level: log.level,
            source: log.source,
            message: log.message,
            context: log.context,
            created_at: log.created_at,
        })
        .collect();

    Ok(ListLogsResponse { logs })
}

fn audit_event_info(event: AuditEvent) -> AuditEventInfo {
    let (target_type, target_id) = event
        .target
        .map_or((None, None), |t| (Some(t.target_type), Some(t.target_id)));

    AuditEventInfo {
        event_id: event.event_id,
        actor_login: event.actor.login,
        actor_type: event.actor.actor_type,
        actor_user_id: event.actor.user_id,
        cause: event.cause.description,
        action: event.action.name,
        details: event.action.details,
        target_type,
        target_id,
        before: event.before.data,
        after: event.after.data,
        created_at: event.created_at,
    }
}

/// Lists audit events, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin.
pub fn list_audit_events(
    persistence: &mut Persistence,
    query: &ListAuditEventsQuery,
    actor: &AuthenticatedActor,
) -> Result<ListAuditEventsResponse, ApiError> {
    AuthorizationService::require_admin(actor, "list_audit_events")?;

    let events: Vec<AuditEventInfo> = persistence
        .list_audit_events(&AuditFilter {
            actor_user_id: query.actor_user_id,
            target_type: non_blank(query.target_type.as_deref()).map(ToString::to_string),
            target_id: non_blank(query.target_id.as_deref()).map(ToString::to_string),
            action_name: non_blank(query.action.as_deref()).map(ToString::to_string),
            limit: query.limit,
        })?
        .into_iter()
        .map(audit_event_info)
        .collect();

    Ok(ListAuditEventsResponse { events })
}

/// Deletes operational log entries older than a number of days.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the age is below one day.
pub fn purge_logs(
    persistence: &mut Persistence,
    request: &PurgeLogsRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<PurgeLogsResponse, ApiError> {
    AuthorizationService::require_admin(actor, "purge_logs")?;
    if request.older_than_days < 1 {
        return Err(invalid_input(
            "older_than_days",
            format!(
                "Must be at least 1 day, got {}",
                request.older_than_days
            ),
        ));
    }

    let cutoff_time: OffsetDateTime = request
        .older_than_days
        .checked_mul(86_400)
        .map(Duration::seconds)
        .and_then(|age| OffsetDateTime::now_utc().checked_sub(age))
        .ok_or_else(|| {
            invalid_input(
                "older_than_days",
                format!("{} days is out of range", request.older_than_days),
            )
        })?;
    let cutoff: String = format_timestamp(cutoff_time)?;

    let deleted: usize = persistence.purge_logs_before(&cutoff)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("PurgeLogs"),
            Some(format!("Deleted {deleted} entries before {cutoff}")),
        ),
        AuditTarget::new("app_logs", "all"),
        StateSnapshot::absent(),
        StateSnapshot::new(format!("deleted={deleted},cutoff={cutoff}")),
    )?;
    info!(deleted, cutoff = %cutoff, "Operational logs purged");

    Ok(PurgeLogsResponse { deleted, cutoff })
}
