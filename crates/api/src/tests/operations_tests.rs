// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the operational log and the audit trail.

use marquee_domain::LogLevel;

use crate::tests::helpers::{
    create_admin, create_customer, create_manager, create_test_cause, create_test_persistence,
};
use crate::{
    ApiError, CreateCategoryRequest, ListAuditEventsQuery, ListLogsQuery, PurgeLogsRequest,
    create_category, list_audit_events, list_logs, purge_logs, record_log,
};

#[test]
fn test_list_logs_applies_minimum_level() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    record_log(&mut persistence, LogLevel::Debug, "server", "request started", None);
    record_log(&mut persistence, LogLevel::Warn, "server", "slow query", None);
    record_log(
        &mut persistence,
        LogLevel::Error,
        "server",
        "database unavailable",
        Some("GET /movies"),
    );

    let everything = list_logs(&mut persistence, &ListLogsQuery::default(), &manager).unwrap();
    assert_eq!(everything.logs.len(), 3);

    let serious = list_logs(
        &mut persistence,
        &ListLogsQuery {
            level: Some(String::from("warn")),
            ..ListLogsQuery::default()
        },
        &manager,
    )
    .unwrap();
    assert_eq!(serious.logs.len(), 2);
    assert!(serious.logs.iter().all(|l| l.level != "debug"));

    let errors = list_logs(
        &mut persistence,
        &ListLogsQuery {
            level: Some(String::from("error")),
            ..ListLogsQuery::default()
        },
        &manager,
    )
    .unwrap();
    assert_eq!(errors.logs.len(), 1);
    assert_eq!(errors.logs[0].context.as_deref(), Some("GET /movies"));
}

#[test]
fn test_list_logs_filters_by_source() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    record_log(&mut persistence, LogLevel::Info, "server", "started", None);
    record_log(&mut persistence, LogLevel::Info, "cleanup", "expired sessions removed", None);

    let cleanup = list_logs(
        &mut persistence,
        &ListLogsQuery {
            source: Some(String::from("cleanup")),
            ..ListLogsQuery::default()
        },
        &manager,
    )
    .unwrap();

    assert_eq!(cleanup.logs.len(), 1);
    assert_eq!(cleanup.logs[0].message, "expired sessions removed");
}

#[test]
fn test_list_logs_rejects_unknown_level_and_customers() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let customer = create_customer(&mut persistence, "fan@example.com");

    let bad_level = list_logs(
        &mut persistence,
        &ListLogsQuery {
            level: Some(String::from("loud")),
            ..ListLogsQuery::default()
        },
        &manager,
    );
    assert!(matches!(bad_level, Err(ApiError::InvalidInput { .. })));

    let denied = list_logs(&mut persistence, &ListLogsQuery::default(), &customer);
    assert!(matches!(denied, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_audit_events_are_admin_only_and_filterable() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let manager = create_manager(&mut persistence);
    for name in ["Horror", "Comedy"] {
        create_category(
            &mut persistence,
            &CreateCategoryRequest {
                name: name.to_string(),
            },
            &manager,
            create_test_cause(),
        )
        .unwrap();
    }

    let denied = list_audit_events(&mut persistence, &ListAuditEventsQuery::default(), &manager);
    assert!(matches!(denied, Err(ApiError::Unauthorized { .. })));

    let by_manager = list_audit_events(
        &mut persistence,
        &ListAuditEventsQuery {
            actor_user_id: Some(manager.user_id),
            action: Some(String::from("CreateCategory")),
            ..ListAuditEventsQuery::default()
        },
        &admin,
    )
    .unwrap();
    assert_eq!(by_manager.events.len(), 2);
    assert!(by_manager.events.iter().all(|e| e.actor_login == manager.email));
    assert!(by_manager
        .events
        .iter()
        .all(|e| e.target_type.as_deref() == Some("category")));

    let limited = list_audit_events(
        &mut persistence,
        &ListAuditEventsQuery {
            limit: Some(1),
            ..ListAuditEventsQuery::default()
        },
        &admin,
    )
    .unwrap();
    assert_eq!(limited.events.len(), 1);
}

#[test]
fn test_purge_logs_requires_positive_age() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);

    let result = purge_logs(
        &mut persistence,
        &PurgeLogsRequest { older_than_days: 0 },
        &admin,
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "older_than_days"),
        other => panic!("Expected InvalidInput for older_than_days, got {other:?}"),
    }

    let huge = purge_logs(
        &mut persistence,
        &PurgeLogsRequest {
            older_than_days: i64::MAX,
        },
        &admin,
        create_test_cause(),
    );
    assert!(matches!(huge, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_purge_logs_keeps_recent_entries_and_is_audited() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let manager = create_manager(&mut persistence);
    record_log(&mut persistence, LogLevel::Error, "server", "recent failure", None);

    let denied = purge_logs(
        &mut persistence,
        &PurgeLogsRequest { older_than_days: 30 },
        &manager,
        create_test_cause(),
    );
    assert!(matches!(denied, Err(ApiError::Unauthorized { .. })));

    let purged = purge_logs(
        &mut persistence,
        &PurgeLogsRequest { older_than_days: 30 },
        &admin,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(purged.deleted, 0);

    let remaining = list_logs(&mut persistence, &ListLogsQuery::default(), &admin).unwrap();
    assert_eq!(remaining.logs.len(), 1);

    let events = list_audit_events(
        &mut persistence,
        &ListAuditEventsQuery {
            target_type: Some(String::from("app_logs")),
            ..ListAuditEventsQuery::default()
        },
        &admin,
    )
    .unwrap();
    assert_eq!(events.events.len(), 1);
    assert_eq!(events.events[0].action, "PurgeLogs");
}
