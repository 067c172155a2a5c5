// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{create_test_actor, create_test_cause, create_test_persistence};
use crate::{AuditFilter, LogFilter, Persistence, PersistenceError};
use marquee_audit::{Action, Actor, AuditEvent, AuditTarget, StateSnapshot};

#[test]
fn test_insert_and_list_logs() {
    let mut persistence: Persistence = create_test_persistence();
    persistence
        .insert_log("info", "server", "Started", None)
        .unwrap();
    persistence
        .insert_log("error", "checkout", "Payment exploded", Some(r#"{"show_id":3}"#))
        .unwrap();
    persistence
        .insert_log("warn", "checkout", "Slow query", None)
        .unwrap();

    let all = persistence.list_logs(&LogFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].message, "Slow query");

    let problems = persistence
        .list_logs(&LogFilter {
            levels: vec![String::from("warn"), String::from("error")],
            source: Some(String::from("checkout")),
            ..LogFilter::default()
        })
        .unwrap();
    assert_eq!(problems.len(), 2);
    assert!(problems.iter().all(|log| log.source == "checkout"));

    let limited = persistence
        .list_logs(&LogFilter {
            limit: Some(1),
            ..LogFilter::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn test_purge_logs_before() {
    let mut persistence: Persistence = create_test_persistence();
    persistence.insert_log("info", "server", "Old", None).unwrap();

    assert_eq!(persistence.purge_logs_before("2000-01-01T00:00:00Z").unwrap(), 0);
    assert_eq!(persistence.purge_logs_before("2999-01-01T00:00:00Z").unwrap(), 1);
    assert!(persistence.list_logs(&LogFilter::default()).unwrap().is_empty());
}

#[test]
fn test_persist_and_retrieve_audit_event() {
    let mut persistence: Persistence = create_test_persistence();
    let event: AuditEvent = AuditEvent::new_global(
        create_test_actor(),
        create_test_cause(),
        Action::new(String::from("CreateMovie"), Some(String::from("title=Heat"))),
        StateSnapshot::absent(),
        StateSnapshot::new(String::from(r#"{"title":"Heat"}"#)),
    )
    .with_target(AuditTarget::new("movie", 7));

    let event_id: i64 = persistence.persist_audit_event(&event).unwrap();
    let stored: AuditEvent = persistence.get_audit_event(event_id).unwrap();

    assert_eq!(stored.event_id, Some(event_id));
    assert_eq!(stored.actor, event.actor);
    assert_eq!(stored.cause, event.cause);
    assert_eq!(stored.action, event.action);
    assert_eq!(stored.target, event.target);
    assert_eq!(stored.before, event.before);
    assert_eq!(stored.after, event.after);
    assert!(stored.created_at.is_some());

    assert!(persistence.is_user_referenced_by_audit(1).unwrap());
}

#[test]
fn test_system_actor_round_trips() {
    let mut persistence: Persistence = create_test_persistence();
    let event: AuditEvent = AuditEvent::new_global(
        Actor::system(),
        create_test_cause(),
        Action::new(String::from("PurgeLogs"), None),
        StateSnapshot::absent(),
        StateSnapshot::absent(),
    );

    let event_id: i64 = persistence.persist_audit_event(&event).unwrap();
    let stored: AuditEvent = persistence.get_audit_event(event_id).unwrap();
    assert_eq!(stored.actor, Actor::system());
    assert!(stored.target.is_none());
}

#[test]
fn test_list_audit_events_filters() {
    let mut persistence: Persistence = create_test_persistence();
    for (name, target_id) in [("CreateShow", 1), ("CancelShow", 1), ("CreateShow", 2)] {
        let event: AuditEvent = AuditEvent::new_global(
            create_test_actor(),
            create_test_cause(),
            Action::new(String::from(name), None),
            StateSnapshot::absent(),
            StateSnapshot::absent(),
        )
        .with_target(AuditTarget::new("show", target_id));
        persistence.persist_audit_event(&event).unwrap();
    }

    let for_show_one = persistence
        .list_audit_events(&AuditFilter {
            target_type: Some(String::from("show")),
            target_id: Some(String::from("1")),
            ..AuditFilter::default()
        })
        .unwrap();
    assert_eq!(for_show_one.len(), 2);
    assert_eq!(for_show_one[0].action.name, "CancelShow");

    let creations = persistence
        .list_audit_events(&AuditFilter {
            action_name: Some(String::from("CreateShow")),
            actor_user_id: Some(1),
            ..AuditFilter::default()
        })
        .unwrap();
    assert_eq!(creations.len(), 2);

    assert!(matches!(
        persistence.get_audit_event(9999),
        Err(PersistenceError::NotFound(_))
    ));
}
