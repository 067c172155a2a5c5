// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

//! Audit trail types.
//!
//! Every administrative mutation records who did it (`Actor`), why
//! (`Cause`), what was done (`Action`), what it touched (`AuditTarget`),
//! and the state before and after (`StateSnapshot`).

use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Actor type recorded for staff and customer accounts.
pub const ACTOR_TYPE_USER: &str = "user";
/// Actor type recorded for work done by the system itself.
pub const ACTOR_TYPE_SYSTEM: &str = "system";

/// Who performed an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub actor_type: String,
    /// The user account behind the actor, if any.
    pub user_id: Option<i64>,
    /// Login email, or "system".
    pub login: String,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: String, login: String) -> Self {
        Self {
            id,
            actor_type,
            user_id: None,
            login,
        }
    }

    /// Creates an actor for an authenticated user.
    #[must_use]
    pub fn with_user(user_id: i64, login: String) -> Self {
        Self {
            id: user_id.to_string(),
            actor_type: String::from(ACTOR_TYPE_USER),
            user_id: Some(user_id),
            login,
        }
    }

    /// Creates an actor for background or bootstrap work.
    #[must_use]
    pub fn system() -> Self {
        Self::new(
            String::from(ACTOR_TYPE_SYSTEM),
            String::from(ACTOR_TYPE_SYSTEM),
            String::from(ACTOR_TYPE_SYSTEM),
        )
    }
}

/// Why an action was performed, typically the originating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub id: String,
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The entity an action was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTarget {
    /// e.g. "movie", "show", "user"
    pub target_type: String,
    pub target_id: String,
}

impl AuditTarget {
    #[must_use]
    pub fn new(target_type: &str, target_id: impl ToString) -> Self {
        Self {
            target_type: target_type.to_string(),
            target_id: target_id.to_string(),
        }
    }
}

/// A serialized view of state around an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Snapshot used when the entity did not exist.
    #[must_use]
    pub fn absent() -> Self {
        Self::new(String::from("absent"))
    }
}

/// An immutable audit record.
///
/// `event_id` and `created_at` are assigned by the database and are only
/// present on events read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub target: Option<AuditTarget>,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    pub created_at: Option<String>,
}

impl AuditEvent {
    /// Creates an event that is not tied to a specific entity.
    #[must_use]
    pub const fn new_global(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            target: None,
            before,
            after,
            created_at: None,
        }
    }

    /// Attaches the entity the event applies to.
    #[must_use]
    pub fn with_target(mut self, target: AuditTarget) -> Self {
        self.target = Some(target);
        self
    }
}
