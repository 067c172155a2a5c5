// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates backend-specific initialization, migration,
//! and helper functions that cannot be expressed in backend-agnostic
//! Diesel DSL.
//!
//! ## Backend Support
//!
//! - `sqlite`: `SQLite` backend (local development and all standard tests)
//! - `postgres`: hosted `PostgreSQL` backend, behind the `postgres` feature
//!
//! All catalog, booking and notification queries live in `queries/` and
//! `mutations/` and must work on every supported backend.

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::{Connection, SqliteConnection};

use crate::error::PersistenceError;

/// Operations that cannot be expressed in backend-agnostic Diesel DSL.
///
/// Implemented for every supported connection type so that the bodies
/// generated by `backend_fn!` compile unchanged for each backend.
pub trait PersistenceBackend: Connection {
    /// Retrieves the ID generated by the most recent insert on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }
}

#[cfg(feature = "postgres")]
impl PersistenceBackend for PgConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        postgres::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        postgres::verify_foreign_key_enforcement(self)
    }
}
