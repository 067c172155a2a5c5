// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! PostgreSQL-specific persistence utilities.
//!
//! Compiled only with the `postgres` feature, which requires `libpq` at
//! build time. Standard tests never touch this module; the backend
//! validation tests marked `#[ignore]` exercise it via
//! `cargo xtask test-postgres`, which provisions a container and sets
//! `DATABASE_URL` and `MARQUEE_TEST_BACKEND=postgres`.
//!
//! ## Schema parity
//!
//! `migrations_postgres/` must stay schema-equivalent to `migrations/`:
//! same tables, columns, nullability, uniqueness, foreign keys and
//! indexes. `cargo xtask verify-migrations` checks this.

use diesel::dsl::sql;
use diesel::sql_types::{BigInt, Text};
use diesel::{Connection, PgConnection, QueryableByName, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::error::PersistenceError;

/// `PostgreSQL` migrations.
pub const POSTGRES_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_postgres");

#[derive(QueryableByName)]
struct RoleCheck {
    #[diesel(sql_type = Text)]
    session_replication_role: String,
}

/// Returns the value most recently produced by a sequence in this session.
///
/// Every table uses a `BIGSERIAL` key, so after an insert this is the new
/// row's ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut PgConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("lastval()")).get_result(conn)?)
}

/// Opens a `PostgreSQL` connection and runs migrations.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_database(database_url: &str) -> Result<PgConnection, PersistenceError> {
    info!("Initializing PostgreSQL database");

    let mut conn: PgConnection = PgConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Runs pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut PgConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running PostgreSQL database migrations");
    conn.run_pending_migrations(POSTGRES_MIGRATIONS)?;
    Ok(())
}

/// Verifies that foreign key triggers are active.
///
/// `PostgreSQL` always enforces foreign keys unless the session runs with
/// `session_replication_role = replica`, which disables them.
///
/// # Errors
///
/// Returns an error if enforcement is disabled or the check fails.
pub fn verify_foreign_key_enforcement(conn: &mut PgConnection) -> Result<(), PersistenceError> {
    let check: RoleCheck = diesel::sql_query("SHOW session_replication_role")
        .get_result(conn)
        .map_err(|e| {
            PersistenceError::QueryFailed(format!(
                "Failed to verify foreign key enforcement: {e}"
            ))
        })?;

    if check.session_replication_role == "replica" {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("PostgreSQL foreign key enforcement is enabled");
    Ok(())
}
