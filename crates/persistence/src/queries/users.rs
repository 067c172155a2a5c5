// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, role and session queries.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{SessionData, UserData, UserFilter};
use crate::diesel_schema::{
    audit_events, bookings, notification_deliveries, roles, sessions, user_roles, users,
};
use crate::error::PersistenceError;
use crate::paginate;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    user_id: i64,
    email: String,
    display_name: String,
    phone: Option<String>,
    password_hash: String,
    is_disabled: i32,
    created_at: String,
    disabled_at: Option<String>,
    last_login_at: Option<String>,
}

impl From<UserRow> for UserData {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            email: row.email,
            display_name: row.display_name,
            phone: row.phone,
            password_hash: row.password_hash,
            is_disabled: row.is_disabled != 0,
            created_at: row.created_at,
            disabled_at: row.disabled_at,
            last_login_at: row.last_login_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    csrf_token: String,
    user_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            session_token: row.session_token,
            csrf_token: row.csrf_token,
            user_id: row.user_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        }
    }
}

backend_fn! {
/// Retrieves a user by email.
///
/// The email is normalized to lowercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_email(conn: &mut _, email: &str) -> Result<Option<UserData>, PersistenceError> {
    let normalized: String = email.trim().to_lowercase();

    debug!(email = %normalized, "Looking up user by email");

    let row: Option<UserRow> = users::table
        .filter(users::email.eq(&normalized))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserData::from))
}
}

backend_fn! {
/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(conn: &mut _, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
    debug!(user_id, "Looking up user by ID");

    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserData::from))
}
}

backend_fn! {
/// Retrieves several users by ID, ordered by ID.
///
/// Missing IDs are skipped.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_users_by_ids(conn: &mut _, user_ids: &[i64]) -> Result<Vec<UserData>, PersistenceError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<UserRow> = users::table
        .filter(users::user_id.eq_any(user_ids))
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(UserData::from).collect())
}
}

backend_fn! {
/// Lists users matching a filter, ordered by email.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut _, filter: &UserFilter) -> Result<Vec<UserData>, PersistenceError> {
    let mut query = users::table.select(UserRow::as_select()).into_boxed();

    if let Some(role) = &filter.role {
        let member_ids: Vec<i64> = user_roles::table
            .inner_join(roles::table)
            .filter(roles::name.eq(role))
            .select(user_roles::user_id)
            .load(conn)?;
        query = query.filter(users::user_id.eq_any(member_ids));
    }
    if !filter.include_disabled {
        query = query.filter(users::is_disabled.eq(0));
    }

    let rows: Vec<UserRow> = query.order(users::email.asc()).load(conn)?;

    let needle: Option<String> = filter.search.as_ref().map(|s| s.trim().to_lowercase());
    let matching = rows.into_iter().map(UserData::from).filter(|user| {
        needle.as_ref().is_none_or(|n| {
            user.email.contains(n.as_str()) || user.display_name.to_lowercase().contains(n.as_str())
        })
    });

    Ok(paginate(matching, filter.limit, filter.offset))
}
}

backend_fn! {
/// Lists the role names held by a user, in alphabetical order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_user_roles(conn: &mut _, user_id: i64) -> Result<Vec<String>, PersistenceError> {
    let names: Vec<String> = user_roles::table
        .inner_join(roles::table)
        .filter(user_roles::user_id.eq(user_id))
        .select(roles::name)
        .order(roles::name.asc())
        .load(conn)?;
    Ok(names)
}
}

backend_fn! {
/// Counts users holding a role.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `role` - The role name
/// * `enabled_only` - Whether to skip disabled users
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users_with_role(
    conn: &mut _,
    role: &str,
    enabled_only: bool,
) -> Result<i64, PersistenceError> {
    let members = user_roles::table
        .inner_join(roles::table)
        .inner_join(users::table)
        .filter(roles::name.eq(role));

    let count: i64 = if enabled_only {
        members
            .filter(users::is_disabled.eq(0))
            .count()
            .get_result(conn)?
    } else {
        members.count().get_result(conn)?
    };
    Ok(count)
}
}

backend_fn! {
/// Lists the IDs of enabled users holding a role.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_user_ids_with_role(conn: &mut _, role: &str) -> Result<Vec<i64>, PersistenceError> {
    let ids: Vec<i64> = user_roles::table
        .inner_join(roles::table)
        .inner_join(users::table)
        .filter(roles::name.eq(role))
        .filter(users::is_disabled.eq(0))
        .select(users::user_id)
        .order(users::user_id.asc())
        .load(conn)?;
    Ok(ids)
}
}

backend_fn! {
/// Counts the bookings a user has made, in any status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_bookings_for_user(conn: &mut _, user_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}

backend_fn! {
/// Counts the notification deliveries addressed to a user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_deliveries_for_user(conn: &mut _, user_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = notification_deliveries::table
        .filter(notification_deliveries::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}

backend_fn! {
/// Checks if a user appears as the actor of any audit event.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn is_user_referenced_by_audit(conn: &mut _, user_id: i64) -> Result<bool, PersistenceError> {
    let count: i64 = audit_events::table
        .filter(audit_events::actor_user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
}

backend_fn! {
/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut _,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(SessionData::from))
}
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
