// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, role and session mutations.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::NewUser;
use crate::diesel_schema::{roles, sessions, user_roles, users};
use crate::error::PersistenceError;
use crate::now_timestamp;

fn hash_password(password: &str) -> Result<String, PersistenceError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))
}

backend_fn! {
/// Creates a user and grants the given roles in one transaction.
///
/// The email is normalized to lowercase and the password is hashed with
/// bcrypt before storage.
///
/// # Errors
///
/// Returns an error if:
/// - The email is already registered
/// - A role does not exist
/// - The database operation fails
pub fn create_user(conn: &mut _, new_user: &NewUser<'_>) -> Result<i64, PersistenceError> {
    let normalized_email: String = new_user.email.trim().to_lowercase();
    let password_hash: String = hash_password(new_user.password)?;
    let created_at: String = now_timestamp()?;

    info!(email = %normalized_email, roles = ?new_user.roles, "Creating user");

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(users::table)
            .values((
                users::email.eq(&normalized_email),
                users::display_name.eq(new_user.display_name.trim()),
                users::phone.eq(new_user.phone),
                users::password_hash.eq(&password_hash),
                users::created_at.eq(&created_at),
            ))
            .execute(conn)?;

        let user_id: i64 = conn.get_last_insert_rowid()?;

        for role in new_user.roles {
            let role_id: i64 = roles::table
                .filter(roles::name.eq(*role))
                .select(roles::role_id)
                .first(conn)
                .optional()?
                .ok_or_else(|| PersistenceError::NotFound(format!("Role '{role}' does not exist")))?;
            diesel::insert_into(user_roles::table)
                .values((user_roles::user_id.eq(user_id), user_roles::role_id.eq(role_id)))
                .execute(conn)?;
        }

        info!(user_id, "User created");
        Ok(user_id)
    })
}
}

backend_fn! {
/// Updates a user's display name and phone number.
///
/// # Errors
///
/// Returns an error if the user does not exist or the update fails.
pub fn update_user_profile(
    conn: &mut _,
    user_id: i64,
    display_name: &str,
    phone: Option<&str>,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set((
            users::display_name.eq(display_name.trim()),
            users::phone.eq(phone),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Replaces the roles held by a user.
///
/// # Errors
///
/// Returns an error if a role does not exist or the update fails. On
/// error the user's previous roles are kept.
pub fn set_user_roles(
    conn: &mut _,
    user_id: i64,
    role_names: &[&str],
) -> Result<(), PersistenceError> {
    info!(user_id, roles = ?role_names, "Replacing user roles");

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let role_ids: Vec<(i64, String)> = roles::table
            .filter(roles::name.eq_any(role_names.iter().copied()))
            .select((roles::role_id, roles::name))
            .load(conn)?;

        if let Some(missing) = role_names
            .iter()
            .find(|name| !role_ids.iter().any(|(_, n)| n.as_str() == **name))
        {
            return Err(PersistenceError::NotFound(format!(
                "Role '{missing}' does not exist"
            )));
        }

        diesel::delete(user_roles::table.filter(user_roles::user_id.eq(user_id))).execute(conn)?;

        for (role_id, _) in &role_ids {
            diesel::insert_into(user_roles::table)
                .values((user_roles::user_id.eq(user_id), user_roles::role_id.eq(*role_id)))
                .execute(conn)?;
        }
        Ok(())
    })
}
}

backend_fn! {
/// Disables a user and records when.
///
/// # Errors
///
/// Returns an error if the user does not exist or the update fails.
pub fn disable_user(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    info!(user_id, "Disabling user");
    let now: String = now_timestamp()?;

    let rows: usize = diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set((users::is_disabled.eq(1), users::disabled_at.eq(Some(now))))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Re-enables a disabled user and clears `disabled_at`.
///
/// # Errors
///
/// Returns an error if the user does not exist or the update fails.
pub fn enable_user(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    info!(user_id, "Re-enabling user");

    let rows: usize = diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set((users::is_disabled.eq(0), users::disabled_at.eq(None::<String>)))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Replaces a user's password.
///
/// # Errors
///
/// Returns an error if hashing or the update fails.
pub fn update_password(conn: &mut _, user_id: i64, password: &str) -> Result<(), PersistenceError> {
    info!(user_id, "Updating password");
    let password_hash: String = hash_password(password)?;

    let rows: usize = diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set(users::password_hash.eq(&password_hash))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_last_login(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    debug!(user_id, "Updating last_login_at");
    let now: String = now_timestamp()?;

    diesel::update(users::table.filter(users::user_id.eq(user_id)))
        .set(users::last_login_at.eq(Some(now)))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Deletes a user account and its sessions and role grants.
///
/// Callers must first check the user has no bookings and is not
/// referenced by audit events.
///
/// # Errors
///
/// Returns an error if the user does not exist or is still referenced.
pub fn delete_user(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    info!(user_id, "Deleting user");

    let rows: usize = diesel::delete(users::table.filter(users::user_id.eq(user_id))).execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Creates a session.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The opaque bearer token
/// * `csrf_token` - The token cookie-authenticated requests must echo
/// * `user_id` - The owning user
/// * `expires_at` - RFC 3339 expiry
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_session(
    conn: &mut _,
    session_token: &str,
    csrf_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::csrf_token.eq(csrf_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(&now),
            sessions::last_activity_at.eq(&now),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;
    debug!(session_id, user_id, "Session created");
    Ok(session_id)
}
}

backend_fn! {
/// Records activity on a session and slides its expiry forward.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_session_activity(
    conn: &mut _,
    session_id: i64,
    expires_at: &str,
) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::update(sessions::table.filter(sessions::session_id.eq(session_id)))
        .set((
            sessions::last_activity_at.eq(&now),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Deletes a session by token. Deleting an unknown token is not an error.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(conn: &mut _, session_token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Deletes every session of a user.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_sessions_for_user(conn: &mut _, user_id: i64) -> Result<usize, PersistenceError> {
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;
    debug!(user_id, deleted, "Deleted sessions for user");
    Ok(deleted)
}
}

backend_fn! {
/// Deletes sessions whose expiry is at or before `now`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_sessions(conn: &mut _, now: &str) -> Result<usize, PersistenceError> {
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::expires_at.le(now))).execute(conn)?;
    if deleted > 0 {
        info!(deleted, "Deleted expired sessions");
    }
    Ok(deleted)
}
}
