// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin user management handlers.

use marquee_audit::{Action, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{ROLE_ADMIN, ROLES};
use marquee_persistence::{Persistence, UserData, UserFilter};
use tracing::{info, warn};

use super::{
    conflict, invalid_input, load_user, non_blank, record_audit, rule_violation, user_snapshot,
};
use crate::auth::{AccountFields, AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::capabilities::compute_user_capabilities;
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    CreateUserRequest, ListUsersQuery, ListUsersResponse, MessageResponse, ResetPasswordRequest,
    UpdateUserRolesRequest, UserCapabilities, UserInfo,
};

fn user_info(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user: UserData,
) -> Result<UserInfo, ApiError> {
    let roles: Vec<String> = persistence.get_user_roles(user.user_id)?;
    let capabilities: UserCapabilities =
        compute_user_capabilities(persistence, actor, &user, &roles)?;

    Ok(UserInfo {
        user_id: user.user_id,
        email: user.email,
        display_name: user.display_name,
        phone: user.phone,
        roles,
        is_disabled: user.is_disabled,
        created_at: user.created_at,
        disabled_at: user.disabled_at,
        last_login_at: user.last_login_at,
        capabilities,
    })
}

/// Maps requested role names onto the known roles, without duplicates.
fn validated_roles(requested: &[String]) -> Result<Vec<&'static str>, ApiError> {
    let mut roles: Vec<&'static str> = Vec::new();
    for name in requested {
        let name: String = name.trim().to_lowercase();
        let role: &'static str = ROLES
            .iter()
            .copied()
            .find(|r| *r == name)
            .ok_or_else(|| {
                invalid_input(
                    "roles",
                    format!("Unknown role '{name}'. Must be one of: {}", ROLES.join(", ")),
                )
            })?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }

    if roles.is_empty() {
        return Err(invalid_input(
            "roles",
            String::from("At least one role is required"),
        ));
    }
    Ok(roles)
}

/// Returns whether the user is the only enabled admin.
fn is_last_enabled_admin(
    persistence: &mut Persistence,
    user: &UserData,
    roles: &[String],
) -> Result<bool, ApiError> {
    Ok(!user.is_disabled
        && roles.iter().any(|r| r == ROLE_ADMIN)
        && persistence.count_users_with_role(ROLE_ADMIN, true)? <= 1)
}

/// Lists accounts with what the admin may do to each.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the role filter is unknown.
pub fn list_users(
    persistence: &mut Persistence,
    query: &ListUsersQuery,
    actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    AuthorizationService::require_admin(actor, "list_users")?;

    let role: Option<String> = match non_blank(query.role.as_deref()) {
        Some(role) => validated_roles(&[role.to_string()])?
            .first()
            .map(ToString::to_string),
        None => None,
    };

    let users: Vec<UserData> = persistence.list_users(&UserFilter {
        role,
        include_disabled: query.include_disabled,
        search: non_blank(query.search.as_deref()).map(String::from),
        limit: query.limit,
        offset: query.offset,
    })?;

    let users: Vec<UserInfo> = users
        .into_iter()
        .map(|user| user_info(persistence, actor, user))
        .collect::<Result<_, _>>()?;

    Ok(ListUsersResponse { users })
}

/// Returns one account.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the user does not exist.
pub fn get_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "get_user")?;
    let user: UserData = load_user(persistence, user_id)?;
    user_info(persistence, actor, user)
}

/// Creates an account with the given roles, typically for staff.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a role is unknown, or
/// the account fields are invalid.
pub fn create_user(
    persistence: &mut Persistence,
    request: &CreateUserRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "create_user")?;
    let roles: Vec<&str> = validated_roles(&request.roles)?;

    let user: UserData = AuthenticationService::register(
        persistence,
        AccountFields {
            email: &request.email,
            display_name: &request.display_name,
            phone: request.phone.as_deref(),
            password: &request.password,
            password_confirmation: &request.password_confirmation,
        },
        &roles,
    )?;

    let role_names: Vec<String> = roles.iter().map(ToString::to_string).collect();
    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("CreateUser"),
            Some(format!(
                "Created {} with roles {}",
                user.email,
                role_names.join(", ")
            )),
        ),
        AuditTarget::new("user", user.user_id),
        StateSnapshot::absent(),
        user_snapshot(&user, &role_names),
    )?;

    user_info(persistence, actor, user)
}

/// Replaces an account's roles.
///
/// The last enabled admin cannot lose the admin role.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a role is unknown, or
/// the change would leave no enabled admin.
pub fn update_user_roles(
    persistence: &mut Persistence,
    user_id: i64,
    request: &UpdateUserRolesRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "update_user_roles")?;
    let user: UserData = load_user(persistence, user_id)?;
    let roles: Vec<&str> = validated_roles(&request.roles)?;
    let before_roles: Vec<String> = persistence.get_user_roles(user_id)?;

    if !roles.contains(&ROLE_ADMIN) && is_last_enabled_admin(persistence, &user, &before_roles)? {
        return Err(rule_violation(
            "last_admin",
            String::from("The last enabled admin cannot lose the admin role"),
        ));
    }

    persistence.set_user_roles(user_id, &roles)?;
    let after_roles: Vec<String> = persistence.get_user_roles(user_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdateUserRoles"), None),
        AuditTarget::new("user", user_id),
        user_snapshot(&user, &before_roles),
        user_snapshot(&user, &after_roles),
    )?;

    info!(user_id, roles = ?after_roles, "User roles updated");
    user_info(persistence, actor, user)
}

/// Disables an account and ends its sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets themselves,
/// targets the last enabled admin, or the account is already disabled.
pub fn disable_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "disable_user")?;
    if user_id == actor.user_id {
        return Err(rule_violation(
            "not_self",
            String::from("You cannot disable your own account"),
        ));
    }

    let before: UserData = load_user(persistence, user_id)?;
    if before.is_disabled {
        return Err(conflict(
            "User",
            format!("{} is already disabled", before.email),
        ));
    }
    let roles: Vec<String> = persistence.get_user_roles(user_id)?;
    if is_last_enabled_admin(persistence, &before, &roles)? {
        return Err(rule_violation(
            "last_admin",
            String::from("The last enabled admin cannot be disabled"),
        ));
    }

    persistence.disable_user(user_id)?;
    let ended: usize = persistence.delete_sessions_for_user(user_id)?;
    let after: UserData = load_user(persistence, user_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("DisableUser"),
            Some(format!("Ended {ended} session(s)")),
        ),
        AuditTarget::new("user", user_id),
        user_snapshot(&before, &roles),
        user_snapshot(&after, &roles),
    )?;

    warn!(user_id, sessions_ended = ended, "User disabled");
    user_info(persistence, actor, after)
}

/// Re-enables a disabled account.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the account is enabled.
pub fn enable_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "enable_user")?;
    let before: UserData = load_user(persistence, user_id)?;
    if !before.is_disabled {
        return Err(conflict("User", format!("{} is not disabled", before.email)));
    }

    persistence.enable_user(user_id)?;
    let after: UserData = load_user(persistence, user_id)?;
    let roles: Vec<String> = persistence.get_user_roles(user_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("EnableUser"), None),
        AuditTarget::new("user", user_id),
        user_snapshot(&before, &roles),
        user_snapshot(&after, &roles),
    )?;

    user_info(persistence, actor, after)
}

/// Sets a new password for an account and ends its sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the password violates
/// the password policy.
pub fn reset_password(
    persistence: &mut Persistence,
    user_id: i64,
    request: &ResetPasswordRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(actor, "reset_password")?;
    let user: UserData = load_user(persistence, user_id)?;

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &user.email,
        &user.display_name,
    )?;

    persistence.update_password(user_id, &request.new_password)?;
    let ended: usize = persistence.delete_sessions_for_user(user_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("ResetPassword"),
            Some(format!("Reset password for {}", user.email)),
        ),
        AuditTarget::new("user", user_id),
        StateSnapshot::new(String::from("password=previous")),
        StateSnapshot::new(format!("password=reset,sessions_ended={ended}")),
    )?;

    Ok(MessageResponse {
        message: format!("Password reset for {}", user.email),
    })
}

/// Permanently deletes an account with no history.
///
/// Accounts with bookings or audit history must be disabled instead.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets themselves,
/// targets the last enabled admin, or the account has history.
pub fn delete_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_admin(actor, "delete_user")?;
    if user_id == actor.user_id {
        return Err(rule_violation(
            "not_self",
            String::from("You cannot delete your own account"),
        ));
    }

    let user: UserData = load_user(persistence, user_id)?;
    let roles: Vec<String> = persistence.get_user_roles(user_id)?;
    if is_last_enabled_admin(persistence, &user, &roles)? {
        return Err(rule_violation(
            "last_admin",
            String::from("The last enabled admin cannot be deleted"),
        ));
    }

    let booking_count: i64 = persistence.count_bookings_for_user(user_id)?;
    if booking_count > 0 {
        return Err(conflict(
            "User",
            format!(
                "{} has {booking_count} booking(s); disable the account instead",
                user.email
            ),
        ));
    }
    if persistence.count_deliveries_for_user(user_id)? > 0 {
        return Err(conflict(
            "User",
            format!(
                "{} has notification history; disable the account instead",
                user.email
            ),
        ));
    }
    if persistence.is_user_referenced_by_audit(user_id)? {
        return Err(conflict(
            "User",
            format!(
                "{} appears in the audit trail; disable the account instead",
                user.email
            ),
        ));
    }

    persistence.delete_user(user_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("DeleteUser"),
            Some(format!("Deleted {}", user.email)),
        ),
        AuditTarget::new("user", user_id),
        user_snapshot(&user, &roles),
        StateSnapshot::absent(),
    )?;

    warn!(user_id, "User deleted");
    Ok(())
}
