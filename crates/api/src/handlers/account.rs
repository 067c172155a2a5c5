// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sign-up, sign-in and self-service account handlers.
//!
//! Self-service changes are logged but not audited; the audit trail
//! records administrative actions only.

use marquee_audit::{Action, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{ROLE_ADMIN, ROLE_CUSTOMER, validate_display_name, validate_phone};
use marquee_persistence::{Persistence, UserData};
use tracing::info;

use super::{conflict, load_user, non_blank, record_audit, user_snapshot};
use crate::auth::{AccountFields, AuthenticatedActor, AuthenticationService, EstablishedSession};
use crate::capabilities::compute_global_capabilities;
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    BootstrapAdminRequest, BootstrapStatusResponse, ChangePasswordRequest, LoginRequest,
    LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, UpdateProfileRequest,
    WhoAmIResponse,
};

/// Creates a customer account for a visitor.
///
/// # Errors
///
/// Returns an error if:
/// - The email, display name or phone is invalid
/// - The password violates the password policy
/// - The email is already registered
pub fn register(
    persistence: &mut Persistence,
    request: &RegisterRequest,
) -> Result<RegisterResponse, ApiError> {
    let user: UserData = AuthenticationService::register(
        persistence,
        AccountFields {
            email: &request.email,
            display_name: &request.display_name,
            phone: request.phone.as_deref(),
            password: &request.password,
            password_confirmation: &request.password_confirmation,
        },
        &[ROLE_CUSTOMER],
    )?;

    Ok(RegisterResponse {
        user_id: user.user_id,
        email: user.email,
        display_name: user.display_name,
        message: String::from("Account created"),
    })
}

/// Signs a user in and returns the new session's tokens.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the account is disabled.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let session: EstablishedSession =
        AuthenticationService::login(persistence, request.email.trim(), &request.password)?;

    Ok(LoginResponse {
        session_token: session.session_token,
        csrf_token: session.csrf_token,
        expires_at: session.expires_at,
        user_id: session.user.user_id,
        email: session.user.email,
        display_name: session.user.display_name,
        roles: session
            .actor
            .roles
            .iter()
            .map(|r| r.name().to_string())
            .collect(),
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the database fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the signed-in user and their capabilities.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor, user: &UserData) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: user.user_id,
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        phone: user.phone.clone(),
        roles: actor.roles.iter().map(|r| r.name().to_string()).collect(),
        effective_role: actor.effective_role().map(|r| r.name().to_string()),
        capabilities: compute_global_capabilities(actor),
    }
}

/// Updates the signed-in user's display name and phone number.
///
/// # Errors
///
/// Returns an error if the display name or phone is invalid.
pub fn update_profile(
    persistence: &mut Persistence,
    request: &UpdateProfileRequest,
    actor: &AuthenticatedActor,
) -> Result<WhoAmIResponse, ApiError> {
    let display_name: &str = request.display_name.trim();
    validate_display_name(display_name)?;
    let phone: Option<&str> = non_blank(request.phone.as_deref());
    if let Some(phone) = phone {
        validate_phone(phone)?;
    }

    persistence.update_user_profile(actor.user_id, display_name, phone)?;
    let user: UserData = load_user(persistence, actor.user_id)?;
    info!(user_id = actor.user_id, "Profile updated");

    Ok(whoami(actor, &user))
}

/// Changes the signed-in user's password.
///
/// Every session of the user is ended, including the current one.
///
/// # Errors
///
/// Returns an error if the current password is wrong or the new password
/// violates the password policy.
pub fn change_password(
    persistence: &mut Persistence,
    request: &ChangePasswordRequest,
    actor: &AuthenticatedActor,
) -> Result<MessageResponse, ApiError> {
    let user: UserData = load_user(persistence, actor.user_id)?;

    if !persistence.verify_password(&request.current_password, &user.password_hash)? {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &user.email,
        &user.display_name,
    )?;

    persistence.update_password(user.user_id, &request.new_password)?;
    let ended: usize = persistence.delete_sessions_for_user(user.user_id)?;
    info!(user_id = user.user_id, sessions_ended = ended, "Password changed");

    Ok(MessageResponse {
        message: String::from("Password changed. Please sign in again."),
    })
}

/// Reports whether the first admin account still needs to be created.
///
/// # Errors
///
/// Returns an error if the database fails.
pub fn bootstrap_status(persistence: &mut Persistence) -> Result<BootstrapStatusResponse, ApiError> {
    Ok(BootstrapStatusResponse {
        needs_bootstrap: persistence.count_users_with_role(ROLE_ADMIN, false)? == 0,
    })
}

/// Creates the first admin account.
///
/// Only permitted while no admin account exists, enabled or not.
///
/// # Errors
///
/// Returns an error if an admin already exists or the account is invalid.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    request: &BootstrapAdminRequest,
    cause: Cause,
) -> Result<RegisterResponse, ApiError> {
    if persistence.count_users_with_role(ROLE_ADMIN, false)? > 0 {
        return Err(conflict(
            "Bootstrap",
            String::from("An admin account already exists"),
        ));
    }

    let user: UserData = AuthenticationService::register(
        persistence,
        AccountFields {
            email: &request.email,
            display_name: &request.display_name,
            phone: None,
            password: &request.password,
            password_confirmation: &request.password_confirmation,
        },
        &[ROLE_ADMIN],
    )?;

    let roles: Vec<String> = vec![String::from(ROLE_ADMIN)];
    let actor: AuthenticatedActor =
        AuthenticatedActor::new(user.user_id, user.email.clone(), &roles);
    record_audit(
        persistence,
        &actor,
        cause,
        Action::new(
            String::from("BootstrapAdmin"),
            Some(format!("Created first admin {}", user.email)),
        ),
        AuditTarget::new("user", user.user_id),
        StateSnapshot::absent(),
        user_snapshot(&user, &roles),
    )?;

    info!(user_id = user.user_id, "Bootstrap admin created");

    Ok(RegisterResponse {
        user_id: user.user_id,
        email: user.email,
        display_name: user.display_name,
        message: String::from("Admin account created"),
    })
}
