// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for registration, sessions, profiles and bootstrap.

use marquee_domain::ROLE_CUSTOMER;
use marquee_persistence::Persistence;

use crate::tests::helpers::{
    TEST_PASSWORD, create_admin, create_customer, create_test_cause, create_test_persistence,
};
use crate::{
    ApiError, AuthenticationService, BootstrapAdminRequest, ChangePasswordRequest, LoginRequest,
    LoginResponse, RegisterRequest, UpdateProfileRequest, bootstrap_admin, bootstrap_status,
    change_password, login, logout, register, update_profile, whoami,
};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        display_name: String::from("Film Fan"),
        phone: Some(String::from("+1 555 010 2030")),
        password: String::from("Popcorn-Night-42"),
        password_confirmation: String::from("Popcorn-Night-42"),
    }
}

fn login_as(persistence: &mut Persistence, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    login(
        persistence,
        &LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        },
    )
}

#[test]
fn test_register_creates_customer_that_can_log_in() {
    let mut persistence = create_test_persistence();

    let response = register(&mut persistence, &register_request("Fan@Example.com")).unwrap();
    assert_eq!(response.email, "fan@example.com");

    let session = login_as(&mut persistence, "fan@example.com", "Popcorn-Night-42").unwrap();
    assert_eq!(session.user_id, response.user_id);
    assert_eq!(session.roles, vec![String::from(ROLE_CUSTOMER)]);
    assert!(!session.session_token.is_empty());
    assert_ne!(session.session_token, session.csrf_token);
}

#[test]
fn test_register_duplicate_email_conflicts() {
    let mut persistence = create_test_persistence();
    register(&mut persistence, &register_request("fan@example.com")).unwrap();

    let result = register(&mut persistence, &register_request("FAN@example.com"));

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_register_rejects_weak_password() {
    let mut persistence = create_test_persistence();
    let mut request = register_request("fan@example.com");
    request.password = String::from("short");
    request.password_confirmation = String::from("short");

    let result = register(&mut persistence, &request);

    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
}

#[test]
fn test_register_rejects_invalid_phone() {
    let mut persistence = create_test_persistence();
    let mut request = register_request("fan@example.com");
    request.phone = Some(String::from("call me"));

    let result = register(&mut persistence, &request);

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "phone"),
        other => panic!("Expected InvalidInput for phone, got {other:?}"),
    }
}

#[test]
fn test_login_with_wrong_password_fails() {
    let mut persistence = create_test_persistence();
    create_customer(&mut persistence, "fan@example.com");

    let result = login_as(&mut persistence, "fan@example.com", "not-the-Password-1");

    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_login_unknown_email_fails_the_same_way() {
    let mut persistence = create_test_persistence();

    let result = login_as(&mut persistence, "nobody@example.com", TEST_PASSWORD);

    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence = create_test_persistence();
    create_customer(&mut persistence, "fan@example.com");
    let session = login_as(&mut persistence, "fan@example.com", TEST_PASSWORD).unwrap();

    assert!(AuthenticationService::validate_session(&mut persistence, &session.session_token).is_ok());
    logout(&mut persistence, &session.session_token).unwrap();

    assert!(AuthenticationService::validate_session(&mut persistence, &session.session_token).is_err());
}

#[test]
fn test_whoami_reports_customer_capabilities() {
    let mut persistence = create_test_persistence();
    let actor = create_customer(&mut persistence, "fan@example.com");
    let user = persistence.get_user_by_id(actor.user_id).unwrap().unwrap();

    let response = whoami(&actor, &user);

    assert_eq!(response.effective_role.as_deref(), Some(ROLE_CUSTOMER));
    assert!(response.capabilities.can_book_tickets.is_allowed());
    assert!(!response.capabilities.can_manage_catalog.is_allowed());
    assert!(!response.capabilities.can_view_audit.is_allowed());
}

#[test]
fn test_update_profile_changes_name_and_clears_phone() {
    let mut persistence = create_test_persistence();
    let actor = create_customer(&mut persistence, "fan@example.com");

    let response = update_profile(
        &mut persistence,
        &UpdateProfileRequest {
            display_name: String::from("  Renamed Fan "),
            phone: Some(String::from("   ")),
        },
        &actor,
    )
    .unwrap();

    assert_eq!(response.display_name, "Renamed Fan");
    assert_eq!(response.phone, None);
}

#[test]
fn test_change_password_requires_current_password() {
    let mut persistence = create_test_persistence();
    let actor = create_customer(&mut persistence, "fan@example.com");

    let result = change_password(
        &mut persistence,
        &ChangePasswordRequest {
            current_password: String::from("Wrong-Password-1"),
            new_password: String::from("Brand-New-Pass-7"),
            new_password_confirmation: String::from("Brand-New-Pass-7"),
        },
        &actor,
    );

    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_change_password_ends_sessions_and_accepts_new_password() {
    let mut persistence = create_test_persistence();
    let actor = create_customer(&mut persistence, "fan@example.com");
    let session = login_as(&mut persistence, "fan@example.com", TEST_PASSWORD).unwrap();

    change_password(
        &mut persistence,
        &ChangePasswordRequest {
            current_password: String::from(TEST_PASSWORD),
            new_password: String::from("Brand-New-Pass-7"),
            new_password_confirmation: String::from("Brand-New-Pass-7"),
        },
        &actor,
    )
    .unwrap();

    assert!(AuthenticationService::validate_session(&mut persistence, &session.session_token).is_err());
    assert!(login_as(&mut persistence, "fan@example.com", TEST_PASSWORD).is_err());
    assert!(login_as(&mut persistence, "fan@example.com", "Brand-New-Pass-7").is_ok());
}

#[test]
fn test_change_password_is_not_audited() {
    let mut persistence = create_test_persistence();
    let actor = create_customer(&mut persistence, "fan@example.com");

    change_password(
        &mut persistence,
        &ChangePasswordRequest {
            current_password: String::from(TEST_PASSWORD),
            new_password: String::from("Brand-New-Pass-7"),
            new_password_confirmation: String::from("Brand-New-Pass-7"),
        },
        &actor,
    )
    .unwrap();

    assert!(!persistence.is_user_referenced_by_audit(actor.user_id).unwrap());
}

#[test]
fn test_bootstrap_admin_only_once() {
    let mut persistence = create_test_persistence();
    assert!(bootstrap_status(&mut persistence).unwrap().needs_bootstrap);

    let request = BootstrapAdminRequest {
        email: String::from("owner@example.com"),
        display_name: String::from("Owner"),
        password: String::from("Opening-Night-1"),
        password_confirmation: String::from("Opening-Night-1"),
    };
    let response = bootstrap_admin(&mut persistence, &request, create_test_cause()).unwrap();

    assert!(!bootstrap_status(&mut persistence).unwrap().needs_bootstrap);
    assert!(persistence.is_user_referenced_by_audit(response.user_id).unwrap());

    let again = bootstrap_admin(&mut persistence, &request, create_test_cause());
    assert!(matches!(again, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_bootstrap_refused_when_admin_exists() {
    let mut persistence = create_test_persistence();
    create_admin(&mut persistence);

    let result = bootstrap_admin(
        &mut persistence,
        &BootstrapAdminRequest {
            email: String::from("other@example.com"),
            display_name: String::from("Other"),
            password: String::from("Opening-Night-1"),
            password_confirmation: String::from("Opening-Night-1"),
        },
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}
