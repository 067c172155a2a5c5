// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use marquee_audit::Actor;
use marquee_domain::{
    Email, ROLE_ADMIN, ROLE_CUSTOMER, ROLE_MANAGER, format_timestamp, parse_timestamp,
    validate_display_name, validate_phone,
};
use marquee_persistence::{NewUser, Persistence, PersistenceError, SessionData, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::error::{ApiError, AuthError};
use crate::password_policy::PasswordPolicy;

/// Account roles for authorization.
///
/// A user may hold several roles; the effective role is the highest.
/// Declaration order is privilege order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Buys tickets and manages their own bookings.
    Customer,
    /// Theatre staff: catalog, schedule, bookings and notifications.
    Manager,
    /// Full back-office access, including accounts and venue setup.
    Admin,
}

impl Role {
    /// Parses a stored role name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_MANAGER => Some(Self::Manager),
            ROLE_CUSTOMER => Some(Self::Customer),
            _ => None,
        }
    }

    /// Returns the stored role name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Manager => ROLE_MANAGER,
            Self::Customer => ROLE_CUSTOMER,
        }
    }
}

/// An authenticated user with their roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's canonical identifier.
    pub user_id: i64,
    /// The user's normalized email, used as the login.
    pub email: String,
    /// Roles held, highest first.
    pub roles: Vec<Role>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// Unknown role names are ignored.
    #[must_use]
    pub fn new(user_id: i64, email: String, role_names: &[String]) -> Self {
        let mut roles: Vec<Role> = role_names
            .iter()
            .filter_map(|name| Role::from_name(name))
            .collect();
        roles.sort_unstable();
        roles.dedup();
        roles.reverse();
        Self {
            user_id,
            email,
            roles,
        }
    }

    /// Returns the highest role held, if any.
    #[must_use]
    pub fn effective_role(&self) -> Option<Role> {
        self.roles.first().copied()
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Returns whether the actor is admin or manager.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.has_role(Role::Manager)
    }

    /// Converts this actor into an audit actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::with_user(self.user_id, self.email.clone())
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the Admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            })
        }
    }

    /// Requires the Admin or Manager role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither admin nor manager.
    pub fn require_staff(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_staff() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Manager"),
            })
        }
    }

    /// Requires the actor to be the owning user, or staff.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is another customer.
    pub fn require_self_or_staff(
        actor: &AuthenticatedActor,
        owner_user_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.user_id == owner_user_id || actor.is_staff() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Manager"),
            })
        }
    }
}

/// A session created by a successful login.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub session_token: String,
    /// Token the client must echo in `X-CSRF-Token` on cookie-authenticated writes.
    pub csrf_token: String,
    pub expires_at: String,
    pub actor: AuthenticatedActor,
    pub user: UserData,
}

/// Fields for a new account, before validation.
#[derive(Debug, Clone, Copy)]
pub struct AccountFields<'a> {
    pub email: &'a str,
    pub display_name: &'a str,
    pub phone: Option<&'a str>,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Sessions expire after seven days without activity.
    pub const SESSION_LIFETIME: Duration = Duration::days(7);

    /// Validates and creates an account holding `roles`.
    ///
    /// Used for self-registration, admin-created accounts and bootstrap.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email, display name or phone is invalid
    /// - The password violates the password policy
    /// - The email is already registered
    pub fn register(
        persistence: &mut Persistence,
        fields: AccountFields<'_>,
        roles: &[&str],
    ) -> Result<UserData, ApiError> {
        let email: Email = Email::parse(fields.email)?;
        let display_name: &str = fields.display_name.trim();
        validate_display_name(display_name)?;
        let phone: Option<&str> = fields.phone.map(str::trim).filter(|p| !p.is_empty());
        if let Some(phone) = phone {
            validate_phone(phone)?;
        }

        PasswordPolicy::default().validate(
            fields.password,
            fields.password_confirmation,
            email.value(),
            display_name,
        )?;

        let user_id: i64 = persistence
            .create_user(&NewUser {
                email: email.value(),
                display_name,
                phone,
                password: fields.password,
                roles,
            })
            .map_err(|e| match e {
                PersistenceError::UniqueViolation(_) => ApiError::Conflict {
                    resource_type: String::from("User"),
                    message: format!("An account for {email} already exists"),
                },
                other => ApiError::from(other),
            })?;

        info!(user_id, email = %email, ?roles, "Account created");

        persistence
            .get_user_by_id(user_id)?
            .ok_or_else(|| ApiError::Internal {
                message: format!("User {user_id} not found after creation"),
            })
    }

    /// Authenticates a user by email and password and creates a session.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the account is
    /// disabled, or the database fails.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
    ) -> Result<EstablishedSession, AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        };

        let user: UserData = persistence
            .get_user_by_email(email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(invalid)?;

        let password_valid: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_valid {
            warn!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(invalid());
        }

        if user.is_disabled {
            warn!(user_id = user.user_id, "Login rejected: account disabled");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let roles: Vec<String> = persistence
            .get_user_roles(user.user_id)
            .map_err(Self::map_persistence_error)?;

        let session_token: String = Self::generate_token();
        let csrf_token: String = Self::generate_token();
        let expires_at: String = Self::expiry_from(OffsetDateTime::now_utc())?;

        persistence
            .create_session(&session_token, &csrf_token, user.user_id, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, "User logged in");

        Ok(EstablishedSession {
            session_token,
            csrf_token,
            expires_at,
            actor: AuthenticatedActor::new(user.user_id, user.email.clone(), &roles),
            user,
        })
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// A valid session slides: its expiry moves to seven days from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the user
    /// is missing or disabled.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, UserData, SessionData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;
        if now >= expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;
        if user.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let roles: Vec<String> = persistence
            .get_user_roles(user.user_id)
            .map_err(Self::map_persistence_error)?;

        persistence
            .update_session_activity(session.session_id, &Self::expiry_from(now)?)
            .map_err(Self::map_persistence_error)?;

        Ok((
            AuthenticatedActor::new(user.user_id, user.email.clone(), &roles),
            user,
            session,
        ))
    }

    /// Logs out by deleting the session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    /// Generates a 256-bit random token as lowercase hex.
    #[must_use]
    pub fn generate_token() -> String {
        format!(
            "{:016x}{:016x}{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>(),
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn expiry_from(now: OffsetDateTime) -> Result<String, AuthError> {
        format_timestamp(now + Self::SESSION_LIFETIME).map_err(|e| {
            AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            }
        })
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
