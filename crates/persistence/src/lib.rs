// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Marquee ticketing system.
//!
//! This crate stores users, the movie catalog, venues, shows, bookings,
//! notification campaigns, operational logs and audit events. It is built
//! on Diesel and supports two database backends.
//!
//! ## Database Backend Support
//!
//! - **`SQLite`** (default): local development, unit tests and integration tests
//! - **`PostgreSQL`**: hosted deployments, behind the `postgres` feature
//!
//! `Persistence::connect` picks the backend from the database URL, so the
//! server never needs to know which one it is talking to.
//!
//! To run the `PostgreSQL` validation tests:
//! ```bash
//! cargo xtask test-postgres
//! ```
//!
//! ### Migration Strategy
//!
//! SQL syntax differs between backends, so there are two migration
//! directories:
//!
//! - `migrations/`: `SQLite`
//! - `migrations_postgres/`: `PostgreSQL`
//!
//! Both produce identical schema semantics. `cargo xtask verify-migrations`
//! checks that they stay in step.
//!
//! ## Testing
//!
//! - Standard tests (`cargo test`) run against in-memory `SQLite` only
//! - Backend validation tests are marked `#[ignore]` and orchestrated by `xtask`

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use marquee_audit::AuditEvent;
use num_traits::ToPrimitive;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::info;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so tests
/// never share a database.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 100;
/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Macro to generate monomorphic backend-specific query/mutation functions.
///
/// This macro generates one function per backend from a single body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_postgres` taking `&mut PgConnection`, compiled only
///   with the `postgres` feature
///
/// Diesel needs concrete backend types at compile time, so a generic
/// function over the connection type is not an option.
///
/// # Constraints
///
/// - The macro only duplicates function bodies and substitutes connection types
/// - Backend dispatch happens exclusively in the `Persistence` adapter
///
/// # Usage
///
/// ```ignore
/// backend_fn! {
///     pub fn get_movie(conn: &mut _, movie_id: i64) -> Result<Option<MovieData>, PersistenceError> {
///         // Diesel DSL body
///     }
/// }
/// ```
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            #[cfg(feature = "postgres")]
            $(#[$meta])*
            $vis fn [<$name _postgres>] (
                $conn: &mut PgConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

/// Routes a call to the `_sqlite` or `_postgres` variant of a function
/// generated by `backend_fn!`.
macro_rules! dispatch {
    ($self:ident, $($module:ident)::+, $func:ident $(, $arg:expr)* $(,)?) => {
        pastey::paste! {
            match &mut $self.conn {
                BackendConnection::Sqlite(conn) => $($module)::+ :: [<$func _sqlite>](conn $(, $arg)*),
                #[cfg(feature = "postgres")]
                BackendConnection::Postgres(conn) => $($module)::+ :: [<$func _postgres>](conn $(, $arg)*),
            }
        }
    };
}

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AppLogData, AuditFilter, BookingData, BookingFilter, CampaignData, CategoryData, DeliveryData,
    LogFilter, MovieData, MovieFilter, MovieInput, NewBooking, NewCampaign, NewDelivery, NewTicket,
    NewUser, NotificationTemplateData, PricingTierData, SeatTemplateData, SessionData, ShowData,
    ShowFilter, ShowInput, TheatreData, TheatreInput, TheatrePriceData, TicketData, UserData,
    UserFilter,
};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// The current time as a stored timestamp.
pub(crate) fn now_timestamp() -> Result<String, PersistenceError> {
    Ok(marquee_domain::format_timestamp(OffsetDateTime::now_utc())?)
}

/// Clamps a requested page size to `1..=MAX_PAGE_SIZE`.
pub(crate) fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Applies `offset` and `limit` to rows that were filtered in memory.
pub(crate) fn paginate<T>(
    rows: impl Iterator<Item = T>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Vec<T> {
    let skip: usize = offset.and_then(|o| o.max(0).to_usize()).unwrap_or(0);
    let take: usize = page_limit(limit).to_usize().unwrap_or(usize::MAX);
    rows.skip(skip).take(take).collect()
}

/// Backend-specific database connection.
pub enum BackendConnection {
    Sqlite(SqliteConnection),
    #[cfg(feature = "postgres")]
    Postgres(PgConnection),
}

/// Persistence adapter for the whole application.
///
/// Backend selection happens once at construction time and is transparent
/// to callers.
pub struct Persistence {
    pub(crate) conn: BackendConnection,
}

impl Persistence {
    /// Opens the database named by a URL.
    ///
    /// - `postgres://` and `postgresql://` URLs open `PostgreSQL`
    /// - `:memory:` opens a fresh in-memory `SQLite` database
    /// - anything else is a `SQLite` file path, with an optional `sqlite://` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized, or
    /// if a `PostgreSQL` URL is given to a build without the `postgres` feature.
    pub fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            #[cfg(feature = "postgres")]
            {
                info!("Opening PostgreSQL database");
                return Self::new_with_postgres(database_url);
            }
            #[cfg(not(feature = "postgres"))]
            {
                return Err(PersistenceError::InitializationError(String::from(
                    "PostgreSQL URL given but this build lacks the `postgres` feature",
                )));
            }
        }

        if database_url == ":memory:" {
            info!("Opening in-memory SQLite database");
            return Self::new_in_memory();
        }

        let path: &str = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url);
        info!(path, "Opening SQLite database");
        Self::new_with_file(path)
    }

    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:marquee_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a `PostgreSQL` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    #[cfg(feature = "postgres")]
    pub fn new_with_postgres(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: PgConnection = backend::postgres::initialize_database(database_url)?;
        backend::postgres::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Postgres(conn),
        })
    }

    /// Returns the name of the active backend.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match &self.conn {
            BackendConnection::Sqlite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            BackendConnection::Postgres(_) => "postgres",
        }
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.verify_foreign_key_enforcement(),
            #[cfg(feature = "postgres")]
            BackendConnection::Postgres(conn) => conn.verify_foreign_key_enforcement(),
        }
    }

    // ========================================================================
    // Users & Roles
    // ========================================================================

    /// Creates a user and grants roles.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the email is taken, or an error if a role
    /// does not exist or the insert fails.
    pub fn create_user(&mut self, new_user: &NewUser<'_>) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::users, create_user, new_user)
    }

    /// Retrieves a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserData>, PersistenceError> {
        dispatch!(self, queries::users, get_user_by_email, email)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        dispatch!(self, queries::users, get_user_by_id, user_id)
    }

    /// Retrieves several users by ID. Missing IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_users_by_ids(&mut self, user_ids: &[i64]) -> Result<Vec<UserData>, PersistenceError> {
        dispatch!(self, queries::users, get_users_by_ids, user_ids)
    }

    /// Lists users matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_users(&mut self, filter: &UserFilter) -> Result<Vec<UserData>, PersistenceError> {
        dispatch!(self, queries::users, list_users, filter)
    }

    /// Updates a user's display name and phone.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn update_user_profile(
        &mut self,
        user_id: i64,
        display_name: &str,
        phone: Option<&str>,
    ) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, update_user_profile, user_id, display_name, phone)
    }

    /// Replaces a user's roles.
    ///
    /// # Errors
    ///
    /// Returns an error if a role does not exist or the update fails.
    pub fn set_user_roles(&mut self, user_id: i64, role_names: &[&str]) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, set_user_roles, user_id, role_names)
    }

    /// Lists the role names held by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_roles(&mut self, user_id: i64) -> Result<Vec<String>, PersistenceError> {
        dispatch!(self, queries::users, get_user_roles, user_id)
    }

    /// Disables a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn disable_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, disable_user, user_id)
    }

    /// Re-enables a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn enable_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, enable_user, user_id)
    }

    /// Deletes a user account together with its roles and sessions.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyViolation` if other rows still reference the user.
    pub fn delete_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, delete_user, user_id)
    }

    /// Replaces a user's password. The password is hashed before storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn update_password(&mut self, user_id: i64, new_password: &str) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, update_password, user_id, new_password)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, update_last_login, user_id)
    }

    /// Counts users holding a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_users_with_role(&mut self, role: &str, enabled_only: bool) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::users, count_users_with_role, role, enabled_only)
    }

    /// Lists the IDs of enabled users holding a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_user_ids_with_role(&mut self, role: &str) -> Result<Vec<i64>, PersistenceError> {
        dispatch!(self, queries::users, list_user_ids_with_role, role)
    }

    /// Counts the bookings a user has made.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_bookings_for_user(&mut self, user_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::users, count_bookings_for_user, user_id)
    }

    /// Counts the notification deliveries addressed to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_deliveries_for_user(&mut self, user_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::users, count_deliveries_for_user, user_id)
    }

    /// Checks if a user appears as the actor of any audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_user_referenced_by_audit(&mut self, user_id: i64) -> Result<bool, PersistenceError> {
        dispatch!(self, queries::users, is_user_referenced_by_audit, user_id)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        csrf_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::users, create_session, session_token, csrf_token, user_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(&mut self, session_token: &str) -> Result<Option<SessionData>, PersistenceError> {
        dispatch!(self, queries::users, get_session_by_token, session_token)
    }

    /// Records session activity and slides its expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64, expires_at: &str) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, update_session_activity, session_id, expires_at)
    }

    /// Deletes a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::users, delete_session, session_token)
    }

    /// Deletes every session of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        dispatch!(self, mutations::users, delete_sessions_for_user, user_id)
    }

    /// Deletes sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        dispatch!(self, mutations::users, delete_expired_sessions, now)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the name or slug is taken.
    pub fn create_category(&mut self, name: &str, slug: &str) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::catalog, create_category, name, slug)
    }

    /// Lists all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_categories(&mut self) -> Result<Vec<CategoryData>, PersistenceError> {
        dispatch!(self, queries::catalog, list_categories)
    }

    /// Deletes a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist.
    pub fn delete_category(&mut self, category_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::catalog, delete_category, category_id)
    }

    /// Creates a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_movie(&mut self, input: &MovieInput<'_>) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::catalog, create_movie, input)
    }

    /// Replaces a movie's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the movie does not exist or the update fails.
    pub fn update_movie(&mut self, movie_id: i64, input: &MovieInput<'_>) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::catalog, update_movie, movie_id, input)
    }

    /// Sets a movie's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the movie does not exist or the update fails.
    pub fn set_movie_status(&mut self, movie_id: i64, status: &str) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::catalog, set_movie_status, movie_id, status)
    }

    /// Retrieves a movie by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_movie(&mut self, movie_id: i64) -> Result<Option<MovieData>, PersistenceError> {
        dispatch!(self, queries::catalog, get_movie, movie_id)
    }

    /// Lists movies matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_movies(&mut self, filter: &MovieFilter) -> Result<Vec<MovieData>, PersistenceError> {
        dispatch!(self, queries::catalog, list_movies, filter)
    }

    /// Deletes a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the movie does not exist or shows reference it.
    pub fn delete_movie(&mut self, movie_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::catalog, delete_movie, movie_id)
    }

    /// Counts the shows of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_shows_for_movie(&mut self, movie_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::catalog, count_shows_for_movie, movie_id)
    }

    /// Replaces the categories assigned to a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if a category does not exist.
    pub fn set_movie_categories(&mut self, movie_id: i64, category_ids: &[i64]) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::catalog, set_movie_categories, movie_id, category_ids)
    }

    /// Lists the categories of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_movie_categories(&mut self, movie_id: i64) -> Result<Vec<CategoryData>, PersistenceError> {
        dispatch!(self, queries::catalog, get_movie_categories, movie_id)
    }

    // ========================================================================
    // Theatres, Pricing Tiers & Seat Templates
    // ========================================================================

    /// Creates a theatre.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the name is taken.
    pub fn create_theatre(&mut self, input: &TheatreInput<'_>) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::venues, create_theatre, input)
    }

    /// Replaces a theatre's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the theatre does not exist or the update fails.
    pub fn update_theatre(&mut self, theatre_id: i64, input: &TheatreInput<'_>) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, update_theatre, theatre_id, input)
    }

    /// Retrieves a theatre by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_theatre(&mut self, theatre_id: i64) -> Result<Option<TheatreData>, PersistenceError> {
        dispatch!(self, queries::venues, get_theatre, theatre_id)
    }

    /// Lists theatres.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_theatres(&mut self, include_inactive: bool) -> Result<Vec<TheatreData>, PersistenceError> {
        dispatch!(self, queries::venues, list_theatres, include_inactive)
    }

    /// Deletes a theatre.
    ///
    /// # Errors
    ///
    /// Returns an error if the theatre does not exist or shows reference it.
    pub fn delete_theatre(&mut self, theatre_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, delete_theatre, theatre_id)
    }

    /// Counts the shows at a theatre.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_shows_at_theatre(&mut self, theatre_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::venues, count_shows_at_theatre, theatre_id)
    }

    /// Sets a theatre's price for a tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the theatre or tier does not exist.
    pub fn set_theatre_price(&mut self, theatre_id: i64, tier_id: i64, price_cents: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, set_theatre_price, theatre_id, tier_id, price_cents)
    }

    /// Removes a theatre's price override for a tier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no override exists.
    pub fn remove_theatre_price(&mut self, theatre_id: i64, tier_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, remove_theatre_price, theatre_id, tier_id)
    }

    /// Lists a theatre's price overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_theatre_pricing(&mut self, theatre_id: i64) -> Result<Vec<TheatrePriceData>, PersistenceError> {
        dispatch!(self, queries::venues, list_theatre_pricing, theatre_id)
    }

    /// Creates a pricing tier.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the code is taken.
    pub fn create_pricing_tier(
        &mut self,
        code: &str,
        name: &str,
        base_price_cents: i64,
        description: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::venues, create_pricing_tier, code, name, base_price_cents, description)
    }

    /// Updates a pricing tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the tier does not exist or the update fails.
    pub fn update_pricing_tier(
        &mut self,
        tier_id: i64,
        name: &str,
        base_price_cents: i64,
        description: Option<&str>,
    ) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, update_pricing_tier, tier_id, name, base_price_cents, description)
    }

    /// Retrieves a pricing tier by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_pricing_tier(&mut self, tier_id: i64) -> Result<Option<PricingTierData>, PersistenceError> {
        dispatch!(self, queries::venues, get_pricing_tier, tier_id)
    }

    /// Lists all pricing tiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pricing_tiers(&mut self) -> Result<Vec<PricingTierData>, PersistenceError> {
        dispatch!(self, queries::venues, list_pricing_tiers)
    }

    /// Deletes a pricing tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the tier does not exist.
    pub fn delete_pricing_tier(&mut self, tier_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, delete_pricing_tier, tier_id)
    }

    /// Creates a seat template.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the name is taken.
    pub fn create_seat_template(&mut self, name: &str, layout_json: &str, seat_count: i32) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::venues, create_seat_template, name, layout_json, seat_count)
    }

    /// Replaces a seat template's name and layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or the update fails.
    pub fn update_seat_template(
        &mut self,
        seat_template_id: i64,
        name: &str,
        layout_json: &str,
        seat_count: i32,
    ) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, update_seat_template, seat_template_id, name, layout_json, seat_count)
    }

    /// Retrieves a seat template by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_seat_template(&mut self, seat_template_id: i64) -> Result<Option<SeatTemplateData>, PersistenceError> {
        dispatch!(self, queries::venues, get_seat_template, seat_template_id)
    }

    /// Lists all seat templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_seat_templates(&mut self) -> Result<Vec<SeatTemplateData>, PersistenceError> {
        dispatch!(self, queries::venues, list_seat_templates)
    }

    /// Deletes a seat template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or shows use it.
    pub fn delete_seat_template(&mut self, seat_template_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::venues, delete_seat_template, seat_template_id)
    }

    /// Counts the shows that use a seat template.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_shows_using_template(&mut self, seat_template_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::venues, count_shows_using_template, seat_template_id)
    }

    // ========================================================================
    // Shows
    // ========================================================================

    /// Creates a show.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced row does not exist or the insert fails.
    pub fn create_show(&mut self, input: &ShowInput<'_>) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::shows, create_show, input)
    }

    /// Replaces a show's schedule fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the show does not exist or the update fails.
    pub fn update_show(&mut self, show_id: i64, input: &ShowInput<'_>) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::shows, update_show, show_id, input)
    }

    /// Sets a show's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the show does not exist or the update fails.
    pub fn set_show_status(&mut self, show_id: i64, status: &str) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::shows, set_show_status, show_id, status)
    }

    /// Cancels a show and its confirmed bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the show does not exist or an update fails.
    pub fn cancel_show(&mut self, show_id: i64) -> Result<usize, PersistenceError> {
        dispatch!(self, mutations::shows, cancel_show, show_id)
    }

    /// Retrieves a show by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_show(&mut self, show_id: i64) -> Result<Option<ShowData>, PersistenceError> {
        dispatch!(self, queries::shows, get_show, show_id)
    }

    /// Lists shows matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_shows(&mut self, filter: &ShowFilter) -> Result<Vec<ShowData>, PersistenceError> {
        dispatch!(self, queries::shows, list_shows, filter)
    }

    /// Lists the non-cancelled shows on one screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_shows_on_screen(
        &mut self,
        theatre_id: i64,
        screen: i32,
        exclude_show_id: Option<i64>,
    ) -> Result<Vec<ShowData>, PersistenceError> {
        dispatch!(self, queries::shows, list_shows_on_screen, theatre_id, screen, exclude_show_id)
    }

    /// Deletes a show.
    ///
    /// # Errors
    ///
    /// Returns an error if the show does not exist or tickets reference it.
    pub fn delete_show(&mut self, show_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::shows, delete_show, show_id)
    }

    /// Counts the tickets ever issued for a show.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_tickets_for_show(&mut self, show_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::shows, count_tickets_for_show, show_id)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Creates a booking and its tickets in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `SeatUnavailable` if a seat is already held, `UniqueViolation`
    /// if the reference is taken, or an error if the insert fails.
    pub fn create_booking_with_tickets(&mut self, booking: &NewBooking) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::bookings, create_booking_with_tickets, booking)
    }

    /// Retrieves a booking by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Option<BookingData>, PersistenceError> {
        dispatch!(self, queries::bookings, get_booking, booking_id)
    }

    /// Retrieves a booking by reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking_by_reference(&mut self, booking_reference: &str) -> Result<Option<BookingData>, PersistenceError> {
        dispatch!(self, queries::bookings, get_booking_by_reference, booking_reference)
    }

    /// Lists bookings matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings(&mut self, filter: &BookingFilter) -> Result<Vec<BookingData>, PersistenceError> {
        dispatch!(self, queries::bookings, list_bookings, filter)
    }

    /// Lists the tickets of a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tickets_for_booking(&mut self, booking_id: i64) -> Result<Vec<TicketData>, PersistenceError> {
        dispatch!(self, queries::bookings, list_tickets_for_booking, booking_id)
    }

    /// Lists the seats held by active tickets for a show.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sold_seats(&mut self, show_id: i64) -> Result<Vec<String>, PersistenceError> {
        dispatch!(self, queries::bookings, list_sold_seats, show_id)
    }

    /// Cancels a confirmed booking and its tickets.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no confirmed booking has that ID.
    pub fn cancel_booking(&mut self, booking_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::bookings, cancel_booking, booking_id)
    }

    /// Returns the theatre of a user's most recent confirmed booking for a
    /// movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn latest_booked_theatre_name(
        &mut self,
        user_id: i64,
        movie_id: i64,
    ) -> Result<Option<String>, PersistenceError> {
        dispatch!(self, queries::bookings, latest_booked_theatre_name, user_id, movie_id)
    }

    /// Lists the users holding a confirmed booking for a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_user_ids_who_booked_movie(&mut self, movie_id: i64) -> Result<Vec<i64>, PersistenceError> {
        dispatch!(self, queries::bookings, list_user_ids_who_booked_movie, movie_id)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Creates a notification template.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the name is taken.
    pub fn create_template(&mut self, name: &str, channel: &str, subject: &str, body: &str) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::notifications, create_template, name, channel, subject, body)
    }

    /// Replaces a notification template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or the update fails.
    pub fn update_template(
        &mut self,
        template_id: i64,
        name: &str,
        channel: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::notifications, update_template, template_id, name, channel, subject, body)
    }

    /// Deletes a notification template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or campaigns use it.
    pub fn delete_template(&mut self, template_id: i64) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::notifications, delete_template, template_id)
    }

    /// Retrieves a notification template by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_template(&mut self, template_id: i64) -> Result<Option<NotificationTemplateData>, PersistenceError> {
        dispatch!(self, queries::notifications, get_template, template_id)
    }

    /// Lists notification templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_templates(&mut self) -> Result<Vec<NotificationTemplateData>, PersistenceError> {
        dispatch!(self, queries::notifications, list_templates)
    }

    /// Counts the campaigns that use a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_campaigns_using_template(&mut self, template_id: i64) -> Result<i64, PersistenceError> {
        dispatch!(self, queries::notifications, count_campaigns_using_template, template_id)
    }

    /// Creates a draft campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or creator does not exist.
    pub fn create_campaign(&mut self, campaign: &NewCampaign<'_>) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::notifications, create_campaign, campaign)
    }

    /// Retrieves a campaign by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_campaign(&mut self, campaign_id: i64) -> Result<Option<CampaignData>, PersistenceError> {
        dispatch!(self, queries::notifications, get_campaign, campaign_id)
    }

    /// Lists campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_campaigns(&mut self, status: Option<&str>, limit: Option<i64>) -> Result<Vec<CampaignData>, PersistenceError> {
        dispatch!(self, queries::notifications, list_campaigns, status, limit)
    }

    /// Moves a campaign between statuses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the campaign is not in `expected_status`.
    pub fn update_campaign_status(
        &mut self,
        campaign_id: i64,
        expected_status: &str,
        status: &str,
    ) -> Result<(), PersistenceError> {
        dispatch!(self, mutations::notifications, update_campaign_status, campaign_id, expected_status, status)
    }

    /// Records a campaign's deliveries and marks it sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign is not a draft or an insert fails.
    pub fn record_deliveries(&mut self, campaign_id: i64, deliveries: &[NewDelivery]) -> Result<usize, PersistenceError> {
        dispatch!(self, mutations::notifications, record_deliveries, campaign_id, deliveries)
    }

    /// Lists the deliveries of a campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_deliveries(
        &mut self,
        campaign_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<DeliveryData>, PersistenceError> {
        dispatch!(self, queries::notifications, list_deliveries, campaign_id, limit, offset)
    }

    // ========================================================================
    // Operational Logs & Audit
    // ========================================================================

    /// Appends an operational log entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_log(
        &mut self,
        level: &str,
        source: &str,
        message: &str,
        context: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::operations, insert_log, level, source, message, context)
    }

    /// Lists operational log entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_logs(&mut self, filter: &LogFilter) -> Result<Vec<AppLogData>, PersistenceError> {
        dispatch!(self, queries::operations, list_logs, filter)
    }

    /// Deletes log entries created before a timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn purge_logs_before(&mut self, before: &str) -> Result<usize, PersistenceError> {
        dispatch!(self, mutations::operations, purge_logs_before, before)
    }

    /// Persists an audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        dispatch!(self, mutations::operations, persist_audit_event, event)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        dispatch!(self, queries::operations, get_audit_event, event_id)
    }

    /// Lists audit events matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_audit_events(&mut self, filter: &AuditFilter) -> Result<Vec<AuditEvent>, PersistenceError> {
        dispatch!(self, queries::operations, list_audit_events, filter)
    }
}
