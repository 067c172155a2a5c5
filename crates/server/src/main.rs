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

mod error;
mod routes;
mod security;
mod session;

#[cfg(test)]
mod tests;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use clap::Parser;
use marquee_api::record_log;
use marquee_domain::{LogLevel, format_timestamp};
use marquee_persistence::Persistence;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::error::record_server_errors;
use crate::routes::{account, admin, bookings, catalog, notifications, public, venues};
use crate::security::{RateLimits, csrf_guard, rate_limit};

/// Marquee Server - HTTP server for the Marquee ticketing system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database URL: a `SQLite` file path, `:memory:`, or a `postgres://` URL.
    #[arg(short, long, env = "MARQUEE_DATABASE_URL", default_value = "marquee.db")]
    database_url: String,

    /// Address to bind the server to
    #[arg(long, env = "MARQUEE_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "MARQUEE_PORT", default_value_t = 3000)]
    port: u16,

    /// Percentage of unsold seats shown as taken on demo seat maps
    #[arg(
        long,
        env = "MARQUEE_DEMO_OCCUPANCY",
        default_value_t = 30,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    demo_occupancy: u8,

    /// Mark the session cookie `Secure` (serve over HTTPS)
    #[arg(long, env = "MARQUEE_SECURE_COOKIES")]
    secure_cookies: bool,

    /// Requests per minute allowed to each client across the API
    #[arg(long, env = "MARQUEE_API_RATE_PER_MINUTE", default_value_t = 600)]
    api_rate_per_minute: u32,

    /// Sign-in, registration and password attempts per minute per client
    #[arg(long, env = "MARQUEE_AUTH_RATE_PER_MINUTE", default_value_t = 20)]
    auth_rate_per_minute: u32,

    /// Seconds between expired-session sweeps
    #[arg(long, env = "MARQUEE_SESSION_CLEANUP_SECS", default_value_t = 900)]
    session_cleanup_secs: u64,
}

/// Settings handlers read at request time.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Share of unsold seats drawn as taken on seat maps.
    pub demo_occupancy: u8,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
}

/// Application state shared across handlers.
///
/// The single persistence connection sits behind a mutex; every request
/// holds it only for its own database work.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<Mutex<Persistence>>,
    pub rate_limits: Arc<RateLimits>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(persistence: Persistence, rate_limits: RateLimits, config: ServerConfig) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            rate_limits: Arc::new(rate_limits),
            config,
        }
    }
}

/// Builds the application router with all routes and middleware.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(public::handle_healthz))
        // Public catalog and schedule
        .route("/api/movies", get(public::handle_list_movies))
        .route("/api/movies/{movie_id}", get(public::handle_get_movie))
        .route("/api/categories", get(public::handle_list_categories))
        .route("/api/shows", get(public::handle_list_shows))
        .route("/api/shows/{show_id}", get(public::handle_get_show))
        .route("/api/shows/{show_id}/seats", get(public::handle_get_seat_map))
        .route("/api/shows/{show_id}/quote", post(public::handle_quote_seats))
        // Account
        .route("/api/auth/register", post(account::handle_register))
        .route("/api/auth/login", post(account::handle_login))
        .route("/api/auth/logout", post(account::handle_logout))
        .route("/api/auth/whoami", get(account::handle_whoami))
        .route("/api/auth/profile", put(account::handle_update_profile))
        .route("/api/auth/password", post(account::handle_change_password))
        .route(
            "/api/auth/bootstrap",
            get(account::handle_bootstrap_status).post(account::handle_bootstrap_admin),
        )
        // Customer bookings
        .route(
            "/api/bookings",
            get(bookings::handle_list_my_bookings).post(bookings::handle_checkout),
        )
        .route("/api/bookings/{booking_id}", get(bookings::handle_get_booking))
        .route(
            "/api/bookings/{booking_id}/cancel",
            post(bookings::handle_cancel_my_booking),
        )
        // Admin: users
        .route(
            "/api/admin/users",
            get(admin::handle_list_users).post(admin::handle_create_user),
        )
        .route(
            "/api/admin/users/{user_id}",
            get(admin::handle_get_user).delete(admin::handle_delete_user),
        )
        .route(
            "/api/admin/users/{user_id}/roles",
            put(admin::handle_update_user_roles),
        )
        .route(
            "/api/admin/users/{user_id}/disable",
            post(admin::handle_disable_user),
        )
        .route(
            "/api/admin/users/{user_id}/enable",
            post(admin::handle_enable_user),
        )
        .route(
            "/api/admin/users/{user_id}/password",
            post(admin::handle_reset_password),
        )
        // Admin: bookings
        .route("/api/admin/bookings", get(admin::handle_list_bookings))
        .route("/api/admin/bookings/export", get(admin::handle_export_bookings))
        .route(
            "/api/admin/bookings/{booking_id}/cancel",
            post(admin::handle_cancel_booking),
        )
        // Admin: catalog
        .route("/api/admin/movies", post(catalog::handle_create_movie))
        .route(
            "/api/admin/movies/{movie_id}",
            put(catalog::handle_update_movie).delete(catalog::handle_delete_movie),
        )
        .route(
            "/api/admin/movies/{movie_id}/status",
            put(catalog::handle_set_movie_status),
        )
        .route("/api/admin/categories", post(catalog::handle_create_category))
        .route(
            "/api/admin/categories/{category_id}",
            axum::routing::delete(catalog::handle_delete_category),
        )
        // Admin: shows
        .route("/api/admin/shows", post(catalog::handle_create_show))
        .route(
            "/api/admin/shows/{show_id}",
            put(catalog::handle_update_show).delete(catalog::handle_delete_show),
        )
        .route(
            "/api/admin/shows/{show_id}/cancel",
            post(catalog::handle_cancel_show),
        )
        .route(
            "/api/admin/shows/{show_id}/complete",
            post(catalog::handle_complete_show),
        )
        // Admin: theatres
        .route(
            "/api/admin/theatres",
            get(venues::handle_list_theatres).post(venues::handle_create_theatre),
        )
        .route(
            "/api/admin/theatres/{theatre_id}",
            put(venues::handle_update_theatre).delete(venues::handle_delete_theatre),
        )
        .route(
            "/api/admin/theatres/{theatre_id}/pricing",
            get(venues::handle_list_theatre_pricing).put(venues::handle_set_theatre_price),
        )
        .route(
            "/api/admin/theatres/{theatre_id}/pricing/{tier_id}",
            axum::routing::delete(venues::handle_remove_theatre_price),
        )
        // Admin: pricing tiers
        .route(
            "/api/admin/pricing-tiers",
            get(venues::handle_list_pricing_tiers).post(venues::handle_create_pricing_tier),
        )
        .route(
            "/api/admin/pricing-tiers/{tier_id}",
            put(venues::handle_update_pricing_tier).delete(venues::handle_delete_pricing_tier),
        )
        // Admin: seat templates
        .route(
            "/api/admin/seat-templates",
            get(venues::handle_list_seat_templates).post(venues::handle_create_seat_template),
        )
        .route(
            "/api/admin/seat-templates/{seat_template_id}",
            put(venues::handle_update_seat_template).delete(venues::handle_delete_seat_template),
        )
        .route(
            "/api/admin/seat-templates/{seat_template_id}/preview",
            get(venues::handle_preview_seat_template),
        )
        // Admin: notifications
        .route(
            "/api/admin/notification-templates",
            get(notifications::handle_list_templates).post(notifications::handle_create_template),
        )
        .route(
            "/api/admin/notification-templates/{template_id}",
            put(notifications::handle_update_template)
                .delete(notifications::handle_delete_template),
        )
        .route(
            "/api/admin/notification-templates/{template_id}/preview",
            post(notifications::handle_preview_template),
        )
        .route(
            "/api/admin/campaigns",
            get(notifications::handle_list_campaigns).post(notifications::handle_create_campaign),
        )
        .route(
            "/api/admin/campaigns/{campaign_id}/send",
            post(notifications::handle_send_campaign),
        )
        .route(
            "/api/admin/campaigns/{campaign_id}/cancel",
            post(notifications::handle_cancel_campaign),
        )
        .route(
            "/api/admin/campaigns/{campaign_id}/deliveries",
            get(notifications::handle_list_deliveries),
        )
        // Admin: logs and audit
        .route("/api/admin/logs", get(admin::handle_list_logs))
        .route("/api/admin/logs/purge", post(admin::handle_purge_logs))
        .route("/api/admin/audit", get(admin::handle_list_audit_events))
        // Layers run bottom-up: error recording wraps rate limiting wraps CSRF.
        .layer(middleware::from_fn_with_state(app_state.clone(), csrf_guard))
        .layer(middleware::from_fn_with_state(app_state.clone(), rate_limit))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            record_server_errors,
        ))
        .with_state(app_state)
}

/// Removes expired sessions and idle rate-limit buckets.
async fn run_maintenance(app_state: &AppState) {
    app_state.rate_limits.retain_recent();

    let now: String = match format_timestamp(OffsetDateTime::now_utc()) {
        Ok(now) => now,
        Err(e) => {
            error!(error = %e, "Failed to format the current time");
            return;
        }
    };

    let mut persistence = app_state.persistence.lock().await;
    match persistence.delete_expired_sessions(&now) {
        Ok(0) => debug!("No expired sessions"),
        Ok(removed) => info!(removed, "Removed expired sessions"),
        Err(e) => {
            error!(error = %e, "Failed to remove expired sessions");
            record_log(
                &mut persistence,
                LogLevel::Error,
                "maintenance",
                &format!("Failed to remove expired sessions: {e}"),
                None,
            );
        }
    }
}

fn spawn_maintenance(app_state: AppState, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_maintenance(&app_state).await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for the shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Marquee server");

    let persistence: Persistence = Persistence::connect(&args.database_url)?;
    let rate_limits: RateLimits =
        RateLimits::new(args.api_rate_per_minute, args.auth_rate_per_minute)?;
    let config: ServerConfig = ServerConfig {
        demo_occupancy: args.demo_occupancy,
        secure_cookies: args.secure_cookies,
    };
    let app_state: AppState = AppState::new(persistence, rate_limits, config);

    spawn_maintenance(
        app_state.clone(),
        Duration::from_secs(args.session_cleanup_secs.max(1)),
    );

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
