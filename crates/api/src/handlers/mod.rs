// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request handlers.
//!
//! Every handler takes the persistence layer, its request, and (when the
//! operation is not public) the authenticated actor plus a `Cause`. The
//! order inside a handler is fixed: authorize, validate, persist, audit.
//! Administrative mutations always produce exactly one audit event.

mod account;
mod bookings;
mod catalog;
mod notifications;
mod operations;
mod shows;
mod users;
mod venues;

pub use account::{
    bootstrap_admin, bootstrap_status, change_password, login, logout, register, update_profile,
    whoami,
};
pub use bookings::{
    cancel_booking, cancel_my_booking, checkout, export_bookings_csv, get_booking, list_bookings,
    list_my_bookings,
};
pub use catalog::{
    create_category, create_movie, delete_category, delete_movie, get_movie, list_categories,
    list_movies, set_movie_status, update_movie,
};
pub use notifications::{
    cancel_campaign, create_campaign, create_template, delete_template, list_campaigns,
    list_deliveries, list_templates, preview_template, send_campaign, update_template,
};
pub use operations::{list_audit_events, list_logs, purge_logs, record_log};
pub use shows::{
    cancel_show, complete_show, create_show, delete_show, get_seat_map, get_show, list_shows,
    quote_seats, update_show,
};
pub use users::{
    create_user, delete_user, disable_user, enable_user, get_user, list_users, reset_password,
    update_user_roles,
};
pub use venues::{
    create_pricing_tier, create_seat_template, create_theatre, delete_pricing_tier,
    delete_seat_template, delete_theatre, list_pricing_tiers, list_seat_templates,
    list_theatre_pricing, list_theatres, preview_seat_template, remove_theatre_price,
    set_theatre_price, update_pricing_tier, update_seat_template, update_theatre,
};

use std::collections::HashMap;

use marquee_audit::{Action, AuditEvent, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{local_start_time, parse_timestamp};
use marquee_persistence::{
    BookingData, CategoryData, MovieData, Persistence, SeatTemplateData, ShowData, TheatreData,
    UserData,
};

use crate::auth::AuthenticatedActor;
use crate::error::ApiError;
use crate::request_response::{BookingInfo, CategoryInfo, MovieInfo, ShowInfo};

/// Persists one audit event for an administrative mutation.
///
/// # Errors
///
/// Returns an error if the event cannot be stored.
fn record_audit(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    cause: Cause,
    action: Action,
    target: AuditTarget,
    before: StateSnapshot,
    after: StateSnapshot,
) -> Result<i64, ApiError> {
    let event: AuditEvent =
        AuditEvent::new_global(actor.to_audit_actor(), cause, action, before, after)
            .with_target(target);

    persistence
        .persist_audit_event(&event)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to persist audit event: {e}"),
        })
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}

fn conflict(resource_type: &str, message: String) -> ApiError {
    ApiError::Conflict {
        resource_type: resource_type.to_string(),
        message,
    }
}

fn rule_violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Trims an optional text field, treating blank as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)?
        .ok_or_else(|| not_found("User", format!("User {user_id} does not exist")))
}

fn load_movie(persistence: &mut Persistence, movie_id: i64) -> Result<MovieData, ApiError> {
    persistence
        .get_movie(movie_id)?
        .ok_or_else(|| not_found("Movie", format!("Movie {movie_id} does not exist")))
}

fn load_theatre(persistence: &mut Persistence, theatre_id: i64) -> Result<TheatreData, ApiError> {
    persistence
        .get_theatre(theatre_id)?
        .ok_or_else(|| not_found("Theatre", format!("Theatre {theatre_id} does not exist")))
}

fn load_show(persistence: &mut Persistence, show_id: i64) -> Result<ShowData, ApiError> {
    persistence
        .get_show(show_id)?
        .ok_or_else(|| not_found("Show", format!("Show {show_id} does not exist")))
}

fn load_seat_template(
    persistence: &mut Persistence,
    seat_template_id: i64,
) -> Result<SeatTemplateData, ApiError> {
    persistence.get_seat_template(seat_template_id)?.ok_or_else(|| {
        not_found(
            "SeatTemplate",
            format!("Seat template {seat_template_id} does not exist"),
        )
    })
}

fn load_booking(persistence: &mut Persistence, booking_id: i64) -> Result<BookingData, ApiError> {
    persistence
        .get_booking(booking_id)?
        .ok_or_else(|| not_found("Booking", format!("Booking {booking_id} does not exist")))
}

fn category_info(category: CategoryData) -> CategoryInfo {
    CategoryInfo {
        category_id: category.category_id,
        name: category.name,
        slug: category.slug,
    }
}

fn movie_info(persistence: &mut Persistence, movie: MovieData) -> Result<MovieInfo, ApiError> {
    let categories: Vec<CategoryInfo> = persistence
        .get_movie_categories(movie.movie_id)?
        .into_iter()
        .map(category_info)
        .collect();

    Ok(MovieInfo {
        movie_id: movie.movie_id,
        title: movie.title,
        synopsis: movie.synopsis,
        duration_minutes: movie.duration_minutes,
        rating: movie.rating,
        language: movie.language,
        release_date: movie.release_date,
        poster_url: movie.poster_url,
        status: movie.status,
        categories,
    })
}

fn booking_info(booking: BookingData) -> BookingInfo {
    BookingInfo {
        booking_id: booking.booking_id,
        booking_reference: booking.booking_reference,
        user_id: booking.user_id,
        show_id: booking.show_id,
        status: booking.status,
        subtotal_cents: booking.subtotal_cents,
        fees_cents: booking.fees_cents,
        tax_cents: booking.tax_cents,
        total_cents: booking.total_cents,
        created_at: booking.created_at,
        cancelled_at: booking.cancelled_at,
    }
}

/// Expands shows with their movie title, theatre name and local start time.
///
/// Movies and theatres are looked up once each however many shows share them.
fn show_infos(
    persistence: &mut Persistence,
    shows: Vec<ShowData>,
) -> Result<Vec<ShowInfo>, ApiError> {
    let mut movies: HashMap<i64, MovieData> = HashMap::new();
    let mut theatres: HashMap<i64, TheatreData> = HashMap::new();
    let mut infos: Vec<ShowInfo> = Vec::with_capacity(shows.len());

    for show in shows {
        if !movies.contains_key(&show.movie_id) {
            let movie: MovieData = load_movie(persistence, show.movie_id)?;
            movies.insert(show.movie_id, movie);
        }
        if !theatres.contains_key(&show.theatre_id) {
            let theatre: TheatreData = load_theatre(persistence, show.theatre_id)?;
            theatres.insert(show.theatre_id, theatre);
        }
        let movie_title: String = movies
            .get(&show.movie_id)
            .map(|m| m.title.clone())
            .unwrap_or_default();
        let (theatre_name, timezone): (String, String) = theatres
            .get(&show.theatre_id)
            .map(|t| (t.name.clone(), t.timezone.clone()))
            .unwrap_or_default();

        let local: String = local_start_time(parse_timestamp(&show.start_time)?, &timezone)?;

        infos.push(ShowInfo {
            show_id: show.show_id,
            movie_id: show.movie_id,
            movie_title,
            theatre_id: show.theatre_id,
            theatre_name,
            seat_template_id: show.seat_template_id,
            screen: show.screen,
            start_time: show.start_time,
            end_time: show.end_time,
            local_start_time: local,
            format: show.format,
            language: show.language,
            status: show.status,
        });
    }

    Ok(infos)
}

fn show_info(persistence: &mut Persistence, show: ShowData) -> Result<ShowInfo, ApiError> {
    show_infos(persistence, vec![show])?
        .pop()
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Show expansion produced no result"),
        })
}

// Audit snapshots use a flat `key=value,...` encoding.

fn movie_snapshot(movie: &MovieData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "movie_id={},title={},duration_minutes={},rating={},status={}",
        movie.movie_id, movie.title, movie.duration_minutes, movie.rating, movie.status
    ))
}

fn theatre_snapshot(theatre: &TheatreData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "theatre_id={},name={},city={},timezone={},screen_count={},is_active={}",
        theatre.theatre_id,
        theatre.name,
        theatre.city,
        theatre.timezone,
        theatre.screen_count,
        theatre.is_active
    ))
}

fn show_snapshot(show: &ShowData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "show_id={},movie_id={},theatre_id={},screen={},start_time={},format={},status={}",
        show.show_id,
        show.movie_id,
        show.theatre_id,
        show.screen,
        show.start_time,
        show.format,
        show.status
    ))
}

fn user_snapshot(user: &UserData, roles: &[String]) -> StateSnapshot {
    StateSnapshot::new(format!(
        "user_id={},email={},roles={},is_disabled={}",
        user.user_id,
        user.email,
        roles.join("|"),
        user.is_disabled
    ))
}

fn booking_snapshot(booking: &BookingData) -> StateSnapshot {
    StateSnapshot::new(format!(
        "booking_id={},reference={},show_id={},status={},total_cents={}",
        booking.booking_id,
        booking.booking_reference,
        booking.show_id,
        booking.status,
        booking.total_cents
    ))
}
