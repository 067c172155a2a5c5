// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Show mutations.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::ShowInput;
use crate::diesel_schema::{bookings, shows, tickets};
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Creates a show in `Scheduled` status.
///
/// Overlap and screen checks are the caller's responsibility.
///
/// # Errors
///
/// Returns an error if a referenced row does not exist or the insert fails.
pub fn create_show(conn: &mut _, input: &ShowInput<'_>) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(shows::table)
        .values((
            shows::movie_id.eq(input.movie_id),
            shows::theatre_id.eq(input.theatre_id),
            shows::seat_template_id.eq(input.seat_template_id),
            shows::screen.eq(input.screen),
            shows::start_time.eq(input.start_time),
            shows::end_time.eq(input.end_time),
            shows::format.eq(input.format),
            shows::language.eq(input.language),
            shows::created_at.eq(&now),
        ))
        .execute(conn)?;

    let show_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        show_id,
        movie_id = input.movie_id,
        theatre_id = input.theatre_id,
        screen = input.screen,
        start_time = input.start_time,
        "Show created"
    );
    Ok(show_id)
}
}

backend_fn! {
/// Replaces a show's schedule fields.
///
/// # Errors
///
/// Returns an error if the show does not exist or the update fails.
pub fn update_show(conn: &mut _, show_id: i64, input: &ShowInput<'_>) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(shows::table.filter(shows::show_id.eq(show_id)))
        .set((
            shows::movie_id.eq(input.movie_id),
            shows::theatre_id.eq(input.theatre_id),
            shows::seat_template_id.eq(input.seat_template_id),
            shows::screen.eq(input.screen),
            shows::start_time.eq(input.start_time),
            shows::end_time.eq(input.end_time),
            shows::format.eq(input.format),
            shows::language.eq(input.language),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Show {show_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Sets a show's status.
///
/// # Errors
///
/// Returns an error if the show does not exist or the update fails.
pub fn set_show_status(conn: &mut _, show_id: i64, status: &str) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(shows::table.filter(shows::show_id.eq(show_id)))
        .set(shows::status.eq(status))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Show {show_id} not found")));
    }
    info!(show_id, status, "Show status changed");
    Ok(())
}
}

backend_fn! {
/// Cancels a show together with its confirmed bookings and active tickets.
///
/// # Returns
///
/// The number of bookings cancelled.
///
/// # Errors
///
/// Returns an error if the show does not exist or any update fails. On
/// error nothing is changed.
pub fn cancel_show(conn: &mut _, show_id: i64) -> Result<usize, PersistenceError> {
    let now: String = now_timestamp()?;

    let cancelled: usize = conn.transaction::<_, PersistenceError, _>(|conn| {
        let rows: usize = diesel::update(shows::table.filter(shows::show_id.eq(show_id)))
            .set(shows::status.eq("Cancelled"))
            .execute(conn)?;
        if rows == 0 {
            return Err(PersistenceError::NotFound(format!("Show {show_id} not found")));
        }

        let bookings_cancelled: usize = diesel::update(
            bookings::table
                .filter(bookings::show_id.eq(show_id))
                .filter(bookings::status.eq("Confirmed")),
        )
        .set((
            bookings::status.eq("Cancelled"),
            bookings::cancelled_at.eq(&now),
        ))
        .execute(conn)?;

        diesel::update(
            tickets::table
                .filter(tickets::show_id.eq(show_id))
                .filter(tickets::status.eq("Active")),
        )
        .set(tickets::status.eq("Cancelled"))
        .execute(conn)?;

        Ok(bookings_cancelled)
    })?;

    info!(show_id, bookings_cancelled = cancelled, "Show cancelled");
    Ok(cancelled)
}
}

backend_fn! {
/// Deletes a show.
///
/// # Errors
///
/// Returns an error if the show does not exist or tickets reference it.
pub fn delete_show(conn: &mut _, show_id: i64) -> Result<(), PersistenceError> {
    let rows: usize =
        diesel::delete(shows::table.filter(shows::show_id.eq(show_id))).execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Show {show_id} not found")));
    }
    info!(show_id, "Show deleted");
    Ok(())
}
}
