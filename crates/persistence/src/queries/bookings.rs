// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and ticket queries.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{BookingData, BookingFilter, TicketData};
use crate::diesel_schema::{bookings, shows, theatres, tickets};
use crate::error::PersistenceError;
use crate::page_limit;

#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
struct BookingRow {
    booking_id: i64,
    booking_reference: String,
    user_id: i64,
    show_id: i64,
    status: String,
    subtotal_cents: i64,
    fees_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    created_at: String,
    cancelled_at: Option<String>,
}

impl From<BookingRow> for BookingData {
    fn from(row: BookingRow) -> Self {
        Self {
            booking_id: row.booking_id,
            booking_reference: row.booking_reference,
            user_id: row.user_id,
            show_id: row.show_id,
            status: row.status,
            subtotal_cents: row.subtotal_cents,
            fees_cents: row.fees_cents,
            tax_cents: row.tax_cents,
            total_cents: row.total_cents,
            created_at: row.created_at,
            cancelled_at: row.cancelled_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = tickets)]
struct TicketRow {
    ticket_id: i64,
    booking_id: i64,
    show_id: i64,
    seat_label: String,
    tier_code: String,
    price_cents: i64,
    status: String,
}

impl From<TicketRow> for TicketData {
    fn from(row: TicketRow) -> Self {
        Self {
            ticket_id: row.ticket_id,
            booking_id: row.booking_id,
            show_id: row.show_id,
            seat_label: row.seat_label,
            tier_code: row.tier_code,
            price_cents: row.price_cents,
            status: row.status,
        }
    }
}

backend_fn! {
/// Retrieves a booking by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the booking is not found.
pub fn get_booking(conn: &mut _, booking_id: i64) -> Result<Option<BookingData>, PersistenceError> {
    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(BookingData::from))
}
}

backend_fn! {
/// Retrieves a booking by its public reference.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the booking is not found.
pub fn get_booking_by_reference(
    conn: &mut _,
    booking_reference: &str,
) -> Result<Option<BookingData>, PersistenceError> {
    debug!(booking_reference, "Looking up booking by reference");

    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_reference.eq(booking_reference))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(BookingData::from))
}
}

backend_fn! {
/// Lists bookings matching a filter, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_bookings(conn: &mut _, filter: &BookingFilter) -> Result<Vec<BookingData>, PersistenceError> {
    let mut query = bookings::table.select(BookingRow::as_select()).into_boxed();

    if let Some(user_id) = filter.user_id {
        query = query.filter(bookings::user_id.eq(user_id));
    }
    if let Some(show_id) = filter.show_id {
        query = query.filter(bookings::show_id.eq(show_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(bookings::status.eq(status.clone()));
    }

    let rows: Vec<BookingRow> = query
        .order((bookings::created_at.desc(), bookings::booking_id.desc()))
        .offset(filter.offset.unwrap_or(0).max(0))
        .limit(page_limit(filter.limit))
        .load(conn)?;
    Ok(rows.into_iter().map(BookingData::from).collect())
}
}

backend_fn! {
/// Lists the tickets of a booking in seat order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets_for_booking(conn: &mut _, booking_id: i64) -> Result<Vec<TicketData>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::booking_id.eq(booking_id))
        .order(tickets::ticket_id.asc())
        .select(TicketRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(TicketData::from).collect())
}
}

backend_fn! {
/// Lists the seat labels held by active tickets for a show.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sold_seats(conn: &mut _, show_id: i64) -> Result<Vec<String>, PersistenceError> {
    let labels: Vec<String> = tickets::table
        .filter(tickets::show_id.eq(show_id))
        .filter(tickets::status.eq("Active"))
        .select(tickets::seat_label)
        .order(tickets::seat_label.asc())
        .load(conn)?;
    Ok(labels)
}
}

backend_fn! {
/// Returns the theatre of a user's most recent confirmed booking for a
/// movie.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user has no such booking.
pub fn latest_booked_theatre_name(
    conn: &mut _,
    user_id: i64,
    movie_id: i64,
) -> Result<Option<String>, PersistenceError> {
    let name: Option<String> = bookings::table
        .inner_join(shows::table.inner_join(theatres::table))
        .filter(bookings::user_id.eq(user_id))
        .filter(shows::movie_id.eq(movie_id))
        .filter(bookings::status.eq("Confirmed"))
        .order((bookings::created_at.desc(), bookings::booking_id.desc()))
        .select(theatres::name)
        .first(conn)
        .optional()?;
    Ok(name)
}
}

backend_fn! {
/// Lists the distinct users holding a confirmed booking for any show of a
/// movie.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_user_ids_who_booked_movie(conn: &mut _, movie_id: i64) -> Result<Vec<i64>, PersistenceError> {
    let ids: Vec<i64> = bookings::table
        .inner_join(shows::table)
        .filter(shows::movie_id.eq(movie_id))
        .filter(bookings::status.eq("Confirmed"))
        .select(bookings::user_id)
        .distinct()
        .order(bookings::user_id.asc())
        .load(conn)?;
    Ok(ids)
}
}
