// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! A seat is held by at most one active ticket per show. Checkout checks
//! this inside its transaction and the partial unique index on
//! `tickets(show_id, seat_label)` backs it up when two writers race.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::{info, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::NewBooking;
use crate::diesel_schema::{bookings, tickets};
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Creates a confirmed booking and its tickets in one transaction.
///
/// # Returns
///
/// The new booking ID.
///
/// # Errors
///
/// Returns an error if:
/// - A seat is already held by an active ticket (`SeatUnavailable`)
/// - The booking reference is already taken (`UniqueViolation`)
/// - The database operation fails
pub fn create_booking_with_tickets(conn: &mut _, booking: &NewBooking) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    let labels: Vec<&str> = booking
        .tickets
        .iter()
        .map(|ticket| ticket.seat_label.as_str())
        .collect();

    let booking_id: i64 = conn.transaction::<_, PersistenceError, _>(|conn| {
        let taken: Vec<String> = tickets::table
            .filter(tickets::show_id.eq(booking.show_id))
            .filter(tickets::status.eq("Active"))
            .filter(tickets::seat_label.eq_any(labels.iter().copied()))
            .select(tickets::seat_label)
            .order(tickets::seat_label.asc())
            .load(conn)?;
        if !taken.is_empty() {
            return Err(PersistenceError::SeatUnavailable(taken.join(", ")));
        }

        diesel::insert_into(bookings::table)
            .values((
                bookings::booking_reference.eq(&booking.booking_reference),
                bookings::user_id.eq(booking.user_id),
                bookings::show_id.eq(booking.show_id),
                bookings::subtotal_cents.eq(booking.subtotal_cents),
                bookings::fees_cents.eq(booking.fees_cents),
                bookings::tax_cents.eq(booking.tax_cents),
                bookings::total_cents.eq(booking.total_cents),
                bookings::created_at.eq(&now),
            ))
            .execute(conn)?;

        let booking_id: i64 = conn.get_last_insert_rowid()?;

        for ticket in &booking.tickets {
            diesel::insert_into(tickets::table)
                .values((
                    tickets::booking_id.eq(booking_id),
                    tickets::show_id.eq(booking.show_id),
                    tickets::seat_label.eq(&ticket.seat_label),
                    tickets::tier_code.eq(&ticket.tier_code),
                    tickets::price_cents.eq(ticket.price_cents),
                ))
                .execute(conn)
                .map_err(|err| match err {
                    diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        warn!(
                            show_id = booking.show_id,
                            seat = %ticket.seat_label,
                            "Seat taken by a concurrent checkout"
                        );
                        PersistenceError::SeatUnavailable(ticket.seat_label.clone())
                    }
                    other => PersistenceError::from(other),
                })?;
        }

        Ok(booking_id)
    })?;

    info!(
        booking_id,
        booking_reference = %booking.booking_reference,
        show_id = booking.show_id,
        seats = booking.tickets.len(),
        total_cents = booking.total_cents,
        "Booking confirmed"
    );
    Ok(booking_id)
}
}

backend_fn! {
/// Cancels a booking and releases its seats.
///
/// # Errors
///
/// Returns an error if the booking does not exist or is not confirmed.
pub fn cancel_booking(conn: &mut _, booking_id: i64) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let rows: usize = diesel::update(
            bookings::table
                .filter(bookings::booking_id.eq(booking_id))
                .filter(bookings::status.eq("Confirmed")),
        )
        .set((
            bookings::status.eq("Cancelled"),
            bookings::cancelled_at.eq(&now),
        ))
        .execute(conn)?;
        if rows == 0 {
            return Err(PersistenceError::NotFound(format!(
                "No confirmed booking with ID {booking_id}"
            )));
        }

        diesel::update(
            tickets::table
                .filter(tickets::booking_id.eq(booking_id))
                .filter(tickets::status.eq("Active")),
        )
        .set(tickets::status.eq("Cancelled"))
        .execute(conn)?;
        Ok(())
    })?;

    info!(booking_id, "Booking cancelled");
    Ok(())
}
}
