// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Checkout and booking management handlers.

use marquee_audit::{Action, AuditTarget, Cause};
use marquee_domain::{
    BookingStatus, DomainError, PriceQuote, can_cancel_booking, generate_booking_reference,
    parse_timestamp,
};
use marquee_persistence::{
    BookingData, BookingFilter, NewBooking, NewTicket, Persistence, PersistenceError, ShowData,
    TicketData,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::shows::price_selection;
use super::{booking_info, booking_snapshot, load_booking, load_show, record_audit, show_info};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::capabilities::compute_booking_capabilities;
use crate::error::ApiError;
use crate::request_response::{
    BookingCapabilities, BookingDetailResponse, BookingInfo, CheckoutRequest, ListBookingsQuery,
    ListBookingsResponse, PageQuery, TicketInfo,
};

/// Reference collisions are astronomically rare; a handful of retries is
/// enough to rule out bad luck.
const MAX_REFERENCE_ATTEMPTS: usize = 5;

fn booking_detail(
    persistence: &mut Persistence,
    booking: BookingData,
    actor: &AuthenticatedActor,
) -> Result<BookingDetailResponse, ApiError> {
    let show: ShowData = load_show(persistence, booking.show_id)?;
    let show_start: OffsetDateTime = parse_timestamp(&show.start_time)?;
    let capabilities: BookingCapabilities = compute_booking_capabilities(
        actor,
        &booking,
        show_start,
        OffsetDateTime::now_utc(),
    );

    let tickets: Vec<TicketInfo> = persistence
        .list_tickets_for_booking(booking.booking_id)?
        .into_iter()
        .map(|t: TicketData| TicketInfo {
            ticket_id: t.ticket_id,
            seat_label: t.seat_label,
            tier_code: t.tier_code,
            price_cents: t.price_cents,
            status: t.status,
        })
        .collect();

    Ok(BookingDetailResponse {
        booking: booking_info(booking),
        tickets,
        show: show_info(persistence, show)?,
        capabilities,
    })
}

/// Books the selected seats for the signed-in user.
///
/// Seats are re-checked inside the booking transaction, so a seat taken by
/// a concurrent buyer produces a conflict and nothing is written.
///
/// # Errors
///
/// Returns an error if:
/// - The show does not exist, is not scheduled, or has started
/// - A seat is unknown, repeated, blocked, or already sold
/// - The selection is empty or exceeds the per-booking limit
pub fn checkout(
    persistence: &mut Persistence,
    request: &CheckoutRequest,
    actor: &AuthenticatedActor,
    demo_occupancy_percent: u8,
) -> Result<BookingDetailResponse, ApiError> {
    let show: ShowData = load_show(persistence, request.show_id)?;
    let quote: PriceQuote =
        price_selection(persistence, &show, &request.seats, demo_occupancy_percent)?;

    let tickets: Vec<NewTicket> = quote
        .lines
        .iter()
        .map(|line| NewTicket {
            seat_label: line.seat_label.clone(),
            tier_code: line.tier_code.clone(),
            price_cents: line.price_cents,
        })
        .collect();

    let mut rng: StdRng = StdRng::seed_from_u64(rand::random::<u64>());
    let mut attempt: usize = 0;
    let booking_id: i64 = loop {
        attempt += 1;
        let booking: NewBooking = NewBooking {
            booking_reference: generate_booking_reference(&mut rng),
            user_id: actor.user_id,
            show_id: show.show_id,
            subtotal_cents: quote.subtotal_cents,
            fees_cents: quote.fees_cents,
            tax_cents: quote.tax_cents,
            total_cents: quote.total_cents,
            tickets: tickets.clone(),
        };

        match persistence.create_booking_with_tickets(&booking) {
            Ok(id) => break id,
            Err(PersistenceError::UniqueViolation(_)) if attempt < MAX_REFERENCE_ATTEMPTS => {
                debug!(attempt, "Booking reference collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    };

    let booking: BookingData = load_booking(persistence, booking_id)?;
    info!(
        booking_id,
        reference = %booking.booking_reference,
        show_id = show.show_id,
        user_id = actor.user_id,
        seats = tickets.len(),
        total_cents = booking.total_cents,
        "Booking confirmed"
    );

    booking_detail(persistence, booking, actor)
}

/// Lists the signed-in user's bookings, newest first.
///
/// # Errors
///
/// Returns an error if the database fails.
pub fn list_my_bookings(
    persistence: &mut Persistence,
    page: &PageQuery,
    actor: &AuthenticatedActor,
) -> Result<ListBookingsResponse, ApiError> {
    let bookings: Vec<BookingInfo> = persistence
        .list_bookings(&BookingFilter {
            user_id: Some(actor.user_id),
            limit: page.limit,
            offset: page.offset,
            ..BookingFilter::default()
        })?
        .into_iter()
        .map(booking_info)
        .collect();
    Ok(ListBookingsResponse { bookings })
}

/// Returns one booking with its tickets.
///
/// # Errors
///
/// Returns an error if the booking does not exist or belongs to another
/// customer.
pub fn get_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    actor: &AuthenticatedActor,
) -> Result<BookingDetailResponse, ApiError> {
    let booking: BookingData = load_booking(persistence, booking_id)?;
    AuthorizationService::require_self_or_staff(actor, booking.user_id, "get_booking")?;
    booking_detail(persistence, booking, actor)
}

/// Cancels one of the signed-in user's bookings before the show starts.
///
/// The booking's tickets are cancelled with it and the seats go back on sale.
///
/// # Errors
///
/// Returns an error if the booking belongs to someone else, is already
/// cancelled, or its show has started.
pub fn cancel_my_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    actor: &AuthenticatedActor,
) -> Result<BookingDetailResponse, ApiError> {
    let booking: BookingData = load_booking(persistence, booking_id)?;
    if booking.user_id != actor.user_id {
        return Err(ApiError::Unauthorized {
            action: String::from("cancel_my_booking"),
            required_role: String::from("Owner"),
        });
    }

    let show: ShowData = load_show(persistence, booking.show_id)?;
    can_cancel_booking(
        booking.status.parse()?,
        parse_timestamp(&show.start_time)?,
        OffsetDateTime::now_utc(),
    )?;

    persistence.cancel_booking(booking_id)?;
    info!(booking_id, user_id = actor.user_id, "Booking cancelled by customer");

    let booking: BookingData = load_booking(persistence, booking_id)?;
    booking_detail(persistence, booking, actor)
}

/// Lists bookings across all customers.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the status filter is
/// unknown.
pub fn list_bookings(
    persistence: &mut Persistence,
    query: &ListBookingsQuery,
    actor: &AuthenticatedActor,
) -> Result<ListBookingsResponse, ApiError> {
    AuthorizationService::require_staff(actor, "list_bookings")?;
    let bookings: Vec<BookingInfo> = persistence
        .list_bookings(&booking_filter(query)?)?
        .into_iter()
        .map(booking_info)
        .collect();
    Ok(ListBookingsResponse { bookings })
}

fn booking_filter(query: &ListBookingsQuery) -> Result<BookingFilter, ApiError> {
    let status: Option<BookingStatus> = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()?;

    Ok(BookingFilter {
        user_id: query.user_id,
        show_id: query.show_id,
        status: status.map(|s| s.as_str().to_string()),
        limit: query.limit,
        offset: query.offset,
    })
}

/// Cancels a confirmed booking on a customer's behalf.
///
/// Staff may cancel after the show has started, e.g. for a refund.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the booking is not
/// confirmed.
pub fn cancel_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<BookingDetailResponse, ApiError> {
    AuthorizationService::require_staff(actor, "cancel_booking")?;
    let before: BookingData = load_booking(persistence, booking_id)?;

    let status: BookingStatus = before.status.parse()?;
    if status != BookingStatus::Confirmed {
        return Err(DomainError::BookingNotCancellable(format!("booking is {status}")).into());
    }

    persistence.cancel_booking(booking_id)?;
    let after: BookingData = load_booking(persistence, booking_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("CancelBooking"),
            Some(format!(
                "Cancelled {} for user {}",
                after.booking_reference, after.user_id
            )),
        ),
        AuditTarget::new("booking", booking_id),
        booking_snapshot(&before),
        booking_snapshot(&after),
    )?;

    booking_detail(persistence, after, actor)
}

#[derive(Serialize)]
struct BookingCsvRow<'a> {
    booking_reference: &'a str,
    booking_id: i64,
    user_id: i64,
    show_id: i64,
    status: &'a str,
    seats: String,
    subtotal_cents: i64,
    fees_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    created_at: &'a str,
    cancelled_at: &'a str,
}

/// Exports bookings matching a filter as CSV, one row per booking.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the export fails.
pub fn export_bookings_csv(
    persistence: &mut Persistence,
    query: &ListBookingsQuery,
    actor: &AuthenticatedActor,
) -> Result<String, ApiError> {
    AuthorizationService::require_staff(actor, "export_bookings_csv")?;
    let bookings: Vec<BookingData> = persistence.list_bookings(&booking_filter(query)?)?;

    let csv_error = |e: csv::Error| ApiError::Internal {
        message: format!("Failed to write CSV: {e}"),
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    for booking in &bookings {
        let seats: String = persistence
            .list_tickets_for_booking(booking.booking_id)?
            .into_iter()
            .map(|t| t.seat_label)
            .collect::<Vec<String>>()
            .join(" ");
        writer
            .serialize(BookingCsvRow {
                booking_reference: &booking.booking_reference,
                booking_id: booking.booking_id,
                user_id: booking.user_id,
                show_id: booking.show_id,
                status: &booking.status,
                seats,
                subtotal_cents: booking.subtotal_cents,
                fees_cents: booking.fees_cents,
                tax_cents: booking.tax_cents,
                total_cents: booking.total_cents,
                created_at: &booking.created_at,
                cancelled_at: booking.cancelled_at.as_deref().unwrap_or(""),
            })
            .map_err(csv_error)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to finish CSV: {e}"),
    })?;
    info!(rows = bookings.len(), "Bookings exported");
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV export is not UTF-8: {e}"),
    })
}
