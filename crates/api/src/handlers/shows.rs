// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Show scheduling, seat map and price quote handlers.

use std::collections::HashSet;

use marquee_audit::{Action, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{
    DomainError, MovieStatus, PriceBook, PriceQuote, SeatLayout, SeatMap, SeatState, ShowFormat,
    ShowStatus, format_timestamp, generate_seat_map, parse_timestamp, quote, show_end_time,
    shows_overlap, validate_screen,
};
use marquee_persistence::{
    MovieData, Persistence, PricingTierData, SeatTemplateData, ShowData, ShowFilter, ShowInput,
    TheatreData, TheatrePriceData,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{
    conflict, invalid_input, load_movie, load_seat_template, load_show, load_theatre,
    record_audit, rule_violation, show_info, show_infos, show_snapshot,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    CancelShowResponse, ListShowsQuery, ListShowsResponse, QuoteRequest, QuoteResponse,
    SeatMapResponse, ShowInfo, ShowRequest, TierPriceInfo,
};

/// Builds the price book for a theatre: tier base prices with the
/// theatre's overrides applied.
pub(super) fn price_book_for(
    persistence: &mut Persistence,
    theatre_id: i64,
) -> Result<PriceBook, ApiError> {
    let tiers: Vec<PricingTierData> = persistence.list_pricing_tiers()?;
    let overrides: Vec<TheatrePriceData> = persistence.list_theatre_pricing(theatre_id)?;

    Ok(PriceBook::new(
        tiers.iter().map(|t| (t.code.as_str(), t.base_price_cents)),
        overrides.iter().map(|o| (o.tier_code.as_str(), o.price_cents)),
    ))
}

/// Generates the seat map of a show from its template and sold seats.
pub(super) fn seat_map_for(
    persistence: &mut Persistence,
    show: &ShowData,
    demo_occupancy_percent: u8,
) -> Result<SeatMap, ApiError> {
    let template: SeatTemplateData = load_seat_template(persistence, show.seat_template_id)?;
    let layout: SeatLayout = SeatLayout::from_json(&template.layout_json)?;
    let sold: HashSet<String> = persistence
        .list_sold_seats(show.show_id)?
        .into_iter()
        .collect();

    Ok(generate_seat_map(
        &layout,
        show.show_id.unsigned_abs(),
        &sold,
        demo_occupancy_percent,
    ))
}

/// Checks a seat selection against the show's current seat map and prices it.
///
/// The show must be scheduled and not yet started.
pub(super) fn price_selection(
    persistence: &mut Persistence,
    show: &ShowData,
    seats: &[String],
    demo_occupancy_percent: u8,
) -> Result<PriceQuote, ApiError> {
    ensure_on_sale(show)?;

    let seats: Vec<String> = seats.iter().map(|s| s.trim().to_uppercase()).collect();
    let seat_map: SeatMap = seat_map_for(persistence, show, demo_occupancy_percent)?;
    seat_map.check_selection(&seats)?;

    let selection: Vec<(String, String)> = seats
        .iter()
        .filter_map(|label| {
            seat_map
                .find(label)
                .map(|seat| (seat.label.clone(), seat.tier_code.clone()))
        })
        .collect();

    let format: ShowFormat = show.format.parse()?;
    let price_book: PriceBook = price_book_for(persistence, show.theatre_id)?;
    Ok(quote(&price_book, &selection, format)?)
}

fn ensure_on_sale(show: &ShowData) -> Result<(), ApiError> {
    let status: ShowStatus = show.status.parse()?;
    if !status.is_bookable() {
        return Err(rule_violation(
            "show_on_sale",
            format!("Show {} is {status}", show.show_id),
        ));
    }
    if OffsetDateTime::now_utc() >= parse_timestamp(&show.start_time)? {
        return Err(rule_violation(
            "show_on_sale",
            format!("Show {} has already started", show.show_id),
        ));
    }
    Ok(())
}

/// Lists shows, by default scheduled shows starting from now.
///
/// # Errors
///
/// Returns an error if a time bound is malformed or the database fails.
pub fn list_shows(
    persistence: &mut Persistence,
    query: &ListShowsQuery,
) -> Result<ListShowsResponse, ApiError> {
    let starts_after: OffsetDateTime = match &query.from {
        Some(from) => parse_timestamp(from)?,
        None => OffsetDateTime::now_utc(),
    };
    let starts_before: Option<String> = query
        .to
        .as_deref()
        .map(|to| parse_timestamp(to).and_then(format_timestamp))
        .transpose()?;

    let shows: Vec<ShowData> = persistence.list_shows(&ShowFilter {
        movie_id: query.movie_id,
        theatre_id: query.theatre_id,
        status: (!query.include_cancelled).then(|| ShowStatus::Scheduled.as_str().to_string()),
        starts_after: Some(format_timestamp(starts_after)?),
        starts_before,
        limit: query.limit,
        offset: query.offset,
    })?;

    Ok(ListShowsResponse {
        shows: show_infos(persistence, shows)?,
    })
}

/// Returns one show.
///
/// # Errors
///
/// Returns an error if the show does not exist.
pub fn get_show(persistence: &mut Persistence, show_id: i64) -> Result<ShowInfo, ApiError> {
    let show: ShowData = load_show(persistence, show_id)?;
    show_info(persistence, show)
}

/// Returns the seat map of a show with the price of each tier.
///
/// # Errors
///
/// Returns an error if the show does not exist or its template is corrupt.
pub fn get_seat_map(
    persistence: &mut Persistence,
    show_id: i64,
    demo_occupancy_percent: u8,
) -> Result<SeatMapResponse, ApiError> {
    let show: ShowData = load_show(persistence, show_id)?;
    let seat_map: SeatMap = seat_map_for(persistence, &show, demo_occupancy_percent)?;
    let format: ShowFormat = show.format.parse()?;
    let price_book: PriceBook = price_book_for(persistence, show.theatre_id)?;

    let mut tier_codes: Vec<&str> = seat_map
        .rows
        .iter()
        .flat_map(|row| row.seats.iter().map(|seat| seat.tier_code.as_str()))
        .collect();
    tier_codes.sort_unstable();
    tier_codes.dedup();

    let prices: Vec<TierPriceInfo> = tier_codes
        .into_iter()
        .filter_map(|code| price_book.price(code).map(|price| (code, price)))
        .map(|(code, price)| {
            let price_cents: i64 = price.checked_add(format.surcharge_cents()).ok_or_else(|| {
                DomainError::InvalidPricingTier(format!("Price of {code} is out of range"))
            })?;
            Ok(TierPriceInfo {
                tier_code: code.to_string(),
                price_cents,
            })
        })
        .collect::<Result<_, DomainError>>()?;

    Ok(SeatMapResponse {
        show_id,
        available_count: seat_map.count(SeatState::Available),
        seat_map,
        prices,
    })
}

/// Prices a seat selection without booking it.
///
/// # Errors
///
/// Returns an error if the show is not on sale or a seat cannot be selected.
pub fn quote_seats(
    persistence: &mut Persistence,
    show_id: i64,
    request: &QuoteRequest,
    demo_occupancy_percent: u8,
) -> Result<QuoteResponse, ApiError> {
    let show: ShowData = load_show(persistence, show_id)?;
    let quote: PriceQuote =
        price_selection(persistence, &show, &request.seats, demo_occupancy_percent)?;
    Ok(QuoteResponse { show_id, quote })
}

/// Normalized show fields, checked against the catalog and the screen's
/// existing schedule.
struct ValidatedShow {
    start_time: String,
    end_time: String,
    format: ShowFormat,
    language: String,
}

fn validate_show_request(
    persistence: &mut Persistence,
    request: &ShowRequest,
    exclude_show_id: Option<i64>,
) -> Result<ValidatedShow, ApiError> {
    let movie: MovieData = load_movie(persistence, request.movie_id)?;
    let movie_status: MovieStatus = movie.status.parse()?;
    if !movie_status.accepts_new_shows() {
        return Err(rule_violation(
            "movie_accepts_shows",
            format!("'{}' is {movie_status}", movie.title),
        ));
    }

    let theatre: TheatreData = load_theatre(persistence, request.theatre_id)?;
    if !theatre.is_active {
        return Err(rule_violation(
            "theatre_active",
            format!("Theatre '{}' is inactive", theatre.name),
        ));
    }
    validate_screen(request.screen, theatre.screen_count)?;
    load_seat_template(persistence, request.seat_template_id)?;

    let format: ShowFormat = request.format.trim().parse()?;
    let language: &str = request.language.trim();
    if language.is_empty() {
        return Err(invalid_input(
            "language",
            String::from("Language cannot be empty"),
        ));
    }

    let start: OffsetDateTime = parse_timestamp(&request.start_time)?;
    if start <= OffsetDateTime::now_utc() {
        return Err(invalid_input(
            "start_time",
            String::from("Shows must be scheduled in the future"),
        ));
    }
    let end: OffsetDateTime = show_end_time(start, movie.duration_minutes)?;

    for other in persistence.list_shows_on_screen(
        request.theatre_id,
        request.screen,
        exclude_show_id,
    )? {
        let other_start: OffsetDateTime = parse_timestamp(&other.start_time)?;
        let other_end: OffsetDateTime = parse_timestamp(&other.end_time)?;
        if shows_overlap(start, end, other_start, other_end) {
            return Err(DomainError::ShowOverlap {
                conflicting_show_id: other.show_id,
            }
            .into());
        }
    }

    Ok(ValidatedShow {
        start_time: format_timestamp(start)?,
        end_time: format_timestamp(end)?,
        format,
        language: language.to_string(),
    })
}

/// Schedules a show.
///
/// The movie must accept new shows, the theatre must be active, the screen
/// must exist, and the screen must be free from the start time until the
/// runtime plus turnover has elapsed.
///
/// # Errors
///
/// Returns an error if the actor is not staff or any of the rules fail.
pub fn create_show(
    persistence: &mut Persistence,
    request: &ShowRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ShowInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_show")?;
    let validated: ValidatedShow = validate_show_request(persistence, request, None)?;

    let show_id: i64 = persistence.create_show(&ShowInput {
        movie_id: request.movie_id,
        theatre_id: request.theatre_id,
        seat_template_id: request.seat_template_id,
        screen: request.screen,
        start_time: &validated.start_time,
        end_time: &validated.end_time,
        format: validated.format.as_str(),
        language: &validated.language,
    })?;
    let show: ShowData = load_show(persistence, show_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CreateShow"), None),
        AuditTarget::new("show", show_id),
        StateSnapshot::absent(),
        show_snapshot(&show),
    )?;

    info!(
        show_id,
        theatre_id = show.theatre_id,
        screen = show.screen,
        start_time = %show.start_time,
        "Show scheduled"
    );
    show_info(persistence, show)
}

/// Reschedules or edits a scheduled show.
///
/// Once tickets are sold the movie, theatre and seat template are fixed.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the show is not scheduled,
/// or the new schedule breaks a rule.
pub fn update_show(
    persistence: &mut Persistence,
    show_id: i64,
    request: &ShowRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ShowInfo, ApiError> {
    AuthorizationService::require_staff(actor, "update_show")?;
    let before: ShowData = load_show(persistence, show_id)?;

    if before.status.parse::<ShowStatus>()? != ShowStatus::Scheduled {
        return Err(rule_violation(
            "show_editable",
            format!("Show {show_id} is {} and cannot be edited", before.status),
        ));
    }

    let ticket_count: i64 = persistence.count_tickets_for_show(show_id)?;
    if ticket_count > 0
        && (request.movie_id != before.movie_id
            || request.theatre_id != before.theatre_id
            || request.seat_template_id != before.seat_template_id)
    {
        return Err(conflict(
            "Show",
            format!(
                "Show {show_id} has {ticket_count} ticket(s); its movie, theatre and seat template cannot change"
            ),
        ));
    }

    let validated: ValidatedShow = validate_show_request(persistence, request, Some(show_id))?;
    persistence.update_show(
        show_id,
        &ShowInput {
            movie_id: request.movie_id,
            theatre_id: request.theatre_id,
            seat_template_id: request.seat_template_id,
            screen: request.screen,
            start_time: &validated.start_time,
            end_time: &validated.end_time,
            format: validated.format.as_str(),
            language: &validated.language,
        },
    )?;
    let after: ShowData = load_show(persistence, show_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdateShow"), None),
        AuditTarget::new("show", show_id),
        show_snapshot(&before),
        show_snapshot(&after),
    )?;

    show_info(persistence, after)
}

fn transition_show(show: &ShowData, target: ShowStatus) -> Result<(), ApiError> {
    let current: ShowStatus = show.status.parse()?;
    if current.can_transition_to(target) {
        Ok(())
    } else {
        Err(DomainError::InvalidStatusTransition {
            kind: "show",
            from: current.to_string(),
            to: target.to_string(),
        }
        .into())
    }
}

/// Cancels a scheduled show and every confirmed booking for it.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the show is not scheduled.
pub fn cancel_show(
    persistence: &mut Persistence,
    show_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CancelShowResponse, ApiError> {
    AuthorizationService::require_staff(actor, "cancel_show")?;
    let before: ShowData = load_show(persistence, show_id)?;
    transition_show(&before, ShowStatus::Cancelled)?;

    let cancelled_bookings: usize = persistence.cancel_show(show_id)?;
    let after: ShowData = load_show(persistence, show_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("CancelShow"),
            Some(format!("Cancelled {cancelled_bookings} booking(s)")),
        ),
        AuditTarget::new("show", show_id),
        show_snapshot(&before),
        show_snapshot(&after),
    )?;

    warn!(show_id, cancelled_bookings, "Show cancelled");
    Ok(CancelShowResponse {
        show_id,
        cancelled_bookings,
        message: format!("Show cancelled; {cancelled_bookings} booking(s) cancelled"),
    })
}

/// Marks a show that has started as completed.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the show is not scheduled,
/// or it has not started yet.
pub fn complete_show(
    persistence: &mut Persistence,
    show_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ShowInfo, ApiError> {
    AuthorizationService::require_staff(actor, "complete_show")?;
    let before: ShowData = load_show(persistence, show_id)?;
    transition_show(&before, ShowStatus::Completed)?;

    if OffsetDateTime::now_utc() < parse_timestamp(&before.start_time)? {
        return Err(rule_violation(
            "show_started",
            format!("Show {show_id} has not started yet"),
        ));
    }

    persistence.set_show_status(show_id, ShowStatus::Completed.as_str())?;
    let after: ShowData = load_show(persistence, show_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CompleteShow"), None),
        AuditTarget::new("show", show_id),
        show_snapshot(&before),
        show_snapshot(&after),
    )?;

    show_info(persistence, after)
}

/// Deletes a show that never sold a ticket.
///
/// # Errors
///
/// Returns an error if the actor is not staff or tickets exist.
pub fn delete_show(
    persistence: &mut Persistence,
    show_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_show")?;
    let show: ShowData = load_show(persistence, show_id)?;

    let ticket_count: i64 = persistence.count_tickets_for_show(show_id)?;
    if ticket_count > 0 {
        return Err(conflict(
            "Show",
            format!("Show {show_id} has {ticket_count} ticket(s); cancel it instead"),
        ));
    }

    persistence.delete_show(show_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("DeleteShow"), None),
        AuditTarget::new("show", show_id),
        show_snapshot(&show),
        StateSnapshot::absent(),
    )?;

    Ok(())
}
