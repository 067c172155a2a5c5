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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod booking;
mod error;
mod notification;
mod pricing;
mod seat_map;
mod showtime;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{
    REFERENCE_LENGTH, REFERENCE_PREFIX, can_cancel_booking, generate_booking_reference,
    is_booking_reference,
};
pub use error::DomainError;
pub use notification::{
    MAX_SMS_LENGTH, TEMPLATE_VARIABLES, render_template, template_placeholders, validate_template,
};
pub use pricing::{
    CONVENIENCE_FEE_CENTS, MAX_PRICE_CENTS, MAX_SEATS_PER_BOOKING, PriceBook, PriceQuote, QuoteLine,
    TAX_RATE_BASIS_POINTS, quote, tax_on,
};
pub use seat_map::{
    MAX_ROWS, MAX_SEATS_PER_ROW, RowSpec, Seat, SeatLayout, SeatMap, SeatRow, SeatState,
    generate_seat_map, parse_seat_label, seat_label,
};
pub use showtime::{
    TURNOVER_MINUTES, format_timestamp, local_start_time, parse_timestamp, show_end_time,
    shows_overlap,
};

// Re-export public types
pub use types::{
    Audience, BookingStatus, CampaignStatus, Email, LogLevel, MovieStatus, NotificationChannel,
    ROLE_ADMIN, ROLE_CUSTOMER, ROLE_MANAGER, ROLES, RATINGS, ShowFormat, ShowStatus, Slug,
    TicketStatus,
};
pub use validation::{
    MAX_DURATION_MINUTES, MAX_SCREEN_COUNT, MAX_TITLE_LENGTH, slugify, validate_category_name,
    validate_display_name, validate_email, validate_movie, validate_phone, validate_price,
    validate_pricing_tier, validate_screen, validate_theatre, validate_timezone,
};
