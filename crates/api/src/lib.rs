// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for Marquee.
//!
//! This crate sits between the HTTP server and the persistence layer. It
//! owns authentication, role checks, request validation, and the mapping of
//! domain and storage failures onto API errors. It knows nothing about HTTP.

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

mod auth;
mod capabilities;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    AccountFields, AuthenticatedActor, AuthenticationService, AuthorizationService,
    EstablishedSession, Role,
};
pub use capabilities::{
    compute_booking_capabilities, compute_global_capabilities, compute_user_capabilities,
};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use handlers::{
    bootstrap_admin, bootstrap_status, cancel_booking, cancel_campaign, cancel_my_booking,
    cancel_show, change_password, checkout, complete_show, create_campaign, create_category,
    create_movie, create_pricing_tier, create_seat_template, create_show, create_template,
    create_theatre, create_user, delete_category, delete_movie, delete_pricing_tier,
    delete_seat_template, delete_show, delete_template, delete_theatre, delete_user,
    disable_user, enable_user, export_bookings_csv, get_booking, get_movie, get_seat_map,
    get_show, get_user, list_audit_events, list_bookings, list_campaigns, list_categories,
    list_deliveries, list_logs, list_movies, list_my_bookings, list_pricing_tiers,
    list_seat_templates, list_shows, list_templates, list_theatre_pricing, list_theatres,
    list_users, login, logout, preview_seat_template, preview_template, purge_logs,
    quote_seats, record_log, register, remove_theatre_price, reset_password, send_campaign,
    set_movie_status, set_theatre_price, update_movie, update_pricing_tier, update_profile,
    update_seat_template, update_show, update_template, update_theatre, update_user_roles,
    whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AuditEventInfo, BookingCapabilities, BookingDetailResponse, BookingInfo,
    BootstrapAdminRequest, BootstrapStatusResponse, CampaignInfo, CancelShowResponse,
    Capability, CategoryInfo, ChangePasswordRequest, CheckoutRequest, CreateCampaignRequest,
    CreateCategoryRequest, CreatePricingTierRequest, CreateUserRequest, DeliveryInfo,
    GlobalCapabilities, ListAuditEventsQuery, ListAuditEventsResponse, ListBookingsQuery,
    ListBookingsResponse, ListCampaignsQuery, ListCampaignsResponse, ListCategoriesResponse,
    ListDeliveriesResponse, ListLogsQuery, ListLogsResponse, ListMoviesQuery,
    ListMoviesResponse, ListPricingTiersResponse, ListSeatTemplatesResponse, ListShowsQuery,
    ListShowsResponse, ListTemplatesResponse, ListTheatrePricingResponse, ListTheatresResponse,
    ListUsersQuery, ListUsersResponse, LogInfo, LoginRequest, LoginResponse, MessageResponse,
    MovieDetailResponse, MovieInfo, MovieRequest, PageQuery, PreviewTemplateRequest,
    PreviewTemplateResponse, PricingTierInfo, PurgeLogsRequest, PurgeLogsResponse,
    QuoteRequest, QuoteResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    SeatMapResponse, SeatTemplateInfo, SeatTemplatePreviewResponse, SeatTemplateRequest,
    SendCampaignResponse, SetMovieStatusRequest, SetTheatrePriceRequest, ShowInfo, ShowRequest,
    TemplateInfo, TemplateRequest, TheatreInfo, TheatrePriceInfo, TheatreRequest, TicketInfo,
    TierPriceInfo, UpdatePricingTierRequest, UpdateProfileRequest, UpdateUserRolesRequest,
    UserCapabilities, UserInfo, WhoAmIResponse,
};
