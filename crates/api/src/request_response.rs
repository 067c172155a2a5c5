// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests derive `Deserialize` so the server can decode JSON bodies and
//! query strings into them directly. Responses derive `Serialize`.

use marquee_domain::{PriceQuote, SeatLayout, SeatMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Common
// ============================================================================

/// A plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Paging parameters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A capability flag, serialized as a boolean.
///
/// Capabilities are advisory UI hints. Handlers enforce authorization
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Allowed,
    Denied,
}

impl Capability {
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }

    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// Account-level capabilities of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapabilities {
    pub can_book_tickets: Capability,
    /// Movies and categories.
    pub can_manage_catalog: Capability,
    /// Shows and customer bookings.
    pub can_manage_schedule: Capability,
    /// Theatres, pricing tiers and seat templates.
    pub can_manage_venues: Capability,
    pub can_manage_users: Capability,
    pub can_send_notifications: Capability,
    /// Operational logs.
    pub can_view_logs: Capability,
    /// Audit trail and log purging.
    pub can_view_audit: Capability,
}

/// What the signed-in admin may do to a listed user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCapabilities {
    pub can_disable: Capability,
    pub can_enable: Capability,
    pub can_edit_roles: Capability,
    pub can_reset_password: Capability,
    pub can_delete: Capability,
}

/// What the signed-in user may do to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCapabilities {
    pub can_cancel: Capability,
}

// ============================================================================
// Account
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub csrf_token: String,
    pub expires_at: String,
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
}

/// The signed-in user and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    /// The highest role held.
    pub effective_role: Option<String>,
    pub capabilities: GlobalCapabilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapStatusResponse {
    /// True until the first admin account exists.
    pub needs_bootstrap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapAdminRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
}

// ============================================================================
// Users (admin)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_disabled: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
    pub capabilities: UserCapabilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirmation: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRolesRequest {
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub new_password_confirmation: String,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category_id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListMoviesQuery {
    /// Defaults to everything except archived movies.
    pub status: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInfo {
    pub movie_id: i64,
    pub title: String,
    pub synopsis: String,
    pub duration_minutes: i32,
    pub rating: String,
    pub language: String,
    pub release_date: String,
    pub poster_url: Option<String>,
    pub status: String,
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMoviesResponse {
    pub movies: Vec<MovieInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetailResponse {
    pub movie: MovieInfo,
    /// Scheduled shows that have not started, soonest first.
    pub upcoming_shows: Vec<ShowInfo>,
}

/// Fields for creating or replacing a movie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieRequest {
    pub title: String,
    #[serde(default)]
    pub synopsis: String,
    pub duration_minutes: i32,
    pub rating: String,
    pub language: String,
    /// `YYYY-MM-DD`.
    pub release_date: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetMovieStatusRequest {
    pub status: String,
}

// ============================================================================
// Theatres, pricing tiers and seat templates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatreInfo {
    pub theatre_id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub timezone: String,
    pub screen_count: i32,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTheatresResponse {
    pub theatres: Vec<TheatreInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TheatreRequest {
    pub name: String,
    pub city: String,
    pub address: String,
    /// IANA zone name, e.g. `America/Chicago`.
    pub timezone: String,
    pub screen_count: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTierInfo {
    pub tier_id: i64,
    pub code: String,
    pub name: String,
    pub base_price_cents: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPricingTiersResponse {
    pub tiers: Vec<PricingTierInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePricingTierRequest {
    pub code: String,
    pub name: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Tier codes are referenced by seat layouts and cannot change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatePricingTierRequest {
    pub name: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// The price of one tier at one theatre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatrePriceInfo {
    pub tier_id: i64,
    pub tier_code: String,
    pub tier_name: String,
    pub base_price_cents: i64,
    pub override_price_cents: Option<i64>,
    pub effective_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTheatrePricingResponse {
    pub theatre_id: i64,
    pub prices: Vec<TheatrePriceInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetTheatrePriceRequest {
    pub tier_id: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTemplateInfo {
    pub seat_template_id: i64,
    pub name: String,
    pub layout: SeatLayout,
    pub seat_count: i32,
    pub created_at: String,
    /// Number of shows using this template; a used template is frozen.
    pub show_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSeatTemplatesResponse {
    pub templates: Vec<SeatTemplateInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeatTemplateRequest {
    pub name: String,
    pub layout: SeatLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTemplatePreviewResponse {
    pub seat_template_id: i64,
    pub seat_count: i32,
    pub seat_map: SeatMap,
}

// ============================================================================
// Shows and seats
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListShowsQuery {
    pub movie_id: Option<i64>,
    pub theatre_id: Option<i64>,
    /// Shows starting at or after this RFC 3339 time. Defaults to now.
    pub from: Option<String>,
    /// Shows starting before this RFC 3339 time.
    pub to: Option<String>,
    #[serde(default)]
    pub include_cancelled: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowInfo {
    pub show_id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    pub theatre_id: i64,
    pub theatre_name: String,
    pub seat_template_id: i64,
    pub screen: i32,
    pub start_time: String,
    pub end_time: String,
    /// Start time in the theatre's timezone.
    pub local_start_time: String,
    pub format: String,
    pub language: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListShowsResponse {
    pub shows: Vec<ShowInfo>,
}

/// Fields for creating or rescheduling a show.
///
/// The end time is derived from the movie runtime plus turnover.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShowRequest {
    pub movie_id: i64,
    pub theatre_id: i64,
    pub seat_template_id: i64,
    pub screen: i32,
    /// RFC 3339.
    pub start_time: String,
    #[serde(default = "default_format")]
    pub format: String,
    pub language: String,
}

fn default_format() -> String {
    String::from("Standard")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelShowResponse {
    pub show_id: i64,
    pub cancelled_bookings: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPriceInfo {
    pub tier_code: String,
    /// Tier price at the theatre plus the format surcharge.
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMapResponse {
    pub show_id: i64,
    pub seat_map: SeatMap,
    pub prices: Vec<TierPriceInfo>,
    pub available_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteRequest {
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub show_id: i64,
    pub quote: PriceQuote,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    pub show_id: i64,
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListBookingsQuery {
    pub user_id: Option<i64>,
    pub show_id: Option<i64>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    pub booking_id: i64,
    pub booking_reference: String,
    pub user_id: i64,
    pub show_id: i64,
    pub status: String,
    pub subtotal_cents: i64,
    pub fees_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: String,
    pub cancelled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInfo {
    pub ticket_id: i64,
    pub seat_label: String,
    pub tier_code: String,
    pub price_cents: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingInfo>,
}

/// A booking with its tickets and show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetailResponse {
    pub booking: BookingInfo,
    pub tickets: Vec<TicketInfo>,
    pub show: ShowInfo,
    pub capabilities: BookingCapabilities,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub template_id: i64,
    pub name: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub placeholders: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<TemplateInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
    /// `Email`, `Sms` or `Push`.
    pub channel: String,
    #[serde(default)]
    pub subject: String,
    pub body: String,
}

/// Sample values for a template preview; missing variables use defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PreviewTemplateRequest {
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewTemplateResponse {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub template_id: i64,
    /// `AllCustomers`, `Role` or `MovieBookers`.
    pub audience: String,
    /// Role name or movie ID, depending on the audience.
    #[serde(default)]
    pub audience_ref: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListCampaignsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub campaign_id: i64,
    pub name: String,
    pub template_id: i64,
    pub audience: String,
    pub audience_ref: Option<String>,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub sent_at: Option<String>,
    pub recipient_count: i32,
    pub created_by: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCampaignsResponse {
    pub campaigns: Vec<CampaignInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCampaignResponse {
    pub campaign_id: i64,
    pub recipient_count: usize,
    /// Audience members without an address on the template's channel.
    pub skipped_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub delivery_id: i64,
    pub user_id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDeliveriesResponse {
    pub campaign_id: i64,
    pub deliveries: Vec<DeliveryInfo>,
}

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListLogsQuery {
    /// Minimum level; entries at this level and above are returned.
    pub level: Option<String>,
    pub source: Option<String>,
    pub since: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogInfo {
    pub log_id: i64,
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLogsResponse {
    pub logs: Vec<LogInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListAuditEventsQuery {
    pub actor_user_id: Option<i64>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub action: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    pub event_id: Option<i64>,
    pub actor_login: String,
    pub actor_type: String,
    pub actor_user_id: Option<i64>,
    pub cause: String,
    pub action: String,
    pub details: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub before: String,
    pub after: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAuditEventsResponse {
    pub events: Vec<AuditEventInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PurgeLogsRequest {
    /// Delete entries older than this many days.
    pub older_than_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeLogsResponse {
    pub deleted: usize,
    pub cutoff: String,
}
