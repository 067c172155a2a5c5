// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Plain data carried across the persistence boundary.
//!
//! Status columns are returned as their stored strings; callers parse
//! them into domain enums.

use serde::{Deserialize, Serialize};

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// Filter for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Only users holding this role.
    pub role: Option<String>,
    pub include_disabled: bool,
    /// Case-insensitive substring of email or display name.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub display_name: &'a str,
    pub phone: Option<&'a str>,
    /// Plain-text password; hashed before storage.
    pub password: &'a str,
    pub roles: &'a [&'a str],
}

/// A login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub csrf_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryData {
    pub category_id: i64,
    pub name: String,
    pub slug: String,
}

/// A catalog movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieData {
    pub movie_id: i64,
    pub title: String,
    pub synopsis: String,
    pub duration_minutes: i32,
    pub rating: String,
    pub language: String,
    pub release_date: String,
    pub poster_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable movie fields.
#[derive(Debug, Clone)]
pub struct MovieInput<'a> {
    pub title: &'a str,
    pub synopsis: &'a str,
    pub duration_minutes: i32,
    pub rating: &'a str,
    pub language: &'a str,
    pub release_date: &'a str,
    pub poster_url: Option<&'a str>,
}

/// Filter for listing movies.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub status: Option<String>,
    pub category_slug: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatreData {
    pub theatre_id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub timezone: String,
    pub screen_count: i32,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct TheatreInput<'a> {
    pub name: &'a str,
    pub city: &'a str,
    pub address: &'a str,
    pub timezone: &'a str,
    pub screen_count: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTierData {
    pub tier_id: i64,
    pub code: String,
    pub name: String,
    pub base_price_cents: i64,
    pub description: Option<String>,
}

/// A theatre-specific override of a tier price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatrePriceData {
    pub theatre_id: i64,
    pub tier_id: i64,
    pub tier_code: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTemplateData {
    pub seat_template_id: i64,
    pub name: String,
    pub layout_json: String,
    pub seat_count: i32,
    pub created_at: String,
}

/// A scheduled screening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowData {
    pub show_id: i64,
    pub movie_id: i64,
    pub theatre_id: i64,
    pub seat_template_id: i64,
    pub screen: i32,
    pub start_time: String,
    pub end_time: String,
    pub format: String,
    pub language: String,
    pub status: String,
    pub created_at: String,
}

/// Editable show fields. Times are RFC 3339 UTC.
#[derive(Debug, Clone)]
pub struct ShowInput<'a> {
    pub movie_id: i64,
    pub theatre_id: i64,
    pub seat_template_id: i64,
    pub screen: i32,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub format: &'a str,
    pub language: &'a str,
}

/// Filter for listing shows.
#[derive(Debug, Clone, Default)]
pub struct ShowFilter {
    pub movie_id: Option<i64>,
    pub theatre_id: Option<i64>,
    pub status: Option<String>,
    /// Shows starting at or after this RFC 3339 time.
    pub starts_after: Option<String>,
    /// Shows starting before this RFC 3339 time.
    pub starts_before: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingData {
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
pub struct TicketData {
    pub ticket_id: i64,
    pub booking_id: i64,
    pub show_id: i64,
    pub seat_label: String,
    pub tier_code: String,
    pub price_cents: i64,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub seat_label: String,
    pub tier_code: String,
    pub price_cents: i64,
}

/// A booking and its tickets, written in one transaction.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_reference: String,
    pub user_id: i64,
    pub show_id: i64,
    pub subtotal_cents: i64,
    pub fees_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub tickets: Vec<NewTicket>,
}

/// Filter for listing bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_id: Option<i64>,
    pub show_id: Option<i64>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplateData {
    pub template_id: i64,
    pub name: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignData {
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

#[derive(Debug, Clone)]
pub struct NewCampaign<'a> {
    pub name: &'a str,
    pub template_id: i64,
    pub audience: &'a str,
    pub audience_ref: Option<&'a str>,
    pub scheduled_at: Option<&'a str>,
    pub created_by: i64,
}

/// A rendered notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryData {
    pub delivery_id: i64,
    pub campaign_id: i64,
    pub user_id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub user_id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// An operational log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLogData {
    pub log_id: i64,
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<String>,
    pub created_at: String,
}

/// Filter for listing operational logs.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Only entries at these levels.
    pub levels: Vec<String>,
    pub source: Option<String>,
    /// Entries created at or after this RFC 3339 time.
    pub since: Option<String>,
    pub limit: Option<i64>,
}

/// Filter for listing audit events.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub actor_user_id: Option<i64>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub action_name: Option<String>,
    pub limit: Option<i64>,
}
