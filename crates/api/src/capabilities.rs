// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities tell a client which actions the signed-in user may take
//! without leaking domain internals. They are advisory only and do not
//! replace the authorization checks in the handlers.

use marquee_domain::{BookingStatus, ROLE_ADMIN, can_cancel_booking};
use marquee_persistence::{BookingData, Persistence, PersistenceError, UserData};
use time::OffsetDateTime;

use crate::auth::AuthenticatedActor;
use crate::request_response::{
    BookingCapabilities, Capability, GlobalCapabilities, UserCapabilities,
};

/// Computes account-level capabilities for the signed-in user.
#[must_use]
pub fn compute_global_capabilities(actor: &AuthenticatedActor) -> GlobalCapabilities {
    let staff: bool = actor.is_staff();
    let admin: bool = actor.is_admin();

    GlobalCapabilities {
        can_book_tickets: Capability::Allowed,
        can_manage_catalog: Capability::from_bool(staff),
        can_manage_schedule: Capability::from_bool(staff),
        can_manage_venues: Capability::from_bool(staff),
        can_manage_users: Capability::from_bool(admin),
        can_send_notifications: Capability::from_bool(staff),
        can_view_logs: Capability::from_bool(staff),
        can_view_audit: Capability::from_bool(admin),
    }
}

/// Computes what the signed-in user may do to another account.
///
/// Target-specific capabilities depend on:
/// - The actor's role
/// - Whether the target is the actor
/// - Whether the target is the last enabled admin
/// - Whether the target has bookings or appears in the audit trail
///
/// # Errors
///
/// Returns an error if a database query fails.
pub fn compute_user_capabilities(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    target: &UserData,
    target_roles: &[String],
) -> Result<UserCapabilities, PersistenceError> {
    if !actor.is_admin() {
        return Ok(UserCapabilities {
            can_disable: Capability::Denied,
            can_enable: Capability::Denied,
            can_edit_roles: Capability::Denied,
            can_reset_password: Capability::Denied,
            can_delete: Capability::Denied,
        });
    }

    let is_self: bool = actor.user_id == target.user_id;
    let last_admin: bool = !target.is_disabled
        && target_roles.iter().any(|r| r == ROLE_ADMIN)
        && persistence.count_users_with_role(ROLE_ADMIN, true)? <= 1;

    let deletable: bool = !is_self
        && !last_admin
        && persistence.count_bookings_for_user(target.user_id)? == 0
        && persistence.count_deliveries_for_user(target.user_id)? == 0
        && !persistence.is_user_referenced_by_audit(target.user_id)?;

    Ok(UserCapabilities {
        can_disable: Capability::from_bool(!is_self && !target.is_disabled && !last_admin),
        can_enable: Capability::from_bool(target.is_disabled),
        can_edit_roles: Capability::from_bool(!last_admin),
        can_reset_password: Capability::Allowed,
        can_delete: Capability::from_bool(deletable),
    })
}

/// Computes what the signed-in user may do to a booking.
///
/// Owners may cancel a confirmed booking until the show starts; staff may
/// cancel any confirmed booking.
#[must_use]
pub fn compute_booking_capabilities(
    actor: &AuthenticatedActor,
    booking: &BookingData,
    show_start: OffsetDateTime,
    now: OffsetDateTime,
) -> BookingCapabilities {
    let status: Option<BookingStatus> = booking.status.parse().ok();
    let can_cancel: bool = match status {
        Some(BookingStatus::Confirmed) if actor.is_staff() => true,
        Some(status) if actor.user_id == booking.user_id => {
            can_cancel_booking(status, show_start, now).is_ok()
        }
        _ => false,
    };

    BookingCapabilities {
        can_cancel: Capability::from_bool(can_cancel),
    }
}
