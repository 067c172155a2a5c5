// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers, grouped by audience.
//!
//! Handlers lock the shared persistence, call one API operation, and shape
//! the result. Rules and authorization live in `marquee-api`.

pub mod account;
pub mod admin;
pub mod bookings;
pub mod catalog;
pub mod notifications;
pub mod public;
pub mod venues;
