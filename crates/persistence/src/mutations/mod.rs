// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes, grouped by area.
//!
//! Multi-row writes run inside a single transaction so a failure leaves
//! no partial state behind.

pub mod bookings;
pub mod catalog;
pub mod notifications;
pub mod operations;
pub mod shows;
pub mod users;
pub mod venues;
