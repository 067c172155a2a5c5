// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries, grouped by area.
//!
//! Every query is generated twice by `backend_fn!`, once per backend.

pub mod bookings;
pub mod catalog;
pub mod notifications;
pub mod operations;
pub mod shows;
pub mod users;
pub mod venues;
