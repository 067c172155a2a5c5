// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Show queries.
//!
//! Start and end times are RFC 3339 UTC strings with a fixed width, so
//! string comparison orders them chronologically on both backends.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;

use crate::data_models::{ShowData, ShowFilter};
use crate::diesel_schema::{shows, tickets};
use crate::error::PersistenceError;
use crate::page_limit;

#[derive(Queryable, Selectable)]
#[diesel(table_name = shows)]
struct ShowRow {
    show_id: i64,
    movie_id: i64,
    theatre_id: i64,
    seat_template_id: i64,
    screen: i32,
    start_time: String,
    end_time: String,
    format: String,
    language: String,
    status: String,
    created_at: String,
}

impl From<ShowRow> for ShowData {
    fn from(row: ShowRow) -> Self {
        Self {
            show_id: row.show_id,
            movie_id: row.movie_id,
            theatre_id: row.theatre_id,
            seat_template_id: row.seat_template_id,
            screen: row.screen,
            start_time: row.start_time,
            end_time: row.end_time,
            format: row.format,
            language: row.language,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

backend_fn! {
/// Retrieves a show by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the show is not found.
pub fn get_show(conn: &mut _, show_id: i64) -> Result<Option<ShowData>, PersistenceError> {
    let row: Option<ShowRow> = shows::table
        .filter(shows::show_id.eq(show_id))
        .select(ShowRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(ShowData::from))
}
}

backend_fn! {
/// Lists shows matching a filter, ordered by start time.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_shows(conn: &mut _, filter: &ShowFilter) -> Result<Vec<ShowData>, PersistenceError> {
    let mut query = shows::table.select(ShowRow::as_select()).into_boxed();

    if let Some(movie_id) = filter.movie_id {
        query = query.filter(shows::movie_id.eq(movie_id));
    }
    if let Some(theatre_id) = filter.theatre_id {
        query = query.filter(shows::theatre_id.eq(theatre_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(shows::status.eq(status.clone()));
    }
    if let Some(after) = &filter.starts_after {
        query = query.filter(shows::start_time.ge(after.clone()));
    }
    if let Some(before) = &filter.starts_before {
        query = query.filter(shows::start_time.lt(before.clone()));
    }

    let rows: Vec<ShowRow> = query
        .order((shows::start_time.asc(), shows::show_id.asc()))
        .offset(filter.offset.unwrap_or(0).max(0))
        .limit(page_limit(filter.limit))
        .load(conn)?;
    Ok(rows.into_iter().map(ShowData::from).collect())
}
}

backend_fn! {
/// Lists the non-cancelled shows on one screen of a theatre.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `theatre_id` - The theatre
/// * `screen` - The screen number
/// * `exclude_show_id` - A show to leave out, used when rescheduling it
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_shows_on_screen(
    conn: &mut _,
    theatre_id: i64,
    screen: i32,
    exclude_show_id: Option<i64>,
) -> Result<Vec<ShowData>, PersistenceError> {
    let mut query = shows::table
        .filter(shows::theatre_id.eq(theatre_id))
        .filter(shows::screen.eq(screen))
        .filter(shows::status.ne("Cancelled"))
        .select(ShowRow::as_select())
        .into_boxed();

    if let Some(excluded) = exclude_show_id {
        query = query.filter(shows::show_id.ne(excluded));
    }

    let rows: Vec<ShowRow> = query.order(shows::start_time.asc()).load(conn)?;
    Ok(rows.into_iter().map(ShowData::from).collect())
}
}

backend_fn! {
/// Counts the tickets ever issued for a show, in any status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_tickets_for_show(conn: &mut _, show_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = tickets::table
        .filter(tickets::show_id.eq(show_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}
