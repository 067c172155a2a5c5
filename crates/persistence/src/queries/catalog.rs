// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Category and movie queries.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{CategoryData, MovieData, MovieFilter};
use crate::diesel_schema::{categories, movie_categories, movies, shows};
use crate::error::PersistenceError;
use crate::paginate;

#[derive(Queryable, Selectable)]
#[diesel(table_name = categories)]
struct CategoryRow {
    category_id: i64,
    name: String,
    slug: String,
}

impl From<CategoryRow> for CategoryData {
    fn from(row: CategoryRow) -> Self {
        Self {
            category_id: row.category_id,
            name: row.name,
            slug: row.slug,
        }
    }
}

/// Diesel Queryable struct for movie rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = movies)]
struct MovieRow {
    movie_id: i64,
    title: String,
    synopsis: String,
    duration_minutes: i32,
    rating: String,
    language: String,
    release_date: String,
    poster_url: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<MovieRow> for MovieData {
    fn from(row: MovieRow) -> Self {
        Self {
            movie_id: row.movie_id,
            title: row.title,
            synopsis: row.synopsis,
            duration_minutes: row.duration_minutes,
            rating: row.rating,
            language: row.language,
            release_date: row.release_date,
            poster_url: row.poster_url,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

backend_fn! {
/// Lists all categories ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_categories(conn: &mut _) -> Result<Vec<CategoryData>, PersistenceError> {
    let rows: Vec<CategoryRow> = categories::table
        .order(categories::name.asc())
        .select(CategoryRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(CategoryData::from).collect())
}
}

backend_fn! {
/// Retrieves a movie by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the movie is not found.
pub fn get_movie(conn: &mut _, movie_id: i64) -> Result<Option<MovieData>, PersistenceError> {
    debug!(movie_id, "Looking up movie");

    let row: Option<MovieRow> = movies::table
        .filter(movies::movie_id.eq(movie_id))
        .select(MovieRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(MovieData::from))
}
}

backend_fn! {
/// Lists movies matching a filter, ordered by title.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_movies(conn: &mut _, filter: &MovieFilter) -> Result<Vec<MovieData>, PersistenceError> {
    let mut query = movies::table.select(MovieRow::as_select()).into_boxed();

    if let Some(status) = &filter.status {
        query = query.filter(movies::status.eq(status.clone()));
    }
    if let Some(slug) = &filter.category_slug {
        let movie_ids: Vec<i64> = movie_categories::table
            .inner_join(categories::table)
            .filter(categories::slug.eq(slug))
            .select(movie_categories::movie_id)
            .load(conn)?;
        query = query.filter(movies::movie_id.eq_any(movie_ids));
    }

    let rows: Vec<MovieRow> = query
        .order((movies::title.asc(), movies::movie_id.asc()))
        .load(conn)?;

    let needle: Option<String> = filter.search.as_ref().map(|s| s.trim().to_lowercase());
    let matching = rows.into_iter().map(MovieData::from).filter(|movie| {
        needle
            .as_ref()
            .is_none_or(|n| movie.title.to_lowercase().contains(n.as_str()))
    });

    Ok(paginate(matching, filter.limit, filter.offset))
}
}

backend_fn! {
/// Lists the categories of a movie ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_movie_categories(
    conn: &mut _,
    movie_id: i64,
) -> Result<Vec<CategoryData>, PersistenceError> {
    let rows: Vec<CategoryRow> = movie_categories::table
        .inner_join(categories::table)
        .filter(movie_categories::movie_id.eq(movie_id))
        .order(categories::name.asc())
        .select(CategoryRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(CategoryData::from).collect())
}
}

backend_fn! {
/// Counts the shows scheduled for a movie, in any status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_shows_for_movie(conn: &mut _, movie_id: i64) -> Result<i64, PersistenceError> {
    let count: i64 = shows::table
        .filter(shows::movie_id.eq(movie_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
}
