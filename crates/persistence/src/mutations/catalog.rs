// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Category and movie mutations.

use diesel::prelude::*;
#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::MovieInput;
use crate::diesel_schema::{categories, movie_categories, movies};
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Creates a category.
///
/// # Errors
///
/// Returns an error if the name or slug already exists.
pub fn create_category(conn: &mut _, name: &str, slug: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(categories::table)
        .values((categories::name.eq(name.trim()), categories::slug.eq(slug)))
        .execute(conn)?;

    let category_id: i64 = conn.get_last_insert_rowid()?;
    info!(category_id, slug, "Category created");
    Ok(category_id)
}
}

backend_fn! {
/// Deletes a category. Movie assignments are removed with it.
///
/// # Errors
///
/// Returns an error if the category does not exist.
pub fn delete_category(conn: &mut _, category_id: i64) -> Result<(), PersistenceError> {
    let rows: usize =
        diesel::delete(categories::table.filter(categories::category_id.eq(category_id)))
            .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Category {category_id} not found"
        )));
    }
    info!(category_id, "Category deleted");
    Ok(())
}
}

backend_fn! {
/// Creates a movie in `ComingSoon` status.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_movie(conn: &mut _, input: &MovieInput<'_>) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(movies::table)
        .values((
            movies::title.eq(input.title.trim()),
            movies::synopsis.eq(input.synopsis),
            movies::duration_minutes.eq(input.duration_minutes),
            movies::rating.eq(input.rating),
            movies::language.eq(input.language),
            movies::release_date.eq(input.release_date),
            movies::poster_url.eq(input.poster_url),
            movies::created_at.eq(&now),
            movies::updated_at.eq(&now),
        ))
        .execute(conn)?;

    let movie_id: i64 = conn.get_last_insert_rowid()?;
    info!(movie_id, title = input.title, "Movie created");
    Ok(movie_id)
}
}

backend_fn! {
/// Replaces a movie's editable fields.
///
/// # Errors
///
/// Returns an error if the movie does not exist or the update fails.
pub fn update_movie(
    conn: &mut _,
    movie_id: i64,
    input: &MovieInput<'_>,
) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;

    let rows: usize = diesel::update(movies::table.filter(movies::movie_id.eq(movie_id)))
        .set((
            movies::title.eq(input.title.trim()),
            movies::synopsis.eq(input.synopsis),
            movies::duration_minutes.eq(input.duration_minutes),
            movies::rating.eq(input.rating),
            movies::language.eq(input.language),
            movies::release_date.eq(input.release_date),
            movies::poster_url.eq(input.poster_url),
            movies::updated_at.eq(&now),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Movie {movie_id} not found")));
    }
    Ok(())
}
}

backend_fn! {
/// Sets a movie's status. Transition rules are enforced by the caller.
///
/// # Errors
///
/// Returns an error if the movie does not exist or the update fails.
pub fn set_movie_status(conn: &mut _, movie_id: i64, status: &str) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;

    let rows: usize = diesel::update(movies::table.filter(movies::movie_id.eq(movie_id)))
        .set((movies::status.eq(status), movies::updated_at.eq(&now)))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Movie {movie_id} not found")));
    }
    info!(movie_id, status, "Movie status changed");
    Ok(())
}
}

backend_fn! {
/// Deletes a movie. Fails with a foreign key violation if shows exist.
///
/// # Errors
///
/// Returns an error if the movie does not exist or is still referenced.
pub fn delete_movie(conn: &mut _, movie_id: i64) -> Result<(), PersistenceError> {
    let rows: usize =
        diesel::delete(movies::table.filter(movies::movie_id.eq(movie_id))).execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Movie {movie_id} not found")));
    }
    info!(movie_id, "Movie deleted");
    Ok(())
}
}

backend_fn! {
/// Replaces the categories assigned to a movie.
///
/// # Errors
///
/// Returns an error if a category does not exist. On error the previous
/// assignment is kept.
pub fn set_movie_categories(
    conn: &mut _,
    movie_id: i64,
    category_ids: &[i64],
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::delete(movie_categories::table.filter(movie_categories::movie_id.eq(movie_id)))
            .execute(conn)?;

        for category_id in category_ids {
            diesel::insert_into(movie_categories::table)
                .values((
                    movie_categories::movie_id.eq(movie_id),
                    movie_categories::category_id.eq(*category_id),
                ))
                .execute(conn)?;
        }
        Ok(())
    })
}
}
