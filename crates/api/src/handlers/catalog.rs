// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Movie and category handlers.

use std::collections::HashSet;

use marquee_audit::{Action, AuditTarget, Cause, StateSnapshot};
use marquee_domain::{
    DomainError, MovieStatus, ShowStatus, Slug, format_timestamp, parse_timestamp,
    validate_category_name, validate_movie,
};
use marquee_persistence::{
    CategoryData, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MovieData, MovieFilter, MovieInput,
    Persistence, PersistenceError, ShowData, ShowFilter,
};
use num_traits::cast::ToPrimitive;
use time::OffsetDateTime;
use tracing::info;

use super::{
    category_info, conflict, invalid_input, load_movie, movie_info, movie_snapshot, non_blank,
    not_found, record_audit, show_infos,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    CategoryInfo, CreateCategoryRequest, ListCategoriesResponse, ListMoviesQuery,
    ListMoviesResponse, MovieDetailResponse, MovieInfo, MovieRequest, SetMovieStatusRequest,
};

/// Lists catalog movies.
///
/// Without a status filter, archived movies are left out.
///
/// # Errors
///
/// Returns an error if the status filter is unknown or the database fails.
pub fn list_movies(
    persistence: &mut Persistence,
    query: &ListMoviesQuery,
) -> Result<ListMoviesResponse, ApiError> {
    let category_slug: Option<String> = non_blank(query.category.as_deref()).map(String::from);
    let search: Option<String> = non_blank(query.search.as_deref()).map(String::from);

    let movies: Vec<MovieData> = if let Some(status) = non_blank(query.status.as_deref()) {
        let status: MovieStatus = status.parse()?;
        persistence.list_movies(&MovieFilter {
            status: Some(status.as_str().to_string()),
            category_slug,
            search,
            limit: query.limit,
            offset: query.offset,
        })?
    } else {
        let mut visible: Vec<MovieData> = Vec::new();
        for status in [MovieStatus::NowShowing, MovieStatus::ComingSoon] {
            visible.extend(persistence.list_movies(&MovieFilter {
                status: Some(status.as_str().to_string()),
                category_slug: category_slug.clone(),
                search: search.clone(),
                limit: Some(MAX_PAGE_SIZE),
                offset: None,
            })?);
        }
        visible.sort_by(|a, b| a.title.cmp(&b.title).then(a.movie_id.cmp(&b.movie_id)));

        let offset: usize = query.offset.unwrap_or(0).to_usize().unwrap_or(0);
        let limit: usize = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
            .to_usize()
            .unwrap_or(0);
        visible.into_iter().skip(offset).take(limit).collect()
    };

    let movies: Vec<MovieInfo> = movies
        .into_iter()
        .map(|movie| movie_info(persistence, movie))
        .collect::<Result<_, _>>()?;

    Ok(ListMoviesResponse { movies })
}

/// Returns a movie with its upcoming scheduled shows.
///
/// # Errors
///
/// Returns an error if the movie does not exist.
pub fn get_movie(
    persistence: &mut Persistence,
    movie_id: i64,
) -> Result<MovieDetailResponse, ApiError> {
    let movie: MovieData = load_movie(persistence, movie_id)?;
    let now: String = format_timestamp(OffsetDateTime::now_utc())?;

    let shows: Vec<ShowData> = persistence.list_shows(&ShowFilter {
        movie_id: Some(movie_id),
        status: Some(ShowStatus::Scheduled.as_str().to_string()),
        starts_after: Some(now),
        ..ShowFilter::default()
    })?;

    Ok(MovieDetailResponse {
        movie: movie_info(persistence, movie)?,
        upcoming_shows: show_infos(persistence, shows)?,
    })
}

/// Lists all categories.
///
/// # Errors
///
/// Returns an error if the database fails.
pub fn list_categories(persistence: &mut Persistence) -> Result<ListCategoriesResponse, ApiError> {
    let categories: Vec<CategoryInfo> = persistence
        .list_categories()?
        .into_iter()
        .map(category_info)
        .collect();
    Ok(ListCategoriesResponse { categories })
}

/// Validates movie fields and the referenced categories.
fn validate_movie_request(
    persistence: &mut Persistence,
    request: &MovieRequest,
) -> Result<(), ApiError> {
    validate_movie(
        &request.title,
        request.duration_minutes,
        &request.rating,
        &request.language,
    )?;

    // A release date is a calendar date; midnight UTC is only a parse aid.
    let release_date: &str = request.release_date.trim();
    if release_date.len() != 10 || parse_timestamp(&format!("{release_date}T00:00:00Z")).is_err()
    {
        return Err(invalid_input(
            "release_date",
            format!("Release date must be YYYY-MM-DD, got '{release_date}'"),
        ));
    }

    let known: HashSet<i64> = persistence
        .list_categories()?
        .into_iter()
        .map(|c| c.category_id)
        .collect();
    if let Some(missing) = request.category_ids.iter().find(|id| !known.contains(id)) {
        return Err(invalid_input(
            "category_ids",
            format!("Category {missing} does not exist"),
        ));
    }

    Ok(())
}

fn movie_input(request: &MovieRequest) -> MovieInput<'_> {
    MovieInput {
        title: request.title.trim(),
        synopsis: request.synopsis.trim(),
        duration_minutes: request.duration_minutes,
        rating: &request.rating,
        language: request.language.trim(),
        release_date: request.release_date.trim(),
        poster_url: non_blank(request.poster_url.as_deref()),
    }
}

/// Adds a movie to the catalog as `ComingSoon`.
///
/// # Errors
///
/// Returns an error if the actor is not staff or a field is invalid.
pub fn create_movie(
    persistence: &mut Persistence,
    request: &MovieRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<MovieInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_movie")?;
    validate_movie_request(persistence, request)?;

    let movie_id: i64 = persistence.create_movie(&movie_input(request))?;
    persistence.set_movie_categories(movie_id, &request.category_ids)?;
    let movie: MovieData = load_movie(persistence, movie_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("CreateMovie"),
            Some(format!("Added '{}' to the catalog", movie.title)),
        ),
        AuditTarget::new("movie", movie_id),
        StateSnapshot::absent(),
        movie_snapshot(&movie),
    )?;

    info!(movie_id, title = %movie.title, "Movie created");
    movie_info(persistence, movie)
}

/// Replaces a movie's details and categories.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the movie does not exist,
/// or a field is invalid.
pub fn update_movie(
    persistence: &mut Persistence,
    movie_id: i64,
    request: &MovieRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<MovieInfo, ApiError> {
    AuthorizationService::require_staff(actor, "update_movie")?;
    let before: MovieData = load_movie(persistence, movie_id)?;
    validate_movie_request(persistence, request)?;

    persistence.update_movie(movie_id, &movie_input(request))?;
    persistence.set_movie_categories(movie_id, &request.category_ids)?;
    let after: MovieData = load_movie(persistence, movie_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("UpdateMovie"), None),
        AuditTarget::new("movie", movie_id),
        movie_snapshot(&before),
        movie_snapshot(&after),
    )?;

    movie_info(persistence, after)
}

/// Moves a movie along its release lifecycle.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the status is unknown, or
/// the transition is not allowed.
pub fn set_movie_status(
    persistence: &mut Persistence,
    movie_id: i64,
    request: &SetMovieStatusRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<MovieInfo, ApiError> {
    AuthorizationService::require_staff(actor, "set_movie_status")?;
    let before: MovieData = load_movie(persistence, movie_id)?;

    let current: MovieStatus = before.status.parse()?;
    let target: MovieStatus = request.status.trim().parse()?;
    if !current.can_transition_to(target) {
        return Err(DomainError::InvalidStatusTransition {
            kind: "movie",
            from: current.to_string(),
            to: target.to_string(),
        }
        .into());
    }

    persistence.set_movie_status(movie_id, target.as_str())?;
    let after: MovieData = load_movie(persistence, movie_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("SetMovieStatus"),
            Some(format!("{current} -> {target}")),
        ),
        AuditTarget::new("movie", movie_id),
        movie_snapshot(&before),
        movie_snapshot(&after),
    )?;

    movie_info(persistence, after)
}

/// Deletes a movie that has never been scheduled.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the movie does not exist,
/// or any show references it.
pub fn delete_movie(
    persistence: &mut Persistence,
    movie_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_movie")?;
    let movie: MovieData = load_movie(persistence, movie_id)?;

    let show_count: i64 = persistence.count_shows_for_movie(movie_id)?;
    if show_count > 0 {
        return Err(conflict(
            "Movie",
            format!(
                "'{}' has {show_count} show(s); archive it instead",
                movie.title
            ),
        ));
    }

    persistence.delete_movie(movie_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(
            String::from("DeleteMovie"),
            Some(format!("Removed '{}'", movie.title)),
        ),
        AuditTarget::new("movie", movie_id),
        movie_snapshot(&movie),
        StateSnapshot::absent(),
    )?;

    Ok(())
}

/// Creates a category; its slug is derived from the name.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the name is invalid, or
/// the name or slug is taken.
pub fn create_category(
    persistence: &mut Persistence,
    request: &CreateCategoryRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CategoryInfo, ApiError> {
    AuthorizationService::require_staff(actor, "create_category")?;
    let name: &str = request.name.trim();
    validate_category_name(name)?;
    let slug: Slug = Slug::from_name(name)?;

    let category_id: i64 = persistence
        .create_category(name, slug.value())
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => conflict(
                "Category",
                format!("A category named '{name}' or with slug '{slug}' exists"),
            ),
            other => ApiError::from(other),
        })?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("CreateCategory"), None),
        AuditTarget::new("category", category_id),
        StateSnapshot::absent(),
        StateSnapshot::new(format!(
            "category_id={category_id},name={name},slug={slug}"
        )),
    )?;

    Ok(CategoryInfo {
        category_id,
        name: name.to_string(),
        slug: slug.value().to_string(),
    })
}

/// Deletes a category. Movies lose the category but are kept.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the category does not exist.
pub fn delete_category(
    persistence: &mut Persistence,
    category_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<(), ApiError> {
    AuthorizationService::require_staff(actor, "delete_category")?;
    let category: CategoryData = persistence
        .list_categories()?
        .into_iter()
        .find(|c| c.category_id == category_id)
        .ok_or_else(|| not_found("Category", format!("Category {category_id} does not exist")))?;

    persistence.delete_category(category_id)?;

    record_audit(
        persistence,
        actor,
        cause,
        Action::new(String::from("DeleteCategory"), None),
        AuditTarget::new("category", category_id),
        StateSnapshot::new(format!(
            "category_id={},name={},slug={}",
            category.category_id, category.name, category.slug
        )),
        StateSnapshot::absent(),
    )?;

    Ok(())
}
