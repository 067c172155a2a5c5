// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for movie and category management.

use marquee_audit::AuditEvent;
use marquee_persistence::AuditFilter;

use crate::tests::helpers::{
    create_customer, create_manager, create_show_fixture, create_test_cause,
    create_test_persistence,
};
use crate::{
    ApiError, CreateCategoryRequest, ListMoviesQuery, MovieRequest, SetMovieStatusRequest,
    create_category, create_movie, delete_category, delete_movie, get_movie, list_categories,
    list_movies, set_movie_status, update_movie,
};

fn movie_request(title: &str) -> MovieRequest {
    MovieRequest {
        title: title.to_string(),
        synopsis: String::from("A heist in three acts."),
        duration_minutes: 110,
        rating: String::from("PG-13"),
        language: String::from("English"),
        release_date: String::from("2026-11-20"),
        poster_url: None,
        category_ids: Vec::new(),
    }
}

#[test]
fn test_manager_creates_movie_as_coming_soon() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);

    let movie = create_movie(
        &mut persistence,
        &movie_request("  The Vault  "),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(movie.title, "The Vault");
    assert_eq!(movie.status, "ComingSoon");
    assert!(movie.categories.is_empty());
}

#[test]
fn test_customer_cannot_create_movie() {
    let mut persistence = create_test_persistence();
    let customer = create_customer(&mut persistence, "fan@example.com");

    let result = create_movie(
        &mut persistence,
        &movie_request("The Vault"),
        &customer,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_create_movie_rejects_bad_release_date() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let mut request = movie_request("The Vault");
    request.release_date = String::from("20/11/2026");

    let result = create_movie(&mut persistence, &request, &manager, create_test_cause());

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "release_date"),
        other => panic!("Expected InvalidInput for release_date, got {other:?}"),
    }
}

#[test]
fn test_create_movie_rejects_unknown_category() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let mut request = movie_request("The Vault");
    request.category_ids = vec![999];

    let result = create_movie(&mut persistence, &request, &manager, create_test_cause());

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_create_movie_is_audited() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);

    let movie = create_movie(
        &mut persistence,
        &movie_request("The Vault"),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let events: Vec<AuditEvent> = persistence
        .list_audit_events(&AuditFilter {
            target_type: Some(String::from("movie")),
            target_id: Some(movie.movie_id.to_string()),
            ..AuditFilter::default()
        })
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action.name, "CreateMovie");
    assert_eq!(events[0].actor.user_id, Some(manager.user_id));
}

#[test]
fn test_categories_attach_and_filter_movies() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);

    let category = create_category(
        &mut persistence,
        &CreateCategoryRequest {
            name: String::from("Science Fiction"),
        },
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(category.slug, "science-fiction");

    let mut request = movie_request("Orbit");
    request.category_ids = vec![category.category_id];
    create_movie(&mut persistence, &request, &manager, create_test_cause()).unwrap();
    create_movie(
        &mut persistence,
        &movie_request("Paperwork"),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let filtered = list_movies(
        &mut persistence,
        &ListMoviesQuery {
            category: Some(String::from("science-fiction")),
            ..ListMoviesQuery::default()
        },
    )
    .unwrap();
    assert_eq!(filtered.movies.len(), 1);
    assert_eq!(filtered.movies[0].title, "Orbit");
    assert_eq!(filtered.movies[0].categories[0].name, "Science Fiction");
}

#[test]
fn test_duplicate_category_conflicts() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let request = CreateCategoryRequest {
        name: String::from("Drama"),
    };
    create_category(&mut persistence, &request, &manager, create_test_cause()).unwrap();

    let result = create_category(&mut persistence, &request, &manager, create_test_cause());

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_delete_category_keeps_movies() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let category = create_category(
        &mut persistence,
        &CreateCategoryRequest {
            name: String::from("Drama"),
        },
        &manager,
        create_test_cause(),
    )
    .unwrap();
    let mut request = movie_request("Quiet Rooms");
    request.category_ids = vec![category.category_id];
    let movie = create_movie(&mut persistence, &request, &manager, create_test_cause()).unwrap();

    delete_category(
        &mut persistence,
        category.category_id,
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert!(list_categories(&mut persistence).unwrap().categories.is_empty());
    let detail = get_movie(&mut persistence, movie.movie_id).unwrap();
    assert!(detail.movie.categories.is_empty());
}

#[test]
fn test_default_listing_hides_archived_movies() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let kept = create_movie(
        &mut persistence,
        &movie_request("Still Here"),
        &manager,
        create_test_cause(),
    )
    .unwrap();
    let archived = create_movie(
        &mut persistence,
        &movie_request("Long Gone"),
        &manager,
        create_test_cause(),
    )
    .unwrap();
    set_movie_status(
        &mut persistence,
        archived.movie_id,
        &SetMovieStatusRequest {
            status: String::from("Archived"),
        },
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let visible = list_movies(&mut persistence, &ListMoviesQuery::default()).unwrap();
    let ids: Vec<i64> = visible.movies.iter().map(|m| m.movie_id).collect();
    assert_eq!(ids, vec![kept.movie_id]);

    let only_archived = list_movies(
        &mut persistence,
        &ListMoviesQuery {
            status: Some(String::from("Archived")),
            ..ListMoviesQuery::default()
        },
    )
    .unwrap();
    assert_eq!(only_archived.movies.len(), 1);
}

#[test]
fn test_archived_movie_cannot_return_to_showing() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let movie = create_movie(
        &mut persistence,
        &movie_request("Long Gone"),
        &manager,
        create_test_cause(),
    )
    .unwrap();
    let archive = SetMovieStatusRequest {
        status: String::from("Archived"),
    };
    set_movie_status(
        &mut persistence,
        movie.movie_id,
        &archive,
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let result = set_movie_status(
        &mut persistence,
        movie.movie_id,
        &SetMovieStatusRequest {
            status: String::from("NowShowing"),
        },
        &manager,
        create_test_cause(),
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "status_transition"),
        other => panic!("Expected status_transition violation, got {other:?}"),
    }
}

#[test]
fn test_update_movie_replaces_fields() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let movie = create_movie(
        &mut persistence,
        &movie_request("Draft Title"),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let mut request = movie_request("Final Title");
    request.duration_minutes = 95;
    request.rating = String::from("R");
    let updated = update_movie(
        &mut persistence,
        movie.movie_id,
        &request,
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(updated.title, "Final Title");
    assert_eq!(updated.duration_minutes, 95);
    assert_eq!(updated.rating, "R");
    assert_eq!(updated.status, "ComingSoon");
}

#[test]
fn test_get_movie_lists_upcoming_shows() {
    let mut persistence = create_test_persistence();
    let fixture = create_show_fixture(&mut persistence);

    let detail = get_movie(&mut persistence, fixture.movie_id).unwrap();

    assert_eq!(detail.upcoming_shows.len(), 1);
    assert_eq!(detail.upcoming_shows[0].show_id, fixture.show_id);
    assert_eq!(detail.upcoming_shows[0].theatre_name, "Marquee Downtown");
}

#[test]
fn test_movie_with_shows_cannot_be_deleted() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let fixture = create_show_fixture(&mut persistence);

    let result = delete_movie(
        &mut persistence,
        fixture.movie_id,
        &manager,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_get_unknown_movie_is_not_found() {
    let mut persistence = create_test_persistence();

    let result = get_movie(&mut persistence, 404);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
