// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{create_test_movie, create_test_persistence, create_test_show};
use crate::{MovieData, MovieFilter, MovieInput, Persistence, PersistenceError};

#[test]
fn test_create_and_get_movie_defaults_to_coming_soon() {
    let mut persistence: Persistence = create_test_persistence();
    let movie_id: i64 = create_test_movie(&mut persistence, "The Long Night");

    let movie: MovieData = persistence.get_movie(movie_id).unwrap().unwrap();
    assert_eq!(movie.title, "The Long Night");
    assert_eq!(movie.status, "ComingSoon");
    assert_eq!(movie.duration_minutes, 120);
    assert_eq!(movie.created_at, movie.updated_at);
    assert!(persistence.get_movie(movie_id + 1).unwrap().is_none());
}

#[test]
fn test_update_movie_and_status() {
    let mut persistence: Persistence = create_test_persistence();
    let movie_id: i64 = create_test_movie(&mut persistence, "Draft Title");

    persistence
        .update_movie(
            movie_id,
            &MovieInput {
                title: "Final Title",
                synopsis: "Better synopsis.",
                duration_minutes: 95,
                rating: "R",
                language: "French",
                release_date: "2030-02-02",
                poster_url: Some("https://img.example.com/p.jpg"),
            },
        )
        .unwrap();
    persistence.set_movie_status(movie_id, "NowShowing").unwrap();

    let movie: MovieData = persistence.get_movie(movie_id).unwrap().unwrap();
    assert_eq!(movie.title, "Final Title");
    assert_eq!(movie.rating, "R");
    assert_eq!(movie.poster_url.as_deref(), Some("https://img.example.com/p.jpg"));
    assert_eq!(movie.status, "NowShowing");

    assert!(matches!(
        persistence.set_movie_status(9999, "Archived"),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_list_movies_filters() {
    let mut persistence: Persistence = create_test_persistence();
    let alpha: i64 = create_test_movie(&mut persistence, "Alpha Protocol");
    let beta: i64 = create_test_movie(&mut persistence, "Beta Test");
    let gamma: i64 = create_test_movie(&mut persistence, "Gamma Rays");
    persistence.set_movie_status(beta, "NowShowing").unwrap();
    persistence.set_movie_status(gamma, "NowShowing").unwrap();

    let comedy: i64 = persistence.create_category("Comedy", "comedy").unwrap();
    persistence.set_movie_categories(gamma, &[comedy]).unwrap();

    let showing: Vec<i64> = persistence
        .list_movies(&MovieFilter {
            status: Some(String::from("NowShowing")),
            ..MovieFilter::default()
        })
        .unwrap()
        .into_iter()
        .map(|m| m.movie_id)
        .collect();
    assert_eq!(showing, vec![beta, gamma]);

    let comedies: Vec<i64> = persistence
        .list_movies(&MovieFilter {
            category_slug: Some(String::from("comedy")),
            ..MovieFilter::default()
        })
        .unwrap()
        .into_iter()
        .map(|m| m.movie_id)
        .collect();
    assert_eq!(comedies, vec![gamma]);

    let searched: Vec<i64> = persistence
        .list_movies(&MovieFilter {
            search: Some(String::from("proto")),
            ..MovieFilter::default()
        })
        .unwrap()
        .into_iter()
        .map(|m| m.movie_id)
        .collect();
    assert_eq!(searched, vec![alpha]);
}

#[test]
fn test_movie_categories_round_trip_and_replace() {
    let mut persistence: Persistence = create_test_persistence();
    let movie_id: i64 = create_test_movie(&mut persistence, "Genre Bender");
    let drama: i64 = persistence.create_category("Drama", "drama").unwrap();
    let action: i64 = persistence.create_category("Action", "action").unwrap();

    persistence.set_movie_categories(movie_id, &[drama, action]).unwrap();
    let names: Vec<String> = persistence
        .get_movie_categories(movie_id)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Action", "Drama"]);

    let result = persistence.set_movie_categories(movie_id, &[drama, 9999]);
    assert!(matches!(result, Err(PersistenceError::ForeignKeyViolation(_))));
    assert_eq!(persistence.get_movie_categories(movie_id).unwrap().len(), 2);

    persistence.delete_category(action).unwrap();
    assert_eq!(persistence.get_movie_categories(movie_id).unwrap().len(), 1);
}

#[test]
fn test_duplicate_category_slug_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    persistence.create_category("Sci-Fi", "sci-fi").unwrap();
    let result = persistence.create_category("Sci Fi", "sci-fi");
    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_delete_movie_with_shows_is_foreign_key_violation() {
    let mut persistence: Persistence = create_test_persistence();
    let show_id: i64 = create_test_show(
        &mut persistence,
        "2030-05-01T18:00:00Z",
        "2030-05-01T20:15:00Z",
    );
    let movie_id: i64 = persistence.get_show(show_id).unwrap().unwrap().movie_id;

    assert_eq!(persistence.count_shows_for_movie(movie_id).unwrap(), 1);
    let result = persistence.delete_movie(movie_id);
    assert!(matches!(result, Err(PersistenceError::ForeignKeyViolation(_))));

    let lonely: i64 = create_test_movie(&mut persistence, "No Shows");
    persistence.delete_movie(lonely).unwrap();
    assert!(persistence.get_movie(lonely).unwrap().is_none());
}
