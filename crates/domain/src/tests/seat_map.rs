// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, RowSpec, SeatLayout, SeatMap, SeatState, generate_seat_map, parse_seat_label,
    seat_label,
};
use std::collections::HashSet;

fn row(label: &str, seats: u16, tier: &str, blocked: &[u16]) -> RowSpec {
    RowSpec {
        label: label.to_string(),
        seats,
        tier_code: tier.to_string(),
        blocked: blocked.to_vec(),
    }
}

fn small_layout() -> SeatLayout {
    SeatLayout {
        rows: vec![
            row("A", 8, "STANDARD", &[1, 8]),
            row("B", 10, "STANDARD", &[]),
            row("C", 10, "PREMIUM", &[]),
        ],
        aisles_after: vec![4],
    }
}

#[test]
fn test_valid_layout_counts_usable_seats() {
    let layout: SeatLayout = small_layout();
    assert!(layout.validate().is_ok());
    assert_eq!(layout.seat_count(), 26);
    assert_eq!(
        layout.tier_codes(),
        vec![String::from("STANDARD"), String::from("PREMIUM")]
    );
}

#[test]
fn test_layout_json_round_trip_defaults_optional_fields() {
    let json: &str = r#"{"rows":[{"label":"A","seats":4,"tier_code":"STANDARD"}]}"#;
    let layout: SeatLayout = SeatLayout::from_json(json).unwrap();
    assert!(layout.aisles_after.is_empty());
    assert!(layout.rows[0].blocked.is_empty());
    let stored: String = layout.to_json().unwrap();
    assert_eq!(SeatLayout::from_json(&stored).unwrap(), layout);
}

#[test]
fn test_layout_rejects_malformed_json() {
    assert!(matches!(
        SeatLayout::from_json("{not json"),
        Err(DomainError::InvalidSeatLayout(_))
    ));
}

#[test]
fn test_layout_rejects_structural_errors() {
    let empty: SeatLayout = SeatLayout {
        rows: vec![],
        aisles_after: vec![],
    };
    assert!(empty.validate().is_err());

    let duplicate: SeatLayout = SeatLayout {
        rows: vec![row("A", 5, "STANDARD", &[]), row("A", 5, "STANDARD", &[])],
        aisles_after: vec![],
    };
    assert!(duplicate.validate().is_err());

    let lowercase: SeatLayout = SeatLayout {
        rows: vec![row("a", 5, "STANDARD", &[])],
        aisles_after: vec![],
    };
    assert!(lowercase.validate().is_err());

    let too_wide: SeatLayout = SeatLayout {
        rows: vec![row("A", 61, "STANDARD", &[])],
        aisles_after: vec![],
    };
    assert!(too_wide.validate().is_err());

    let bad_block: SeatLayout = SeatLayout {
        rows: vec![row("A", 5, "STANDARD", &[6])],
        aisles_after: vec![],
    };
    assert!(bad_block.validate().is_err());

    let bad_aisle: SeatLayout = SeatLayout {
        rows: vec![row("A", 5, "STANDARD", &[])],
        aisles_after: vec![5],
    };
    assert!(bad_aisle.validate().is_err());

    let all_blocked: SeatLayout = SeatLayout {
        rows: vec![row("A", 2, "STANDARD", &[1, 2])],
        aisles_after: vec![],
    };
    assert!(all_blocked.validate().is_err());
}

#[test]
fn test_seat_labels() {
    assert_eq!(seat_label("C", 7), "C7");
    assert_eq!(parse_seat_label("C7").unwrap(), ('C', 7));
    assert_eq!(parse_seat_label("Z60").unwrap(), ('Z', 60));
    assert!(parse_seat_label("c7").is_err());
    assert!(parse_seat_label("C0").is_err());
    assert!(parse_seat_label("C").is_err());
    assert!(parse_seat_label("7C").is_err());
}

#[test]
fn test_seat_map_without_demo_occupancy() {
    let sold: HashSet<String> = HashSet::from([String::from("B3"), String::from("C10")]);
    let map: SeatMap = generate_seat_map(&small_layout(), 11, &sold, 0);

    assert_eq!(map.rows.len(), 3);
    assert_eq!(map.aisles_after, vec![4]);
    assert_eq!(map.find("A1").unwrap().state, SeatState::Blocked);
    assert_eq!(map.find("B3").unwrap().state, SeatState::Sold);
    assert_eq!(map.find("C10").unwrap().tier_code, "PREMIUM");
    assert_eq!(map.count(SeatState::Sold), 2);
    assert_eq!(map.count(SeatState::Blocked), 2);
    assert_eq!(map.count(SeatState::Unavailable), 0);
    assert_eq!(map.count(SeatState::Available), 24);
    assert!(map.is_selectable("B4"));
    assert!(!map.is_selectable("B3"));
    assert!(!map.is_selectable("D1"));
}

#[test]
fn test_seat_map_is_deterministic_for_the_same_seed() {
    let sold: HashSet<String> = HashSet::new();
    let first: SeatMap = generate_seat_map(&small_layout(), 42, &sold, 35);
    let second: SeatMap = generate_seat_map(&small_layout(), 42, &sold, 35);
    assert_eq!(first, second);
}

#[test]
fn test_seat_map_full_demo_occupancy_hides_every_free_seat() {
    let sold: HashSet<String> = HashSet::from([String::from("B1")]);
    let map: SeatMap = generate_seat_map(&small_layout(), 5, &sold, 100);
    assert_eq!(map.count(SeatState::Available), 0);
    assert_eq!(map.count(SeatState::Sold), 1);
    assert_eq!(map.count(SeatState::Blocked), 2);
    assert_eq!(map.count(SeatState::Unavailable), 25);
}

#[test]
fn test_demo_pattern_is_stable_as_seats_sell() {
    let layout: SeatLayout = small_layout();
    let before: SeatMap = generate_seat_map(&layout, 9, &HashSet::new(), 40);
    let available: String = before
        .rows
        .iter()
        .flat_map(|r| r.seats.iter())
        .find(|s| s.state == SeatState::Available)
        .map(|s| s.label.clone())
        .unwrap();

    let sold: HashSet<String> = HashSet::from([available.clone()]);
    let after: SeatMap = generate_seat_map(&layout, 9, &sold, 40);

    assert_eq!(after.find(&available).unwrap().state, SeatState::Sold);
    assert_eq!(
        before.count(SeatState::Unavailable),
        after.count(SeatState::Unavailable)
    );
}

#[test]
fn test_check_selection() {
    let sold: HashSet<String> = HashSet::from([String::from("B3")]);
    let map: SeatMap = generate_seat_map(&small_layout(), 1, &sold, 0);

    assert!(
        map.check_selection(&[String::from("B4"), String::from("B5")])
            .is_ok()
    );
    assert!(matches!(
        map.check_selection(&[String::from("B3")]),
        Err(DomainError::SeatNotSelectable(_))
    ));
    assert!(matches!(
        map.check_selection(&[String::from("A1")]),
        Err(DomainError::SeatNotSelectable(_))
    ));
    assert!(matches!(
        map.check_selection(&[String::from("B4"), String::from("B4")]),
        Err(DomainError::DuplicateSeat(_))
    ));
    assert!(matches!(
        map.check_selection(&[String::from("Q1")]),
        Err(DomainError::InvalidSeat(_))
    ));
}
