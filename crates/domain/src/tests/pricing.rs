// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, MAX_PRICE_CENTS, PriceBook, PriceQuote, ShowFormat, quote, tax_on};

fn book() -> PriceBook {
    PriceBook::new([("STANDARD", 1200), ("PREMIUM", 1800)], [])
}

fn seats(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(label, tier)| ((*label).to_string(), (*tier).to_string()))
        .collect()
}

#[test]
fn test_theatre_overrides_replace_base_prices() {
    let book: PriceBook = PriceBook::new(
        [("STANDARD", 1200), ("PREMIUM", 1800)],
        [("PREMIUM", 2000), ("VIP", 3000)],
    );
    assert_eq!(book.price("STANDARD"), Some(1200));
    assert_eq!(book.price("PREMIUM"), Some(2000));
    assert_eq!(book.price("VIP"), Some(3000));
    assert_eq!(book.price("BALCONY"), None);
    assert_eq!(book.entries().count(), 3);
}

#[test]
fn test_standard_quote() {
    let q: PriceQuote = quote(
        &book(),
        &seats(&[("B4", "STANDARD"), ("B5", "STANDARD")]),
        ShowFormat::Standard,
    )
    .unwrap();

    assert_eq!(q.lines.len(), 2);
    assert_eq!(q.subtotal_cents, 2400);
    assert_eq!(q.fees_cents, 300);
    assert_eq!(q.tax_cents, 216);
    assert_eq!(q.total_cents, 2916);
}

#[test]
fn test_imax_quote_adds_surcharge_per_seat() {
    let q: PriceQuote = quote(&book(), &seats(&[("C1", "PREMIUM")]), ShowFormat::Imax).unwrap();

    assert_eq!(q.lines[0].price_cents, 2200);
    assert_eq!(q.subtotal_cents, 2200);
    assert_eq!(q.fees_cents, 150);
    assert_eq!(q.tax_cents, 188);
    assert_eq!(q.total_cents, 2538);
}

#[test]
fn test_quote_rejects_empty_selection() {
    assert!(matches!(
        quote(&book(), &[], ShowFormat::Standard),
        Err(DomainError::EmptySeatSelection)
    ));
}

#[test]
fn test_quote_rejects_more_than_ten_seats() {
    let many: Vec<(String, String)> = (1..=11)
        .map(|n| (format!("B{n}"), String::from("STANDARD")))
        .collect();
    assert!(matches!(
        quote(&book(), &many, ShowFormat::Standard),
        Err(DomainError::TooManySeats {
            requested: 11,
            max: 10
        })
    ));
}

#[test]
fn test_quote_rejects_unknown_tier() {
    assert!(matches!(
        quote(&book(), &seats(&[("A1", "BALCONY")]), ShowFormat::ThreeD),
        Err(DomainError::UnknownPricingTier(code)) if code == "BALCONY"
    ));
}

#[test]
fn test_tax_rounds_half_up() {
    assert_eq!(tax_on(0), Some(0));
    assert_eq!(tax_on(6), Some(0));
    assert_eq!(tax_on(7), Some(1));
    assert_eq!(tax_on(10_000), Some(800));
    assert_eq!(tax_on(i64::MAX), None);
}

#[test]
fn test_quote_at_price_cap_stays_exact() {
    let book: PriceBook = PriceBook::new([("VIP", MAX_PRICE_CENTS)], []);
    let selection: Vec<(String, String)> = (1..=10)
        .map(|n| (format!("A{n}"), String::from("VIP")))
        .collect();

    let q: PriceQuote = quote(&book, &selection, ShowFormat::Imax).unwrap();

    assert_eq!(q.subtotal_cents, 10 * (MAX_PRICE_CENTS + 400));
    assert_eq!(q.total_cents, q.subtotal_cents + q.fees_cents + q.tax_cents);
}

#[test]
fn test_quote_reports_overflowing_prices() {
    let book: PriceBook = PriceBook::new([("STANDARD", i64::MAX)], []);

    assert!(matches!(
        quote(&book, &seats(&[("A1", "STANDARD")]), ShowFormat::Imax),
        Err(DomainError::InvalidPricingTier(_))
    ));
    assert!(matches!(
        quote(&book, &seats(&[("A1", "STANDARD")]), ShowFormat::Standard),
        Err(DomainError::InvalidPricingTier(_))
    ));
}
