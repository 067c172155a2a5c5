// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, NotificationChannel, render_template, template_placeholders, validate_template,
};
use std::collections::BTreeMap;

fn vars() -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("display_name", String::from("Jane")),
        ("email", String::from("jane@example.com")),
    ])
}

#[test]
fn test_render_template_substitutes_placeholders() {
    let rendered: String =
        render_template("Hi {{display_name}}, we wrote to {{ email }}.", &vars()).unwrap();
    assert_eq!(rendered, "Hi Jane, we wrote to jane@example.com.");
}

#[test]
fn test_render_template_without_placeholders_is_unchanged() {
    assert_eq!(
        render_template("Doors open at 7.", &vars()).unwrap(),
        "Doors open at 7."
    );
}

#[test]
fn test_render_template_rejects_missing_variable() {
    assert!(matches!(
        render_template("Enjoy {{movie_title}}!", &vars()),
        Err(DomainError::UnknownPlaceholder(name)) if name == "movie_title"
    ));
}

#[test]
fn test_render_template_rejects_unterminated_placeholder() {
    assert!(matches!(
        render_template("Hi {{display_name", &vars()),
        Err(DomainError::MalformedTemplate(_))
    ));
    assert!(matches!(
        render_template("Hi {{ }}", &vars()),
        Err(DomainError::MalformedTemplate(_))
    ));
}

#[test]
fn test_template_placeholders_lists_each_name_once() {
    let names: Vec<String> =
        template_placeholders("{{email}} {{display_name}} {{email}}").unwrap();
    assert_eq!(
        names,
        vec![String::from("email"), String::from("display_name")]
    );
}

#[test]
fn test_validate_template() {
    assert!(
        validate_template(
            "welcome",
            NotificationChannel::Email,
            "Welcome {{display_name}}",
            "Now showing: {{movie_title}}"
        )
        .is_ok()
    );
    assert!(validate_template("sms", NotificationChannel::Sms, "", "Hi {{display_name}}").is_ok());
    assert!(matches!(
        validate_template("no-subject", NotificationChannel::Email, "", "Body"),
        Err(DomainError::InvalidTemplate(_))
    ));
    assert!(matches!(
        validate_template("bad", NotificationChannel::Push, "Hi", "Seat {{seat}}"),
        Err(DomainError::UnknownPlaceholder(_))
    ));
    assert!(matches!(
        validate_template(
            "long",
            NotificationChannel::Sms,
            "",
            &"x".repeat(321)
        ),
        Err(DomainError::InvalidTemplate(_))
    ));
}
