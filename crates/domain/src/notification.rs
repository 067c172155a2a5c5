// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::NotificationChannel;
use std::collections::BTreeMap;

/// Placeholders a template may reference.
pub const TEMPLATE_VARIABLES: [&str; 4] = ["display_name", "email", "movie_title", "theatre_name"];

/// Maximum length of an SMS body, in characters.
pub const MAX_SMS_LENGTH: usize = 320;

/// One piece of a parsed template.
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn parse_segments(text: &str) -> Result<Vec<Segment<'_>>, DomainError> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    let mut rest: &str = text;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }
        let after_open: &str = &rest[open + 2..];
        let close: usize = after_open.find("}}").ok_or_else(|| {
            DomainError::MalformedTemplate(String::from("unterminated '{{' placeholder"))
        })?;
        let name: &str = after_open[..close].trim();
        if name.is_empty() {
            return Err(DomainError::MalformedTemplate(String::from(
                "empty placeholder",
            )));
        }
        segments.push(Segment::Placeholder(name));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

/// Lists the placeholders used by a template, in order of first use.
///
/// # Errors
///
/// Returns an error if the template is malformed.
pub fn template_placeholders(text: &str) -> Result<Vec<String>, DomainError> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse_segments(text)? {
        if let Segment::Placeholder(name) = segment
            && !names.iter().any(|n| n == name)
        {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Substitutes `{{name}}` placeholders.
///
/// # Errors
///
/// Returns an error if the template is malformed or references a
/// placeholder missing from `vars`.
pub fn render_template(text: &str, vars: &BTreeMap<&str, String>) -> Result<String, DomainError> {
    let mut rendered: String = String::with_capacity(text.len());
    for segment in parse_segments(text)? {
        match segment {
            Segment::Text(t) => rendered.push_str(t),
            Segment::Placeholder(name) => {
                let value: &String = vars
                    .get(name)
                    .ok_or_else(|| DomainError::UnknownPlaceholder(name.to_string()))?;
                rendered.push_str(value);
            }
        }
    }
    Ok(rendered)
}

/// Validates a notification template before it is stored.
///
/// # Errors
///
/// Returns an error if:
/// - The name or body is empty
/// - An email or push template has no subject
/// - An SMS body exceeds 320 characters
/// - The subject or body is malformed or uses an unknown placeholder
pub fn validate_template(
    name: &str,
    channel: NotificationChannel,
    subject: &str,
    body: &str,
) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidTemplate(String::from(
            "Template name cannot be empty",
        )));
    }
    if body.trim().is_empty() {
        return Err(DomainError::InvalidTemplate(String::from(
            "Template body cannot be empty",
        )));
    }
    if channel.uses_subject() && subject.trim().is_empty() {
        return Err(DomainError::InvalidTemplate(format!(
            "{channel} templates require a subject"
        )));
    }
    if channel == NotificationChannel::Sms && body.chars().count() > MAX_SMS_LENGTH {
        return Err(DomainError::InvalidTemplate(format!(
            "SMS body cannot exceed {MAX_SMS_LENGTH} characters"
        )));
    }

    for text in [subject, body] {
        for name in template_placeholders(text)? {
            if !TEMPLATE_VARIABLES.contains(&name.as_str()) {
                return Err(DomainError::UnknownPlaceholder(name));
            }
        }
    }

    Ok(())
}
