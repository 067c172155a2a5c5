// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for notification templates and campaigns.

use std::collections::BTreeMap;

use marquee_domain::{ROLE_CUSTOMER, ROLE_MANAGER};
use marquee_persistence::Persistence;

use crate::tests::helpers::{
    create_actor_with_phone, create_admin, create_customer, create_manager, create_show_fixture,
    create_test_cause, create_test_persistence,
};
use crate::{
    ApiError, AuthenticatedActor, CheckoutRequest, CreateCampaignRequest, ListCampaignsQuery,
    PageQuery, PreviewTemplateRequest, TemplateInfo, TemplateRequest, cancel_campaign, checkout,
    create_campaign, create_template, delete_template, disable_user, list_campaigns,
    list_deliveries, list_templates, preview_template, send_campaign, update_template,
};

fn template(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    channel: &str,
    subject: &str,
    body: &str,
) -> TemplateInfo {
    create_template(
        persistence,
        &TemplateRequest {
            name: format!("{channel} template"),
            channel: channel.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        },
        actor,
        create_test_cause(),
    )
    .unwrap()
}

fn campaign_request(template_id: i64, audience: &str, audience_ref: Option<&str>) -> CreateCampaignRequest {
    CreateCampaignRequest {
        name: String::from("Weekend promo"),
        template_id,
        audience: audience.to_string(),
        audience_ref: audience_ref.map(ToString::to_string),
        scheduled_at: None,
    }
}

#[test]
fn test_create_template_lists_placeholders() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);

    let created = template(
        &mut persistence,
        &manager,
        "Email",
        "Hi {{display_name}}",
        "Hello {{ display_name }}, we will write to {{email}}.",
    );

    assert_eq!(created.channel, "Email");
    assert_eq!(
        created.placeholders,
        vec![String::from("display_name"), String::from("email")]
    );
    assert_eq!(list_templates(&mut persistence, &manager).unwrap().templates.len(), 1);
}

#[test]
fn test_sms_template_drops_subject() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);

    let created = template(
        &mut persistence,
        &manager,
        "Sms",
        "ignored",
        "Doors open at 7, {{display_name}}!",
    );

    assert_eq!(created.subject, "");
}

#[test]
fn test_template_rejects_unknown_placeholder() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);

    let result = create_template(
        &mut persistence,
        &TemplateRequest {
            name: String::from("Broken"),
            channel: String::from("Email"),
            subject: String::from("Hello"),
            body: String::from("Your seat is {{seat}}"),
        },
        &manager,
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "template"),
        other => panic!("Expected InvalidInput for template, got {other:?}"),
    }
}

#[test]
fn test_customer_cannot_manage_templates() {
    let mut persistence = create_test_persistence();
    let customer = create_customer(&mut persistence, "fan@example.com");

    let result = list_templates(&mut persistence, &customer);

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_update_template_changes_text() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let created = template(&mut persistence, &manager, "Push", "Tonight", "Showtime!");

    let updated = update_template(
        &mut persistence,
        created.template_id,
        &TemplateRequest {
            name: String::from("Reminder"),
            channel: String::from("Push"),
            subject: String::from("Tonight"),
            body: String::from("{{display_name}}, your show starts soon"),
        },
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(updated.name, "Reminder");
    assert_eq!(updated.placeholders, vec![String::from("display_name")]);
}

#[test]
fn test_preview_uses_samples_and_overrides() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let created = template(
        &mut persistence,
        &manager,
        "Email",
        "{{movie_title}} tickets",
        "Hi {{display_name}}",
    );

    let preview = preview_template(
        &mut persistence,
        created.template_id,
        &PreviewTemplateRequest {
            variables: BTreeMap::from([(String::from("display_name"), String::from("Sam"))]),
        },
        &manager,
    )
    .unwrap();
    assert_eq!(preview.body, "Hi Sam");
    assert!(preview.subject.ends_with(" tickets"));

    let unknown = preview_template(
        &mut persistence,
        created.template_id,
        &PreviewTemplateRequest {
            variables: BTreeMap::from([(String::from("seat"), String::from("A1"))]),
        },
        &manager,
    );
    assert!(matches!(unknown, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_send_email_campaign_to_enabled_customers() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let manager = create_manager(&mut persistence);
    let first = create_customer(&mut persistence, "first@example.com");
    let second = create_customer(&mut persistence, "second@example.com");
    let gone = create_customer(&mut persistence, "gone@example.com");
    disable_user(&mut persistence, gone.user_id, &admin, create_test_cause()).unwrap();

    let email = template(
        &mut persistence,
        &manager,
        "Email",
        "News for {{display_name}}",
        "Sent to {{email}}",
    );
    let campaign = create_campaign(
        &mut persistence,
        &campaign_request(email.template_id, "AllCustomers", None),
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(campaign.status, "Draft");
    assert_eq!(campaign.created_by, manager.user_id);

    let sent = send_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(sent.recipient_count, 2);
    assert_eq!(sent.skipped_count, 0);

    let deliveries = list_deliveries(
        &mut persistence,
        campaign.campaign_id,
        &PageQuery::default(),
        &manager,
    )
    .unwrap()
    .deliveries;
    let recipients: Vec<i64> = deliveries.iter().map(|d| d.user_id).collect();
    assert!(recipients.contains(&first.user_id));
    assert!(recipients.contains(&second.user_id));
    let to_first = deliveries
        .iter()
        .find(|d| d.user_id == first.user_id)
        .unwrap();
    assert_eq!(to_first.recipient, "first@example.com");
    assert_eq!(to_first.subject, "News for Test User");
    assert_eq!(to_first.body, "Sent to first@example.com");

    let listed = list_campaigns(
        &mut persistence,
        &ListCampaignsQuery {
            status: Some(String::from("Sent")),
            ..ListCampaignsQuery::default()
        },
        &manager,
    )
    .unwrap();
    assert_eq!(listed.campaigns.len(), 1);
    assert_eq!(listed.campaigns[0].recipient_count, 2);
    assert!(listed.campaigns[0].sent_at.is_some());

    let again = send_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    );
    match again {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "status_transition"),
        other => panic!("Expected status_transition violation, got {other:?}"),
    }
}

#[test]
fn test_sms_campaign_skips_users_without_phone() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let reachable = create_actor_with_phone(
        &mut persistence,
        "texts@example.com",
        Some("+1 555 010 9999"),
        &[ROLE_CUSTOMER],
    );
    create_customer(&mut persistence, "nophone@example.com");

    let sms = template(&mut persistence, &manager, "Sms", "", "Hi {{display_name}}");
    let campaign = create_campaign(
        &mut persistence,
        &campaign_request(sms.template_id, "AllCustomers", None),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let sent = send_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(sent.recipient_count, 1);
    assert_eq!(sent.skipped_count, 1);
    let deliveries = list_deliveries(
        &mut persistence,
        campaign.campaign_id,
        &PageQuery::default(),
        &manager,
    )
    .unwrap()
    .deliveries;
    assert_eq!(deliveries[0].user_id, reachable.user_id);
    assert_eq!(deliveries[0].recipient, "+1 555 010 9999");
}

#[test]
fn test_movie_bookers_campaign_fills_movie_and_theatre() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let booker = create_customer(&mut persistence, "booker@example.com");
    create_customer(&mut persistence, "browser@example.com");
    let fixture = create_show_fixture(&mut persistence);
    checkout(
        &mut persistence,
        &CheckoutRequest {
            show_id: fixture.show_id,
            seats: vec![String::from("A1")],
        },
        &booker,
        0,
    )
    .unwrap();

    let push = template(
        &mut persistence,
        &manager,
        "Push",
        "{{movie_title}}",
        "See you at {{theatre_name}}",
    );
    let movie_ref: String = fixture.movie_id.to_string();
    let campaign = create_campaign(
        &mut persistence,
        &campaign_request(push.template_id, "MovieBookers", Some(&movie_ref)),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let sent = send_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(sent.recipient_count, 1);

    let deliveries = list_deliveries(
        &mut persistence,
        campaign.campaign_id,
        &PageQuery::default(),
        &manager,
    )
    .unwrap()
    .deliveries;
    assert_eq!(deliveries[0].user_id, booker.user_id);
    assert_eq!(deliveries[0].recipient, format!("user:{}", booker.user_id));
    assert_eq!(deliveries[0].subject, "The Long Take");
    assert_eq!(deliveries[0].body, "See you at Marquee Downtown");
}

#[test]
fn test_send_fails_when_audience_cannot_fill_template() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    create_customer(&mut persistence, "fan@example.com");
    let email = template(
        &mut persistence,
        &manager,
        "Email",
        "Now showing",
        "{{movie_title}} is here",
    );
    let campaign = create_campaign(
        &mut persistence,
        &campaign_request(email.template_id, "AllCustomers", None),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let result = send_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "template"),
        other => panic!("Expected InvalidInput for template, got {other:?}"),
    }
    let drafts = list_campaigns(
        &mut persistence,
        &ListCampaignsQuery {
            status: Some(String::from("Draft")),
            ..ListCampaignsQuery::default()
        },
        &manager,
    )
    .unwrap();
    assert_eq!(drafts.campaigns.len(), 1);
}

#[test]
fn test_role_audience_must_name_known_role() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let email = template(&mut persistence, &manager, "Email", "Staff memo", "Meeting at 9");

    let unknown = create_campaign(
        &mut persistence,
        &campaign_request(email.template_id, "Role", Some("ushers")),
        &manager,
        create_test_cause(),
    );
    match unknown {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "audience"),
        other => panic!("Expected InvalidInput for audience, got {other:?}"),
    }

    let staff = create_campaign(
        &mut persistence,
        &campaign_request(email.template_id, "Role", Some(ROLE_MANAGER)),
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(staff.audience_ref.as_deref(), Some(ROLE_MANAGER));
}

#[test]
fn test_cancelled_campaign_cannot_be_sent() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let email = template(&mut persistence, &manager, "Email", "Hello", "Body");
    let campaign = create_campaign(
        &mut persistence,
        &campaign_request(email.template_id, "AllCustomers", None),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let cancelled = cancel_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(cancelled.status, "Cancelled");

    let result = send_campaign(
        &mut persistence,
        campaign.campaign_id,
        &manager,
        create_test_cause(),
    );
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_template_used_by_campaign_cannot_be_deleted() {
    let mut persistence = create_test_persistence();
    let manager = create_manager(&mut persistence);
    let email = template(&mut persistence, &manager, "Email", "Hello", "Body");
    create_campaign(
        &mut persistence,
        &campaign_request(email.template_id, "AllCustomers", None),
        &manager,
        create_test_cause(),
    )
    .unwrap();

    let result = delete_template(
        &mut persistence,
        email.template_id,
        &manager,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}
