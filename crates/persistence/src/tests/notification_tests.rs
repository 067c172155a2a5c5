// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{create_test_persistence, create_test_user};
use crate::{CampaignData, NewCampaign, NewDelivery, Persistence, PersistenceError};

fn create_campaign(persistence: &mut Persistence, template_id: i64, created_by: i64) -> i64 {
    persistence
        .create_campaign(&NewCampaign {
            name: "Spring promo",
            template_id,
            audience: "AllCustomers",
            audience_ref: None,
            scheduled_at: None,
            created_by,
        })
        .unwrap()
}

#[test]
fn test_template_crud() {
    let mut persistence: Persistence = create_test_persistence();
    let template_id: i64 = persistence
        .create_template("welcome", "Email", "Hi {{display_name}}", "Welcome, {{display_name}}!")
        .unwrap();

    persistence
        .update_template(template_id, "welcome", "Email", "Hello", "Body")
        .unwrap();
    let template = persistence.get_template(template_id).unwrap().unwrap();
    assert_eq!(template.subject, "Hello");
    assert_eq!(template.channel, "Email");

    assert!(matches!(
        persistence.create_template("welcome", "Sms", "", "x"),
        Err(PersistenceError::UniqueViolation(_))
    ));

    persistence.delete_template(template_id).unwrap();
    assert!(persistence.list_templates().unwrap().is_empty());
}

#[test]
fn test_template_in_use_cannot_be_deleted() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: i64 = create_test_user(&mut persistence, "admin@example.com", &["admin"]);
    let template_id: i64 = persistence
        .create_template("promo", "Sms", "", "Sale on now")
        .unwrap();
    create_campaign(&mut persistence, template_id, admin);

    assert_eq!(persistence.count_campaigns_using_template(template_id).unwrap(), 1);
    assert!(matches!(
        persistence.delete_template(template_id),
        Err(PersistenceError::ForeignKeyViolation(_))
    ));
}

#[test]
fn test_record_deliveries_marks_campaign_sent() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: i64 = create_test_user(&mut persistence, "admin@example.com", &["admin"]);
    let fan: i64 = create_test_user(&mut persistence, "fan@example.com", &["customer"]);
    let template_id: i64 = persistence
        .create_template("promo", "Email", "Hi", "Body")
        .unwrap();
    let campaign_id: i64 = create_campaign(&mut persistence, template_id, admin);

    let draft: CampaignData = persistence.get_campaign(campaign_id).unwrap().unwrap();
    assert_eq!(draft.status, "Draft");
    assert_eq!(draft.recipient_count, 0);

    let deliveries: Vec<NewDelivery> = vec![NewDelivery {
        user_id: fan,
        recipient: String::from("fan@example.com"),
        subject: String::from("Hi"),
        body: String::from("Body"),
    }];
    assert_eq!(persistence.record_deliveries(campaign_id, &deliveries).unwrap(), 1);

    let sent: CampaignData = persistence.get_campaign(campaign_id).unwrap().unwrap();
    assert_eq!(sent.status, "Sent");
    assert_eq!(sent.recipient_count, 1);
    assert!(sent.sent_at.is_some());

    let recorded = persistence.list_deliveries(campaign_id, None, None).unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].recipient, "fan@example.com");

    assert!(matches!(
        persistence.record_deliveries(campaign_id, &deliveries),
        Err(PersistenceError::NotFound(_))
    ));
    assert_eq!(persistence.list_deliveries(campaign_id, None, None).unwrap().len(), 1);
}

#[test]
fn test_failed_delivery_insert_rolls_back() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: i64 = create_test_user(&mut persistence, "admin@example.com", &["admin"]);
    let template_id: i64 = persistence
        .create_template("promo", "Email", "Hi", "Body")
        .unwrap();
    let campaign_id: i64 = create_campaign(&mut persistence, template_id, admin);

    let deliveries: Vec<NewDelivery> = vec![NewDelivery {
        user_id: 9999,
        recipient: String::from("ghost@example.com"),
        subject: String::from("Hi"),
        body: String::from("Body"),
    }];
    assert!(persistence.record_deliveries(campaign_id, &deliveries).is_err());

    let campaign: CampaignData = persistence.get_campaign(campaign_id).unwrap().unwrap();
    assert_eq!(campaign.status, "Draft");
}

#[test]
fn test_campaign_status_transition_requires_expected_status() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: i64 = create_test_user(&mut persistence, "admin@example.com", &["admin"]);
    let template_id: i64 = persistence
        .create_template("promo", "Push", "Now", "Body")
        .unwrap();
    let campaign_id: i64 = create_campaign(&mut persistence, template_id, admin);

    persistence
        .update_campaign_status(campaign_id, "Draft", "Cancelled")
        .unwrap();
    assert!(matches!(
        persistence.update_campaign_status(campaign_id, "Draft", "Cancelled"),
        Err(PersistenceError::NotFound(_))
    ));

    let cancelled = persistence.list_campaigns(Some("Cancelled"), None).unwrap();
    assert_eq!(cancelled.len(), 1);
    assert!(persistence.list_campaigns(Some("Draft"), None).unwrap().is_empty());
}
