use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{spawn_app, spawn_app_with, TestApp};

const ADMIN: &str = "ops@example.com";

async fn mail_transport_accepts_everything(app: &TestApp) {
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
}

/// Waits for the transport to have received `count` messages. The admin
/// copy is sent in the background, after the response.
async fn wait_for_emails(app: &TestApp, count: usize) -> Vec<serde_json::Value> {
    for _ in 0..50 {
        let sent = app.sent_emails().await;
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    app.sent_emails().await
}

#[tokio::test]
async fn subscribe_returns_a_200_and_sends_one_welcome_email() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .and(body_partial_json(json!({"To": "user@example.com"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscribe(&json!({
            "email": "user@example.com",
            "interests": ["baking"],
            "consent": true,
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true, "message": "Subscribed"}));

    let sent = app.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["Subject"], "Welcome to Fresh & Tasty!");
    assert!(sent[0]["TextBody"]
        .as_str()
        .unwrap()
        .contains("Your interests: baking"));
}

#[tokio::test]
async fn subscribe_returns_a_500_when_the_mail_transport_fails() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscribe(&json!({
            "email": "user@example.com",
            "interests": ["baking"],
            "consent": true,
        }))
        .await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": false, "error": "SERVER_ERROR"}));
}

#[tokio::test]
async fn subscribe_requires_consent_and_sends_nothing_without_it() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (json!({"email": "user@example.com", "consent": false}), "consent false"),
        (json!({"email": "user@example.com"}), "consent missing"),
        (json!({"email": "user@example.com", "consent": "true"}), "consent as a string"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscribe(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload had {}.",
            description,
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({"ok": false, "error": "CONSENT_REQUIRED"}));
    }
}

#[tokio::test]
async fn subscribe_rejects_invalid_emails_before_checking_consent() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (json!({"email": "", "consent": true}), "an empty email"),
        (json!({"email": "definitely-not-an-email", "consent": true}), "no @"),
        (json!({"email": "user@example.c", "consent": true}), "a one letter tld"),
        (json!({"email": 42, "consent": true}), "a numeric email"),
        (json!({"consent": true}), "no email"),
        (json!({"email": "nope", "consent": false}), "no email nor consent"),
        (json!(null), "a null body"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscribe(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload had {}.",
            description,
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({"ok": false, "error": "INVALID_EMAIL"}));
    }
}

#[tokio::test]
async fn subscribe_sanitizes_interests() {
    let app = spawn_app().await;
    mail_transport_accepts_everything(&app).await;

    let response = app
        .post_subscribe(&json!({
            "email": "user@example.com",
            "interests": ["a", 5, "b", null],
            "consent": true,
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let sent = app.sent_emails().await;
    assert!(sent[0]["TextBody"]
        .as_str()
        .unwrap()
        .contains("Your interests: a, b"));
}

#[tokio::test]
async fn subscribe_ignores_interests_that_are_not_a_list() {
    let app = spawn_app().await;
    mail_transport_accepts_everything(&app).await;

    let response = app
        .post_subscribe(&json!({
            "email": "user@example.com",
            "interests": "baking",
            "consent": true,
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let sent = app.sent_emails().await;
    assert!(!sent[0]["TextBody"]
        .as_str()
        .unwrap()
        .contains("Your interests"));
}

#[tokio::test]
async fn subscribe_notifies_the_admin_when_configured() {
    let app = spawn_app_with(|c| c.app.admin_email = Some(ADMIN.into())).await;
    mail_transport_accepts_everything(&app).await;

    let response = app
        .post_subscribe(&json!({
            "email": "user@example.com",
            "interests": ["baking"],
            "consent": true,
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let sent = wait_for_emails(&app, 2).await;
    let admin_copy = sent
        .iter()
        .find(|email| email["To"] == ADMIN)
        .expect("no admin notification was sent");
    assert_eq!(admin_copy["Subject"], "New newsletter subscriber");
    assert_eq!(
        admin_copy["TextBody"],
        "New subscriber: user@example.com\nInterests: baking"
    );
}

#[tokio::test]
async fn admin_notification_failures_are_not_reported() {
    let app = spawn_app_with(|c| c.app.admin_email = Some(ADMIN.into())).await;

    Mock::given(path("/email"))
        .and(body_partial_json(json!({"To": ADMIN})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.email_server)
        .await;
    Mock::given(path("/email"))
        .and(body_partial_json(json!({"To": "user@example.com"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    let response = app
        .post_subscribe(&json!({"email": "user@example.com", "consent": true}))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true, "message": "Subscribed"}));
}

#[tokio::test]
async fn no_admin_notification_without_an_admin_address() {
    let app = spawn_app().await;
    mail_transport_accepts_everything(&app).await;

    app.post_subscribe(&json!({"email": "user@example.com", "consent": true}))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let sent = app.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["To"], "user@example.com");
}

#[tokio::test]
async fn malformed_bodies_never_reach_validation() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app.post_subscribe_raw("{\"email\": ".to_string()).await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": false, "error": "INVALID_BODY"}));
}

#[tokio::test]
async fn bodies_over_64_kib_are_rejected() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let padding = "x".repeat(64 * 1024);
    let response = app
        .post_subscribe(&json!({
            "email": "user@example.com",
            "interests": [padding],
            "consent": true,
        }))
        .await;

    assert_eq!(413, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": false, "error": "PAYLOAD_TOO_LARGE"}));
}
