//! Notification inbox and settings routes driven through the harness.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, SecondsFormat, Utc};
use rstest::rstest;
use serde_json::{Value, json};
use vaultke::test_support::{Area, RequestSpec, assert_failure, assert_list, assert_success, field};

fn rfc3339_from_now(offset: Duration) -> String {
    (Utc::now() + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[actix_web::test]
async fn past_schedule_is_rejected() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let response = suite
        .send(
            &app,
            &RequestSpec::post(
                "/api/v1/notifications",
                json!({
                    "title": "X",
                    "message": "Y",
                    "type": "system",
                    "recipientId": "test-user-456",
                    "scheduledAt": rfc3339_from_now(-Duration::hours(1)),
                }),
            ),
        )
        .await;

    assert_failure(
        &response,
        StatusCode::BAD_REQUEST,
        Some("Scheduled time must be in the future"),
    );
}

#[rstest]
#[case(json!({"message": "Y", "type": "system", "recipientId": "test-user-456"}), StatusCode::BAD_REQUEST, "Title is required")]
#[case(json!({"title": "X", "message": "Y", "type": "gossip", "recipientId": "test-user-456"}), StatusCode::BAD_REQUEST, "Invalid notification type")]
#[case(json!({"title": "X", "message": "Y", "type": "system", "recipientId": "test-user-456", "priority": 9}), StatusCode::BAD_REQUEST, "Priority must be between 1 and 5")]
#[case(json!({"title": "X", "message": "Y", "type": "system", "recipientId": "test-user-000"}), StatusCode::NOT_FOUND, "Recipient not found")]
#[actix_web::test]
async fn invalid_notifications_are_rejected(
    #[case] body: Value,
    #[case] status: StatusCode,
    #[case] message: &str,
) {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let response = suite
        .send(&app, &RequestSpec::post("/api/v1/notifications", body))
        .await;

    assert_failure(&response, status, Some(message));
}

#[actix_web::test]
async fn inbox_lists_only_the_callers_notifications() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let inbox = suite
        .send(&app, &RequestSpec::get("/api/v1/notifications"))
        .await;
    let items = assert_list(&inbox, "notifications");
    assert_eq!(items.len(), 4);
    assert!(items
        .iter()
        .all(|item| item.get("userId") == Some(&json!("test-user-123"))));
    assert_eq!(field(&inbox.json(), "data.unreadCount"), Some(&json!(2)));

    let unread = suite
        .send(&app, &RequestSpec::get("/api/v1/notifications?isRead=false&type=system"))
        .await;
    let unread = assert_list(&unread, "notifications");
    assert_eq!(field(&json!(unread), "0.id"), Some(&json!("test-notification-1")));
    assert_eq!(unread.len(), 1);

    let foreign = suite
        .send(&app, &RequestSpec::get("/api/v1/notifications/test-notification-5"))
        .await;
    assert_failure(
        &foreign,
        StatusCode::FORBIDDEN,
        Some("You can only access your own notifications"),
    );
}

#[actix_web::test]
async fn read_and_unread_undo_each_other() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;
    let read_path = "/api/v1/notifications/test-notification-1/read";
    let unread_path = "/api/v1/notifications/test-notification-1/unread";

    let read = suite.send(&app, &RequestSpec::put(read_path, Value::Null)).await;
    let read = assert_success(&read, StatusCode::OK);
    assert_eq!(field(&read, "notification.isRead"), Some(&json!(true)));

    let again = suite.send(&app, &RequestSpec::put(read_path, Value::Null)).await;
    assert_failure(&again, StatusCode::BAD_REQUEST, Some("already read"));

    let unread = suite.send(&app, &RequestSpec::put(unread_path, Value::Null)).await;
    let unread = assert_success(&unread, StatusCode::OK);
    assert_eq!(field(&unread, "notification.isRead"), Some(&json!(false)));

    let twice = suite.send(&app, &RequestSpec::put(unread_path, Value::Null)).await;
    assert_failure(&twice, StatusCode::BAD_REQUEST, Some("already unread"));
}

#[actix_web::test]
async fn mark_all_read_clears_the_unread_count() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let marked = suite
        .send(
            &app,
            &RequestSpec::new(
                actix_web::http::Method::POST,
                "/api/v1/notifications/mark-all-read",
            ),
        )
        .await;
    assert_eq!(
        assert_success(&marked, StatusCode::OK).get("updated"),
        Some(&json!(2))
    );

    let count = suite
        .send(&app, &RequestSpec::get("/api/v1/notifications/unread-count"))
        .await;
    assert_eq!(
        assert_success(&count, StatusCode::OK).get("count"),
        Some(&json!(0))
    );
}

#[actix_web::test]
async fn only_scheduled_notifications_are_editable() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let sent = suite
        .send(
            &app,
            &RequestSpec::put(
                "/api/v1/notifications/test-notification-1",
                json!({"title": "Edited"}),
            ),
        )
        .await;
    assert_failure(
        &sent,
        StatusCode::BAD_REQUEST,
        Some("Cannot update sent notification"),
    );

    let scheduled = suite
        .send(
            &app,
            &RequestSpec::put(
                "/api/v1/notifications/test-notification-3",
                json!({"title": "Meeting moved to Friday"}),
            ),
        )
        .await;
    let scheduled = assert_success(&scheduled, StatusCode::OK);
    assert_eq!(
        field(&scheduled, "notification.title"),
        Some(&json!("Meeting moved to Friday"))
    );
}

#[actix_web::test]
async fn created_notifications_can_be_fetched_by_their_recipient() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let created = suite
        .send(
            &app,
            &RequestSpec::post(
                "/api/v1/notifications",
                json!({
                    "title": "Reminder to self",
                    "message": "Pay the chama contribution",
                    "type": "chama",
                    "recipientId": "test-user-123",
                    "scheduledAt": rfc3339_from_now(Duration::hours(2)),
                }),
            ),
        )
        .await;
    let created = assert_success(&created, StatusCode::CREATED);
    assert_eq!(field(&created, "notification.status"), Some(&json!("scheduled")));
    assert_eq!(field(&created, "notification.priority"), Some(&json!(3)));
    let id = field(&created, "notification.id")
        .and_then(Value::as_str)
        .expect("created id");

    let fetched = suite
        .send(&app, &RequestSpec::get(format!("/api/v1/notifications/{id}")))
        .await;
    let fetched = assert_success(&fetched, StatusCode::OK);
    assert_eq!(field(&fetched, "notification.id").and_then(Value::as_str), Some(id));
}

#[actix_web::test]
async fn bulk_send_reports_every_new_id() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let sent = suite
        .send(
            &app,
            &RequestSpec::post(
                "/api/v1/notifications/send",
                json!({
                    "recipientIds": ["test-user-456", "test-user-789"],
                    "title": "Market day",
                    "message": "Stalls open at 8am",
                    "type": "system",
                }),
            ),
        )
        .await;
    let sent = assert_success(&sent, StatusCode::CREATED);
    assert_eq!(sent.get("sent"), Some(&json!(2)));

    let empty = suite
        .send(
            &app,
            &RequestSpec::post(
                "/api/v1/notifications/send",
                json!({"recipientIds": [], "title": "T", "message": "M", "type": "system"}),
            ),
        )
        .await;
    assert_failure(
        &empty,
        StatusCode::BAD_REQUEST,
        Some("At least one recipient is required"),
    );
}

#[actix_web::test]
async fn settings_are_read_and_partially_updated() {
    let mut suite = support::seeded_suite().await;
    let app = test::init_service(suite.app(&[Area::Notifications])).await;

    let current = suite
        .send(&app, &RequestSpec::get("/api/v1/notifications/settings"))
        .await;
    let current = assert_success(&current, StatusCode::OK);
    assert_eq!(field(&current, "settings.id"), Some(&json!("test-settings-123")));

    let updated = suite
        .send(
            &app,
            &RequestSpec::put(
                "/api/v1/notifications/settings",
                json!({"smsEnabled": false, "quietHoursEnabled": true, "quietHoursStart": "21:30"}),
            ),
        )
        .await;
    let updated = assert_success(&updated, StatusCode::OK);
    assert_eq!(field(&updated, "settings.smsEnabled"), Some(&json!(false)));
    assert_eq!(field(&updated, "settings.emailEnabled"), Some(&json!(true)));
    assert_eq!(field(&updated, "settings.quietHoursStart"), Some(&json!("21:30")));

    let malformed = suite
        .send(
            &app,
            &RequestSpec::put(
                "/api/v1/notifications/settings",
                json!({"quietHoursEnd": "25:00"}),
            ),
        )
        .await;
    assert_failure(
        &malformed,
        StatusCode::BAD_REQUEST,
        Some("Invalid quiet hours format"),
    );
}
