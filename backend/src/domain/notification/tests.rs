//! Unit tests for notification validation rules.

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn content() -> NotificationContent {
    NotificationContent {
        title: "Contribution due".to_owned(),
        message: "Your chama contribution is due on Friday".to_owned(),
        notification_type: "chama".to_owned(),
        ..NotificationContent::default()
    }
}

#[rstest]
fn immediate_content_is_sent_with_default_priority(now: DateTime<Utc>) {
    let valid = content().validate(now).expect("valid content");
    let notification = valid.address("n-1".to_owned(), "user", Some("admin"), now);
    assert_eq!(notification.status, NotificationStatus::Sent);
    assert_eq!(notification.priority, DEFAULT_PRIORITY);
    assert_eq!(notification.notification_type, NotificationType::Chama);
    assert!(!notification.is_read);
    assert!(notification.is_addressed_to("user"));
}

#[rstest]
fn future_schedule_starts_scheduled(now: DateTime<Utc>) {
    let mut draft = content();
    draft.scheduled_at = Some(now + Duration::hours(2));
    let notification = draft
        .validate(now)
        .expect("valid schedule")
        .address("n-1".to_owned(), "user", None, now);
    assert_eq!(notification.status, NotificationStatus::Scheduled);
}

#[rstest]
#[case::blank_title("", "body", "system", None, "Title is required")]
#[case::blank_message("title", "  ", "system", None, "Message is required")]
#[case::unknown_type("title", "body", "marketing", None, "Invalid notification type")]
#[case::priority_low("title", "body", "system", Some(0), "Priority must be between 1 and 5")]
#[case::priority_high("title", "body", "system", Some(6), "Priority must be between 1 and 5")]
fn content_rules(
    now: DateTime<Utc>,
    #[case] title: &str,
    #[case] message: &str,
    #[case] kind: &str,
    #[case] priority: Option<i32>,
    #[case] expected: &str,
) {
    let draft = NotificationContent {
        title: title.to_owned(),
        message: message.to_owned(),
        notification_type: kind.to_owned(),
        priority,
        ..NotificationContent::default()
    };
    let err = draft.validate(now).expect_err("invalid content");
    assert_eq!(err.message(), expected);
}

#[rstest]
#[case::past_schedule(Some(-1), None, "Scheduled time must be in the future")]
#[case::past_expiry(None, Some(-1), "Expiration time must be in the future")]
#[case::expiry_before_schedule(Some(5), Some(3), "Expiration time must be after scheduled time")]
fn timing_rules(
    now: DateTime<Utc>,
    #[case] scheduled_hours: Option<i64>,
    #[case] expires_hours: Option<i64>,
    #[case] expected: &str,
) {
    let mut draft = content();
    draft.scheduled_at = scheduled_hours.map(|h| now + Duration::hours(h));
    draft.expires_at = expires_hours.map(|h| now + Duration::hours(h));
    let err = draft.validate(now).expect_err("invalid timing");
    assert_eq!(err.message(), expected);
}

#[rstest]
fn sent_notifications_are_immutable(now: DateTime<Utc>) {
    let mut notification = content()
        .validate(now)
        .expect("valid content")
        .address("n-1".to_owned(), "user", None, now);
    let patch = NotificationPatch {
        title: Some("Changed".to_owned()),
        ..NotificationPatch::default()
    };
    let err = patch.apply(&mut notification, now).expect_err("sent");
    assert_eq!(err.message(), "Cannot update sent notification");
    assert_eq!(notification.title, "Contribution due");
}

#[rstest]
fn scheduled_notifications_accept_edits(now: DateTime<Utc>) {
    let mut draft = content();
    draft.scheduled_at = Some(now + Duration::hours(1));
    let mut notification = draft
        .validate(now)
        .expect("valid content")
        .address("n-1".to_owned(), "user", None, now);
    let later = now + Duration::minutes(5);
    let patch = NotificationPatch {
        title: Some(" Meeting moved ".to_owned()),
        priority: Some(5),
        ..NotificationPatch::default()
    };
    patch.apply(&mut notification, later).expect("editable");
    assert_eq!(notification.title, "Meeting moved");
    assert_eq!(notification.priority, 5);
    assert_eq!(notification.updated_at, later);
}

#[rstest]
fn patch_checks_expiry_against_existing_schedule(now: DateTime<Utc>) {
    let mut draft = content();
    draft.scheduled_at = Some(now + Duration::hours(4));
    let mut notification = draft
        .validate(now)
        .expect("valid content")
        .address("n-1".to_owned(), "user", None, now);
    let patch = NotificationPatch {
        expires_at: Some(now + Duration::hours(2)),
        ..NotificationPatch::default()
    };
    let err = patch.apply(&mut notification, now).expect_err("crossed");
    assert_eq!(err.message(), "Expiration time must be after scheduled time");
}

#[rstest]
#[case("22:00", true)]
#[case("07:30", true)]
#[case("00:00", true)]
#[case("23:59", true)]
#[case("24:00", false)]
#[case("7:30", false)]
#[case("12:60", false)]
#[case("noon", false)]
#[case("", false)]
fn clock_times(#[case] value: &str, #[case] valid: bool) {
    assert_eq!(is_clock_time(value), valid);
}

#[rstest]
fn settings_patch_rejects_bad_quiet_hours(now: DateTime<Utc>) {
    let mut settings = NotificationSettings::defaults("s-1".to_owned(), "user", now);
    let patch = SettingsPatch {
        quiet_hours_enabled: Some(true),
        quiet_hours_start: Some("25:00".to_owned()),
        ..SettingsPatch::default()
    };
    let err = patch.apply(&mut settings, now).expect_err("bad format");
    assert_eq!(err.message(), "Invalid quiet hours format");
    assert!(!settings.quiet_hours_enabled);
}

#[rstest]
fn settings_patch_updates_flags(now: DateTime<Utc>) {
    let mut settings = NotificationSettings::defaults("s-1".to_owned(), "user", now);
    let patch = SettingsPatch {
        sms_enabled: Some(false),
        quiet_hours_end: Some("06:00".to_owned()),
        ..SettingsPatch::default()
    };
    patch.apply(&mut settings, now).expect("valid patch");
    assert!(!settings.sms_enabled);
    assert!(settings.email_enabled);
    assert_eq!(settings.quiet_hours_end, "06:00");
}

#[rstest]
fn notification_serialises_type_field(now: DateTime<Utc>) {
    let notification = content()
        .validate(now)
        .expect("valid content")
        .address("n-1".to_owned(), "user", None, now);
    let json = serde_json::to_value(&notification).expect("serialise");
    assert_eq!(json["type"], "chama");
    assert_eq!(json["isRead"], false);
    assert!(json.get("senderId").is_none());
}
