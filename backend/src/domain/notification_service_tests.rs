//! Tests for the notification service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockNotificationRepository, MockNotificationSettingsRepository, MockUserRepository,
    PrefixedIdGenerator,
};
use crate::domain::{ErrorCode, NotificationStatus, NotificationType};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct Mocks {
    notifications: MockNotificationRepository,
    settings: MockNotificationSettingsRepository,
    users: MockUserRepository,
}

impl Mocks {
    fn new() -> Self {
        Self {
            notifications: MockNotificationRepository::new(),
            settings: MockNotificationSettingsRepository::new(),
            users: MockUserRepository::new(),
        }
    }

    fn service(self, now: DateTime<Utc>) -> NotificationService {
        NotificationService::new(
            Arc::new(self.notifications),
            Arc::new(self.settings),
            Arc::new(self.users),
            Arc::new(PrefixedIdGenerator::new("ntf-")),
            Arc::new(FixtureClock { utc_now: now }),
        )
    }
}

fn content() -> NotificationContent {
    NotificationContent {
        title: "Meeting reminder".to_owned(),
        message: "Monthly chama meeting at 6pm".to_owned(),
        notification_type: "meeting".to_owned(),
        ..NotificationContent::default()
    }
}

fn stored(user_id: &str, is_read: bool, now: DateTime<Utc>) -> Notification {
    let mut notification = content()
        .validate(now)
        .expect("valid content")
        .address("ntf-1".to_owned(), user_id, None, now);
    notification.is_read = is_read;
    notification.read_at = is_read.then_some(now);
    notification
}

#[rstest]
#[tokio::test]
async fn create_delivers_to_known_recipient(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_existing_ids()
        .returning(|ids| Ok(ids.to_vec()));
    mocks
        .notifications
        .expect_insert()
        .times(1)
        .returning(|_| Ok(()));

    let notification = mocks
        .service(now)
        .create("sender", Some("recipient".to_owned()), content())
        .await
        .expect("created");
    assert_eq!(notification.user_id, "recipient");
    assert_eq!(notification.sender_id.as_deref(), Some("sender"));
    assert_eq!(notification.notification_type, NotificationType::Meeting);
    assert_eq!(notification.status, NotificationStatus::Sent);
}

#[rstest]
#[tokio::test]
async fn create_rejects_past_schedule_before_touching_the_store(now: DateTime<Utc>) {
    let mut draft = content();
    draft.scheduled_at = Some(now - Duration::hours(1));
    let err = Mocks::new()
        .service(now)
        .create("sender", Some("recipient".to_owned()), draft)
        .await
        .expect_err("past schedule");
    assert_eq!(err.message(), "Scheduled time must be in the future");
}

#[rstest]
#[case(None)]
#[case(Some(" "))]
#[tokio::test]
async fn create_requires_recipient(now: DateTime<Utc>, #[case] recipient: Option<&str>) {
    let err = Mocks::new()
        .service(now)
        .create("sender", recipient.map(str::to_owned), content())
        .await
        .expect_err("missing recipient");
    assert_eq!(err.message(), "Recipient is required");
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_recipient(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks.users.expect_existing_ids().returning(|_| Ok(Vec::new()));
    let err = mocks
        .service(now)
        .create("sender", Some("ghost".to_owned()), content())
        .await
        .expect_err("unknown recipient");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Recipient not found");
}

#[rstest]
#[tokio::test]
async fn only_recipient_may_read(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks
        .notifications
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored("owner", false, now))));
    let err = mocks
        .service(now)
        .get("intruder", "ntf-1")
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), "You can only access your own notifications");
}

#[rstest]
#[case(true, true, "Notification is already read")]
#[case(false, false, "Notification is already unread")]
#[tokio::test]
async fn toggling_into_current_state_fails(
    now: DateTime<Utc>,
    #[case] current: bool,
    #[case] target: bool,
    #[case] expected: &str,
) {
    let mut mocks = Mocks::new();
    mocks
        .notifications
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored("owner", current, now))));
    let err = mocks
        .service(now)
        .set_read("owner", "ntf-1", target)
        .await
        .expect_err("already in state");
    assert_eq!(err.message(), expected);
}

#[rstest]
#[tokio::test]
async fn marking_read_stamps_read_at(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks
        .notifications
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored("owner", false, now))));
    mocks
        .notifications
        .expect_set_read()
        .withf(|_, is_read, _| *is_read)
        .times(1)
        .returning(|_, _, _| Ok(true));
    let notification = mocks
        .service(now)
        .set_read("owner", "ntf-1", true)
        .await
        .expect("marked read");
    assert!(notification.is_read);
    assert_eq!(notification.read_at, Some(now));
}

#[rstest]
#[tokio::test]
async fn send_requires_recipients(now: DateTime<Utc>) {
    let err = Mocks::new()
        .service(now)
        .send("sender", vec![" ".to_owned()], content())
        .await
        .expect_err("no recipients");
    assert_eq!(err.message(), "At least one recipient is required");
}

#[rstest]
#[tokio::test]
async fn send_deduplicates_recipients(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_existing_ids()
        .returning(|ids| Ok(ids.to_vec()));
    mocks
        .notifications
        .expect_insert_many()
        .withf(|batch| batch.len() == 2)
        .times(1)
        .returning(|_| Ok(()));
    let sent = mocks
        .service(now)
        .send(
            "admin",
            vec!["a".to_owned(), "b".to_owned(), "a".to_owned()],
            content(),
        )
        .await
        .expect("sent");
    assert_eq!(sent.len(), 2);
}

#[rstest]
#[tokio::test]
async fn send_rejects_unknown_recipient(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_existing_ids()
        .returning(|_| Ok(vec!["a".to_owned()]));
    let err = mocks
        .service(now)
        .send("admin", vec!["a".to_owned(), "b".to_owned()], content())
        .await
        .expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        err.details().and_then(|d| d.get("recipientId")),
        Some(&serde_json::json!("b"))
    );
}

#[rstest]
#[tokio::test]
async fn settings_are_created_lazily(now: DateTime<Utc>) {
    let mut mocks = Mocks::new();
    mocks.settings.expect_find_by_user().returning(|_| Ok(None));
    mocks
        .settings
        .expect_upsert()
        .withf(|settings| settings.user_id == "owner" && settings.in_app_enabled)
        .times(1)
        .returning(|_| Ok(()));
    let settings = mocks.service(now).settings("owner").await.expect("defaults");
    assert_eq!(settings.quiet_hours_start, "22:00");
    assert_eq!(settings.quiet_hours_end, "07:00");
}
