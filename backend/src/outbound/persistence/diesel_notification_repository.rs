//! SQLite-backed notification inbox and settings adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{PageRequest, Paginated};

use crate::domain::ports::{
    NotificationRepository, NotificationSettingsRepository, PersistenceError,
};
use crate::domain::{Notification, NotificationFilter, NotificationSettings};

use super::diesel_helpers::{affected, count, map_diesel_error, page_window};
use super::models::{
    NewNotificationRow, NewNotificationSettingsRow, NotificationRow, NotificationSettingsRow,
    NotificationSettingsUpdate, NotificationUpdate, ReadStateUpdate,
};
use super::schema::{notification_settings, notifications};
use super::store::Store;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    store: Store,
}

impl DieselNotificationRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

fn filtered(user_id: &str, filter: NotificationFilter) -> notifications::BoxedQuery<'static, Sqlite> {
    let mut query = notifications::table
        .filter(notifications::user_id.eq(user_id.to_owned()))
        .into_boxed();
    if let Some(notification_type) = filter.notification_type {
        query = query.filter(notifications::notification_type.eq(notification_type.as_str()));
    }
    if let Some(is_read) = filter.is_read {
        query = query.filter(notifications::is_read.eq(is_read));
    }
    if let Some(status) = filter.status {
        query = query.filter(notifications::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::insert_into(notifications::table)
            .values(NewNotificationRow::from(notification))
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    /// Insert every notification or none of them.
    async fn insert_many(&self, batch: &[Notification]) -> Result<(), PersistenceError> {
        let rows: Vec<NewNotificationRow<'_>> =
            batch.iter().map(NewNotificationRow::from).collect();
        let mut conn = self.store.get().await?;
        conn.transaction(|conn| {
            async move {
                for row in &rows {
                    diesel::insert_into(notifications::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Notification>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<NotificationRow> = notifications::table
            .filter(notifications::id.eq(id))
            .select(NotificationRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Notification::try_from).transpose()
    }

    async fn list(
        &self,
        user_id: &str,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Paginated<Notification>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let total: i64 = filtered(user_id, filter)
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<NotificationRow> = filtered(user_id, filter)
            .order((notifications::created_at.desc(), notifications::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(NotificationRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, count(total)))
    }

    async fn update(&self, notification: &Notification) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let updated =
            diesel::update(notifications::table.filter(notifications::id.eq(&notification.id)))
                .set(NotificationUpdate::from(notification))
                .execute(&mut *conn)
                .await
                .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let deleted = diesel::delete(notifications::table.filter(notifications::id.eq(id)))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn set_read(
        &self,
        id: &str,
        is_read: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let updated = diesel::update(notifications::table.filter(notifications::id.eq(id)))
            .set(ReadStateUpdate::new(is_read, now))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn mark_all_read(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(ReadStateUpdate::new(true, now))
        .execute(&mut *conn)
        .await
        .map(affected)
        .map_err(map_diesel_error)
    }

    async fn unread_count(&self, user_id: &str) -> Result<u64, PersistenceError> {
        let mut conn = self.store.get().await?;
        let total: i64 = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count(total))
    }
}

/// Diesel-backed implementation of the `NotificationSettingsRepository` port.
#[derive(Clone)]
pub struct DieselNotificationSettingsRepository {
    store: Store,
}

impl DieselNotificationSettingsRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationSettingsRepository for DieselNotificationSettingsRepository {
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationSettings>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<NotificationSettingsRow> = notification_settings::table
            .filter(notification_settings::user_id.eq(user_id))
            .select(NotificationSettingsRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(NotificationSettings::from))
    }

    /// Insert the row, or overwrite the user's existing row keeping its id.
    async fn upsert(&self, settings: &NotificationSettings) -> Result<(), PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::insert_into(notification_settings::table)
            .values(NewNotificationSettingsRow::from(settings))
            .on_conflict(notification_settings::user_id)
            .do_update()
            .set(NotificationSettingsUpdate::from(settings))
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationStatus, NotificationType};
    use crate::outbound::persistence::test_helpers::{instant, store_with_users};
    use rstest::rstest;

    fn notification(id: &str, user_id: &str, minutes: i64) -> Notification {
        Notification {
            id: id.to_owned(),
            user_id: user_id.to_owned(),
            sender_id: None,
            title: "Contribution due".to_owned(),
            message: "Your monthly contribution is due Friday".to_owned(),
            notification_type: NotificationType::Chama,
            status: NotificationStatus::Sent,
            priority: 3,
            is_read: false,
            read_at: None,
            scheduled_at: None,
            expires_at: None,
            created_at: instant(minutes),
            updated_at: instant(minutes),
        }
    }

    async fn inbox() -> DieselNotificationRepository {
        let store = store_with_users(&["wanjiru", "otieno"]).await;
        let repo = DieselNotificationRepository::new(store);
        let mut read = notification("n2", "wanjiru", 2);
        read.is_read = true;
        read.read_at = Some(instant(3));
        read.notification_type = NotificationType::Payment;
        repo.insert_many(&[
            notification("n1", "wanjiru", 1),
            read,
            notification("n3", "otieno", 3),
        ])
        .await
        .expect("seed inbox");
        repo
    }

    #[rstest]
    #[case(NotificationFilter::default(), &["n2", "n1"])]
    #[case(NotificationFilter { is_read: Some(false), ..NotificationFilter::default() }, &["n1"])]
    #[case(NotificationFilter { notification_type: Some(NotificationType::Payment), ..NotificationFilter::default() }, &["n2"])]
    #[case(NotificationFilter { status: Some(NotificationStatus::Scheduled), ..NotificationFilter::default() }, &[])]
    #[tokio::test]
    async fn inbox_lists_only_the_recipients_rows(
        #[case] filter: NotificationFilter,
        #[case] expected: &[&str],
    ) {
        let repo = inbox().await;
        let page = repo
            .list("wanjiru", filter, PageRequest::default())
            .await
            .expect("list");
        let ids: Vec<&str> = page.items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn read_flags_toggle_read_at() {
        let repo = inbox().await;
        assert!(repo.set_read("n2", false, instant(9)).await.expect("unread"));
        let unread = repo.find_by_id("n2").await.expect("find").expect("present");
        assert!(!unread.is_read);
        assert_eq!(unread.read_at, None);

        assert!(repo.set_read("n2", true, instant(10)).await.expect("read"));
        let read = repo.find_by_id("n2").await.expect("find").expect("present");
        assert_eq!(read.read_at, Some(instant(10)));
    }

    #[tokio::test]
    async fn mark_all_read_only_touches_unread_rows_of_the_recipient() {
        let repo = inbox().await;
        assert_eq!(repo.unread_count("wanjiru").await.expect("count"), 1);
        assert_eq!(repo.mark_all_read("wanjiru", instant(20)).await.expect("mark"), 1);
        assert_eq!(repo.unread_count("wanjiru").await.expect("count"), 0);
        assert_eq!(repo.unread_count("otieno").await.expect("count"), 1);
    }

    #[tokio::test]
    async fn batch_with_unknown_recipient_inserts_nothing() {
        let repo = inbox().await;
        let err = repo
            .insert_many(&[
                notification("n4", "otieno", 4),
                notification("n5", "ghost", 5),
            ])
            .await
            .expect_err("foreign key");
        assert!(matches!(err, PersistenceError::Query { .. }));
        assert_eq!(repo.find_by_id("n4").await.expect("find"), None);
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_user() {
        let store = store_with_users(&["wanjiru"]).await;
        let repo = DieselNotificationSettingsRepository::new(store);
        let mut settings = NotificationSettings::defaults("s1".to_owned(), "wanjiru", instant(0));
        repo.upsert(&settings).await.expect("insert");

        settings.quiet_hours_enabled = true;
        settings.quiet_hours_start = "21:30".to_owned();
        settings.updated_at = instant(5);
        let mut replacement = settings.clone();
        replacement.id = "s2".to_owned();
        repo.upsert(&replacement).await.expect("update");

        let stored = repo
            .find_by_user("wanjiru")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(stored, settings);
    }
}
