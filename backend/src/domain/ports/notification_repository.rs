//! Port abstraction for notifications and notification settings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageRequest, Paginated};

use crate::domain::{Notification, NotificationFilter, NotificationSettings};

use super::PersistenceError;

/// Notification storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert one notification.
    async fn insert(&self, notification: &Notification) -> Result<(), PersistenceError>;

    /// Insert a batch in one transaction.
    async fn insert_many(&self, notifications: &[Notification]) -> Result<(), PersistenceError>;

    /// Fetch a notification by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<Notification>, PersistenceError>;

    /// Page through the recipient's notifications, newest first.
    async fn list(
        &self,
        user_id: &str,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Paginated<Notification>, PersistenceError>;

    /// Persist the editable columns of `notification`.
    async fn update(&self, notification: &Notification) -> Result<bool, PersistenceError>;

    /// Remove a notification.
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;

    /// Set the read flag. `read_at` is cleared when marking unread.
    async fn set_read(
        &self,
        id: &str,
        is_read: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError>;

    /// Mark every unread notification of the recipient as read.
    async fn mark_all_read(&self, user_id: &str, now: DateTime<Utc>)
    -> Result<u64, PersistenceError>;

    /// Unread notifications of the recipient.
    async fn unread_count(&self, user_id: &str) -> Result<u64, PersistenceError>;
}

/// Notification settings storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSettingsRepository: Send + Sync {
    /// The user's settings row, if one exists.
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationSettings>, PersistenceError>;

    /// Insert or replace the user's settings row.
    async fn upsert(&self, settings: &NotificationSettings) -> Result<(), PersistenceError>;
}
