//! Notification inbox, bulk delivery and settings use-cases.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::info;

use super::ports::{
    IdGenerator, NotificationRepository, NotificationSettingsRepository, UserRepository,
};
use super::{
    Error, Notification, NotificationContent, NotificationFilter, NotificationPatch,
    NotificationSettings, SettingsPatch,
};

fn notification_not_found() -> Error {
    Error::not_found("Notification not found")
}

fn recipient_not_found() -> Error {
    Error::not_found("Recipient not found")
}

/// Inbox page with the recipient's unread total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox {
    pub page: Paginated<Notification>,
    pub unread_count: u64,
}

/// Notification service used by the notification endpoints.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    settings: Arc<dyn NotificationSettingsRepository>,
    users: Arc<dyn UserRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    /// Create the service over its repositories.
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        settings: Arc<dyn NotificationSettingsRepository>,
        users: Arc<dyn UserRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            settings,
            users,
            ids,
            clock,
        }
    }

    /// Page through the caller's notifications.
    ///
    /// # Errors
    /// Store failures.
    pub async fn inbox(
        &self,
        user_id: &str,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Inbox, Error> {
        let page = self.notifications.list(user_id, filter, page).await?;
        let unread_count = self.notifications.unread_count(user_id).await?;
        Ok(Inbox { page, unread_count })
    }

    /// Address new content from `sender_id` to one recipient.
    ///
    /// # Errors
    /// Content validation, a missing recipient id, or an unknown recipient.
    pub async fn create(
        &self,
        sender_id: &str,
        recipient_id: Option<String>,
        content: NotificationContent,
    ) -> Result<Notification, Error> {
        let now = self.clock.utc();
        let content = content.validate(now)?;
        let recipient_id = recipient_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::invalid_request("Recipient is required"))?;
        let known = self
            .users
            .existing_ids(std::slice::from_ref(&recipient_id))
            .await?;
        if known.is_empty() {
            return Err(recipient_not_found());
        }
        let notification = content.address(self.ids.next_id(), &recipient_id, Some(sender_id), now);
        self.notifications.insert(&notification).await?;
        info!(
            notification_id = %notification.id,
            recipient_id = %notification.user_id,
            status = notification.status.as_str(),
            "notification created"
        );
        Ok(notification)
    }

    /// Deliver the same content to several recipients.
    ///
    /// Duplicate recipient ids receive one copy.
    ///
    /// # Errors
    /// An empty recipient list, content validation, or unknown recipients.
    pub async fn send(
        &self,
        sender_id: &str,
        recipient_ids: Vec<String>,
        content: NotificationContent,
    ) -> Result<Vec<Notification>, Error> {
        let recipients: BTreeSet<String> = recipient_ids
            .into_iter()
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(Error::invalid_request("At least one recipient is required"));
        }
        let now = self.clock.utc();
        let content = content.validate(now)?;
        let recipients: Vec<String> = recipients.into_iter().collect();
        let known: BTreeSet<String> = self
            .users
            .existing_ids(&recipients)
            .await?
            .into_iter()
            .collect();
        if let Some(missing) = recipients.iter().find(|id| !known.contains(*id)) {
            return Err(recipient_not_found().with_details(serde_json::json!({
                "recipientId": missing,
            })));
        }
        let batch: Vec<Notification> = recipients
            .iter()
            .map(|recipient| content.address(self.ids.next_id(), recipient, Some(sender_id), now))
            .collect();
        self.notifications.insert_many(&batch).await?;
        info!(sender_id, sent = batch.len(), "bulk notification sent");
        Ok(batch)
    }

    /// Fetch a notification addressed to `user_id`.
    ///
    /// # Errors
    /// Not found, or forbidden when addressed to someone else.
    pub async fn get(&self, user_id: &str, id: &str) -> Result<Notification, Error> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(notification_not_found)?;
        if !notification.is_addressed_to(user_id) {
            return Err(Error::forbidden("You can only access your own notifications"));
        }
        Ok(notification)
    }

    /// Edit a notification that is still scheduled.
    ///
    /// # Errors
    /// Access rules, sent notifications, or field validation.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: NotificationPatch,
    ) -> Result<Notification, Error> {
        let mut notification = self.get(user_id, id).await?;
        patch.apply(&mut notification, self.clock.utc())?;
        if !self.notifications.update(&notification).await? {
            return Err(notification_not_found());
        }
        Ok(notification)
    }

    /// Remove a notification.
    ///
    /// # Errors
    /// Access rules.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), Error> {
        let notification = self.get(user_id, id).await?;
        if !self.notifications.delete(&notification.id).await? {
            return Err(notification_not_found());
        }
        Ok(())
    }

    /// Flip the read flag to `is_read`.
    ///
    /// # Errors
    /// Access rules, or the notification already being in that state.
    pub async fn set_read(
        &self,
        user_id: &str,
        id: &str,
        is_read: bool,
    ) -> Result<Notification, Error> {
        let mut notification = self.get(user_id, id).await?;
        if notification.is_read == is_read {
            let state = if is_read { "read" } else { "unread" };
            return Err(Error::invalid_request(format!(
                "Notification is already {state}"
            )));
        }
        let now = self.clock.utc();
        if !self.notifications.set_read(id, is_read, now).await? {
            return Err(notification_not_found());
        }
        notification.is_read = is_read;
        notification.read_at = is_read.then_some(now);
        notification.updated_at = now;
        Ok(notification)
    }

    /// Mark the caller's whole inbox as read.
    ///
    /// # Errors
    /// Store failures.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64, Error> {
        Ok(self
            .notifications
            .mark_all_read(user_id, self.clock.utc())
            .await?)
    }

    /// Unread notifications in the caller's inbox.
    ///
    /// # Errors
    /// Store failures.
    pub async fn unread_count(&self, user_id: &str) -> Result<u64, Error> {
        Ok(self.notifications.unread_count(user_id).await?)
    }

    /// The caller's settings, created with defaults on first access.
    ///
    /// # Errors
    /// Store failures.
    pub async fn settings(&self, user_id: &str) -> Result<NotificationSettings, Error> {
        if let Some(settings) = self.settings.find_by_user(user_id).await? {
            return Ok(settings);
        }
        let settings = NotificationSettings::defaults(self.ids.next_id(), user_id, self.clock.utc());
        self.settings.upsert(&settings).await?;
        Ok(settings)
    }

    /// Apply a partial settings edit.
    ///
    /// # Errors
    /// Invalid quiet hours or store failures.
    pub async fn update_settings(
        &self,
        user_id: &str,
        patch: SettingsPatch,
    ) -> Result<NotificationSettings, Error> {
        let mut settings = self.settings(user_id).await?;
        patch.apply(&mut settings, self.clock.utc())?;
        self.settings.upsert(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
