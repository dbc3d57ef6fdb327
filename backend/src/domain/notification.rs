//! In-app notifications and per-user delivery settings.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Error;

/// Priority applied when a sender does not choose one.
pub const DEFAULT_PRIORITY: i32 = 3;

/// Topic a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    System,
    Payment,
    Meeting,
    Chama,
}

impl NotificationType {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Payment => "payment",
            Self::Meeting => "meeting",
            Self::Chama => "chama",
        }
    }
}

impl FromStr for NotificationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "payment" => Ok(Self::Payment),
            "meeting" => Ok(Self::Meeting),
            "chama" => Ok(Self::Chama),
            _ => Err(Error::invalid_request("Invalid notification type")),
        }
    }
}

/// Delivery state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Waiting for its scheduled instant; still editable.
    Scheduled,
    /// Delivered to the recipient's inbox.
    Sent,
}

impl NotificationStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "sent" => Ok(Self::Sent),
            _ => Err(Error::invalid_request("Invalid notification status")),
        }
    }
}

/// Notification addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub priority: i32,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Whether `user_id` is the recipient.
    #[must_use]
    pub fn is_addressed_to(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

fn check_priority(priority: i32) -> Result<(), Error> {
    if (1..=5).contains(&priority) {
        Ok(())
    } else {
        Err(Error::invalid_request("Priority must be between 1 and 5"))
    }
}

fn check_schedule(
    scheduled_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if scheduled_at.is_some_and(|at| at <= now) {
        return Err(Error::invalid_request(
            "Scheduled time must be in the future",
        ));
    }
    if expires_at.is_some_and(|at| at <= now) {
        return Err(Error::invalid_request(
            "Expiration time must be in the future",
        ));
    }
    if let (Some(scheduled), Some(expires)) = (scheduled_at, expires_at) {
        if expires <= scheduled {
            return Err(Error::invalid_request(
                "Expiration time must be after scheduled time",
            ));
        }
    }
    Ok(())
}

/// Notification content before a recipient is attached.
#[derive(Debug, Clone, Default)]
pub struct NotificationContent {
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub priority: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Content that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContent {
    title: String,
    message: String,
    notification_type: NotificationType,
    priority: i32,
    scheduled_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl NotificationContent {
    /// Validate text, topic, priority and timing against `now`.
    ///
    /// # Errors
    /// Returns an invalid-request error for the first failing rule.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidContent, Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::invalid_request("Title is required"));
        }
        let message = self.message.trim();
        if message.is_empty() {
            return Err(Error::invalid_request("Message is required"));
        }
        let notification_type = self.notification_type.trim().parse::<NotificationType>()?;
        let priority = self.priority.unwrap_or(DEFAULT_PRIORITY);
        check_priority(priority)?;
        check_schedule(self.scheduled_at, self.expires_at, now)?;
        Ok(ValidContent {
            title: title.to_owned(),
            message: message.to_owned(),
            notification_type,
            priority,
            scheduled_at: self.scheduled_at,
            expires_at: self.expires_at,
        })
    }
}

impl ValidContent {
    /// Address the content to `recipient_id`.
    ///
    /// Scheduled content starts as [`NotificationStatus::Scheduled`];
    /// everything else is delivered immediately.
    #[must_use]
    pub fn address(
        &self,
        id: String,
        recipient_id: &str,
        sender_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Notification {
        let status = if self.scheduled_at.is_some() {
            NotificationStatus::Scheduled
        } else {
            NotificationStatus::Sent
        };
        Notification {
            id,
            user_id: recipient_id.to_owned(),
            sender_id: sender_id.map(str::to_owned),
            title: self.title.clone(),
            message: self.message.clone(),
            notification_type: self.notification_type,
            status,
            priority: self.priority,
            is_read: false,
            read_at: None,
            scheduled_at: self.scheduled_at,
            expires_at: self.expires_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Edit to a notification that has not been sent yet.
#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub priority: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationPatch {
    /// Validate and apply the edit.
    ///
    /// # Errors
    /// Rejects edits to sent notifications and the same field rules as
    /// creation.
    pub fn apply(self, notification: &mut Notification, now: DateTime<Utc>) -> Result<(), Error> {
        if notification.status == NotificationStatus::Sent {
            return Err(Error::invalid_request("Cannot update sent notification"));
        }
        let title = self.title.as_deref().map(str::trim);
        if title.is_some_and(str::is_empty) {
            return Err(Error::invalid_request("Title is required"));
        }
        let message = self.message.as_deref().map(str::trim);
        if message.is_some_and(str::is_empty) {
            return Err(Error::invalid_request("Message is required"));
        }
        if let Some(priority) = self.priority {
            check_priority(priority)?;
        }
        check_schedule(self.scheduled_at, self.expires_at, now)?;
        let scheduled_at = self.scheduled_at.or(notification.scheduled_at);
        let expires_at = self.expires_at.or(notification.expires_at);
        if let (Some(scheduled), Some(expires)) = (scheduled_at, expires_at) {
            if expires <= scheduled {
                return Err(Error::invalid_request(
                    "Expiration time must be after scheduled time",
                ));
            }
        }

        if let Some(title) = title {
            title.clone_into(&mut notification.title);
        }
        if let Some(message) = message {
            message.clone_into(&mut notification.message);
        }
        if let Some(priority) = self.priority {
            notification.priority = priority;
        }
        notification.scheduled_at = scheduled_at;
        notification.expires_at = expires_at;
        notification.updated_at = now;
        Ok(())
    }
}

/// Inbox listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    pub notification_type: Option<NotificationType>,
    pub is_read: Option<bool>,
    pub status: Option<NotificationStatus>,
}

/// Per-user delivery preferences. Exactly one row exists per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub id: String,
    pub user_id: String,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub in_app_enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: String,
    pub quiet_hours_end: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationSettings {
    /// Defaults used the first time a user opens their settings.
    #[must_use]
    pub fn defaults(id: String, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: user_id.to_owned(),
            email_enabled: true,
            sms_enabled: true,
            push_enabled: true,
            in_app_enabled: true,
            quiet_hours_enabled: false,
            quiet_hours_start: "22:00".to_owned(),
            quiet_hours_end: "07:00".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial settings edit.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub email_enabled: Option<bool>,
    pub sms_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub in_app_enabled: Option<bool>,
    pub quiet_hours_enabled: Option<bool>,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
}

impl SettingsPatch {
    /// Validate and apply the edit.
    ///
    /// # Errors
    /// Rejects quiet-hour bounds that are not `HH:MM` on a 24-hour clock.
    pub fn apply(self, settings: &mut NotificationSettings, now: DateTime<Utc>) -> Result<(), Error> {
        for bound in [&self.quiet_hours_start, &self.quiet_hours_end]
            .into_iter()
            .flatten()
        {
            if !is_clock_time(bound) {
                return Err(Error::invalid_request("Invalid quiet hours format"));
            }
        }
        if let Some(flag) = self.email_enabled {
            settings.email_enabled = flag;
        }
        if let Some(flag) = self.sms_enabled {
            settings.sms_enabled = flag;
        }
        if let Some(flag) = self.push_enabled {
            settings.push_enabled = flag;
        }
        if let Some(flag) = self.in_app_enabled {
            settings.in_app_enabled = flag;
        }
        if let Some(flag) = self.quiet_hours_enabled {
            settings.quiet_hours_enabled = flag;
        }
        if let Some(start) = self.quiet_hours_start {
            settings.quiet_hours_start = start;
        }
        if let Some(end) = self.quiet_hours_end {
            settings.quiet_hours_end = end;
        }
        settings.updated_at = now;
        Ok(())
    }
}

/// Whether `value` is a zero-padded `HH:MM` time between 00:00 and 23:59.
#[must_use]
pub fn is_clock_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return false;
    }
    matches!(
        (hours.parse::<u8>(), minutes.parse::<u8>()),
        (Ok(h), Ok(m)) if h < 24 && m < 60
    )
}

#[cfg(test)]
mod tests;
