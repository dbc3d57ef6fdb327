//! Notification inbox handlers.
//!
//! Every route acts on the caller's own inbox; senders address other users
//! through `POST /notifications` and `POST /notifications/send`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Error, Notification, NotificationContent, NotificationFilter, NotificationPatch,
    NotificationStatus, NotificationType,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{Removed, created, ok, ok_with_message};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, non_blank, page_request, parse_optional_rfc3339_timestamp,
};

const SCHEDULED_AT: FieldName = FieldName::new("scheduledAt");
const EXPIRES_AT: FieldName = FieldName::new("expiresAt");

/// Inbox filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxQuery {
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub is_read: Option<bool>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl InboxQuery {
    fn filter(&self) -> Result<NotificationFilter, Error> {
        Ok(NotificationFilter {
            notification_type: non_blank(self.notification_type.clone())
                .map(|raw| raw.parse::<NotificationType>())
                .transpose()?,
            is_read: self.is_read,
            status: non_blank(self.status.clone())
                .map(|raw| raw.parse::<NotificationStatus>())
                .transpose()?,
        })
    }
}

/// Fields shared by single and bulk delivery.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentRequest {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub priority: Option<i32>,
    pub scheduled_at: Option<String>,
    pub expires_at: Option<String>,
}

impl TryFrom<ContentRequest> for NotificationContent {
    type Error = Error;

    fn try_from(value: ContentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            message: value.message,
            notification_type: value.notification_type,
            priority: value.priority,
            scheduled_at: parse_optional_rfc3339_timestamp(
                value.scheduled_at.as_deref(),
                SCHEDULED_AT,
            )?,
            expires_at: parse_optional_rfc3339_timestamp(value.expires_at.as_deref(), EXPIRES_AT)?,
        })
    }
}

/// Body for `POST /notifications`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateNotificationRequest {
    pub recipient_id: Option<String>,
    #[serde(flatten)]
    pub content: ContentRequest,
}

/// Body for `POST /notifications/send`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendNotificationRequest {
    pub recipient_ids: Vec<String>,
    #[serde(flatten)]
    pub content: ContentRequest,
}

/// Body for `PUT /notifications/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateNotificationRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    pub priority: Option<i32>,
    pub scheduled_at: Option<String>,
    pub expires_at: Option<String>,
}

impl TryFrom<UpdateNotificationRequest> for NotificationPatch {
    type Error = Error;

    fn try_from(value: UpdateNotificationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            message: value.message,
            priority: value.priority,
            scheduled_at: parse_optional_rfc3339_timestamp(
                value.scheduled_at.as_deref(),
                SCHEDULED_AT,
            )?,
            expires_at: parse_optional_rfc3339_timestamp(value.expires_at.as_deref(), EXPIRES_AT)?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InboxBody {
    notifications: Vec<Notification>,
    pagination: PageInfo,
    unread_count: u64,
}

#[derive(Debug, Serialize)]
struct NotificationBody {
    notification: Notification,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Sent {
    sent: usize,
    notification_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct UnreadCount {
    count: u64,
}

#[derive(Debug, Serialize)]
struct Updated {
    updated: u64,
}

#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<InboxQuery>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let page = page_request(query.limit, query.offset)?;
    let inbox = state
        .notifications
        .inbox(user.user_id(), query.filter()?, page)
        .await?;
    let pagination = inbox.page.info(page);
    Ok(ok(InboxBody {
        notifications: inbox.page.items,
        pagination,
        unread_count: inbox.unread_count,
    }))
}

/// Address a notification to one recipient.
#[post("/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let sender = caller.require_user()?;
    let CreateNotificationRequest {
        recipient_id,
        content,
    } = payload.into_inner();
    let notification = state
        .notifications
        .create(sender.user_id(), recipient_id, content.try_into()?)
        .await?;
    Ok(created(
        NotificationBody { notification },
        "Notification created successfully",
    ))
}

#[get("/notifications/unread-count")]
pub async fn unread_count(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let count = state.notifications.unread_count(user.user_id()).await?;
    Ok(ok(UnreadCount { count }))
}

#[post("/notifications/mark-all-read")]
pub async fn mark_all_read(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let updated = state.notifications.mark_all_read(user.user_id()).await?;
    Ok(ok_with_message(
        Updated { updated },
        "All notifications marked as read",
    ))
}

/// Deliver the same content to several recipients at once.
#[post("/notifications/send")]
pub async fn send_notifications(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SendNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let sender = caller.require_user()?;
    let SendNotificationRequest {
        recipient_ids,
        content,
    } = payload.into_inner();
    let batch = state
        .notifications
        .send(sender.user_id(), recipient_ids, content.try_into()?)
        .await?;
    let notification_ids: Vec<String> = batch.into_iter().map(|n| n.id).collect();
    Ok(created(
        Sent {
            sent: notification_ids.len(),
            notification_ids,
        },
        "Notifications sent successfully",
    ))
}

#[get("/notifications/{id}")]
pub async fn get_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let notification = state.notifications.get(user.user_id(), &path).await?;
    Ok(ok(NotificationBody { notification }))
}

/// Edit a notification that is still scheduled.
#[put("/notifications/{id}")]
pub async fn update_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<UpdateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let patch = NotificationPatch::try_from(payload.into_inner())?;
    let notification = state
        .notifications
        .update(user.user_id(), &path, patch)
        .await?;
    Ok(ok_with_message(
        NotificationBody { notification },
        "Notification updated successfully",
    ))
}

#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    state.notifications.delete(user.user_id(), &path).await?;
    Ok(ok_with_message(
        Removed { id: &path },
        "Notification deleted successfully",
    ))
}

#[put("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let notification = state
        .notifications
        .set_read(user.user_id(), &path, true)
        .await?;
    Ok(ok_with_message(
        NotificationBody { notification },
        "Notification marked as read",
    ))
}

#[put("/notifications/{id}/unread")]
pub async fn mark_unread(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let notification = state
        .notifications
        .set_read(user.user_id(), &path, false)
        .await?;
    Ok(ok_with_message(
        NotificationBody { notification },
        "Notification marked as unread",
    ))
}

/// Register the inbox routes. Literal segments precede `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_notifications)
        .service(create_notification)
        .service(unread_count)
        .service(mark_all_read)
        .service(send_notifications)
        .service(get_notification)
        .service(update_notification)
        .service(delete_notification)
        .service(mark_read)
        .service(mark_unread);
}
