//! Per-user notification delivery settings.

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{NotificationSettings, SettingsPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{ok, ok_with_message};
use crate::inbound::http::state::HttpState;

/// Body for `PUT /notifications/settings`; absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRequest {
    pub email_enabled: Option<bool>,
    pub sms_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub in_app_enabled: Option<bool>,
    pub quiet_hours_enabled: Option<bool>,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
}

impl From<SettingsRequest> for SettingsPatch {
    fn from(value: SettingsRequest) -> Self {
        Self {
            email_enabled: value.email_enabled,
            sms_enabled: value.sms_enabled,
            push_enabled: value.push_enabled,
            in_app_enabled: value.in_app_enabled,
            quiet_hours_enabled: value.quiet_hours_enabled,
            quiet_hours_start: value.quiet_hours_start,
            quiet_hours_end: value.quiet_hours_end,
        }
    }
}

#[derive(Debug, Serialize)]
struct SettingsBody {
    settings: NotificationSettings,
}

/// The caller's settings, created with defaults on first read.
#[get("/notifications/settings")]
pub async fn get_settings(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let settings = state.notifications.settings(user.user_id()).await?;
    Ok(ok(SettingsBody { settings }))
}

#[put("/notifications/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SettingsRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let settings = state
        .notifications
        .update_settings(user.user_id(), payload.into_inner().into())
        .await?;
    Ok(ok_with_message(
        SettingsBody { settings },
        "Notification settings updated successfully",
    ))
}

/// Register the settings routes. Call before the inbox `{id}` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_settings).service(update_settings);
}
