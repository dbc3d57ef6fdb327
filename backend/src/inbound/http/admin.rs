//! Administrative account handlers. Every route requires the admin role.
//!
//! ```text
//! GET|DELETE /api/v1/admin/users/{id}
//! PUT /api/v1/admin/users/{id}/role {"role":"admin"}
//! PUT /api/v1/admin/users/{id}/status {"status":"suspended"}
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::Deserialize;

use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::UserBody;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{Removed, ok, ok_with_message};
use crate::inbound::http::state::HttpState;

/// Body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleRequest {
    pub role: String,
}

/// Body for `PUT /admin/users/{id}/status`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: String,
}

/// Fetch any account.
#[get("/admin/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let user = state.accounts.profile(&path).await?;
    Ok(ok(UserBody { user }))
}

/// Grant or revoke the admin role.
#[put("/admin/users/{id}/role")]
pub async fn update_role(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<RoleRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let user = state.accounts.set_role(&path, &payload.role).await?;
    Ok(ok_with_message(UserBody { user }, "User role updated successfully"))
}

/// Activate or suspend an account.
#[put("/admin/users/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let user = state.accounts.set_status(&path, &payload.status).await?;
    Ok(ok_with_message(
        UserBody { user },
        "User status updated successfully",
    ))
}

/// Remove an account other than the caller's own.
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = caller.require_admin()?;
    state.accounts.delete_user(principal, &path).await?;
    Ok(ok_with_message(Removed { id: &path }, "User deleted successfully"))
}

/// Register the admin routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(update_role)
        .service(update_status)
        .service(get_user)
        .service(delete_user);
}
