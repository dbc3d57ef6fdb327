//! Account authentication handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"...","phone":"...","password":"...","firstName":"...","lastName":"..."}
//! POST /api/v1/auth/login {"email":"...","password":"..."}
//! POST /api/v1/auth/logout
//! POST /api/v1/auth/refresh
//! GET|PUT /api/v1/auth/profile
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{ProfileUpdate, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{created, ok, ok_with_message};
use crate::inbound::http::state::HttpState;

/// Sign-up body. Missing fields decode as empty and fail validation with a
/// field-specific message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<RegisterRequest> for Registration {
    fn from(value: RegisterRequest) -> Self {
        Self {
            email: value.email,
            phone: value.phone,
            password: Zeroizing::new(value.password),
            first_name: value.first_name,
            last_name: value.last_name,
        }
    }
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile edit shared by `/auth/profile` and `/users/profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub county: Option<String>,
    pub town: Option<String>,
    pub bio: Option<String>,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(value: ProfileRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            county: value.county,
            town: value.town,
            bio: value.bio,
        }
    }
}

/// `{"user": {...}}` payload.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggedOut<'a> {
    user_id: &'a str,
}

/// Register a pending account.
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .accounts
        .register(payload.into_inner().into())
        .await?;
    Ok(created(UserBody { user }, "User registered successfully"))
}

/// Exchange credentials for a bearer token.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let password = Zeroizing::new(password);
    let session = state.accounts.login(&email, &password).await?;
    Ok(ok_with_message(session, "Login successful"))
}

/// Revoke the presented bearer token.
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let principal = caller.require_user()?;
    state.accounts.logout(principal).await?;
    Ok(ok_with_message(
        LoggedOut {
            user_id: principal.user_id(),
        },
        "Logged out successfully",
    ))
}

/// Swap the presented bearer token for a fresh one.
#[post("/auth/refresh")]
pub async fn refresh(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let principal = caller.require_user()?;
    let session = state.accounts.refresh(principal).await?;
    Ok(ok_with_message(session, "Token refreshed successfully"))
}

pub(crate) async fn profile_response(state: &HttpState, caller: &Caller) -> ApiResult<HttpResponse> {
    let principal = caller.require_user()?;
    let user = state.accounts.profile(principal.user_id()).await?;
    Ok(ok(UserBody { user }))
}

pub(crate) async fn update_profile_response(
    state: &HttpState,
    caller: &Caller,
    payload: ProfileRequest,
) -> ApiResult<HttpResponse> {
    let principal = caller.require_user()?;
    let user = state
        .accounts
        .update_profile(principal.user_id(), payload.into())
        .await?;
    Ok(ok_with_message(UserBody { user }, "Profile updated successfully"))
}

/// The caller's account.
#[get("/auth/profile")]
pub async fn get_profile(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    profile_response(&state, &caller).await
}

/// Edit the caller's account.
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<HttpResponse> {
    update_profile_response(&state, &caller, payload.into_inner()).await
}

/// Register the auth routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(refresh)
        .service(get_profile)
        .service(update_profile);
}

#[cfg(test)]
mod tests;
