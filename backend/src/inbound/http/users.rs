//! Member directory and profile handlers.
//!
//! ```text
//! GET /api/v1/users?limit=20&offset=0&search=wanjiru
//! GET|PUT /api/v1/users/profile
//! ```

use actix_web::{HttpResponse, get, put, web};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};

use crate::domain::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{ProfileRequest, profile_response, update_profile_response};
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::ok;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;

/// Query string for `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserList {
    users: Vec<User>,
    pagination: PageInfo,
}

/// Page through members, optionally filtered by name or email.
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<UserListQuery>,
) -> ApiResult<HttpResponse> {
    caller.require_user()?;
    let UserListQuery {
        limit,
        offset,
        search,
    } = query.into_inner();
    let page = page_request(limit, offset)?;
    let users = state.accounts.list_users(search, page).await?;
    let pagination = users.info(page);
    Ok(ok(UserList {
        users: users.items,
        pagination,
    }))
}

/// The caller's account.
#[get("/users/profile")]
pub async fn get_profile(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    profile_response(&state, &caller).await
}

/// Edit the caller's account.
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<HttpResponse> {
    update_profile_response(&state, &caller, payload.into_inner()).await
}

/// Register the user routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_profile)
        .service(update_profile)
        .service(list_users);
}
