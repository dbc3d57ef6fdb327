//! Product review handlers.

use actix_web::{HttpResponse, get, post, web};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};

use crate::domain::{Review, ReviewDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body for `POST /marketplace/reviews`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewRequest {
    pub product_id: String,
    pub rating: i32,
    pub comment: String,
}

impl From<ReviewRequest> for ReviewDraft {
    fn from(value: ReviewRequest) -> Self {
        Self {
            product_id: value.product_id,
            rating: value.rating,
            comment: value.comment,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReviewList {
    reviews: Vec<Review>,
    pagination: PageInfo,
}

#[derive(Debug, Serialize)]
struct ReviewBody {
    review: Review,
}

#[get("/marketplace/products/{id}/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ReviewQuery>,
) -> ApiResult<HttpResponse> {
    let page = page_request(query.limit, query.offset)?;
    let reviews = state.catalogue.reviews(&path, page).await?;
    let pagination = reviews.info(page);
    Ok(ok(ReviewList {
        reviews: reviews.items,
        pagination,
    }))
}

/// Rate a product the caller did not list. One review per buyer.
#[post("/marketplace/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let review = state
        .catalogue
        .review(user.user_id(), payload.into_inner().into())
        .await?;
    Ok(created(ReviewBody { review }, "Review created successfully"))
}

/// Register the review routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reviews).service(create_review);
}
