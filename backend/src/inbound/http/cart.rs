//! Shopping cart handlers.
//!
//! ```text
//! GET    /api/v1/marketplace/cart
//! POST   /api/v1/marketplace/cart {"productId":"...","quantity":2}
//! DELETE /api/v1/marketplace/cart
//! PUT    /api/v1/marketplace/cart/{id} {"quantity":3}
//! DELETE /api/v1/marketplace/cart/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::CartItem;
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{Removed, created, ok, ok_with_message};
use crate::inbound::http::state::HttpState;

const fn one() -> i32 {
    1
}

/// Body for `POST /marketplace/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: i32,
}

/// Body for `PUT /marketplace/cart/{id}`.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartItemBody {
    cart_item: CartItem,
}

#[derive(Debug, Serialize)]
struct Cleared {
    removed: u64,
}

#[get("/marketplace/cart")]
pub async fn get_cart(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let cart = state.carts.cart(user.user_id()).await?;
    Ok(ok(cart))
}

/// Add units of a product, merging with an existing line.
#[post("/marketplace/cart")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<AddToCartRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let cart_item = state
        .carts
        .add(user.user_id(), &payload.product_id, payload.quantity)
        .await?;
    Ok(created(CartItemBody { cart_item }, "Item added to cart"))
}

#[delete("/marketplace/cart")]
pub async fn clear_cart(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let removed = state.carts.clear(user.user_id()).await?;
    Ok(ok_with_message(Cleared { removed }, "Cart cleared"))
}

#[put("/marketplace/cart/{id}")]
pub async fn update_cart_item(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<QuantityRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let cart_item = state
        .carts
        .update(user.user_id(), &path, payload.quantity)
        .await?;
    Ok(ok_with_message(CartItemBody { cart_item }, "Cart item updated"))
}

#[delete("/marketplace/cart/{id}")]
pub async fn remove_cart_item(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    state.carts.remove(user.user_id(), &path).await?;
    Ok(ok_with_message(Removed { id: &path }, "Item removed from cart"))
}

/// Register the cart routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_cart)
        .service(add_to_cart)
        .service(clear_cart)
        .service(update_cart_item)
        .service(remove_cart_item);
}
