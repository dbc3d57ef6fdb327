//! Checkout and order handlers.

use actix_web::{HttpResponse, get, post, put, web};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};

use crate::domain::{CheckoutDetails, Error, Order, OrderFilter, OrderRole, OrderStatus, PaymentMethod};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{created, ok, ok_with_message};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{non_blank, page_request};

/// `role` picks the buyer or seller view; `status` narrows it.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderQuery {
    fn filter(&self) -> Result<OrderFilter, Error> {
        let role = non_blank(self.role.clone())
            .map(|raw| raw.parse::<OrderRole>())
            .transpose()?
            .unwrap_or_default();
        let status = non_blank(self.status.clone())
            .map(|raw| raw.parse::<OrderStatus>())
            .transpose()?;
        Ok(OrderFilter { role, status })
    }
}

/// Body for `POST /marketplace/orders`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub delivery_county: Option<String>,
    pub delivery_town: Option<String>,
    pub delivery_phone: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<CheckoutRequest> for CheckoutDetails {
    type Error = Error;

    fn try_from(value: CheckoutRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            payment_method: value.payment_method.trim().parse::<PaymentMethod>()?,
            delivery_county: non_blank(value.delivery_county),
            delivery_town: non_blank(value.delivery_town),
            delivery_phone: non_blank(value.delivery_phone),
            notes: non_blank(value.notes),
        })
    }
}

/// Body for `PUT /marketplace/orders/{id}/status`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
struct OrderList {
    orders: Vec<Order>,
    pagination: PageInfo,
}

#[derive(Debug, Serialize)]
struct Placed {
    orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
struct OrderBody {
    order: Order,
}

#[get("/marketplace/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<OrderQuery>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let page = page_request(query.limit, query.offset)?;
    let orders = state
        .orders
        .list(user.user_id(), query.filter()?, page)
        .await?;
    let pagination = orders.info(page);
    Ok(ok(OrderList {
        orders: orders.items,
        pagination,
    }))
}

/// Check out the caller's cart, one order per seller.
#[post("/marketplace/orders")]
pub async fn create_orders(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CheckoutRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let details = CheckoutDetails::try_from(payload.into_inner())?;
    let orders = state.orders.checkout(user.user_id(), details).await?;
    Ok(created(Placed { orders }, "Orders created successfully"))
}

#[get("/marketplace/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let order = state.orders.get(user.user_id(), &path).await?;
    Ok(ok(OrderBody { order }))
}

#[put("/marketplace/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<OrderStatusRequest>,
) -> ApiResult<HttpResponse> {
    let user = caller.require_user()?;
    let order = state
        .orders
        .update_status(user.user_id(), &path, &payload.status)
        .await?;
    Ok(ok_with_message(
        OrderBody { order },
        "Order status updated successfully",
    ))
}

/// Register the order routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_orders)
        .service(create_orders)
        .service(get_order)
        .service(update_order_status);
}
