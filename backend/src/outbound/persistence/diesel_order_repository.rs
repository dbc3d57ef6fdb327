//! SQLite-backed order adapter.
//!
//! Checkout and cancellation touch several tables; both run inside a single
//! transaction so stock, orders and the cart never disagree.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{PageRequest, Paginated};
use tracing::debug;

use crate::domain::ports::{CheckoutError, OrderRepository, PersistenceError};
use crate::domain::{Order, OrderFilter, OrderItem, OrderRole, OrderStatus, PaymentStatus};

use super::diesel_helpers::{count, map_diesel_error, page_window};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::schema::{cart_items, order_items, orders, products};
use super::store::{SqliteConn, Store};

/// Reasons a checkout transaction rolls back.
#[derive(Debug)]
enum CheckoutFailure {
    Database(diesel::result::Error),
    InsufficientStock(String),
}

impl From<diesel::result::Error> for CheckoutFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<CheckoutFailure> for CheckoutError {
    fn from(failure: CheckoutFailure) -> Self {
        match failure {
            CheckoutFailure::Database(error) => map_diesel_error(error).into(),
            CheckoutFailure::InsufficientStock(product_name) => {
                Self::insufficient_stock(product_name)
            }
        }
    }
}

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    store: Store,
}

impl DieselOrderRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

fn filtered(user_id: &str, filter: OrderFilter) -> orders::BoxedQuery<'static, Sqlite> {
    let mut query = orders::table.into_boxed();
    query = match filter.role {
        OrderRole::Buyer => query.filter(orders::buyer_id.eq(user_id.to_owned())),
        OrderRole::Seller => query.filter(orders::seller_id.eq(user_id.to_owned())),
    };
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

/// Load the items of `order_ids`, grouped by order.
async fn items_by_order(
    conn: &mut SqliteConn,
    order_ids: &[String],
) -> Result<HashMap<String, Vec<OrderItem>>, diesel::result::Error> {
    let rows: Vec<OrderItemRow> = order_items::table
        .filter(order_items::order_id.eq_any(order_ids))
        .order(order_items::id.asc())
        .select(OrderItemRow::as_select())
        .load(conn)
        .await?;
    let mut grouped: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.order_id.clone())
            .or_default()
            .push(OrderItem::from(row));
    }
    Ok(grouped)
}

fn assemble(
    rows: Vec<OrderRow>,
    mut items: HashMap<String, Vec<OrderItem>>,
) -> Result<Vec<Order>, PersistenceError> {
    rows.into_iter()
        .map(|row| {
            let order_items = items.remove(&row.id).unwrap_or_default();
            row.into_order(order_items)
        })
        .collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn checkout(&self, placed: &[Order], buyer_id: &str) -> Result<(), CheckoutError> {
        let mut conn = self.store.get().await?;
        conn.transaction::<_, CheckoutFailure, _>(|conn| {
            async move {
                for order in placed {
                    diesel::insert_into(orders::table)
                        .values(NewOrderRow::from(order))
                        .execute(conn)
                        .await?;
                    for item in &order.items {
                        diesel::insert_into(order_items::table)
                            .values(NewOrderItemRow::new(item, order.created_at))
                            .execute(conn)
                            .await?;
                        let reserved = diesel::update(
                            products::table
                                .filter(products::id.eq(&item.product_id))
                                .filter(products::stock.ge(item.quantity)),
                        )
                        .set((
                            products::stock.eq(products::stock - item.quantity),
                            products::updated_at.eq(order.created_at.naive_utc()),
                        ))
                        .execute(conn)
                        .await?;
                        if reserved == 0 {
                            debug!(product_id = %item.product_id, "stock changed during checkout");
                            return Err(CheckoutFailure::InsufficientStock(item.name.clone()));
                        }
                    }
                }
                diesel::delete(cart_items::table.filter(cart_items::user_id.eq(buyer_id)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(CheckoutError::from)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<OrderRow> = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let items = items_by_order(&mut conn, std::slice::from_ref(&row.id))
            .await
            .map_err(map_diesel_error)?;
        Ok(assemble(vec![row], items)?.pop())
    }

    async fn list(
        &self,
        user_id: &str,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Paginated<Order>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let total: i64 = filtered(user_id, filter)
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<OrderRow> = filtered(user_id, filter)
            .order((orders::created_at.desc(), orders::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(OrderRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let items = items_by_order(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;
        Ok(Paginated::new(assemble(rows, items)?, count(total)))
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        payment_status: PaymentStatus,
        restock: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(orders::table.filter(orders::id.eq(id)))
                    .set((
                        orders::status.eq(status.as_str()),
                        orders::payment_status.eq(payment_status.as_str()),
                        orders::updated_at.eq(now.naive_utc()),
                    ))
                    .execute(conn)
                    .await?;
                if updated == 0 || !restock {
                    return Ok(updated > 0);
                }
                let returned: Vec<(String, i32)> = order_items::table
                    .filter(order_items::order_id.eq(id))
                    .select((order_items::product_id, order_items::quantity))
                    .load(conn)
                    .await?;
                for (product_id, quantity) in returned {
                    diesel::update(products::table.filter(products::id.eq(product_id)))
                        .set(products::stock.eq(products::stock + quantity))
                        .execute(conn)
                        .await?;
                }
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
