//! SQLite-backed cart adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CartRepository, PersistenceError};
use crate::domain::{CartItem, CartLine, Product};

use super::diesel_helpers::{affected, map_diesel_error};
use super::models::{CartItemRow, NewCartItemRow, ProductRow};
use super::schema::{cart_items, products};
use super::store::Store;

/// Diesel-backed implementation of the `CartRepository` port.
#[derive(Clone)]
pub struct DieselCartRepository {
    store: Store,
}

impl DieselCartRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn lines_for_user(&self, user_id: &str) -> Result<Vec<CartLine>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let items: Vec<CartItemRow> = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order((cart_items::created_at.asc(), cart_items::id.asc()))
            .select(CartItemRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let product_ids: Vec<&str> = items.iter().map(|item| item.product_id.as_str()).collect();
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(product_ids))
            .select(ProductRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let mut by_id = rows
            .into_iter()
            .map(|row| Product::try_from(row).map(|product| (product.id.clone(), product)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        // Several lines never share a product, so each product is moved out once.
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let product = by_id.remove(&item.product_id)?;
                Some(CartLine::new(CartItem::from(item), product))
            })
            .collect())
    }

    async fn find_item(&self, id: &str) -> Result<Option<CartItem>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<CartItemRow> = cart_items::table
            .filter(cart_items::id.eq(id))
            .select(CartItemRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(CartItem::from))
    }

    async fn find_by_user_and_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Option<CartItem>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<CartItemRow> = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::product_id.eq(product_id))
            .select(CartItemRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(CartItem::from))
    }

    async fn insert(&self, item: &CartItem) -> Result<(), PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::insert_into(cart_items::table)
            .values(NewCartItemRow::from(item))
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_quantity(
        &self,
        id: &str,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let updated = diesel::update(cart_items::table.filter(cart_items::id.eq(id)))
            .set((
                cart_items::quantity.eq(quantity),
                cart_items::updated_at.eq(now.naive_utc()),
            ))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let deleted = diesel::delete(cart_items::table.filter(cart_items::id.eq(id)))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn clear(&self, user_id: &str) -> Result<u64, PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut *conn)
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ProductRepository;
    use crate::outbound::persistence::DieselProductRepository;
    use crate::outbound::persistence::test_helpers::{
        insert_product, instant, product, store_with_users,
    };

    fn item(id: &str, product_id: &str, quantity: i32, minutes: i64) -> CartItem {
        CartItem {
            id: id.to_owned(),
            user_id: "buyer".to_owned(),
            product_id: product_id.to_owned(),
            quantity,
            created_at: instant(minutes),
            updated_at: instant(minutes),
        }
    }

    async fn cart_store() -> (Store, DieselCartRepository) {
        let store = store_with_users(&["seller", "buyer"]).await;
        insert_product(&store, &product("mat", "seller", 5)).await;
        insert_product(&store, &product("jiko", "seller", 2)).await;
        let repo = DieselCartRepository::new(store.clone());
        (store, repo)
    }

    #[tokio::test]
    async fn lines_join_products_oldest_first() {
        let (_store, repo) = cart_store().await;
        repo.insert(&item("c2", "jiko", 1, 5)).await.expect("insert");
        repo.insert(&item("c1", "mat", 3, 1)).await.expect("insert");

        let lines = repo.lines_for_user("buyer").await.expect("lines");
        let ids: Vec<&str> = lines.iter().map(|line| line.item.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2"]);
        let first = lines.iter().next().expect("first line");
        assert_eq!(first.product.id, "mat");
        assert!((first.subtotal - 2_250.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn one_line_per_product() {
        let (_store, repo) = cart_store().await;
        repo.insert(&item("c1", "mat", 1, 0)).await.expect("insert");
        let err = repo
            .insert(&item("c2", "mat", 1, 1))
            .await
            .expect_err("duplicate line");
        assert!(matches!(err, PersistenceError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn quantity_updates_and_clear() {
        let (_store, repo) = cart_store().await;
        repo.insert(&item("c1", "mat", 1, 0)).await.expect("insert");
        repo.insert(&item("c2", "jiko", 1, 1)).await.expect("insert");

        assert!(repo.update_quantity("c1", 4, instant(9)).await.expect("update"));
        let found = repo.find_item("c1").await.expect("find").expect("present");
        assert_eq!(found.quantity, 4);
        assert_eq!(found.updated_at, instant(9));

        assert_eq!(repo.clear("buyer").await.expect("clear"), 2);
        assert!(repo.lines_for_user("buyer").await.expect("lines").is_empty());
    }

    #[tokio::test]
    async fn deleting_a_product_removes_its_cart_lines() {
        let (store, repo) = cart_store().await;
        repo.insert(&item("c1", "mat", 1, 0)).await.expect("insert");
        let removed = DieselProductRepository::new(store)
            .delete("mat")
            .await
            .expect("delete product");
        assert!(removed);
        assert_eq!(
            repo.find_by_user_and_product("buyer", "mat").await.expect("find"),
            None
        );
    }
}
