//! SQLite-backed listing and review adapters.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{PageRequest, Paginated};

use crate::domain::ports::{PersistenceError, ProductRepository, ReviewRepository};
use crate::domain::{CategorySummary, Product, ProductFilter, ProductStatus, Review, average_rating};

use super::diesel_helpers::{contains_pattern, count, map_diesel_error, page_window};
use super::models::{NewProductRow, NewReviewRow, ProductRow, ProductUpdate, ReviewRow};
use super::schema::{products, reviews};
use super::store::Store;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    store: Store,
}

impl DieselProductRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Listings matching every supplied filter.
fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Sqlite> {
    let mut query = products::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(products::status.eq(status.as_str()));
    }
    if let Some(category) = non_blank(filter.category.as_deref()) {
        query = query.filter(products::category.eq(category.to_lowercase()));
    }
    if let Some(county) = non_blank(filter.county.as_deref()) {
        query = query.filter(products::county.eq(county.to_owned()));
    }
    if let Some(seller_id) = non_blank(filter.seller_id.as_deref()) {
        query = query.filter(products::seller_id.eq(seller_id.to_owned()));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(products::price.ge(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(products::price.le(max));
    }
    if let Some(term) = non_blank(filter.search.as_deref()) {
        let pattern = contains_pattern(term);
        query = query.filter(
            products::name
                .like(pattern.clone())
                .escape('\\')
                .or(products::description.like(pattern).escape('\\')),
        );
    }
    query
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn rows_to_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, PersistenceError> {
    rows.into_iter().map(Product::try_from).collect()
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        let row = NewProductRow::try_from_product(product)?;
        let mut conn = self.store.get().await?;
        diesel::insert_into(products::table)
            .values(row)
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<ProductRow> = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Product::try_from).transpose()
    }

    async fn update(&self, product: &Product) -> Result<bool, PersistenceError> {
        let changes = ProductUpdate::try_from_product(product)?;
        let mut conn = self.store.get().await?;
        let updated = diesel::update(products::table.filter(products::id.eq(&product.id)))
            .set(changes)
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let deleted = diesel::delete(products::table.filter(products::id.eq(id)))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let total: i64 = filtered(&filter)
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<ProductRow> = filtered(&filter)
            .order((products::created_at.desc(), products::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(ProductRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Paginated::new(rows_to_products(rows)?, count(total)))
    }

    async fn categories(&self) -> Result<Vec<CategorySummary>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let rows: Vec<(String, i64)> = products::table
            .filter(products::status.eq(ProductStatus::Active.as_str()))
            .group_by(products::category)
            .select((products::category, count_star()))
            .order(products::category.asc())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, total)| CategorySummary {
                name,
                count: count(total),
            })
            .collect())
    }
}

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    store: Store,
}

impl DieselReviewRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list_for_product(
        &self,
        product_id: &str,
        page: PageRequest,
    ) -> Result<Paginated<Review>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let total: i64 = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .order((reviews::created_at.desc(), reviews::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(ReviewRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Paginated::new(
            rows.into_iter().map(Review::from).collect(),
            count(total),
        ))
    }

    async fn find_by_user_and_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Option<Review>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<ReviewRow> = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .filter(reviews::product_id.eq(product_id))
            .select(ReviewRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Review::from))
    }

    /// Insert the review and recompute the product's rating in one
    /// transaction.
    async fn insert_and_rerate(&self, review: &Review) -> Result<(), PersistenceError> {
        let mut conn = self.store.get().await?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(reviews::table)
                    .values(NewReviewRow::from(review))
                    .execute(conn)
                    .await?;
                let ratings: Vec<i32> = reviews::table
                    .filter(reviews::product_id.eq(&review.product_id))
                    .select(reviews::rating)
                    .load(conn)
                    .await?;
                let review_count = i32::try_from(ratings.len()).unwrap_or(i32::MAX);
                diesel::update(products::table.filter(products::id.eq(&review.product_id)))
                    .set((
                        products::rating.eq(average_rating(&ratings)),
                        products::review_count.eq(review_count),
                    ))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
