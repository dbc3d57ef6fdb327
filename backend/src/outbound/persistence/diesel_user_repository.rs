//! SQLite-backed account and bearer token adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;
use pagination::{PageRequest, Paginated};

use crate::domain::User;
use crate::domain::ports::{IssuedToken, PersistenceError, TokenRepository, UserRepository};

use super::diesel_helpers::{contains_pattern, count, map_diesel_error, page_window};
use super::models::{AuthTokenRow, NewAuthTokenRow, NewUserRow, UserRow, UserUpdate};
use super::schema::{auth_tokens, users};
use super::store::Store;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    store: Store,
}

impl DieselUserRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Users whose first name, last name or email contains `search`.
fn filtered(search: Option<&str>) -> users::BoxedQuery<'static, Sqlite> {
    let mut query = users::table.into_boxed();
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        let pattern = contains_pattern(term);
        query = query.filter(
            users::first_name
                .like(pattern.clone())
                .escape('\\')
                .or(users::last_name.like(pattern.clone()).escape('\\'))
                .or(users::email.like(pattern).escape('\\')),
        );
    }
    query
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, PersistenceError> {
    rows.into_iter().map(User::try_from).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id))
            .select(UserRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<UserRow> = users::table
            .filter(users::phone.eq(phone))
            .select(UserRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn update(&self, user: &User) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let updated = diesel::update(users::table.filter(users::id.eq(&user.id)))
            .set(UserUpdate::from(user))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Paginated<User>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let total: i64 = filtered(search.as_deref())
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<UserRow> = filtered(search.as_deref())
            .order((users::created_at.desc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Paginated::new(rows_to_users(rows)?, count(total)))
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let deleted = diesel::delete(users::table.filter(users::id.eq(id)))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn existing_ids(&self, ids: &[String]) -> Result<Vec<String>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.store.get().await?;
        users::table
            .filter(users::id.eq_any(ids))
            .select(users::id)
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }
}

/// Diesel-backed implementation of the `TokenRepository` port.
#[derive(Clone)]
pub struct DieselTokenRepository {
    store: Store,
}

impl DieselTokenRepository {
    /// Create a new repository over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn insert(&self, token: &IssuedToken) -> Result<(), PersistenceError> {
        let mut conn = self.store.get().await?;
        diesel::insert_into(auth_tokens::table)
            .values(NewAuthTokenRow::from(token))
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<IssuedToken>, PersistenceError> {
        let mut conn = self.store.get().await?;
        let row: Option<AuthTokenRow> = auth_tokens::table
            .filter(auth_tokens::token_hash.eq(token_hash))
            .filter(auth_tokens::expires_at.gt(now.naive_utc()))
            .select(AuthTokenRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(IssuedToken::from))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.store.get().await?;
        let deleted =
            diesel::delete(auth_tokens::table.filter(auth_tokens::token_hash.eq(token_hash)))
                .execute(&mut *conn)
                .await
                .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
