//! Single-connection SQLite store shared by every Diesel adapter.
//!
//! The store owns one `diesel-async` connection wrapped around a blocking
//! `SqliteConnection`. Adapters check it out for the duration of a query;
//! checkouts are serialised by an async mutex so an in-memory database keeps
//! one consistent view. Closing the store drops the connection and every later
//! checkout fails with a connection error.

use std::sync::Arc;

use diesel::connection::SimpleConnection as _;
use diesel::{Connection as _, SqliteConnection};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness as _, embed_migrations};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::domain::ports::PersistenceError;

/// Async connection type used by the adapters.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while opening the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The database could not be opened.
    #[error("failed to open database: {message}")]
    Open { message: String },

    /// The schema could not be applied.
    #[error("failed to apply schema: {message}")]
    Schema { message: String },
}

impl StoreError {
    /// Create an open error with the given message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create a schema error with the given message.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

/// Shared handle to the SQLite connection.
///
/// Cloning the store clones the handle; all clones see the same database and
/// the same closed state.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Option<SqliteConn>>>,
}

impl Store {
    /// Open a fresh private in-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns [`StoreError`] when SQLite cannot be opened or the DDL fails.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:").await
    }

    /// Open the database at `url` with the schema applied.
    ///
    /// # Errors
    /// Returns [`StoreError`] when SQLite cannot be opened or the DDL fails.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let owned = url.to_owned();
        let conn = tokio::task::spawn_blocking(move || migrated_connection(&owned))
            .await
            .map_err(|err| StoreError::open(err.to_string()))??;
        info!(url, "database opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(SyncConnectionWrapper::new(conn)))),
        })
    }

    /// Drop the connection. Later checkouts fail.
    pub async fn close(&self) {
        if self.conn.lock().await.take().is_some() {
            info!("database closed");
        }
    }

    /// Whether [`Store::close`] has been called.
    pub async fn is_closed(&self) -> bool {
        self.conn.lock().await.is_none()
    }

    /// Check out the connection for one operation.
    ///
    /// # Errors
    /// Returns [`PersistenceError::Connection`] once the store is closed.
    pub async fn get(&self) -> Result<MappedMutexGuard<'_, SqliteConn>, PersistenceError> {
        let guard = self.conn.lock().await;
        MutexGuard::try_map(guard, Option::as_mut).map_err(|_| {
            debug!("checkout on closed store");
            PersistenceError::connection("database connection is closed")
        })
    }
}

/// Establish a blocking connection with foreign keys on and every pending
/// migration applied.
fn migrated_connection(url: &str) -> Result<SqliteConnection, StoreError> {
    let mut conn =
        SqliteConnection::establish(url).map_err(|err| StoreError::open(err.to_string()))?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")
        .map_err(|err| StoreError::schema(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreError::schema(format!("migration: {err}")))?;
    debug!(count = applied.len(), "migrations applied");
    Ok(conn)
}
