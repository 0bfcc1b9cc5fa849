//! # docdex-db
//!
//! PostgreSQL database layer for docdex.
//!
//! This crate provides:
//! - Connection pool management
//! - The Document Record Store repository (single source of truth for
//!   ingestion lifecycle state)
//! - Full-text search with PostgreSQL tsvector ranking
//! - In-memory test fixtures for dependent crates
//!
//! ## Example
//!
//! ```rust,ignore
//! use docdex_db::Database;
//! use docdex_core::{DocumentStore, ListRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/docdex").await?;
//!     let listing = db.documents.list(owner_id, ListRequest::default()).await?;
//!     println!("{} documents", listing.total);
//!     Ok(())
//! }
//! ```

pub mod documents;
pub mod index;
pub mod pool;
pub mod search;

// Test fixtures for dependent crates' tests.
// Note: Always compiled so crates downstream can use the in-memory
// implementations without a running PostgreSQL instance.
pub mod test_fixtures;

// Re-export core types
pub use docdex_core::*;

pub use documents::PgDocumentStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use search::PgDocumentSearch;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context bundling the pool and repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Document record store.
    pub documents: PgDocumentStore,
    /// Full-text search provider.
    pub search: PgDocumentSearch,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: PgDocumentStore::new(pool.clone()),
            search: PgDocumentSearch::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
