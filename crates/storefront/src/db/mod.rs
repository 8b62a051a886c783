//! Database operations for storefront `PostgreSQL`.
//!
//! ## Tables
//!
//! - `products` - Read-only catalog
//! - `orders` / `order_lines` - Placed orders with price-at-purchase snapshots
//! - `reviews` - Product reviews (author stored as a display-name string)
//! - `wishlist_items` - Per-user saved products
//! - `addresses` - Per-user saved shipping addresses
//! - `tower_sessions.session` - Session store (cart state)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run at
//! startup via `sqlx::migrate!`.

pub mod addresses;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

pub use addresses::AddressRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use wishlist::WishlistRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be converted to its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
