//! Wishlist repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use craftloom_core::{Price, ProductId, WishlistItemId};

use super::RepositoryError;
use crate::models::{Product, WishlistEntry, WishlistItem};

#[derive(sqlx::FromRow)]
struct WishlistRow {
    id: WishlistItemId,
    user_id: Uuid,
    product_id: ProductId,
    created_at: DateTime<Utc>,
}

impl From<WishlistRow> for WishlistItem {
    fn from(row: WishlistRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            created_at: row.created_at,
        }
    }
}

/// Wishlist item joined with product columns.
#[derive(sqlx::FromRow)]
struct WishlistEntryRow {
    id: WishlistItemId,
    user_id: Uuid,
    product_id: ProductId,
    created_at: DateTime<Utc>,
    name: String,
    slug: String,
    category: String,
    price: Price,
    original_price: Option<Price>,
    images: Vec<String>,
    description: Option<String>,
    specification: Option<String>,
    size: Option<String>,
    is_featured: bool,
    product_created_at: DateTime<Utc>,
}

impl From<WishlistEntryRow> for WishlistEntry {
    fn from(row: WishlistEntryRow) -> Self {
        Self {
            item: WishlistItem {
                id: row.id,
                user_id: row.user_id,
                product_id: row.product_id,
                created_at: row.created_at,
            },
            product: Product {
                id: row.product_id,
                name: row.name,
                slug: row.slug,
                category: row.category,
                price: row.price,
                original_price: row.original_price,
                images: row.images,
                description: row.description.unwrap_or_default(),
                specification: row.specification.unwrap_or_default(),
                size: row.size,
                is_featured: row.is_featured,
                created_at: row.product_created_at,
            },
        }
    }
}

/// Repository for wishlist reads and writes.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Save a product to the user's wishlist.
    ///
    /// Idempotent: re-adding an already-saved product returns the existing
    /// row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add(
        &self,
        user_id: Uuid,
        product_id: ProductId,
    ) -> Result<WishlistItem, RepositoryError> {
        let inserted = sqlx::query_as::<_, WishlistRow>(
            "INSERT INTO wishlist_items (id, user_id, product_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, product_id) DO NOTHING
             RETURNING id, user_id, product_id, created_at",
        )
        .bind(WishlistItemId::random())
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(WishlistItem::from(row));
        }

        // Conflict path: the pair already exists.
        let row = sqlx::query_as::<_, WishlistRow>(
            "SELECT id, user_id, product_id, created_at
             FROM wishlist_items
             WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(WishlistItem::from(row))
    }

    /// Remove a product from the user's wishlist.
    ///
    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: Uuid,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the user's wishlist with product details, newest-first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistEntryRow>(
            "SELECT w.id, w.user_id, w.product_id, w.created_at,
                    p.name, p.slug, p.category, p.price, p.original_price, p.images,
                    p.description, p.specification, p.size, p.is_featured,
                    p.created_at AS product_created_at
             FROM wishlist_items w
             JOIN products p ON p.id = w.product_id
             WHERE w.user_id = $1
             ORDER BY w.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WishlistEntry::from).collect())
    }

    /// Whether the user has saved a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: Uuid,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM wishlist_items WHERE user_id = $1 AND product_id = $2
             )",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}
