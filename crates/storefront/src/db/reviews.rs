//! Review repository.
//!
//! The author-match queries here must use the same two fields and the same
//! equality as `craftloom_core::AuthorMatch` (name OR email against
//! `author_name`, an absent field never matches); the quota count and the
//! edit ownership check depend on the predicates agreeing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use craftloom_core::{AuthorMatch, ProductId, Rating, ReviewId};

use super::RepositoryError;
use crate::models::{NewReview, Review, ReviewUpdate};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    author_name: String,
    rating: Rating,
    comment: Option<String>,
    image_urls: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            author_name: row.author_name,
            rating: row.rating,
            comment: row.comment,
            image_urls: row.image_urls,
            created_at: row.created_at,
        }
    }
}

const REVIEW_COLUMNS: &str = "id, product_id, author_name, rating, comment, image_urls, created_at";

/// Repository for review reads and writes.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a product's reviews newest-first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS}
             FROM reviews
             WHERE product_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// List one author's reviews of a product, newest-first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_author(
        &self,
        product_id: ProductId,
        author: &AuthorMatch,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS}
             FROM reviews
             WHERE product_id = $1
               AND (($2::text IS NOT NULL AND author_name = $2)
                 OR ($3::text IS NOT NULL AND author_name = $3))
             ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .bind(author.name.as_deref())
        .bind(author.email.as_ref().map(craftloom_core::Email::as_str))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Count one author's reviews of a product (quota check).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_author(
        &self,
        product_id: ProductId,
        author: &AuthorMatch,
    ) -> Result<u32, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM reviews
             WHERE product_id = $1
               AND (($2::text IS NOT NULL AND author_name = $2)
                 OR ($3::text IS NOT NULL AND author_name = $3))",
        )
        .bind(product_id)
        .bind(author.name.as_deref())
        .bind(author.email.as_ref().map(craftloom_core::Email::as_str))
        .fetch_one(self.pool)
        .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Get one review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    /// Insert a new review with a server-assigned ID and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (id, product_id, author_name, rating, comment, image_urls)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(ReviewId::random())
        .bind(review.product_id)
        .bind(&review.author_name)
        .bind(review.rating)
        .bind(review.comment.as_deref())
        .bind(&review.image_urls)
        .fetch_one(self.pool)
        .await?;

        Ok(Review::from(row))
    }

    /// Overwrite a review's rating/comment/images in place.
    ///
    /// `created_at` is never altered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ReviewId,
        update: &ReviewUpdate,
    ) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews
             SET rating = $2, comment = $3, image_urls = $4
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(update.rating)
        .bind(update.comment.as_deref())
        .bind(&update.image_urls)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Review::from))
    }
}
