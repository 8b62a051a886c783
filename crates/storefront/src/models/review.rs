//! Review domain types.
//!
//! A review stores its author as a display-name string, not an identity
//! foreign key. Ownership is decided by `craftloom_core::AuthorMatch`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use craftloom_core::{ProductId, Rating, ReviewId};

/// A product review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Author display name as submitted.
    pub author_name: String,
    /// Star rating, 1..=5.
    pub rating: Rating,
    /// Optional comment text.
    pub comment: Option<String>,
    /// Optional photo URLs (the UI caps these at 5; stored as-is).
    pub image_urls: Vec<String>,
    /// When the review was created. Never altered by edits.
    pub created_at: DateTime<Utc>,
}

/// Data for a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub author_name: String,
    pub rating: Rating,
    pub comment: Option<String>,
    pub image_urls: Vec<String>,
}

/// In-place edit of an existing review. `created_at` is untouched and no
/// edit history is kept.
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub rating: Rating,
    pub comment: Option<String>,
    pub image_urls: Vec<String>,
}

/// Average rating computed on read by folding over a product's reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal place; 0.0 when there are no
    /// reviews.
    pub average: f64,
    /// Number of reviews folded.
    pub count: usize,
}
