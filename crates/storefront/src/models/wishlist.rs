//! Wishlist domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use craftloom_core::{ProductId, WishlistItemId};

use super::product::Product;

/// A product saved to a user's wishlist.
///
/// The (user, product) pair is unique; re-adding is a no-op.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    /// Unique wishlist row ID.
    pub id: WishlistItemId,
    /// Owning identity (identity-provider user id).
    pub user_id: Uuid,
    /// Saved product.
    pub product_id: ProductId,
    /// When the product was saved.
    pub created_at: DateTime<Utc>,
}

/// A wishlist item joined with its product details for display.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    /// The wishlist row.
    #[serde(flatten)]
    pub item: WishlistItem,
    /// The saved product.
    pub product: Product,
}
