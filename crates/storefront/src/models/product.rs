//! Product catalog domain types.
//!
//! The catalog is read-only from the storefront's perspective; products are
//! managed out of band.

use chrono::{DateTime, Utc};
use serde::Serialize;

use craftloom_core::{Price, ProductId};

/// A catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug, unique across the catalog.
    pub slug: String,
    /// Category label (e.g., "Painting", "Terracotta Pots").
    pub category: String,
    /// Current selling price.
    pub price: Price,
    /// Pre-discount price, when the product is on offer.
    pub original_price: Option<Price>,
    /// Image URLs in display order.
    pub images: Vec<String>,
    /// Long-form description.
    pub description: String,
    /// Materials/dimensions specification text.
    pub specification: String,
    /// Free-form size label.
    pub size: Option<String>,
    /// Whether the product is featured on the home page.
    pub is_featured: bool,
    /// When the product was added.
    pub created_at: DateTime<Utc>,
}
