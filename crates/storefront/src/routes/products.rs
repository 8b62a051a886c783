//! Product route handlers.
//!
//! The catalog is read-only from the storefront's point of view. Product
//! detail responses fold the product's reviews into an average rating on
//! every read; slug lookups are served from a short-lived in-process cache.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{ProductRepository, ReviewRepository, products::ProductFilter};
use crate::error::{AppError, Result};
use crate::models::{Product, RatingSummary, Review};
use crate::services::reviews::average_rating;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Product detail payload: the product plus its reviews and rating.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub rating: RatingSummary,
    pub reviews: Vec<Review>,
}

/// List products, optionally filtered or searched.
///
/// A `search` parameter takes precedence over category/featured filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.pool());

    let products = if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        repo.search(search.trim(), query.limit.unwrap_or(20)).await?
    } else {
        repo.list(&ProductFilter {
            category: query.category,
            featured: query.featured,
            limit: query.limit,
            offset: query.offset,
        })
        .await?
    };

    Ok(Json(products))
}

/// Look up a product by slug, via the in-process cache.
pub(crate) async fn product_by_slug(state: &AppState, slug: &str) -> Result<Product> {
    if let Some(product) = state.product_cache().get(slug).await {
        return Ok(product);
    }

    let product = ProductRepository::new(state.pool())
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}'")))?;

    state
        .product_cache()
        .insert(slug.to_owned(), product.clone())
        .await;
    Ok(product)
}

/// Product detail with reviews and the computed average rating.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product = product_by_slug(&state, &slug).await?;

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product.id)
        .await?;
    let rating = average_rating(&reviews);

    Ok(Json(ProductDetail {
        product,
        rating,
        reviews,
    }))
}
