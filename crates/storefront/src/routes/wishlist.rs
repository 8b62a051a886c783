//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use craftloom_core::ProductId;

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{WishlistEntry, WishlistItem};
use crate::state::AppState;

/// Saved-state payload for one product.
#[derive(Debug, Serialize)]
pub struct WishlistContains {
    pub saved: bool,
}

/// List the caller's wishlist with product details.
#[instrument(skip(state, identity))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<WishlistEntry>>> {
    let entries = WishlistRepository::new(state.pool())
        .list(identity.id)
        .await?;
    Ok(Json(entries))
}

/// Save a product to the caller's wishlist. Idempotent.
#[instrument(skip(state, identity))]
pub async fn add(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    RequireAuth(identity): RequireAuth,
) -> Result<(StatusCode, Json<WishlistItem>)> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound(format!("product {product_id}")));
    }

    let item = WishlistRepository::new(state.pool())
        .add(identity.id, product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Remove a product from the caller's wishlist.
#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    RequireAuth(identity): RequireAuth,
) -> Result<StatusCode> {
    let removed = WishlistRepository::new(state.pool())
        .remove(identity.id, product_id)
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "wishlist item for product {product_id}"
        )))
    }
}

/// Whether the caller has saved a product.
#[instrument(skip(state, identity))]
pub async fn contains(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<WishlistContains>> {
    let saved = WishlistRepository::new(state.pool())
        .contains(identity.id, product_id)
        .await?;
    Ok(Json(WishlistContains { saved }))
}
