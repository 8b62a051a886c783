//! Order history route handlers.
//!
//! Orders carry no identity foreign key, so "my orders" means orders whose
//! purchaser snapshot matches the identity's phone or derived name. An
//! order that doesn't match is reported as not found rather than forbidden.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use craftloom_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderWithLines};
use crate::services::orders::purchaser_owns;
use crate::state::AppState;

/// Cancellation body.
#[derive(Debug, Deserialize)]
pub struct CancelOrderBody {
    pub reason: String,
}

/// List the caller's orders, newest-first, with lines.
#[instrument(skip(state, identity))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<OrderWithLines>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_purchaser(&identity.purchaser_match())
        .await?;
    Ok(Json(orders))
}

/// Fetch one of the caller's orders with its lines.
#[instrument(skip(state, identity))]
pub async fn show(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<OrderWithLines>> {
    let order = OrderRepository::new(state.pool())
        .get_with_lines(order_id)
        .await?
        .filter(|o| purchaser_owns(&identity, &o.order))
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(Json(order))
}

/// Cancel one of the caller's orders with a reason.
///
/// Cancellation is unconditional with respect to status; a delivered order
/// can still be marked cancelled, matching the store's historic behavior.
#[instrument(skip(state, identity, body))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<CancelOrderBody>,
) -> Result<Json<Order>> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(AppError::BadRequest(
            "a cancellation reason is required".to_string(),
        ));
    }

    let repo = OrderRepository::new(state.pool());

    let existing = repo
        .get_with_lines(order_id)
        .await?
        .filter(|o| purchaser_owns(&identity, &o.order))
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    let cancelled = repo
        .cancel(existing.order.id, reason)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    tracing::info!(order_id = %cancelled.id, "order cancelled");
    Ok(Json(cancelled))
}
