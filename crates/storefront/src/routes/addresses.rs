//! Saved-address route handlers.
//!
//! All operations are scoped to the authenticated user; an address id
//! belonging to someone else behaves as if it did not exist.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use craftloom_core::AddressId;

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, NewAddress};
use crate::state::AppState;

/// List the caller's addresses, default first.
#[instrument(skip(state, identity))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list(identity.id)
        .await?;
    Ok(Json(addresses))
}

/// Save a new address.
#[instrument(skip(state, identity, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = AddressRepository::new(state.pool())
        .insert(identity.id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Replace an address's fields.
#[instrument(skip(state, identity, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(address_id): Path<AddressId>,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<NewAddress>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .update(identity.id, address_id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("address {address_id}")))?;
    Ok(Json(address))
}

/// Delete an address.
#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    Path(address_id): Path<AddressId>,
    RequireAuth(identity): RequireAuth,
) -> Result<StatusCode> {
    let deleted = AddressRepository::new(state.pool())
        .delete(identity.id, address_id)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("address {address_id}")))
    }
}

/// Make an address the caller's default.
#[instrument(skip(state, identity))]
pub async fn set_default(
    State(state): State<AppState>,
    Path(address_id): Path<AddressId>,
    RequireAuth(identity): RequireAuth,
) -> Result<StatusCode> {
    let updated = AddressRepository::new(state.pool())
        .set_default(identity.id, address_id)
        .await?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("address {address_id}")))
    }
}
