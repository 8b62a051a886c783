//! Saved address domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use craftloom_core::AddressId;

/// A user's saved shipping address.
///
/// At most one address per user is the default; setting a new default
/// clears the previous one in the same transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning identity (identity-provider user id).
    pub user_id: Uuid,
    /// Recipient name.
    pub full_name: String,
    /// Contact phone for delivery.
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Whether this is the user's default address.
    pub is_default: bool,
    /// When the address was saved.
    pub created_at: DateTime<Utc>,
    /// When the address was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating or replacing a saved address.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Make this the default address on save.
    #[serde(default)]
    pub is_default: bool,
}
