//! Session key constants.
//!
//! Identity is resolved per-request from the bearer token, so the session
//! only carries anonymous state: the cart.

/// Session keys for storefront state.
pub mod session_keys {
    /// Key for the session cart ([`crate::models::Cart`]).
    pub const CART: &str = "cart";
}
