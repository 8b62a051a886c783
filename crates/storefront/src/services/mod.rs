//! Business services for the storefront.
//!
//! - [`identity`] - Delegated identity lookup (external provider)
//! - [`reviews`] - Review eligibility engine and write path
//! - [`orders`] - Checkout totals, the order-creation saga, history, cancel
//! - [`cart`] - Session cart operations and pricing

pub mod cart;
pub mod identity;
pub mod orders;
pub mod reviews;
