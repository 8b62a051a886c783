//! Core types for Craftloom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod matching;
pub mod price;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use matching::{AuthorMatch, PurchaserMatch};
pub use price::Price;
pub use rating::{Rating, RatingError};
pub use status::*;
