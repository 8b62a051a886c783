//! Domain models for storefront.
//!
//! These types represent validated domain objects separate from database
//! row types. Conversions from rows live in the `db` modules and surface
//! bad stored values as `RepositoryError::DataCorruption`.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod wishlist;

pub use address::{Address, NewAddress};
pub use cart::{Cart, CartLine, PricedCart, PricedCartItem};
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderWithLines, Purchaser, ShippingDetails};
pub use product::Product;
pub use review::{NewReview, RatingSummary, Review, ReviewUpdate};
pub use session::session_keys;
pub use wishlist::{WishlistEntry, WishlistItem};
