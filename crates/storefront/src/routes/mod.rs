//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Products
//! GET  /products                - Product listing (category/featured/search filters)
//! GET  /products/{slug}         - Product detail with reviews and rating
//!
//! # Reviews
//! GET  /products/{slug}/reviews             - Reviews for a product
//! POST /products/{slug}/reviews             - Submit a review (rate limited)
//! GET  /products/{slug}/reviews/eligibility - Eligibility verdict for the caller
//! PUT  /reviews/{id}                        - Edit an owned review
//!
//! # Cart (session-resident)
//! GET    /cart         - Priced cart
//! POST   /cart/add     - Add a product (merges quantities)
//! POST   /cart/update  - Set a line's quantity (0 removes)
//! POST   /cart/remove  - Remove a line
//! DELETE /cart         - Clear the cart
//! GET    /cart/count   - Item count badge
//!
//! # Checkout
//! POST /checkout       - Place an order from the session cart (rate limited)
//!
//! # Account (requires auth)
//! GET    /account/orders                 - Order history
//! GET    /account/orders/{id}            - One order with lines
//! POST   /account/orders/{id}/cancel     - Cancel with a reason
//! GET    /account/wishlist               - Wishlist with product details
//! GET    /account/wishlist/{product_id}  - Saved-state check
//! POST   /account/wishlist/{product_id}  - Add to wishlist (idempotent)
//! DELETE /account/wishlist/{product_id}  - Remove from wishlist
//! GET    /account/addresses              - Saved addresses
//! POST   /account/addresses              - Save a new address
//! PUT    /account/addresses/{id}         - Update an address
//! DELETE /account/addresses/{id}         - Delete an address
//! POST   /account/addresses/{id}/default - Make an address the default
//! ```

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::config::RateLimitConfig;
use crate::middleware::{api_rate_limiter, write_rate_limiter};
use crate::state::AppState;

/// Create the product and review routes router.
pub fn product_routes(limits: &RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route(
            "/{slug}/reviews",
            get(reviews::index).merge(post(reviews::create).layer(write_rate_limiter(limits))),
        )
        .route("/{slug}/reviews/eligibility", get(reviews::eligibility))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/cancel", post(orders::cancel))
        .route("/wishlist", get(wishlist::index))
        .route(
            "/wishlist/{product_id}",
            get(wishlist::contains)
                .post(wishlist::add)
                .delete(wishlist::remove),
        )
        .route(
            "/addresses",
            get(addresses::index).post(addresses::create),
        )
        .route(
            "/addresses/{id}",
            put(addresses::update).delete(addresses::remove),
        )
        .route("/addresses/{id}/default", post(addresses::set_default))
}

/// Create all routes for the storefront.
pub fn routes(limits: &RateLimitConfig) -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes(limits))
        .route("/reviews/{id}", put(reviews::update))
        .nest("/cart", cart_routes())
        .route(
            "/checkout",
            post(checkout::create).layer(write_rate_limiter(limits)),
        )
        .nest("/account", account_routes())
        .layer(api_rate_limiter(limits))
}
