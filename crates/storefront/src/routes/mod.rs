//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies Postgres)
//!
//! # Cart (JSON API)
//! GET    /cart                 - Current cart view
//! POST   /cart/items           - Add item (accumulates quantity)
//! PATCH  /cart/items           - Update item quantity (<= 0 removes)
//! DELETE /cart/items/{id}      - Remove item
//! DELETE /cart                 - Clear cart
//! POST   /cart/coupon          - Apply a coupon (remote validation)
//! DELETE /cart/coupon          - Remove the bound coupon
//! POST   /cart/checkout        - Create a checkout session
//! ```

pub mod cart;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add_item).patch(cart::update_item))
        .route("/cart/items/{id}", delete(cart::remove_item))
        .route(
            "/cart/coupon",
            post(cart::apply_coupon).delete(cart::remove_coupon),
        )
        .route("/cart/checkout", post(cart::checkout))
}

/// Create the complete routes router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(cart_routes())
}
