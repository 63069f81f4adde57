//! Session-related types.

/// Session keys for cart state.
pub mod keys {
    /// Key for the cart record key in the carts table.
    pub const CART_KEY: &str = "cart_key";
}
