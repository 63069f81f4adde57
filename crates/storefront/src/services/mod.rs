//! External service clients.
//!
//! - [`coupon`] - Remote coupon validation authority
//! - [`checkout`] - Payment processor checkout session API

pub mod checkout;
pub mod coupon;
