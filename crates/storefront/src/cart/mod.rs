//! Cart state and pricing engine.
//!
//! The cart is an explicit state container ([`store::CartStore`]) whose
//! derived totals are assigned only by the pure pricing function in
//! [`pricing`]. Persistence is fully decoupled: [`persistence`] defines the
//! owned record format, the restore-time identifier migration, and the
//! snapshot used for best-effort saves.

pub mod persistence;
pub mod pricing;
pub mod store;

pub use persistence::{CART_RECORD_VERSION, PersistedCart, restore, snapshot};
pub use pricing::{Totals, price_cart};
pub use store::{AppliedCoupon, CartStore, CouponOutcome, LineItem};
