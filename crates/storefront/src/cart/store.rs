//! The authoritative cart state container.
//!
//! `CartStore` owns the line items, the coupon binding and the derived
//! totals. Every mutator ends by re-running the pricing engine and returns
//! the fresh totals, so no caller can observe totals that disagree with the
//! items. The only suspension point is the remote round trip inside
//! [`CartStore::apply_coupon`]; state is untouched until the validator
//! accepts (no optimistic update).
//!
//! Nothing here performs I/O besides that one validation call, and no
//! failure escapes as an error: coupon problems are reported as a
//! [`CouponOutcome`] value. A broken coupon must never block shopping.

use cakewalk_core::{Money, ProductId, ProductSnapshot};

use crate::cart::pricing::{Totals, price_cart};
use crate::services::coupon::{CouponDecision, ItemSummary, ValidateCoupon};

/// One product-and-quantity entry in the cart, keyed by product identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Denormalized product data captured at add time.
    pub product: ProductSnapshot,
    /// Quantity, always >= 1 (a would-be zero removes the line instead).
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// The product identifier this line is keyed by.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price x quantity.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

/// A coupon confirmed by the remote authority and bound to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    /// Coupon code as echoed by the authority.
    pub code: String,
    /// Confirmed discount amount.
    pub discount: Money,
}

/// Result of an [`CartStore::apply_coupon`] call.
///
/// Only `Applied` mutates the cart. The rejection variants exist so the
/// caller can show distinct messages; none of them is an error in the
/// `Result` sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponOutcome {
    /// The coupon was bound; totals were recomputed.
    Applied(Totals),
    /// A coupon is already bound; remove it first. No network call was made.
    AlreadyApplied,
    /// The submitted code was empty or whitespace. No network call was made.
    EmptyCode,
    /// The authority rejected the code, or the call failed. State unchanged.
    Rejected(Option<String>),
}

impl CouponOutcome {
    /// Whether the coupon ended up bound to the cart.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// The shopper's cart: items, coupon binding, and derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    items: Vec<LineItem>,
    coupon: Option<AppliedCoupon>,
    totals: Totals,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            coupon: None,
            totals: Totals::ZERO,
        }
    }

    /// Rebuild a cart from restored parts, recomputing totals.
    ///
    /// Used by persistence restore; never trusts previously derived totals.
    #[must_use]
    pub fn from_parts(items: Vec<LineItem>, coupon: Option<AppliedCoupon>) -> Self {
        let mut store = Self {
            items,
            coupon,
            totals: Totals::ZERO,
        };
        store.recompute();
        store
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The bound coupon, if any.
    #[must_use]
    pub const fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// The current derived totals.
    #[must_use]
    pub const fn totals(&self) -> Totals {
        self.totals
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total unit count across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Add `quantity` units of `product`.
    ///
    /// Accumulates into an existing line item for the same product id, or
    /// appends a new line with a fresh snapshot. There is never more than
    /// one line per product id. `quantity` is assumed positive; enforcing
    /// that is the caller's job.
    pub fn add_item(&mut self, product: ProductSnapshot, quantity: u32) -> Totals {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(LineItem::new(product, quantity));
        }
        self.recompute()
    }

    /// Remove the line item for `product_id`. No-op if absent.
    pub fn remove_item(&mut self, product_id: ProductId) -> Totals {
        self.items.retain(|i| i.product.id != product_id);
        self.recompute()
    }

    /// Replace the quantity of the line item for `product_id`.
    ///
    /// A quantity of zero or less means "remove" and delegates to
    /// [`Self::remove_item`]. No-op if the item is absent.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Totals {
        let Ok(quantity @ 1..) = u32::try_from(quantity) else {
            return self.remove_item(product_id);
        };

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = quantity;
        }
        self.recompute()
    }

    /// Empty the cart and drop any coupon binding.
    ///
    /// Zero is the pricing fixed point, so no recompute is needed.
    pub fn clear(&mut self) -> Totals {
        self.items.clear();
        self.coupon = None;
        self.totals = Totals::ZERO;
        self.totals
    }

    /// Validate `code` against the remote authority and bind it on success.
    ///
    /// Guarded: an empty code or an already-bound coupon is rejected before
    /// any network call (no stacking - remove the existing coupon first).
    /// While the validation is pending, the cart's visible state is the
    /// pre-call state; only an accepting verdict mutates anything. Transport
    /// failure is treated the same as a rejection.
    ///
    /// The exclusive borrow makes two in-flight validations against the same
    /// cart unrepresentable, closing the double-apply race by construction.
    pub async fn apply_coupon<V: ValidateCoupon>(
        &mut self,
        code: &str,
        validator: &V,
    ) -> CouponOutcome {
        let code = code.trim();
        if code.is_empty() {
            return CouponOutcome::EmptyCode;
        }
        if self.coupon.is_some() {
            return CouponOutcome::AlreadyApplied;
        }

        let summaries: Vec<ItemSummary> = self
            .items
            .iter()
            .map(|i| ItemSummary {
                product_id: i.product.id,
                category: i.product.category.clone(),
            })
            .collect();

        match validator
            .validate(code, self.totals.subtotal, &summaries)
            .await
        {
            Ok(CouponDecision::Accepted { code, discount }) => {
                self.coupon = Some(AppliedCoupon { code, discount });
                CouponOutcome::Applied(self.recompute())
            }
            Ok(CouponDecision::Declined { reason }) => CouponOutcome::Rejected(reason),
            Err(e) => {
                tracing::warn!(code, error = %e, "coupon validation call failed");
                CouponOutcome::Rejected(None)
            }
        }
    }

    /// Drop the coupon binding and recompute.
    pub fn remove_coupon(&mut self) -> Totals {
        self.coupon = None;
        self.recompute()
    }

    /// Re-derive totals from items and coupon discount.
    ///
    /// The single write path for `totals`; the last step of every mutation.
    fn recompute(&mut self) -> Totals {
        let discount = self.coupon.as_ref().map_or(Money::ZERO, |c| c.discount);
        self.totals = price_cart(&self.items, discount);
        self.totals
    }
}
