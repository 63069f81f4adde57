//! Persisted cart records and restore-time migration.
//!
//! The owned record format mirrors what the client sees: line items plus the
//! derived totals and the coupon binding, wrapped with a version integer.
//! The persisted totals exist only for diagnostics - restore never trusts
//! them and always reprices.
//!
//! Restore is also where legacy data gets migrated away: line items whose
//! product identifier fails canonical parsing (demo data written before the
//! identifier format was hardened) or whose quantity is below one are
//! silently dropped and logged. This is one-way; the next save writes the
//! cleaned state.

use serde::{Deserialize, Serialize};

use cakewalk_core::{Money, ProductId, ProductSnapshot};

use crate::cart::store::{AppliedCoupon, CartStore, LineItem};

/// Version of the persisted cart record format.
pub const CART_RECORD_VERSION: i32 = 1;

/// Product data as persisted inside a line item.
///
/// The identifier lives on the line, not the snapshot, so a corrupt id can
/// be rejected without failing deserialization of the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    /// Display name at add time.
    pub name: String,
    /// Unit price in cents at add time.
    pub price: Money,
    /// Optional category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One persisted line item. The identifier is kept as a raw string until it
/// passes canonical validation during restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLineItem {
    /// Raw product identifier, validated on restore.
    pub product_id: String,
    /// Quantity; values below one are dropped on restore.
    pub quantity: i64,
    /// Product snapshot captured at add time.
    pub product: PersistedSnapshot,
}

/// The persisted cart state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Line items in display order.
    pub items: Vec<PersistedLineItem>,
    /// Derived totals at save time (diagnostic only; recomputed on restore).
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    /// Bound coupon code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Bound coupon discount (zero when no coupon).
    #[serde(default)]
    pub coupon_discount: Money,
}

/// A versioned persisted cart record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCart {
    /// The cart state.
    pub state: PersistedState,
    /// Record format version.
    pub version: i32,
}

/// Capture the current cart as a persistable record.
#[must_use]
pub fn snapshot(store: &CartStore) -> PersistedCart {
    let totals = store.totals();
    PersistedCart {
        state: PersistedState {
            items: store
                .items()
                .iter()
                .map(|item| PersistedLineItem {
                    product_id: item.product.id.to_string(),
                    quantity: i64::from(item.quantity),
                    product: PersistedSnapshot {
                        name: item.product.name.clone(),
                        price: item.product.price,
                        category: item.product.category.clone(),
                    },
                })
                .collect(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            coupon_code: store.coupon().map(|c| c.code.clone()),
            coupon_discount: store.coupon().map_or(Money::ZERO, |c| c.discount),
        },
        version: CART_RECORD_VERSION,
    }
}

/// Rebuild a cart from a persisted record.
///
/// Line items failing identifier validation or quantity hygiene are dropped
/// with a warning; this is a migration, never a user-facing error. Totals
/// are unconditionally recomputed so they can never be stale relative to the
/// (possibly filtered) item list.
#[must_use]
pub fn restore(persisted: PersistedCart) -> CartStore {
    let mut items = Vec::with_capacity(persisted.state.items.len());

    for raw in persisted.state.items {
        let id = match ProductId::parse_canonical(&raw.product_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    product_id = %raw.product_id,
                    error = %e,
                    "dropping persisted cart line with invalid product id"
                );
                continue;
            }
        };

        let Ok(quantity @ 1..) = u32::try_from(raw.quantity) else {
            tracing::warn!(
                product_id = %raw.product_id,
                quantity = raw.quantity,
                "dropping persisted cart line with invalid quantity"
            );
            continue;
        };

        items.push(LineItem::new(
            ProductSnapshot {
                id,
                name: raw.product.name,
                price: raw.product.price,
                category: raw.product.category,
            },
            quantity,
        ));
    }

    let coupon = persisted.state.coupon_code.map(|code| AppliedCoupon {
        code,
        discount: persisted.state.coupon_discount,
    });

    CartStore::from_parts(items, coupon)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn persisted_item(product_id: &str, quantity: i64, price_cents: i64) -> PersistedLineItem {
        PersistedLineItem {
            product_id: product_id.to_string(),
            quantity,
            product: PersistedSnapshot {
                name: "Number Candle".to_string(),
                price: Money::from_cents(price_cents),
                category: None,
            },
        }
    }

    fn record(items: Vec<PersistedLineItem>) -> PersistedCart {
        PersistedCart {
            state: PersistedState {
                items,
                // Deliberately wrong: restore must recompute, not trust these.
                subtotal: Money::from_cents(999_99),
                tax: Money::from_cents(999_99),
                shipping: Money::from_cents(999_99),
                total: Money::from_cents(999_99),
                coupon_code: None,
                coupon_discount: Money::ZERO,
            },
            version: CART_RECORD_VERSION,
        }
    }

    #[test]
    fn test_restore_drops_invalid_product_id() {
        let good = ProductId::new().to_string();
        let cart = restore(record(vec![
            persisted_item("not-a-uuid", 1, 10_00),
            persisted_item(&good, 2, 20_00),
        ]));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id().to_string(), good);
        // Totals recomputed from the surviving item alone.
        assert_eq!(cart.totals().subtotal, Money::from_cents(40_00));
    }

    #[test]
    fn test_restore_drops_non_canonical_id() {
        let upper = ProductId::new().to_string().to_uppercase();
        let cart = restore(record(vec![persisted_item(&upper, 1, 10_00)]));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_restore_drops_zero_and_negative_quantities() {
        let a = ProductId::new().to_string();
        let b = ProductId::new().to_string();
        let cart = restore(record(vec![
            persisted_item(&a, 0, 10_00),
            persisted_item(&b, -3, 10_00),
        ]));
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), crate::cart::Totals::ZERO);
    }

    #[test]
    fn test_restore_never_trusts_persisted_totals() {
        let id = ProductId::new().to_string();
        let cart = restore(record(vec![persisted_item(&id, 1, 10_99)]));

        // record() wrote 999.99 everywhere; the engine must win.
        assert_eq!(cart.totals().subtotal, Money::from_cents(10_99));
        assert_eq!(cart.totals().shipping, Money::from_cents(5_99));
        assert_eq!(cart.totals().tax, Money::from_cents(2_53));
        assert_eq!(cart.totals().total, Money::from_cents(19_51));
    }

    #[test]
    fn test_restore_rebinds_coupon_and_reprices() {
        let id = ProductId::new().to_string();
        let mut rec = record(vec![persisted_item(&id, 2, 20_00)]);
        rec.state.coupon_code = Some("PARTY5".to_string());
        rec.state.coupon_discount = Money::from_cents(5_00);

        let cart = restore(rec);
        assert_eq!(cart.coupon().unwrap().code, "PARTY5");
        assert_eq!(cart.totals().total, Money::from_cents(43_05));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut cart = CartStore::new();
        cart.add_item(
            ProductSnapshot {
                id: ProductId::new(),
                name: "Balloon Arch Kit".to_string(),
                price: Money::from_cents(24_50),
                category: Some("decorations".to_string()),
            },
            2,
        );

        let restored = restore(snapshot(&cart));
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_record_serializes_camel_case_with_version() {
        let mut cart = CartStore::new();
        cart.add_item(
            ProductSnapshot {
                id: ProductId::new(),
                name: "Piping Bag Set".to_string(),
                price: Money::from_cents(12_00),
                category: None,
            },
            1,
        );

        let json = serde_json::to_value(snapshot(&cart)).unwrap();
        assert_eq!(json["version"], CART_RECORD_VERSION);
        assert!(json["state"]["items"][0].get("productId").is_some());
        assert!(json["state"].get("couponDiscount").is_some());
        assert!(json["state"].get("couponCode").is_none(), "no coupon bound");
    }
}
