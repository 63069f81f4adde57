//! End-to-end cart engine tests exercised through the library crates.
//!
//! These run in-process with a mock coupon validator, so they need no
//! database or external services. They walk a full shopping trip: mutations,
//! coupon application, persistence round trips, and the restore-time
//! migration of legacy records.

use cakewalk_core::{Money, ProductId, ProductSnapshot};
use cakewalk_storefront::cart::{self, CartStore, CouponOutcome, PersistedCart, Totals};
use cakewalk_storefront::services::coupon::{
    CouponDecision, CouponError, ItemSummary, ValidateCoupon,
};

/// Mock validator with a single known code.
struct KnownCodeValidator {
    code: &'static str,
    discount: Money,
}

impl ValidateCoupon for KnownCodeValidator {
    async fn validate(
        &self,
        code: &str,
        _subtotal: Money,
        _items: &[ItemSummary],
    ) -> Result<CouponDecision, CouponError> {
        if code.eq_ignore_ascii_case(self.code) {
            Ok(CouponDecision::Accepted {
                code: self.code.to_string(),
                discount: self.discount,
            })
        } else {
            Ok(CouponDecision::Declined {
                reason: Some("Unknown coupon code".to_string()),
            })
        }
    }
}

fn product(name: &str, price_cents: i64, category: &str) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(),
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        category: Some(category.to_string()),
    }
}

/// Serialize and deserialize the persisted record, as the JSONB column does.
fn json_round_trip(record: &PersistedCart) -> PersistedCart {
    let json = serde_json::to_string(record).expect("record must serialize");
    serde_json::from_str(&json).expect("record must deserialize")
}

#[tokio::test]
async fn test_full_shopping_trip() {
    let validator = KnownCodeValidator {
        code: "PARTY5",
        discount: Money::from_cents(5_00),
    };

    let cake = product("Custom Photo Cake", 20_00, "cakes");
    let candles = product("Number Candle", 10_99, "accessories");

    let mut cart = CartStore::new();

    // Single cheap item: below the free-shipping threshold.
    let totals = cart.add_item(candles.clone(), 1);
    assert_eq!(totals.subtotal, Money::from_cents(10_99));
    assert_eq!(totals.tax, Money::from_cents(2_53));
    assert_eq!(totals.shipping, Money::from_cents(5_99));
    assert_eq!(totals.total, Money::from_cents(19_51));

    // Two cakes push the pre-discount subtotal past the threshold.
    let totals = cart.add_item(cake.clone(), 2);
    assert_eq!(totals.subtotal, Money::from_cents(50_99));
    assert_eq!(totals.shipping, Money::ZERO);

    // Drop the candles again; quantity zero removes the line.
    let totals = cart.update_quantity(candles.id, 0);
    assert_eq!(cart.items().len(), 1);
    assert_eq!(totals.subtotal, Money::from_cents(40_00));
    assert_eq!(totals.total, Money::from_cents(49_20));

    // Wrong code first: state untouched.
    let outcome = cart.apply_coupon("BOGUS", &validator).await;
    assert_eq!(
        outcome,
        CouponOutcome::Rejected(Some("Unknown coupon code".to_string()))
    );
    assert!(cart.coupon().is_none());

    // Correct code: discount 5.00, tax on 35.00, shipping still free
    // because the threshold looks at the pre-discount subtotal.
    let outcome = cart.apply_coupon("party5", &validator).await;
    let CouponOutcome::Applied(totals) = outcome else {
        panic!("expected Applied, got {outcome:?}");
    };
    assert_eq!(totals.tax, Money::from_cents(8_05));
    assert_eq!(totals.shipping, Money::ZERO);
    assert_eq!(totals.total, Money::from_cents(43_05));

    // A second application is blocked before any network call.
    assert_eq!(
        cart.apply_coupon("PARTY5", &validator).await,
        CouponOutcome::AlreadyApplied
    );

    // Clearing drops items, coupon, and totals together.
    assert_eq!(cart.clear(), Totals::ZERO);
    assert!(cart.is_empty());
    assert!(cart.coupon().is_none());
}

#[tokio::test]
async fn test_persistence_round_trip_preserves_cart_and_coupon() {
    let validator = KnownCodeValidator {
        code: "PARTY5",
        discount: Money::from_cents(5_00),
    };

    let mut cart = CartStore::new();
    cart.add_item(product("Balloon Arch Kit", 24_50, "decorations"), 2);
    assert!(cart.apply_coupon("PARTY5", &validator).await.is_applied());

    let restored = cart::restore(json_round_trip(&cart::snapshot(&cart)));

    assert_eq!(restored, cart);
    assert_eq!(restored.coupon().expect("coupon survives").code, "PARTY5");
    assert_eq!(restored.totals(), cart.totals());
}

#[test]
fn test_legacy_record_migration_drops_corrupt_lines_once() {
    let good_id = ProductId::new().to_string();

    // A record written before identifiers were hardened: one good line, one
    // demo-data line, one with an uppercased id, one with a dead quantity.
    let legacy = serde_json::json!({
        "state": {
            "items": [
                {
                    "productId": good_id,
                    "quantity": 2,
                    "product": { "name": "Custom Photo Cake", "price": 20_00 }
                },
                {
                    "productId": "demo-cake-1",
                    "quantity": 1,
                    "product": { "name": "Demo Cake", "price": 15_00 }
                },
                {
                    "productId": ProductId::new().to_string().to_uppercase(),
                    "quantity": 1,
                    "product": { "name": "Shouty Cake", "price": 15_00 }
                },
                {
                    "productId": ProductId::new().to_string(),
                    "quantity": 0,
                    "product": { "name": "Ghost Cake", "price": 15_00 }
                }
            ],
            "subtotal": 65_00,
            "tax": 14_95,
            "shipping": 0,
            "total": 79_95,
            "couponDiscount": 0
        },
        "version": 1
    });

    let record: PersistedCart =
        serde_json::from_value(legacy).expect("legacy record must deserialize");
    let cart = cart::restore(record);

    // Only the good line survives, and totals are recomputed from it.
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items().first().expect("one line").quantity, 2);
    assert_eq!(cart.totals().subtotal, Money::from_cents(40_00));
    assert_eq!(cart.totals().total, Money::from_cents(49_20));

    // The next save writes the cleaned state; restoring it drops nothing.
    let resaved = cart::restore(json_round_trip(&cart::snapshot(&cart)));
    assert_eq!(resaved, cart);
}

#[test]
fn test_empty_cart_prices_to_zero_everywhere() {
    let cart = CartStore::new();
    assert_eq!(cart.totals(), Totals::ZERO);

    // An empty record restores to the same fixed point.
    let restored = cart::restore(json_round_trip(&cart::snapshot(&cart)));
    assert_eq!(restored.totals(), Totals::ZERO);
    assert!(restored.is_empty());
}
