//! Cart route handlers.
//!
//! Handlers orchestrate the cart engine: load the persisted record for this
//! session's cart key, restore it (running the identifier migration and a
//! repricing pass), apply the mutation, respond with the fresh view, and
//! fire a best-effort save. Persistence is decoupled from mutation: a save
//! that never lands loses at most the latest change, it cannot corrupt the
//! cart.
//!
//! Two rapid coupon applications from the same session can still race at the
//! load/save level (last write wins on the record); that matches the
//! accepted best-effort persistence model.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use cakewalk_core::{ProductId, ProductSnapshot};

use crate::cart::{self, CartStore, CouponOutcome, PersistedCart};
use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::session::keys;
use crate::services::checkout::{Address, CheckoutItem, CheckoutRequest, CheckoutSession};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
    pub coupon_code: Option<String>,
    pub coupon_discount: String,
}

impl From<&CartStore> for CartView {
    fn from(store: &CartStore) -> Self {
        let totals = store.totals();
        Self {
            items: store
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product.id,
                    name: item.product.name.clone(),
                    category: item.product.category.clone(),
                    quantity: item.quantity,
                    unit_price: item.product.price.to_string(),
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            item_count: store.item_count(),
            subtotal: totals.subtotal.to_string(),
            tax: totals.tax.to_string(),
            shipping: totals.shipping.to_string(),
            total: totals.total.to_string(),
            coupon_code: store.coupon().map(|c| c.code.clone()),
            coupon_discount: store
                .coupon()
                .map_or_else(|| cakewalk_core::Money::ZERO.to_string(), |c| c.discount.to_string()),
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Product data as presented to the shopper (trusted; it came from the
    /// catalog the storefront itself rendered).
    pub product: ProductSnapshot,
    /// Units to add; defaults to 1.
    pub quantity: Option<u32>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub product_id: ProductId,
    /// New quantity; zero or negative removes the line.
    pub quantity: i64,
}

/// Coupon application request body.
#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Checkout request body: addresses and contact collected by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub shipping_address: Address,
    pub billing_address: Address,
    pub email: String,
}

// =============================================================================
// Session & Persistence Helpers
// =============================================================================

/// Get this session's cart key, minting one on first use.
async fn cart_key(session: &Session) -> Result<String> {
    if let Some(key) = session.get::<String>(keys::CART_KEY).await? {
        return Ok(key);
    }
    let key = Uuid::new_v4().to_string();
    session.insert(keys::CART_KEY, &key).await?;
    Ok(key)
}

/// Load and restore the cart for `key`, or start a fresh one.
async fn load_cart(state: &AppState, key: &str) -> Result<CartStore> {
    recover_cart(CartRepository::new(state.pool()).load(key).await, key)
}

/// Turn a repository load result into a usable cart.
///
/// A record whose stored state no longer decodes is treated as absent: the
/// shopper continues with an empty cart and the next save overwrites the bad
/// record. Item-level problems are migrated inside `restore`; record-level
/// corruption is migrated here. Either way a broken record never blocks
/// shopping. Infrastructure failures still propagate.
fn recover_cart(
    loaded: std::result::Result<Option<PersistedCart>, RepositoryError>,
    key: &str,
) -> Result<CartStore> {
    match loaded {
        Ok(record) => Ok(record.map_or_else(CartStore::new, cart::restore)),
        Err(RepositoryError::DataCorruption(detail)) => {
            tracing::warn!(cart_key = %key, detail = %detail, "discarding undecodable cart record");
            Ok(CartStore::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Persist the cart in the background, best-effort.
///
/// Fire-and-forget by design: the in-memory mutation already happened and
/// must not be rolled back or blocked by storage trouble.
fn spawn_save(state: &AppState, key: String, store: &CartStore) {
    let record = cart::snapshot(store);
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = CartRepository::new(state.pool()).save(&key, &record).await {
            tracing::warn!(cart_key = %key, error = %e, "best-effort cart save failed");
        }
    });
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart view.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let key = cart_key(&session).await?;
    let store = load_cart(&state, &key).await?;
    Ok(Json(CartView::from(&store)))
}

/// Add an item to the cart.
#[instrument(skip(state, session, body))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let quantity = body.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }

    let key = cart_key(&session).await?;
    let mut store = load_cart(&state, &key).await?;

    store.add_item(body.product, quantity);
    spawn_save(&state, key, &store);

    Ok(Json(CartView::from(&store)))
}

/// Update the quantity of a cart line. Zero or negative removes it.
#[instrument(skip(state, session))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let key = cart_key(&session).await?;
    let mut store = load_cart(&state, &key).await?;

    store.update_quantity(body.product_id, body.quantity);
    spawn_save(&state, key, &store);

    Ok(Json(CartView::from(&store)))
}

/// Remove a cart line.
#[instrument(skip(state, session))]
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let product_id: ProductId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {id}")))?;

    let key = cart_key(&session).await?;
    let mut store = load_cart(&state, &key).await?;

    store.remove_item(product_id);
    spawn_save(&state, key, &store);

    Ok(Json(CartView::from(&store)))
}

/// Clear the cart entirely.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let key = cart_key(&session).await?;
    let mut store = load_cart(&state, &key).await?;

    store.clear();
    spawn_save(&state, key, &store);

    Ok(Json(CartView::from(&store)))
}

/// Apply a coupon via the remote validation authority.
///
/// Pre-network rejections (empty code, coupon already bound) and remote
/// rejections come back as client errors with a displayable message; only
/// infrastructure trouble becomes a server error.
#[instrument(skip(state, session, body))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ApplyCouponRequest>,
) -> Result<Response> {
    let key = cart_key(&session).await?;
    let mut store = load_cart(&state, &key).await?;

    let outcome = store.apply_coupon(&body.code, state.coupons()).await;

    let response = match outcome {
        CouponOutcome::Applied(_) => {
            spawn_save(&state, key, &store);
            Json(CartView::from(&store)).into_response()
        }
        CouponOutcome::EmptyCode => coupon_rejection(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Enter a coupon code".to_string(),
        ),
        CouponOutcome::AlreadyApplied => coupon_rejection(
            StatusCode::CONFLICT,
            "Remove the existing coupon first".to_string(),
        ),
        CouponOutcome::Rejected(reason) => coupon_rejection(
            StatusCode::UNPROCESSABLE_ENTITY,
            reason.unwrap_or_else(|| "Coupon is not valid".to_string()),
        ),
    };

    Ok(response)
}

/// Remove the bound coupon.
#[instrument(skip(state, session))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>> {
    let key = cart_key(&session).await?;
    let mut store = load_cart(&state, &key).await?;

    store.remove_coupon();
    spawn_save(&state, key, &store);

    Ok(Json(CartView::from(&store)))
}

/// Create a checkout session with the payment processor.
#[instrument(skip(state, session, body))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutSession>> {
    let key = cart_key(&session).await?;
    let store = load_cart(&state, &key).await?;

    if store.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let request = CheckoutRequest {
        items: store
            .items()
            .iter()
            .map(|item| CheckoutItem {
                product_id: item.product_id(),
                quantity: item.quantity,
            })
            .collect(),
        shipping_address: body.shipping_address,
        billing_address: body.billing_address,
        email: body.email,
    };

    let checkout_session = state.checkout().create_session(&request).await?;
    Ok(Json(checkout_session))
}

/// Build a coupon rejection response with a displayable message.
fn coupon_rejection(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
