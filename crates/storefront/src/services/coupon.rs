//! Coupon validation client.
//!
//! Coupon business rules (minimum purchase, category restrictions, expiry,
//! usage limits) are evaluated by a remote authority, not reproduced locally.
//! This module reduces the remote verdict to a [`CouponDecision`] the cart
//! store can bind without knowing anything about the wire format.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cakewalk_core::{Money, ProductId};

use crate::config::CouponServiceConfig;

/// Errors that can occur when talking to the coupon service.
#[derive(Debug, Error)]
pub enum CouponError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse or convert the response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Summary of one cart line forwarded to the coupon authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    /// Product identifier.
    pub product_id: ProductId,
    /// Category label, if the snapshot carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The validator's verdict, reduced to what the cart needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponDecision {
    /// The coupon is valid; bind `code` and `discount` to the cart.
    Accepted {
        /// Canonical coupon code as echoed by the authority.
        code: String,
        /// Currency amount to subtract from the subtotal.
        discount: Money,
    },
    /// The coupon was rejected; `reason` is displayable but optional.
    Declined {
        /// Human-readable rejection reason, when the authority provides one.
        reason: Option<String>,
    },
}

/// Seam for coupon validation so the cart store can be tested with a mock.
pub trait ValidateCoupon {
    /// Validate `code` against the current subtotal and item summaries.
    fn validate(
        &self,
        code: &str,
        subtotal: Money,
        items: &[ItemSummary],
    ) -> impl Future<Output = Result<CouponDecision, CouponError>> + Send;
}

// =============================================================================
// Wire format
// =============================================================================

/// Validation request body.
///
/// `items` is a JSON-encoded array *inside* the JSON body - a quirk of the
/// coupon service's contract that must be preserved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest<'a> {
    code: &'a str,
    total: Decimal,
    items: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponse {
    valid: bool,
    coupon: Option<CouponPayload>,
    error: Option<String>,
}

/// Coupon details as returned by the authority.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPayload {
    /// Authority-side coupon record id.
    pub id: String,
    /// Canonical coupon code.
    pub code: String,
    /// Discount kind.
    #[serde(rename = "type")]
    pub kind: CouponKind,
    /// Percentage or fixed value, depending on `kind`.
    pub value: Decimal,
    /// Resolved discount as a currency amount.
    pub discount: Decimal,
    /// Total the authority expects after discounting.
    pub final_total: Decimal,
}

/// Discount kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Percentage of the subtotal.
    Percentage,
    /// Fixed currency amount.
    Fixed,
}

// =============================================================================
// CouponClient
// =============================================================================

/// HTTP client for the coupon validation service.
#[derive(Clone)]
pub struct CouponClient {
    client: reqwest::Client,
    base_url: String,
}

impl CouponClient {
    /// Create a new coupon validation client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CouponServiceConfig) -> Result<Self, CouponError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CouponError::Parse(format!("Invalid token format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl ValidateCoupon for CouponClient {
    async fn validate(
        &self,
        code: &str,
        subtotal: Money,
        items: &[ItemSummary],
    ) -> Result<CouponDecision, CouponError> {
        let items_json = serde_json::to_string(items)
            .map_err(|e| CouponError::Parse(format!("item summary encoding: {e}")))?;

        let body = ValidateRequest {
            code,
            total: subtotal.to_decimal(),
            items: items_json,
        };

        let url = format!("{}/coupons/validate", self.base_url);
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CouponError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ValidateResponse = response
            .json()
            .await
            .map_err(|e| CouponError::Parse(e.to_string()))?;

        if !parsed.valid {
            return Ok(CouponDecision::Declined {
                reason: parsed.error,
            });
        }

        let coupon = parsed
            .coupon
            .ok_or_else(|| CouponError::Parse("valid response missing coupon".to_string()))?;
        let discount = Money::from_decimal(coupon.discount)
            .map_err(|e| CouponError::Parse(e.to_string()))?;

        Ok(CouponDecision::Accepted {
            code: coupon.code,
            discount,
        })
    }
}
