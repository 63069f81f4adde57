//! Checkout session client for the external payment processor.
//!
//! The storefront never touches card data: checkout hands the cart contents
//! and addresses to the processor, which returns a hosted checkout URL to
//! redirect the shopper to.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cakewalk_core::ProductId;

use crate::config::CheckoutServiceConfig;

/// Errors that can occur when creating a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One purchasable line in a checkout session request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    /// Product identifier.
    pub product_id: ProductId,
    /// Quantity to purchase.
    pub quantity: u32,
}

/// A postal address as collected by the checkout form.
///
/// Passed through to the processor opaquely; no validation happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Checkout session creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Items to purchase.
    pub items: Vec<CheckoutItem>,
    /// Delivery address.
    pub shipping_address: Address,
    /// Billing address.
    pub billing_address: Address,
    /// Contact email for receipts.
    pub email: String,
}

/// A created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Hosted checkout page to redirect the shopper to.
    pub checkout_url: String,
    /// Processor-side session identifier.
    pub session_id: String,
}

/// HTTP client for the payment processor's checkout API.
#[derive(Clone)]
pub struct CheckoutClient {
    client: reqwest::Client,
    base_url: String,
}

impl CheckoutClient {
    /// Create a new checkout session client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CheckoutServiceConfig) -> Result<Self, CheckoutError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CheckoutError::Parse(format!("Invalid token format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a checkout session for the given cart contents.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response cannot be
    /// parsed.
    pub async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let url = format!("{}/checkout/sessions", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CheckoutError::Parse(e.to_string()))
    }
}
