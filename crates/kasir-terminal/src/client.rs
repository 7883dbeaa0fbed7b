//! # POS API Client
//!
//! Thin HTTP client for the Kasir POS server. Every call enforces a
//! timeout; a timed-out checkout surfaces as `RequestTimeout` so the
//! cashier is told to verify before re-ringing the sale.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use kasir_core::{CreateSaleRequest, Product, Sale, SaleItem, User};

use crate::error::TerminalError;

// =============================================================================
// Configuration
// =============================================================================

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Server base URL, e.g. `http://192.168.1.10:3001`.
    pub base_url: String,

    /// Bearer token attached to every request, when set.
    pub token: Option<String>,

    /// Per-request timeout. Default: 15 seconds.
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClientConfig {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// The server's uniform response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A completed sale as returned by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(flatten)]
    pub sale: Sale,
    #[serde(default)]
    pub items: Vec<SaleItem>,
    #[serde(default)]
    pub cashier: Option<User>,
}

/// One page of the product listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageDto {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// One typed settings row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDto {
    pub key: String,
    pub value: String,
    pub value_type: String,
    pub category: String,
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the POS API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Builds a client with the configured timeout baked in.
    pub fn new(config: ApiClientConfig) -> Result<Self, TerminalError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TerminalError::Network(e.to_string()))?;

        Ok(ApiClient { http, config })
    }

    /// Submits a checkout. On a business rejection the error carries the
    /// server's message verbatim and the caller's cart must stay intact.
    pub async fn create_sale(&self, request: &CreateSaleRequest) -> Result<Receipt, TerminalError> {
        debug!(items = request.items.len(), "Submitting checkout");

        let response = self
            .authorize(self.http.post(self.url("/api/pos/sales")))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_envelope(response).await
    }

    /// Fetches a page of in-stock products.
    pub async fn products(
        &self,
        search: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<ProductPageDto, TerminalError> {
        let mut query: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }

        let response = self
            .authorize(self.http.get(self.url("/api/pos/products")))
            .query(&query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_envelope(response).await
    }

    /// Fetches a sale with its items.
    pub async fn sale(&self, id: i64) -> Result<Receipt, TerminalError> {
        let response = self
            .authorize(self.http.get(self.url(&format!("/api/pos/sales/{id}"))))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_envelope(response).await
    }

    /// Cancels a sale.
    pub async fn cancel_sale(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> Result<Receipt, TerminalError> {
        let body = serde_json::json!({ "reason": reason });

        let response = self
            .authorize(
                self.http
                    .put(self.url(&format!("/api/pos/sales/{id}/cancel"))),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_envelope(response).await
    }

    /// Fetches the POS settings category.
    pub async fn pos_settings(&self) -> Result<Vec<SettingDto>, TerminalError> {
        let response = self
            .authorize(self.http.get(self.url("/api/settings")))
            .query(&[("category", "pos")])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_envelope(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> TerminalError {
        if err.is_timeout() {
            TerminalError::RequestTimeout {
                seconds: self.config.timeout.as_secs(),
            }
        } else {
            TerminalError::Network(err.to_string())
        }
    }

    /// Decodes the uniform envelope, turning `success: false` into a
    /// cashier-facing rejection.
    async fn read_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TerminalError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
            .map_err(|_| TerminalError::BadResponse(format!("HTTP {status}")))?;

        if envelope.success {
            envelope
                .data
                .ok_or_else(|| TerminalError::BadResponse("envelope missing data".to_string()))
        } else {
            let message = if envelope.message.is_empty() {
                envelope.error.unwrap_or_else(|| format!("HTTP {status}"))
            } else {
                envelope.message
            };
            Err(TerminalError::Rejected { message })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_business_rejection() {
        let json = r#"{"success":false,"message":"Insufficient stock for Teh Botol. Available: 10, Requested: 1000","error":"InsufficientStock"}"#;
        let envelope: ApiEnvelope<Receipt> = serde_json::from_str(json).unwrap();

        assert!(!envelope.success);
        assert!(envelope.message.contains("Available: 10"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn receipt_decodes_flattened_sale_with_items() {
        let json = r#"{
            "id": 12, "saleNumber": "SALE-20260825-0003",
            "customerId": null, "customerName": "Budi",
            "customerPhone": null, "customerEmail": null,
            "cashierId": 1,
            "subtotal": "12200.00", "discount": "0", "discountType": "fixed",
            "tax": "0.00", "taxRate": "0",
            "total": "12200.00", "amountPaid": "15000", "change": "2800.00",
            "paymentMethod": "cash", "status": "completed", "notes": null,
            "saleDate": "2026-08-25T03:10:00Z",
            "createdAt": "2026-08-25T03:10:00Z", "updatedAt": "2026-08-25T03:10:00Z",
            "items": [], "cashier": {"id": 1, "username": "siti", "name": "Siti Rahma"}
        }"#;

        let receipt: Receipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.sale.sale_number, "SALE-20260825-0003");
        assert_eq!(receipt.cashier.unwrap().username, "siti");
    }

    #[test]
    fn config_builder() {
        let config = ApiClientConfig::new("http://localhost:3001/")
            .token("abc")
            .timeout(Duration::from_secs(5));
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
