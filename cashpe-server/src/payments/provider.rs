//! Payment provider adapters (REST, no SDK dependency)
//!
//! The core talks to the gateway through [`PaymentProvider`]; alternate
//! gateways implement the same contract rather than adding provider-specific
//! branches to the settlement logic.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Provider call failures. All of them are transient from the order's point
/// of view: no local state is changed, the caller may retry with backoff.
/// A timed-out call may still have landed provider-side; reconciliation of
/// that case is a collaborator's job.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request timed out")]
    Timeout,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected provider response: {0}")]
    Malformed(String),
}

/// A provider-side reservation: "this amount is expected to be paid".
#[derive(Debug, Clone)]
pub struct ProviderIntent {
    pub intent_ref: String,
    /// Amount registered with the provider, in minor units
    pub amount: u64,
    pub currency: String,
}

/// Gateway contract used by the payment intent service.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Reserve `amount` minor units with the provider and return the opaque
    /// intent reference the client uses to collect payment.
    async fn create_intent(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<ProviderIntent, ProviderError>;
}

/// Razorpay order API adapter.
pub struct RazorpayProvider {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayProvider {
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        })
    }

    fn classify(error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Unavailable(error.to_string())
        }
    }
}

#[async_trait]
impl PaymentProvider for RazorpayProvider {
    async fn create_intent(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<ProviderIntent, ProviderError> {
        let body = serde_json::json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
        });

        let resp: serde_json::Value = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(Self::classify)?
            .error_for_status()
            .map_err(Self::classify)?
            .json()
            .await
            .map_err(Self::classify)?;

        let intent_ref = resp["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ProviderError::Malformed(format!("missing order id: {resp}")))?;
        let amount = resp["amount"]
            .as_u64()
            .ok_or_else(|| ProviderError::Malformed(format!("missing amount: {resp}")))?;
        let currency = resp["currency"]
            .as_str()
            .unwrap_or(currency)
            .to_string();

        Ok(ProviderIntent {
            intent_ref,
            amount,
            currency,
        })
    }
}
