//! Stripe charges adapter
//!
//! Creates a charge through `POST /v1/charges` with a form-encoded body and
//! HTTP basic auth (secret key as the username). Response handling lives in
//! [`parse_charge_response`] so it can be exercised without the network.

use super::{Charge, PaymentGateway};
use crate::types::{Cents, TicketingError};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Production API base URL
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct StripeCharge {
    amount: Cents,
    source: Option<StripeCard>,
}

#[derive(Debug, Deserialize)]
struct StripeCard {
    last4: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: Option<String>,
}

/// Payment gateway backed by Stripe
#[derive(Debug, Clone)]
pub struct StripePaymentGateway {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripePaymentGateway {
    /// Create a gateway pointed at [`DEFAULT_API_BASE`]
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the HTTP client cannot be initialized.
    pub fn new(secret_key: String) -> Result<Self, TicketingError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TicketingError::IoError {
                message: e.to_string(),
            })?;

        Ok(StripePaymentGateway {
            client,
            secret_key,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn charges_url(&self) -> String {
        format!("{}/v1/charges", self.api_base)
    }
}

impl PaymentGateway for StripePaymentGateway {
    fn charge(&self, amount: Cents, token: &str) -> Result<Charge, TicketingError> {
        debug!(amount, url = %self.charges_url(), "Creating Stripe charge");

        let response = self
            .client
            .post(self.charges_url())
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount.to_string()),
                ("currency", "usd".to_string()),
                ("source", token.to_string()),
            ])
            .send()
            .map_err(|e| TicketingError::payment_failed(format!("Stripe request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            TicketingError::payment_failed(format!("Unreadable Stripe response: {}", e))
        })?;

        parse_charge_response(status, &body)
    }
}

/// Turn a raw charges-API response into a [`Charge`]
///
/// # Errors
///
/// Any non-2xx status, or a 2xx body that is not a charge, becomes
/// `PaymentFailed`. Stripe's own error message is used as the reason when present.
pub fn parse_charge_response(status: u16, body: &str) -> Result<Charge, TicketingError> {
    if !(200..300).contains(&status) {
        let reason = serde_json::from_str::<StripeErrorBody>(body)
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| format!("Stripe returned status {}", status));
        return Err(TicketingError::payment_failed(reason));
    }

    let charge: StripeCharge = serde_json::from_str(body).map_err(|e| {
        TicketingError::payment_failed(format!("Malformed Stripe response: {}", e))
    })?;

    Ok(Charge {
        amount: charge.amount,
        card_last_four: charge.source.map(|card| card.last4).unwrap_or_default(),
    })
}
