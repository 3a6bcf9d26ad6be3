//! Billing module
//!
//! Defines the payment gateway capability used by the checkout workflow and
//! its implementations:
//! - `fake` - In-memory gateway with test tokens and a before-first-charge hook
//! - `stripe` - Adapter for the Stripe charges API
//!
//! Gateways are selected at runtime through [`GatewayConfig`].

pub mod fake;
pub mod stripe;

pub use fake::FakePaymentGateway;
pub use stripe::StripePaymentGateway;

use crate::types::{Cents, TicketingError};
use std::sync::Arc;

/// The result of a successful charge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// Amount charged in cents
    pub amount: Cents,
    /// Last four digits of the charged card
    pub card_last_four: String,
}

/// Capability for charging a card token
///
/// Implementations must be shareable across purchase workers.
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` cents to the card behind `token`
    ///
    /// # Errors
    ///
    /// Returns `TicketingError::PaymentFailed` when the token is invalid or
    /// unknown, or when the processor declines the charge.
    fn charge(&self, amount: Cents, token: &str) -> Result<Charge, TicketingError>;
}

/// Gateway selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayConfig {
    /// In-memory gateway accepting the standard test tokens
    Fake,
    /// Stripe charges API
    Stripe {
        /// Secret API key
        secret_key: String,
        /// API base URL, normally `https://api.stripe.com`
        api_base: String,
    },
}

/// Create the gateway described by `config`
///
/// # Errors
///
/// Returns an error message if the HTTP client for a remote gateway cannot be built.
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn PaymentGateway>, String> {
    match config {
        GatewayConfig::Fake => Ok(Arc::new(FakePaymentGateway::with_test_cards())),
        GatewayConfig::Stripe {
            secret_key,
            api_base,
        } => {
            let gateway = StripePaymentGateway::new(secret_key.clone())
                .map_err(|e| format!("Failed to create Stripe gateway: {}", e))?
                .with_api_base(api_base.clone());
            Ok(Arc::new(gateway))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fake_gateway_accepts_test_cards() {
        let gateway = build_gateway(&GatewayConfig::Fake).unwrap();

        let charge = gateway.charge(2500, "tok_visa").unwrap();

        assert_eq!(charge.amount, 2500);
        assert_eq!(charge.card_last_four, "4242");
    }

    #[test]
    fn test_build_fake_gateway_rejects_unknown_tokens() {
        let gateway = build_gateway(&GatewayConfig::Fake).unwrap();

        let result = gateway.charge(2500, "tok_chargeDeclined");

        assert!(matches!(result, Err(TicketingError::PaymentFailed { .. })));
    }
}
