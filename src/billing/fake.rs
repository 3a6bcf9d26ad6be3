//! In-memory payment gateway
//!
//! `FakePaymentGateway` accepts only tokens it issued or had registered,
//! records every successful charge, and can run a one-shot hook right before
//! the first charge is processed. The hook is how purchase races are staged
//! deterministically: another purchase runs while the first one holds its
//! reservation but has not been charged yet.

use super::{Charge, PaymentGateway};
use crate::types::{Cents, TicketingError};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Card number used when no card is given
pub const TEST_CARD_NUMBER: &str = "4242424242424242";

/// Test tokens accepted by [`FakePaymentGateway::with_test_cards`]
pub const TEST_CARD_TOKENS: [(&str, &str); 3] = [
    ("tok_visa", "4242424242424242"),
    ("tok_mastercard", "5555555555554444"),
    ("tok_amex", "378282246310005"),
];

/// Hook run once before the first charge
pub type BeforeChargeHook = Box<dyn FnOnce(&FakePaymentGateway) + Send>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn last_four(card_number: &str) -> String {
    let skip = card_number.chars().count().saturating_sub(4);
    card_number.chars().skip(skip).collect()
}

/// Payment gateway test double
#[derive(Default)]
pub struct FakePaymentGateway {
    charges: Mutex<Vec<Charge>>,
    /// token -> card number
    tokens: Mutex<HashMap<String, String>>,
    before_first_charge: Mutex<Option<BeforeChargeHook>>,
}

impl std::fmt::Debug for FakePaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakePaymentGateway")
            .field("charges", &*lock(&self.charges))
            .field("tokens", &lock(&self.tokens).len())
            .finish()
    }
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that also accepts the well-known `tok_*` test tokens
    pub fn with_test_cards() -> Self {
        let gateway = Self::new();
        for (token, card_number) in TEST_CARD_TOKENS {
            gateway.register_token(token, card_number);
        }
        gateway
    }

    /// Issue a fresh token for `card_number` (defaults to [`TEST_CARD_NUMBER`])
    pub fn get_valid_test_token(&self, card_number: Option<&str>) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        let token = format!("fake_tok{}", suffix);
        self.register_token(&token, card_number.unwrap_or(TEST_CARD_NUMBER));
        token
    }

    pub fn register_token(&self, token: &str, card_number: &str) {
        lock(&self.tokens).insert(token.to_string(), card_number.to_string());
    }

    /// Sum of all successful charges
    pub fn total_charges(&self) -> Cents {
        lock(&self.charges).iter().map(|charge| charge.amount).sum()
    }

    /// Successful charges in the order they were made
    pub fn charges(&self) -> Vec<Charge> {
        lock(&self.charges).clone()
    }

    /// Run `hook` once, before the next charge is processed
    ///
    /// The hook is cleared before it runs, so charges made from inside the
    /// hook and every later charge are processed normally.
    pub fn before_first_charge<F>(&self, hook: F)
    where
        F: FnOnce(&FakePaymentGateway) + Send + 'static,
    {
        *lock(&self.before_first_charge) = Some(Box::new(hook));
    }

    /// Charges made while `f` ran, newest first
    pub fn new_charges_during<F>(&self, f: F) -> Vec<Charge>
    where
        F: FnOnce(&FakePaymentGateway),
    {
        let charges_from = lock(&self.charges).len();

        f(self);

        lock(&self.charges)
            .iter()
            .skip(charges_from)
            .rev()
            .cloned()
            .collect()
    }
}

impl PaymentGateway for FakePaymentGateway {
    fn charge(&self, amount: Cents, token: &str) -> Result<Charge, TicketingError> {
        // Take the hook first so the lock is not held while it runs
        let hook = lock(&self.before_first_charge).take();
        if let Some(hook) = hook {
            hook(self);
        }

        let card_number = lock(&self.tokens)
            .get(token)
            .cloned()
            .ok_or_else(|| TicketingError::payment_failed("Invalid payment token"))?;

        let charge = Charge {
            amount,
            card_last_four: last_four(&card_number),
        };
        lock(&self.charges).push(charge.clone());

        Ok(charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_charges_with_a_valid_payment_token_are_successful() {
        let gateway = FakePaymentGateway::new();

        let new_charges = gateway.new_charges_during(|gateway| {
            gateway
                .charge(2500, &gateway.get_valid_test_token(None))
                .unwrap();
        });

        assert_eq!(new_charges.len(), 1);
        assert_eq!(new_charges[0].amount, 2500);
        assert_eq!(gateway.total_charges(), 2500);
    }

    #[test]
    fn test_can_get_details_about_a_successful_charge() {
        let gateway = FakePaymentGateway::new();
        let token = gateway.get_valid_test_token(Some("0000000000004242"));

        let charge = gateway.charge(2500, &token).unwrap();

        assert_eq!(charge.card_last_four, "4242");
        assert_eq!(charge.amount, 2500);
    }

    #[test]
    fn test_charges_with_an_invalid_payment_token_fail() {
        let gateway = FakePaymentGateway::new();

        let new_charges = gateway.new_charges_during(|gateway| {
            let result = gateway.charge(2500, "invalid-payment-token");
            assert!(matches!(result, Err(TicketingError::PaymentFailed { .. })));
        });

        assert!(new_charges.is_empty());
        assert_eq!(gateway.total_charges(), 0);
    }

    #[test]
    fn test_new_charges_during_returns_newest_first() {
        let gateway = FakePaymentGateway::new();
        gateway
            .charge(2000, &gateway.get_valid_test_token(None))
            .unwrap();
        gateway
            .charge(3000, &gateway.get_valid_test_token(None))
            .unwrap();

        let new_charges = gateway.new_charges_during(|gateway| {
            gateway
                .charge(4000, &gateway.get_valid_test_token(None))
                .unwrap();
            gateway
                .charge(5000, &gateway.get_valid_test_token(None))
                .unwrap();
        });

        let amounts: Vec<Cents> = new_charges.iter().map(|charge| charge.amount).collect();
        assert_eq!(amounts, vec![5000, 4000]);
    }

    #[test]
    fn test_running_a_hook_before_the_first_charge() {
        let gateway = FakePaymentGateway::new();
        let times_hook_ran = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&times_hook_ran);
        gateway.before_first_charge(move |gateway| {
            counter.fetch_add(1, Ordering::SeqCst);
            gateway
                .charge(2500, &gateway.get_valid_test_token(None))
                .unwrap();
            assert_eq!(gateway.total_charges(), 2500);
        });

        gateway
            .charge(2500, &gateway.get_valid_test_token(None))
            .unwrap();
        assert_eq!(gateway.total_charges(), 5000);
        assert_eq!(times_hook_ran.load(Ordering::SeqCst), 1);

        // Cleared after firing
        gateway
            .charge(1000, &gateway.get_valid_test_token(None))
            .unwrap();
        assert_eq!(times_hook_ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_test_card_tokens_are_registered() {
        let gateway = FakePaymentGateway::with_test_cards();

        let charge = gateway.charge(100, "tok_amex").unwrap();

        assert_eq!(charge.card_last_four, "0005");
    }
}
