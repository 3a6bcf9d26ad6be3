//! Outbound-message data
//!
//! Plain records handed to the mail boundary. Composing and delivering the
//! emails happens elsewhere.

use super::concert::ConcertId;
use super::order::Order;
use crate::core::code_generator::CodeGenerator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A promoter's message to everyone holding tickets for a concert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeMessage {
    pub id: u64,
    pub concert_id: ConcertId,
    pub subject: String,
    pub message: String,
}

impl AttendeeMessage {
    /// Distinct emails of the orders placed for this message's concert
    ///
    /// One mail job is queued per returned address. Orders of other concerts
    /// are ignored.
    pub fn recipients<'a>(&self, orders: impl IntoIterator<Item = &'a Order>) -> Vec<String> {
        orders
            .into_iter()
            .filter(|order| order.concert_id == self.concert_id)
            .map(|order| order.email.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// An invitation for a promoter to create an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub email: String,
    /// Drawn from the invitation-code namespace
    pub code: String,
    /// Account that accepted the invitation
    pub user_id: Option<u32>,
}

impl Invitation {
    /// Create an unclaimed invitation with a code from `codes`
    pub fn new(email: impl Into<String>, codes: &dyn CodeGenerator) -> Self {
        Invitation {
            email: email.into(),
            code: codes.generate(),
            user_id: None,
        }
    }

    pub fn has_been_used(&self) -> bool {
        self.user_id.is_some()
    }
}
