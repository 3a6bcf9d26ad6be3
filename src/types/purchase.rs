//! Purchase request types

use super::concert::ConcertId;
use super::error::TicketingError;
use super::order::Order;
use serde::{Deserialize, Serialize};

/// A buyer's request for tickets to one concert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub concert_id: ConcertId,
    pub email: String,
    pub ticket_quantity: u32,
    /// Card token understood by the payment gateway
    pub payment_token: String,
}

/// Result of handling one purchase request
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    /// The request that was handled
    pub request: PurchaseRequest,

    /// The placed order, or why the purchase failed
    pub result: Result<Order, TicketingError>,
}
