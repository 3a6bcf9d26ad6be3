//! Ticket unit types
//!
//! Inventory is modelled as one row per physical ticket rather than a counter,
//! so every unit carries its own reservation timestamp, order link and code.

use super::concert::ConcertId;
use super::error::TicketingError;
use super::order::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket unit identifier, unique within a pool
pub type TicketId = u64;

/// The three mutually exclusive states of a ticket unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    /// Not reserved and not sold
    Available,
    /// Held by an in-flight reservation
    Reserved,
    /// Claimed by an order (terminal)
    Sold,
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketState::Available => "available",
            TicketState::Reserved => "reserved",
            TicketState::Sold => "sold",
        };
        f.write_str(name)
    }
}

/// A single ticket belonging to exactly one concert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketUnit {
    pub id: TicketId,
    pub concert_id: ConcertId,
    /// Set once the ticket is sold
    pub order_id: Option<OrderId>,
    /// Set while an in-flight reservation holds the ticket
    pub reserved_at: Option<DateTime<Utc>>,
    /// Assigned when claimed by an order
    pub code: Option<String>,
}

impl TicketUnit {
    /// Create a new available ticket
    pub fn new(id: TicketId, concert_id: ConcertId) -> Self {
        TicketUnit {
            id,
            concert_id,
            order_id: None,
            reserved_at: None,
            code: None,
        }
    }

    /// Derive the state from the nullable columns
    pub fn state(&self) -> TicketState {
        match (self.order_id, self.reserved_at) {
            (Some(_), _) => TicketState::Sold,
            (None, Some(_)) => TicketState::Reserved,
            (None, None) => TicketState::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.state() == TicketState::Available
    }

    pub fn is_reserved(&self) -> bool {
        self.state() == TicketState::Reserved
    }

    pub fn is_sold(&self) -> bool {
        self.state() == TicketState::Sold
    }

    /// AVAILABLE -> RESERVED
    ///
    /// # Errors
    ///
    /// Returns `InvalidTicketTransition` unless the ticket is available.
    pub fn reserve(&mut self, now: DateTime<Utc>) -> Result<(), TicketingError> {
        if !self.is_available() {
            return Err(TicketingError::invalid_transition(
                self.id,
                self.state(),
                "reserve",
            ));
        }
        self.reserved_at = Some(now);
        Ok(())
    }

    /// RESERVED -> AVAILABLE
    ///
    /// # Errors
    ///
    /// Returns `InvalidTicketTransition` unless the ticket is reserved. Sold
    /// tickets are never released.
    pub fn release(&mut self) -> Result<(), TicketingError> {
        if !self.is_reserved() {
            return Err(TicketingError::invalid_transition(
                self.id,
                self.state(),
                "release",
            ));
        }
        self.reserved_at = None;
        Ok(())
    }

    /// RESERVED -> SOLD
    ///
    /// # Errors
    ///
    /// Returns `InvalidTicketTransition` unless the ticket is reserved.
    pub fn claim_for(&mut self, order_id: OrderId, code: String) -> Result<(), TicketingError> {
        if !self.is_reserved() {
            return Err(TicketingError::invalid_transition(
                self.id,
                self.state(),
                "claim",
            ));
        }
        self.order_id = Some(order_id);
        self.reserved_at = None;
        self.code = Some(code);
        Ok(())
    }
}
