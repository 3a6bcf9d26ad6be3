//! Thread-safe ticket pool
//!
//! This module provides `ShardedTicketPool`, which stores the ticket units of
//! each concert under its own `DashMap` entry.
//!
//! # Design
//!
//! Every read-then-write on a concert's units (count the available ones, then
//! mark them) runs while holding that concert's write guard from `get_mut`.
//! That guard plays the role of a row lock over the concert's units:
//! concurrent reservations against one concert serialize, so two purchases
//! can never both see the same unit as available. Reservations on different
//! concerts proceed in parallel unless they hash to the same shard.
//!
//! # Thread Safety
//!
//! No guard is ever held across a call outside this module. In particular a
//! purchase never holds a guard while its payment is being charged.

use crate::core::ticket_pool::{claim_units, release_units, reserve_units};
use crate::core::traits::{InventoryCounts, TicketPool};
use crate::types::{ConcertId, OrderId, TicketId, TicketUnit, TicketingError};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket pool safe to share across threads
#[derive(Debug, Default)]
pub struct ShardedTicketPool {
    /// Units grouped by concert
    units: DashMap<ConcertId, Vec<TicketUnit>>,
    /// Highest ticket id handed out
    last_id: AtomicU64,
}

impl ShardedTicketPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketPool for ShardedTicketPool {
    fn add_units(&self, concert_id: ConcertId, quantity: u32) -> Vec<TicketId> {
        let quantity = TicketId::from(quantity);
        let first = self.last_id.fetch_add(quantity, Ordering::SeqCst) + 1;
        let ids: Vec<TicketId> = (first..first + quantity).collect();

        self.units
            .entry(concert_id)
            .or_default()
            .extend(ids.iter().map(|id| TicketUnit::new(*id, concert_id)));
        ids
    }

    fn remaining(&self, concert_id: ConcertId) -> usize {
        self.counts(concert_id).available
    }

    fn counts(&self, concert_id: ConcertId) -> InventoryCounts {
        self.units
            .get(&concert_id)
            .map(|units| InventoryCounts::tally(units.value()))
            .unwrap_or_default()
    }

    fn reserve(
        &self,
        concert_id: ConcertId,
        quantity: u32,
    ) -> Result<Vec<TicketUnit>, TicketingError> {
        match self.units.get_mut(&concert_id) {
            Some(mut units) => reserve_units(units.value_mut(), concert_id, quantity, Utc::now()),
            None => reserve_units(&mut [], concert_id, quantity, Utc::now()),
        }
    }

    fn release(&self, concert_id: ConcertId, ticket_ids: &[TicketId]) -> usize {
        self.units
            .get_mut(&concert_id)
            .map(|mut units| release_units(units.value_mut(), ticket_ids))
            .unwrap_or(0)
    }

    fn claim(
        &self,
        concert_id: ConcertId,
        claims: &[(TicketId, String)],
        order_id: OrderId,
    ) -> Result<Vec<TicketUnit>, TicketingError> {
        match self.units.get_mut(&concert_id) {
            Some(mut units) => claim_units(units.value_mut(), concert_id, claims, order_id),
            None => claim_units(&mut [], concert_id, claims, order_id),
        }
    }

    fn tickets_for_order(&self, concert_id: ConcertId, order_id: OrderId) -> Vec<TicketUnit> {
        self.units
            .get(&concert_id)
            .map(|units| {
                units
                    .iter()
                    .filter(|unit| unit.order_id == Some(order_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
