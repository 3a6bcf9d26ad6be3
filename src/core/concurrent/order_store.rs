//! Thread-safe order store
//!
//! Orders live in a `DashMap` keyed by confirmation number. Inserting through
//! the entry API makes the uniqueness check and the write a single step, so
//! two purchases drawing the same confirmation number cannot both succeed.

use crate::core::traits::OrderStore;
use crate::types::{ConcertId, Order, TicketingError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Order store safe to share across threads
#[derive(Debug, Default)]
pub struct ConcurrentOrderStore {
    /// confirmation number -> (insertion sequence, order)
    orders: DashMap<String, (u64, Order)>,
    next_sequence: AtomicU64,
}

impl ConcurrentOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Every stored order in insertion order
    pub fn all(&self) -> Vec<Order> {
        let mut orders: Vec<(u64, Order)> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|(sequence, _)| *sequence);
        orders.into_iter().map(|(_, order)| order).collect()
    }
}

impl OrderStore for ConcurrentOrderStore {
    fn insert(&self, order: Order) -> Result<(), TicketingError> {
        match self.orders.entry(order.confirmation_number.clone()) {
            Entry::Occupied(entry) => Err(TicketingError::DuplicateConfirmationNumber {
                confirmation_number: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
                entry.insert((sequence, order));
                Ok(())
            }
        }
    }

    fn remove(&self, confirmation_number: &str) -> Option<Order> {
        self.orders
            .remove(confirmation_number)
            .map(|(_, (_, order))| order)
    }

    fn find_by_confirmation_number(&self, confirmation_number: &str) -> Option<Order> {
        self.orders
            .get(confirmation_number)
            .map(|entry| entry.value().1.clone())
    }

    fn for_concert(&self, concert_id: ConcertId) -> Vec<Order> {
        let mut orders: Vec<(u64, Order)> = self
            .orders
            .iter()
            .filter(|entry| entry.value().1.concert_id == concert_id)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|(sequence, _)| *sequence);
        orders.into_iter().map(|(_, order)| order).collect()
    }
}
