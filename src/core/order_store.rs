//! Single-threaded order store
//!
//! Orders are keyed by confirmation number. Each order is tagged with an
//! insertion sequence so per-concert listings come back in the order the
//! purchases completed, independent of clock resolution.

use super::traits::OrderStore;
use crate::types::{ConcertId, Order, TicketingError};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Orders {
    by_confirmation: HashMap<String, (u64, Order)>,
    next_sequence: u64,
}

/// Order store for single-threaded use
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RefCell<Orders>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.borrow().by_confirmation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<(), TicketingError> {
        let mut guard = self.orders.borrow_mut();
        let orders = &mut *guard;
        let sequence = orders.next_sequence;

        match orders.by_confirmation.entry(order.confirmation_number.clone()) {
            Entry::Occupied(entry) => Err(TicketingError::DuplicateConfirmationNumber {
                confirmation_number: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert((sequence, order));
                orders.next_sequence += 1;
                Ok(())
            }
        }
    }

    fn remove(&self, confirmation_number: &str) -> Option<Order> {
        self.orders
            .borrow_mut()
            .by_confirmation
            .remove(confirmation_number)
            .map(|(_, order)| order)
    }

    fn find_by_confirmation_number(&self, confirmation_number: &str) -> Option<Order> {
        self.orders
            .borrow()
            .by_confirmation
            .get(confirmation_number)
            .map(|(_, order)| order.clone())
    }

    fn for_concert(&self, concert_id: ConcertId) -> Vec<Order> {
        let orders = self.orders.borrow();
        let mut matching: Vec<&(u64, Order)> = orders
            .by_confirmation
            .values()
            .filter(|(_, order)| order.concert_id == concert_id)
            .collect();
        matching.sort_by_key(|(sequence, _)| *sequence);
        matching.into_iter().map(|(_, order)| order.clone()).collect()
    }
}
