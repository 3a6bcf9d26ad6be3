//! Single-threaded ticket pool
//!
//! This module provides `InMemoryTicketPool`, the row-per-ticket store used by
//! sequential replays, together with the unit-row operations it shares with
//! the concurrent pool.
//!
//! # Design
//!
//! Units are grouped per concert in insertion order. Every operation borrows
//! the map for the duration of the call only, so a borrow is never held while
//! the caller talks to a payment gateway.

use super::traits::{InventoryCounts, TicketPool};
use crate::types::{ConcertId, OrderId, TicketId, TicketUnit, TicketingError};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Reserve the first `quantity` available units of one concert
///
/// Nothing is modified unless all `quantity` units can be reserved.
pub(crate) fn reserve_units(
    units: &mut [TicketUnit],
    concert_id: ConcertId,
    quantity: u32,
    now: DateTime<Utc>,
) -> Result<Vec<TicketUnit>, TicketingError> {
    if quantity == 0 {
        return Err(TicketingError::InvalidQuantity {
            concert_id,
            quantity,
        });
    }

    let available = units.iter().filter(|unit| unit.is_available()).count();
    if available < quantity as usize {
        return Err(TicketingError::not_enough_tickets(
            concert_id, quantity, available,
        ));
    }

    let mut reserved = Vec::with_capacity(quantity as usize);
    for unit in units
        .iter_mut()
        .filter(|unit| unit.is_available())
        .take(quantity as usize)
    {
        unit.reserve(now)?;
        reserved.push(unit.clone());
    }

    Ok(reserved)
}

/// Release the reserved units among `ticket_ids`
pub(crate) fn release_units(units: &mut [TicketUnit], ticket_ids: &[TicketId]) -> usize {
    units
        .iter_mut()
        .filter(|unit| ticket_ids.contains(&unit.id))
        .filter_map(|unit| unit.release().ok())
        .count()
}

/// Claim every listed unit for an order, all or nothing
pub(crate) fn claim_units(
    units: &mut [TicketUnit],
    concert_id: ConcertId,
    claims: &[(TicketId, String)],
    order_id: OrderId,
) -> Result<Vec<TicketUnit>, TicketingError> {
    let not_reserved: Vec<TicketId> = claims
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !units.iter().any(|unit| unit.id == *id && unit.is_reserved()))
        .collect();
    if !not_reserved.is_empty() {
        return Err(TicketingError::TicketsNotReserved {
            concert_id,
            ticket_ids: not_reserved,
        });
    }

    let mut sold = Vec::with_capacity(claims.len());
    for (ticket_id, code) in claims {
        if let Some(unit) = units.iter_mut().find(|unit| unit.id == *ticket_id) {
            unit.claim_for(order_id, code.clone())?;
            sold.push(unit.clone());
        }
    }

    Ok(sold)
}

/// Ticket pool for single-threaded use
#[derive(Debug, Default)]
pub struct InMemoryTicketPool {
    units: RefCell<HashMap<ConcertId, Vec<TicketUnit>>>,
    next_id: Cell<TicketId>,
}

impl InMemoryTicketPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_units<R>(&self, concert_id: ConcertId, f: impl FnOnce(&mut Vec<TicketUnit>) -> R) -> R {
        let mut units = self.units.borrow_mut();
        f(units.entry(concert_id).or_default())
    }
}

impl TicketPool for InMemoryTicketPool {
    fn add_units(&self, concert_id: ConcertId, quantity: u32) -> Vec<TicketId> {
        let first = self.next_id.get() + 1;
        let ids: Vec<TicketId> = (first..first + TicketId::from(quantity)).collect();
        self.next_id.set(first + TicketId::from(quantity) - 1);

        self.with_units(concert_id, |units| {
            units.extend(ids.iter().map(|id| TicketUnit::new(*id, concert_id)));
        });
        ids
    }

    fn remaining(&self, concert_id: ConcertId) -> usize {
        self.counts(concert_id).available
    }

    fn counts(&self, concert_id: ConcertId) -> InventoryCounts {
        self.units
            .borrow()
            .get(&concert_id)
            .map(InventoryCounts::tally)
            .unwrap_or_default()
    }

    fn reserve(
        &self,
        concert_id: ConcertId,
        quantity: u32,
    ) -> Result<Vec<TicketUnit>, TicketingError> {
        self.with_units(concert_id, |units| {
            reserve_units(units, concert_id, quantity, Utc::now())
        })
    }

    fn release(&self, concert_id: ConcertId, ticket_ids: &[TicketId]) -> usize {
        self.with_units(concert_id, |units| release_units(units, ticket_ids))
    }

    fn claim(
        &self,
        concert_id: ConcertId,
        claims: &[(TicketId, String)],
        order_id: OrderId,
    ) -> Result<Vec<TicketUnit>, TicketingError> {
        self.with_units(concert_id, |units| {
            claim_units(units, concert_id, claims, order_id)
        })
    }

    fn tickets_for_order(&self, concert_id: ConcertId, order_id: OrderId) -> Vec<TicketUnit> {
        self.units
            .borrow()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TicketState;
    use uuid::Uuid;

    fn pool_with(concert_id: ConcertId, quantity: u32) -> InMemoryTicketPool {
        let pool = InMemoryTicketPool::new();
        pool.add_units(concert_id, quantity);
        pool
    }

    fn ids(units: &[TicketUnit]) -> Vec<TicketId> {
        units.iter().map(|unit| unit.id).collect()
    }

    fn claims_for(units: &[TicketUnit]) -> Vec<(TicketId, String)> {
        units
            .iter()
            .map(|unit| (unit.id, format!("CODE{}", unit.id)))
            .collect()
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = InMemoryTicketPool::new();

        assert_eq!(pool.remaining(1), 0);
        assert_eq!(pool.counts(1), InventoryCounts::default());
    }

    #[test]
    fn test_add_units_creates_available_units_with_unique_ids() {
        let pool = InMemoryTicketPool::new();

        let first = pool.add_units(1, 3);
        let second = pool.add_units(2, 2);

        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(second, vec![4, 5]);
        assert_eq!(pool.remaining(1), 3);
        assert_eq!(pool.remaining(2), 2);
    }

    #[test]
    fn test_reserve_marks_units_reserved() {
        let pool = pool_with(1, 5);

        let reserved = pool.reserve(1, 2).unwrap();

        assert_eq!(reserved.len(), 2);
        assert!(reserved
            .iter()
            .all(|unit| unit.state() == TicketState::Reserved));
        assert_eq!(
            pool.counts(1),
            InventoryCounts {
                available: 3,
                reserved: 2,
                sold: 0
            }
        );
    }

    #[test]
    fn test_reserved_units_cannot_be_reserved_again() {
        let pool = pool_with(1, 3);
        let first = pool.reserve(1, 2).unwrap();

        let second = pool.reserve(1, 1).unwrap();

        assert!(!ids(&first).contains(&second[0].id));
        assert_eq!(
            pool.reserve(1, 1),
            Err(TicketingError::not_enough_tickets(1, 1, 0))
        );
    }

    #[test]
    fn test_reserving_more_than_remain_changes_nothing() {
        let pool = pool_with(1, 50);

        let result = pool.reserve(1, 51);

        assert_eq!(result, Err(TicketingError::not_enough_tickets(1, 51, 50)));
        assert_eq!(pool.remaining(1), 50);
    }

    #[test]
    fn test_reserving_zero_is_invalid() {
        let pool = pool_with(1, 5);

        let result = pool.reserve(1, 0);

        assert!(matches!(result, Err(TicketingError::InvalidQuantity { .. })));
        assert_eq!(pool.remaining(1), 5);
    }

    #[test]
    fn test_release_only_touches_reserved_units() {
        let pool = pool_with(1, 4);
        let sold = pool.reserve(1, 1).unwrap();
        pool.claim(1, &claims_for(&sold), Uuid::new_v4()).unwrap();
        let held = pool.reserve(1, 2).unwrap();

        let mut all_ids = ids(&held);
        all_ids.extend(ids(&sold));
        let released = pool.release(1, &all_ids);

        assert_eq!(released, 2);
        assert_eq!(
            pool.counts(1),
            InventoryCounts {
                available: 3,
                reserved: 0,
                sold: 1
            }
        );
    }

    #[test]
    fn test_claim_sells_units_to_the_order() {
        let pool = pool_with(1, 3);
        let order_id = Uuid::new_v4();
        let held = pool.reserve(1, 2).unwrap();

        let sold = pool.claim(1, &claims_for(&held), order_id).unwrap();

        assert!(sold.iter().all(|unit| unit.is_sold()));
        let for_order = pool.tickets_for_order(1, order_id);
        assert_eq!(ids(&for_order), ids(&held));
        assert_eq!(
            for_order[0].code.as_deref(),
            Some(format!("CODE{}", held[0].id).as_str())
        );
        assert_eq!(pool.remaining(1), 1);
    }

    #[test]
    fn test_claim_is_all_or_nothing() {
        let pool = pool_with(1, 3);
        let held = pool.reserve(1, 2).unwrap();
        pool.release(1, &[held[1].id]);

        let result = pool.claim(1, &claims_for(&held), Uuid::new_v4());

        assert_eq!(
            result,
            Err(TicketingError::TicketsNotReserved {
                concert_id: 1,
                ticket_ids: vec![held[1].id],
            })
        );
        assert_eq!(
            pool.counts(1),
            InventoryCounts {
                available: 2,
                reserved: 1,
                sold: 0
            }
        );
    }

    #[test]
    fn test_concerts_are_isolated() {
        let pool = InMemoryTicketPool::new();
        pool.add_units(1, 2);
        pool.add_units(2, 2);

        pool.reserve(1, 2).unwrap();

        assert_eq!(pool.remaining(1), 0);
        assert_eq!(pool.remaining(2), 2);
    }
}
