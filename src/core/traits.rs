//! Core traits for ticket storage and order storage
//!
//! These abstractions let the inventory service run on a single-threaded
//! store for sequential replays and on sharded concurrent stores when
//! purchases race each other. All methods take `&self`: implementations
//! provide their own interior mutability, so a purchase in progress can be
//! interleaved with other calls on the same store.

use crate::types::{ConcertId, Order, OrderId, TicketId, TicketUnit, TicketingError};

/// Per-state unit counts of one concert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryCounts {
    pub available: usize,
    pub reserved: usize,
    pub sold: usize,
}

impl InventoryCounts {
    /// Tally the states of `units`
    pub fn tally<'a>(units: impl IntoIterator<Item = &'a TicketUnit>) -> Self {
        units
            .into_iter()
            .fold(InventoryCounts::default(), |mut counts, unit| {
                if unit.is_sold() {
                    counts.sold += 1;
                } else if unit.is_reserved() {
                    counts.reserved += 1;
                } else {
                    counts.available += 1;
                }
                counts
            })
    }

    /// Every unit ever created for the concert
    pub fn total(&self) -> usize {
        self.available + self.reserved + self.sold
    }
}

/// Storage of ticket units, one row per physical ticket
///
/// The count of available units is the only source of truth for remaining
/// inventory; no counter is stored anywhere.
pub trait TicketPool {
    /// Insert `quantity` available units for a concert
    fn add_units(&self, concert_id: ConcertId, quantity: u32) -> Vec<TicketId>;

    /// Number of available units
    fn remaining(&self, concert_id: ConcertId) -> usize;

    /// Units per state
    fn counts(&self, concert_id: ConcertId) -> InventoryCounts;

    /// Atomically select and reserve `quantity` available units
    ///
    /// Counting and marking happen in one critical section, so two concurrent
    /// calls can never both reserve the same unit.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` when `quantity` is zero
    /// - `NotEnoughTickets` when fewer than `quantity` units are available;
    ///   nothing is modified in that case
    fn reserve(
        &self,
        concert_id: ConcertId,
        quantity: u32,
    ) -> Result<Vec<TicketUnit>, TicketingError>;

    /// Return the reserved units among `ticket_ids` to available
    ///
    /// Sold and available units are left alone. Returns the number released.
    fn release(&self, concert_id: ConcertId, ticket_ids: &[TicketId]) -> usize;

    /// Mark every listed unit sold to `order_id` with its ticket code
    ///
    /// # Errors
    ///
    /// Returns `TicketsNotReserved` if any listed unit is not currently
    /// reserved; no unit changes in that case.
    fn claim(
        &self,
        concert_id: ConcertId,
        claims: &[(TicketId, String)],
        order_id: OrderId,
    ) -> Result<Vec<TicketUnit>, TicketingError>;

    /// Units sold to an order
    fn tickets_for_order(&self, concert_id: ConcertId, order_id: OrderId) -> Vec<TicketUnit>;
}

/// Storage of completed orders keyed by confirmation number
pub trait OrderStore {
    /// Persist a new order
    ///
    /// # Errors
    ///
    /// Returns `DuplicateConfirmationNumber` if the number is already taken.
    fn insert(&self, order: Order) -> Result<(), TicketingError>;

    /// Remove an order, returning it if it existed
    fn remove(&self, confirmation_number: &str) -> Option<Order>;

    fn find_by_confirmation_number(&self, confirmation_number: &str) -> Option<Order>;

    /// Orders of a concert in the order they were placed
    fn for_concert(&self, concert_id: ConcertId) -> Vec<Order>;
}
