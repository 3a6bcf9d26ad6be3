//! Concert inventory service
//!
//! `ConcertInventoryService` is the entry point for everything that touches a
//! concert's tickets: publishing, reserving, purchasing and the statistics
//! and order queries built on top of the ticket pool and the order store.
//!
//! # Purchase workflow
//!
//! ```text
//! reserve_and_purchase
//!     ├── published?            no  -> ConcertNotFound
//!     ├── TicketPool::reserve   err -> NotEnoughTickets (no charge)
//!     └── Reservation::complete err -> cancel reservation, propagate
//! ```
//!
//! Compensation happens here and nowhere else: whatever goes wrong after the
//! tickets are held, the reservation is cancelled before the error leaves the
//! service.

use super::catalog::ConcertCatalog;
use super::code_generator::OrderCodes;
use super::reservation::Reservation;
use super::traits::{InventoryCounts, OrderStore, TicketPool};
use crate::billing::PaymentGateway;
use crate::types::{
    format_cents, AttendeeMessage, Cents, Concert, ConcertId, Order, PurchaseRequest, TicketId,
    TicketUnit, TicketingError,
};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Inventory operations over a ticket pool and an order store
pub struct ConcertInventoryService<P, O> {
    pool: Arc<P>,
    orders: Arc<O>,
    codes: OrderCodes,
}

impl<P, O> Clone for ConcertInventoryService<P, O> {
    fn clone(&self) -> Self {
        ConcertInventoryService {
            pool: Arc::clone(&self.pool),
            orders: Arc::clone(&self.orders),
            codes: self.codes.clone(),
        }
    }
}

impl<P, O> std::fmt::Debug for ConcertInventoryService<P, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcertInventoryService").finish_non_exhaustive()
    }
}

impl<P: TicketPool, O: OrderStore> ConcertInventoryService<P, O> {
    /// Create a service over shared stores
    ///
    /// # Arguments
    ///
    /// * `pool` - Ticket unit storage
    /// * `orders` - Order storage
    /// * `codes` - Generators for ticket codes and confirmation numbers
    pub fn new(pool: Arc<P>, orders: Arc<O>, codes: OrderCodes) -> Self {
        ConcertInventoryService {
            pool,
            orders,
            codes,
        }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    /// Publish a draft concert and create its ticket units
    ///
    /// # Errors
    ///
    /// Returns `ConcertAlreadyPublished` if the concert is already published;
    /// no units are added in that case.
    pub fn publish(&self, concert: &mut Concert) -> Result<(), TicketingError> {
        if concert.is_published() {
            return Err(TicketingError::ConcertAlreadyPublished {
                concert_id: concert.id,
            });
        }

        concert.published_at = Some(Utc::now());
        self.add_tickets(concert.id, concert.ticket_quantity);

        info!(
            concert_id = concert.id,
            tickets = concert.ticket_quantity,
            "Concert published"
        );
        Ok(())
    }

    pub fn add_tickets(&self, concert_id: ConcertId, quantity: u32) -> Vec<TicketId> {
        self.pool.add_units(concert_id, quantity)
    }

    /// Hold `quantity` tickets for `email`
    ///
    /// The reservation snapshots the concert's current ticket price. Publication
    /// is not checked here; [`Self::reserve_and_purchase`] does that.
    ///
    /// # Errors
    ///
    /// `NotEnoughTickets` or `InvalidQuantity` from the pool, with nothing reserved.
    pub fn reserve_tickets(
        &self,
        concert: &Concert,
        quantity: u32,
        email: &str,
    ) -> Result<Reservation<'_, P, O>, TicketingError> {
        let tickets = self.pool.reserve(concert.id, quantity)?;
        debug!(concert_id = concert.id, quantity, "Tickets reserved");

        Ok(Reservation::new(
            &*self.pool,
            &*self.orders,
            &self.codes,
            concert.id,
            tickets,
            email,
            concert.ticket_price,
        ))
    }

    /// Reserve, charge and finalize a purchase in one step
    ///
    /// # Arguments
    ///
    /// * `concert` - Concert being purchased
    /// * `quantity` - Number of tickets
    /// * `email` - Buyer's email
    /// * `payment_token` - Card token understood by `gateway`
    /// * `gateway` - Gateway to charge
    ///
    /// # Returns
    ///
    /// The persisted order.
    ///
    /// # Errors
    ///
    /// - `ConcertNotFound` if the concert is unpublished; nothing is touched
    /// - `NotEnoughTickets`/`InvalidQuantity` before any charge is attempted
    /// - `PaymentFailed` after the reservation has been cancelled
    /// - any other completion error, also after the reservation has been cancelled
    pub fn reserve_and_purchase(
        &self,
        concert: &Concert,
        quantity: u32,
        email: &str,
        payment_token: &str,
        gateway: &dyn PaymentGateway,
    ) -> Result<Order, TicketingError> {
        if !concert.is_published() {
            return Err(TicketingError::concert_not_found(concert.id));
        }

        let mut reservation = self.reserve_tickets(concert, quantity, email)?;

        match reservation.complete(gateway, payment_token) {
            Ok(order) => {
                info!(
                    concert_id = concert.id,
                    confirmation_number = %order.confirmation_number,
                    tickets = order.ticket_quantity(),
                    amount = order.amount,
                    "Order placed"
                );
                Ok(order)
            }
            Err(e) => {
                let released = reservation.cancel();
                warn!(
                    concert_id = concert.id,
                    quantity,
                    released,
                    error = %e,
                    "Purchase failed, reservation cancelled"
                );
                Err(e)
            }
        }
    }

    /// Handle a buyer's request against the catalog
    ///
    /// Unknown and unpublished concerts both fail with `ConcertNotFound`.
    pub fn purchase(
        &self,
        catalog: &ConcertCatalog,
        request: &PurchaseRequest,
        gateway: &dyn PaymentGateway,
    ) -> Result<Order, TicketingError> {
        let concert = catalog.find_published(request.concert_id)?;
        self.reserve_and_purchase(
            concert,
            request.ticket_quantity,
            &request.email,
            &request.payment_token,
            gateway,
        )
    }

    pub fn tickets_remaining(&self, concert_id: ConcertId) -> usize {
        self.pool.remaining(concert_id)
    }

    pub fn tickets_sold(&self, concert_id: ConcertId) -> usize {
        self.pool.counts(concert_id).sold
    }

    pub fn total_tickets(&self, concert_id: ConcertId) -> usize {
        self.pool.counts(concert_id).total()
    }

    pub fn inventory_counts(&self, concert_id: ConcertId) -> InventoryCounts {
        self.pool.counts(concert_id)
    }

    /// Sold share of all units as a percentage with two decimals
    ///
    /// Zero for a concert without units.
    pub fn percent_sold_out(&self, concert_id: ConcertId) -> Decimal {
        let counts = self.pool.counts(concert_id);
        if counts.total() == 0 {
            return Decimal::ZERO;
        }

        (Decimal::from(counts.sold) * Decimal::ONE_HUNDRED / Decimal::from(counts.total()))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Sum of the concert's order amounts
    pub fn revenue_in_cents(&self, concert_id: ConcertId) -> Cents {
        self.orders
            .for_concert(concert_id)
            .iter()
            .fold(0, |total: Cents, order| total.saturating_add(order.amount))
    }

    pub fn revenue_in_dollars(&self, concert_id: ConcertId) -> String {
        format_cents(self.revenue_in_cents(concert_id))
    }

    pub fn has_order_for(&self, concert_id: ConcertId, email: &str) -> bool {
        self.orders
            .for_concert(concert_id)
            .iter()
            .any(|order| order.email == email)
    }

    pub fn orders_for(&self, concert_id: ConcertId, email: &str) -> Vec<Order> {
        self.orders
            .for_concert(concert_id)
            .into_iter()
            .filter(|order| order.email == email)
            .collect()
    }

    /// Latest `limit` orders of a concert, newest first
    pub fn recent_orders(&self, concert_id: ConcertId, limit: usize) -> Vec<Order> {
        self.orders
            .for_concert(concert_id)
            .into_iter()
            .rev()
            .take(limit)
            .collect()
    }

    /// # Errors
    ///
    /// Returns `OrderNotFound` for an unknown confirmation number.
    pub fn find_order(&self, confirmation_number: &str) -> Result<Order, TicketingError> {
        self.orders
            .find_by_confirmation_number(confirmation_number)
            .ok_or_else(|| TicketingError::order_not_found(confirmation_number))
    }

    /// Sold units backing an order
    pub fn order_tickets(&self, order: &Order) -> Vec<TicketUnit> {
        self.pool.tickets_for_order(order.concert_id, order.id)
    }

    /// Addresses that should receive an attendee message
    pub fn attendee_recipients(&self, message: &AttendeeMessage) -> Vec<String> {
        message.recipients(&self.orders.for_concert(message.concert_id))
    }
}
