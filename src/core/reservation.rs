//! Reservations
//!
//! A `Reservation` is the in-flight hold on a set of ticket units while the
//! buyer is being charged. It is never persisted: it either completes into an
//! order or is cancelled, returning its units to the pool.
//!
//! # Lifecycle
//!
//! ```text
//! Held --complete--> Completed
//! Held --cancel----> Cancelled
//! ```
//!
//! A reservation dropped while still held is cancelled.

use super::code_generator::OrderCodes;
use super::traits::{OrderStore, TicketPool};
use crate::billing::{Charge, PaymentGateway};
use crate::types::{Cents, ConcertId, Order, OrderTicket, TicketId, TicketUnit, TicketingError};
use std::fmt;
use tracing::{debug, error};
use uuid::Uuid;

/// Attempts at drawing an unused confirmation number
pub const MAX_CONFIRMATION_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationState {
    Held,
    Completed,
    Cancelled,
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReservationState::Held => "held",
            ReservationState::Completed => "completed",
            ReservationState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Tickets held for one buyer
pub struct Reservation<'a, P: TicketPool, O: OrderStore> {
    pool: &'a P,
    orders: &'a O,
    codes: &'a OrderCodes,
    concert_id: ConcertId,
    tickets: Vec<TicketUnit>,
    email: String,
    /// Ticket price when the units were reserved
    unit_price: Cents,
    state: ReservationState,
}

impl<'a, P: TicketPool, O: OrderStore> Reservation<'a, P, O> {
    /// Wrap units already reserved in `pool`
    pub(crate) fn new(
        pool: &'a P,
        orders: &'a O,
        codes: &'a OrderCodes,
        concert_id: ConcertId,
        tickets: Vec<TicketUnit>,
        email: &str,
        unit_price: Cents,
    ) -> Self {
        Reservation {
            pool,
            orders,
            codes,
            concert_id,
            tickets,
            email: email.to_string(),
            unit_price,
            state: ReservationState::Held,
        }
    }

    pub fn concert_id(&self) -> ConcertId {
        self.concert_id
    }

    pub fn tickets(&self) -> &[TicketUnit] {
        &self.tickets
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn state(&self) -> ReservationState {
        self.state
    }

    /// Unit price times the number of held tickets
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the product does not fit in `Cents`.
    pub fn total_cost(&self) -> Result<Cents, TicketingError> {
        let quantity = self.tickets.len();
        Cents::try_from(quantity)
            .ok()
            .and_then(|count| self.unit_price.checked_mul(count))
            .ok_or_else(|| {
                TicketingError::arithmetic_overflow("total cost", self.unit_price, quantity)
            })
    }

    /// Charge the buyer and turn the held tickets into an order
    ///
    /// An unused confirmation number is secured before the charge. The order
    /// is persisted before its tickets are claimed; if the claim fails the
    /// order is removed again. On a failed charge the reservation stays held
    /// and the caller decides whether to cancel.
    ///
    /// # Errors
    ///
    /// - `ReservationClosed` if the reservation was already completed or cancelled
    /// - `PaymentFailed` from the gateway
    /// - `ArithmeticOverflow` from [`Reservation::total_cost`]
    /// - `DuplicateConfirmationNumber` if no unused confirmation number could be
    ///   drawn; nothing is charged in that case
    /// - `TicketsNotReserved` if a held unit was released behind our back
    pub fn complete(
        &mut self,
        gateway: &dyn PaymentGateway,
        payment_token: &str,
    ) -> Result<Order, TicketingError> {
        if self.state != ReservationState::Held {
            return Err(TicketingError::ReservationClosed {
                concert_id: self.concert_id,
                state: self.state.to_string(),
            });
        }

        let amount = self.total_cost()?;
        // Nobody is charged unless an unused confirmation number exists
        let confirmation_number = self.unused_confirmation_number()?;
        let charge = gateway.charge(amount, payment_token)?;

        let order = match self.persist_order(confirmation_number, &charge) {
            Ok(order) => order,
            Err(e) => {
                error!(
                    concert_id = self.concert_id,
                    amount = charge.amount,
                    error = %e,
                    "Charged purchase could not be recorded"
                );
                return Err(e);
            }
        };
        if let Err(e) = self.claim_tickets(&order) {
            self.orders.remove(&order.confirmation_number);
            error!(
                concert_id = self.concert_id,
                amount = charge.amount,
                error = %e,
                "Charged purchase could not claim its tickets"
            );
            return Err(e);
        }

        self.state = ReservationState::Completed;
        Ok(order)
    }

    /// Release every held ticket
    ///
    /// Only a held reservation releases anything; a completed reservation
    /// keeps its tickets sold. Returns the number of units released.
    pub fn cancel(&mut self) -> usize {
        if self.state != ReservationState::Held {
            return 0;
        }

        let ids: Vec<TicketId> = self.tickets.iter().map(|ticket| ticket.id).collect();
        let released = self.pool.release(self.concert_id, &ids);
        self.state = ReservationState::Cancelled;

        debug!(
            concert_id = self.concert_id,
            released, "Reservation cancelled"
        );
        released
    }

    /// Draw a confirmation number no stored order holds yet
    fn unused_confirmation_number(&self) -> Result<String, TicketingError> {
        let mut candidate = self.codes.confirmation_numbers.generate();
        let mut attempt = 1;
        while self.orders.find_by_confirmation_number(&candidate).is_some() {
            if attempt == MAX_CONFIRMATION_ATTEMPTS {
                return Err(TicketingError::DuplicateConfirmationNumber {
                    confirmation_number: candidate,
                });
            }
            debug!(confirmation_number = %candidate, attempt, "Confirmation number taken, drawing another");
            candidate = self.codes.confirmation_numbers.generate();
            attempt += 1;
        }

        Ok(candidate)
    }

    /// Insert the order under `confirmation_number`
    ///
    /// Another purchase may take the number between the check and the insert;
    /// fresh numbers are drawn in that case.
    fn persist_order(
        &self,
        confirmation_number: String,
        charge: &Charge,
    ) -> Result<Order, TicketingError> {
        let order_id = Uuid::new_v4();
        let tickets: Vec<OrderTicket> = self
            .tickets
            .iter()
            .map(|ticket| OrderTicket {
                id: ticket.id,
                code: self.codes.ticket_codes.generate(),
            })
            .collect();

        let mut confirmation_number = confirmation_number;
        let mut attempt = 1;
        loop {
            let order = Order::for_tickets(
                order_id,
                self.concert_id,
                confirmation_number,
                tickets.clone(),
                &self.email,
                charge,
            );

            match self.orders.insert(order.clone()) {
                Ok(()) => return Ok(order),
                Err(TicketingError::DuplicateConfirmationNumber {
                    confirmation_number: taken,
                }) if attempt < MAX_CONFIRMATION_ATTEMPTS => {
                    debug!(confirmation_number = %taken, attempt, "Confirmation number taken, retrying");
                    confirmation_number = self.codes.confirmation_numbers.generate();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn claim_tickets(&self, order: &Order) -> Result<Vec<TicketUnit>, TicketingError> {
        let claims: Vec<(TicketId, String)> = order
            .tickets
            .iter()
            .map(|ticket| (ticket.id, ticket.code.clone()))
            .collect();
        self.pool.claim(self.concert_id, &claims, order.id)
    }
}

impl<P: TicketPool, O: OrderStore> Drop for Reservation<'_, P, O> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<P: TicketPool, O: OrderStore> fmt::Debug for Reservation<'_, P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation")
            .field("concert_id", &self.concert_id)
            .field("tickets", &self.tickets.len())
            .field("email", &self.email)
            .field("unit_price", &self.unit_price)
            .field("state", &self.state)
            .finish()
    }
}
