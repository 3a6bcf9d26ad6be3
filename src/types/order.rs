//! Order types
//!
//! An order is the durable record of a completed, paid purchase. Orders are
//! only ever built through [`Order::for_tickets`] so that the amount, the
//! charge and the ticket set always agree.

use super::concert::{format_cents, Cents, ConcertId};
use super::ticket::TicketId;
use crate::billing::Charge;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Order identifier
pub type OrderId = Uuid;

/// A ticket as seen from its order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTicket {
    #[serde(skip)]
    pub id: TicketId,
    pub code: String,
}

/// A completed sale
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub concert_id: ConcertId,
    /// Globally unique, opaque and not sortable
    pub confirmation_number: String,
    pub email: String,
    pub amount: Cents,
    pub card_last_four: String,
    pub tickets: Vec<OrderTicket>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order for claimed tickets
    ///
    /// The amount is taken from the charge, never supplied separately.
    pub fn for_tickets(
        id: OrderId,
        concert_id: ConcertId,
        confirmation_number: String,
        tickets: Vec<OrderTicket>,
        email: &str,
        charge: &Charge,
    ) -> Self {
        Order {
            id,
            concert_id,
            confirmation_number,
            email: email.to_string(),
            amount: charge.amount,
            card_last_four: charge.card_last_four.clone(),
            tickets,
            created_at: Utc::now(),
        }
    }

    pub fn ticket_quantity(&self) -> usize {
        self.tickets.len()
    }

    /// `"85.00"` for an amount of 8500 cents
    pub fn formatted_amount(&self) -> String {
        format_cents(self.amount)
    }

    /// `"**** **** **** 1881"`
    pub fn masked_card(&self) -> String {
        format!("**** **** **** {}", self.card_last_four)
    }

    pub fn ticket_codes(&self) -> Vec<&str> {
        self.tickets.iter().map(|ticket| ticket.code.as_str()).collect()
    }
}

// The public JSON shape returned to purchasers: internal ids and card data stay out.
impl Serialize for Order {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Order", 5)?;
        state.serialize_field("confirmation_number", &self.confirmation_number)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("ticket_quantity", &self.ticket_quantity())?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field("tickets", &self.tickets)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_with_codes(codes: &[&str], amount: Cents) -> Order {
        let tickets = codes
            .iter()
            .enumerate()
            .map(|(i, code)| OrderTicket {
                id: i as TicketId + 1,
                code: code.to_string(),
            })
            .collect();
        Order::for_tickets(
            Uuid::new_v4(),
            1,
            "ORDERCONFIRMATION1234".to_string(),
            tickets,
            "jane@example.com",
            &Charge {
                amount,
                card_last_four: "1881".to_string(),
            },
        )
    }

    #[test]
    fn test_creating_an_order_from_tickets_email_and_charge() {
        let order = order_with_codes(&["TICKETCODE1", "TICKETCODE2", "TICKETCODE3"], 3600);

        assert_eq!(order.email, "jane@example.com");
        assert_eq!(order.ticket_quantity(), 3);
        assert_eq!(order.amount, 3600);
        assert_eq!(order.card_last_four, "1881");
    }

    #[test]
    fn test_converting_to_json() {
        let order = order_with_codes(&["TICKETCODE1", "TICKETCODE2"], 6000);

        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(
            value,
            json!({
                "confirmation_number": "ORDERCONFIRMATION1234",
                "email": "jane@example.com",
                "ticket_quantity": 2,
                "amount": 6000,
                "tickets": [{"code": "TICKETCODE1"}, {"code": "TICKETCODE2"}],
            })
        );
    }

    #[test]
    fn test_presentational_helpers() {
        let order = order_with_codes(&["TICKETCODE123", "TICKETCODE456"], 8500);

        assert_eq!(order.formatted_amount(), "85.00");
        assert_eq!(order.masked_card(), "**** **** **** 1881");
        assert_eq!(order.ticket_codes(), vec!["TICKETCODE123", "TICKETCODE456"]);
    }
}
