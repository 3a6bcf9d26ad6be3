//! Error types for the ticket inventory engine
//!
//! This module defines every error that can occur while managing ticket inventory,
//! taking payments and replaying purchase files.
//!
//! # Error Categories
//!
//! - **Purchase Errors**: not enough tickets, payment failures, unknown or unpublished concerts
//! - **Lifecycle Errors**: invalid ticket transitions, closed reservations, double publishing
//! - **Storage Errors**: duplicate confirmation numbers, missing orders
//! - **File I/O Errors**: file not found, unreadable CSV, etc.

use super::concert::{Cents, ConcertId};
use super::ticket::{TicketId, TicketState};
use thiserror::Error;

/// Main error type for the ticket inventory engine
///
/// Purchase errors are recoverable at the request level: a boundary maps
/// `ConcertNotFound` to a not-found response and `NotEnoughTickets`,
/// `PaymentFailed` and `InvalidQuantity` to a validation-style response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TicketingError {
    /// Fewer tickets are available than were requested
    ///
    /// No ticket unit is modified when this is returned.
    #[error("Not enough tickets for concert {concert_id}: requested {requested}, available {available}")]
    NotEnoughTickets {
        /// Concert the reservation targeted
        concert_id: ConcertId,
        /// Number of tickets requested
        requested: u32,
        /// Number of tickets available at the moment of the attempt
        available: usize,
    },

    /// The payment gateway declined the charge or did not recognize the token
    #[error("Payment failed: {reason}")]
    PaymentFailed {
        /// Gateway-supplied reason
        reason: String,
    },

    /// The concert does not exist or is not published
    ///
    /// Both cases are deliberately indistinguishable.
    #[error("Concert {concert_id} not found")]
    ConcertNotFound {
        /// Requested concert id
        concert_id: ConcertId,
    },

    /// A concert can only be published once
    #[error("Concert {concert_id} is already published")]
    ConcertAlreadyPublished {
        /// Concert id
        concert_id: ConcertId,
    },

    /// Ticket quantity must be at least one
    #[error("Invalid ticket quantity {quantity} for concert {concert_id}")]
    InvalidQuantity {
        /// Concert id
        concert_id: ConcertId,
        /// Requested quantity
        quantity: u32,
    },

    /// A ticket unit was asked to move through a transition its state does not allow
    #[error("Ticket {ticket_id} cannot {operation} while {state}")]
    InvalidTicketTransition {
        /// Ticket id
        ticket_id: TicketId,
        /// Current state of the ticket
        state: TicketState,
        /// Transition that was attempted
        operation: String,
    },

    /// Some of the tickets being claimed are no longer held by the reservation
    #[error("Tickets {ticket_ids:?} of concert {concert_id} are not reserved")]
    TicketsNotReserved {
        /// Concert id
        concert_id: ConcertId,
        /// Offending ticket ids
        ticket_ids: Vec<TicketId>,
    },

    /// The reservation has already been completed or cancelled
    #[error("Reservation for concert {concert_id} is already {state}")]
    ReservationClosed {
        /// Concert id
        concert_id: ConcertId,
        /// Final state of the reservation
        state: String,
    },

    /// An order with the same confirmation number already exists
    #[error("Duplicate confirmation number {confirmation_number}")]
    DuplicateConfirmationNumber {
        /// The colliding confirmation number
        confirmation_number: String,
    },

    /// No order matches the confirmation number
    #[error("Order {confirmation_number} not found")]
    OrderNotFound {
        /// Requested confirmation number
        confirmation_number: String,
    },

    /// Money arithmetic would overflow
    #[error("Arithmetic overflow in {operation}: {unit_price} x {quantity}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Price per ticket in cents
        unit_price: Cents,
        /// Ticket count
        quantity: usize,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for TicketingError {
    fn from(error: std::io::Error) -> Self {
        TicketingError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for TicketingError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        TicketingError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl TicketingError {
    /// Create a NotEnoughTickets error
    pub fn not_enough_tickets(concert_id: ConcertId, requested: u32, available: usize) -> Self {
        TicketingError::NotEnoughTickets {
            concert_id,
            requested,
            available,
        }
    }

    /// Create a PaymentFailed error
    pub fn payment_failed(reason: impl Into<String>) -> Self {
        TicketingError::PaymentFailed {
            reason: reason.into(),
        }
    }

    /// Create a ConcertNotFound error
    pub fn concert_not_found(concert_id: ConcertId) -> Self {
        TicketingError::ConcertNotFound { concert_id }
    }

    /// Create an InvalidTicketTransition error
    pub fn invalid_transition(ticket_id: TicketId, state: TicketState, operation: &str) -> Self {
        TicketingError::InvalidTicketTransition {
            ticket_id,
            state,
            operation: operation.to_string(),
        }
    }

    /// Create an OrderNotFound error
    pub fn order_not_found(confirmation_number: &str) -> Self {
        TicketingError::OrderNotFound {
            confirmation_number: confirmation_number.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, unit_price: Cents, quantity: usize) -> Self {
        TicketingError::ArithmeticOverflow {
            operation: operation.to_string(),
            unit_price,
            quantity,
        }
    }

    /// Whether the error belongs to a single purchase request
    ///
    /// Recoverable errors are reported for the request and processing
    /// continues; the rest indicate a broken input or output.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            TicketingError::FileNotFound { .. }
                | TicketingError::IoError { .. }
                | TicketingError::ParseError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_enough_tickets(
        TicketingError::not_enough_tickets(7, 51, 50),
        "Not enough tickets for concert 7: requested 51, available 50"
    )]
    #[case::payment_failed(
        TicketingError::payment_failed("Your card was declined."),
        "Payment failed: Your card was declined."
    )]
    #[case::concert_not_found(TicketingError::concert_not_found(3), "Concert 3 not found")]
    #[case::already_published(
        TicketingError::ConcertAlreadyPublished { concert_id: 3 },
        "Concert 3 is already published"
    )]
    #[case::invalid_transition(
        TicketingError::invalid_transition(12, TicketState::Sold, "release"),
        "Ticket 12 cannot release while sold"
    )]
    #[case::order_not_found(
        TicketingError::order_not_found("NOPE"),
        "Order NOPE not found"
    )]
    #[case::parse_error_with_line(
        TicketingError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        TicketingError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: TicketingError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::not_enough(TicketingError::not_enough_tickets(1, 2, 1), true)]
    #[case::payment(TicketingError::payment_failed("declined"), true)]
    #[case::not_found(TicketingError::concert_not_found(1), true)]
    #[case::io(TicketingError::IoError { message: "disk".to_string() }, false)]
    #[case::missing_file(TicketingError::FileNotFound { path: "x.csv".to_string() }, false)]
    fn test_is_recoverable(#[case] error: TicketingError, #[case] expected: bool) {
        assert_eq!(error.is_recoverable(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: TicketingError = io_error.into();
        assert!(matches!(error, TicketingError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
