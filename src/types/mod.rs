//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `concert`: Concert listing and money helpers
//! - `ticket`: Ticket units and their state machine
//! - `order`: Completed orders
//! - `message`: Attendee messages and promoter invitations
//! - `purchase`: Purchase requests and their outcomes
//! - `error`: Error types for the ticket inventory engine

pub mod concert;
pub mod error;
pub mod message;
pub mod order;
pub mod purchase;
pub mod ticket;

pub use concert::{format_cents, Cents, Concert, ConcertId};
pub use error::TicketingError;
pub use message::{AttendeeMessage, Invitation};
pub use order::{Order, OrderId, OrderTicket};
pub use purchase::{PurchaseOutcome, PurchaseRequest};
pub use ticket::{TicketId, TicketState, TicketUnit};
