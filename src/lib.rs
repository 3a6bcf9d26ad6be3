//! Ticket Inventory Engine Library
//! # Overview
//!
//! This library manages the ticket inventory of published concerts: it creates
//! ticket units, holds them for buyers while payment is attempted, and turns
//! paid reservations into orders. Purchase requests can be replayed from CSV
//! files with a sequential or a concurrent strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Concert, TicketUnit, Order, etc.)
//! - [`billing`] - Payment gateway capability (fake and Stripe)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::inventory`] - Publishing, purchasing and inventory statistics
//!   - [`core::reservation`] - Held tickets awaiting payment
//!   - [`core::ticket_pool`] - Ticket unit storage
//!   - [`core::order_store`] - Orders by confirmation number
//!   - [`core::concurrent`] - Thread-safe stores and parallel purchasing
//! - [`io`] - CSV readers and report writers
//! - [`strategy`] - Complete replay pipelines
//!
//! # Ticket Lifecycle
//!
//! Every ticket unit moves through three states:
//!
//! - **Available**: Created when a concert is published or tickets are added
//! - **Reserved**: Held for a buyer while payment is attempted
//! - **Sold**: Claimed by an order, with a unique ticket code
//!
//! A reserved unit returns to available when its reservation is cancelled,
//! when payment fails, or when the reservation is dropped without completing.
//!
//! # Inventory Invariants
//!
//! For every concert:
//! - `available + reserved + sold` equals the number of units created
//! - a unit is sold to at most one order
//! - an order's amount is the ticket price times its ticket count

pub mod billing;
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use billing::{Charge, FakePaymentGateway, PaymentGateway};
pub use core::{ConcertCatalog, ConcertInventoryService, Reservation};
pub use io::{write_inventory_csv, write_orders_csv};
pub use types::{
    Cents, Concert, ConcertId, Order, PurchaseRequest, TicketId, TicketState, TicketUnit,
    TicketingError,
};
