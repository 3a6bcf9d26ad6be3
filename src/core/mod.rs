//! Core business logic module
//!
//! This module contains the ticket inventory components:
//! - `traits` - Storage abstractions for ticket units and orders
//! - `ticket_pool` - Single-threaded ticket unit storage
//! - `order_store` - Single-threaded order storage
//! - `reservation` - Held tickets awaiting payment
//! - `inventory` - Publishing, purchasing and inventory statistics
//! - `catalog` - Published-only concert lookup
//! - `code_generator` - Confirmation numbers, ticket and invitation codes
//! - `concurrent` - Thread-safe implementations and parallel purchasing

pub mod catalog;
pub mod code_generator;
pub mod concurrent;
pub mod inventory;
pub mod order_store;
pub mod reservation;
pub mod ticket_pool;
pub mod traits;

pub use catalog::ConcertCatalog;
pub use code_generator::{CodeGenerator, OrderCodes, RandomCodeGenerator, SequentialCodeGenerator};
pub use concurrent::{ConcurrentOrderStore, PurchaseBatchProcessor, ShardedTicketPool};
pub use inventory::ConcertInventoryService;
pub use order_store::InMemoryOrderStore;
pub use reservation::{Reservation, ReservationState};
pub use ticket_pool::InMemoryTicketPool;
pub use traits::{InventoryCounts, OrderStore, TicketPool};
