//! Thread-safe implementations of core components
//!
//! This module provides concurrent implementations of the storage traits
//! using DashMap, plus the processor that runs purchases in parallel.
//!
//! - **ShardedTicketPool**: ticket units per concert behind a per-entry write guard
//! - **ConcurrentOrderStore**: orders with an atomic confirmation-number check
//! - **PurchaseBatchProcessor**: runs a batch of purchases as blocking tasks
//!
//! # Thread Safety
//!
//! - Purchases against different concerts proceed in parallel
//! - Purchases against the same concert serialize only while reserving,
//!   claiming or releasing; payment happens outside any lock

pub mod batch_processor;
pub mod order_store;
pub mod ticket_pool;

pub use batch_processor::PurchaseBatchProcessor;
pub use order_store::ConcurrentOrderStore;
pub use ticket_pool::ShardedTicketPool;
