//! Synchronous processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. Purchases are handled one after another in file
//! order against the in-memory stores.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Purchasing to `ConcertInventoryService` (business logic)
//! - CSV output to `csv_format::write_inventory_csv` (format handling)

use crate::billing::PaymentGateway;
use crate::core::{ConcertInventoryService, InMemoryOrderStore, InMemoryTicketPool, OrderCodes};
use crate::io::{write_inventory_csv, PurchaseCsvRecord, SyncReader};
use crate::strategy::{inventory_report, load_catalog, log_failed_purchase, ProcessingStrategy};
use crate::types::Order;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ticket_inventory_engine::billing::FakePaymentGateway;
/// use ticket_inventory_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let strategy = SyncProcessingStrategy::new(Arc::new(FakePaymentGateway::with_test_cards()));
/// let mut output = std::io::stdout();
///
/// strategy
///     .process(Path::new("concerts.csv"), Path::new("purchases.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Clone)]
pub struct SyncProcessingStrategy {
    gateway: Arc<dyn PaymentGateway>,
}

impl SyncProcessingStrategy {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        concerts_path: &Path,
        purchases_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<Order>, String> {
        let service = ConcertInventoryService::new(
            Arc::new(InMemoryTicketPool::new()),
            Arc::new(InMemoryOrderStore::new()),
            OrderCodes::random(),
        );
        let catalog = load_catalog(concerts_path, &service)?;

        let reader = SyncReader::<PurchaseCsvRecord>::new(purchases_path)?;

        let mut orders = Vec::new();
        for result in reader {
            match result {
                Ok(request) => {
                    match service.purchase(&catalog, &request, self.gateway.as_ref()) {
                        Ok(order) => orders.push(order),
                        Err(e) => log_failed_purchase(&request, &e),
                    }
                }
                Err(e) => warn!(error = %e, "Skipping purchase row"),
            }
        }

        write_inventory_csv(&inventory_report(&catalog, &service), output)?;

        Ok(orders)
    }
}
