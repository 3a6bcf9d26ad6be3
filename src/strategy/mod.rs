//! Processing strategy module for purchase replays
//!
//! This module defines the Strategy pattern for complete replay pipelines:
//! loading the concert catalog, driving every purchase request through the
//! inventory service, and writing the inventory report. This allows different
//! processing implementations (sequential, concurrent batch) to be selected at
//! runtime.

use crate::billing::PaymentGateway;
use crate::cli::StrategyType;
use crate::core::{ConcertCatalog, ConcertInventoryService, OrderStore, TicketPool};
use crate::io::{ConcertCsvRecord, ConcertEntry, InventoryRow, SyncReader};
use crate::types::{Order, PurchaseRequest, TicketingError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads the concerts and purchases files, processes every
/// purchase through the inventory service, and writes the final inventory
/// report to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay purchases and write the inventory report
    ///
    /// # Arguments
    ///
    /// * `concerts_path` - CSV file with the concert catalog
    /// * `purchases_path` - CSV file with purchase requests
    /// * `output` - Writer receiving the inventory report
    ///
    /// # Returns
    ///
    /// * `Ok(orders)` with every order placed, once all requests were handled
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error, etc.)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input file cannot be opened
    /// - The report cannot be written
    ///
    /// Failed purchases and unusable rows are logged and do not stop processing.
    fn process(
        &self,
        concerts_path: &Path,
        purchases_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<Order>, String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional batch configuration (ignored for sync)
/// * `gateway` - Gateway charged for every purchase
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    gateway: Arc<dyn PaymentGateway>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(gateway)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, gateway))
        }
    }
}

/// Read the concerts file into a catalog
///
/// Concerts flagged as published are published through `service`, which
/// creates their ticket units. Invalid rows and repeated ids are skipped.
pub(crate) fn load_catalog<P: TicketPool, O: OrderStore>(
    path: &Path,
    service: &ConcertInventoryService<P, O>,
) -> Result<ConcertCatalog, String> {
    let reader = SyncReader::<ConcertCsvRecord>::new(path)?;
    let mut catalog = ConcertCatalog::new();

    for result in reader {
        match result {
            Ok(ConcertEntry {
                mut concert,
                published,
            }) => {
                if catalog.get(concert.id).is_some() {
                    warn!(concert_id = concert.id, "Duplicate concert id, row skipped");
                    continue;
                }
                if published {
                    if let Err(e) = service.publish(&mut concert) {
                        warn!(concert_id = concert.id, error = %e, "Concert not published");
                    }
                }
                catalog.insert(concert);
            }
            Err(e) => warn!(error = %e, "Skipping concert row"),
        }
    }

    info!(concerts = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// One report row per catalog concert
pub(crate) fn inventory_report<P: TicketPool, O: OrderStore>(
    catalog: &ConcertCatalog,
    service: &ConcertInventoryService<P, O>,
) -> Vec<InventoryRow> {
    catalog
        .iter()
        .map(|concert| InventoryRow {
            concert_id: concert.id,
            title: concert.title.clone(),
            published: concert.is_published(),
            counts: service.inventory_counts(concert.id),
            revenue: service.revenue_in_cents(concert.id),
        })
        .collect()
}

pub(crate) fn log_failed_purchase(request: &PurchaseRequest, error: &TicketingError) {
    warn!(
        concert_id = request.concert_id,
        email = %request.email,
        quantity = request.ticket_quantity,
        error = %error,
        "Purchase rejected"
    );
}
