//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. Purchase requests are read in batches and the
//! requests of a batch race each other for tickets.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── PurchaseBatchProcessor (semaphore-bounded blocking tasks)
//!     └── ConcertInventoryService
//!         ├── ShardedTicketPool (per-concert row locks)
//!         └── ConcurrentOrderStore (unique confirmation numbers)
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another. Within a batch there is no
//! ordering between purchases, so when a concert runs short the buyers who
//! get the last tickets are not determined by file order. The ticket pool
//! still guarantees that no unit is sold twice.

use crate::billing::PaymentGateway;
use crate::core::{
    ConcertInventoryService, ConcurrentOrderStore, OrderCodes, PurchaseBatchProcessor,
    ShardedTicketPool,
};
use crate::io::{write_inventory_csv, AsyncReader, PurchaseCsvRecord};
use crate::strategy::{inventory_report, load_catalog, log_failed_purchase, ProcessingStrategy};
use crate::types::Order;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for batch processing
///
/// Controls how many purchase requests are read at a time and how many of
/// them may be in flight at once.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of purchase requests per batch
    pub batch_size: usize,
    /// Maximum number of purchases running concurrently
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                max_concurrent,
                default = default.max_concurrent,
                "Invalid concurrency limit, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// # Thread Safety
///
/// AsyncProcessingStrategy is Send + Sync. Each call to `process` builds its
/// own runtime and its own thread-safe stores.
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Number of purchase requests per batch (default: 1000)
/// - `max_concurrent`: Worker threads and purchases in flight (default: CPU cores)
#[derive(Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    gateway: Arc<dyn PaymentGateway>,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent
    /// * `gateway` - Gateway charged for every purchase
    pub fn new(config: BatchConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { config, gateway }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay purchases concurrently and write the inventory report
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Loads the catalog, publishing concerts into the sharded pool
    /// 3. Reads purchase requests in batches using AsyncReader
    /// 4. Runs each batch through the PurchaseBatchProcessor and waits for it
    /// 5. Writes the inventory report using the csv_format module
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are returned immediately.
    /// Rejected purchases are logged and processing continues.
    fn process(
        &self,
        concerts_path: &Path,
        purchases_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<Order>, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let service = ConcertInventoryService::new(
                Arc::new(ShardedTicketPool::new()),
                Arc::new(ConcurrentOrderStore::new()),
                OrderCodes::random(),
            );
            let catalog = Arc::new(load_catalog(concerts_path, &service)?);

            let processor = PurchaseBatchProcessor::new(
                service.clone(),
                Arc::clone(&catalog),
                Arc::clone(&self.gateway),
                self.config.max_concurrent,
            );

            let file = tokio::fs::File::open(purchases_path).await.map_err(|e| {
                format!("Failed to open file '{}': {}", purchases_path.display(), e)
            })?;

            // csv-async reads futures::io, tokio files need the compat layer
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::<_, PurchaseCsvRecord>::new(compat_file);

            let mut orders = Vec::new();
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                debug!(requests = batch.len(), "Processing purchase batch");

                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(order) => orders.push(order),
                        Err(e) => log_failed_purchase(&outcome.request, &e),
                    }
                }
            }

            write_inventory_csv(&inventory_report(&catalog, &service), output)?;

            Ok(orders)
        })
    }
}
