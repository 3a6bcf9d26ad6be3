//! Concurrent purchase processing
//!
//! This module provides the `PurchaseBatchProcessor` struct, which runs the
//! purchase requests of a batch concurrently on a tokio runtime.
//!
//! # Design
//!
//! Unlike ledger entries, purchases are not partitioned: requests for the same
//! concert are deliberately allowed to race each other, and the sharded ticket
//! pool decides who gets the last tickets. Each purchase runs as a blocking
//! task because payment gateways may block on network I/O. A semaphore caps
//! how many purchases are in flight at once.
//!
//! # Architecture
//!
//! ```text
//! PurchaseBatchProcessor
//!     ├── ConcertInventoryService  (sharded pool + concurrent order store)
//!     ├── Arc<ConcertCatalog>      (read-only during processing)
//!     ├── Arc<dyn PaymentGateway>
//!     └── Arc<Semaphore>           (max purchases in flight)
//! ```

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::error;

use crate::billing::PaymentGateway;
use crate::core::catalog::ConcertCatalog;
use crate::core::inventory::ConcertInventoryService;
use crate::core::traits::{OrderStore, TicketPool};
use crate::types::{PurchaseOutcome, PurchaseRequest};

/// Runs batches of purchase requests concurrently
pub struct PurchaseBatchProcessor<P, O> {
    service: ConcertInventoryService<P, O>,
    catalog: Arc<ConcertCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    permits: Arc<Semaphore>,
}

impl<P, O> Clone for PurchaseBatchProcessor<P, O> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            catalog: Arc::clone(&self.catalog),
            gateway: Arc::clone(&self.gateway),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<P, O> PurchaseBatchProcessor<P, O>
where
    P: TicketPool + Send + Sync + 'static,
    O: OrderStore + Send + Sync + 'static,
{
    /// Create a new PurchaseBatchProcessor
    ///
    /// # Arguments
    ///
    /// * `service` - Inventory service over thread-safe stores
    /// * `catalog` - Concerts purchases are resolved against
    /// * `gateway` - Gateway charged for every purchase
    /// * `max_concurrent` - Upper bound on purchases in flight (at least one)
    pub fn new(
        service: ConcertInventoryService<P, O>,
        catalog: Arc<ConcertCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            service,
            catalog,
            gateway,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Handle a single purchase on the current thread
    pub fn process_one(&self, request: PurchaseRequest) -> PurchaseOutcome {
        let result = self
            .service
            .purchase(&self.catalog, &request, self.gateway.as_ref());
        PurchaseOutcome { request, result }
    }

    /// Process a batch of purchase requests concurrently
    ///
    /// # Returns
    ///
    /// One `PurchaseOutcome` per request that ran to completion. Outcomes come
    /// back in request order, but the purchases themselves may have completed
    /// in any order.
    ///
    /// # Guarantees
    ///
    /// - At most `max_concurrent` purchases run at the same time
    /// - Every request is attempted, even if others fail
    /// - Failures are captured in the outcome and don't stop processing
    pub async fn process_batch(&self, batch: Vec<PurchaseRequest>) -> Vec<PurchaseOutcome> {
        let mut tasks = Vec::with_capacity(batch.len());

        for request in batch {
            // The semaphore is never closed, so acquiring only waits
            let permit = Arc::clone(&self.permits).acquire_owned().await.ok();
            let processor = self.clone();
            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                processor.process_one(request)
            }));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "Purchase task panicked"),
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::FakePaymentGateway;
    use crate::core::code_generator::OrderCodes;
    use crate::core::concurrent::{ConcurrentOrderStore, ShardedTicketPool};
    use crate::types::{Concert, TicketingError};
    use chrono::NaiveDate;

    fn setup(
        quantity: u32,
        max_concurrent: usize,
    ) -> (
        PurchaseBatchProcessor<ShardedTicketPool, ConcurrentOrderStore>,
        ConcertInventoryService<ShardedTicketPool, ConcurrentOrderStore>,
    ) {
        let service = ConcertInventoryService::new(
            Arc::new(ShardedTicketPool::new()),
            Arc::new(ConcurrentOrderStore::new()),
            OrderCodes::random(),
        );
        let date = NaiveDate::from_ymd_opt(2026, 12, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let mut concert = Concert::new(1, "The Red Chord", date, 1500, quantity);
        service.publish(&mut concert).unwrap();

        let catalog = Arc::new(vec![concert].into_iter().collect::<ConcertCatalog>());
        let gateway: Arc<dyn PaymentGateway> = Arc::new(FakePaymentGateway::with_test_cards());
        let processor =
            PurchaseBatchProcessor::new(service.clone(), catalog, gateway, max_concurrent);
        (processor, service)
    }

    fn request(email: &str, quantity: u32, token: &str) -> PurchaseRequest {
        PurchaseRequest {
            concert_id: 1,
            email: email.to_string(),
            ticket_quantity: quantity,
            payment_token: token.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_returns_one_outcome_per_request() {
        let (processor, service) = setup(10, 4);
        let batch = vec![
            request("a@example.com", 2, "tok_visa"),
            request("b@example.com", 1, "tok_mastercard"),
            request("c@example.com", 3, "tok_invalid"),
        ];

        let outcomes = processor.process_batch(batch).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].request.email, "a@example.com");
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_ok());
        assert!(matches!(
            outcomes[2].result,
            Err(TicketingError::PaymentFailed { .. })
        ));
        assert_eq!(service.tickets_sold(1), 3);
        assert_eq!(service.tickets_remaining(1), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_purchases_never_oversell() {
        let (processor, service) = setup(10, 8);
        let batch: Vec<PurchaseRequest> = (0..20)
            .map(|i| request(&format!("buyer{}@example.com", i), 3, "tok_visa"))
            .collect();

        let outcomes = processor.process_batch(batch).await;

        let sold: usize = outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|order| order.ticket_quantity())
            .sum();
        let rejected = outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome.result,
                    Err(TicketingError::NotEnoughTickets { .. })
                )
            })
            .count();
        assert_eq!(sold, 9);
        assert_eq!(rejected, 17);
        assert_eq!(service.tickets_sold(1), 9);
        assert_eq!(service.inventory_counts(1).reserved, 0);
        assert_eq!(service.total_tickets(1), 10);
    }

    #[test]
    fn test_process_one_resolves_unknown_concerts_as_not_found() {
        let (processor, _service) = setup(5, 1);

        let mut unknown = request("a@example.com", 1, "tok_visa");
        unknown.concert_id = 42;
        let outcome = processor.process_one(unknown);

        assert_eq!(outcome.result, Err(TicketingError::concert_not_found(42)));
    }
}
