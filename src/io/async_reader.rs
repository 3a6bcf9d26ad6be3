//! Asynchronous CSV reader with batch interface
//!
//! Provides batch reading over the rows of a CSV file for the concurrent
//! processing strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - the `CsvRow` conversion from the csv_format module
//! - tracing to report rows that cannot be used
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader<_, PurchaseCsvRecord> → Batches of PurchaseRequests
//!                  ↓
//!           csv_format module
//!           (CsvRow::convert)
//! ```

use crate::io::csv_format::CsvRow;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Invalid rows are logged and skipped; a batch only contains usable values.
pub struct AsyncReader<R: AsyncRead + Unpin, T> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    rows: PhantomData<T>,
}

impl<R, T> AsyncReader<R, T>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: CsvRow,
{
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            rows: PhantomData,
        }
    }

    /// Read up to `batch_size` converted rows
    ///
    /// An empty batch means the end of the file was reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<T::Output> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<T>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match record.convert() {
                    Ok(value) => batch.push(value),
                    Err(e) => warn!(error = %e, "Skipping invalid row"),
                },
                Some(Err(e)) => warn!(error = %e, "Skipping unparsable row"),
                None => break,
            }
        }

        batch
    }
}
