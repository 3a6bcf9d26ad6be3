//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, report and order serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    write_inventory_csv, write_orders_csv, ConcertCsvRecord, ConcertEntry, CsvRow, InventoryRow,
    PurchaseCsvRecord,
};
pub use sync_reader::SyncReader;
