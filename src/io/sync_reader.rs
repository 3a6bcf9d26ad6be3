//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the rows of a concerts or purchases file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize rows sequentially,
//! converting each through its `CsvRow` implementation. Rows are processed one
//! at a time without loading the entire file into memory.
//!
//! # Iterator Interface
//!
//! `SyncReader<T>` yields `Result<T::Output, String>` for each row:
//!
//! ```no_run
//! use ticket_inventory_engine::io::csv_format::PurchaseCsvRecord;
//! use ticket_inventory_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::<PurchaseCsvRecord>::new(Path::new("purchases.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("Purchase request: {:?}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants with their line number

use crate::io::csv_format::CsvRow;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

#[derive(Debug)]
pub struct SyncReader<T> {
    reader: csv::Reader<File>,
    line_num: usize,
    rows: PhantomData<T>,
}

impl<T: CsvRow> SyncReader<T> {
    /// Open a CSV file for reading
    ///
    /// # Errors
    ///
    /// Returns an error message if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            rows: PhantomData,
        })
    }
}

impl<T: CsvRow> Iterator for SyncReader<T> {
    type Item = Result<T::Output, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<T>();

        let row = deserializer.next()?;
        self.line_num += 1;
        // +1 for the header line
        let line = self.line_num + 1;

        Some(match row {
            Ok(record) => record.convert().map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::{ConcertCsvRecord, PurchaseCsvRecord};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const PURCHASES_HEADER: &str = "concert_id,email,ticket_quantity,payment_token\n";

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::<PurchaseCsvRecord>::new(Path::new("nonexistent.csv"));

        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_reader_iterates_purchase_requests() {
        let file = create_temp_csv(&format!(
            "{}1,john@example.com,3,tok_visa\n2,jane@example.com,1,tok_amex\n",
            PURCHASES_HEADER
        ));

        let reader = SyncReader::<PurchaseCsvRecord>::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 2);
        let first = records[0].as_ref().unwrap();
        assert_eq!(first.concert_id, 1);
        assert_eq!(first.email, "john@example.com");
        assert_eq!(first.ticket_quantity, 3);
        assert_eq!(first.payment_token, "tok_visa");
        assert_eq!(records[1].as_ref().unwrap().concert_id, 2);
    }

    #[test]
    fn test_sync_reader_iterates_concerts() {
        let file = create_temp_csv(
            "id,title,venue,city,date,ticket_price,ticket_quantity,published\n\
             1,The Red Chord,The Mosh Pit,Laraville,2026-12-01 20:00,3250,75,true\n",
        );

        let reader = SyncReader::<ConcertCsvRecord>::new(file.path()).unwrap();
        let entries: Vec<_> = reader.collect();

        assert_eq!(entries.len(), 1);
        let entry = entries[0].as_ref().unwrap();
        assert!(entry.published);
        assert_eq!(entry.concert.ticket_quantity, 75);
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let file = create_temp_csv(&format!(
            "{}1,john@example.com,1,tok_visa\n1,not-an-email,1,tok_visa\n1,jane@example.com,x,tok_visa\n1,sam@example.com,1,tok_visa\n",
            PURCHASES_HEADER
        ));

        let reader = SyncReader::<PurchaseCsvRecord>::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        let conversion_error = records[1].as_ref().unwrap_err();
        assert!(conversion_error.contains("Line 3"));
        assert!(conversion_error.contains("Invalid email"));
        let parse_error = records[2].as_ref().unwrap_err();
        assert!(parse_error.contains("Line 4"));
        assert!(parse_error.contains("CSV parse error"));
        assert!(records[3].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv(&format!(
            "{}  1  ,  john@example.com  ,  2  ,  tok_visa  \n",
            PURCHASES_HEADER
        ));

        let reader = SyncReader::<PurchaseCsvRecord>::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        let request = records[0].as_ref().unwrap();
        assert_eq!(request.email, "john@example.com");
        assert_eq!(request.ticket_quantity, 2);
    }

    #[test]
    fn test_sync_reader_empty_file() {
        let file = create_temp_csv(PURCHASES_HEADER);

        let reader = SyncReader::<PurchaseCsvRecord>::new(file.path()).unwrap();

        assert_eq!(reader.count(), 0);
    }
}
