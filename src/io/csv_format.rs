//! CSV format handling for concert catalogs, purchase requests and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for deserialization (`ConcertCsvRecord`, `PurchaseCsvRecord`)
//! - The `CsvRow` conversion from rows to domain types
//! - Inventory report and order serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::InventoryCounts;
use crate::types::{format_cents, Cents, Concert, ConcertId, Order, PurchaseRequest};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;

/// Format of the `date` column
pub const CONCERT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Largest `ticket_quantity` a catalog row may publish
pub const MAX_TICKET_QUANTITY: u32 = 100_000;

/// A deserializable CSV row and the domain value it converts to
pub trait CsvRow: DeserializeOwned {
    type Output;

    /// Validate the row and convert it
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    fn convert(self) -> Result<Self::Output, String>;
}

/// Row of the concerts file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ConcertCsvRecord {
    pub id: ConcertId,
    pub title: String,
    pub venue: String,
    pub city: String,
    pub date: String,
    pub ticket_price: Cents,
    pub ticket_quantity: u32,
    pub published: String,
}

/// A concert from the catalog file and whether it should be published
#[derive(Debug, Clone, PartialEq)]
pub struct ConcertEntry {
    pub concert: Concert,
    pub published: bool,
}

impl CsvRow for ConcertCsvRecord {
    type Output = ConcertEntry;

    fn convert(self) -> Result<ConcertEntry, String> {
        if self.title.is_empty() {
            return Err(format!("Concert {} has no title", self.id));
        }
        if self.ticket_quantity > MAX_TICKET_QUANTITY {
            return Err(format!(
                "Ticket quantity {} for concert {} exceeds the maximum of {}",
                self.ticket_quantity, self.id, MAX_TICKET_QUANTITY
            ));
        }

        let date = NaiveDateTime::parse_from_str(&self.date, CONCERT_DATE_FORMAT)
            .map_err(|e| format!("Invalid date '{}' for concert {}: {}", self.date, self.id, e))?;

        let published = match self.published.to_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" | "" => false,
            other => {
                return Err(format!(
                    "Invalid published flag '{}' for concert {}",
                    other, self.id
                ))
            }
        };

        let mut concert = Concert::new(
            self.id,
            self.title,
            date,
            self.ticket_price,
            self.ticket_quantity,
        );
        concert.venue = self.venue;
        concert.city = self.city;

        Ok(ConcertEntry { concert, published })
    }
}

/// Row of the purchases file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PurchaseCsvRecord {
    pub concert_id: ConcertId,
    pub email: String,
    pub ticket_quantity: u32,
    pub payment_token: String,
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

impl CsvRow for PurchaseCsvRecord {
    type Output = PurchaseRequest;

    fn convert(self) -> Result<PurchaseRequest, String> {
        if !is_plausible_email(&self.email) {
            return Err(format!(
                "Invalid email '{}' for concert {}",
                self.email, self.concert_id
            ));
        }

        if self.ticket_quantity < 1 {
            return Err(format!(
                "Ticket quantity must be at least 1 for {} (concert {})",
                self.email, self.concert_id
            ));
        }

        if self.payment_token.is_empty() {
            return Err(format!(
                "Missing payment token for {} (concert {})",
                self.email, self.concert_id
            ));
        }

        Ok(PurchaseRequest {
            concert_id: self.concert_id,
            email: self.email,
            ticket_quantity: self.ticket_quantity,
            payment_token: self.payment_token,
        })
    }
}

/// One line of the inventory report
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub concert_id: ConcertId,
    pub title: String,
    pub published: bool,
    pub counts: InventoryCounts,
    pub revenue: Cents,
}

pub fn write_inventory_csv(rows: &[InventoryRow], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "concert_id",
            "title",
            "published",
            "total",
            "sold",
            "reserved",
            "remaining",
            "revenue",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    // Sort by concert ID for deterministic output
    let mut sorted_rows = rows.to_vec();
    sorted_rows.sort_by_key(|row| row.concert_id);

    for row in sorted_rows {
        writer
            .write_record(&[
                row.concert_id.to_string(),
                row.title,
                row.published.to_string(),
                row.counts.total().to_string(),
                row.counts.sold.to_string(),
                row.counts.reserved.to_string(),
                row.counts.available.to_string(),
                format_cents(row.revenue),
            ])
            .map_err(|e| format!("Failed to write inventory record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

pub fn write_orders_csv(orders: &[Order], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "confirmation_number",
            "concert_id",
            "email",
            "ticket_quantity",
            "amount",
            "card_last_four",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for order in orders {
        writer
            .write_record(&[
                order.confirmation_number.clone(),
                order.concert_id.to_string(),
                order.email.clone(),
                order.ticket_quantity().to_string(),
                order.formatted_amount(),
                order.card_last_four.clone(),
            ])
            .map_err(|e| format!("Failed to write order record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::Charge;
    use crate::types::OrderTicket;
    use rstest::rstest;
    use uuid::Uuid;

    fn concert_record(date: &str, published: &str) -> ConcertCsvRecord {
        ConcertCsvRecord {
            id: 1,
            title: "The Red Chord".to_string(),
            venue: "The Mosh Pit".to_string(),
            city: "Laraville".to_string(),
            date: date.to_string(),
            ticket_price: 3250,
            ticket_quantity: 75,
            published: published.to_string(),
        }
    }

    fn purchase_record(email: &str, quantity: u32, token: &str) -> PurchaseCsvRecord {
        PurchaseCsvRecord {
            concert_id: 1,
            email: email.to_string(),
            ticket_quantity: quantity,
            payment_token: token.to_string(),
        }
    }

    #[rstest]
    #[case::published("true", true)]
    #[case::upper_case("TRUE", true)]
    #[case::yes("yes", true)]
    #[case::unpublished("false", false)]
    #[case::empty("", false)]
    fn test_convert_concert_record(#[case] flag: &str, #[case] expected: bool) {
        let entry = concert_record("2026-12-01 20:00", flag).convert().unwrap();

        assert_eq!(entry.published, expected);
        assert_eq!(entry.concert.title, "The Red Chord");
        assert_eq!(entry.concert.venue, "The Mosh Pit");
        assert_eq!(entry.concert.city, "Laraville");
        assert_eq!(entry.concert.formatted_date(), "December 1, 2026");
        assert_eq!(entry.concert.formatted_start_time(), "8:00pm");
        assert_eq!(entry.concert.ticket_price, 3250);
        assert_eq!(entry.concert.ticket_quantity, 75);
        assert!(!entry.concert.is_published());
    }

    #[rstest]
    #[case::bad_date("12/01/2026", "true", "Invalid date")]
    #[case::bad_flag("2026-12-01 20:00", "maybe", "Invalid published flag")]
    fn test_convert_concert_record_errors(
        #[case] date: &str,
        #[case] flag: &str,
        #[case] expected_error: &str,
    ) {
        let result = concert_record(date, flag).convert();

        assert!(result.unwrap_err().contains(expected_error));
    }

    #[rstest]
    #[case::at_the_limit(MAX_TICKET_QUANTITY, true)]
    #[case::over_the_limit(MAX_TICKET_QUANTITY + 1, false)]
    #[case::largest_u32(u32::MAX, false)]
    fn test_concert_ticket_quantity_is_bounded(#[case] quantity: u32, #[case] accepted: bool) {
        let mut record = concert_record("2026-12-01 20:00", "true");
        record.ticket_quantity = quantity;

        let result = record.convert();

        match result {
            Ok(entry) => {
                assert!(accepted);
                assert_eq!(entry.concert.ticket_quantity, quantity);
            }
            Err(e) => {
                assert!(!accepted);
                assert!(e.contains("exceeds the maximum"), "{}", e);
            }
        }
    }

    #[test]
    fn test_convert_purchase_record() {
        let request = purchase_record("john@example.com", 3, "tok_visa")
            .convert()
            .unwrap();

        assert_eq!(
            request,
            PurchaseRequest {
                concert_id: 1,
                email: "john@example.com".to_string(),
                ticket_quantity: 3,
                payment_token: "tok_visa".to_string(),
            }
        );
    }

    #[rstest]
    #[case::email_is_required("", 1, "tok_visa", "Invalid email")]
    #[case::email_must_be_valid("not-an-email-address", 1, "tok_visa", "Invalid email")]
    #[case::ticket_quantity_is_at_least_1("john@example.com", 0, "tok_visa", "at least 1")]
    #[case::payment_token_is_required("john@example.com", 1, "", "Missing payment token")]
    fn test_convert_purchase_record_errors(
        #[case] email: &str,
        #[case] quantity: u32,
        #[case] token: &str,
        #[case] expected_error: &str,
    ) {
        let result = purchase_record(email, quantity, token).convert();

        assert!(result.unwrap_err().contains(expected_error));
    }

    fn inventory_row(concert_id: ConcertId, sold: usize, revenue: Cents) -> InventoryRow {
        InventoryRow {
            concert_id,
            title: format!("Concert {}", concert_id),
            published: true,
            counts: InventoryCounts {
                available: 10 - sold,
                reserved: 0,
                sold,
            },
            revenue,
        }
    }

    #[rstest]
    #[case::single_concert(
        vec![inventory_row(1, 3, 9750)],
        "concert_id,title,published,total,sold,reserved,remaining,revenue\n1,Concert 1,true,10,3,0,7,97.50\n"
    )]
    #[case::sorted_by_concert_id(
        vec![inventory_row(3, 0, 0), inventory_row(1, 1, 450), inventory_row(2, 10, 100000)],
        "concert_id,title,published,total,sold,reserved,remaining,revenue\n\
         1,Concert 1,true,10,1,0,9,4.50\n\
         2,Concert 2,true,10,10,0,0,1000.00\n\
         3,Concert 3,true,10,0,0,10,0.00\n"
    )]
    #[case::empty(vec![], "concert_id,title,published,total,sold,reserved,remaining,revenue\n")]
    fn test_write_inventory_csv(#[case] rows: Vec<InventoryRow>, #[case] expected_output: &str) {
        let mut output = Vec::new();

        write_inventory_csv(&rows, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }

    #[test]
    fn test_write_orders_csv() {
        let order = Order::for_tickets(
            Uuid::new_v4(),
            2,
            "ORDERCONFIRMATION1234".to_string(),
            vec![
                OrderTicket {
                    id: 1,
                    code: "TICKETCODE1".to_string(),
                },
                OrderTicket {
                    id: 2,
                    code: "TICKETCODE2".to_string(),
                },
            ],
            "jane@example.com",
            &Charge {
                amount: 6500,
                card_last_four: "4242".to_string(),
            },
        );
        let mut output = Vec::new();

        write_orders_csv(&[order], &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "confirmation_number,concert_id,email,ticket_quantity,amount,card_last_four\n\
             ORDERCONFIRMATION1234,2,jane@example.com,2,65.00,4242\n"
        );
    }
}
