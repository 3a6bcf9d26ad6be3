//! Concert types
//!
//! A concert owns its ticket units for their entire lifetime. The concert
//! record itself only carries the metadata and the ticket price; the units
//! live in a ticket pool.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Concert identifier
pub type ConcertId = u32;

/// Money amount in cents (never floating point)
pub type Cents = u64;

/// Format an amount in cents as dollars with two decimal places
///
/// `8500` becomes `"85.00"`, `450` becomes `"4.50"`.
pub fn format_cents(cents: Cents) -> String {
    format!("{:.2}", Decimal::from(cents) / Decimal::ONE_HUNDRED)
}

/// A concert listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concert {
    pub id: ConcertId,
    pub title: String,
    pub subtitle: Option<String>,
    pub venue: String,
    pub venue_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Start of the show; presentational only, not checked at purchase time
    pub date: NaiveDateTime,
    /// Price of a single ticket
    pub ticket_price: Cents,
    /// Number of units created when the concert is published
    pub ticket_quantity: u32,
    pub additional_information: Option<String>,
    /// `None` means draft
    pub published_at: Option<DateTime<Utc>>,
    pub promoter_id: Option<u32>,
}

impl Concert {
    /// Create an unpublished concert with empty address metadata
    pub fn new(
        id: ConcertId,
        title: impl Into<String>,
        date: NaiveDateTime,
        ticket_price: Cents,
        ticket_quantity: u32,
    ) -> Self {
        Concert {
            id,
            title: title.into(),
            subtitle: None,
            venue: String::new(),
            venue_address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            date,
            ticket_price,
            ticket_quantity,
            additional_information: None,
            published_at: None,
            promoter_id: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// `"December 1, 2019"`
    pub fn formatted_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }

    /// `"5:00pm"`
    pub fn formatted_start_time(&self) -> String {
        self.date.format("%-I:%M%P").to_string()
    }

    /// `"4.50"` for a price of 450 cents
    pub fn ticket_price_in_dollars(&self) -> String {
        format_cents(self.ticket_price)
    }
}
