//! Delivery tour models reconstructed from manifest text.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single delivery stop of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStop {
    /// Position in the parsed output, starting at 0.
    pub sort_order: u32,

    /// Recipient name as printed ("Nachname, Vorname").
    pub customer_name: String,

    /// Street and house number.
    pub street: String,

    /// Five-digit German postal code.
    pub postal_code: String,

    /// City name.
    pub city: String,

    /// Phone number as printed.
    pub phone: String,

    /// Number of packages to hand over.
    pub package_count: u32,

    /// Cash to collect on delivery.
    pub cash_amount: Decimal,

    /// Free-text delivery hints.
    pub delivery_notes: String,

    /// Article lines listed under this stop.
    pub items: Vec<ArticleLine>,
}

impl DeliveryStop {
    /// Create an empty stop with the defaults of a freshly opened header.
    pub fn new(sort_order: u32) -> Self {
        Self {
            sort_order,
            customer_name: String::new(),
            street: String::new(),
            postal_code: String::new(),
            city: String::new(),
            phone: String::new(),
            package_count: 1,
            cash_amount: Decimal::ZERO,
            delivery_notes: String::new(),
            items: Vec::new(),
        }
    }

    /// Whether a street has been recorded.
    pub fn has_street(&self) -> bool {
        !self.street.is_empty()
    }

    /// Append a note fragment with the given separator.
    pub fn append_note(&mut self, note: &str, separator: &str) {
        if self.delivery_notes.is_empty() {
            self.delivery_notes = note.to_string();
        } else {
            self.delivery_notes.push_str(separator);
            self.delivery_notes.push_str(note);
        }
    }

    /// Format the address as a single line.
    pub fn address_line(&self) -> String {
        let locality = match (self.postal_code.is_empty(), self.city.is_empty()) {
            (false, false) => format!("{} {}", self.postal_code, self.city),
            (true, false) => self.city.clone(),
            (false, true) => self.postal_code.clone(),
            (true, true) => String::new(),
        };

        [self.street.as_str(), locality.as_str()]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A pharmaceutical article listed under a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLine {
    /// Number of packs.
    pub quantity: u32,

    /// Product name, possibly merged from wrapped lines.
    pub article_name: String,

    /// Pack size with unit, e.g. `10 St` or `5X10 ml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_size: Option<String>,

    /// Manufacturer short code, e.g. `HEXAL`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_code: Option<String>,

    /// Position within the stop, starting at 0.
    pub sort_order: u32,
}

/// Result of parsing a tour manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestParseResult {
    /// Stops in manifest order.
    pub stops: Vec<DeliveryStop>,

    /// Tour date from the `Datum:` header, or the parser's fallback date.
    pub tour_date: NaiveDate,

    /// Tour name from the `Versandauftrag:` header.
    pub tour_name: String,

    /// Whether any article line was recognized.
    pub has_articles: bool,

    /// Parse warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ManifestParseResult {
    /// Empty result for the given date.
    pub fn empty(tour_date: NaiveDate) -> Self {
        Self {
            stops: Vec::new(),
            tour_date,
            tour_name: String::new(),
            has_articles: false,
            warnings: Vec::new(),
        }
    }

    /// Total number of packages across all stops, saturating at `u32::MAX`.
    pub fn total_packages(&self) -> u32 {
        self.stops
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.package_count))
    }

    /// Total cash to collect across all stops, saturating at `Decimal::MAX`.
    pub fn total_cash(&self) -> Decimal {
        self.stops
            .iter()
            .fold(Decimal::ZERO, |total, s| total.saturating_add(s.cash_amount))
    }
}
