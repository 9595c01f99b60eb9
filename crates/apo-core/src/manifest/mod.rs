//! Delivery manifest parsing.
//!
//! Turns the text of a tour manifest (PDF text layer or OCR output) into
//! ordered delivery stops with address, phone, cash to collect, notes and
//! optional article lines.

pub mod amounts;
pub mod articles;
pub mod header;
pub mod normalizer;
pub mod patterns;
mod rules;
pub mod stops;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

pub use amounts::{format_german_amount, parse_german_amount};
pub use articles::{is_article_line, parse_article_line};
pub use normalizer::normalize;
pub use rules::ManifestRules;
pub use stops::{ParserState, StopParser};

use crate::error::Result;
use crate::models::config::ManifestConfig;
use crate::models::tour::ManifestParseResult;

/// Parser for tour manifests.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    rules: ManifestRules,
    max_input_bytes: usize,
    fallback_date: Option<NaiveDate>,
}

impl ManifestParser {
    /// Create a parser with the default report layout.
    pub fn new() -> Self {
        Self {
            rules: ManifestRules::default(),
            max_input_bytes: ManifestConfig::default().max_input_bytes,
            fallback_date: None,
        }
    }

    /// Create a parser from manifest configuration.
    pub fn from_config(config: &ManifestConfig) -> Result<Self> {
        Ok(Self {
            rules: ManifestRules::from_overrides(&config.patterns)?,
            max_input_bytes: config.max_input_bytes,
            fallback_date: None,
        })
    }

    /// Date used when the manifest has no `Datum:` header (default: today).
    pub fn with_fallback_date(mut self, date: NaiveDate) -> Self {
        self.fallback_date = Some(date);
        self
    }

    /// Set the input size ceiling.
    pub fn with_max_input_bytes(mut self, max: usize) -> Self {
        self.max_input_bytes = max;
        self
    }

    /// Replace the layout patterns.
    pub fn with_rules(mut self, rules: ManifestRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &ManifestRules {
        &self.rules
    }

    fn fallback_date(&self) -> NaiveDate {
        self.fallback_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Parse manifest text.
    ///
    /// Never fails: unusable input yields an empty result with warnings.
    pub fn parse(&self, text: &str) -> ManifestParseResult {
        let fallback = self.fallback_date();

        if text.len() > self.max_input_bytes {
            warn!(
                "Manifest of {} bytes exceeds the limit of {} bytes",
                text.len(),
                self.max_input_bytes
            );
            let mut result = ManifestParseResult::empty(fallback);
            result.warnings.push(format!(
                "Input of {} bytes exceeds the limit of {} bytes",
                text.len(),
                self.max_input_bytes
            ));
            return result;
        }

        info!("Parsing manifest from {} characters of text", text.len());

        let lines = normalize(text, &self.rules);
        debug!("{} lines after normalization", lines.len());

        let mut result = self.parse_lines(&lines);
        let mut warnings = Vec::new();

        match header::extract_tour_name(text, &self.rules) {
            Some(name) => result.tour_name = name,
            None => warnings.push("Could not extract tour name".to_string()),
        }

        match header::extract_tour_date(text, &self.rules) {
            Some(date) => result.tour_date = date,
            None => {
                result.tour_date = fallback;
                warnings.push(format!(
                    "Could not extract tour date, using {}",
                    fallback.format("%d.%m.%Y")
                ));
            }
        }

        if result.stops.is_empty() {
            warnings.push("Could not extract any delivery stops".to_string());
        }

        result.warnings.extend(warnings);
        info!(
            "Parsed {} stops ({} packages)",
            result.stops.len(),
            result.total_packages()
        );
        result
    }

    /// Parse already normalized lines; tour metadata is left empty.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> ManifestParseResult {
        let (stops, has_articles) = StopParser::new(&self.rules).parse(lines.iter().map(AsRef::as_ref));

        let mut result = ManifestParseResult::empty(self.fallback_date());
        result.stops = stops;
        result.has_articles = has_articles;
        result
    }
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse manifest text with the default layout.
pub fn parse_manifest(text: &str) -> ManifestParseResult {
    ManifestParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PatternOverrides;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const MANIFEST: &str = "\
Apotheke am Markt
Versandauftrag: Tour Nord
Datum: 03.03.25
Pos. Lieferungsempfänger Pakete Offene Kredite Aktuelle Kredite
1 Mustermann, Erika 2 € 0,00 € 12,50
Hauptstraße 5, 55232 Alzey
Tel.: 06731 123456
Lieferhinweis: bitte klingeln
--- Seite 1 ---
2 Weber, Karl 1 € 5,00 € 0,00
Am Markt 3a bei Frau Schmidt
55232 Alzey
1 NOVAMINSULFON 500 MG 10 St HEXAL
€ 5,00 € 12,50
Seite 2 von 2
";

    fn parser() -> ManifestParser {
        ManifestParser::new().with_fallback_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn test_parse_full_manifest() {
        let result = parser().parse(MANIFEST);

        assert_eq!(result.tour_name, "Tour Nord");
        assert_eq!(result.tour_date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert!(result.has_articles);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.stops.len(), 2);

        let first = &result.stops[0];
        assert_eq!(first.customer_name, "Mustermann, Erika");
        assert_eq!(first.phone, "06731 123456");
        assert_eq!(first.delivery_notes, "bitte klingeln");
        assert!(first.items.is_empty());

        let second = &result.stops[1];
        assert_eq!(second.sort_order, 1);
        assert_eq!(second.street, "Am Markt 3a");
        assert_eq!(second.postal_code, "55232");
        assert_eq!(second.city, "Alzey");
        assert_eq!(second.delivery_notes, "bei Frau Schmidt");
        assert_eq!(second.cash_amount, Decimal::ZERO);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].manufacturer_code.as_deref(), Some("HEXAL"));

        assert_eq!(result.total_packages(), 3);
        assert_eq!(result.total_cash(), Decimal::from_str("12.50").unwrap());
    }

    #[test]
    fn test_missing_header_uses_fallback_date() {
        let result = parser().parse("1 Bolz, Hilde 1 € 0,00 € 0,00");

        assert_eq!(result.tour_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(result.tour_name, "");
        assert_eq!(result.stops.len(), 1);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[1].contains("01.01.2025"));
    }

    #[test]
    fn test_unknown_input_yields_empty_result() {
        for text in ["", "   \n\t ", "🙂 ÄÖÜ ß € € €", "\u{1d}\u{0}9N01"] {
            let result = parser().parse(text);
            assert!(result.stops.is_empty(), "{:?}", text);
            assert!(!result.has_articles);
        }
    }

    #[test]
    fn test_oversized_input_rejected() {
        let text = "1 Bolz, Hilde 1 € 0,00 € 0,00\n".repeat(10);
        let result = parser().with_max_input_bytes(16).parse(&text);

        assert!(result.stops.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("exceeds"));
    }

    #[test]
    fn test_huge_package_counts_do_not_overflow() {
        let text = "1 Bolz, Hilde 4000000000 € 0,00 € 0,00\n\
                    2 Weber, Karl 4000000000 € 0,00 € 0,00\n";
        let result = parser().parse(text);

        assert_eq!(result.stops.len(), 2);
        assert_eq!(result.stops[0].package_count, 4_000_000_000);
        assert_eq!(result.total_packages(), u32::MAX);
    }

    #[test]
    fn test_from_config_with_overrides() {
        let config = ManifestConfig {
            patterns: PatternOverrides {
                tour_name: Some(r"(?i)Tour:\s*(.+)".to_string()),
                notes_label: Some(r"(?i)Hinweis:\s*(.*)$".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let parser = ManifestParser::from_config(&config)
            .unwrap()
            .with_fallback_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let result = parser.parse("Tour: Süd\n1 Bolz, Hilde 1 € 0,00 € 0,00\nHinweis: Garage");
        assert_eq!(result.tour_name, "Süd");
        assert_eq!(result.stops[0].delivery_notes, "Garage");
    }

    #[test]
    fn test_parse_lines() {
        let result = parser().parse_lines(&["1 Bolz, Hilde 1 € 0,00 € 0,00", "Tel.: 0171 2345"]);
        assert_eq!(result.stops.len(), 1);
        assert_eq!(result.stops[0].phone, "0171 2345");
    }
}
