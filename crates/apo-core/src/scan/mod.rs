//! Drug package code decoding.
//!
//! A [`CodeClassifier`] runs a priority-ordered chain of [`CodeDecoder`]s:
//! structured formats with self-describing markers (GS1, IFA PPN) first, then
//! the loose digit-length heuristics for linear barcodes and bare PZNs.

pub mod barcode;
pub mod expiry;
pub mod gs1;
pub mod ifa;
pub mod patterns;
pub mod pzn;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::models::config::ScanConfig;
use crate::models::pharma::{DecodedPharmaCode, SourceFormat, Symbology};

pub use barcode::BarcodeDecoder;
pub use expiry::{decode_expiry, expand_year, last_day_of_month};
pub use gs1::{parse_gs1, Gs1Decoder};
pub use ifa::{parse_ifa_ppn, IfaPpnDecoder};
pub use pzn::{
    compute_check_digit, extract_pzn, format_pzn, is_valid_pzn, validate_pzn, PznExtractor,
};

/// Trait for field extractors over free text.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction result with confidence score.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// One decoding strategy in the classifier chain.
pub trait CodeDecoder: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Cheap check whether this decoder should be attempted.
    fn detect(&self, code: &str) -> bool;

    /// Decode the code, or `None` when it is not in this format.
    fn decode(&self, code: &str, hint: Option<Symbology>) -> Option<DecodedPharmaCode>;
}

/// Result of classifying a scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The code was decoded.
    Decoded(DecodedPharmaCode),
    /// No decoder accepted the code.
    Unrecognized,
}

impl ScanOutcome {
    pub fn decoded(&self) -> Option<&DecodedPharmaCode> {
        match self {
            Self::Decoded(code) => Some(code),
            Self::Unrecognized => None,
        }
    }

    pub fn into_decoded(self) -> Option<DecodedPharmaCode> {
        match self {
            Self::Decoded(code) => Some(code),
            Self::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }
}

/// Priority-ordered decoder chain; the first successful decode wins.
pub struct CodeClassifier {
    decoders: Vec<Box<dyn CodeDecoder>>,
    warn_invalid_pzn: bool,
}

impl CodeClassifier {
    /// Create a classifier with the default chain: GS1, IFA PPN, barcode.
    pub fn new() -> Self {
        Self::from_config(&ScanConfig::default())
    }

    /// Create a classifier from scan configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            decoders: vec![
                Box::new(Gs1Decoder::new(config.gs1_batch_policy)),
                Box::new(IfaPpnDecoder::new()),
                Box::new(BarcodeDecoder::new(config.ean13_heuristic)),
            ],
            warn_invalid_pzn: config.warn_invalid_pzn,
        }
    }

    /// Append a decoder at the end of the chain.
    pub fn with_decoder(mut self, decoder: Box<dyn CodeDecoder>) -> Self {
        self.decoders.push(decoder);
        self
    }

    /// Names of the decoders in chain order.
    pub fn decoder_names(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    /// Classify a scanned code.
    pub fn classify(&self, code: &str) -> ScanOutcome {
        self.classify_with_symbology(code, None)
    }

    /// Classify a scanned code with the symbology reported by the scanner.
    pub fn classify_with_symbology(&self, code: &str, hint: Option<Symbology>) -> ScanOutcome {
        let code = code.trim();
        if code.is_empty() {
            return ScanOutcome::Unrecognized;
        }

        for decoder in &self.decoders {
            if !decoder.detect(code) {
                trace!("Decoder {} skipped", decoder.name());
                continue;
            }

            match decoder.decode(code, hint) {
                Some(decoded) => {
                    debug!("Decoded as {} by {}", decoded.source_format, decoder.name());
                    self.check_pzn(&decoded);
                    return ScanOutcome::Decoded(decoded);
                }
                None => debug!("Decoder {} rejected the code", decoder.name()),
            }
        }

        ScanOutcome::Unrecognized
    }

    fn check_pzn(&self, decoded: &DecodedPharmaCode) {
        // EAN-13 candidates are expected to fail now and then
        if !self.warn_invalid_pzn || decoded.source_format == SourceFormat::Ean13 {
            return;
        }
        if let Some(validation) = decoded.pzn_validation().filter(|v| !v.valid) {
            warn!(
                "Decoded PZN {} failed validation: {}",
                validation.normalized,
                validation
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_default()
            );
        }
    }
}

impl Default for CodeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref DEFAULT_CLASSIFIER: CodeClassifier = CodeClassifier::new();
}

/// Classify a scanned code with the default decoder chain.
pub fn classify(code: &str) -> ScanOutcome {
    DEFAULT_CLASSIFIER.classify(code)
}

/// Whether the code is in a German pharma format (IFA PPN or GS1 with `0415`).
pub fn is_pharmaceutical_code(code: &str) -> bool {
    if code.contains(ifa::PRODUCT_MARKER) {
        return true;
    }
    patterns::GS1_GTIN
        .captures_iter(code)
        .any(|c| c.get(1).is_some_and(|m| m.as_str().starts_with(gs1::GERMAN_PHARMA_PREFIX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::Gs1BatchPolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gs1_takes_precedence_over_ifa() {
        let code = "01041501234567889N111427401442";
        let decoded = classify(code).into_decoded().unwrap();
        assert_eq!(decoded.source_format, SourceFormat::Gs1);
        assert_eq!(decoded.pzn.as_deref(), Some("12345678"));
    }

    #[test]
    fn test_non_pharma_gs1_falls_through_to_ifa() {
        let code = "01040012345678909N111427401442";
        let decoded = classify(code).into_decoded().unwrap();
        assert_eq!(decoded.source_format, SourceFormat::IfaPpn);
        assert_eq!(decoded.pzn.as_deref(), Some("14274014"));
    }

    #[test]
    fn test_structured_code_is_not_read_as_barcode() {
        let decoded = classify("9N1112345678991T CH007D260228S998877")
            .into_decoded()
            .unwrap();
        assert_eq!(decoded.source_format, SourceFormat::IfaPpn);
        assert_eq!(decoded.batch.as_deref(), Some("CH007"));
    }

    #[test]
    fn test_direct_pzn() {
        let outcome = classify("  1427401 ");
        let decoded = outcome.decoded().unwrap();
        assert_eq!(decoded.source_format, SourceFormat::Direct);
        assert_eq!(decoded.pzn.as_deref(), Some("01427401"));
        assert_eq!(decoded.raw, "1427401");
    }

    #[test]
    fn test_ean8_hint() {
        let classifier = CodeClassifier::new();
        let outcome = classifier.classify_with_symbology("40123455", Some(Symbology::Ean8));
        assert_eq!(outcome.decoded().unwrap().source_format, SourceFormat::Ean8);
    }

    #[test]
    fn test_unknown_input_is_unrecognized() {
        for code in ["", "   ", "\u{1d}", "hello world", "€€€ 🙂 ÄÖÜ", "9N", "01", "123"] {
            assert_eq!(classify(code), ScanOutcome::Unrecognized, "{:?}", code);
        }
    }

    #[test]
    fn test_from_config() {
        let config = ScanConfig {
            gs1_batch_policy: Gs1BatchPolicy::UntilSeparator,
            ean13_heuristic: false,
            warn_invalid_pzn: false,
        };
        let classifier = CodeClassifier::from_config(&config);

        assert_eq!(classifier.classify("4012345678901"), ScanOutcome::Unrecognized);
        let decoded = classifier
            .classify("010415012345678810CH42\u{1d}17251231")
            .into_decoded()
            .unwrap();
        assert_eq!(decoded.batch.as_deref(), Some("CH42"));
    }

    struct LotLabelDecoder;

    impl CodeDecoder for LotLabelDecoder {
        fn name(&self) -> &'static str {
            "lot_label"
        }

        fn detect(&self, code: &str) -> bool {
            code.starts_with("LOT:")
        }

        fn decode(&self, code: &str, _hint: Option<Symbology>) -> Option<DecodedPharmaCode> {
            let mut decoded = DecodedPharmaCode::new(SourceFormat::Direct, code);
            decoded.batch = Some(code.trim_start_matches("LOT:").to_string());
            Some(decoded)
        }
    }

    #[test]
    fn test_custom_decoder_runs_last() {
        let classifier = CodeClassifier::new().with_decoder(Box::new(LotLabelDecoder));
        assert_eq!(
            classifier.decoder_names(),
            vec!["gs1", "ifa_ppn", "barcode", "lot_label"]
        );

        let decoded = classifier.classify("LOT:AB").into_decoded().unwrap();
        assert_eq!(decoded.batch.as_deref(), Some("AB"));
    }

    #[test]
    fn test_is_pharmaceutical_code() {
        assert!(is_pharmaceutical_code("9N111234567899"));
        assert!(is_pharmaceutical_code("01041501234567881725123110ABC"));
        assert!(!is_pharmaceutical_code("01040012345678901725123110ABC"));
        assert!(!is_pharmaceutical_code("14274014"));
    }

    #[test]
    fn test_scan_outcome_serialization() {
        let json = serde_json::to_value(ScanOutcome::Unrecognized).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unrecognized" }));

        let outcome = classify("14274014");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "decoded");
        assert_eq!(json["source_format"], "direct");
        assert_eq!(json["pzn"], "14274014");
    }
}
