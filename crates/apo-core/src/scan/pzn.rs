//! PZN (Pharmazentralnummer) validation and extraction.

use super::patterns::{PZN_LABELED, PZN_STANDALONE};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::PznError;
use crate::models::pharma::PznValidation;

/// Length of a normalized PZN.
pub const PZN_LENGTH: usize = 8;

/// Validate a PZN using the mod-11 checksum.
///
/// The input may contain separators; only ASCII digits are considered.
/// PZN format: 7 or 8 digits, left-padded to 8, where the 8th digit is the
/// check digit. Weights: 1, 2, 3, 4, 5, 6, 7.
pub fn validate_pzn(input: &str) -> PznValidation {
    let digits = ascii_digits(input);
    let normalized = normalize_digits(&digits);

    if !(7..=PZN_LENGTH).contains(&digits.len()) {
        return PznValidation::failed(normalized, PznError::InvalidLength(digits.len()));
    }

    let values: Vec<u8> = normalized.bytes().map(|b| b - b'0').collect();
    let actual = values[PZN_LENGTH - 1];

    match compute_check_digit(&values) {
        None => PznValidation::failed(normalized, PznError::CheckDigitTen),
        Some(expected) if expected == actual => PznValidation::ok(normalized),
        Some(expected) => PznValidation::failed(
            normalized,
            PznError::CheckDigitMismatch { expected, actual },
        ),
    }
}

/// Whether the input is a valid PZN.
pub fn is_valid_pzn(input: &str) -> bool {
    validate_pzn(input).valid
}

/// Compute the check digit over the first seven digit values.
///
/// Returns `None` when the weighted sum is 10 mod 11; such prefixes have no
/// valid PZN.
pub fn compute_check_digit(digits: &[u8]) -> Option<u8> {
    if digits.len() < 7 {
        return None;
    }

    let sum: u32 = digits
        .iter()
        .take(7)
        .zip(1u32..)
        .map(|(d, w)| u32::from(*d) * w)
        .sum();

    match sum % 11 {
        10 => None,
        check => Some(check as u8),
    }
}

/// Format a PZN for display: digits only, exactly 8 characters.
pub fn format_pzn(input: &str) -> Option<String> {
    let digits = ascii_digits(input);
    if digits.is_empty() {
        return None;
    }
    Some(normalize_digits(&digits))
}

fn ascii_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Left-pad to 8 digits; longer runs keep their last 8 digits.
fn normalize_digits(digits: &str) -> String {
    if digits.len() >= PZN_LENGTH {
        digits[digits.len() - PZN_LENGTH..].to_string()
    } else {
        format!("{:0>width$}", digits, width = PZN_LENGTH)
    }
}

/// PZN field extractor for free text (fax orders, notes).
pub struct PznExtractor {
    validate: bool,
}

impl PznExtractor {
    /// Create a new PZN extractor.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate PZN checksums.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn accept(&self, pzn: &str) -> bool {
        !self.validate || is_valid_pzn(pzn)
    }
}

impl Default for PznExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PznExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for caps in PZN_LABELED.captures_iter(text) {
            let (Some(full), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let pzn = normalize_digits(value.as_str());
            if self.accept(&pzn) {
                results.push(
                    ExtractionMatch::new(pzn, 0.95, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        // Unlabeled 8-digit runs only count with a valid checksum
        for caps in PZN_STANDALONE.captures_iter(text) {
            let (Some(full), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let pzn = value.as_str().to_string();
            if results.iter().any(|r| r.value == pzn) || !is_valid_pzn(&pzn) {
                continue;
            }
            results.push(
                ExtractionMatch::new(pzn, 0.6, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }

        results
    }
}

/// Extract the first PZN from text.
pub fn extract_pzn(text: &str) -> Option<String> {
    PznExtractor::new().extract(text).map(|m| m.value)
}
