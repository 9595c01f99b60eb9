//! Regex patterns for drug package codes.
//!
//! Digit classes are spelled `[0-9]` so captured values are always ASCII
//! and safe to slice by byte offset.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // GS1 element string (after group separators were replaced by `|`)
    pub static ref GS1_GTIN: Regex = Regex::new(r"01([0-9]{14})").unwrap();

    pub static ref GS1_SERIAL: Regex = Regex::new(
        r"^21([A-Za-z0-9]+?)(?:\||17|10|$)"
    ).unwrap();

    pub static ref GS1_EXPIRY: Regex = Regex::new(r"17([0-9]{6})").unwrap();

    pub static ref GS1_BATCH_TO_END: Regex = Regex::new(r"10([A-Za-z0-9]+)$").unwrap();

    pub static ref GS1_BATCH_TO_SEPARATOR: Regex = Regex::new(
        r"10([A-Za-z0-9]+)(?:\||$)"
    ).unwrap();

    // IFA PPN expiry data identifier
    pub static ref IFA_EXPIRY: Regex = Regex::new(r"D([0-9]{6})").unwrap();

    // PZN in free text
    pub static ref PZN_LABELED: Regex = Regex::new(
        r"(?i)\bPZN[\s:.\-]*([0-9]{7,8})\b"
    ).unwrap();

    pub static ref PZN_STANDALONE: Regex = Regex::new(r"\b([0-9]{8})\b").unwrap();
}
