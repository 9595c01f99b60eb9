//! Core library for pharmacy back-office extraction.
//!
//! This crate provides:
//! - Drug package code decoding (GS1 DataMatrix, IFA PPN / securPharm, EAN, bare PZN)
//! - PZN (Pharmazentralnummer) checksum validation
//! - Delivery manifest parsing (stops, addresses, cash amounts, article lines)
//! - PDF text-layer extraction for manifest files (feature `pdf`)
//!
//! All decoding and parsing entry points are pure functions over `&str`:
//! malformed input yields "unrecognized" or an empty result, never an error.

pub mod error;
pub mod models;
pub mod scan;
pub mod manifest;
#[cfg(feature = "pdf")]
pub mod pdf;

pub use error::{ApoError, PdfError, PznError, Result};
pub use models::config::ApoConfig;
pub use models::pharma::{DecodedPharmaCode, PznValidation, SourceFormat, Symbology};
pub use models::tour::{ArticleLine, DeliveryStop, ManifestParseResult};
pub use scan::{classify, validate_pzn, CodeClassifier, CodeDecoder, ScanOutcome};
pub use manifest::{parse_manifest, ManifestParser, ManifestRules};
#[cfg(feature = "pdf")]
pub use pdf::{PdfProcessor, PdfTextExtractor};
