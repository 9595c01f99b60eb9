//! Error types for the apo-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the apo library.
///
/// Decoding and manifest parsing never fail; only configuration and
/// document loading produce these.
#[derive(Error, Debug)]
pub enum ApoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// A configured pattern override did not compile.
    #[error("invalid pattern for {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Reason a PZN failed validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PznError {
    /// Digit count outside 7..=8.
    #[error("invalid length: {0} digits (expected 7-8)")]
    InvalidLength(usize),

    /// The weighted sum is 10 mod 11, no single check digit exists.
    #[error("check digit would be 10")]
    CheckDigitTen,

    /// Check digit present but wrong.
    #[error("check digit mismatch (is {actual}, expected {expected})")]
    CheckDigitMismatch { expected: u8, actual: u8 },
}

/// Result type for the apo library.
pub type Result<T> = std::result::Result<T, ApoError>;
