//! Decoded drug package codes and PZN validation results.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PznError;
use crate::scan::pzn::validate_pzn;

/// Encoding a scanned code was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// GS1 element string (DataMatrix) with a German pharma GTIN.
    Gs1,
    /// IFA PPN / securPharm data identifiers.
    IfaPpn,
    /// EAN-13 barcode with a heuristic PZN candidate.
    Ean13,
    /// EAN-8 barcode.
    Ean8,
    /// Bare 7-8 digit PZN.
    Direct,
}

impl SourceFormat {
    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gs1 => "GS1",
            Self::IfaPpn => "IFA PPN",
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::Direct => "PZN",
        }
    }

    /// Whether the format carries self-describing markers.
    ///
    /// Only structured formats identify a pharmaceutical package with
    /// certainty; the barcode formats yield candidate PZNs.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Gs1 | Self::IfaPpn)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Symbology reported by the scanning device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbology {
    QrCode,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code128,
    Code39,
    Code93,
    Codabar,
    Itf,
    DataMatrix,
    Pdf417,
    Aztec,
}

impl Symbology {
    /// Parse the scanner's type name (e.g. `EAN_13`, `DATA_MATRIX`).
    pub fn from_scanner_name(name: &str) -> Option<Self> {
        let symbology = match name.trim().to_ascii_uppercase().as_str() {
            "QR_CODE" => Self::QrCode,
            "EAN_13" => Self::Ean13,
            "EAN_8" => Self::Ean8,
            "UPC_A" => Self::UpcA,
            "UPC_E" => Self::UpcE,
            "CODE_128" => Self::Code128,
            "CODE_39" => Self::Code39,
            "CODE_93" => Self::Code93,
            "CODABAR" => Self::Codabar,
            "ITF" => Self::Itf,
            "DATA_MATRIX" => Self::DataMatrix,
            "PDF_417" => Self::Pdf417,
            "AZTEC" => Self::Aztec,
            _ => return None,
        };
        Some(symbology)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::QrCode => "QR",
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Code128 => "Code-128",
            Self::Code39 => "Code-39",
            Self::Code93 => "Code-93",
            Self::Codabar => "Codabar",
            Self::Itf => "ITF",
            Self::DataMatrix => "DataMatrix",
            Self::Pdf417 => "PDF417",
            Self::Aztec => "Aztec",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A successfully decoded drug package code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPharmaCode {
    /// Encoding the code was decoded from.
    pub source_format: SourceFormat,

    /// GTIN-14 (always 14 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,

    /// Pharmazentralnummer (always 8 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pzn: Option<String>,

    /// Batch / lot number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,

    /// Expiry as printed, `YYMMDD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_raw: Option<String>,

    /// Expiry as a calendar date (`00` day resolved to the month's last day).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    /// Package serial number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    /// Scanned payload this record was decoded from.
    pub raw: String,
}

impl DecodedPharmaCode {
    /// Create an empty record for the given format.
    pub fn new(source_format: SourceFormat, raw: impl Into<String>) -> Self {
        Self {
            source_format,
            gtin: None,
            pzn: None,
            batch: None,
            expiry_raw: None,
            expiry_date: None,
            serial_number: None,
            raw: raw.into(),
        }
    }

    /// Whether the code identifies a pharmaceutical package with certainty.
    pub fn is_pharmaceutical(&self) -> bool {
        self.source_format.is_structured()
    }

    /// Run the PZN checksum over the decoded PZN, if any.
    pub fn pzn_validation(&self) -> Option<PznValidation> {
        self.pzn.as_deref().map(validate_pzn)
    }

    /// Expiry formatted as `DD.MM.YYYY`.
    pub fn expiry_display(&self) -> Option<String> {
        self.expiry_date.map(|d| d.format("%d.%m.%Y").to_string())
    }

    /// One-line summary, e.g. `PZN 12345678 | Ch. X1 | Verfall 31.12.2025`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(pzn) = &self.pzn {
            parts.push(format!("PZN {}", pzn));
        }
        if let Some(batch) = &self.batch {
            parts.push(format!("Ch. {}", batch));
        }
        if let Some(expiry) = self.expiry_display() {
            parts.push(format!("Verfall {}", expiry));
        }
        parts.join(" | ")
    }
}

/// Outcome of a PZN checksum validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PznValidation {
    /// Whether the check digit matches.
    pub valid: bool,

    /// Input digits, always 8 characters.
    pub normalized: String,

    /// Computed check digit, set when it disagrees with the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_check_digit: Option<u8>,

    /// Why validation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PznError>,
}

impl PznValidation {
    pub(crate) fn ok(normalized: String) -> Self {
        Self {
            valid: true,
            normalized,
            expected_check_digit: None,
            error: None,
        }
    }

    pub(crate) fn failed(normalized: String, error: PznError) -> Self {
        let expected_check_digit = match error {
            PznError::CheckDigitMismatch { expected, .. } => Some(expected),
            _ => None,
        };
        Self {
            valid: false,
            normalized,
            expected_check_digit,
            error: Some(error),
        }
    }
}
