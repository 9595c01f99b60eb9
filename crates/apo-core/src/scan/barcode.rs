//! Fallback decoding of linear barcodes and bare PZNs.

use tracing::debug;

use super::pzn::format_pzn;
use super::CodeDecoder;
use crate::models::pharma::{DecodedPharmaCode, SourceFormat, Symbology};

/// Decoder for digit-only payloads (EAN-13, EAN-8, bare PZN).
///
/// The PZN derived from an EAN-13 is a candidate only: German pharma EANs
/// are not guaranteed to embed the PZN at a fixed offset.
#[derive(Debug, Clone)]
pub struct BarcodeDecoder {
    ean13_heuristic: bool,
}

impl BarcodeDecoder {
    pub fn new(ean13_heuristic: bool) -> Self {
        Self { ean13_heuristic }
    }
}

impl Default for BarcodeDecoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CodeDecoder for BarcodeDecoder {
    fn name(&self) -> &'static str {
        "barcode"
    }

    fn detect(&self, code: &str) -> bool {
        code.chars().any(|c| c.is_ascii_digit())
    }

    fn decode(&self, code: &str, hint: Option<Symbology>) -> Option<DecodedPharmaCode> {
        let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();

        match digits.len() {
            8 if hint == Some(Symbology::Ean8) => {
                let mut decoded = DecodedPharmaCode::new(SourceFormat::Ean8, code);
                decoded.pzn = Some(digits);
                Some(decoded)
            }
            7 | 8 => {
                let mut decoded = DecodedPharmaCode::new(SourceFormat::Direct, code);
                decoded.pzn = format_pzn(&digits);
                Some(decoded)
            }
            13 if self.ean13_heuristic && digits.starts_with('4') => {
                debug!("EAN-13 {} yields a candidate PZN only", digits);
                let mut decoded = DecodedPharmaCode::new(SourceFormat::Ean13, code);
                decoded.pzn = Some(digits[1..9].to_string());
                decoded.gtin = Some(format!("0{}", digits));
                Some(decoded)
            }
            _ => None,
        }
    }
}
