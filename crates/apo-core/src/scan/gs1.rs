//! GS1 element string decoding (DataMatrix on German drug packs).
//!
//! Only GTINs under the German pharma prefix `0415` are accepted; the PZN
//! sits at a fixed offset inside those GTINs.

use tracing::debug;

use super::expiry::apply_expiry;
use super::patterns::{
    GS1_BATCH_TO_END, GS1_BATCH_TO_SEPARATOR, GS1_EXPIRY, GS1_GTIN, GS1_SERIAL,
};
use super::CodeDecoder;
use crate::models::config::Gs1BatchPolicy;
use crate::models::pharma::{DecodedPharmaCode, SourceFormat, Symbology};

/// ASCII group separator (FNC1 in element strings).
pub const GROUP_SEPARATOR: char = '\u{1d}';

/// Delimiter the group separator is normalized to.
pub const FIELD_DELIMITER: char = '|';

/// GTIN prefix reserved for German pharmaceuticals.
pub const GERMAN_PHARMA_PREFIX: &str = "0415";

/// Decoder for GS1 element strings.
#[derive(Debug, Clone, Default)]
pub struct Gs1Decoder {
    batch_policy: Gs1BatchPolicy,
}

impl Gs1Decoder {
    pub fn new(batch_policy: Gs1BatchPolicy) -> Self {
        Self { batch_policy }
    }

    /// Decode a GS1 element string.
    ///
    /// Returns `None` without an AI `01` GTIN or when the GTIN is not a
    /// German pharma GTIN, regardless of any other AIs present.
    pub fn try_parse(&self, code: &str) -> Option<DecodedPharmaCode> {
        let normalized = code.replace(GROUP_SEPARATOR, &FIELD_DELIMITER.to_string());

        let caps = GS1_GTIN.captures(&normalized)?;
        let gtin_match = caps.get(1)?;
        let gtin = gtin_match.as_str();

        if !gtin.starts_with(GERMAN_PHARMA_PREFIX) {
            debug!("GTIN {} is not a German pharma GTIN", gtin);
            return None;
        }

        let mut decoded = DecodedPharmaCode::new(SourceFormat::Gs1, code);
        decoded.gtin = Some(gtin.to_string());
        decoded.pzn = Some(gtin[5..13].to_string());

        // Fields already consumed are blanked out so later AIs cannot
        // match inside them.
        let mut remainder = normalized[gtin_match.end()..].to_string();

        let serial_start = remainder.len() - remainder.trim_start_matches(FIELD_DELIMITER).len();
        let serial = GS1_SERIAL
            .captures(&remainder[serial_start..])
            .and_then(|c| c.get(1))
            .map(|m| (m.end(), m.as_str().to_string()));
        if let Some((end, serial)) = serial {
            decoded.serial_number = Some(serial);
            mask(&mut remainder, serial_start, serial_start + end);
        }

        let expiry = GS1_EXPIRY
            .captures(&remainder)
            .and_then(|c| Some((c.get(0)?.range(), c.get(1)?.as_str().to_string())));
        if let Some((range, raw)) = expiry {
            apply_expiry(&mut decoded, &raw);
            mask(&mut remainder, range.start, range.end);
        }

        let batch_pattern = match self.batch_policy {
            Gs1BatchPolicy::ToEnd => &*GS1_BATCH_TO_END,
            Gs1BatchPolicy::UntilSeparator => &*GS1_BATCH_TO_SEPARATOR,
        };
        if let Some(batch) = batch_pattern.captures(&remainder).and_then(|c| c.get(1)) {
            decoded.batch = Some(batch.as_str().to_string());
        }

        Some(decoded)
    }
}

/// Replace `start..end` with delimiters, keeping byte offsets intact.
fn mask(text: &mut String, start: usize, end: usize) {
    let filler = FIELD_DELIMITER.to_string().repeat(end - start);
    text.replace_range(start..end, &filler);
}

impl CodeDecoder for Gs1Decoder {
    fn name(&self) -> &'static str {
        "gs1"
    }

    fn detect(&self, code: &str) -> bool {
        GS1_GTIN.is_match(code)
    }

    fn decode(&self, code: &str, _hint: Option<Symbology>) -> Option<DecodedPharmaCode> {
        self.try_parse(code)
    }
}

/// Decode a GS1 element string with the default batch policy.
pub fn parse_gs1(code: &str) -> Option<DecodedPharmaCode> {
    Gs1Decoder::default().try_parse(code)
}
