//! IFA PPN (securPharm) code decoding.
//!
//! Two layouts are seen on packs: data identifiers separated by ASCII control
//! characters (the ISO 15434 envelope), and a flat string where the markers
//! themselves delimit the fields. Both carry the PZN inside the `9N` product
//! code: `11` + 8-digit PZN + 2-digit trailer.

use std::ops::Range;

use tracing::trace;

use super::expiry::apply_expiry;
use super::patterns::IFA_EXPIRY;
use super::CodeDecoder;
use crate::models::pharma::{DecodedPharmaCode, SourceFormat, Symbology};

/// Product code marker.
pub const PRODUCT_MARKER: &str = "9N";
const PPN_PREFIX: &str = "11";
const PRODUCT_CODE_LEN: usize = 12;
const MIN_PRODUCT_CODE_LEN: usize = 10;

const BATCH_MARKER: &str = "1T";
const SERIAL_MARKER: &str = "S";
const EXPIRY_MARKER: &str = "D";

const GROUP_SEPARATOR: char = '\u{1d}';
const RECORD_SEPARATOR: char = '\u{1e}';

/// Decoder for IFA PPN codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfaPpnDecoder;

impl IfaPpnDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode an IFA PPN string; `None` when no PZN can be read.
    pub fn try_parse(&self, code: &str) -> Option<DecodedPharmaCode> {
        let (pzn, token) = product_code(code)?;

        let mut decoded = DecodedPharmaCode::new(SourceFormat::IfaPpn, code);
        decoded.pzn = Some(pzn);

        if code.contains([GROUP_SEPARATOR, RECORD_SEPARATOR]) {
            trace!("IFA code with control-character separators");
            read_segments(code, &mut decoded);
        } else {
            read_markers(code, token, &mut decoded);
        }

        Some(decoded)
    }
}

impl CodeDecoder for IfaPpnDecoder {
    fn name(&self) -> &'static str {
        "ifa_ppn"
    }

    fn detect(&self, code: &str) -> bool {
        code.contains(PRODUCT_MARKER)
    }

    fn decode(&self, code: &str, _hint: Option<Symbology>) -> Option<DecodedPharmaCode> {
        self.try_parse(code)
    }
}

/// Decode an IFA PPN string.
pub fn parse_ifa_ppn(code: &str) -> Option<DecodedPharmaCode> {
    IfaPpnDecoder.try_parse(code)
}

/// Locate the `9N` product code and return the PZN with the byte range of
/// the whole token.
fn product_code(code: &str) -> Option<(String, Range<usize>)> {
    let start = code.find(PRODUCT_MARKER)?;
    let after = start + PRODUCT_MARKER.len();

    let product: String = code[after..]
        .chars()
        .take_while(|c| !c.is_ascii_control())
        .take(PRODUCT_CODE_LEN)
        .collect();

    if product.chars().count() < MIN_PRODUCT_CODE_LEN || !product.starts_with(PPN_PREFIX) {
        trace!("9N product code {:?} is not a PPN", product);
        return None;
    }

    let pzn: String = product.chars().skip(PPN_PREFIX.len()).take(8).collect();
    if pzn.len() != 8 || !pzn.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // The trailer only belongs to the token when both characters are digits,
    // so a marker right after the PZN stays visible.
    let trailer = &product.as_bytes()[MIN_PRODUCT_CODE_LEN..];
    let token_len = if trailer.len() == PRODUCT_CODE_LEN - MIN_PRODUCT_CODE_LEN
        && trailer.iter().all(u8::is_ascii_digit)
    {
        PRODUCT_CODE_LEN
    } else {
        MIN_PRODUCT_CODE_LEN
    };

    Some((pzn, start..after + token_len))
}

/// Read data identifiers from control-character separated segments.
fn read_segments(code: &str, decoded: &mut DecodedPharmaCode) {
    for segment in code.split(|c: char| c.is_ascii_control()).map(str::trim) {
        if segment.starts_with(PRODUCT_MARKER) {
            continue;
        }
        if let Some(batch) = segment.strip_prefix(BATCH_MARKER) {
            decoded.batch = non_empty(batch);
        } else if let Some(expiry) = segment.strip_prefix(EXPIRY_MARKER) {
            if expiry.len() == 6 && expiry.bytes().all(|b| b.is_ascii_digit()) {
                apply_expiry(decoded, expiry);
            }
        } else if let Some(serial) = segment.strip_prefix(SERIAL_MARKER) {
            decoded.serial_number = non_empty(serial);
        }
    }
}

/// Read fields from a flat string where markers delimit values.
fn read_markers(code: &str, token: Range<usize>, decoded: &mut DecodedPharmaCode) {
    if let Some(pos) = find_marker(code, BATCH_MARKER, &token) {
        decoded.batch = field_value(
            code,
            pos + BATCH_MARKER.len(),
            &[EXPIRY_MARKER, SERIAL_MARKER, PRODUCT_MARKER],
        );
    }

    if let Some(raw) = IFA_EXPIRY
        .captures_iter(code)
        .filter(|c| c.get(0).is_some_and(|m| !overlaps(&m.range(), &token)))
        .find_map(|c| c.get(1))
    {
        apply_expiry(decoded, raw.as_str());
    }

    if let Some(pos) = find_marker(code, SERIAL_MARKER, &token) {
        decoded.serial_number = field_value(
            code,
            pos + SERIAL_MARKER.len(),
            &[BATCH_MARKER, EXPIRY_MARKER, PRODUCT_MARKER],
        );
    }
}

/// First occurrence of `marker` outside the product code token.
fn find_marker(code: &str, marker: &str, token: &Range<usize>) -> Option<usize> {
    code.match_indices(marker)
        .map(|(pos, _)| pos)
        .find(|pos| !overlaps(&(*pos..pos + marker.len()), token))
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Value starting at `start` up to the first terminator, trimmed.
fn field_value(code: &str, start: usize, terminators: &[&str]) -> Option<String> {
    let rest = code.get(start..)?;
    let end = terminators
        .iter()
        .filter_map(|t| rest.find(t))
        .min()
        .unwrap_or(rest.len());
    non_empty(&rest[..end])
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flat_ppn() {
        let code = "9N1112345678991T CH007D260228S998877";
        let decoded = parse_ifa_ppn(code).unwrap();

        assert_eq!(decoded.source_format, SourceFormat::IfaPpn);
        assert_eq!(decoded.pzn.as_deref(), Some("12345678"));
        assert_eq!(decoded.batch.as_deref(), Some("CH007"));
        assert_eq!(decoded.expiry_raw.as_deref(), Some("260228"));
        assert_eq!(decoded.expiry_date, NaiveDate::from_ymd_opt(2026, 2, 28));
        assert_eq!(decoded.serial_number.as_deref(), Some("998877"));
        assert_eq!(decoded.gtin, None);
    }

    #[test]
    fn test_parse_envelope_ppn() {
        let code = "[)>\u{1e}06\u{1d}9N111427401442\u{1d}1T12345ABCDE\u{1d}D250600\u{1d}S12345ABCDEF98765\u{1e}\u{04}";
        let decoded = parse_ifa_ppn(code).unwrap();

        assert_eq!(decoded.pzn.as_deref(), Some("14274014"));
        assert_eq!(decoded.batch.as_deref(), Some("12345ABCDE"));
        assert_eq!(decoded.expiry_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(decoded.serial_number.as_deref(), Some("12345ABCDEF98765"));
    }

    #[test]
    fn test_pzn_only() {
        let decoded = parse_ifa_ppn("9N111234567899").unwrap();
        assert_eq!(decoded.pzn.as_deref(), Some("12345678"));
        assert_eq!(decoded.batch, None);
        assert_eq!(decoded.expiry_date, None);
        assert_eq!(decoded.serial_number, None);
    }

    #[test]
    fn test_short_product_code_without_trailer() {
        let decoded = parse_ifa_ppn("9N1112345678").unwrap();
        assert_eq!(decoded.pzn.as_deref(), Some("12345678"));

        let decoded = parse_ifa_ppn("9N11123456781TCH5D260228").unwrap();
        assert_eq!(decoded.pzn.as_deref(), Some("12345678"));
        assert_eq!(decoded.batch.as_deref(), Some("CH5"));
        assert_eq!(decoded.expiry_date, NaiveDate::from_ymd_opt(2026, 2, 28));

        let decoded = parse_ifa_ppn("9N1112345678S998877").unwrap();
        assert_eq!(decoded.pzn.as_deref(), Some("12345678"));
        assert_eq!(decoded.serial_number.as_deref(), Some("998877"));
        assert_eq!(decoded.batch, None);
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        assert_eq!(parse_ifa_ppn("9N121234567899D260228"), None);
    }

    #[test]
    fn test_missing_product_code_rejected() {
        assert_eq!(parse_ifa_ppn("1TCH007D260228S998877"), None);
        assert_eq!(parse_ifa_ppn("9N11123"), None);
        assert_eq!(parse_ifa_ppn("9N11ABCDEFGH99"), None);
    }

    #[test]
    fn test_serial_before_batch() {
        let decoded = parse_ifa_ppn("9N111234567899SXYZ1T LOT5 D251100").unwrap();
        assert_eq!(decoded.serial_number.as_deref(), Some("XYZ"));
        assert_eq!(decoded.batch.as_deref(), Some("LOT5"));
        assert_eq!(decoded.expiry_date, NaiveDate::from_ymd_opt(2025, 11, 30));
    }

    #[test]
    fn test_trailing_newline_keeps_flat_layout() {
        let decoded = parse_ifa_ppn("9N1112345678991TCH1D260228\r\n").unwrap();
        assert_eq!(decoded.batch.as_deref(), Some("CH1"));
        assert_eq!(decoded.expiry_date, NaiveDate::from_ymd_opt(2026, 2, 28));
    }

    #[test]
    fn test_unicode_input_does_not_panic() {
        assert_eq!(parse_ifa_ppn("9Nüüüüüüüüüüüü"), None);
        assert!(parse_ifa_ppn("9N1112345678ä9S€1").is_some());
    }
}
