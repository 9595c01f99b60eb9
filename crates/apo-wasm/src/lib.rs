//! WASM bindings for drug package code decoding and manifest parsing.
//!
//! Used by the browser dashboard: the camera scanner hands decoded payloads
//! to `classifyCode`, the tour import hands PDF/OCR text to `parseManifest`.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use apo_core::manifest::{format_german_amount, parse_german_amount, ManifestParser};
use apo_core::models::config::ApoConfig;
use apo_core::models::pharma::Symbology;
use apo_core::scan::{self, decode_expiry, CodeClassifier};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_symbology(symbology: Option<String>) -> Result<Option<Symbology>, JsValue> {
    match symbology {
        Some(name) => Symbology::from_scanner_name(&name)
            .map(Some)
            .ok_or_else(|| JsValue::from_str(&format!("unknown symbology: {}", name))),
        None => Ok(None),
    }
}

/// Classify a scanned code.
///
/// Returns `{ status: "decoded", source_format, pzn, ... }` or
/// `{ status: "unrecognized" }`.
#[wasm_bindgen(js_name = classifyCode)]
pub fn classify_code(code: &str, symbology: Option<String>) -> Result<JsValue, JsValue> {
    let hint = parse_symbology(symbology)?;
    let outcome = CodeClassifier::new().classify_with_symbology(code, hint);
    to_js(&outcome)
}

/// Validate a PZN; returns `{ valid, normalized, expected_check_digit?, error? }`.
#[wasm_bindgen(js_name = validatePzn)]
pub fn validate_pzn(pzn: &str) -> Result<JsValue, JsValue> {
    to_js(&scan::validate_pzn(pzn))
}

/// Whether a PZN has a correct check digit.
#[wasm_bindgen(js_name = isValidPzn)]
pub fn is_valid_pzn(pzn: &str) -> bool {
    scan::is_valid_pzn(pzn)
}

/// Whether a payload is in a German pharma format (IFA PPN or GS1 `0415`).
#[wasm_bindgen(js_name = isPharmaceuticalCode)]
pub fn is_pharmaceutical_code(code: &str) -> bool {
    scan::is_pharmaceutical_code(code)
}

/// Parse manifest text with the default layout.
#[wasm_bindgen(js_name = parseManifest)]
pub fn parse_manifest(text: &str) -> Result<JsValue, JsValue> {
    to_js(&apo_core::parse_manifest(text))
}

/// Manifest importer with configurable layout and fallback date.
#[wasm_bindgen]
pub struct ManifestImporter {
    parser: ManifestParser,
}

#[wasm_bindgen]
impl ManifestImporter {
    /// Create an importer for the default report layout.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: ManifestParser::new(),
        }
    }

    /// Create an importer from an `ApoConfig` JSON document.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config_json: &str) -> Result<ManifestImporter, JsValue> {
        let config: ApoConfig =
            serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let parser = ManifestParser::from_config(&config.manifest)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { parser })
    }

    /// Tour date used when the manifest has none (`YYYY-MM-DD`).
    #[wasm_bindgen(js_name = setFallbackDate)]
    pub fn set_fallback_date(&mut self, date: &str) -> Result<(), JsValue> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| JsValue::from_str(&format!("invalid date '{}': {}", date, e)))?;
        self.parser = self.parser.clone().with_fallback_date(date);
        Ok(())
    }

    /// Parse manifest text.
    #[wasm_bindgen]
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(text))
    }

    /// Parse and return only the stop count, for previews.
    #[wasm_bindgen(js_name = countStops)]
    pub fn count_stops(&self, text: &str) -> usize {
        self.parser.parse(text).stops.len()
    }
}

impl Default for ManifestImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Formatting helpers for the dashboard.
#[wasm_bindgen]
pub struct PharmaUtils;

#[wasm_bindgen]
impl PharmaUtils {
    /// Zero-padded 8-digit PZN, or undefined without digits.
    #[wasm_bindgen(js_name = formatPzn)]
    pub fn format_pzn(pzn: &str) -> Option<String> {
        scan::format_pzn(pzn)
    }

    /// `YYMMDD` expiry as `DD.MM.YYYY`.
    #[wasm_bindgen(js_name = formatExpiry)]
    pub fn format_expiry(raw: &str) -> Option<String> {
        decode_expiry(raw).map(|d| d.format("%d.%m.%Y").to_string())
    }

    /// Display label for a scanner symbology name (e.g. `EAN_13` -> `EAN-13`).
    #[wasm_bindgen(js_name = symbologyLabel)]
    pub fn symbology_label(name: &str) -> Option<String> {
        Symbology::from_scanner_name(name).map(|s| s.label().to_string())
    }

    /// Format an amount German style (1.234,56).
    #[wasm_bindgen(js_name = formatAmount)]
    pub fn format_amount(amount: f64) -> String {
        Decimal::try_from(amount)
            .map(format_german_amount)
            .unwrap_or_default()
    }

    /// Parse a German-formatted amount (e.g. "1.234,56").
    #[wasm_bindgen(js_name = parseAmount)]
    pub fn parse_amount(amount: &str) -> Option<f64> {
        parse_german_amount(amount).and_then(|d| d.to_f64())
    }
}
