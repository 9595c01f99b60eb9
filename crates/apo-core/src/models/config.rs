//! Configuration structures for code decoding and manifest parsing.

use serde::{Deserialize, Serialize};

/// Main configuration for the apo pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApoConfig {
    /// Code decoding configuration.
    pub scan: ScanConfig,

    /// Manifest parsing configuration.
    pub manifest: ManifestConfig,
}

/// How the GS1 batch field (AI 10) is terminated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gs1BatchPolicy {
    /// Batch runs to the end of the element string.
    #[default]
    ToEnd,
    /// Batch ends at the next group separator or the end of the string.
    UntilSeparator,
}

/// Code decoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Termination rule for the GS1 batch field.
    pub gs1_batch_policy: Gs1BatchPolicy,

    /// Derive a candidate PZN from German EAN-13 barcodes.
    pub ean13_heuristic: bool,

    /// Log a warning when a decoded PZN fails its checksum.
    pub warn_invalid_pzn: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            gs1_batch_policy: Gs1BatchPolicy::ToEnd,
            ean13_heuristic: true,
            warn_invalid_pzn: true,
        }
    }
}

/// Manifest parsing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifests larger than this are rejected with an empty result.
    pub max_input_bytes: usize,

    /// Layout-specific pattern overrides.
    pub patterns: PatternOverrides,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 4 * 1024 * 1024,
            patterns: PatternOverrides::default(),
        }
    }
}

/// Regex overrides for manifest layouts that differ from the default report.
///
/// Unset fields keep the built-in pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternOverrides {
    /// Report banner lines dropped by the normalizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_boilerplate: Option<String>,

    /// Tour name; capture group 1 is the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_name: Option<String>,

    /// Tour date; capture groups 1-3 are day, month and year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_date: Option<String>,

    /// Start of delivery notes; capture group 1 is the inline note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_label: Option<String>,

    /// Recipient line closing the notes; capture group 1 is trailing text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_label: Option<String>,

    /// Lines that end note collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_section_break: Option<String>,

    /// Keywords marking a wrapped article name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_continuation: Option<String>,
}

impl ApoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
