//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod manifest;
pub mod pzn;
pub mod scan;

use std::fs;
use std::path::Path;

use apo_core::models::config::ApoConfig;
use apo_core::pdf::{PdfProcessor, PdfTextExtractor};
use tracing::debug;

/// Output format shared by all commands.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// Load the config file given with `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ApoConfig> {
    match config_path {
        Some(path) => Ok(ApoConfig::from_file(Path::new(path))?),
        None => Ok(ApoConfig::default()),
    }
}

/// Read manifest text from a PDF text layer or a plain text file.
pub fn read_manifest_text(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let extractor = PdfTextExtractor::from_bytes(&data)?;
            debug!("PDF has {} pages", extractor.page_count());
            let text = extractor.extract_manifest_text()?;
            if text.trim().is_empty() {
                anyhow::bail!(
                    "PDF has no text layer: {} (run OCR and pass the text file instead)",
                    path.display()
                );
            }
            text
        }
        "txt" | "text" | "" => fs::read_to_string(path)?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    Ok(text)
}
