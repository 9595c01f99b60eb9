//! Scan command - decode drug package codes.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use apo_core::models::pharma::{DecodedPharmaCode, Symbology};
use apo_core::scan::{CodeClassifier, ScanOutcome};

use super::{load_config, OutputFormat};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Scanned codes; `<GS>`, `<RS>` and `<EOT>` stand for the control characters
    codes: Vec<String>,

    /// Read codes from a file, one per line (default: stdin when no codes are given)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Symbology reported by the scanner (e.g. EAN_8, DATA_MATRIX)
    #[arg(short, long)]
    symbology: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Exit with an error when a code is not recognized
    #[arg(long)]
    strict: bool,
}

/// One classified code.
#[derive(Debug, Serialize)]
struct ScanRecord {
    input: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoded: Option<DecodedPharmaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pzn_valid: Option<bool>,
}

impl ScanRecord {
    fn new(input: String, outcome: ScanOutcome) -> Self {
        let decoded = outcome.into_decoded();
        let pzn_valid = decoded
            .as_ref()
            .and_then(|d| d.pzn_validation())
            .map(|v| v.valid);
        Self {
            input,
            status: if decoded.is_some() { "decoded" } else { "unrecognized" },
            decoded,
            pzn_valid,
        }
    }
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let classifier = CodeClassifier::from_config(&config.scan);

    let hint = match args.symbology.as_deref() {
        Some(name) => Some(
            Symbology::from_scanner_name(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown symbology: {}", name))?,
        ),
        None => None,
    };

    let codes = collect_codes(&args)?;
    if codes.is_empty() {
        anyhow::bail!("No codes given");
    }
    info!("Classifying {} codes", codes.len());

    let records: Vec<ScanRecord> = codes
        .into_iter()
        .map(|input| {
            let outcome = classifier.classify_with_symbology(&expand_separators(&input), hint);
            debug!("{} -> {:?}", input, outcome.is_recognized());
            ScanRecord::new(input, outcome)
        })
        .collect();

    println!("{}", format_records(&records, args.format)?);

    let unrecognized = records.iter().filter(|r| r.decoded.is_none()).count();
    if args.strict && unrecognized > 0 {
        anyhow::bail!("{} of {} codes not recognized", unrecognized, records.len());
    }

    Ok(())
}

fn collect_codes(args: &ScanArgs) -> anyhow::Result<Vec<String>> {
    if !args.codes.is_empty() {
        return Ok(args.codes.clone());
    }

    let lines: Vec<String> = match &args.input {
        Some(path) => fs::read_to_string(path)?.lines().map(str::to_string).collect(),
        None => io::stdin().lock().lines().collect::<Result<_, _>>()?,
    };

    Ok(lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect())
}

/// Replace the printable placeholders scanners and docs use for control characters.
fn expand_separators(code: &str) -> String {
    code.replace("<GS>", "\u{1d}")
        .replace("<RS>", "\u{1e}")
        .replace("<EOT>", "\u{04}")
}

fn format_records(records: &[ScanRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

fn format_csv(records: &[ScanRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "input",
        "status",
        "format",
        "gtin",
        "pzn",
        "pzn_valid",
        "batch",
        "expiry",
        "serial_number",
    ])?;

    for record in records {
        let decoded = record.decoded.as_ref();
        let field = |f: fn(&DecodedPharmaCode) -> Option<String>| decoded.and_then(f).unwrap_or_default();

        wtr.write_record([
            record.input.as_str(),
            record.status,
            &field(|d| Some(d.source_format.label().to_string())),
            &field(|d| d.gtin.clone()),
            &field(|d| d.pzn.clone()),
            &record.pzn_valid.map(|v| v.to_string()).unwrap_or_default(),
            &field(|d| d.batch.clone()),
            &field(|d| d.expiry_date.map(|e| e.to_string())),
            &field(|d| d.serial_number.clone()),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[ScanRecord]) -> String {
    let mut output = String::new();

    for record in records {
        match &record.decoded {
            Some(decoded) => {
                let mut line = format!("{}: {}", decoded.source_format, decoded.summary());
                if record.pzn_valid == Some(false) {
                    line.push_str(" (PZN invalid)");
                }
                output.push_str(&line);
            }
            None => output.push_str(&format!("{}: unrecognized", record.input.trim())),
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_separators() {
        assert_eq!(
            expand_separators("[)><RS>06<GS>9N111427401442<RS><EOT>"),
            "[)>\u{1e}06\u{1d}9N111427401442\u{1e}\u{04}"
        );
    }

    #[test]
    fn test_text_output() {
        let records = vec![
            ScanRecord::new("14274014".to_string(), apo_core::classify("14274014")),
            ScanRecord::new("hello".to_string(), apo_core::classify("hello")),
        ];
        assert_eq!(format_text(&records), "PZN: PZN 14274014\nhello: unrecognized");
    }
}
