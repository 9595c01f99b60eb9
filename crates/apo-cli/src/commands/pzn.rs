//! PZN command - validate PZNs or extract them from text.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use apo_core::models::pharma::PznValidation;
use apo_core::scan::{validate_pzn, FieldExtractor, PznExtractor};

use super::OutputFormat;

/// Arguments for the pzn command.
#[derive(Args)]
pub struct PznArgs {
    #[command(subcommand)]
    command: PznCommand,
}

#[derive(Subcommand)]
enum PznCommand {
    /// Validate PZN check digits
    Validate {
        /// PZNs (7 or 8 digits)
        #[arg(required = true)]
        pzns: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with an error when any PZN is invalid
        #[arg(long)]
        strict: bool,
    },

    /// Find PZNs in a text file (fax orders, notes)
    Extract {
        /// Text file
        input: PathBuf,

        /// Keep labeled PZNs even when the checksum fails
        #[arg(long)]
        no_validate: bool,
    },
}

pub async fn run(args: PznArgs) -> anyhow::Result<()> {
    match args.command {
        PznCommand::Validate { pzns, format, strict } => validate(&pzns, format, strict),
        PznCommand::Extract { input, no_validate } => extract(&input, !no_validate),
    }
}

fn validate(pzns: &[String], format: OutputFormat, strict: bool) -> anyhow::Result<()> {
    let results: Vec<(&str, PznValidation)> =
        pzns.iter().map(|p| (p.as_str(), validate_pzn(p))).collect();

    match format {
        OutputFormat::Json => {
            let values: Vec<&PznValidation> = results.iter().map(|(_, v)| v).collect();
            println!("{}", serde_json::to_string(&values)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["input", "valid", "normalized", "expected_check_digit", "error"])?;
            for (input, v) in &results {
                wtr.write_record([
                    *input,
                    &v.valid.to_string(),
                    &v.normalized,
                    &v.expected_check_digit.map(|d| d.to_string()).unwrap_or_default(),
                    &v.error.map(|e| e.to_string()).unwrap_or_default(),
                ])?;
            }
            print!("{}", String::from_utf8(wtr.into_inner()?)?);
        }
        OutputFormat::Text => {
            for (input, v) in &results {
                match v.error {
                    None => println!("{} {}", style("✓").green(), v.normalized),
                    Some(error) => println!("{} {} ({})", style("✗").red(), input, error),
                }
            }
        }
    }

    let invalid = results.iter().filter(|(_, v)| !v.valid).count();
    if strict && invalid > 0 {
        anyhow::bail!("{} of {} PZNs invalid", invalid, results.len());
    }

    Ok(())
}

fn extract(input: &Path, validate: bool) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let text = fs::read_to_string(input)?;

    let matches = PznExtractor::new().with_validation(validate).extract_all(&text);
    for m in &matches {
        println!("{}\t{:.2}\t{}", m.value, m.confidence, m.source.trim());
    }

    if matches.is_empty() {
        eprintln!("{} No PZN found", style("ℹ").blue());
    }

    Ok(())
}
