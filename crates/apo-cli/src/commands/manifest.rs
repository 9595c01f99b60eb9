//! Manifest command - parse a single delivery manifest.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::{debug, info};

use apo_core::manifest::{format_german_amount, ManifestParser};
use apo_core::models::config::ApoConfig;
use apo_core::models::tour::ManifestParseResult;

use super::{load_config, read_manifest_text, OutputFormat};

/// Arguments for the manifest command.
#[derive(Args)]
pub struct ManifestArgs {
    /// Input file (PDF with text layer, or extracted/OCR text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Tour date to use when the manifest has none (DD.MM.YYYY or YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Print parse warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

pub async fn run(args: ManifestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Processing file: {}", args.input.display());
    let text = read_manifest_text(&args.input)?;

    let parser = build_parser(&config, args.date)?;
    let result = parser.parse(&text);

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build a manifest parser from configuration and an optional fallback date.
pub fn build_parser(config: &ApoConfig, date: Option<NaiveDate>) -> anyhow::Result<ManifestParser> {
    let parser = ManifestParser::from_config(&config.manifest)?;
    Ok(match date {
        Some(date) => parser.with_fallback_date(date),
        None => parser,
    })
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{}', expected DD.MM.YYYY or YYYY-MM-DD", s))
}

pub fn format_result(result: &ManifestParseResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ManifestParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "sort_order",
        "customer_name",
        "street",
        "postal_code",
        "city",
        "phone",
        "package_count",
        "cash_amount",
        "delivery_notes",
        "articles",
    ])?;

    for stop in &result.stops {
        let articles = stop
            .items
            .iter()
            .map(|a| format!("{}x {}", a.quantity, a.article_name))
            .collect::<Vec<_>>()
            .join("; ");

        wtr.write_record([
            &stop.sort_order.to_string(),
            &stop.customer_name,
            &stop.street,
            &stop.postal_code,
            &stop.city,
            &stop.phone,
            &stop.package_count.to_string(),
            &stop.cash_amount.to_string(),
            &stop.delivery_notes,
            &articles,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ManifestParseResult) -> String {
    let mut output = String::new();

    let name = if result.tour_name.is_empty() { "-" } else { &result.tour_name };
    output.push_str(&format!("Tour: {}\n", name));
    output.push_str(&format!("Date: {}\n", result.tour_date.format("%d.%m.%Y")));
    output.push_str(&format!(
        "Stops: {}  Packages: {}  Cash: {} €\n",
        result.stops.len(),
        result.total_packages(),
        format_german_amount(result.total_cash())
    ));

    for stop in &result.stops {
        output.push('\n');
        output.push_str(&format!(
            "{:>2}. {} ({} Pak., {} €)\n",
            stop.sort_order + 1,
            stop.customer_name,
            stop.package_count,
            format_german_amount(stop.cash_amount)
        ));

        let address = stop.address_line();
        if !address.is_empty() {
            output.push_str(&format!("    {}\n", address));
        }
        if !stop.phone.is_empty() {
            output.push_str(&format!("    Tel. {}\n", stop.phone));
        }
        if !stop.delivery_notes.is_empty() {
            output.push_str(&format!("    Hinweis: {}\n", stop.delivery_notes));
        }
        for article in &stop.items {
            output.push_str(&format!("    - {}x {}", article.quantity, article.article_name));
            if let Some(size) = &article.package_size {
                output.push_str(&format!(" {}", size));
            }
            output.push('\n');
        }
    }

    output
}
