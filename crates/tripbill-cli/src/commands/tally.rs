//! Tally command - reconcile loaded vs billed quantities per product.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use tripbill_core::billing::{generate_vat_bills, GeneratorOptions};
use tripbill_core::models::load_rows;
use tripbill_core::tally::{build_tally, summarize, TallyItem, TallyStatus, TallySummary};

use super::bills::{load_config, OutputFormat};

/// Arguments for the tally command.
#[derive(Args)]
pub struct TallyArgs {
    /// Delivery report JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

/// Tally lines plus trip totals, as serialized in JSON output.
#[derive(Serialize)]
struct TallyReport {
    items: Vec<TallyItem>,
    summary: TallySummary,
}

pub fn run(args: TallyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let rows = load_rows(&args.input)?;
    let options = GeneratorOptions::from_config(&config.billing);
    let bills = generate_vat_bills(&rows, &options);
    info!("Tallying {} rows against {} bills", rows.len(), bills.len());

    let items = build_tally(&rows, &bills);
    let summary = summarize(&items);
    let report = TallyReport { items, summary };

    let format = args.format.unwrap_or_else(|| OutputFormat::from_config(&config));
    let output = format_report(&report, format)?;

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

    if report.summary.mismatched > 0 {
        eprintln!(
            "{} {} products have unexplained gaps",
            style("!").yellow(),
            report.summary.mismatched
        );
    }

    Ok(())
}

fn format_report(report: &TallyReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::Csv => format_csv(&report.items),
        OutputFormat::Text => format_text(report),
    }
}

fn format_csv(items: &[TallyItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "product_name",
        "original",
        "returns",
        "damages",
        "failed",
        "billed",
        "expected_net",
        "difference",
        "unload",
        "status",
        "reasons",
    ])?;

    for item in items {
        let status = match item.status {
            TallyStatus::Match => "match",
            TallyStatus::Mismatch => "mismatch",
        };
        wtr.write_record([
            item.product_name.as_str(),
            &item.original_qty.to_string(),
            &item.returns_qty.to_string(),
            &item.damages_qty.to_string(),
            &item.failed_qty.to_string(),
            &item.billed_qty.to_string(),
            &item.expected_net.to_string(),
            &item.difference.to_string(),
            &item.unload_qty.to_string(),
            status,
            &item.reasons.join("; "),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &TallyReport) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str("Billing Tally\n");
    output.push_str("=============\n\n");

    output.push_str(&format!(
        "{:<32} {:>8} {:>8} {:>9} {:>8} {:>6} {:>7}  {}\n",
        "Product", "Loaded", "Returns", "Expected", "Billed", "Diff", "Unload", "Status"
    ));

    for item in &report.items {
        let status = match item.status {
            TallyStatus::Match => "match",
            TallyStatus::Mismatch => "MISMATCH",
        };
        output.push_str(&format!(
            "{:<32} {:>8} {:>8} {:>9} {:>8} {:>6} {:>7}  {}\n",
            truncate(&item.product_name, 32),
            item.original_qty,
            item.returns_qty,
            item.expected_net,
            item.billed_qty,
            item.difference,
            item.unload_qty,
            status
        ));
        for reason in &item.reasons {
            output.push_str(&format!("{:<32} - {}\n", "", reason));
        }
    }

    let damaged: Vec<&TallyItem> = report
        .items
        .iter()
        .filter(|item| item.damage_reason.is_some())
        .collect();
    if !damaged.is_empty() {
        output.push_str("\nDamage reasons:\n");
        for item in damaged {
            if let Some(reason) = &item.damage_reason {
                output.push_str(&format!("  {}: {}\n", item.product_name, reason));
            }
        }
    }

    output.push_str(&format!(
        "\n{} products: {} match, {} mismatch\n",
        report.summary.total_products, report.summary.matched, report.summary.mismatched
    ));
    output.push_str(&format!(
        "Loaded {} units, expected {} net, billed {}, unload {}\n",
        report.summary.total_original,
        report.summary.total_expected,
        report.summary.total_billed,
        report.summary.total_unload
    ));

    Ok(output)
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max - 3).collect();
        format!("{}...", cut)
    }
}
