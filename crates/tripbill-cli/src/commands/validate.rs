//! Validate command - cross-check generated bills against source orders.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tripbill_core::billing::{generate_vat_bills, validate_bills, BillValidation, GeneratorOptions};
use tripbill_core::models::load_rows;

use super::bills::{load_config, OutputFormat};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
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

pub fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let rows = load_rows(&args.input)?;
    let options = GeneratorOptions::from_config(&config.billing);
    let bills = generate_vat_bills(&rows, &options);
    info!("Validating {} bills against {} rows", bills.len(), rows.len());

    let reports = validate_bills(&bills, &rows);

    let format = args.format.unwrap_or_else(|| OutputFormat::from_config(&config));
    let output = format_reports(&reports, format)?;

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

    let invalid = reports.iter().filter(|report| !report.is_valid).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} bills failed validation", invalid, reports.len());
    }

    Ok(())
}

fn format_reports(reports: &[BillValidation], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(reports)?),
        OutputFormat::Csv => format_csv(reports),
        OutputFormat::Text => format_text(reports),
    }
}

fn format_csv(reports: &[BillValidation]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "bill_id",
        "is_valid",
        "errors",
        "warnings",
        "bill_total",
        "order_total",
        "difference",
    ])?;

    for report in reports {
        wtr.write_record([
            report.bill_id.as_str(),
            if report.is_valid { "true" } else { "false" },
            &report.errors.join("; "),
            &report.warnings.join("; "),
            &report.details.bill_total.to_string(),
            &report.details.order_total.to_string(),
            &report.details.difference.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(reports: &[BillValidation]) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str("VAT Bill Validation\n");
    output.push_str("===================\n\n");

    for report in reports {
        let mark = if report.is_valid {
            style("✓").green()
        } else {
            style("✗").red()
        };
        output.push_str(&format!("{} {}\n", mark, report.bill_id));

        for error in &report.errors {
            output.push_str(&format!("  {} {}\n", style("error:").red(), error));
        }
        for warning in &report.warnings {
            output.push_str(&format!("  {} {}\n", style("warning:").yellow(), warning));
        }
    }

    let valid = reports.iter().filter(|report| report.is_valid).count();
    let warnings: usize = reports.iter().map(|report| report.warnings.len()).sum();
    output.push_str(&format!(
        "\n{} bills checked: {} valid, {} with errors, {} warnings\n",
        reports.len(),
        valid,
        reports.len() - valid,
        warnings
    ));

    Ok(output)
}
