//! Commission command - slab/level commission from a band table.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use tripbill_core::commission::{
    calculate_commission_with_returns, commission_preview, default_preview_samples,
    validate_level_bands, validate_slab_bands,
};
use tripbill_core::models::{
    load_bands, CommissionBreakdown, CommissionMode, CommissionPreviewRow, CommissionWithReturns,
};

use super::bills::OutputFormat;

/// Arguments for the commission command.
#[derive(Args)]
pub struct CommissionArgs {
    /// Gross sales amount
    sales: Option<Decimal>,

    /// Returns to deduct from gross sales
    #[arg(short, long, default_value = "0")]
    returns: Decimal,

    /// Commission band table JSON file
    #[arg(short, long)]
    bands: PathBuf,

    /// Calculation mode
    #[arg(short, long, value_enum, default_value = "slab")]
    mode: ModeArg,

    /// Show commission at sample sales amounts instead of calculating
    #[arg(long)]
    preview: bool,

    /// Validate the band table and exit
    #[arg(long)]
    check_bands: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    /// Progressive: each band earns on its slice of sales
    Slab,
    /// Bracketed: the containing band's rate applies to all sales
    Level,
}

impl From<ModeArg> for CommissionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Slab => CommissionMode::Slab,
            ModeArg::Level => CommissionMode::Level,
        }
    }
}

pub fn run(args: CommissionArgs) -> anyhow::Result<()> {
    if !args.bands.exists() {
        anyhow::bail!("Band table file not found: {}", args.bands.display());
    }

    let bands = load_bands(&args.bands)?;
    let mode = CommissionMode::from(args.mode);
    info!("Loaded {} bands from {}", bands.len(), args.bands.display());

    let report = match mode {
        CommissionMode::Slab => validate_slab_bands(&bands),
        CommissionMode::Level => validate_level_bands(&bands),
    };

    if args.check_bands {
        for warning in &report.warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
        for error in &report.errors {
            println!("{} {}", style("✗").red(), error);
        }
        if !report.is_valid {
            anyhow::bail!("Band table is not valid for {} mode", mode.as_str());
        }
        println!(
            "{} Band table is valid for {} mode ({} bands)",
            style("✓").green(),
            mode.as_str(),
            bands.len()
        );
        return Ok(());
    }

    for warning in &report.warnings {
        eprintln!("{} {}", style("warning:").yellow(), warning);
    }
    if !report.is_valid {
        for error in &report.errors {
            eprintln!("{} {}", style("error:").red(), error);
        }
        anyhow::bail!("Band table is not valid for {} mode", mode.as_str());
    }

    let output = if args.preview {
        let samples = default_preview_samples();
        let rows = commission_preview(&samples, &bands, mode);
        format_preview(&rows, mode, args.format)?
    } else {
        let Some(gross) = args.sales else {
            anyhow::bail!("Provide a sales amount, or --preview for a sample table");
        };
        let result = calculate_commission_with_returns(gross, args.returns, &bands, mode);
        format_result(&result, args.format)?
    };

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

    Ok(())
}

fn format_result(result: &CommissionWithReturns, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_breakdown_csv(&result.result.breakdown),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Commission ({} mode)\n", result.result.mode.as_str()));
            output.push_str(&format!("Gross sales: ₹{:.2}\n", result.gross_sales));
            output.push_str(&format!("Returns:     ₹{:.2}\n", result.returns));
            output.push_str(&format!("Net sales:   ₹{:.2}\n", result.net_sales));
            output.push('\n');
            output.push_str(&format!(
                "{}\n",
                format_breakdown(&result.result.breakdown, result.result.mode)
            ));
            output.push_str(&format!(
                "Total commission: ₹{:.2}\n",
                result.result.total_commission
            ));
            Ok(output)
        }
    }
}

/// One-line breakdown summary, e.g. `₹10000.00 @ 5% = ₹500.00 + ...` for
/// slab mode or `7% on ₹45000.00 = ₹3150.00` for level mode.
fn format_breakdown(breakdown: &[CommissionBreakdown], mode: CommissionMode) -> String {
    if breakdown.is_empty() {
        return "No commission (no applicable bands)".to_string();
    }

    match mode {
        CommissionMode::Level => {
            let item = &breakdown[0];
            format!(
                "{}% on ₹{:.2} = ₹{:.2}",
                item.rate_pct, item.sales_in_slab, item.commission_from_slab
            )
        }
        CommissionMode::Slab => breakdown
            .iter()
            .map(|item| {
                format!(
                    "₹{:.2} @ {}% = ₹{:.2}",
                    item.sales_in_slab, item.rate_pct, item.commission_from_slab
                )
            })
            .collect::<Vec<_>>()
            .join(" + "),
    }
}

fn format_breakdown_csv(breakdown: &[CommissionBreakdown]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "slab_index",
        "min_amount",
        "max_amount",
        "rate_pct",
        "sales_in_slab",
        "commission_from_slab",
    ])?;

    for item in breakdown {
        wtr.write_record([
            &item.slab_index.to_string(),
            &item.min_amount.to_string(),
            &item.max_amount.map(|m| m.to_string()).unwrap_or_default(),
            &item.rate_pct.to_string(),
            &item.sales_in_slab.to_string(),
            &item.commission_from_slab.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_preview(
    rows: &[CommissionPreviewRow],
    mode: CommissionMode,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(rows)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["sales", "commission", "effective_rate"])?;
            for row in rows {
                wtr.write_record([
                    &row.sales.to_string(),
                    &row.commission.to_string(),
                    &row.effective_rate.to_string(),
                ])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Commission preview ({} mode)\n\n", mode.as_str()));
            output.push_str(&format!("{:>13} {:>13} {:>10}\n", "Sales", "Commission", "Rate"));
            for row in rows {
                output.push_str(&format!(
                    "{:>13} {:>13} {:>9}%\n",
                    format!("₹{:.2}", row.sales),
                    format!("₹{:.2}", row.commission),
                    row.effective_rate
                ));
            }
            Ok(output)
        }
    }
}
