//! Bills command - generate VAT bills from a delivery report.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use tripbill_core::billing::{generate_vat_bills, validate_bills, GeneratorOptions};
use tripbill_core::models::{load_rows, DeliveryRow, TripbillConfig, VatBill};
use tripbill_core::remarks::parse_remarks;
use tripbill_core::BillType;

/// Arguments for the bills command.
#[derive(Args)]
pub struct BillsArgs {
    /// Delivery report JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Invoice ID to always bill individually (repeatable)
    #[arg(long = "forced-individual", value_name = "INVOICE_ID")]
    forced_individual: Vec<String>,

    /// Combined-pool threshold override
    #[arg(long)]
    threshold: Option<Decimal>,

    /// Bill date as YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Check the generated bills against their source orders
    #[arg(long)]
    validate: bool,
}

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
    /// Map a config `output.format` string onto a format, defaulting to text.
    pub fn from_config(config: &TripbillConfig) -> Self {
        match config.output.format.as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

/// Load configuration from an explicit path or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TripbillConfig> {
    Ok(if let Some(path) = config_path {
        TripbillConfig::from_file(Path::new(path))?
    } else {
        TripbillConfig::default()
    })
}

pub fn run(args: BillsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let rows = load_rows(&args.input)?;
    info!("Loaded {} delivery rows from {}", rows.len(), args.input.display());

    let mut options = GeneratorOptions::from_config(&config.billing)
        .with_forced_individual(args.forced_individual.clone());
    if let Some(threshold) = args.threshold {
        options.combine_threshold = threshold;
    }
    if let Some(date) = args.date {
        options = options.with_bill_date(date);
    }

    let bills = generate_vat_bills(&rows, &options);

    let format = args.format.unwrap_or_else(|| OutputFormat::from_config(&config));
    let mut output = format_bills(&bills, format, config.output.show_items)?;
    if matches!(format, OutputFormat::Text) {
        output.push_str(&format_payments_footer(&rows));
    }

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

    let individual = bills.iter().filter(|b| b.bill_type == BillType::Individual).count();
    eprintln!(
        "{} Generated {} bills ({} individual, {} combined)",
        style("✓").green(),
        bills.len(),
        individual,
        bills.len() - individual
    );

    if args.validate {
        let reports = validate_bills(&bills, &rows);
        let invalid = reports.iter().filter(|report| !report.is_valid).count();
        if invalid == 0 {
            eprintln!(
                "{} All {} bills consistent with source orders",
                style("✓").green(),
                reports.len()
            );
        } else {
            eprintln!(
                "{} {} of {} bills failed validation",
                style("✗").red(),
                invalid,
                reports.len()
            );
        }
    }

    Ok(())
}

fn format_bills(
    bills: &[VatBill],
    format: OutputFormat,
    show_items: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(bills)?),
        OutputFormat::Csv => format_csv(bills),
        OutputFormat::Text => format_text(bills, show_items),
    }
}

fn format_csv(bills: &[VatBill]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "bill_id",
        "bill_type",
        "payment_method",
        "date",
        "invoice_numbers",
        "item_count",
        "subtotal",
        "discount",
        "vat_amount",
        "total_amount",
    ])?;

    for bill in bills {
        let bill_type = match bill.bill_type {
            BillType::Individual => "individual",
            BillType::Combined => "combined",
        };
        wtr.write_record([
            bill.id.as_str(),
            bill_type,
            bill.payment_method.as_str(),
            &bill.date.to_string(),
            &bill.invoice_numbers.join("; "),
            &bill.items.len().to_string(),
            &bill.subtotal.to_string(),
            &bill.discount.to_string(),
            &bill.vat_amount.to_string(),
            &bill.total_amount.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(bills: &[VatBill], show_items: bool) -> anyhow::Result<String> {
    let mut output = String::new();

    for bill in bills {
        let bill_type = match bill.bill_type {
            BillType::Individual => "individual",
            BillType::Combined => "combined",
        };

        output.push_str(&format!("Bill: {} ({}, {})\n", bill.id, bill_type, bill.payment_method));
        output.push_str(&format!("Date: {}\n", bill.date));
        output.push_str(&format!("Invoices: {}\n", bill.invoice_numbers.join(", ")));
        if let Some(pan) = &bill.customer_pan {
            output.push_str(&format!("Customer PAN: {}\n", pan));
        }

        if show_items {
            output.push_str("Items:\n");
            for item in &bill.items {
                output.push_str(&format!(
                    "  {} x {} @ ₹{:.2} = ₹{:.2}\n",
                    item.quantity, item.product_name, item.rate_before_vat, item.total
                ));
            }
        }

        output.push_str(&format!("Subtotal: ₹{:.2}\n", bill.subtotal));
        output.push_str(&format!("Discount: ₹{:.2}\n", bill.discount));
        output.push_str(&format!("VAT:      ₹{:.2}\n", bill.vat_amount));
        output.push_str(&format!("Total:    ₹{:.2}\n", bill.total_amount));
        output.push('\n');
    }

    if bills.is_empty() {
        output.push_str("No bills generated\n");
    }

    Ok(output)
}

/// Split-payment amounts noted on remarks, totalled per method.
fn format_payments_footer(rows: &[DeliveryRow]) -> String {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows {
        let parsed = parse_remarks(row.order.remarks.as_deref().unwrap_or(""));
        for (method, amount) in &parsed.payments {
            *totals.entry(method.clone()).or_insert(Decimal::ZERO) += *amount;
        }
    }

    if totals.is_empty() {
        return String::new();
    }

    let mut output = String::from("Split payments noted on remarks:\n");
    for (method, amount) in &totals {
        output.push_str(&format!("  {}: ₹{:.2}\n", method, amount));
    }
    output
}
