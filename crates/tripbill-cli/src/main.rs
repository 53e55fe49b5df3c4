//! CLI application for delivery-trip VAT billing and reconciliation.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{bills, commission, config, tally, validate};

/// Delivery-trip VAT billing - generate, validate and reconcile tax bills
#[derive(Parser)]
#[command(name = "tripbill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate VAT bills from a delivery report
    Bills(bills::BillsArgs),

    /// Validate generated bills against their source orders
    Validate(validate::ValidateArgs),

    /// Reconcile loaded vs billed quantities into an unload guide
    Tally(tally::TallyArgs),

    /// Calculate sales commission from a band table
    Commission(commission::CommissionArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Bills(args) => bills::run(args, cli.config.as_deref()),
        Commands::Validate(args) => validate::run(args, cli.config.as_deref()),
        Commands::Tally(args) => tally::run(args, cli.config.as_deref()),
        Commands::Commission(args) => commission::run(args),
        Commands::Config(args) => config::run(args),
    }
}
