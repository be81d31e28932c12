use anyhow::Result;
use clap::{Parser, Subcommand};

use tuition_ledger::cli::{
    handle_audit_command, handle_export_ledger_command, handle_fee_command, handle_report_command,
    handle_run_command, handle_status_command, ExportLedgerArgs, ReportArgs, RunArgs,
};
use tuition_ledger::config::{paths::LedgerPaths, settings::Settings};
use tuition_ledger::telemetry;

#[derive(Parser)]
#[command(
    name = "tuition",
    author = "Kaylee Beyene",
    version,
    about = "Tuition payment tracker",
    long_about = "Allocates parents' bank transfers across their enrolled children, \
                  classifies each child's payment status and marks the monthly \
                  ledger accordingly."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate a bank statement against a roster
    Run(RunArgs),

    /// Show the payment status recorded in a roster
    Report(ReportArgs),

    /// Export the month grid of a roster to CSV
    ExportLedger(ExportLedgerArgs),

    /// Show the monthly fee of a class
    Fee {
        /// Class code (e.g. A5, B0)
        class: String,
    },

    /// Decode a ledger cell color into a payment status
    Status {
        /// 6 or 8 digit hex color (e.g. FF92D050)
        color: String,
    },

    /// Write the default settings file
    Init,

    /// Show current configuration and paths
    Config,

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    telemetry::init(&settings.log_level)?;

    match cli.command {
        Some(Commands::Run(args)) => handle_run_command(&paths, &settings, args)?,
        Some(Commands::Report(args)) => handle_report_command(&settings, args)?,
        Some(Commands::ExportLedger(args)) => handle_export_ledger_command(args)?,
        Some(Commands::Fee { class }) => handle_fee_command(&settings, &class)?,
        Some(Commands::Status { color }) => handle_status_command(&color)?,
        Some(Commands::Audit { limit }) => handle_audit_command(&paths, limit)?,
        Some(Commands::Init) => {
            settings.save(&paths)?;
            println!("Settings written to: {}", paths.settings_file().display());
            println!();
            println!("Fee schedule:");
            println!(
                "  Tier A ({}): {} per month",
                settings.fees.tier_a_classes.join(", "),
                settings.fees.tier_a_fee
            );
            println!(
                "  Tier B ({}): {} per month",
                settings.fees.tier_b_classes.join(", "),
                settings.fees.tier_b_fee
            );
        }
        Some(Commands::Config) => {
            println!("Tuition Ledger Configuration");
            println!("============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!(
                "Initialized:    {}",
                if paths.is_initialized() { "yes" } else { "no" }
            );
            println!();
            println!("Settings:");
            println!("  Tier A fee:          {}", settings.fees.tier_a_fee);
            println!("  Tier B fee:          {}", settings.fees.tier_b_fee);
            println!("  Overlap resolution:  {:?}", settings.fees.overlap);
            println!("  Payment aggregation: {:?}", settings.payment_aggregation);
            println!("  Prior source:        {:?}", settings.prior_source);
            println!("  Run mode:            {:?}", settings.run_mode);
            println!("  Test row limit:      {}", settings.test_row_limit);
            println!("  Log level:           {}", settings.log_level);
        }
        None => {
            println!("tuition - tuition payment tracker");
            println!();
            println!("Run 'tuition --help' for usage information.");
        }
    }

    Ok(())
}
