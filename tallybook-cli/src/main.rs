//! Tallybook CLI - bring spreadsheets into your books from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{export, fields, import};

/// Tallybook - tabular imports for your business records
#[derive(Parser)]
#[command(name = "tb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import records from a CSV or Excel file
    Import {
        /// Record type (customers, vendors, items, invoices, invoice_lines)
        entity: Option<String>,
        /// Path to the .csv, .xls, or .xlsx file
        file: Option<PathBuf>,
        /// Override a column mapping (repeatable), e.g. --map name="Customer Name"
        #[arg(long, value_name = "TARGET=SOURCE")]
        map: Vec<String>,
        /// Clear the mapping for a target field (repeatable)
        #[arg(long, value_name = "TARGET")]
        unmap: Vec<String>,
        /// Stop after validation without importing
        #[arg(long)]
        preview: bool,
        /// Import into a throwaway in-memory datastore
        #[arg(long)]
        dry_run: bool,
        /// Use saved import profile
        #[arg(long)]
        profile: Option<String>,
        /// Save the final mappings as a profile
        #[arg(long)]
        save_profile: Option<String>,
        /// List saved profiles
        #[arg(long)]
        list_profiles: bool,
        /// Skip interactive prompts
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a collection back to CSV
    Export {
        /// Record type (customers, vendors, items, invoices, invoice_lines)
        entity: String,
        /// Output CSV path
        output: PathBuf,
        /// Output summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the import field registries
    Fields {
        /// Record type (all when omitted)
        entity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Silent unless RUST_LOG asks for something; logs go to stderr so they
/// never mix with command output
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import {
            entity,
            file,
            map,
            unmap,
            preview,
            dry_run,
            profile,
            save_profile,
            list_profiles,
            yes,
            json,
        } => {
            import::run(
                entity,
                file,
                map,
                unmap,
                preview,
                dry_run,
                profile,
                save_profile,
                list_profiles,
                yes,
                json,
            )
            .await
        }
        Commands::Export {
            entity,
            output,
            json,
        } => export::run(&entity, &output, json).await,
        Commands::Fields { entity, json } => fields::run(entity.as_deref(), json),
    }
}
