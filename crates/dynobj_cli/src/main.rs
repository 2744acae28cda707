//! dynobj CLI
//!
//! Command-line tools for dynobj encoded objects.
//!
//! # Commands
//!
//! - `inspect` - Decode a file of framed records and print them
//! - `encode` - Encode a JSON object as a framed record
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// dynobj command-line tools.
#[derive(Parser)]
#[command(name = "dynobj")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a file of framed top-level records and print them
    Inspect {
        /// File holding one or more framed records
        file: PathBuf,

        /// Collection the records belong to
        #[arg(short, long)]
        collection: Option<String>,

        /// Names are registry codes; they are shown as "collection.code"
        #[arg(short, long)]
        normalized: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Encode a JSON object as a framed record with literal names
    Encode {
        /// JSON file holding one object
        input: PathBuf,

        /// Output file; appended to if it exists
        #[arg(short, long)]
        output: PathBuf,

        /// Collection to store the record in
        #[arg(short, long)]
        collection: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect {
            file,
            collection,
            normalized,
            format,
        } => {
            commands::inspect::run(&file, collection.as_deref(), normalized, &format)?;
        }
        Commands::Encode {
            input,
            output,
            collection,
        } => {
            commands::encode::run(&input, &output, collection.as_deref())?;
        }
        Commands::Version => {
            println!("dynobj CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("dynobj core v{}", dynobj_core::VERSION);
        }
    }

    Ok(())
}
