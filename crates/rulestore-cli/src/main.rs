//! rulestore
//!
//! Command line access to policy rules kept in a Redis list: dump them,
//! import a CSV policy file, and add or remove individual rules.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rulestore_adapter::ListAdapter;
use std::path::PathBuf;
use tracing::info;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "rulestore")]
#[command(about = "Inspect and edit policy rules stored in Redis", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "rulestore.yaml")]
    config: String,

    /// Redis host
    #[arg(long, env = "RULESTORE_HOST")]
    host: Option<String>,

    /// Redis port
    #[arg(short = 'P', long, env = "RULESTORE_PORT")]
    port: Option<u16>,

    /// List key holding the rules
    #[arg(short, long, env = "RULESTORE_KEY")]
    key: Option<String>,

    /// Redis password
    #[arg(long, env = "RULESTORE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Logical database index
    #[arg(long, env = "RULESTORE_DB")]
    db: Option<i64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every stored rule
    Dump {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Csv)]
        format: DumpFormat,
    },

    /// Replace the stored rules with the rules of a CSV policy file
    Import {
        /// Policy file, one `ptype, v0, v1, ...` line per rule
        file: PathBuf,
    },

    /// Store one rule
    Add {
        /// Policy type (p, g, g2, ...)
        ptype: String,

        /// Rule fields
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Remove one stored occurrence of a rule
    Remove {
        /// Policy type (p, g, g2, ...)
        ptype: String,

        /// Rule fields
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Remove every rule whose fields match, starting at a field index
    RemoveFiltered {
        /// Policy type (p, g, g2, ...)
        ptype: String,

        /// First field to compare (0-5)
        index: usize,

        /// Values to compare; an empty value matches anything
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Delete every stored rule
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpFormat {
    /// `ptype, v0, v1, ...` lines
    Csv,
    /// Assertions as a JSON object
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = config::load(&cli)?;
    info!(host = %config.host, port = config.port, key = %config.key, db = config.db, "Configuration loaded");

    let mut adapter = ListAdapter::connect(&config).await?;
    let mut stdout = std::io::stdout().lock();
    commands::run(cli.command, &mut adapter, &mut stdout).await?;

    adapter.close();
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("rulestore=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rulestore=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
