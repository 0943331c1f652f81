//! Command-line front end for the linker.
//!
//! # Usage
//!
//! ```bash
//! # Print the default configuration
//! linker defaults
//!
//! # Serve redirects (blocks until SIGINT/SIGTERM/SIGQUIT)
//! linker -c /etc/linker.conf serve
//!
//! # Manage mappings
//! linker add docs https://docs.example.com
//! linker delete docs
//! linker list
//! ```
//!
//! # Environment Variables
//!
//! - `LINKER_CONFIG`: configuration file used when `-c` is not given
//! - `RUST_LOG`: overrides the configured log level

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use linker::Linker;
use linker::config::{self, Config, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Short-name HTTP redirector.
#[derive(Parser)]
#[command(name = "linker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: $LINKER_CONFIG, then /etc/linker.conf)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve redirects until interrupted
    Serve,

    /// List all mappings
    List,

    /// Add a mapping
    Add {
        /// Short name ([0-9A-Za-z_-])
        name: String,
        /// Target URL; https is assumed without a scheme
        url: String,
    },

    /// Delete a mapping
    Delete {
        /// Short name to remove
        name: String,
    },

    /// Print the default configuration
    Defaults,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Defaults = cli.command {
        print!("{}", config::DEFAULTS);
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.log);
    config.print_summary();

    let linker = Linker::connect(config)
        .await
        .context("Failed to open the mapping store")?;

    let result = match cli.command {
        Commands::Serve => linker.listen().await.map_err(Into::into),
        Commands::List => list(&linker).await,
        Commands::Add { name, url } => add(&linker, &name, &url).await,
        Commands::Delete { name } => delete(&linker, &name).await,
        Commands::Defaults => Ok(()),
    };

    linker.close().await?;
    result
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    if log.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Prints every mapping.
///
/// # Output Format
///
/// ```text
/// Name           URL
/// ==============================================
/// docs           https://docs.example.com
/// ```
async fn list(linker: &Linker) -> Result<()> {
    let mappings = linker.list().await.context("Failed to list mappings")?;

    println!("{:<15}{}", "Name".bright_white().bold(), "URL".bright_white().bold());
    println!("{}", "=".repeat(46).bright_black());

    for mapping in &mappings {
        println!("{:<15}{}", mapping.name.cyan(), mapping.url);
    }

    Ok(())
}

async fn add(linker: &Linker, name: &str, url: &str) -> Result<()> {
    let mapping = linker.add(name, url).await?;
    println!(
        "{} {} -> {}",
        "Added".green().bold(),
        mapping.name.cyan(),
        mapping.url
    );
    Ok(())
}

async fn delete(linker: &Linker, name: &str) -> Result<()> {
    if linker.delete(name).await? {
        println!("{} {}", "Deleted".green().bold(), name.cyan());
    } else {
        println!("{} {}", "No mapping named".yellow(), name.cyan());
    }
    Ok(())
}
