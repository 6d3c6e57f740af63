//! Cytoscan Control - verification harness for the Cytoscan pipeline
//!
//! Exercises the prediction path against a running daemon or directly against
//! the artifacts on disk.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cytoscanctl")]
#[command(about = "Cytoscan - diagnostic wizard control tool", long_about = None)]
#[command(version = cytoscan_common::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a reference sample to a running daemon's /predict endpoint
    Api {
        /// Daemon base URL
        #[arg(long, default_value = "http://127.0.0.1:7870")]
        url: String,

        /// Reference sample index
        #[arg(long, default_value_t = 0)]
        sample: usize,
    },

    /// Load the artifacts directly and predict a reference sample offline
    Local {
        /// Config file naming the artifacts (standard locations if omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scaler artifact, overrides the config
        #[arg(long)]
        scaler: Option<PathBuf>,

        /// Model artifact, overrides the config
        #[arg(long)]
        model: Option<PathBuf>,

        /// Reference sample index
        #[arg(long, default_value_t = 1)]
        sample: usize,
    },

    /// List the wizard steps and their features
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Api { url, sample } => commands::api(&url, sample).await,
        Commands::Local {
            config,
            scaler,
            model,
            sample,
        } => commands::local(config, scaler, model, sample),
        Commands::Catalog => {
            commands::catalog();
            Ok(())
        }
    }
}
