use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cot-analytics")]
#[command(about = "CFTC COT Legacy Futures normalization and sentiment indicators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw report files and write the derived columnar dataset
    Normalize {
        /// Raw file paths, processed in the given order
        /// (defaults to all *.txt under the configured raw dir, sorted)
        paths: Vec<PathBuf>,
        /// Destination Parquet file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export a CSV for the analytical query store's bulk load
        #[arg(long)]
        csv_export: Option<PathBuf>,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize {
            paths,
            output,
            csv_export,
            config,
        } => commands::normalize::run(paths, output, csv_export, &config),
    }
}
