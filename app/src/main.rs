#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, InitStrategy, PredictInput, PredictStrategy, RunInput, RunStrategy,
    TopInput, TopStrategy, VersionStrategy,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Learns recurring stock reports and predicts the next one", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/stockcast/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Run the Telegram bot
    Run {
        /// Bot token (overrides config)
        #[arg(short, long)]
        token: Option<String>,

        /// User ID of the account posting stock reports (overrides config)
        #[arg(short, long)]
        source: Option<u64>,
    },
    /// Learn from one stock report and print the forecast
    Predict {
        /// Report file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Seed for reproducible predictions
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the most frequently seen items of a category
    Top {
        /// Category name (defaults to the first configured one)
        category: Option<String>,

        /// Number of items to show
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Init => InitStrategy.execute(config).await,
        Commands::Run { token, source } => {
            RunStrategy
                .execute(RunInput {
                    config,
                    token,
                    source,
                })
                .await
        }
        Commands::Predict { file, seed } => {
            PredictStrategy
                .execute(PredictInput { config, file, seed })
                .await
        }
        Commands::Top { category, limit } => {
            TopStrategy
                .execute(TopInput {
                    config,
                    category,
                    limit,
                })
                .await
        }
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
