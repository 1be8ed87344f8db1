use std::io::Read;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use stockcast_core::{Snapshot, SnapshotHandler};
use stockcast_telegram::format;
use tracing::info;

use super::{CommandStrategy, load_config, open_store};

/// Input for the predict command.
pub struct PredictInput {
    pub config: Option<PathBuf>,
    /// Report file; stdin when omitted
    pub file: Option<PathBuf>,
    /// Fixed seed for reproducible draws
    pub seed: Option<u64>,
}

/// Strategy for learning from one report and printing the forecast.
#[derive(Debug, Clone, Copy)]
pub struct PredictStrategy;

impl CommandStrategy for PredictStrategy {
    type Input = PredictInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = load_config(input.config.as_deref())?;

        let text = match &input.file {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read report {}: {e}", path.display()))?,
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                text
            }
        };

        let rng = input
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut handler = SnapshotHandler::new(open_store(&config)?, rng);

        let snapshot = Snapshot::parse(&text, &handler.categories());
        if snapshot.is_empty() {
            anyhow::bail!("No stock report sections found in input");
        }

        let forecast = handler.process(&snapshot)?;
        if forecast.is_empty() {
            info!("Report learned");
            println!("Nothing to predict yet");
        } else {
            println!("{}", format::render_forecast(&forecast));
        }
        Ok(())
    }
}
