//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::path::{Path, PathBuf};

use stockcast_config::Config;
use stockcast_core::{FrequencyStore, JsonFileBackend};
use tracing::info;

mod init;
mod predict;
mod run;
mod top;
mod version;

pub use init::InitStrategy;
pub use predict::{PredictInput, PredictStrategy};
pub use run::{RunInput, RunStrategy};
pub use top::{TopInput, TopStrategy};
pub use version::VersionStrategy;

/// Load the config from an explicit path or the default location.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Open the frequency store described by `config`.
fn open_store(config: &Config) -> anyhow::Result<FrequencyStore<JsonFileBackend>> {
    let path: PathBuf = config.storage.resolved_path()?;
    info!("Frequency store: {}", path.display());
    Ok(FrequencyStore::load(
        JsonFileBackend::new(path),
        config.engine.clone(),
    )?)
}

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type, so parameters are passed
/// type-safely without boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
