use std::path::PathBuf;

use stockcast_config::Config;

/// Strategy for initializing the configuration.
///
/// Creates the default configuration file at `~/stockcast/config.json`, or
/// at the path given with `--config`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        match input {
            Some(path) => {
                Config::write_template(&path)?;
                println!("✅ Created config file at: {}", path.display());
                Ok(())
            }
            None => Config::create_config(),
        }
    }
}
