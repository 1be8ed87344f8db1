use std::path::PathBuf;

use stockcast_telegram::format;

use super::{CommandStrategy, load_config, open_store};

/// Input for the top command.
pub struct TopInput {
    pub config: Option<PathBuf>,
    /// Category to list; the first configured one when omitted
    pub category: Option<String>,
    pub limit: usize,
}

/// Strategy for listing the heaviest learned items of a category.
#[derive(Debug, Clone, Copy)]
pub struct TopStrategy;

impl CommandStrategy for TopStrategy {
    type Input = TopInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = load_config(input.config.as_deref())?;
        let store = open_store(&config)?;

        let category = match input.category {
            Some(c) => c.trim().to_lowercase(),
            None => config
                .engine
                .category_keys()
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("No categories configured"))?,
        };

        let items = store.top(&category, input.limit)?;
        println!("{}", format::render_top(&category, &items));
        Ok(())
    }
}
