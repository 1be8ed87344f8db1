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

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

// Engine tunables live in stockcast_core so the engine can be used without this crate
use stockcast_core::EngineConfig;

const CONFIG_DIR: &str = "stockcast";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Frequency table file; a leading `~/` is expanded
    #[serde(default = "StorageConfig::default_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl StorageConfig {
    fn default_path() -> String {
        "~/stockcast/probabilities.json".to_string()
    }

    /// Resolve the configured path against the home directory.
    pub fn resolved_path(&self) -> anyhow::Result<PathBuf> {
        expand_home(&self.path)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub token: String,
    /// Account whose posts are treated as snapshots; any account when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_user_id: Option<u64>,
    /// Chat IDs allowed to talk to the bot; empty allows all
    #[serde(default)]
    pub allow_from: Vec<String>,
}

fn expand_home(path: &str) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

impl Config {
    /// Default location, `~/stockcast/config.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::default_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'stockcast init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        config.engine.validate()?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your Telegram bot token under \"telegram.token\"");
        println!("   2. Set \"telegram.source_user_id\" to the account that posts stock reports");
        println!("   3. Run 'stockcast run' to start watching");
        println!();
        println!("🔧 Configuration options:");
        println!("   - engine.learn_increment: weight added each time an item is seen");
        println!("   - engine.min_weight: floor that keeps every known item selectable");
        println!("   - engine.categories: report sections to learn from");
        println!("   - storage.path: where learned frequencies are kept");
        println!();
        Ok(())
    }

    /// Write the config template to `path`, refusing to overwrite.
    pub fn write_template(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let config_template = r#"{
  "engine": {
    "learn_increment": 0.1,
    "min_weight": 0.0001,
    "categories": ["seeds", "gear"],
    "bootstrap": {}
  },
  "storage": {
    "path": "~/stockcast/probabilities.json"
  },
  "telegram": {
    "enabled": true,
    "token": "your-telegram-bot-token-here",
    "allow_from": []
  }
}"#;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config_template)?;
        Ok(())
    }
}
