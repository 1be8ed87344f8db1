//! Engine tunables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Default amount added to an item's weight each time it is observed.
pub const DEFAULT_LEARN_INCREMENT: f64 = 0.1;

/// Default floor every weight is kept at or above.
pub const DEFAULT_MIN_WEIGHT: f64 = 0.0001;

/// Weight given to bootstrap items when no durable state exists yet.
pub const BOOTSTRAP_WEIGHT: f64 = 1.0;

/// Learning and prediction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Amount added to an observed item's weight
    #[serde(default = "EngineConfig::default_learn_increment")]
    pub learn_increment: f64,
    /// Minimum weight of any item
    #[serde(default = "EngineConfig::default_min_weight")]
    pub min_weight: f64,
    /// Categories tracked by the store, in reply order
    #[serde(default = "EngineConfig::default_categories")]
    pub categories: Vec<String>,
    /// Items seeded at weight 1.0 per category when there is no prior state
    #[serde(default)]
    pub bootstrap: BTreeMap<String, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            learn_increment: Self::default_learn_increment(),
            min_weight: Self::default_min_weight(),
            categories: Self::default_categories(),
            bootstrap: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    const fn default_learn_increment() -> f64 {
        DEFAULT_LEARN_INCREMENT
    }

    const fn default_min_weight() -> f64 {
        DEFAULT_MIN_WEIGHT
    }

    fn default_categories() -> Vec<String> {
        vec!["seeds".to_string(), "gear".to_string()]
    }

    /// Check that the tunables keep the weight invariants satisfiable.
    pub fn validate(&self) -> Result<()> {
        if !self.min_weight.is_finite() || self.min_weight <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_weight must be a positive number, got {}",
                self.min_weight
            )));
        }
        if !self.learn_increment.is_finite() || self.learn_increment <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learn_increment must be a positive number, got {}",
                self.learn_increment
            )));
        }
        if self.categories.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one category is required".to_string(),
            ));
        }
        if let Some(empty) = self.categories.iter().find(|c| c.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "category names must not be blank, got {empty:?}"
            )));
        }
        Ok(())
    }

    /// Configured category names, lower-cased.
    #[must_use]
    pub fn category_keys(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect()
    }

    /// Clamp a weight up to the configured floor. NaN maps to the floor.
    #[must_use]
    pub fn floor(&self, weight: f64) -> f64 {
        if weight.is_nan() {
            self.min_weight
        } else {
            weight.max(self.min_weight)
        }
    }
}
