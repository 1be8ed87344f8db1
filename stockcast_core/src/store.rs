//! Persisted per-category frequency tables.
//!
//! Keys are lower-case everywhere in memory. The durable document stores the
//! title-cased display name instead; [`FrequencyStore`] is the only place
//! that translates between the two.

use rand::Rng;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

use crate::backend::StateBackend;
use crate::engine::{BOOTSTRAP_WEIGHT, EngineConfig};
use crate::{Error, Result, learning, predictor};

/// Item key to weight mapping for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    entries: BTreeMap<String, f64>,
}

impl FrequencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(key).copied()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub(crate) fn insert(&mut self, key: String, weight: f64) {
        self.entries.insert(key, weight);
    }

    pub(crate) fn weights_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.entries.values_mut()
    }
}

/// Title-case an item key for display and storage.
///
/// Every run of alphabetic characters starts upper-case and continues
/// lower-case, so `"o'neil seed"` becomes `"O'Neil Seed"`. A character is
/// only recased when it maps to exactly one character that lower-cases back
/// to itself (`ß` stays `ß`), so lower-casing the result gives `key` back.
#[must_use]
pub fn display_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_word = false;
    for c in key.chars() {
        if c.is_alphabetic() {
            let recased = if in_word {
                single(c.to_lowercase())
            } else {
                single(c.to_uppercase())
            };
            out.push(recased.filter(|r| single(r.to_lowercase()) == Some(c)).unwrap_or(c));
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn single(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn storage_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// All frequency tables plus the backend they are persisted to.
pub struct FrequencyStore<B: StateBackend> {
    backend: B,
    config: EngineConfig,
    tables: BTreeMap<String, FrequencyTable>,
}

impl<B: StateBackend> FrequencyStore<B> {
    /// Load the store from `backend`.
    ///
    /// Missing or unparseable state yields empty tables (seeded from
    /// `config.bootstrap`). A malformed category section yields an empty
    /// table for that category only. Only a failing read is an error.
    pub fn load(backend: B, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let parsed = match backend.read()? {
            None => {
                info!("No stored frequencies at {}, starting fresh", backend.describe());
                None
            }
            Some(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(sections)) => Some(sections),
                Ok(other) => {
                    warn!(
                        "Stored frequencies at {} are not an object ({}), starting fresh",
                        backend.describe(),
                        json_kind(&other)
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        "Stored frequencies at {} are malformed ({e}), starting fresh",
                        backend.describe()
                    );
                    None
                }
            },
        };

        let mut tables = BTreeMap::new();
        let bootstrap = parsed.is_none();
        if let Some(sections) = parsed {
            for (category, section) in sections {
                let table = parse_section(&category, &section, &config);
                tables.insert(storage_key(&category), table);
            }
        }

        for category in config.category_keys() {
            tables.entry(category.clone()).or_insert_with(|| {
                if bootstrap {
                    bootstrap_table(&category, &config)
                } else {
                    debug!("Category '{category}' missing from stored state, using empty table");
                    FrequencyTable::new()
                }
            });
        }

        info!(
            "Loaded {} categories ({} items) from {}",
            tables.len(),
            tables.values().map(FrequencyTable::len).sum::<usize>(),
            backend.describe()
        );

        Ok(Self {
            backend,
            config,
            tables,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Names of all known categories.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.tables.contains_key(category)
    }

    pub fn table(&self, category: &str) -> Result<&FrequencyTable> {
        self.tables
            .get(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))
    }

    #[must_use]
    pub fn weight(&self, category: &str, key: &str) -> Option<f64> {
        self.tables.get(category).and_then(|t| t.get(key))
    }

    /// Persist every table.
    ///
    /// Keys are written title-cased; weights are written as they are.
    pub fn save(&self) -> Result<()> {
        let document = self.render(None)?;
        self.backend.write(&document)
    }

    /// Record one observation of each distinct key in `observed`, then persist.
    ///
    /// The update is staged on a copy of the table and only committed after
    /// the write succeeds, so a failed save leaves memory matching disk.
    pub fn learn<I, S>(&mut self, category: &str, observed: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut staged = self.table(category)?.clone();
        let distinct = learning::apply_observations(&mut staged, observed, &self.config);

        let document = self.render(Some((category, &staged)))?;
        self.backend.write(&document)?;
        self.tables.insert(category.to_string(), staged);

        debug!("Learned {distinct} distinct '{category}' items");
        Ok(())
    }

    /// Draw up to `count` distinct keys from `category`, skipping `exclude`.
    ///
    /// Read-only; the order of the result carries no meaning.
    pub fn predict<R: Rng + ?Sized>(
        &self,
        category: &str,
        exclude: &HashSet<String>,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        let pool: Vec<(String, f64)> = self
            .table(category)?
            .iter()
            .filter(|(key, _)| !exclude.contains(*key))
            .map(|(key, weight)| (key.to_string(), weight))
            .collect();

        if pool.is_empty() {
            return Ok(Vec::new());
        }

        predictor::sample_without_replacement(pool, count, self.config.min_weight, rng)
    }

    /// The `n` heaviest items of `category`, heaviest first.
    pub fn top(&self, category: &str, n: usize) -> Result<Vec<(String, f64)>> {
        let mut items: Vec<(String, f64)> = self
            .table(category)?
            .iter()
            .map(|(key, weight)| (key.to_string(), weight))
            .collect();
        items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items.truncate(n);
        Ok(items)
    }

    fn render(&self, replacement: Option<(&str, &FrequencyTable)>) -> Result<String> {
        let mut document: BTreeMap<&str, BTreeMap<String, f64>> = BTreeMap::new();
        for (category, table) in &self.tables {
            let table = match replacement {
                Some((name, staged)) if name == category => staged,
                _ => table,
            };
            let section = table
                .iter()
                .map(|(key, weight)| (display_name(key), weight))
                .collect();
            document.insert(category.as_str(), section);
        }
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

fn parse_section(category: &str, section: &Value, config: &EngineConfig) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    let Value::Object(items) = section else {
        warn!(
            "Category '{category}' is not an object ({}), using empty table",
            json_kind(section)
        );
        return table;
    };

    for (name, value) in items {
        let Some(raw) = value.as_f64() else {
            warn!("Ignoring '{name}' in '{category}': weight is not a number");
            continue;
        };
        let weight = config.floor(raw);
        if weight > raw {
            debug!("Raised '{name}' in '{category}' from {raw} to the floor");
        }

        let key = storage_key(name);
        if key.is_empty() {
            continue;
        }
        let merged = table.get(&key).map_or(weight, |existing| existing.max(weight));
        table.insert(key, merged);
    }
    table
}

fn bootstrap_table(category: &str, config: &EngineConfig) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    let seeds = config
        .bootstrap
        .iter()
        .filter(|(name, _)| storage_key(name) == category)
        .flat_map(|(_, items)| items);
    for item in seeds {
        let key = storage_key(item);
        if !key.is_empty() {
            table.insert(key, config.floor(BOOTSTRAP_WEIGHT));
        }
    }
    if !table.is_empty() {
        info!("Bootstrapped '{category}' with {} default items", table.len());
    }
    table
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn load(contents: Option<&str>) -> FrequencyStore<MemoryBackend> {
        let backend = contents.map_or_else(MemoryBackend::new, MemoryBackend::with_contents);
        FrequencyStore::load(backend, EngineConfig::default()).unwrap()
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name("golden egg"), "Golden Egg");
        assert_eq!(display_name("o'neil seed"), "O'Neil Seed");
        assert_eq!(display_name("2x4 plank"), "2X4 Plank");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn display_name_keeps_characters_without_a_single_char_case_pair() {
        assert_eq!(display_name("ßeed"), "ßeed");
        assert_eq!(display_name("straße"), "Straße");
        assert_eq!(display_name("ﬁg tree"), "ﬁg Tree");
        assert_eq!(display_name("élan vital"), "Élan Vital");
        assert_eq!(display_name("ǆungla"), "Ǆungla");
    }

    #[test]
    fn display_name_lower_cases_back_to_the_key() {
        for key in ["ßeed", "straße", "ﬁg tree", "élan vital", "ǆungla", "ŉut", "ΐris"] {
            assert_eq!(storage_key(&display_name(key)), key, "key {key:?}");
        }
    }

    #[test]
    fn missing_state_yields_empty_configured_tables() {
        let store = load(None);
        let categories: Vec<&str> = store.categories().collect();
        assert_eq!(categories, vec!["gear", "seeds"]);
        assert!(store.table("seeds").unwrap().is_empty());
    }

    #[test]
    fn malformed_state_is_treated_as_fresh() {
        let store = load(Some("{ not json"));
        assert!(store.table("gear").unwrap().is_empty());

        let store = load(Some("[1, 2, 3]"));
        assert!(store.table("seeds").unwrap().is_empty());
    }

    #[test]
    fn malformed_section_only_empties_that_category() {
        let store = load(Some(r#"{"seeds": "oops", "gear": {"Trowel": 0.3}}"#));
        assert!(store.table("seeds").unwrap().is_empty());
        assert_eq!(store.weight("gear", "trowel"), Some(0.3));
    }

    #[test]
    fn load_lower_cases_keys_and_applies_floor() {
        let store = load(Some(
            r#"{"seeds": {"Blueberry": 0.5, "Carrot": 0.0, "Tomato": -2, "Bad": "x"}}"#,
        ));
        assert_eq!(store.weight("seeds", "blueberry"), Some(0.5));
        assert_eq!(store.weight("seeds", "carrot"), Some(0.0001));
        assert_eq!(store.weight("seeds", "tomato"), Some(0.0001));
        assert_eq!(store.weight("seeds", "bad"), None);
        assert!(store.table("gear").unwrap().is_empty());
    }

    #[test]
    fn colliding_names_keep_the_larger_weight() {
        let store = load(Some(r#"{"seeds": {"Carrot": 0.2, "CARROT": 0.7}}"#));
        assert_eq!(store.table("seeds").unwrap().len(), 1);
        assert_eq!(store.weight("seeds", "carrot"), Some(0.7));
    }

    #[test]
    fn unconfigured_sections_are_kept() {
        let store = load(Some(r#"{"eggs": {"Bug Egg": 1.5}}"#));
        assert!(store.has_category("eggs"));
        assert_eq!(store.weight("eggs", "bug egg"), Some(1.5));
    }

    #[test]
    fn bootstrap_only_applies_without_prior_state() {
        let mut config = EngineConfig::default();
        config
            .bootstrap
            .insert("seeds".to_string(), vec!["Carrot".to_string()]);

        let fresh = FrequencyStore::load(MemoryBackend::new(), config.clone()).unwrap();
        assert_eq!(fresh.weight("seeds", "carrot"), Some(1.0));

        let existing =
            FrequencyStore::load(MemoryBackend::with_contents(r#"{"seeds": {}}"#), config)
                .unwrap();
        assert_eq!(existing.weight("seeds", "carrot"), None);
    }

    #[test]
    fn save_writes_title_cased_keys() {
        let mut store = load(None);
        store.learn("seeds", ["golden egg"]).unwrap();

        let written = store.backend().contents().unwrap();
        let doc: Value = serde_json::from_str(&written).unwrap();
        assert!(doc["seeds"]["Golden Egg"].as_f64().is_some());
        assert!(doc["gear"].as_object().unwrap().is_empty());
    }

    #[test]
    fn save_does_not_reapply_the_floor() {
        let mut store = load(None);
        store
            .tables
            .get_mut("gear")
            .unwrap()
            .insert("rake".to_string(), 0.0);
        store.save().unwrap();

        let doc: Value = serde_json::from_str(&store.backend().contents().unwrap()).unwrap();
        assert_eq!(doc["gear"]["Rake"].as_f64(), Some(0.0));
    }

    #[test]
    fn learn_on_unknown_category_fails() {
        let mut store = load(None);
        assert!(matches!(
            store.learn("pets", ["dog"]),
            Err(Error::UnknownCategory(_))
        ));
    }

    #[test]
    fn predict_on_empty_pool_returns_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut store = load(None);
        assert!(
            store
                .predict("seeds", &HashSet::new(), 3, &mut rng)
                .unwrap()
                .is_empty()
        );

        store.learn("seeds", ["carrot"]).unwrap();
        let exclude: HashSet<String> = ["carrot".to_string()].into();
        assert!(
            store
                .predict("seeds", &exclude, 3, &mut rng)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn top_orders_by_weight_then_key() {
        let store = load(Some(
            r#"{"seeds": {"Apple": 0.5, "Carrot": 2.0, "Bamboo": 0.5, "Daffodil": 1.0}}"#,
        ));
        let top = store.top("seeds", 3).unwrap();
        let keys: Vec<&str> = top.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["carrot", "daffodil", "apple"]);
    }
}
