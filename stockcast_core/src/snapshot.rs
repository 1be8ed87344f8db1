//! Snapshot intake: split raw stock reports into categories, then run one
//! learn-then-predict cycle over them.

use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::backend::StateBackend;
use crate::normalize::{has_quantity_suffix, normalize_item};
use crate::store::{FrequencyStore, display_name};
use crate::{Error, Result};

/// Raw item lines of one snapshot, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    groups: BTreeMap<String, Vec<String>>,
}

impl Snapshot {
    /// Build a snapshot from lines already split per category.
    pub fn from_groups<I, C, L>(groups: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: AsRef<str>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let mut snapshot = Self::default();
        for (category, lines) in groups {
            let entry = snapshot
                .groups
                .entry(category.as_ref().trim().to_lowercase())
                .or_default();
            entry.extend(
                lines
                    .into_iter()
                    .map(Into::into)
                    .filter(|line: &String| !line.trim().is_empty()),
            );
        }
        snapshot.groups.retain(|_, lines| !lines.is_empty());
        snapshot
    }

    /// Split a posted stock report into category groups.
    ///
    /// A header is a line ending in `:`, starting with `#`, or wrapped in
    /// `**`/`__`. It opens the first category whose singular stem it
    /// mentions (`"🌱 Seeds Stock:"` opens `seeds`). A `:` or `#` header
    /// naming no category closes the current section; lines under it, or
    /// before any header, are ignored.
    ///
    /// Bold lines naming no category, and header-shaped lines that end in a
    /// quantity (`**Carrot x5**`), are items with their markers removed.
    #[must_use]
    pub fn parse(text: &str, categories: &[String]) -> Self {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        let mut current: Option<String> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let item = match classify(line, categories) {
                Line::Header(category) => {
                    current = category;
                    continue;
                }
                Line::Item(item) => item,
            };
            if let Some(category) = &current {
                groups.push((category.clone(), vec![item.to_string()]));
            }
        }

        Self::from_groups(groups)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Raw lines recorded for `category`.
    #[must_use]
    pub fn lines(&self, category: &str) -> &[String] {
        self.groups.get(category).map_or(&[][..], Vec::as_slice)
    }

    /// Categories that have at least one line.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

enum Line<'a> {
    /// Section break, opening a known category or closing the current one
    Header(Option<String>),
    Item(&'a str),
}

fn classify<'a>(line: &'a str, categories: &[String]) -> Line<'a> {
    let bold = ["**", "__"].into_iter().find_map(|marker| {
        line.strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
            .map(str::trim)
            .filter(|inner| !inner.is_empty())
    });
    let inner = bold.unwrap_or(line);

    let header_shaped = bold.is_some() || line.ends_with(':') || line.starts_with('#');
    if !header_shaped {
        return Line::Item(inner);
    }
    let unterminated = inner.trim_end_matches(':').trim_end();
    if has_quantity_suffix(unterminated) {
        return Line::Item(unterminated);
    }

    match header_category(line, categories) {
        Some(category) => Line::Header(Some(category)),
        None if bold.is_some() => Line::Item(inner),
        None => Line::Header(None),
    }
}

fn header_category(header: &str, categories: &[String]) -> Option<String> {
    let header = header.to_lowercase();
    categories
        .iter()
        .map(|c| c.trim().to_lowercase())
        .find(|category| header.contains(category_stem(category)))
}

fn category_stem(category: &str) -> &str {
    match category.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem,
        _ => category,
    }
}

/// Predicted items for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForecast {
    pub category: String,
    /// Number of accepted item lines in the snapshot
    pub observed: usize,
    /// Title-cased display names
    pub predicted: Vec<String>,
}

/// Outcome of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forecast {
    pub categories: Vec<CategoryForecast>,
}

impl Forecast {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategoryForecast> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Owns the frequency store and the random source used to predict.
///
/// `process` takes `&mut self`; callers sharing a handler across tasks wrap
/// it in a mutex so learn and predict never interleave.
pub struct SnapshotHandler<B: StateBackend, R: Rng> {
    store: FrequencyStore<B>,
    rng: R,
}

impl<B: StateBackend, R: Rng> SnapshotHandler<B, R> {
    pub const fn new(store: FrequencyStore<B>, rng: R) -> Self {
        Self { store, rng }
    }

    #[must_use]
    pub const fn store(&self) -> &FrequencyStore<B> {
        &self.store
    }

    /// Configured category names, in reply order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.store.config().category_keys()
    }

    /// Learn from `snapshot`, then predict the next one.
    ///
    /// Every category with accepted items is learned (and persisted) before
    /// any prediction is drawn. Each category then gets as many predictions
    /// as it had accepted lines, never repeating an item it just showed.
    pub fn process(&mut self, snapshot: &Snapshot) -> Result<Forecast> {
        if let Some(unknown) = snapshot.categories().find(|c| !self.store.has_category(c)) {
            return Err(Error::UnknownCategory(unknown.to_string()));
        }

        let mut order = self.categories();
        order.extend(
            snapshot
                .categories()
                .filter(|c| !order.iter().any(|o| o.as_str() == *c))
                .map(str::to_string)
                .collect::<Vec<_>>(),
        );

        let mut observed: Vec<(String, Vec<String>)> = Vec::new();
        for category in order {
            let keys: Vec<String> = snapshot
                .lines(&category)
                .iter()
                .filter_map(|line| normalize_item(line))
                .collect();
            if !keys.is_empty() {
                observed.push((category, keys));
            }
        }

        for (category, keys) in &observed {
            self.store.learn(category, keys)?;
            info!("Observed {} '{category}' items", keys.len());
        }

        let mut forecast = Forecast::default();
        for (category, keys) in observed {
            let exclude: HashSet<String> = keys.iter().cloned().collect();
            let predicted = self
                .store
                .predict(&category, &exclude, keys.len(), &mut self.rng)?;
            if predicted.is_empty() {
                continue;
            }
            info!("Predicted {} '{category}' items", predicted.len());
            forecast.categories.push(CategoryForecast {
                category,
                observed: keys.len(),
                predicted: predicted.iter().map(|k| display_name(k)).collect(),
            });
        }

        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::engine::EngineConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn categories() -> Vec<String> {
        EngineConfig::default().categories
    }

    fn handler() -> SnapshotHandler<MemoryBackend, StdRng> {
        let store = FrequencyStore::load(MemoryBackend::new(), EngineConfig::default()).unwrap();
        SnapshotHandler::new(store, StdRng::seed_from_u64(11))
    }

    #[test]
    fn parse_splits_sections_by_header() {
        let text = "🌱 Seeds Stock:\n🥕 Carrot x5\n🫐 Blueberry x2\n\n⚙️ Gear Stock:\nTrowel x1\n";
        let snapshot = Snapshot::parse(text, &categories());
        assert_eq!(snapshot.lines("seeds"), ["🥕 Carrot x5", "🫐 Blueberry x2"]);
        assert_eq!(snapshot.lines("gear"), ["Trowel x1"]);
    }

    #[test]
    fn parse_accepts_markdown_headers() {
        let text = "**SEEDS**\nCarrot\n## Gear shop\nRake x2";
        let snapshot = Snapshot::parse(text, &categories());
        assert_eq!(snapshot.lines("seeds"), ["Carrot"]);
        assert_eq!(snapshot.lines("gear"), ["Rake x2"]);
    }

    #[test]
    fn parse_ignores_unknown_sections_and_preamble() {
        let text = "Stock update!\nEggs:\nBug Egg x1\nSeeds:\nCarrot";
        let snapshot = Snapshot::parse(text, &categories());
        let found: Vec<&str> = snapshot.categories().collect();
        assert_eq!(found, vec!["seeds"]);
        assert_eq!(snapshot.lines("seeds"), ["Carrot"]);
    }

    #[test]
    fn parse_keeps_bold_items_inside_a_section() {
        let text = "Seeds:\n**Carrot x5**\n__Golden Egg__\nTomato\n**Seed Pack x2**";
        let snapshot = Snapshot::parse(text, &categories());
        assert_eq!(
            snapshot.lines("seeds"),
            ["Carrot x5", "Golden Egg", "Tomato", "Seed Pack x2"]
        );
    }

    #[test]
    fn parse_treats_quantity_lines_ending_in_colon_as_items() {
        let text = "Gear:\nRake x2:\nTrowel";
        let snapshot = Snapshot::parse(text, &categories());
        assert_eq!(snapshot.lines("gear"), ["Rake x2", "Trowel"]);
    }

    #[test]
    fn parse_unknown_colon_header_still_closes_section() {
        let text = "Seeds:\nCarrot\n## Weather\nRain\nEggs:\nBug Egg";
        let snapshot = Snapshot::parse(text, &categories());
        assert_eq!(snapshot.lines("seeds"), ["Carrot"]);
        assert_eq!(snapshot.categories().count(), 1);
    }

    #[test]
    fn parse_without_headers_is_empty() {
        assert!(Snapshot::parse("Carrot\nTomato", &categories()).is_empty());
    }

    #[test]
    fn from_groups_drops_blank_lines_and_empty_groups() {
        let snapshot = Snapshot::from_groups([("Seeds", vec!["Carrot", "  "]), ("gear", vec![])]);
        assert_eq!(snapshot.lines("seeds"), ["Carrot"]);
        assert_eq!(snapshot.categories().count(), 1);
    }

    #[test]
    fn process_predicts_excluding_observed_items() {
        let mut handler = handler();
        let first = Snapshot::from_groups([("seeds", vec!["Carrot", "Tomato", "Bamboo"])]);
        handler.process(&first).unwrap();

        let second = Snapshot::from_groups([("seeds", vec!["🥕 Carrot x3"])]);
        let forecast = handler.process(&second).unwrap();

        let seeds = forecast.get("seeds").unwrap();
        assert_eq!(seeds.observed, 1);
        assert_eq!(seeds.predicted.len(), 1);
        assert_ne!(seeds.predicted[0], "Carrot");
        assert!(["Tomato", "Bamboo"].contains(&seeds.predicted[0].as_str()));
    }

    #[test]
    fn process_omits_categories_without_candidates() {
        let mut handler = handler();
        let snapshot = Snapshot::from_groups([("seeds", vec!["Carrot"]), ("gear", vec!["Rake"])]);
        let forecast = handler.process(&snapshot).unwrap();
        assert!(forecast.is_empty());
        assert!(handler.store().weight("gear", "rake").is_some());
    }

    #[test]
    fn process_skips_lines_that_normalize_to_nothing() {
        let mut handler = handler();
        let snapshot = Snapshot::from_groups([("seeds", vec!["🌱🌱", "x4"])]);
        let forecast = handler.process(&snapshot).unwrap();
        assert!(forecast.is_empty());
        assert!(handler.store().table("seeds").unwrap().is_empty());
    }

    #[test]
    fn process_rejects_unknown_category() {
        let mut handler = handler();
        let snapshot = Snapshot::from_groups([("pets", vec!["Dog"])]);
        assert!(matches!(
            handler.process(&snapshot),
            Err(Error::UnknownCategory(c)) if c == "pets"
        ));
    }
}
