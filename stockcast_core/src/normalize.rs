//! Turns one raw snapshot line into a canonical item key.
//!
//! `"🫐 Blueberry x5"` becomes `"blueberry"`: the quantity suffix and any
//! decorative prefix are stripped, inner whitespace is collapsed and the
//! result is lower-cased. Lines that end up empty are rejected.
//!
//! Word characters are letters, digits and underscore only. Combining marks
//! and joiners (`U+FE0F`, `U+200D`) belong to the decoration.

use regex::Regex;
use std::sync::OnceLock;

static QUANTITY_SUFFIX: OnceLock<Regex> = OnceLock::new();
static DECORATIVE_PREFIX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn quantity_suffix() -> &'static Regex {
    QUANTITY_SUFFIX.get_or_init(|| {
        Regex::new(r"(?i)\s*[x×]\s*\d+\s*$")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn decorative_prefix() -> &'static Regex {
    DECORATIVE_PREFIX.get_or_init(|| {
        Regex::new(r"^[^\p{L}\p{N}_]+").expect("Static regex pattern is guaranteed to be valid")
    })
}

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| {
        Regex::new(r"\s{2,}").expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Whether `line` ends in a quantity annotation such as `x5` or `× 12`.
pub(crate) fn has_quantity_suffix(line: &str) -> bool {
    quantity_suffix().is_match(line.trim())
}

/// Normalize a raw snapshot line into an item key.
///
/// Returns `None` when nothing remains after stripping.
#[must_use]
pub fn normalize_item(raw_line: &str) -> Option<String> {
    let line = raw_line.trim();
    let line = quantity_suffix().replace(line, "");
    let line = decorative_prefix().replace(&line, "");
    let line = whitespace_run().replace_all(&line, " ");
    let key = line.to_lowercase().trim().to_string();

    if key.is_empty() { None } else { Some(key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji_and_quantity() {
        assert_eq!(normalize_item("🫐 Blueberry x5").as_deref(), Some("blueberry"));
    }

    #[test]
    fn strips_multiplication_sign_with_trailing_space() {
        assert_eq!(normalize_item("Carrot × 12 ").as_deref(), Some("carrot"));
    }

    #[test]
    fn quantity_marker_is_case_insensitive() {
        assert_eq!(normalize_item("Watering Can X3").as_deref(), Some("watering can"));
        assert_eq!(normalize_item("Trowel x 2").as_deref(), Some("trowel"));
    }

    #[test]
    fn blank_line_is_rejected() {
        assert_eq!(normalize_item("   "), None);
        assert_eq!(normalize_item(""), None);
    }

    #[test]
    fn decoration_only_line_is_rejected() {
        assert_eq!(normalize_item("🌱🌱 ---"), None);
        assert_eq!(normalize_item("x5"), None);
    }

    #[test]
    fn plain_name_is_lower_cased() {
        assert_eq!(normalize_item("Golden Egg").as_deref(), Some("golden egg"));
    }

    #[test]
    fn inner_whitespace_is_collapsed() {
        assert_eq!(
            normalize_item("⚙️  Basic   Sprinkler  x1").as_deref(),
            Some("basic sprinkler")
        );
    }

    #[test]
    fn variation_selector_emoji_is_stripped() {
        assert_eq!(normalize_item("⚙️ Trowel").as_deref(), Some("trowel"));
        assert_eq!(normalize_item("☀️ Sunflower x2").as_deref(), Some("sunflower"));
        assert_eq!(normalize_item("🛠️Wrench").as_deref(), Some("wrench"));
    }

    #[test]
    fn zwj_emoji_is_stripped() {
        assert_eq!(
            normalize_item("👨\u{200d}🌾 Farmer Hat x1").as_deref(),
            Some("farmer hat")
        );
        assert_eq!(normalize_item("\u{200d}\u{fe0f}Rake").as_deref(), Some("rake"));
    }

    #[test]
    fn connector_punctuation_prefix_is_stripped() {
        assert_eq!(normalize_item("‿Carrot").as_deref(), Some("carrot"));
        assert_eq!(normalize_item("⁀⁔ Tomato").as_deref(), Some("tomato"));
    }

    #[test]
    fn underscore_and_digits_are_word_characters() {
        assert_eq!(normalize_item("_Secret Seed").as_deref(), Some("_secret seed"));
        assert_eq!(normalize_item("🎁 7 Leaf Clover").as_deref(), Some("7 leaf clover"));
    }

    #[test]
    fn detects_quantity_suffix() {
        assert!(has_quantity_suffix("Carrot x5"));
        assert!(has_quantity_suffix("Carrot × 12 "));
        assert!(!has_quantity_suffix("Golden Egg"));
    }

    #[test]
    fn quantity_without_marker_is_kept() {
        assert_eq!(normalize_item("Seed 42").as_deref(), Some("seed 42"));
    }

    #[test]
    fn normalized_output_is_a_fixed_point() {
        for raw in ["🫐 Blueberry x5", "Golden Egg", "  Ember   Lily ×2"] {
            let once = normalize_item(raw).unwrap();
            assert_eq!(normalize_item(&once).as_deref(), Some(once.as_str()));
        }
    }
}
