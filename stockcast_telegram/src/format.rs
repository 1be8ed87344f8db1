//! Reply rendering.

use stockcast_core::{Forecast, display_name};

pub const FORECAST_TITLE: &str = "Next Stock Will Be";
pub const FORECAST_SUBTITLE: &str = "(predicted from learned frequencies)";

/// Render a forecast as one section per category.
#[must_use]
pub fn render_forecast(forecast: &Forecast) -> String {
    let mut out = format!("{FORECAST_TITLE}\n{FORECAST_SUBTITLE}\n");
    for section in &forecast.categories {
        out.push('\n');
        out.push_str(&display_name(&section.category));
        out.push_str(":\n");
        for name in &section.predicted {
            out.push_str(name);
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

/// Render the heaviest items of a category with three decimals.
#[must_use]
pub fn render_top(category: &str, items: &[(String, f64)]) -> String {
    if items.is_empty() {
        return format!("No {} learned yet", display_name(category));
    }
    items
        .iter()
        .map(|(key, weight)| format!("{}: {weight:.3}", display_name(key)))
        .collect::<Vec<_>>()
        .join("\n")
}
