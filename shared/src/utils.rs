// Number parsing and display helpers shared by the engine and its front ends.

pub const UNAVAILABLE_MARKER: &str = "—";

/// Parses a trimmed token as a finite `f64`. Empty tokens, non-numeric text
/// and values like `inf` / `NaN` all yield `None`.
pub fn parse_finite(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_price(value: f64) -> String {
    format!("{:.4}", value)
}

/// Four decimals for computed values, the unavailable marker otherwise.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format_price(v),
        None => UNAVAILABLE_MARKER.to_string(),
    }
}
