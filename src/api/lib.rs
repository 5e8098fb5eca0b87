pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Table cell text for a ratio value. Degenerate ratios show as `inf`/`NaN`.
pub fn format_ratio(value: f64) -> String {
    format!("{}", value)
}
