//! Server-side HTML for the public page and the admin shell.

pub mod admin;
pub mod page;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Only `#rgb` / `#rrggbb` values reach inline styles.
pub(crate) fn css_color(raw: &str, fallback: &'static str) -> String {
    match crate::imaging::color::parse_hex(raw) {
        Some((r, g, b)) if raw.trim().starts_with('#') => {
            crate::imaging::color::to_hex(r, g, b)
        }
        _ => fallback.to_string(),
    }
}

/// Quote a URL for use inside CSS `url(...)`.
pub(crate) fn css_url(raw: &str) -> String {
    let escaped: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    format!("\"{escaped}\"")
}
