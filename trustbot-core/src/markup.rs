//! Markup helpers. Every user-supplied value passes through `escape_html`.

/// Escape text for both element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with line breaks kept as `<br>`.
pub fn escape_multiline(text: &str) -> String {
    text.lines().map(escape_html).collect::<Vec<_>>().join("<br>\n")
}
