//! Escaping for text content and attribute values.

use alloc::string::String;

/// Escapes the five characters that are significant in markup text.
///
/// ```
/// use recast_core::escape::escape_html;
///
/// assert_eq!(escape_html("<a href='x'>"), "&lt;a href=&#x27;x&#x27;&gt;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

/// Appends `text` to `out`, escaping markup-significant characters.
pub fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            ch => out.push(ch),
        }
    }
}

/// Appends an attribute value to `out`, including its surrounding quotes.
///
/// Double quotes are used unless the value contains a double quote and no single
/// quote. Only `&` and the chosen quote character are escaped.
pub fn push_quoted(out: &mut String, value: &str) {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#x27;"),
            ch => out.push(ch),
        }
    }
    out.push(quote);
}
