//! iCalendar TEXT escaping.

/// Escapes text for iCalendar TEXT values (RFC 5545 §3.3.11).
///
/// Backslash, semicolon, comma and line feed are escaped. Carriage returns
/// are dropped so a CRLF pair collapses into a single `\n`.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}
