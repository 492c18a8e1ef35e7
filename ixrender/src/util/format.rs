//! Escaping for user text embedded in the rendered document.

use std::time::Duration;

/// Double every `$` so compose variable interpolation leaves the text alone.
pub fn escape_dollar(text: &str) -> String {
    text.replace('$', "$$")
}

/// Quote a single shell word with POSIX single quotes.
///
/// Words made only of safe characters are returned unchanged.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Render a duration the way compose expects (`"30s"`).
pub fn format_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}
