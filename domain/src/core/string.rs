//! String utilities for the domain layer.

/// Shorten `s` to at most `max_len` bytes, appending `...` when cut.
///
/// The cut always lands on a UTF-8 character boundary. Used to keep upstream
/// response bodies out of log lines and error messages at full length.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Join field names as a quoted, comma separated list (`'a', 'b'`).
pub fn quoted_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .map(|item| format!("'{}'", item))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_is_unchanged() {
        assert_eq!(truncate("ok", 10), "ok");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("channel_not_found", 10), "channel...");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // "é" is two bytes; byte 3 falls inside the second one
        assert_eq!(truncate("éééé", 6), "é...");
    }

    #[test]
    fn test_quoted_list() {
        assert_eq!(quoted_list(["key", "value"]), "'key', 'value'");
        assert_eq!(quoted_list(Vec::<&str>::new()), "");
    }
}
