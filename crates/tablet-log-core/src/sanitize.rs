//! Free-text cleanup applied to every string before it reaches a row.
//!
//! The output never contains control characters, never contains a run of
//! more than one whitespace character, has no leading or trailing
//! whitespace, and is at most `max_len` UTF-16 code units long. Applying
//! [`sanitize_text`] to its own output is a no-op.

/// Default upper bound for any free-text cell.
pub const MAX_TEXT_LENGTH: usize = 1000;

/// Clean a raw string for storage.
///
/// Control characters that are not whitespace are dropped, every run of
/// whitespace (including `\r`, `\n`, `\t`) becomes a single space, the
/// result is trimmed, and then truncated to `max_len` UTF-16 code units.
/// Truncation never splits a `char`, and ignores grapheme clusters.
pub fn sanitize_text(input: &str, max_len: usize) -> String {
    let visible: String = input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let collapsed = visible.split_whitespace().collect::<Vec<_>>().join(" ");

    if text_length(&collapsed) <= max_len {
        return collapsed;
    }

    let mut used = 0;
    let truncated: String = collapsed
        .chars()
        .take_while(|c| {
            used += c.len_utf16();
            used <= max_len
        })
        .collect();
    // Cutting mid-sentence can leave a trailing space behind.
    truncated.trim_end().to_string()
}

/// Length of `text` as form clients measure it, in UTF-16 code units.
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Sanitize an optional field; a missing value becomes the empty string.
pub fn sanitize_opt(input: Option<&str>, max_len: usize) -> String {
    input.map(|s| sanitize_text(s, max_len)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_newlines_and_spaces() {
        assert_eq!(sanitize_text("a\n\nb   c", MAX_TEXT_LENGTH), "a b c");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(sanitize_text("  \t hello \r\n", MAX_TEXT_LENGTH), "hello");
    }

    #[test]
    fn test_strips_control_chars() {
        assert_eq!(sanitize_text("ab\u{0}c\u{7f}d", MAX_TEXT_LENGTH), "abcd");
        assert_eq!(sanitize_text("a \u{1b} b", MAX_TEXT_LENGTH), "a b");
    }

    #[test]
    fn test_truncates_by_chars() {
        let long = "借".repeat(1500);
        let out = sanitize_text(&long, MAX_TEXT_LENGTH);
        assert_eq!(out.chars().count(), 1000);
    }

    #[test]
    fn test_truncates_by_utf16_units() {
        let out = sanitize_text(&"😀".repeat(600), MAX_TEXT_LENGTH);
        assert_eq!(out.chars().count(), 500);
        assert_eq!(text_length(&out), 1000);

        // An odd budget cannot hold half of a surrogate pair.
        assert_eq!(sanitize_text("😀😀", 3), "😀");
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_space() {
        let input = format!("{} b", "a".repeat(4));
        assert_eq!(sanitize_text(&input, 5), "aaaa");
    }

    #[test]
    fn test_missing_is_empty() {
        assert_eq!(sanitize_opt(None, MAX_TEXT_LENGTH), "");
        assert_eq!(sanitize_opt(Some("  x  "), MAX_TEXT_LENGTH), "x");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "a\n\nb   c",
            "\t\tleading tabs",
            "mixed \u{0085} nel \u{00a0} nbsp",
            "控制\u{1}字元\r\n測試",
        ];
        for s in samples {
            let once = sanitize_text(s, MAX_TEXT_LENGTH);
            assert_eq!(sanitize_text(&once, MAX_TEXT_LENGTH), once, "input {:?}", s);
        }

        let long = "word ".repeat(400);
        let once = sanitize_text(&long, 7);
        assert_eq!(sanitize_text(&once, 7), once);
    }
}
