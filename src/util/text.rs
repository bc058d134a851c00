use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncate `s` to at most `max_width` columns, appending "..." when cut.
///
/// For widths too narrow to hold a character plus the ellipsis, as many
/// characters as fit are returned without one. Returns `Cow::Borrowed` when
/// the string already fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width > budget {
            break;
        }
        width += char_width;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Drop control characters from single-line text such as feed titles.
///
/// Feed titles come from arbitrary RSS sources; an embedded ESC would
/// otherwise reach the terminal.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| !c.is_control()).collect())
}

/// Format a count with thousands separators: `1234567` → `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Short", 10), "Short");
    }

    #[test]
    fn test_wide_char_truncation() {
        // Each CJK character is two columns wide
        assert_eq!(truncate_to_width("日本語放送", 7), "日本...");
        assert_eq!(display_width("日本"), 4);
    }

    #[test]
    fn test_exact_fit_is_borrowed() {
        assert!(matches!(truncate_to_width("Queue", 5), Cow::Borrowed("Queue")));
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_strip_control_chars() {
        assert!(matches!(strip_control_chars("Plain"), Cow::Borrowed("Plain")));
        assert_eq!(strip_control_chars("\x1b[31mRed\x07"), "[31mRed");
        assert_eq!(strip_control_chars("Tab\tNew\nline"), "TabNewline");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(100_000), "100,000");
    }
}
