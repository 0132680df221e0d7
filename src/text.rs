//! Text Measurement
//!
//! Multi-line strings are handed to labels and popups as one row per
//! `'\n'`-separated segment. Widths are display widths in terminal cells,
//! measured with `unicode-width`.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Split `text` into display rows on `'\n'`.
///
/// Every separator starts a new row, so `"a\nb"` yields two rows and
/// `"a\n"` yields `["a", ""]`. Text without a separator, including the
/// empty string, yields exactly one row.
pub fn split_rows(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Join rows back into a single string, the inverse of [`split_rows`].
pub fn join_rows(rows: &[String]) -> String {
    rows.join("\n")
}

/// Display width of a string in terminal cells.
pub fn string_width(s: &str) -> i32 {
    UnicodeWidthStr::width(s) as i32
}

/// Display width of a single character (zero-width characters count as 0).
pub fn char_width(c: char) -> i32 {
    UnicodeWidthChar::width(c).unwrap_or(0) as i32
}

/// Widest row, in cells.
pub fn max_width(rows: &[String]) -> i32 {
    rows.iter().map(|r| string_width(r)).max().unwrap_or(0)
}

/// Truncate `s` so that it occupies at most `width` cells.
pub fn truncate_to_width(s: &str, width: i32) -> &str {
    let mut used = 0;
    for (i, c) in s.char_indices() {
        let w = char_width(c);
        if used + w > width {
            return &s[..i];
        }
        used += w;
    }
    s
}

/// Column at which text of `text_width` cells is centred in `area` cells.
pub fn centered(area: i32, text_width: i32) -> i32 {
    (area / 2 - text_width / 2).max(0)
}
