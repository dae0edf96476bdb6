//! Input clean-up applied before any matching

/// Convert every line-ending form to `\n` and non-breaking spaces to spaces
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace(['\r', '\u{2028}', '\u{2029}'], "\n")
        .replace('\u{00A0}', " ")
}
