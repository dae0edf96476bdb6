//! Text layout and content-stream utilities

use crate::document::Color;
use crate::image::fmt_num;
use crate::Align;

/// Context for rendering one run of text
pub(crate) struct TextRenderContext<'a> {
    /// PDF font resource name (e.g., "F1")
    pub font_name: &'a str,
    /// Font size in points
    pub font_size: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Calculate X offset for text alignment inside a container
pub(crate) fn calculate_x_offset(text_width: f64, container_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => (container_width - text_width) / 2.0,
        Align::Right => container_width - text_width,
    }
}

/// Generate PDF operators (BT, rg, Tf, Td, Tj, ET) for one text run
///
/// `x` and `y` are the baseline origin in PDF coordinates (from bottom-left).
pub(crate) fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        fmt_num(ctx.color.r),
        fmt_num(ctx.color.g),
        fmt_num(ctx.color.b)
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, fmt_num(ctx.font_size)));
    ops.push_str(&format!("{} {} Td\n", fmt_num(x), fmt_num(y)));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Word-wrap text to a maximum width
///
/// Explicit newlines start new paragraphs (blank lines are kept). Words wider
/// than `max_width` are broken between characters. Always returns at least
/// one line.
///
/// # Arguments
/// * `text` - Text to wrap
/// * `max_width` - Available width, in the same unit `measure` returns
/// * `measure` - Width of a string
pub fn wrap_lines<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else {
                let candidate = format!("{current} {word}");
                if measure(&candidate) <= max_width {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }

            if measure(&current) > max_width {
                let mut pieces = break_word(&current, max_width, &measure);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Split a single word into pieces that each fit `max_width` (at least one char each)
fn break_word<F>(word: &str, max_width: f64, measure: &F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut pieces = Vec::new();
    let mut piece = String::new();

    for c in word.chars() {
        piece.push(c);
        if measure(&piece) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }

    pieces.push(piece);
    pieces
}

/// Truncate text at the tail so that it fits `max_width`
///
/// When truncation is needed the longest fitting prefix is kept and
/// `ellipsis` appended. If not even the ellipsis fits, an empty string is
/// returned. Widths are additive per character, so each character is
/// measured once.
pub fn truncate_to_width<F>(text: &str, max_width: f64, ellipsis: &str, char_width: F) -> String
where
    F: Fn(char) -> f64,
{
    let widths: Vec<f64> = text.chars().map(&char_width).collect();
    if widths.iter().sum::<f64>() <= max_width {
        return text.to_string();
    }

    let ellipsis_width: f64 = ellipsis.chars().map(&char_width).sum();
    if ellipsis_width > max_width {
        return String::new();
    }

    // prefix widths only grow, so the first overflow ends the search
    let mut kept = 0;
    let mut width = 0.0;
    for ((index, c), advance) in text.char_indices().zip(widths) {
        width += advance;
        if c.is_whitespace() {
            continue;
        }
        if width + ellipsis_width > max_width {
            break;
        }
        kept = index + c.len_utf8();
    }

    format!("{}{ellipsis}", &text[..kept])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every character is one unit wide
    fn chars(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn test_x_offset() {
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Left), 0.0);
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Center), 200.0);
        assert_eq!(calculate_x_offset(100.0, 500.0, Align::Right), 400.0);
    }

    #[test]
    fn test_generate_text_operators() {
        let ctx = TextRenderContext {
            font_name: "F1",
            font_size: 12.0,
            color: Color::black(),
        };

        let ops = generate_text_operators("<48656C6C6F>", 100.0, 700.5, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert_eq!(
            ops_str,
            "BT\n0 0 0 rg\n/F1 12 Tf\n100 700.5 Td\n<48656C6C6F> Tj\nET\n"
        );
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let ctx = TextRenderContext {
            font_name: "F2",
            font_size: 9.5,
            color: Color::rgb(1.0, 0.0, 0.0),
        };

        let ops_str = String::from_utf8(generate_text_operators("<33>", 1.0, 2.0, &ctx)).unwrap();
        assert!(ops_str.contains("1 0 0 rg"));
        assert!(ops_str.contains("/F2 9.5 Tf"));
    }

    #[test]
    fn test_wrap_lines() {
        let lines = wrap_lines("Hello world this is a test", 12.0, chars);
        assert_eq!(lines, vec!["Hello world", "this is a", "test"]);
    }

    #[test]
    fn test_wrap_lines_exact_fit_and_just_over() {
        assert_eq!(wrap_lines("Hello world", 11.0, chars), vec!["Hello world"]);
        assert_eq!(wrap_lines("Hello world", 10.0, chars), vec!["Hello", "world"]);
    }

    #[test]
    fn test_wrap_lines_keeps_paragraphs() {
        let lines = wrap_lines("line1\n\nline2 continues", 9.0, chars);
        assert_eq!(lines, vec!["line1", "", "line2", "continues"]);
    }

    #[test]
    fn test_wrap_lines_breaks_long_words() {
        let lines = wrap_lines("ab Supercalifragilistic", 8.0, chars);
        assert_eq!(lines, vec!["ab", "Supercal", "ifragili", "stic"]);
    }

    #[test]
    fn test_wrap_lines_empty() {
        assert_eq!(wrap_lines("", 10.0, chars), vec![""]);
        assert_eq!(wrap_lines("   ", 10.0, chars), vec![""]);
    }

    #[test]
    fn test_wrap_lines_zero_width_makes_progress() {
        let lines = wrap_lines("abc", 0.0, chars);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    fn unit(_: char) -> f64 {
        1.0
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("short", 10.0, "…", unit), "short");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Hello world", 7.0, "…", unit), "Hello…");
        assert_eq!(truncate_to_width("Hello world", 5.0, "...", unit), "He...");
        // trailing space before the cut is dropped
        assert_eq!(truncate_to_width("Hello world", 8.0, "…", unit), "Hello w…");
        assert_eq!(truncate_to_width("ab  cd", 4.0, "…", unit), "ab…");
    }

    #[test]
    fn test_truncate_too_narrow() {
        assert_eq!(truncate_to_width("Hello", 0.5, "…", unit), "");
        assert_eq!(truncate_to_width("Hello", 1.0, "…", unit), "…");
    }

    #[test]
    fn test_truncate_measures_each_char_once() {
        let calls = std::cell::Cell::new(0usize);
        let text = "word ".repeat(4_000);
        let fitted = truncate_to_width(&text, 30.0, "…", |_| {
            calls.set(calls.get() + 1);
            1.0
        });

        assert_eq!(fitted, "word word word word word word…");
        // the text once, the ellipsis once
        assert_eq!(calls.get(), text.chars().count() + 1);
    }
}
