//! Character-level escaping and the regex fallback sanitizer.
//!
//! The escaping rule is deliberately conservative: decisions are made from
//! the character that precedes each candidate in the original text, so
//! running the escaper over its own output changes nothing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Well-formed table blocks the fallback must leave untouched.
    static ref TABULAR_BLOCK: Regex =
        Regex::new(r"(?s)\\begin\{tabular[^}]*\}.*?\\end\{tabular[^}]*\}")
            .expect("tabular block pattern");
}

/// Escape `& $ # _ %` in plain text, line by line.
///
/// `& $ # _` are escaped unless already preceded by a backslash; `%` is
/// escaped unless preceded by a backslash or another `%`. Lines whose
/// left-trimmed content starts with `%` are comment lines and pass through
/// untouched.
pub fn escape_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with('%') {
            out.push_str(line);
        } else {
            escape_line_into(line, &mut out);
        }
    }
    out
}

fn escape_line_into(line: &str, out: &mut String) {
    let mut prev: Option<char> = None;
    for ch in line.chars() {
        match ch {
            '&' | '$' | '#' | '_' if prev != Some('\\') => {
                out.push('\\');
                out.push(ch);
            }
            '%' if prev != Some('\\') && prev != Some('%') => {
                out.push_str("\\%");
            }
            _ => out.push(ch),
        }
        prev = Some(ch);
    }
}

/// Sanitize without a parse tree: locate well-formed `tabular` blocks and
/// escape everything between them, leaving the blocks byte-identical.
///
/// This is the degraded path for sources the structural parser rejects; it
/// does not protect math or verbatim regions.
pub fn fallback_sanitize(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + content.len() / 8);
    let mut cursor = 0;
    for block in TABULAR_BLOCK.find_iter(content) {
        out.push_str(&escape_special_chars(&content[cursor..block.start()]));
        out.push_str(block.as_str());
        cursor = block.end();
    }
    out.push_str(&escape_special_chars(&content[cursor..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_specials_in_prose() {
        assert_eq!(
            escape_special_chars("Data & Analytics 100% match"),
            "Data \\& Analytics 100\\% match"
        );
        assert_eq!(escape_special_chars("a_b #1 $5"), "a\\_b \\#1 \\$5");
    }

    #[test]
    fn test_already_escaped_text_is_untouched() {
        let text = "Data \\& Analytics 100\\% match";
        assert_eq!(escape_special_chars(text), text);
    }

    #[test]
    fn test_escape_is_idempotent() {
        let once = escape_special_chars("R&D: 40% faster, 10_000 rows");
        let twice = escape_special_chars(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_percent_run_escapes_only_first() {
        assert_eq!(escape_special_chars("100%%"), "100\\%%");
    }

    #[test]
    fn test_adjacent_ampersands_both_escape() {
        assert_eq!(escape_special_chars("a && b"), "a \\&\\& b");
    }

    #[test]
    fn test_comment_lines_pass_through() {
        let text = "  % raw & kept\nbody & escaped\n";
        assert_eq!(
            escape_special_chars(text),
            "  % raw & kept\nbody \\& escaped\n"
        );
    }

    #[test]
    fn test_crlf_lines_preserved() {
        assert_eq!(
            escape_special_chars("a & b\r\nc % d\r\n"),
            "a \\& b\r\nc \\% d\r\n"
        );
    }

    #[test]
    fn test_tilde_and_caret_left_alone() {
        assert_eq!(escape_special_chars("x^2 ~y"), "x^2 ~y");
    }

    #[test]
    fn test_fallback_preserves_tabular_blocks() {
        let content = "intro & text\\begin{tabular}{ll}a & b\\\\\\end{tabular}outro 50%";
        let result = fallback_sanitize(content);
        assert!(result.contains("intro \\& text"));
        assert!(result.contains("{ll}a & b"));
        assert!(result.contains("outro 50\\%"));
    }

    #[test]
    fn test_fallback_without_tabular_escapes_everything() {
        assert_eq!(fallback_sanitize("R&D 5% _x"), "R\\&D 5\\% \\_x");
    }

    #[test]
    fn test_fallback_multiple_blocks() {
        let content = "\\begin{tabular}{l}1 & 2\\end{tabular} gap & \\begin{tabular}{l}3 & 4\\end{tabular}";
        let result = fallback_sanitize(content);
        assert!(result.contains("1 & 2"));
        assert!(result.contains("3 & 4"));
        assert!(result.contains("gap \\&"));
    }
}
