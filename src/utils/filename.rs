//! Cross-platform output filename sanitization.

use lazy_static::lazy_static;
use regex::Regex;

/// Longest filename we will produce.
const MAX_FILENAME_LEN: usize = 200;

lazy_static! {
    /// Characters unsafe in filenames on at least one supported platform,
    /// plus control characters.
    static ref UNSAFE_CHARS: Regex =
        Regex::new(r#"[<>:"|?*\\/\x00-\x1f\x7f]"#).expect("unsafe chars pattern");
    /// Whitespace or hyphen runs to collapse.
    static ref SEPARATOR_RUNS: Regex = Regex::new(r"[\s\-]+").expect("separator pattern");
}

/// Make `text` safe to use as a filename on any supported platform.
///
/// Unsafe characters become hyphens, separator runs collapse, leading and
/// trailing hyphens/dots are trimmed, and the result is capped at 200
/// characters. An input with nothing usable yields `"untitled"`.
pub fn sanitize_filename(text: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(text, "-");
    let collapsed = SEPARATOR_RUNS.replace_all(&replaced, "-");
    let mut result = collapsed
        .trim_matches(|c| c == '-' || c == '.')
        .to_string();
    if result.chars().count() > MAX_FILENAME_LEN {
        result = result.chars().take(MAX_FILENAME_LEN).collect();
        result = result.trim_end_matches('-').to_string();
    }
    if result.is_empty() {
        "untitled".to_string()
    } else {
        result
    }
}
