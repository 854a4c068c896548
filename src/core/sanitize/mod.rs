//! Context-aware LaTeX sanitization.
//!
//! The structural path parses the source into a node tree, walks it with
//! contextual guards (verbatim, math, tables, document body) and applies
//! the collected span rewrites. When parsing fails the regex fallback
//! sanitizer takes over, so sanitization always produces a result.

pub mod context;
pub mod engine;
pub mod escape;
pub mod walk;

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::utils::error::DocumentResult;
use context::WalkState;
use escape::fallback_sanitize;
use walk::{collect_edits, Edit};

/// Build artifacts swept by [`cleanup_aux_files`].
const AUX_EXTENSIONS: &[&str] = &[
    ".aux",
    ".log",
    ".out",
    ".toc",
    ".fdb_latexmk",
    ".fls",
    ".synctex.gz",
];

/// Sanitize LaTeX source, escaping unsafe characters outside guarded
/// regions.
///
/// Never fails: when the structural parser rejects the source, the cruder
/// regex fallback runs instead.
pub fn sanitize_content(content: &str) -> String {
    match structural_sanitize(content) {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "structural parse failed, using fallback sanitizer");
            fallback_sanitize(content)
        }
    }
}

/// The structural path: parse, walk, apply edits.
fn structural_sanitize(content: &str) -> DocumentResult<String> {
    let nodes = engine::parse_document(content)?;
    let mut state = WalkState::default();
    let edits = collect_edits(content, &nodes, &mut state);
    if !state.documentclass_seen {
        warn!("no \\documentclass found in source");
    }
    if !state.document_environment_seen {
        warn!("no document environment found in source");
    }
    Ok(apply_edits(content, edits))
}

/// Apply rewrites in descending start order so earlier offsets stay valid.
fn apply_edits(content: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut result = content.to_string();
    for edit in edits {
        result.replace_range(edit.start..edit.end, &edit.text);
    }
    result
}

/// Sanitize a file in place, rewriting it only when the content changes.
pub fn sanitize_file(path: &Path) -> DocumentResult<()> {
    let content = fs::read_to_string(path)?;
    let sanitized = sanitize_content(&content);
    if sanitized != content {
        fs::write(path, &sanitized)?;
        info!(path = %path.display(), "sanitized LaTeX source");
    } else {
        debug!(path = %path.display(), "source already clean");
    }
    Ok(())
}

/// Best-effort removal of LaTeX build artifacts next to `path`.
///
/// Artifact names derive from the file name with a final `.tex` stripped;
/// individual deletion failures are logged and swallowed.
pub fn cleanup_aux_files(path: &Path) {
    let base = match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.strip_suffix(".tex").unwrap_or(name),
        None => return,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    for ext in AUX_EXTENSIONS {
        let candidate = dir.join(format!("{}{}", base, ext));
        if !candidate.exists() {
            continue;
        }
        match fs::remove_file(&candidate) {
            Ok(()) => debug!(path = %candidate.display(), "removed build artifact"),
            Err(err) => {
                warn!(path = %candidate.display(), error = %err, "could not remove build artifact");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_descending() {
        let content = "a & b & c";
        let edits = vec![
            Edit {
                start: 2,
                end: 3,
                text: "\\&".to_string(),
            },
            Edit {
                start: 6,
                end: 7,
                text: "\\&".to_string(),
            },
        ];
        assert_eq!(apply_edits(content, edits), "a \\& b \\& c");
    }

    #[test]
    fn test_sanitize_prose_document() {
        let source = "\\documentclass{article}\n\\begin{document}\nData & Analytics, 100\\% real, 40% faster\n\\end{document}\n";
        let result = sanitize_content(source);
        assert!(result.contains("Data \\& Analytics"));
        assert!(result.contains("100\\% real"));
        assert!(result.contains("40\\% faster"));
    }

    #[test]
    fn test_sanitize_preserves_structure() {
        let source = "\\documentclass{article}\n\\begin{document}\n\\begin{tabular}{ll}\nName & Role \\\\\n\\end{tabular}\n$E_k$\n\\end{document}\n";
        let result = sanitize_content(source);
        assert!(result.contains("Name & Role"));
        assert!(result.contains("$E_k$"));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let source = "\\documentclass{article}\n\\begin{document}\nR&D up 30%\n\\end{document}\n";
        let once = sanitize_content(source);
        let twice = sanitize_content(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_source_uses_fallback() {
        let source = "{unclosed group & 50%";
        let result = sanitize_content(source);
        assert!(result.contains("\\&"));
        assert!(result.contains("50\\%"));
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(sanitize_content(""), "");
    }
}
