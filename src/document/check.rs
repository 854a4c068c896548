//! Document validation and preflight checks.
//!
//! `validate` rejects sources missing the markers every compilable
//! document needs. `check_document` goes further and flags artifacts that
//! upstream text models commonly leave behind (markdown fences, undefined
//! control sequences, regex backreferences), so problems surface before an
//! engine run is spent on them.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::utils::error::{DocumentError, DocumentResult};

lazy_static! {
    static ref DOCUMENTCLASS: Regex =
        Regex::new(r"\\documentclass").expect("documentclass pattern");
    static ref BEGIN_DOCUMENT: Regex =
        Regex::new(r"\\begin\{document\}").expect("begin document pattern");
    static ref END_DOCUMENT: Regex =
        Regex::new(r"\\end\{document\}").expect("end document pattern");
    /// `\1`, `\2`, ... left behind by template substitution gone wrong.
    static ref BACKREFERENCE: Regex =
        Regex::new(r"\\[0-9]+").expect("backreference pattern");
}

/// Validate that content has the structure of a compilable document.
pub fn validate(content: &str) -> DocumentResult<()> {
    if content.trim().is_empty() {
        return Err(DocumentError::invalid("document content is empty"));
    }
    if !DOCUMENTCLASS.is_match(content) {
        return Err(DocumentError::invalid(
            "missing \\documentclass declaration",
        ));
    }
    if !BEGIN_DOCUMENT.is_match(content) {
        return Err(DocumentError::invalid("missing \\begin{document}"));
    }
    if !END_DOCUMENT.is_match(content) {
        return Err(DocumentError::invalid("missing \\end{document}"));
    }
    Ok(())
}

/// Severity of one preflight finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Compilation will fail or produce mangled output.
    Error,
    /// Suspicious but not necessarily fatal.
    Warning,
}

/// One preflight finding.
#[derive(Debug, Clone, Serialize)]
pub struct CheckIssue {
    pub severity: Severity,
    pub message: String,
}

/// Outcome of [`check_document`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentCheck {
    pub issues: Vec<CheckIssue>,
}

impl DocumentCheck {
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.issues.push(CheckIssue {
            severity,
            message: message.into(),
        });
    }
}

/// Inexpensive preflight scan of a source before an engine run.
pub fn check_document(content: &str) -> DocumentCheck {
    let mut check = DocumentCheck::default();

    if content.trim().is_empty() {
        check.push(Severity::Error, "document content is empty");
        return check;
    }

    if !DOCUMENTCLASS.is_match(content) {
        check.push(Severity::Error, "missing \\documentclass declaration");
    }
    if !BEGIN_DOCUMENT.is_match(content) {
        check.push(Severity::Error, "missing \\begin{document}");
    }
    if !END_DOCUMENT.is_match(content) {
        check.push(Severity::Error, "missing \\end{document}");
    }

    if content.contains("```") {
        check.push(Severity::Error, "markdown code fence in LaTeX source");
    }
    if content.contains("\\textasciimdash") {
        check.push(
            Severity::Error,
            "undefined control sequence \\textasciimdash",
        );
    }
    for sequence in ["\\textasciitilde", "\\textasciicircum"] {
        if content.contains(sequence) {
            check.push(
                Severity::Warning,
                format!("{} is unusual in resume sources", sequence),
            );
        }
    }
    if let Some(found) = BACKREFERENCE.find(content) {
        check.push(
            Severity::Error,
            format!("backreference artifact '{}' in source", found.as_str()),
        );
    }

    if DOCUMENTCLASS.is_match(content) && !content.trim_start().starts_with("\\documentclass") {
        check.push(Severity::Warning, "content before \\documentclass");
    }
    if END_DOCUMENT.is_match(content) && !content.trim_end().ends_with("\\end{document}") {
        check.push(Severity::Warning, "content after \\end{document}");
    }

    check
}

/// Render a check for terminal display, optionally with ANSI colors.
pub fn format_check(check: &DocumentCheck, color: bool) -> String {
    if check.issues.is_empty() {
        return "No issues found.".to_string();
    }
    let mut out = String::new();
    for issue in &check.issues {
        let tag = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if color {
            let code = match issue.severity {
                Severity::Error => "\x1b[31m",   // red
                Severity::Warning => "\x1b[33m", // yellow
            };
            out.push_str(&format!("{}{}\x1b[0m: {}\n", code, tag, issue.message));
        } else {
            out.push_str(&format!("{}: {}\n", tag, issue.message));
        }
    }
    out
}
