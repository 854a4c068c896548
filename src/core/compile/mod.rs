//! Compilation of LaTeX sources into PDFs.

pub mod exec;
pub mod lualatex;

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::document::FileDescriptor;

pub use lualatex::LualatexCompiler;

lazy_static! {
    /// Character runs that must not reach the engine's `-jobname`.
    static ref UNSAFE_JOBNAME: Regex =
        Regex::new(r"[^A-Za-z0-9._-]+").expect("jobname pattern");
}

/// Paths produced by a successful compilation.
#[derive(Debug, Clone, Serialize)]
pub struct CompilationResult {
    /// The produced PDF.
    pub pdf_path: PathBuf,
    /// The engine log, when one was written.
    pub log_path: Option<PathBuf>,
}

/// A compiler turning a LaTeX source file into a PDF.
///
/// Compilation failure is an expected outcome: `compile` reports it as
/// `None` and never panics. Diagnostic detail goes to the log.
pub trait LatexCompiler {
    /// Compile the descriptor's file, returning output paths on success.
    fn compile(&self, descriptor: &FileDescriptor) -> Option<CompilationResult>;

    /// Best-effort removal of build artifacts from a previous compile.
    fn cleanup(&self, descriptor: &FileDescriptor);
}

/// Derive a jobname safe to pass to the engine: every run of characters
/// outside `[A-Za-z0-9._-]` collapses to a single `_`.
pub fn safe_jobname(stem: &str) -> String {
    UNSAFE_JOBNAME.replace_all(stem, "_").into_owned()
}
