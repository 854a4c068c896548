//! # cvtex
//!
//! Context-aware LaTeX sanitization and lualatex compile driving for
//! resume pipelines.
//!
//! ## Features
//!
//! - **Structural Sanitization**: AST-based escaping of `& $ # _ %` that
//!   respects verbatim blocks, math, tables, macro arguments and comments
//! - **Graceful Degradation**: regex fallback for sources that will not
//!   parse, so sanitization always returns a result
//! - **Compile Driver**: lualatex invocation with timeout enforcement,
//!   bounded diagnostics and a working-directory fallback retry
//! - **Preflight Checks**: structural validation and detection of
//!   model-generated artifacts before an engine run is spent
//! - **Outline Extraction**: section titles for downstream tailoring
//! - **Workspace Hygiene**: auxiliary-file cleanup and stale-output sweeps
//!
//! ## Usage Examples
//!
//! ### Sanitizing LaTeX source
//!
//! ```rust
//! use cvtex::sanitize_content;
//!
//! let sanitized = sanitize_content(
//!     "\\documentclass{article}\n\\begin{document}\nData & Analytics\n\\end{document}\n",
//! );
//! assert!(sanitized.contains("Data \\& Analytics"));
//! ```
//!
//! ### Compiling a document
//!
//! ```rust,no_run
//! use cvtex::{FileDescriptor, LatexCompiler, LualatexCompiler};
//!
//! let compiler = LualatexCompiler::from_env();
//! let descriptor = FileDescriptor::new("/tmp/resume.tex");
//! if let Some(result) = compiler.compile(&descriptor) {
//!     println!("PDF at {}", result.pdf_path.display());
//! }
//! compiler.cleanup(&descriptor);
//! ```

/// Runtime configuration
pub mod config;

/// Core pipeline - sanitization and compilation
pub mod core;

/// Document-level services - descriptors, validation, outlines
pub mod document;

/// Utility modules
pub mod utils;

// Re-export the sanitizer surface
pub use crate::core::sanitize::escape::{escape_special_chars, fallback_sanitize};
pub use crate::core::sanitize::{cleanup_aux_files, sanitize_content, sanitize_file};

// Re-export the compiler surface
pub use crate::core::compile::{safe_jobname, CompilationResult, LatexCompiler, LualatexCompiler};

// Re-export document services
pub use document::{
    check_document, extract_sections, format_check, validate, CheckIssue, DocumentCheck,
    FileDescriptor, Section, Severity,
};

// Re-export configuration and utilities
pub use config::CompilerConfig;
pub use utils::error::{DocumentError, DocumentResult};
pub use utils::filename::sanitize_filename;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_reexport() {
        assert_eq!(sanitize_content("a \\& b"), "a \\& b");
    }

    #[test]
    fn test_validate_reexport() {
        assert!(validate("\\documentclass{a}\\begin{document}x\\end{document}").is_ok());
        assert!(validate("").is_err());
    }
}
