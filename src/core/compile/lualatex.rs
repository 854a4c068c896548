//! The lualatex compiler adapter.
//!
//! Invocation shape: `lualatex -interaction=nonstopmode -output-directory
//! <dir> -jobname <name> -halt-on-error <file>`, run with a deadline. A
//! non-zero exit gets exactly one retry with the working directory moved
//! to the configured project root, which rescues sources that `\input`
//! project-relative assets.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info, warn};

use super::exec::{run_with_timeout, ExecOutcome};
use super::{safe_jobname, CompilationResult, LatexCompiler};
use crate::config::CompilerConfig;
use crate::core::sanitize::{cleanup_aux_files, sanitize_file};
use crate::document::FileDescriptor;

/// Maximum stderr characters quoted in failure logs.
const STDERR_PREVIEW_CHARS: usize = 500;
/// Maximum stdout error lines quoted in failure logs.
const STDOUT_ERROR_LINES: usize = 5;

/// How one engine invocation ended.
enum Attempt {
    /// Zero exit status.
    Success,
    /// Non-zero exit status; a working-directory retry may help.
    EngineFailure,
    /// Timeout, missing binary or spawn failure; retrying is pointless.
    Fatal,
}

/// Drives `lualatex` against sanitized sources.
#[derive(Debug, Clone, Default)]
pub struct LualatexCompiler {
    config: CompilerConfig,
}

impl LualatexCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Build a compiler configured from the environment.
    pub fn from_env() -> Self {
        Self::new(CompilerConfig::from_env())
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn engine_command(&self, source: &Path, output_dir: &Path, jobname: &str) -> Command {
        let mut command = Command::new("lualatex");
        command
            .arg("-interaction=nonstopmode")
            .arg("-output-directory")
            .arg(output_dir)
            .arg("-jobname")
            .arg(jobname)
            .arg("-halt-on-error")
            .arg(source);
        command
    }

    fn run_attempt(
        &self,
        source: &Path,
        output_dir: &Path,
        jobname: &str,
        workdir: Option<&Path>,
    ) -> Attempt {
        let mut command = self.engine_command(source, output_dir, jobname);
        if let Some(dir) = workdir {
            command.current_dir(dir);
        }
        info!(command = ?command, "running lualatex");

        match run_with_timeout(command, self.config.timeout) {
            ExecOutcome::Completed {
                status,
                stdout,
                stderr,
            } => {
                if status.success() {
                    return Attempt::Success;
                }
                error!(
                    code = status.code().unwrap_or(-1),
                    stderr = %stderr_preview(&stderr),
                    "lualatex failed"
                );
                let lines = error_lines(&stdout);
                if !lines.is_empty() {
                    error!(output = %lines.join("\n"), "lualatex error output");
                }
                Attempt::EngineFailure
            }
            ExecOutcome::TimedOut => {
                error!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "lualatex timed out"
                );
                Attempt::Fatal
            }
            ExecOutcome::MissingExecutable => {
                error!("lualatex binary not found, is a TeX distribution installed?");
                Attempt::Fatal
            }
            ExecOutcome::Failed(message) => {
                error!(error = %message, "could not run lualatex");
                Attempt::Fatal
            }
        }
    }
}

impl LatexCompiler for LualatexCompiler {
    fn compile(&self, descriptor: &FileDescriptor) -> Option<CompilationResult> {
        let source = descriptor.resolve();
        let output_dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !dir_is_writable(&output_dir) {
            error!(dir = %output_dir.display(), "output directory is not writable");
            return None;
        }
        if !source.exists() {
            error!(path = %source.display(), "source file does not exist");
            return None;
        }

        if let Err(err) = sanitize_file(&source) {
            warn!(
                path = %source.display(),
                error = %err,
                "could not sanitize source, compiling as-is"
            );
        }

        let stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document");
        let jobname = safe_jobname(stem);

        match self.run_attempt(&source, &output_dir, &jobname, None) {
            Attempt::Success => {}
            Attempt::EngineFailure => {
                info!(
                    workdir = %self.config.project_root.display(),
                    "retrying compilation from project root"
                );
                match self.run_attempt(
                    &source,
                    &output_dir,
                    &jobname,
                    Some(&self.config.project_root),
                ) {
                    Attempt::Success => {}
                    _ => return None,
                }
            }
            Attempt::Fatal => return None,
        }

        let pdf_path = output_dir.join(format!("{}.pdf", jobname));
        if !pdf_path.exists() {
            error!(
                path = %pdf_path.display(),
                "engine reported success but produced no PDF"
            );
            return None;
        }
        let log_path = output_dir.join(format!("{}.log", jobname));
        let log_path = log_path.exists().then_some(log_path);

        info!(pdf = %pdf_path.display(), "compilation succeeded");
        Some(CompilationResult { pdf_path, log_path })
    }

    fn cleanup(&self, descriptor: &FileDescriptor) {
        cleanup_aux_files(&descriptor.resolve());
    }
}

fn dir_is_writable(dir: &Path) -> bool {
    fs::metadata(dir)
        .map(|meta| meta.is_dir() && !meta.permissions().readonly())
        .unwrap_or(false)
}

/// A bounded stderr excerpt for failure logs.
fn stderr_preview(stderr: &str) -> String {
    let mut chars = stderr.chars();
    let preview: String = chars.by_ref().take(STDERR_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Stdout lines that look like engine errors, capped for the log.
fn error_lines(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter(|line| line.to_lowercase().contains("error") || line.contains('!'))
        .take(STDOUT_ERROR_LINES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_preview_short_passthrough() {
        assert_eq!(stderr_preview("warning: minor"), "warning: minor");
    }

    #[test]
    fn test_stderr_preview_truncates() {
        let long = "x".repeat(STDERR_PREVIEW_CHARS + 100);
        let preview = stderr_preview(&long);
        assert_eq!(preview.len(), STDERR_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_error_lines_filter_and_cap() {
        let stdout = "This is lualatex\n! Undefined control sequence.\nl.5 \\badmacro\nsome progress\nError: oops\nERROR again\n! one\n! two\n! three\n";
        let lines = error_lines(stdout);
        assert_eq!(lines.len(), STDOUT_ERROR_LINES);
        assert_eq!(lines[0], "! Undefined control sequence.");
        assert!(lines.iter().all(|l| l.to_lowercase().contains("error") || l.contains('!')));
    }

    #[test]
    fn test_dir_is_writable() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(dir_is_writable(dir.path()));
        assert!(!dir_is_writable(Path::new("/nonexistent/cvtex-test-dir")));
    }

    #[test]
    fn test_compile_missing_file_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let descriptor = FileDescriptor::new(dir.path().join("absent.tex"));
        let compiler = LualatexCompiler::default();
        assert!(compiler.compile(&descriptor).is_none());
    }
}
