//! Runtime configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default engine timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the compiler adapter, usually read from the environment.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Hard deadline for one engine invocation.
    pub timeout: Duration,
    /// Working directory for the fallback compile attempt.
    pub project_root: PathBuf,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            project_root: PathBuf::from("."),
        }
    }
}

impl CompilerConfig {
    /// Read `CVTEX_LATEX_TIMEOUT` (seconds) and `CVTEX_PROJECT_ROOT`,
    /// keeping the defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = env::var("CVTEX_LATEX_TIMEOUT")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(root) = env::var("CVTEX_PROJECT_ROOT") {
            if !root.is_empty() {
                config.project_root = PathBuf::from(root);
            }
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }
}
