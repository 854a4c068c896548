//! Source file descriptors.

use std::path::{Path, PathBuf};

/// A handle to a LaTeX source file on local disk.
///
/// The descriptor is a plain value: resolving never touches the file, and
/// existence is checked separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Location of the source.
    pub path: PathBuf,
    /// Name the file had before ingestion, when known.
    pub original_name: Option<String>,
    /// Media type reported at ingestion, when known.
    pub media_type: Option<String>,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            original_name: None,
            media_type: None,
        }
    }

    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// The absolute form of the path; the file need not exist.
    pub fn resolve(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    pub fn exists(&self) -> bool {
        self.resolve().exists()
    }
}

impl AsRef<Path> for FileDescriptor {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_absolute() {
        let descriptor = FileDescriptor::new("relative/resume.tex");
        assert!(descriptor.resolve().is_absolute());
    }

    #[test]
    fn test_absolute_path_unchanged() {
        let descriptor = FileDescriptor::new("/tmp/resume.tex");
        assert_eq!(descriptor.resolve(), PathBuf::from("/tmp/resume.tex"));
    }

    #[test]
    fn test_builder_fields() {
        let descriptor = FileDescriptor::new("/tmp/upload-172.tex")
            .with_original_name("Jane Doe Resume.tex")
            .with_media_type("application/x-tex");
        assert_eq!(descriptor.original_name.as_deref(), Some("Jane Doe Resume.tex"));
        assert_eq!(descriptor.media_type.as_deref(), Some("application/x-tex"));
    }

    #[test]
    fn test_exists_on_missing_file() {
        let descriptor = FileDescriptor::new("/nonexistent/cvtex/missing.tex");
        assert!(!descriptor.exists());
    }
}
