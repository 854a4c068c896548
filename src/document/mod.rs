//! Document-level services: descriptors, validation, outline extraction.

pub mod check;
pub mod descriptor;
pub mod sections;

pub use check::{check_document, format_check, validate, CheckIssue, DocumentCheck, Severity};
pub use descriptor::FileDescriptor;
pub use sections::{extract_sections, Section, DEFAULT_SECTIONS};
