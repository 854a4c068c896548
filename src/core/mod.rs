//! Core pipeline: sanitization and compilation.

pub mod compile;
pub mod sanitize;
