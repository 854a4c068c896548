//! Structural parsing engine for LaTeX source.
//!
//! The engine turns raw source into a span-carrying node tree; it knows
//! nothing about sanitization policy.

pub mod node;
pub mod parser;

pub use node::{MacroArg, Node, Span};
pub use parser::parse_document;
