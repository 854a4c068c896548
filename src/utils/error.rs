//! Error handling for document processing
//!
//! This module provides a unified error type and result type for parsing,
//! validation and file operations.

use std::fmt;

/// Document processing error type
#[derive(Debug, Clone)]
pub enum DocumentError {
    /// Parse error - source could not be parsed structurally
    ParseError {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    /// Invalid document - required structure is missing
    InvalidDocument { message: String },
    /// IO error (for file operations)
    IoError { message: String },
    /// Internal error
    InternalError { message: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::ParseError {
                message,
                line,
                column,
            } => {
                if let (Some(l), Some(c)) = (line, column) {
                    write!(f, "Parse error at line {}, column {}: {}", l, c, message)
                } else if let Some(l) = line {
                    write!(f, "Parse error at line {}: {}", l, message)
                } else {
                    write!(f, "Parse error: {}", message)
                }
            }
            DocumentError::InvalidDocument { message } => {
                write!(f, "Invalid document: {}", message)
            }
            DocumentError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
            DocumentError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        DocumentError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

// Convenience constructors for errors
impl DocumentError {
    pub fn parse(message: impl Into<String>) -> Self {
        DocumentError::ParseError {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn parse_at(message: impl Into<String>, line: usize, column: usize) -> Self {
        DocumentError::ParseError {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        DocumentError::InvalidDocument {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DocumentError::InternalError {
            message: message.into(),
        }
    }
}
