//! SQL syntax error type.

use std::fmt;

/// A syntax error with a 0-based byte position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Error message.
    pub message: String,
    /// Byte offset where the error was detected.
    pub pos: usize,
}

impl SyntaxError {
    /// Creates a new syntax error at the given position.
    pub fn new(message: impl Into<String>, pos: usize) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }

    /// Creates an error for an unexpected token.
    pub fn unexpected(expected: &str, found: &str, pos: usize) -> Self {
        Self::new(format!("expected {}, found {}", expected, found), pos)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.pos + 1)
    }
}

impl std::error::Error for SyntaxError {}
