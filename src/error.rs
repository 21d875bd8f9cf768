//! Error types for the Mica IR assembler.
//!
//! Every error is fatal for the file being assembled: the pipeline either
//! produces a complete, fully linked module or no module at all.

use std::fmt;

use thiserror::Error;

/// Line/column position of a token in the source text (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Main error type for the assembler pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Illegal character or unterminated literal in the source text.
    #[error("lex error at {span}: {message}")]
    Lex { span: Span, message: String },

    /// Grammar violation, with the expected construct and what was found.
    #[error("syntax error at {span}: expected {expected}, found {found}")]
    Syntax {
        span: Span,
        expected: String,
        found: String,
    },

    /// The same name or number declared twice in one scope.
    #[error("duplicate definition of {0}")]
    DuplicateDefinition(String),

    /// An unnamed entity was written with an explicit number that does not
    /// match its implicit slot.
    #[error("invalid implicit identifier in {scope}: expected {expected}, found {found}")]
    Numbering {
        scope: String,
        expected: u64,
        found: u64,
    },

    /// References that were never bound to a definition. Collects every
    /// unresolved reference found in the file, not just the first.
    #[error("unresolved references: {}", .0.join(", "))]
    Unresolved(Vec<String>),

    /// An operand's type does not satisfy its instruction's constraint.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// I/O failure while reading a source file.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
