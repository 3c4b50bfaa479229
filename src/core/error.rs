//! Error types for chronoweave.
//!
//! Only construction-time problems are errors. Everything that can happen
//! while a well-formed program runs (unresolved outcomes, runs that have
//! not converged, cycles) is reported as data by the engine.

use thiserror::Error;

use super::address::Value;
use crate::ast::OpCode;

/// Result alias used across the crate.
pub type ChronoResult<T> = std::result::Result<T, ChronoError>;

/// A malformed program or program text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChronoError {
    /// The mnemonic names none of the seven opcodes.
    #[error("unknown opcode `{word}`")]
    UnknownOpcode { word: String },

    /// The opcode never takes an operand but a literal was supplied.
    #[error("`{opcode}` does not take a literal (step {step})")]
    UnexpectedLiteral { opcode: OpCode, step: usize },

    /// A number that does not follow a mnemonic.
    #[error("literal {literal} does not follow an opcode")]
    StrayLiteral { literal: Value },

    /// A numeric token that does not fit a value.
    #[error("invalid literal `{text}`")]
    InvalidLiteral { text: String },

    /// A parse error, located.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ChronoError>,
    },
}

impl ChronoError {
    /// Attach a 1-based source line to this error.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            located @ ChronoError::AtLine { .. } => located,
            other => ChronoError::AtLine { line, source: Box::new(other) },
        }
    }

    /// The underlying error with any location stripped.
    pub fn root(&self) -> &ChronoError {
        match self {
            ChronoError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}
