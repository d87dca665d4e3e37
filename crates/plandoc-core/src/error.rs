//! Error taxonomy for every engine call.
//!
//! Each variant of [`PlanError`] carries the [`Operation`] that failed so a
//! caller can print the message verbatim and know which call to fix.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{CompletionState, Operation, Target};

/// A document that does not follow the plan schema closely enough to be
/// parsed without guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number where the problem was detected.
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// What is wrong with a reorder permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermutationDefect {
    /// Numbers that do not exist in the current scope.
    Unknown(Vec<u32>),
    /// Numbers listed more than once.
    Duplicate(Vec<u32>),
    /// Existing numbers absent from the permutation.
    Missing(Vec<u32>),
}

impl fmt::Display for PermutationDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, numbers) = match self {
            Self::Unknown(n) => ("unknown", n),
            Self::Duplicate(n) => ("duplicate", n),
            Self::Missing(n) => ("missing", n),
        };
        let list: Vec<String> = numbers.iter().map(u32::to_string).collect();
        write!(f, "{label} number(s): {}", list.join(", "))
    }
}

/// Errors returned by parsing, querying and mutating a plan document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("{op}: {target} not found")]
    NotFound { op: Operation, target: Target },

    #[error("{op}: {target} is already {state}")]
    AlreadyInState {
        op: Operation,
        target: Target,
        state: CompletionState,
    },

    #[error("{op}: invalid permutation for {scope}: {defect}")]
    InvalidPermutation {
        op: Operation,
        /// Human-readable scope, e.g. "threads" or "tasks of thread 2".
        scope: String,
        defect: PermutationDefect,
    },

    #[error("{op}: malformed input: {field}: {reason}")]
    MalformedInput {
        op: Operation,
        /// Path of the offending parameter, e.g. `tasks[0].title`.
        field: String,
        reason: String,
    },

    #[error("{op}: ambiguous document at {source}")]
    ParseAmbiguity {
        op: Operation,
        #[source]
        source: ParseError,
    },
}

impl PlanError {
    pub(crate) fn parse(op: Operation, source: ParseError) -> Self {
        Self::ParseAmbiguity { op, source }
    }

    pub(crate) fn malformed(
        op: Operation,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            op,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The operation that produced this error.
    pub fn operation(&self) -> Operation {
        match self {
            Self::NotFound { op, .. }
            | Self::AlreadyInState { op, .. }
            | Self::InvalidPermutation { op, .. }
            | Self::MalformedInput { op, .. }
            | Self::ParseAmbiguity { op, .. } => *op,
        }
    }
}

/// Errors from reading or committing a document file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read plan document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write plan document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
