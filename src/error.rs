// SPDX-License-Identifier: MIT

//! Typed error handling for permit-rs
//!
//! `ExpressionError` covers everything that can go wrong between a raw
//! expression string and its result. `PermitError` is the crate-level type
//! used by the rules loader, the CLI and the server.

use thiserror::Error;

use crate::rules::ValidationIssue;

/// Errors raised while lexing, parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// Unterminated string or a character that starts no token
    #[error("{message} at position {position}")]
    Lex { position: usize, message: String },

    /// Token sequence does not match the grammar
    #[error("Expected {expected} but found {found} at position {position}")]
    Parse {
        position: usize,
        expected: String,
        found: String,
    },

    /// Malformed AST reached the evaluator. The parser never produces one.
    #[error("Evaluation error: {message}")]
    Eval { message: String },

    /// Input longer or deeper than the configured `Limits`
    #[error("Expression exceeds maximum {limit} of {max}")]
    LimitExceeded { limit: &'static str, max: usize },
}

impl ExpressionError {
    pub fn lex(position: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            position,
            message: message.into(),
        }
    }

    pub fn parse(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Parse {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        Self::Eval {
            message: message.into(),
        }
    }

    /// Character offset of the offending input, when there is one
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex { position, .. } | Self::Parse { position, .. } => Some(*position),
            Self::Eval { .. } | Self::LimitExceeded { .. } => None,
        }
    }
}

/// Top-level error type for permit-rs
#[derive(Debug, Error)]
pub enum PermitError {
    /// Expression failed to compile or evaluate
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Configuration errors (bad env vars, bad CLI input)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Context document is not a JSON object
    #[error("Invalid context: {0}")]
    Context(String),

    /// Rule set failed load-time validation
    #[error("Rule set has {} invalid entries", .0.len())]
    InvalidRules(Vec<ValidationIssue>),

    /// Rules file not found
    #[error("Rules file not found: {0}")]
    RulesNotFound(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl PermitError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a context error
    pub fn context(message: impl Into<String>) -> Self {
        Self::Context(message.into())
    }
}
