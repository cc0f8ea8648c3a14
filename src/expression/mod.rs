// SPDX-License-Identifier: MIT

//! Permission expression language
//!
//! Expressions are small boolean formulas over a read-only context:
//! - `user.role == 'admin'`
//! - `authenticated && entity.status != "archived"`
//! - `(status == "active" || status == "pending") && priority == "high"`
//!
//! [`evaluate`] and [`validate`] never fail: every lexical, syntax or
//! evaluation problem comes back as a failed [`ParseResult`].

mod ast;
mod context;
mod evaluator;
mod lexer;
mod parser;
mod value;

pub use ast::{BinaryOp, Expression, Literal, UnaryOp};
pub use context::Context;
pub use evaluator::{evaluate as evaluate_expression, evaluate_bool};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, Parser};
pub use value::{loose_cmp, loose_eq, string_to_number, Value};

use crate::error::ExpressionError;
use serde::{Deserialize, Serialize};

/// Outcome of [`evaluate`] or [`validate`]
///
/// Check `success` before reading `value` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParseResult {
    /// Successful evaluation
    pub fn value(value: bool) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    /// Successful validation
    pub fn valid() -> Self {
        Self {
            success: true,
            value: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.into()),
        }
    }

    /// `true` only for a successful evaluation that produced `true`
    pub fn is_true(&self) -> bool {
        self.success && self.value == Some(true)
    }
}

impl From<Result<bool, ExpressionError>> for ParseResult {
    fn from(result: Result<bool, ExpressionError>) -> Self {
        match result {
            Ok(value) => Self::value(value),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Input bounds applied before and during parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum expression length in characters
    pub max_length: Option<usize>,
    /// Maximum nesting of parentheses and `!`
    pub max_depth: Option<usize>,
}

impl Limits {
    pub const DEFAULT_MAX_LENGTH: usize = 8192;
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// No bounds at all
    pub fn unbounded() -> Self {
        Self {
            max_length: None,
            max_depth: None,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_length: Some(Self::DEFAULT_MAX_LENGTH),
            max_depth: Some(Self::DEFAULT_MAX_DEPTH),
        }
    }
}

/// Lex and parse an expression into its AST
pub fn compile(expression: &str) -> Result<Expression, ExpressionError> {
    compile_with(expression, &Limits::default())
}

/// [`compile`] with explicit limits
pub fn compile_with(expression: &str, limits: &Limits) -> Result<Expression, ExpressionError> {
    if let Some(max) = limits.max_length {
        if expression.chars().count() > max {
            return Err(ExpressionError::LimitExceeded { limit: "length", max });
        }
    }
    let tokens = tokenize(expression)?;
    Parser::new(tokens).with_max_depth(limits.max_depth).parse()
}

/// Evaluate an expression against a context
pub fn evaluate(expression: &str, ctx: &Context) -> ParseResult {
    evaluate_with(expression, ctx, &Limits::default())
}

/// [`evaluate`] with explicit limits
pub fn evaluate_with(expression: &str, ctx: &Context, limits: &Limits) -> ParseResult {
    let result = compile_with(expression, limits).and_then(|expr| evaluate_bool(&expr, ctx));
    if let Err(e) = &result {
        log::debug!("Rejected expression '{}': {}", expression, e);
    }
    result.into()
}

/// Check an expression's syntax without evaluating it
pub fn validate(expression: &str) -> ParseResult {
    validate_with(expression, &Limits::default())
}

/// [`validate`] with explicit limits
pub fn validate_with(expression: &str, limits: &Limits) -> ParseResult {
    match compile_with(expression, limits) {
        Ok(_) => ParseResult::valid(),
        Err(e) => {
            log::debug!("Invalid expression '{}': {}", expression, e);
            ParseResult::failure(e.to_string())
        }
    }
}
