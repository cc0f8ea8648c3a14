// SPDX-License-Identifier: MIT

//! permit-rs: a small boolean expression language for permission rules
//!
//! - [`expression`] - lexer, parser and evaluator with JS-style loose comparison
//! - [`rules`] - YAML rule sets, load-time validation and request-time checks
//! - [`server`] - HTTP endpoints over both
//!
//! ```
//! use permit_rs::{evaluate, Context};
//! use serde_json::json;
//!
//! let ctx = Context::new().with("user", json!({"role": "admin"}));
//! assert!(evaluate("user.role == 'admin'", &ctx).is_true());
//! ```

pub mod config;
pub mod error;
pub mod expression;
pub mod rules;
pub mod server;

pub use error::{ExpressionError, PermitError};
pub use expression::{evaluate, validate, Context, Limits, ParseResult};
