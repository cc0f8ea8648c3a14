// SPDX-License-Identifier: MIT

//! Load-time validation of rule sets
//!
//! Every permission and workflow condition is compiled once so syntax
//! errors surface when the rules are loaded, with the position of the
//! problem and a hint for the usual authoring mistakes.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::types::RuleSet;
use crate::error::ExpressionError;
use crate::expression::{self, Limits, TokenKind};

/// One problem found in a rule set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Where the problem is, e.g. `entities.Ticket.permissions.update`
    pub location: String,
    /// Offending expression source, empty for structural problems
    pub expression: String,
    /// Character offset into `expression`
    pub position: Option<usize>,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)?;
        if !self.expression.is_empty() {
            write!(f, "\n    {}", self.expression)?;
            if let Some(position) = self.position {
                write!(f, "\n    {}^", " ".repeat(position))?;
            }
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    hint: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Checks every expression in a rule set
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    limits: Limits,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    /// Validate a whole rule set; an empty result means it is usable
    pub fn validate(&self, rules: &RuleSet) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for entity in &rules.entities {
            if !seen.insert(entity.name.as_str()) {
                issues.push(structural(
                    format!("entities.{}", entity.name),
                    "Duplicate entity name",
                ));
            }
            for (action, rule) in &entity.permissions {
                let location = format!("entities.{}.permissions.{}", entity.name, action);
                if let Some(issue) = self.check_expression(&location, &rule.expression()) {
                    issues.push(issue);
                }
            }
        }

        for workflow in &rules.workflows {
            let location = format!("workflows.{}", workflow.name);
            if workflow.trigger.event.trim().is_empty() {
                issues.push(structural(
                    format!("{}.trigger.event", location),
                    "Trigger event must not be empty",
                ));
            }
            if let Some(entity) = &workflow.trigger.entity {
                if rules.entity(entity).is_none() {
                    issues.push(structural(
                        format!("{}.trigger.entity", location),
                        format!("Unknown entity '{}'", entity),
                    ));
                }
            }
            if let Some(condition) = &workflow.trigger.condition {
                let location = format!("{}.trigger.condition", location);
                if let Some(issue) = self.check_expression(&location, condition) {
                    issues.push(issue);
                }
            }
        }

        for issue in &issues {
            log::warn!("{}", issue);
        }
        issues
    }

    /// Validate a single expression
    pub fn check_expression(&self, location: &str, source: &str) -> Option<ValidationIssue> {
        let err = expression::compile_with(source, &self.limits).err()?;
        Some(ValidationIssue {
            location: location.to_string(),
            expression: source.to_string(),
            position: err.position(),
            message: err.to_string(),
            suggestion: suggest(source, &err),
        })
    }
}

fn structural(location: String, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        location,
        expression: String::new(),
        position: None,
        message: message.into(),
        suggestion: None,
    }
}

/// Hint for the common mistakes people make writing expressions
fn suggest(source: &str, err: &ExpressionError) -> Option<String> {
    if source.trim().is_empty() {
        return Some("Write an expression such as `authenticated` or `true`".to_string());
    }

    if let ExpressionError::Lex { position, .. } = err {
        let hint = match source.chars().nth(*position)? {
            '=' => "Use '==' for comparison; a single '=' is not an operator",
            '&' => "Use '&&' for logical AND",
            '|' => "Use '||' for logical OR",
            '"' | '\'' => "Close the string literal with a matching quote",
            _ => return None,
        };
        return Some(hint.to_string());
    }

    let tokens = expression::tokenize(source).ok()?;

    let words: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Identifier)
        .filter_map(|t| match t.text.as_str() {
            "and" => Some("'&&' instead of 'and'"),
            "or" => Some("'||' instead of 'or'"),
            "not" => Some("'!' instead of 'not'"),
            _ => None,
        })
        .collect();
    if !words.is_empty() {
        return Some(format!("Use {}", words.join(", ")));
    }

    let opened = tokens.iter().filter(|t| t.kind == TokenKind::LParen).count();
    let closed = tokens.iter().filter(|t| t.kind == TokenKind::RParen).count();
    if opened != closed {
        return Some("Check that every '(' has a matching ')'".to_string());
    }

    None
}
