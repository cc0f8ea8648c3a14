//! Tree-walking evaluator for permission expressions

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expression, Literal, UnaryOp};
use super::context::Context;
use super::value::{loose_cmp, loose_eq, Value};
use crate::error::ExpressionError;

/// Evaluate an expression against a context
///
/// Missing context paths evaluate to [`Value::Undefined`] rather than an
/// error. `&&` and `||` always evaluate both operands.
pub fn evaluate<'a>(expr: &'a Expression, ctx: &'a Context) -> Result<Value<'a>, ExpressionError> {
    match expr {
        Expression::Literal(lit) => Ok(evaluate_literal(lit)),
        Expression::Identifier(path) => {
            if path.is_empty() {
                return Err(ExpressionError::eval("identifier with an empty path"));
            }
            Ok(ctx.resolve(path))
        }
        Expression::Binary { .. } => evaluate_chain(expr, ctx),
        Expression::Unary {
            op: UnaryOp::Not,
            operand,
        } => Ok(Value::Bool(!evaluate(operand, ctx)?.truthy())),
    }
}

/// Left-folded operator chains nest down the left spine, as deep as the
/// chain is long. Walk the spine with a loop so stack use stays bounded by
/// parentheses and `!`, which the parser limits.
fn evaluate_chain<'a>(
    expr: &'a Expression,
    ctx: &'a Context,
) -> Result<Value<'a>, ExpressionError> {
    let mut spine = Vec::new();
    let mut node = expr;
    while let Expression::Binary { op, left, right } = node {
        spine.push((*op, right.as_ref()));
        node = left.as_ref();
    }

    let mut value = evaluate(node, ctx)?;
    for (op, right) in spine.into_iter().rev() {
        let right = evaluate(right, ctx)?;
        value = Value::Bool(apply_binary(op, value, right));
    }
    Ok(value)
}

/// Evaluate and coerce the result to a boolean
pub fn evaluate_bool(expr: &Expression, ctx: &Context) -> Result<bool, ExpressionError> {
    evaluate(expr, ctx).map(|value| value.truthy())
}

fn evaluate_literal(lit: &Literal) -> Value<'_> {
    match lit {
        Literal::String(s) => Value::String(s),
        Literal::Number(n) => Value::Number(*n),
        Literal::Boolean(b) => Value::Bool(*b),
    }
}

fn apply_binary(op: BinaryOp, left: Value<'_>, right: Value<'_>) -> bool {
    match op {
        BinaryOp::Eq => loose_eq(left, right),
        BinaryOp::NotEq => !loose_eq(left, right),
        BinaryOp::Gt => loose_cmp(left, right) == Some(Ordering::Greater),
        BinaryOp::Lt => loose_cmp(left, right) == Some(Ordering::Less),
        BinaryOp::Gte => matches!(
            loose_cmp(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        BinaryOp::Lte => matches!(
            loose_cmp(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        BinaryOp::And => left.truthy() && right.truthy(),
        BinaryOp::Or => left.truthy() || right.truthy(),
    }
}
