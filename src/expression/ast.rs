// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for permission expressions

use std::fmt;

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// String, number or boolean literal
    Literal(Literal),
    /// Dotted context path, e.g. `user.role`
    Identifier(String),
    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Prefix operation
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
}

/// Binary operators, comparisons and logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// ==
    Eq,
    /// !=
    NotEq,
    /// >
    Gt,
    /// <
    Lt,
    /// >=
    Gte,
    /// <=
    Lte,
    /// &&
    And,
    /// ||
    Or,
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// !
    Not,
}

/// Literal values in expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Expression {
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn identifier(path: impl Into<String>) -> Self {
        Expression::Identifier(path.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Expression::Literal(Literal::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Literal::Boolean(value))
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gte => write!(f, ">="),
            BinaryOp::Lte => write!(f, "<="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Renders a fully parenthesized form, so the grouping the parser chose is visible.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(lit) => write!(f, "{}", lit),
            Expression::Identifier(path) => write!(f, "{}", path),
            Expression::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expression::Unary { op, operand } => write!(f, "{}{}", op, operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_display() {
        assert_eq!(format!("{}", BinaryOp::Eq), "==");
        assert_eq!(format!("{}", BinaryOp::NotEq), "!=");
        assert_eq!(format!("{}", BinaryOp::Gt), ">");
        assert_eq!(format!("{}", BinaryOp::Gte), ">=");
        assert_eq!(format!("{}", BinaryOp::Lt), "<");
        assert_eq!(format!("{}", BinaryOp::Lte), "<=");
        assert_eq!(format!("{}", BinaryOp::And), "&&");
        assert_eq!(format!("{}", BinaryOp::Or), "||");
    }

    #[test]
    fn test_expression_display_is_parenthesized() {
        let expr = Expression::binary(
            BinaryOp::Or,
            Expression::binary(
                BinaryOp::Eq,
                Expression::identifier("user.role"),
                Expression::string("admin"),
            ),
            Expression::not(Expression::identifier("banned")),
        );
        assert_eq!(expr.to_string(), r#"((user.role == "admin") || !banned)"#);
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Expression::number(1.5).to_string(), "1.5");
        assert_eq!(Expression::boolean(false).to_string(), "false");
        assert_eq!(Expression::string("a\"b").to_string(), r#""a\"b""#);
    }
}
