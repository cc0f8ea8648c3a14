//! Recursive-descent parser for permission expressions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := or EOF
//! or      := and ( '||' and )*
//! and     := cmp ( '&&' cmp )*
//! cmp     := unary ( ('=='|'!='|'>'|'<'|'>='|'<=') unary )*
//! unary   := '!' unary | primary
//! primary := STRING | NUMBER | BOOLEAN | IDENTIFIER | '(' or ')'
//! ```
//!
//! All binary levels fold to the left, comparisons included, so
//! `a == b == c` groups as `(a == b) == c`.

use super::ast::{BinaryOp, Expression};
use super::lexer::{Token, TokenKind};
use super::value::parse_number_literal;
use crate::error::ExpressionError;

/// Parse a token stream into an AST
pub fn parse(tokens: Vec<Token>) -> Result<Expression, ExpressionError> {
    Parser::new(tokens).parse()
}

/// Token-stream parser
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: Option<usize>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens
                .last()
                .map(|t| t.position + t.text.chars().count())
                .unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position: end,
            });
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
            max_depth: None,
        }
    }

    /// Bound the nesting of parentheses and `!`
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a complete expression; trailing tokens are an error
    pub fn parse(mut self) -> Result<Expression, ExpressionError> {
        let expr = self.or_expr()?;
        self.expect(TokenKind::Eof, "end of input")?;
        Ok(expr)
    }

    fn or_expr(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.and_expr()?;
        while self.eat(TokenKind::Or) {
            let right = self.and_expr()?;
            left = Expression::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.cmp_expr()?;
        while self.eat(TokenKind::And) {
            let right = self.cmp_expr()?;
            left = Expression::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn cmp_expr(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.unary()?;
        while let Some(op) = comparison_op(self.peek().kind) {
            self.advance();
            let right = self.unary()?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression, ExpressionError> {
        if !self.eat(TokenKind::Not) {
            return self.primary();
        }
        self.enter()?;
        let operand = self.unary()?;
        self.leave();
        Ok(Expression::not(operand))
    }

    fn primary(&mut self) -> Result<Expression, ExpressionError> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::String => Expression::string(token.text),
            TokenKind::Number => Expression::number(parse_number_literal(&token.text)),
            TokenKind::Boolean => Expression::boolean(token.text == "true"),
            TokenKind::Identifier => Expression::Identifier(token.text),
            TokenKind::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.or_expr()?;
                self.leave();
                self.expect(TokenKind::RParen, "')'")?;
                return Ok(inner);
            }
            _ => {
                return Err(ExpressionError::parse(
                    token.position,
                    "expression",
                    token.describe(),
                ))
            }
        };
        self.advance();
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        // The stream always ends in Eof and advance() never moves past it
        &self.tokens[self.current]
    }

    fn advance(&mut self) {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), ExpressionError> {
        if self.eat(kind) {
            return Ok(());
        }
        let found = self.peek();
        Err(ExpressionError::parse(
            found.position,
            expected,
            found.describe(),
        ))
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        match self.max_depth {
            Some(max) if self.depth > max => Err(ExpressionError::LimitExceeded {
                limit: "nesting depth",
                max,
            }),
            _ => Ok(()),
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

fn comparison_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::Neq => Some(BinaryOp::NotEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::Gte => Some(BinaryOp::Gte),
        TokenKind::Lte => Some(BinaryOp::Lte),
        _ => None,
    }
}
