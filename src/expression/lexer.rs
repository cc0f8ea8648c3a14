// SPDX-License-Identifier: MIT

//! Tokenizer for permission expressions
//!
//! Turns a raw expression into a flat token list that always ends with
//! [`TokenKind::Eof`]. Positions are character offsets into the source.

use crate::error::ExpressionError;
use std::fmt;

/// Kinds of tokens produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    String,
    Number,
    Boolean,
    Identifier,
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Eof,
}

/// A single lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; for strings, the unescaped contents without quotes
    pub text: String,
    /// Character offset of the first character of the token
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Human-readable description used in syntax errors
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::String => format!("string {:?}", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Identifier => "identifier",
            TokenKind::Eq => "'=='",
            TokenKind::Neq => "'!='",
            TokenKind::Gt => "'>'",
            TokenKind::Lt => "'<'",
            TokenKind::Gte => "'>='",
            TokenKind::Lte => "'<='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{}", name)
    }
}

/// Tokenize an expression string
pub fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ExpressionError> {
        while let Some(c) = self.peek(0) {
            let start = self.pos;
            match c {
                c if c.is_whitespace() => self.pos += 1,
                '"' | '\'' => self.string(c)?,
                c if c.is_ascii_digit() || c == '.' => self.number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
                '=' if self.peek(1) == Some('=') => self.push_op(TokenKind::Eq, "==", start),
                '!' if self.peek(1) == Some('=') => self.push_op(TokenKind::Neq, "!=", start),
                '>' if self.peek(1) == Some('=') => self.push_op(TokenKind::Gte, ">=", start),
                '<' if self.peek(1) == Some('=') => self.push_op(TokenKind::Lte, "<=", start),
                '&' if self.peek(1) == Some('&') => self.push_op(TokenKind::And, "&&", start),
                '|' if self.peek(1) == Some('|') => self.push_op(TokenKind::Or, "||", start),
                '!' => self.push_op(TokenKind::Not, "!", start),
                '>' => self.push_op(TokenKind::Gt, ">", start),
                '<' => self.push_op(TokenKind::Lt, "<", start),
                '(' => self.push_op(TokenKind::LParen, "(", start),
                ')' => self.push_op(TokenKind::RParen, ")", start),
                other => {
                    return Err(ExpressionError::lex(
                        start,
                        format!("Unexpected character '{}'", other),
                    ));
                }
            }
        }

        let end = self.chars.len();
        self.tokens.push(Token::new(TokenKind::Eof, "", end));
        Ok(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn push_op(&mut self, kind: TokenKind, text: &str, start: usize) {
        self.pos += text.len();
        self.tokens.push(Token::new(kind, text, start));
    }

    fn string(&mut self, quote: char) -> Result<(), ExpressionError> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut value = String::new();

        loop {
            let c = self
                .peek(0)
                .ok_or_else(|| ExpressionError::lex(start, "Unterminated string"))?;
            self.pos += 1;

            if c == quote {
                break;
            }
            if c != '\\' {
                value.push(c);
                continue;
            }

            let escaped = self
                .peek(0)
                .ok_or_else(|| ExpressionError::lex(start, "Unterminated string"))?;
            self.pos += 1;
            value.push(match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                // \\, \" and \' map to themselves, as does any unknown escape
                other => other,
            });
        }

        self.tokens.push(Token::new(TokenKind::String, value, start));
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::new(TokenKind::Number, text, start));
    }

    fn identifier(&mut self) {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = match text.as_str() {
            "true" | "false" => TokenKind::Boolean,
            _ => TokenKind::Identifier,
        };
        self.tokens.push(Token::new(kind, text, start));
    }
}
