//! Row formulas for calculated columns.
//!
//! A formula is a small arithmetic expression over the cells of one row:
//!
//! ```text
//! price * quantity
//! [Unit Price] * (1 - discount)
//! first_name + " " + last_name
//! ```
//!
//! Column references are bare identifiers or bracketed names. `+` adds two
//! numeric operands and concatenates when either side is non-numeric text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WranglerError};
use crate::value::{format_number, CellValue, Row};

/// A parsed formula. Serializes as its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse formula text.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(WranglerError::Formula(format!(
                "unexpected {} in '{}'",
                token, source
            )));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// The formula as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Columns referenced by the formula, in order of first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.expr.collect_columns(&mut out);
        out
    }

    /// Evaluate against one row.
    pub fn evaluate(&self, row: &Row) -> Result<CellValue> {
        self.expr.evaluate(row)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl FromStr for Formula {
    type Err = WranglerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Formula {
    type Error = WranglerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> Self {
        formula.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Text(String),
    Column(String),
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn collect_columns(&self, out: &mut Vec<String>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Negate(inner) => inner.collect_columns(out),
            Expr::Binary(_, left, right) => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Number(_) | Expr::Text(_) => {}
        }
    }

    fn evaluate(&self, row: &Row) -> Result<CellValue> {
        match self {
            Expr::Number(n) => Ok(CellValue::Number(*n)),
            Expr::Text(s) => Ok(CellValue::text(s.as_str())),
            Expr::Column(name) => row
                .get(name)
                .cloned()
                .ok_or_else(|| WranglerError::Formula(format!("unknown column '{}'", name))),
            Expr::Negate(inner) => {
                let value = inner.evaluate(row)?;
                Ok(CellValue::Number(-operand(&value)?))
            }
            Expr::Binary(op, left, right) => {
                let left = left.evaluate(row)?;
                let right = right.evaluate(row)?;
                apply_binary(*op, &left, &right)
            }
        }
    }
}

fn operand(value: &CellValue) -> Result<f64> {
    value
        .numeric_value()
        .ok_or_else(|| WranglerError::Formula(format!("'{}' is not a number", value)))
}

fn is_text(value: &CellValue) -> bool {
    matches!(value, CellValue::String(_)) && value.numeric_value().is_none()
}

fn apply_binary(op: BinaryOp, left: &CellValue, right: &CellValue) -> Result<CellValue> {
    if op == BinaryOp::Add && (is_text(left) || is_text(right)) {
        return Ok(CellValue::String(format!(
            "{}{}",
            display(left),
            display(right)
        )));
    }

    let a = operand(left)?;
    let b = operand(right)?;
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(WranglerError::Formula("division by zero".into()));
            }
            a / b
        }
    };
    if result.is_finite() {
        Ok(CellValue::Number(result))
    } else {
        Err(WranglerError::Formula("result is not finite".into()))
    }
}

fn display(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) => format_number(*n),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", format_number(*n)),
            Token::Text(s) => write!(f, "string \"{}\"", s),
            Token::Ident(s) => write!(f, "column '{}'", s),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                text.push(escaped);
                            }
                        }
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => text.push(ch),
                    }
                }
                if !closed {
                    return Err(WranglerError::Formula(format!(
                        "unterminated string starting at {}",
                        start
                    )));
                }
                tokens.push(Token::Text(text));
            }
            '[' => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == ']' {
                        closed = true;
                        break;
                    }
                    name.push(ch);
                }
                if !closed {
                    return Err(WranglerError::Formula(format!(
                        "unterminated column reference starting at {}",
                        start
                    )));
                }
                tokens.push(Token::Ident(name));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &source[start..end];
                let number = literal.parse::<f64>().map_err(|_| {
                    WranglerError::Formula(format!("invalid number '{}'", literal))
                })?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(source[start..end].to_string()));
            }
            other => {
                return Err(WranglerError::Formula(format!(
                    "unexpected character '{}' at {}",
                    other, start
                )));
            }
        }
    }

    Ok(tokens)
}

/// Deepest expression tree the parser will build.
const MAX_DEPTH: usize = 256;

/// Recursive-descent parser over the token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(WranglerError::Formula("formula nested too deeply".into()));
        }
        Ok(())
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<Expr> {
        let outer = self.depth;
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => {
                    self.depth = outer;
                    return Ok(left);
                }
            };
            self.pos += 1;
            self.descend()?;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr> {
        let outer = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => {
                    self.depth = outer;
                    return Ok(left);
                }
            };
            self.pos += 1;
            self.descend()?;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            self.descend()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Text(s)) => Ok(Expr::Text(s)),
            Some(Token::Ident(name)) => Ok(Expr::Column(name)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.expression()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(WranglerError::Formula("expected ')'".into())),
                }
            }
            Some(token) => Err(WranglerError::Formula(format!("unexpected {}", token))),
            None => Err(WranglerError::Formula("unexpected end of formula".into())),
        }
    }
}
