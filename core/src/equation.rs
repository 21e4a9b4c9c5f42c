//! Arithmetic expressions carried as argument values.
//!
//! An [`Equation`] keeps its source text together with the parsed tree so it
//! can be displayed unchanged and evaluated repeatedly against different
//! variable bindings.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := '-' unary | power
//! power   := primary ('^' unary)?
//! primary := number | ident | ident '(' expr (',' expr)* ')' | '(' expr ')'
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

/// Errors from parsing or evaluating an [`Equation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquationError {
    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Abs,
    Sqrt,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl Function {
    fn lookup(name: &str) -> Option<(Function, usize)> {
        let entry = match name {
            "abs" => (Function::Abs, 1),
            "sqrt" => (Function::Sqrt, 1),
            "floor" => (Function::Floor, 1),
            "ceil" => (Function::Ceil, 1),
            "round" => (Function::Round, 1),
            "min" => (Function::Min, 2),
            "max" => (Function::Max, 2),
            _ => return None,
        };
        Some(entry)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

/// A parsed arithmetic expression.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use argbind_core::Equation;
///
/// let eq = Equation::parse("rate * (hours - 2) ^ 2").unwrap();
/// let vars = HashMap::from([("rate".to_string(), 1.5), ("hours".to_string(), 4.0)]);
/// assert_eq!(eq.evaluate(&vars).unwrap(), 6.0);
/// assert_eq!(eq.to_string(), "rate * (hours - 2) ^ 2");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    source: String,
    root: Expr,
}

impl Equation {
    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns [`EquationError::Parse`] with the byte offset of the first
    /// unexpected token.
    pub fn parse(source: impl Into<String>) -> Result<Self, EquationError> {
        let source = source.into();
        let tokens = tokenize(&source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let root = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error_at(token.offset, "unexpected trailing input"));
        }
        Ok(Self { source, root })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of all variables referenced by the expression, sorted.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_variables(&self.root, &mut names);
        names
    }

    /// Evaluates the expression.
    ///
    /// # Errors
    ///
    /// Returns [`EquationError::UnknownVariable`] for unbound variables and
    /// [`EquationError::DivisionByZero`] for `/` or `%` by zero.
    pub fn evaluate(&self, variables: &HashMap<String, f64>) -> Result<f64, EquationError> {
        eval(&self.root, variables)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn collect_variables<'a>(expr: &'a Expr, names: &mut BTreeSet<&'a str>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Variable(name) => {
            names.insert(name);
        }
        Expr::Negate(inner) => collect_variables(inner, names),
        Expr::Binary(_, lhs, rhs) => {
            collect_variables(lhs, names);
            collect_variables(rhs, names);
        }
        Expr::Call(_, args) => args.iter().for_each(|a| collect_variables(a, names)),
    }
}

fn eval(expr: &Expr, vars: &HashMap<String, f64>) -> Result<f64, EquationError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Variable(name) => vars
            .get(name)
            .copied()
            .ok_or_else(|| EquationError::UnknownVariable(name.clone())),
        Expr::Negate(inner) => Ok(-eval(inner, vars)?),
        Expr::Binary(op, lhs, rhs) => {
            let l = eval(lhs, vars)?;
            let r = eval(rhs, vars)?;
            match op {
                BinaryOp::Add => Ok(l + r),
                BinaryOp::Sub => Ok(l - r),
                BinaryOp::Mul => Ok(l * r),
                BinaryOp::Div | BinaryOp::Rem if r == 0.0 => Err(EquationError::DivisionByZero),
                BinaryOp::Div => Ok(l / r),
                BinaryOp::Rem => Ok(l % r),
                BinaryOp::Pow => Ok(l.powf(r)),
            }
        }
        Expr::Call(function, args) => {
            let values = args
                .iter()
                .map(|a| eval(a, vars))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match function {
                Function::Abs => values[0].abs(),
                Function::Sqrt => values[0].sqrt(),
                Function::Floor => values[0].floor(),
                Function::Ceil => values[0].ceil(),
                Function::Round => values[0].round(),
                Function::Min => values[0].min(values[1]),
                Function::Max => values[0].max(values[1]),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, EquationError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let kind = if c.is_ascii_digit() || c == '.' {
            let mut end = offset;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &source[offset..end];
            let number = text.parse::<f64>().map_err(|_| EquationError::Parse {
                position: offset,
                message: format!("invalid number \"{text}\""),
            })?;
            TokenKind::Number(number)
        } else if c.is_alphabetic() || c == '_' {
            let mut end = offset;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            TokenKind::Ident(source[offset..end].to_string())
        } else {
            chars.next();
            match c {
                '+' | '-' | '*' | '/' | '%' | '^' => TokenKind::Op(c),
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ',' => TokenKind::Comma,
                other => {
                    return Err(EquationError::Parse {
                        position: offset,
                        message: format!("unexpected character '{other}'"),
                    });
                }
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map(|t| t.offset + 1).unwrap_or(0)
    }

    fn error_at(&self, position: usize, message: &str) -> EquationError {
        EquationError::Parse {
            position,
            message: message.to_string(),
        }
    }

    fn expect(&mut self, expected: TokenKind, message: &str) -> Result<(), EquationError> {
        match self.next() {
            Some(token) if token.kind == expected => Ok(()),
            Some(token) => Err(self.error_at(token.offset, message)),
            None => Err(self.error_at(self.end_offset(), message)),
        }
    }

    fn expr(&mut self) -> Result<Expr, EquationError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, EquationError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/', '%']) {
            let rhs = self.unary()?;
            let op = match op {
                '*' => BinaryOp::Mul,
                '/' => BinaryOp::Div,
                _ => BinaryOp::Rem,
            };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EquationError> {
        if self.eat_op(&['-']).is_some() {
            return Ok(Expr::Negate(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, EquationError> {
        let base = self.primary()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EquationError> {
        let Some(token) = self.next() else {
            return Err(self.error_at(self.end_offset(), "unexpected end of expression"));
        };
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if self.peek().map(|t| &t.kind) != Some(&TokenKind::LParen) {
                    return Ok(Expr::Variable(name));
                }
                self.pos += 1;
                let Some((function, arity)) = Function::lookup(&name) else {
                    return Err(self.error_at(token.offset, &format!("unknown function {name}")));
                };
                let mut args = vec![self.expr()?];
                while self.peek().map(|t| &t.kind) == Some(&TokenKind::Comma) {
                    self.pos += 1;
                    args.push(self.expr()?);
                }
                self.expect(TokenKind::RParen, "expected ')'")?;
                if args.len() != arity {
                    return Err(self.error_at(
                        token.offset,
                        &format!("{name} takes {arity} argument(s), got {}", args.len()),
                    ));
                }
                Ok(Expr::Call(function, args))
            }
            _ => Err(self.error_at(token.offset, "expected a number, name or '('")),
        }
    }
}
