//! Fixed-grammar math expression evaluator for function-derived series.
//!
//! Expressions are parsed into a small AST before anything is evaluated:
//!
//! ```text
//! expr   := term (('+'|'-') term)*
//! term   := factor (('*'|'/'|'%') factor)*
//! factor := ('-'|'+') factor | power
//! power  := atom ('^' factor)?            right-associative
//! atom   := number | 'x' | 'pi' | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! The grammar has exactly one variable (`x`), one constant (`pi`) and a
//! fixed set of unary functions. Any other name is a parse error, so a
//! malformed or hostile input string is rejected before evaluation starts.

use std::fmt;

use thiserror::Error;

/// Errors from parsing or sampling an expression.
#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    /// A name that is neither `x`, `pi` nor a known function.
    #[error("unknown name in expression: {0:?}")]
    UnknownName(String),

    /// A character the tokenizer does not accept.
    #[error("unexpected character {0:?} in expression")]
    UnexpectedChar(char),

    /// A malformed numeric literal.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// The expression ended where a value or `)` was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A token that does not fit the grammar at this position.
    #[error("unexpected {0:?} in expression")]
    UnexpectedToken(String),

    /// Sampling needs at least one point.
    #[error("sample count must be at least 1")]
    InvalidSampleCount,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '0'..='9' | '.' => {
                let mut lit = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        lit.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = lit
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(lit.clone()))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        name.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// The fixed set of unary functions the grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Ln,
    Sqrt,
    Abs,
    Round,
    Floor,
    Ceil,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "exp" => Func::Exp,
            "ln" => Func::Ln,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "round" => Func::Round,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            _ => return None,
        })
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
            Func::Round => v.round(),
            Func::Floor => v.floor(),
            Func::Ceil => v.ceil(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Ast {
    Num(f64),
    X,
    Pi,
    Neg(Box<Ast>),
    Call(Func, Box<Ast>),
    Bin(BinOp, Box<Ast>, Box<Ast>),
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
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, wanted: Token) -> Result<(), ExprError> {
        match self.next() {
            Some(tok) if tok == wanted => Ok(()),
            Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<Ast, ExprError> {
        let mut lhs = self.term()?;
        while let Some(op) = match self.peek() {
            Some(Token::Plus) => Some(BinOp::Add),
            Some(Token::Minus) => Some(BinOp::Sub),
            _ => None,
        } {
            self.next();
            let rhs = self.term()?;
            lhs = Ast::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Ast, ExprError> {
        let mut lhs = self.factor()?;
        while let Some(op) = match self.peek() {
            Some(Token::Star) => Some(BinOp::Mul),
            Some(Token::Slash) => Some(BinOp::Div),
            Some(Token::Percent) => Some(BinOp::Rem),
            _ => None,
        } {
            self.next();
            let rhs = self.factor()?;
            lhs = Ast::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Ast, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                Ok(Ast::Neg(Box::new(self.factor()?)))
            }
            Some(Token::Plus) => {
                self.next();
                self.factor()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Ast, ExprError> {
        let base = self.atom()?;
        if let Some(Token::Caret) = self.peek() {
            self.next();
            // Right-associative: 2^3^2 == 2^(3^2)
            let exponent = self.factor()?;
            return Ok(Ast::Bin(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Ast, ExprError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Ast::Num(n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Ast::X),
                "pi" => Ok(Ast::Pi),
                _ => {
                    let func =
                        Func::from_name(&name).ok_or(ExprError::UnknownName(name))?;
                    self.expect(Token::LParen)?;
                    let arg = self.expr()?;
                    self.expect(Token::RParen)?;
                    Ok(Ast::Call(func, Box::new(arg)))
                }
            },
            Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// A parsed, ready-to-evaluate expression in the variable `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    ast: Ast,
}

impl Expr {
    /// Parse `src`. Unknown names and anything outside the grammar fail
    /// here; nothing is evaluated for a rejected input.
    pub fn parse(src: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ast = parser.expr()?;
        match parser.next() {
            None => Ok(Expr { ast }),
            Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
        }
    }

    /// Evaluate at a given `x`.
    pub fn eval(&self, x: f64) -> f64 {
        eval_ast(&self.ast, x)
    }
}

fn eval_ast(ast: &Ast, x: f64) -> f64 {
    match ast {
        Ast::Num(n) => *n,
        Ast::X => x,
        Ast::Pi => std::f64::consts::PI,
        Ast::Neg(inner) => -eval_ast(inner, x),
        Ast::Call(func, arg) => func.apply(eval_ast(arg, x)),
        Ast::Bin(op, lhs, rhs) => {
            let l = eval_ast(lhs, x);
            let r = eval_ast(rhs, x);
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Rem => l % r,
                BinOp::Pow => l.powf(r),
            }
        }
    }
}

/// `count` evenly spaced points over the closed interval `[min, max]`.
///
/// `count == 1` yields just `min`; `count == 0` is rejected.
pub fn linspace(min: f64, max: f64, count: usize) -> Result<Vec<f64>, ExprError> {
    match count {
        0 => Err(ExprError::InvalidSampleCount),
        1 => Ok(vec![min]),
        n => {
            let step = (max - min) / (n - 1) as f64;
            Ok((0..n).map(|i| min + step * i as f64).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, x: f64) -> f64 {
        Expr::parse(src).unwrap().eval(x)
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("10 % 4", 0.0), 2.0);
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("-x + 1", 3.0), -2.0);
    }

    #[test]
    fn variable_and_constants() {
        assert_eq!(eval("x*x", 4.0), 16.0);
        assert!((eval("cos(pi)", 0.0) + 1.0).abs() < 1e-12);
        assert!((eval("sqrt(x)", 9.0) - 3.0).abs() < 1e-12);
        assert_eq!(eval("round(x / 2)", 5.0), 3.0);
    }

    #[test]
    fn unknown_names_fail_closed() {
        assert_eq!(
            Expr::parse("import os"),
            Err(ExprError::UnknownName("import".into()))
        );
        assert_eq!(
            Expr::parse("system(x)"),
            Err(ExprError::UnknownName("system".into()))
        );
        assert!(Expr::parse("x; x").is_err());
    }

    #[test]
    fn malformed_expressions_fail() {
        assert_eq!(Expr::parse("1 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(Expr::parse("sin x"), Err(ExprError::UnexpectedToken("x".into())));
        assert!(Expr::parse("(1 + 2").is_err());
        assert!(Expr::parse("1 2").is_err());
        assert_eq!(
            Expr::parse("1.2.3"),
            Err(ExprError::InvalidNumber("1.2.3".into()))
        );
    }

    #[test]
    fn linspace_is_closed_interval() {
        assert_eq!(linspace(1.0, 4.0, 4).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(linspace(0.0, 1.0, 1).unwrap(), vec![0.0]);
        assert_eq!(linspace(0.0, 1.0, 0), Err(ExprError::InvalidSampleCount));
    }
}
