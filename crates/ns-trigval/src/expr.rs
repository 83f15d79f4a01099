//! String cut expressions for object selection.
//!
//! A cut such as `pt > 25 && abs(eta) < 2.5` is compiled once against the
//! variable table of an object type ([`CutVariables`]) and then evaluated per
//! object. Unknown variable names are rejected at compile time.
//!
//! Supported syntax: numbers (incl. scientific notation), variables (an
//! optional empty `()` after the name is accepted, so `pt()` and `pt` are the
//! same), arithmetic (+, -, *, /), comparisons (==, !=, <, <=, >, >=),
//! boolean operators (&&, ||, !, and the words `and`, `or`, `not`), and the
//! functions abs, sqrt, log, exp, pow, min, max.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, TrigValError};

/// Deepest nesting of parentheses, unary operators and function calls a cut
/// may use.
pub const MAX_NESTING: usize = 128;

/// Named numeric variables an object exposes to cut expressions.
pub trait CutVariables {
    /// Variable names; an expression refers to variable `i` by `VARIABLES[i]`.
    const VARIABLES: &'static [&'static str];

    /// Value of variable `index`.
    fn variable(&self, index: usize) -> f64;
}

#[derive(Debug, Clone)]
enum Node {
    Const(f64),
    Var(usize),
    Neg(Box<Node>),
    Not(Box<Node>),
    Binary(Op, Box<Node>, Box<Node>),
    Call(Func, Vec<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
enum Func {
    Abs,
    Sqrt,
    Log,
    Exp,
    Pow,
    Min,
    Max,
}

impl Func {
    fn lookup(name: &str) -> Option<(Func, usize)> {
        Some(match name {
            "abs" => (Func::Abs, 1),
            "sqrt" => (Func::Sqrt, 1),
            "log" => (Func::Log, 1),
            "exp" => (Func::Exp, 1),
            "pow" => (Func::Pow, 2),
            "min" => (Func::Min, 2),
            "max" => (Func::Max, 2),
            _ => return None,
        })
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn eval<T: CutVariables>(node: &Node, obj: &T) -> f64 {
    match node {
        Node::Const(v) => *v,
        Node::Var(i) => obj.variable(*i),
        Node::Neg(a) => -eval(a, obj),
        Node::Not(a) => truth(!(eval(a, obj) > 0.0)),
        Node::Binary(Op::And, a, b) => truth(eval(a, obj) > 0.0 && eval(b, obj) > 0.0),
        Node::Binary(Op::Or, a, b) => truth(eval(a, obj) > 0.0 || eval(b, obj) > 0.0),
        Node::Binary(op, a, b) => {
            let (l, r) = (eval(a, obj), eval(b, obj));
            match op {
                Op::Add => l + r,
                Op::Sub => l - r,
                Op::Mul => l * r,
                Op::Div => l / r,
                Op::Eq => truth((l - r).abs() < f64::EPSILON),
                Op::Ne => truth((l - r).abs() >= f64::EPSILON),
                Op::Lt => truth(l < r),
                Op::Le => truth(l <= r),
                Op::Gt => truth(l > r),
                Op::Ge => truth(l >= r),
                Op::And | Op::Or => unreachable!("short-circuit operators handled above"),
            }
        }
        Node::Call(f, args) => {
            let x = eval(&args[0], obj);
            match f {
                Func::Abs => x.abs(),
                Func::Sqrt => x.sqrt(),
                Func::Log => x.ln(),
                Func::Exp => x.exp(),
                Func::Pow => x.powf(eval(&args[1], obj)),
                Func::Min => x.min(eval(&args[1], obj)),
                Func::Max => x.max(eval(&args[1], obj)),
            }
        }
    }
}

/// A compiled cut over objects of type `T`.
pub struct CutSelector<T> {
    source: String,
    root: Node,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Clone for CutSelector<T> {
    fn clone(&self) -> Self {
        Self { source: self.source.clone(), root: self.root.clone(), _marker: PhantomData }
    }
}

impl<T> fmt::Debug for CutSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutSelector").field("source", &self.source).finish()
    }
}

impl<T: CutVariables> CutSelector<T> {
    /// Compile `input` against `T`'s variable table.
    ///
    /// A blank expression accepts every object.
    pub fn new(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        let root = if tokens.is_empty() {
            Node::Const(1.0)
        } else {
            let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0, names: T::VARIABLES };
            let root = parser.or_expr()?;
            if let Some(tok) = parser.tokens.get(parser.pos) {
                return Err(TrigValError::Expression(format!(
                    "unexpected {tok:?} after end of expression in '{input}'"
                )));
            }
            root
        };
        Ok(Self { source: input.to_string(), root, _marker: PhantomData })
    }

    /// Expression text this selector was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Numeric value of the expression for `obj`.
    pub fn evaluate(&self, obj: &T) -> f64 {
        eval(&self.root, obj)
    }

    /// `true` if the expression is positive for `obj` (NaN fails).
    pub fn passes(&self, obj: &T) -> bool {
        self.evaluate(obj) > 0.0
    }
}

// ── Tokens ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Op(Op),
    Not,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Tok>> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let pair = bytes.get(i..i + 2);
        let two = match pair {
            Some(b"&&") => Some(Tok::Op(Op::And)),
            Some(b"||") => Some(Tok::Op(Op::Or)),
            Some(b"==") => Some(Tok::Op(Op::Eq)),
            Some(b"!=") => Some(Tok::Op(Op::Ne)),
            Some(b"<=") => Some(Tok::Op(Op::Le)),
            Some(b">=") => Some(Tok::Op(Op::Ge)),
            _ => None,
        };
        if let Some(tok) = two {
            out.push(tok);
            i += 2;
            continue;
        }

        let single = match c {
            b'+' => Some(Tok::Op(Op::Add)),
            b'-' => Some(Tok::Op(Op::Sub)),
            b'*' => Some(Tok::Op(Op::Mul)),
            b'/' => Some(Tok::Op(Op::Div)),
            b'<' => Some(Tok::Op(Op::Lt)),
            b'>' => Some(Tok::Op(Op::Gt)),
            b'!' => Some(Tok::Not),
            b'(' => Some(Tok::LParen),
            b')' => Some(Tok::RParen),
            b',' => Some(Tok::Comma),
            _ => None,
        };
        if let Some(tok) = single {
            out.push(tok);
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == b'.' {
            let start = i;
            while i < bytes.len() {
                let d = bytes[i];
                let exp_sign = (d == b'+' || d == b'-')
                    && i > start
                    && matches!(bytes[i - 1], b'e' | b'E');
                if d.is_ascii_digit() || d == b'.' || d == b'e' || d == b'E' || exp_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            let text = &input[start..i];
            let value = text.parse::<f64>().map_err(|_| {
                TrigValError::Expression(format!("invalid number '{text}' at offset {start}"))
            })?;
            out.push(Tok::Num(value));
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            out.push(match &input[start..i] {
                "and" => Tok::Op(Op::And),
                "or" => Tok::Op(Op::Or),
                "not" => Tok::Not,
                word => Tok::Ident(word.to_string()),
            });
            continue;
        }

        let ch = input[i..].chars().next().unwrap_or('?');
        return Err(TrigValError::Expression(format!(
            "unexpected character '{ch}' at offset {i} in '{input}'"
        )));
    }

    Ok(out)
}

// ── Parser (recursive descent) ─────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Tok],
    pos: usize,
    depth: usize,
    names: &'static [&'static str],
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> Result<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(TrigValError::Expression(format!("expected {tok:?}, found {:?}", self.peek())))
        }
    }

    /// Run `inner` one nesting level deeper.
    fn nested(&mut self, inner: impl FnOnce(&mut Self) -> Result<Node>) -> Result<Node> {
        if self.depth >= MAX_NESTING {
            return Err(TrigValError::Expression(format!(
                "expression nested deeper than {MAX_NESTING} levels"
            )));
        }
        self.depth += 1;
        let node = inner(self);
        self.depth -= 1;
        node
    }

    /// Left-associative chain of `ops` over operands produced by `operand`.
    fn chain(
        &mut self,
        ops: &[Op],
        operand: fn(&mut Self) -> Result<Node>,
    ) -> Result<Node> {
        let mut lhs = operand(self)?;
        while let Some(Tok::Op(op)) = self.peek() {
            let op = *op;
            if !ops.contains(&op) {
                break;
            }
            self.pos += 1;
            let rhs = operand(self)?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn or_expr(&mut self) -> Result<Node> {
        self.chain(&[Op::Or], Self::and_expr)
    }

    fn and_expr(&mut self) -> Result<Node> {
        self.chain(&[Op::And], Self::comparison)
    }

    fn comparison(&mut self) -> Result<Node> {
        let lhs = self.additive()?;
        match self.peek() {
            Some(Tok::Op(op @ (Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge))) => {
                let op = *op;
                self.pos += 1;
                let rhs = self.additive()?;
                Ok(Node::Binary(op, Box::new(lhs), Box::new(rhs)))
            }
            _ => Ok(lhs),
        }
    }

    fn additive(&mut self) -> Result<Node> {
        self.chain(&[Op::Add, Op::Sub], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Node> {
        self.chain(&[Op::Mul, Op::Div], Self::unary)
    }

    fn unary(&mut self) -> Result<Node> {
        if self.eat(&Tok::Op(Op::Sub)) {
            let operand = self.nested(Self::unary)?;
            return Ok(Node::Neg(Box::new(operand)));
        }
        if self.eat(&Tok::Not) {
            let operand = self.nested(Self::unary)?;
            return Ok(Node::Not(Box::new(operand)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Node> {
        match self.next() {
            Some(Tok::Num(v)) => Ok(Node::Const(v)),
            Some(Tok::LParen) => {
                let inner = self.nested(Self::or_expr)?;
                self.expect(&Tok::RParen)?;
                Ok(inner)
            }
            Some(Tok::Ident(name)) => self.identifier(&name),
            other => Err(TrigValError::Expression(format!(
                "expected number, variable or '(', found {other:?}"
            ))),
        }
    }

    fn identifier(&mut self, name: &str) -> Result<Node> {
        if let Some((func, arity)) = Func::lookup(name) {
            self.expect(&Tok::LParen)?;
            let mut args = vec![self.nested(Self::or_expr)?];
            while self.eat(&Tok::Comma) {
                args.push(self.nested(Self::or_expr)?);
            }
            self.expect(&Tok::RParen)?;
            if args.len() != arity {
                return Err(TrigValError::Expression(format!(
                    "{name}() takes {arity} argument(s), got {}",
                    args.len()
                )));
            }
            return Ok(Node::Call(func, args));
        }

        let index = self.names.iter().position(|n| *n == name).ok_or_else(|| {
            TrigValError::Expression(format!(
                "unknown variable '{name}' (known: {})",
                self.names.join(", ")
            ))
        })?;
        // Accessor-call style: `pt()`.
        if self.eat(&Tok::LParen) {
            self.expect(&Tok::RParen)?;
        }
        Ok(Node::Var(index))
    }
}
