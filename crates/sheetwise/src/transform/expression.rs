//! Arithmetic expressions for derived columns.
//!
//! The grammar lives in `expression.pest`:
//!
//! ```text
//! expr    := prefix* primary (infix prefix* primary)*
//! prefix  := '-' | '+'
//! infix   := '+' | '-' | '*' | '/' | '%'
//! primary := NUMBER | STRING | '[' column ']' | '(' expr ')'
//! ```
//!
//! `*`, `/` and `%` bind tighter than `+` and `-`; unary signs bind tightest.
//! `+` concatenates when either side is text. Nothing outside this grammar
//! can be executed.

use std::fmt;
use std::str::CharIndices;

use once_cell::sync::Lazy;
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::error::{Result, SheetwiseError};
use crate::input::{CellValue, Row, canonical_number};

/// Deepest run of open parentheses plus pending unary signs.
pub const MAX_NESTING: usize = 256;

/// Deepest syntax tree, counting operator nodes from leaf to root.
pub const MAX_TREE_DEPTH: usize = 1024;

// =============================================================================
// PARSER
// =============================================================================

#[derive(Parser)]
#[grammar = "transform/expression.pest"]
struct ExpressionParser;

static PRATT: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::subtract, Assoc::Left))
        .op(Op::infix(Rule::multiply, Assoc::Left)
            | Op::infix(Rule::divide, Assoc::Left)
            | Op::infix(Rule::remainder, Assoc::Left))
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos))
});

fn error(position: usize, message: impl Into<String>) -> SheetwiseError {
    SheetwiseError::Expression {
        position,
        message: message.into(),
    }
}

fn from_pest(err: pest::error::Error<Rule>) -> SheetwiseError {
    let position = match err.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    error(position, format!("{}", err.variant))
}

/// Reject input nested deeper than [`MAX_NESTING`] before it reaches the
/// recursive parser. Quoted text and column names are skipped.
fn check_nesting(input: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut signs = 0usize;
    let mut chars = input.char_indices();

    while let Some((pos, c)) = chars.next() {
        match c {
            '(' => {
                depth += 1;
                signs = 0;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                signs = 0;
            }
            '+' | '-' => signs += 1,
            '"' | '\'' => {
                skip_quoted(&mut chars, c);
                signs = 0;
            }
            '[' => {
                for (_, c) in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                }
                signs = 0;
            }
            c if c.is_whitespace() => {}
            _ => signs = 0,
        }
        if depth + signs > MAX_NESTING {
            return Err(error(
                pos,
                format!("expression nested deeper than {}", MAX_NESTING),
            ));
        }
    }
    Ok(())
}

fn skip_quoted(chars: &mut CharIndices<'_>, quote: char) {
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            c if c == quote => return,
            _ => {}
        }
    }
}

// =============================================================================
// SYNTAX TREE
// =============================================================================

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOp {
    fn from_rule(pair: &Pair<'_, Rule>) -> Result<Self> {
        match pair.as_rule() {
            Rule::add => Ok(BinaryOp::Add),
            Rule::subtract => Ok(BinaryOp::Subtract),
            Rule::multiply => Ok(BinaryOp::Multiply),
            Rule::divide => Ok(BinaryOp::Divide),
            Rule::remainder => Ok(BinaryOp::Remainder),
            rule => Err(error(
                pair.as_span().start(),
                format!("unexpected operator {:?}", rule),
            )),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        };
        f.write_str(symbol)
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Column(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Parse an expression.
pub fn parse(input: &str) -> Result<Expr> {
    check_nesting(input)?;
    let mut pairs = ExpressionParser::parse(Rule::formula, input).map_err(from_pest)?;
    let root = pairs
        .next()
        .ok_or_else(|| error(0, "empty expression"))?;
    build(root.into_inner()).map(|(expr, _)| expr)
}

/// An expression and the depth of its tree.
type Built = Result<(Expr, usize)>;

fn build(pairs: Pairs<'_, Rule>) -> Built {
    PRATT
        .map_primary(primary)
        .map_prefix(|op, operand| {
            let (expr, depth) = operand?;
            match op.as_rule() {
                Rule::neg => deepen(Expr::Negate(Box::new(expr)), depth, op.as_span().start()),
                _ => Ok((expr, depth)),
            }
        })
        .map_infix(|left, op, right| {
            let (left, left_depth) = left?;
            let (right, right_depth) = right?;
            let expr = Expr::Binary {
                op: BinaryOp::from_rule(&op)?,
                left: Box::new(left),
                right: Box::new(right),
            };
            deepen(expr, left_depth.max(right_depth), op.as_span().start())
        })
        .parse(pairs)
}

fn deepen(expr: Expr, child_depth: usize, position: usize) -> Built {
    let depth = child_depth + 1;
    if depth > MAX_TREE_DEPTH {
        return Err(error(
            position,
            format!("expression deeper than {} operations", MAX_TREE_DEPTH),
        ));
    }
    Ok((expr, depth))
}

fn primary(pair: Pair<'_, Rule>) -> Built {
    let position = pair.as_span().start();
    match pair.as_rule() {
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(|n| (Expr::Number(n), 0))
            .map_err(|_| error(position, format!("invalid number '{}'", pair.as_str()))),
        Rule::string => Ok((Expr::Text(unescape(inner_text(pair))), 0)),
        Rule::column => Ok((Expr::Column(inner_text(pair).to_string()), 0)),
        Rule::expr => build(pair.into_inner()),
        rule => Err(error(position, format!("unexpected {:?}", rule))),
    }
}

/// Text of the single inner pair, e.g. the name inside `[...]`.
fn inner_text(pair: Pair<'_, Rule>) -> &str {
    pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default()
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Intermediate value during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    fn into_text(self) -> String {
        match self {
            Value::Number(n) => canonical_number(n),
            Value::Text(s) => s,
        }
    }
}

/// Resolve a cell for arithmetic: empty or missing cells are zero and
/// numeric-looking text is a number.
fn resolve(row: &Row, name: &str) -> Value {
    match row.get(name) {
        None | Some(CellValue::Null) => Value::Number(0.0),
        Some(CellValue::Number(n)) => Value::Number(*n),
        Some(CellValue::Bool(b)) => Value::Number(if *b { 1.0 } else { 0.0 }),
        Some(CellValue::Text(s)) if s.is_empty() => Value::Number(0.0),
        Some(CellValue::Text(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(s.clone()),
        },
    }
}

impl Expr {
    /// Column names referenced by the expression, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => out.push(name),
            Expr::Negate(inner) => inner.collect_columns(out),
            Expr::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Number(_) | Expr::Text(_) => {}
        }
    }

    /// Evaluate against one row. Arithmetic on text is an error.
    pub fn evaluate(&self, row: &Row) -> Result<Value> {
        match self {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Text(s) => Ok(Value::Text(s.clone())),
            Expr::Column(name) => Ok(resolve(row, name)),
            Expr::Negate(inner) => match inner.evaluate(row)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                Value::Text(_) => Err(error(0, "cannot negate text")),
            },
            Expr::Binary { op, left, right } => {
                let left = left.evaluate(row)?;
                let right = right.evaluate(row)?;
                match (op, left, right) {
                    (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (BinaryOp::Add, a, b) => Ok(Value::Text(a.into_text() + &b.into_text())),
                    (op, Value::Number(a), Value::Number(b)) => Ok(Value::Number(match op {
                        BinaryOp::Subtract => a - b,
                        BinaryOp::Multiply => a * b,
                        BinaryOp::Divide => a / b,
                        BinaryOp::Remainder => a % b,
                        BinaryOp::Add => a + b,
                    })),
                    (op, _, _) => Err(error(0, format!("operator '{}' needs numbers", op))),
                }
            }
        }
    }

    /// Evaluate to a cell. Errors and non-finite results become `Null`.
    pub fn evaluate_cell(&self, row: &Row) -> CellValue {
        match self.evaluate(row) {
            Ok(Value::Number(n)) if n.is_finite() => CellValue::Number(n),
            Ok(Value::Text(s)) => CellValue::Text(s),
            _ => CellValue::Null,
        }
    }
}

/// A derived-column expression prepared once and evaluated per row.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedColumn {
    /// No column references: the expression text itself is the value.
    Static(String),
    Compiled(Expr),
    /// The expression does not parse; every row gets `Null`.
    Invalid,
}

impl DerivedColumn {
    pub fn compile(expression: &str) -> Self {
        if !has_column_reference(expression) {
            return DerivedColumn::Static(expression.to_string());
        }
        match parse(expression) {
            Ok(expr) => DerivedColumn::Compiled(expr),
            Err(_) => DerivedColumn::Invalid,
        }
    }

    pub fn evaluate(&self, row: &Row) -> CellValue {
        match self {
            DerivedColumn::Static(text) => CellValue::text(text.as_str()),
            DerivedColumn::Compiled(expr) => expr.evaluate_cell(row),
            DerivedColumn::Invalid => CellValue::Null,
        }
    }
}

/// Evaluate a derived-column expression against one row.
pub fn evaluate(expression: &str, row: &Row) -> CellValue {
    DerivedColumn::compile(expression).evaluate(row)
}

fn has_column_reference(expression: &str) -> bool {
    expression
        .find('[')
        .is_some_and(|open| expression[open + 1..].find(']').is_some_and(|close| close > 0))
}
