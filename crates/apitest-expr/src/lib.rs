//! Sandboxed expression language for `@expr(...)@` response patterns.
//!
//! Expressions are evaluated against a single bound variable named `value`,
//! which holds the actual document value being matched. There is no way to
//! call out of the evaluator: the grammar covers literals, arithmetic,
//! comparison, boolean logic, string operators, element access, and a fixed
//! set of pure functions. Pattern files can therefore never execute code.
//!
//! Supports:
//! - Numbers: `42`, `3.14`
//! - Strings: `"hello"`, `"with \"escapes\""`
//! - Booleans: `true`, `false`
//! - Arrays: `[1, 2, 3]`
//! - Arithmetic: `+`, `-`, `*`, `/`, `%`
//! - Comparison: `==`, `!=`, `<`, `<=`, `>`, `>=`
//! - Logical: `and`, `or`, `not`
//! - String ops: `contains`, `startswith`, `endswith`, `matches`
//! - Membership: `in`
//! - Element access: `value[0]`, `value["key"]`, `value.key`
//! - Functions: `len(v)`, `type(v)`, `abs(v)`, `lower(v)`, `upper(v)`
//!
//! # Example
//!
//! ```
//! use apitest_expr::{eval_bool, Value};
//!
//! let actual = Value::Number(42.0);
//! assert!(eval_bool("value > 0 and value < 100", &actual).unwrap());
//! ```

use std::collections::HashMap;
use thiserror::Error;

mod eval;
mod parse;

pub use eval::evaluate;
pub use parse::parse;

/// A runtime value the evaluator operates on.
///
/// Numbers are uniformly f64 here; the distinction between integers and
/// doubles matters to the pattern matcher, not to expression arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
    Type(String),
}

impl Value {
    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(EvalError::TypeError {
                expected: "bool",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_number(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(EvalError::TypeError {
                expected: "number",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str, EvalError> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(EvalError::TypeError {
                expected: "string",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], EvalError> {
        match self {
            Value::Array(a) => Ok(a),
            _ => Err(EvalError::TypeError {
                expected: "array",
                got: self.type_name(),
            }),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Type(_) => "type",
        }
    }
}

/// Expression AST produced by [`parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Var(String),
    Array(Vec<Expr>),
    TypeLiteral(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        arg: Box<Expr>,
    },
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    Property {
        expr: Box<Expr>,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
}

/// The closed set of callable functions. A fixed enum rather than a name
/// lookup keeps the surface auditable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Func {
    Len,
    Type,
    Abs,
    Lower,
    Upper,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Func> {
        match name {
            "len" => Some(Func::Len),
            "type" => Some(Func::Type),
            "abs" => Some(Func::Abs),
            "lower" => Some(Func::Lower),
            "upper" => Some(Func::Upper),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },
    #[error("undefined variable: {0} (only 'value' is bound)")]
    UndefinedVariable(String),
    #[error("undefined function: {0}")]
    UndefinedFunction(String),
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("index out of bounds: {index} (len: {len})")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("key not found: {0}")]
    KeyNotFound(String),
}

/// Parse and evaluate `expr_str` with `value` bound to `bound`, expecting a
/// boolean result.
pub fn eval_bool(expr_str: &str, bound: &Value) -> Result<bool, EvalError> {
    let ast = parse(expr_str)?;
    evaluate(&ast, bound)?.as_bool()
}
