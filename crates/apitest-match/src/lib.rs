//! Structural pattern matching over decoded JSON/XML document trees.
//!
//! An expected document ("pattern") is an ordinary document whose string
//! leaves may carry pattern tokens: type wildcards (`@string@`,
//! `@integer@`, ...), the full wildcard `@*@`, the trailing rest-of-array
//! marker `@...@`, regex-bound strings (`@string@.regex(...)`), sandboxed
//! boolean expressions (`@expr(...)@`), and caller-registered callbacks
//! (`@callback(...)@`). Matching walks the actual and pattern trees in
//! lock-step, treats objects as open (extra actual keys are ignored) and
//! arrays as closed (positional, exact length unless a rest marker is
//! present), and reports the first divergence with its path.
//!
//! # Example
//!
//! ```
//! use apitest_match::{matches, Value};
//!
//! let actual = Value::Object(vec![
//!     ("id".to_string(), Value::Int(17)),
//!     ("name".to_string(), Value::from("Star-Wars T-shirt")),
//! ]);
//! let pattern = Value::Object(vec![
//!     ("id".to_string(), Value::from("@integer@")),
//! ]);
//! assert!(matches(&actual, &pattern));
//! ```

mod matcher;
mod token;
mod tree;
mod value;

pub use matcher::{CallbackRegistry, MatchError, Mismatch};
pub use token::{classify, PatternLeaf, PatternToken, TypeKind};
pub use tree::{match_trees, matches};
pub use value::Value;
