//! Scalar matching: one `(actual, pattern-leaf)` pair at a time.

use crate::token::{PatternLeaf, PatternToken};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Caller-supplied named predicates for `@callback(<name>)@` patterns.
///
/// The registry is bound before matching and read-only during it, so a
/// matcher holding a reference stays reentrant.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Box<dyn Fn(&Value) -> bool + Send + Sync>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Box::new(callback));
    }

    pub fn get(&self, name: &str) -> Option<&(dyn Fn(&Value) -> bool + Send + Sync)> {
        self.callbacks.get(name).map(|b| b.as_ref())
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &names)
            .finish()
    }
}

/// The most specific failure found, with the path where matching diverged.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Dotted/indexed location like `products[2].name`; empty at the root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "at \"{}\": {}", self.path, self.message)
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    /// The documents diverge; carries the first divergence found.
    #[error("{0}")]
    Mismatch(Mismatch),
    /// A `@callback(...)@` pattern names a callback nobody registered. This
    /// is a harness setup bug, not a data mismatch, and aborts immediately.
    #[error("unregistered callback '{0}'")]
    UnregisteredCallback(String),
}

/// Outcome of one scalar rule, before path information is attached.
pub(crate) enum ScalarOutcome {
    Pass,
    Fail(String),
    ConfigError(MatchError),
}

/// Match one actual value against one classified pattern leaf.
///
/// Dispatch is a single match over the leaf enum: the classification pass in
/// [`crate::token`] already decided which rule applies, which fixes the
/// specific-before-general ordering a string-probing matcher chain would
/// need.
pub(crate) fn match_scalar(
    actual: &Value,
    leaf: &PatternLeaf,
    callbacks: &CallbackRegistry,
) -> ScalarOutcome {
    match leaf {
        PatternLeaf::Literal(expected) => literal_rule(actual, expected),
        PatternLeaf::Token(PatternToken::Type(kind)) => {
            if kind.accepts(actual) {
                ScalarOutcome::Pass
            } else {
                ScalarOutcome::Fail(failed(kind.token(), actual))
            }
        }
        PatternLeaf::Token(PatternToken::Any) => ScalarOutcome::Pass,
        // A bare rest marker matches any present value; its absence handling
        // lives in the composite matcher.
        PatternLeaf::Token(PatternToken::Rest) => ScalarOutcome::Pass,
        PatternLeaf::Token(PatternToken::Regex(re)) => regex_rule(actual, re),
        PatternLeaf::Token(PatternToken::Expr(expr)) => expr_rule(actual, expr),
        PatternLeaf::Token(PatternToken::Callback(name)) => callback_rule(actual, name, callbacks),
        PatternLeaf::Unsupported(token) => {
            ScalarOutcome::Fail(format!("unsupported pattern syntax \"{}\"", token))
        }
    }
}

fn failed(description: &str, actual: &Value) -> String {
    format!("\"{}\" failed, got {}", description, actual)
}

fn literal_rule(actual: &Value, expected: &Value) -> ScalarOutcome {
    // Type-aware exact equality; notably Int(1) never equals Float(1.0) and
    // float literals compare exactly, with no epsilon.
    if actual == expected {
        ScalarOutcome::Pass
    } else {
        ScalarOutcome::Fail(format!("expected {}, got {}", expected, actual))
    }
}

fn regex_rule(actual: &Value, pattern: &str) -> ScalarOutcome {
    let Some(s) = actual.as_str() else {
        return ScalarOutcome::Fail(failed(
            &format!("@string@.regex({})", pattern),
            actual,
        ));
    };
    match regex::Regex::new(pattern) {
        Ok(re) => {
            if re.is_match(s) {
                ScalarOutcome::Pass
            } else {
                ScalarOutcome::Fail(failed(&format!("@string@.regex({})", pattern), actual))
            }
        }
        Err(e) => ScalarOutcome::Fail(format!("invalid regex in pattern \"{}\": {}", pattern, e)),
    }
}

fn expr_rule(actual: &Value, expr: &str) -> ScalarOutcome {
    match apitest_expr::eval_bool(expr, &to_expr_value(actual)) {
        Ok(true) => ScalarOutcome::Pass,
        Ok(false) => ScalarOutcome::Fail(failed(&format!("@expr({})@", expr), actual)),
        Err(e) => ScalarOutcome::Fail(format!("expression \"{}\" failed to evaluate: {}", expr, e)),
    }
}

fn callback_rule(actual: &Value, name: &str, callbacks: &CallbackRegistry) -> ScalarOutcome {
    match callbacks.get(name) {
        Some(callback) => {
            if callback(actual) {
                ScalarOutcome::Pass
            } else {
                ScalarOutcome::Fail(failed(&format!("@callback({})@", name), actual))
            }
        }
        None => ScalarOutcome::ConfigError(MatchError::UnregisteredCallback(name.to_string())),
    }
}

/// Bridge the document tree into the expression evaluator's value space.
/// Integer/double collapse to a plain number there; the distinction only
/// matters to type wildcards, not to expression arithmetic.
pub(crate) fn to_expr_value(value: &Value) -> apitest_expr::Value {
    match value {
        Value::Null => apitest_expr::Value::Null,
        Value::Bool(b) => apitest_expr::Value::Bool(*b),
        Value::Int(n) => apitest_expr::Value::Number(*n as f64),
        Value::Float(n) => apitest_expr::Value::Number(*n),
        Value::String(s) => apitest_expr::Value::String(s.clone()),
        Value::Array(items) => {
            apitest_expr::Value::Array(items.iter().map(to_expr_value).collect())
        }
        Value::Object(entries) => apitest_expr::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_expr_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::classify;

    fn check(actual: &Value, pattern: &Value) -> ScalarOutcome {
        match_scalar(actual, &classify(pattern), &CallbackRegistry::new())
    }

    fn assert_pass(actual: &Value, pattern: &Value) {
        assert!(
            matches!(check(actual, pattern), ScalarOutcome::Pass),
            "expected {} to match {}",
            actual,
            pattern
        );
    }

    fn fail_message(actual: &Value, pattern: &Value) -> String {
        match check(actual, pattern) {
            ScalarOutcome::Fail(msg) => msg,
            _ => panic!("expected {} to fail against {}", actual, pattern),
        }
    }

    #[test]
    fn test_literal_equality() {
        assert_pass(&Value::Int(42), &Value::Int(42));
        assert_pass(&Value::from("x"), &Value::from("x"));
        assert_pass(&Value::Null, &Value::Null);
        let msg = fail_message(&Value::Int(42), &Value::Int(43));
        assert_eq!(msg, "expected 43, got 42");
    }

    #[test]
    fn test_int_literal_rejects_float_actual() {
        fail_message(&Value::Float(1.0), &Value::Int(1));
    }

    #[test]
    fn test_float_literal_equality_is_exact() {
        assert_pass(&Value::Float(0.1), &Value::Float(0.1));
        fail_message(&Value::Float(0.1 + 0.2), &Value::Float(0.3));
    }

    #[test]
    fn test_string_wildcard() {
        assert_pass(&Value::from("hello"), &Value::from("@string@"));
        let msg = fail_message(&Value::Int(42), &Value::from("@string@"));
        assert_eq!(msg, "\"@string@\" failed, got 42");
    }

    #[test]
    fn test_integer_wildcard_rejects_string_digits() {
        assert_pass(&Value::Int(17), &Value::from("@integer@"));
        fail_message(&Value::from("17"), &Value::from("@integer@"));
    }

    #[test]
    fn test_number_accepts_both_numeric_kinds() {
        assert_pass(&Value::Int(1), &Value::from("@number@"));
        assert_pass(&Value::Float(1.5), &Value::from("@number@"));
        fail_message(&Value::from("1"), &Value::from("@number@"));
    }

    #[test]
    fn test_boolean_wildcard() {
        assert_pass(&Value::Bool(false), &Value::from("@boolean@"));
        fail_message(&Value::Int(0), &Value::from("@boolean@"));
    }

    #[test]
    fn test_null_wildcard() {
        assert_pass(&Value::Null, &Value::from("@null@"));
        fail_message(&Value::Bool(false), &Value::from("@null@"));
    }

    #[test]
    fn test_array_wildcard() {
        assert_pass(&Value::Array(vec![Value::Int(1)]), &Value::from("@array@"));
        fail_message(&Value::from("[]"), &Value::from("@array@"));
    }

    #[test]
    fn test_full_wildcard_matches_everything() {
        for actual in [
            Value::Null,
            Value::Bool(true),
            Value::Int(1),
            Value::Float(1.5),
            Value::from("s"),
            Value::Array(vec![]),
            Value::Object(vec![]),
        ] {
            assert_pass(&actual, &Value::from("@*@"));
            assert_pass(&actual, &Value::from("@wildcard@"));
        }
    }

    #[test]
    fn test_regex_bound_wildcard() {
        let pattern = Value::from("@string@.regex(^[a-z]+[0-9]+$)");
        assert_pass(&Value::from("abc123"), &pattern);
        fail_message(&Value::from("123abc"), &pattern);
        fail_message(&Value::Int(123), &pattern);
    }

    #[test]
    fn test_invalid_regex_reports_pattern() {
        let msg = fail_message(&Value::from("x"), &Value::from("@string@.regex(()"));
        assert!(msg.contains("invalid regex"), "message: {}", msg);
    }

    #[test]
    fn test_expr_pattern() {
        let pattern = Value::from("@expr(value > 5 and value < 10)@");
        assert_pass(&Value::Int(7), &pattern);
        fail_message(&Value::Int(12), &pattern);
    }

    #[test]
    fn test_expr_evaluation_error_is_reported() {
        let msg = fail_message(&Value::from("x"), &Value::from("@expr(value > 5)@"));
        assert!(msg.contains("failed to evaluate"), "message: {}", msg);
    }

    #[test]
    fn test_callback_pattern() {
        let mut callbacks = CallbackRegistry::new();
        callbacks.register("positive", |v: &Value| matches!(v, Value::Int(n) if *n > 0));

        let leaf = classify(&Value::from("@callback(positive)@"));
        assert!(matches!(
            match_scalar(&Value::Int(3), &leaf, &callbacks),
            ScalarOutcome::Pass
        ));
        assert!(matches!(
            match_scalar(&Value::Int(-3), &leaf, &callbacks),
            ScalarOutcome::Fail(_)
        ));
    }

    #[test]
    fn test_unregistered_callback_is_config_error() {
        let leaf = classify(&Value::from("@callback(missing)@"));
        match match_scalar(&Value::Int(1), &leaf, &CallbackRegistry::new()) {
            ScalarOutcome::ConfigError(MatchError::UnregisteredCallback(name)) => {
                assert_eq!(name, "missing");
            }
            _ => panic!("expected config error"),
        }
    }

    #[test]
    fn test_unsupported_token_fails_with_message() {
        let msg = fail_message(&Value::Int(1), &Value::from("@integr@"));
        assert_eq!(msg, "unsupported pattern syntax \"@integr@\"");
    }
}
