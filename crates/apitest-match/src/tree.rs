//! The composite matcher: a lock-step, depth-first walk of the actual and
//! pattern trees. The first divergence wins; nothing is aggregated.

use crate::matcher::{match_scalar, CallbackRegistry, MatchError, Mismatch, ScalarOutcome};
use crate::token::{classify, PatternLeaf, PatternToken};
use crate::value::Value;
use std::fmt::Write;

#[derive(Clone)]
enum PathSeg {
    Key(String),
    Index(usize),
}

fn render_path(path: &[PathSeg]) -> String {
    let mut out = String::new();
    for seg in path {
        match seg {
            PathSeg::Key(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
            PathSeg::Index(i) => {
                let _ = write!(out, "[{}]", i);
            }
        }
    }
    out
}

/// Match a decoded actual document against a decoded pattern document.
///
/// Pure and reentrant: no state survives the call, and the registry is only
/// read.
pub fn match_trees(
    actual: &Value,
    pattern: &Value,
    callbacks: &CallbackRegistry,
) -> Result<(), MatchError> {
    let mut path = Vec::new();
    walk(actual, pattern, &mut path, callbacks)
}

/// Convenience check with no registered callbacks.
pub fn matches(actual: &Value, pattern: &Value) -> bool {
    match_trees(actual, pattern, &CallbackRegistry::new()).is_ok()
}

fn fail(path: &[PathSeg], message: String) -> Result<(), MatchError> {
    Err(MatchError::Mismatch(Mismatch {
        path: render_path(path),
        message,
    }))
}

fn walk(
    actual: &Value,
    pattern: &Value,
    path: &mut Vec<PathSeg>,
    callbacks: &CallbackRegistry,
) -> Result<(), MatchError> {
    match pattern {
        Value::Object(entries) => walk_object(actual, entries, path, callbacks),
        Value::Array(items) => walk_array(actual, items, path, callbacks),
        scalar => {
            let leaf = classify(scalar);
            // A rest marker is positional punctuation, not a value pattern.
            if leaf == PatternLeaf::Token(PatternToken::Rest) {
                return fail(
                    path,
                    "\"@...@\" is only allowed as the final array element or an object value"
                        .to_string(),
                );
            }
            match match_scalar(actual, &leaf, callbacks) {
                ScalarOutcome::Pass => Ok(()),
                ScalarOutcome::Fail(message) => fail(path, message),
                ScalarOutcome::ConfigError(e) => Err(e),
            }
        }
    }
}

fn walk_object(
    actual: &Value,
    entries: &[(String, Value)],
    path: &mut Vec<PathSeg>,
    callbacks: &CallbackRegistry,
) -> Result<(), MatchError> {
    let Value::Object(_) = actual else {
        // An empty object pattern against an empty array still lands here:
        // container kinds are never interchangeable.
        return fail(
            path,
            format!("expected an object, got {}", actual.type_name()),
        );
    };

    // Keys present in actual but absent from the pattern are ignored:
    // patterns describe required shape, not forbidden extras.
    for (key, expected) in entries {
        let optional = classify(expected) == PatternLeaf::Token(PatternToken::Rest);
        path.push(PathSeg::Key(key.clone()));
        match actual.get(key) {
            // An optional-key marker matches whatever is there.
            Some(_) if optional => {}
            Some(found) => walk(found, expected, path, callbacks)?,
            None if optional => {}
            None => {
                return fail(path, "required key is missing".to_string());
            }
        }
        path.pop();
    }
    Ok(())
}

fn walk_array(
    actual: &Value,
    items: &[Value],
    path: &mut Vec<PathSeg>,
    callbacks: &CallbackRegistry,
) -> Result<(), MatchError> {
    let Value::Array(actual_items) = actual else {
        return fail(
            path,
            format!("expected an array, got {}", actual.type_name()),
        );
    };

    let has_rest = items
        .last()
        .map(|last| classify(last) == PatternLeaf::Token(PatternToken::Rest))
        .unwrap_or(false);
    let required = if has_rest { items.len() - 1 } else { items.len() };

    if has_rest {
        if actual_items.len() < required {
            return fail(
                path,
                format!(
                    "expected an array of at least {} element(s), got {}",
                    required,
                    actual_items.len()
                ),
            );
        }
    } else if actual_items.len() != items.len() {
        return fail(
            path,
            format!(
                "expected an array of {} element(s), got {}",
                items.len(),
                actual_items.len()
            ),
        );
    }

    for (i, expected) in items.iter().take(required).enumerate() {
        path.push(PathSeg::Index(i));
        walk(&actual_items[i], expected, path, callbacks)?;
        path.pop();
    }
    Ok(())
}
