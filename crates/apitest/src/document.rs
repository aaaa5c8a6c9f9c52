//! Document-level matching: raw text in, verdict (with diff) out.

use crate::error::AssertError;
use crate::format::Format;
use apitest_match::{match_trees, CallbackRegistry, MatchError, Value};

/// Match raw `actual` text against raw `expected` pattern text.
///
/// Both documents are decoded fresh for every call and nothing is cached, so
/// this is a pure function of its inputs (given a read-only registry) and
/// safe to call from concurrent tests.
pub fn verify_document(
    format: Format,
    actual: &str,
    expected: &str,
    callbacks: &CallbackRegistry,
) -> Result<(), AssertError> {
    let actual_tree = format.decode(actual)?;
    let expected_tree = format.decode(expected)?;

    match match_trees(&actual_tree, &expected_tree, callbacks) {
        Ok(()) => Ok(()),
        Err(MatchError::UnregisteredCallback(name)) => {
            Err(AssertError::UnregisteredCallback(name))
        }
        Err(MatchError::Mismatch(mismatch)) => Err(AssertError::MatchFailed {
            mismatch: mismatch.to_string(),
            expected: format.pretty(expected)?,
            actual: format.pretty(actual)?,
        }),
    }
}

/// A reusable matcher bound to one format and one callback table.
#[derive(Debug)]
pub struct DocumentMatcher {
    format: Format,
    callbacks: CallbackRegistry,
}

impl DocumentMatcher {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            callbacks: CallbackRegistry::new(),
        }
    }

    pub fn json() -> Self {
        Self::new(Format::Json)
    }

    pub fn xml() -> Self {
        Self::new(Format::Xml)
    }

    /// Register a named predicate for `@callback(<name>)@` patterns.
    pub fn with_callback<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.callbacks.register(name, callback);
        self
    }

    pub fn verify(&self, actual: &str, expected: &str) -> Result<(), AssertError> {
        verify_document(self.format, actual, expected, &self.callbacks)
    }

    /// Boolean convenience; parse errors and unregistered callbacks still
    /// surface as errors rather than `false`.
    pub fn matches(&self, actual: &str, expected: &str) -> Result<bool, AssertError> {
        match self.verify(actual, expected) {
            Ok(()) => Ok(true),
            Err(AssertError::MatchFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
