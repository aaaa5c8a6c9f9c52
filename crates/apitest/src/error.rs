use crate::diff;
use crate::loader::LoaderError;
use thiserror::Error;

/// Malformed input document. Always fatal: a document that does not parse
/// aborts the assertion before any matching happens.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed JSON document: {0}")]
    Json(String),
    #[error("malformed XML document: {0}")]
    Xml(String),
}

/// A failed response assertion.
#[derive(Error, Debug)]
pub enum AssertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Expectation(#[from] LoaderError),

    /// Harness setup bug: a pattern referenced a callback nobody registered.
    #[error("unregistered callback '{0}'")]
    UnregisteredCallback(String),

    /// Content mismatch. Displays as the matcher error followed by a unified
    /// diff of the pretty-printed pattern against the actual document; the
    /// parts stay separate so the harness can re-render them with color.
    #[error("{}", diff::render(.expected, .actual, .mismatch))]
    MatchFailed {
        mismatch: String,
        expected: String,
        actual: String,
    },

    #[error("expected status code {expected}, got {actual}\n{body}")]
    StatusCode {
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("expected Content-Type containing \"{expected}\", got {}", .actual.as_deref().unwrap_or("no Content-Type header"))]
    ContentType {
        expected: String,
        actual: Option<String>,
    },
}
