//! Test support for functional API testing.
//!
//! The heart of the crate is structural response matching: an expected
//! JSON/XML document may embed pattern tokens (`@integer@`, `@*@`,
//! `@string@.regex(...)`, `@expr(...)@`, ...) in place of literal values,
//! and [`DocumentMatcher`] compares it against the actual response,
//! producing a unified diff on mismatch. Around it, [`TestContext`]
//! composes the harness pieces a suite needs: database purging and fixture
//! loading through injected capabilities, expected-response files resolved
//! by name, and status/header/content assertions.
//!
//! # Example
//!
//! ```
//! use apitest::DocumentMatcher;
//!
//! let matcher = DocumentMatcher::json();
//! let pattern = r#"{"id": "@integer@", "name": "@string@"}"#;
//! let actual = r#"{"id": 17, "name": "Star-Wars T-shirt", "stock": 4}"#;
//! assert!(matcher.matches(actual, pattern).unwrap());
//! ```

pub mod context;
pub mod diff;
pub mod document;
pub mod error;
pub mod format;
pub mod json;
pub mod loader;
pub mod response;
pub mod xml;

pub use context::{DatabaseReset, FixtureLoader, HarnessPaths, TestContext};
pub use document::{verify_document, DocumentMatcher};
pub use error::{AssertError, ParseError};
pub use format::{media_types, Format};
pub use loader::{LoaderError, ResponseLoader};
pub use response::TestResponse;

pub use apitest_match::{CallbackRegistry, MatchError, Mismatch, Value};
