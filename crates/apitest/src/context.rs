//! The test context: an explicit lifecycle object composing the
//! capabilities a functional API test suite needs.
//!
//! Capabilities are injected, not inherited: the consuming suite implements
//! [`DatabaseReset`] and [`FixtureLoader`] over whatever persistence stack
//! it uses, constructs one context per suite run, and tears it down with
//! [`TestContext::shutdown`]. The context itself never talks to a database
//! or an HTTP stack; it orchestrates purging, fixture discovery, and
//! response assertions.
//!
//! # Example
//!
//! ```no_run
//! use apitest::{Format, HarnessPaths, TestContext, TestResponse};
//!
//! struct NoDb;
//! impl apitest::DatabaseReset for NoDb {
//!     fn purge(&mut self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut ctx = TestContext::new(HarnessPaths::new("tests/support")).with_database(NoDb);
//! ctx.set_up().unwrap();
//!
//! let response = TestResponse::new(200, r#"{"id": 17}"#)
//!     .with_header("Content-Type", "application/json");
//! ctx.expect_response(&response, "product_show", Format::Json, 200);
//! ```

use crate::diff;
use crate::document::verify_document;
use crate::error::AssertError;
use crate::format::Format;
use crate::loader::ResponseLoader;
use crate::response::TestResponse;
use anyhow::{bail, Context as _};
use apitest_match::{CallbackRegistry, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use termcolor::{ColorChoice, StandardStream};
use walkdir::WalkDir;

/// Wipes the application database between tests.
pub trait DatabaseReset {
    fn purge(&mut self) -> anyhow::Result<()>;

    /// Called once from [`TestContext::shutdown`].
    fn teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Loads fixture files the context discovered. Parsing the files (YAML or
/// otherwise) is entirely the implementor's concern.
pub trait FixtureLoader {
    fn load(&mut self, files: &[PathBuf]) -> anyhow::Result<()>;

    fn teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Where the harness finds its support files.
#[derive(Debug, Clone)]
pub struct HarnessPaths {
    pub expected_responses: PathBuf,
    pub mocked_responses: PathBuf,
    pub fixtures: PathBuf,
}

impl HarnessPaths {
    /// Conventional layout under `root`: `Responses/Expected`,
    /// `Responses/Mocked`, and `DataFixtures`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            expected_responses: root.join("Responses").join("Expected"),
            mocked_responses: root.join("Responses").join("Mocked"),
            fixtures: root.join("DataFixtures"),
        }
    }

    /// Like [`HarnessPaths::new`], but the `EXPECTED_RESPONSE_DIR`,
    /// `MOCKED_RESPONSE_DIR` and `FIXTURES_DIR` environment variables
    /// override individual directories (resolved against `root` when
    /// relative).
    pub fn from_env(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut paths = Self::new(root);
        if let Ok(dir) = std::env::var("EXPECTED_RESPONSE_DIR") {
            paths.expected_responses = root.join(dir);
        }
        if let Ok(dir) = std::env::var("MOCKED_RESPONSE_DIR") {
            paths.mocked_responses = root.join(dir);
        }
        if let Ok(dir) = std::env::var("FIXTURES_DIR") {
            paths.fixtures = root.join(dir);
        }
        paths
    }
}

pub struct TestContext {
    paths: HarnessPaths,
    responses: ResponseLoader,
    mocked: ResponseLoader,
    database: Option<Box<dyn DatabaseReset>>,
    fixture_loader: Option<Box<dyn FixtureLoader>>,
    callbacks: CallbackRegistry,
}

impl TestContext {
    pub fn new(paths: HarnessPaths) -> Self {
        let responses = ResponseLoader::new(&paths.expected_responses);
        let mocked = ResponseLoader::new(&paths.mocked_responses);
        Self {
            paths,
            responses,
            mocked,
            database: None,
            fixture_loader: None,
            callbacks: CallbackRegistry::new(),
        }
    }

    pub fn with_database(mut self, database: impl DatabaseReset + 'static) -> Self {
        self.database = Some(Box::new(database));
        self
    }

    pub fn with_fixture_loader(mut self, loader: impl FixtureLoader + 'static) -> Self {
        self.fixture_loader = Some(Box::new(loader));
        self
    }

    /// Register a named predicate usable as `@callback(<name>)@` in
    /// expected-response files.
    pub fn register_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.callbacks.register(name, callback);
    }

    /// Per-test setup: purge the database if a reset capability is present.
    pub fn set_up(&mut self) -> anyhow::Result<()> {
        self.reset_database()
    }

    pub fn reset_database(&mut self) -> anyhow::Result<()> {
        if let Some(database) = self.database.as_mut() {
            database.purge().context("database purge failed")?;
        }
        Ok(())
    }

    /// Discover every `*.yml` / `*.yaml` under `<fixtures>/<subdir>` (sorted
    /// for determinism) and hand the paths to the fixture loader.
    pub fn load_fixtures_from_directory(&mut self, subdir: &str) -> anyhow::Result<Vec<PathBuf>> {
        let dir = self.paths.fixtures.join(subdir);
        if !dir.is_dir() {
            bail!("fixture directory {} does not exist", dir.display());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yml") | Some("yaml")
                )
            })
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("there are no fixture files to load in {}", dir.display());
        }

        self.load_fixture_files(&files)?;
        Ok(files)
    }

    /// Load a single fixture file by path relative to the fixtures
    /// directory.
    pub fn load_fixtures_from_file(&mut self, name: &str) -> anyhow::Result<PathBuf> {
        let path = self.paths.fixtures.join(name);
        if !path.is_file() {
            bail!("fixture file {} does not exist", path.display());
        }
        self.load_fixture_files(std::slice::from_ref(&path))?;
        Ok(path)
    }

    fn load_fixture_files(&mut self, files: &[PathBuf]) -> anyhow::Result<()> {
        match self.fixture_loader.as_mut() {
            Some(loader) => loader.load(files).context("fixture loading failed"),
            None => bail!("no fixture loader configured"),
        }
    }

    /// Full response assertion: status code, Content-Type, then content
    /// against the expected-response file `<name>.<format>`.
    pub fn assert_response(
        &self,
        response: &TestResponse,
        name: &str,
        format: Format,
        expected_status: u16,
    ) -> Result<(), AssertError> {
        self.assert_response_code(response, expected_status)?;
        self.assert_content_type(response, format)?;
        let expected = self.responses.load(name, format)?;
        verify_document(format, &response.body, &expected, &self.callbacks)
    }

    pub fn assert_response_code(
        &self,
        response: &TestResponse,
        expected: u16,
    ) -> Result<(), AssertError> {
        if response.status == expected {
            Ok(())
        } else {
            Err(AssertError::StatusCode {
                expected,
                actual: response.status,
                body: response.body.clone(),
            })
        }
    }

    pub fn assert_content_type(
        &self,
        response: &TestResponse,
        format: Format,
    ) -> Result<(), AssertError> {
        if response.has_content_type(format.media_type()) {
            Ok(())
        } else {
            Err(AssertError::ContentType {
                expected: format.media_type().to_string(),
                actual: response.content_type().map(str::to_string),
            })
        }
    }

    /// Panicking form of [`TestContext::assert_response`] for direct use in
    /// tests. Content mismatches print a colored diff to stderr before the
    /// panic message repeats it plainly.
    pub fn expect_response(
        &self,
        response: &TestResponse,
        name: &str,
        format: Format,
        expected_status: u16,
    ) {
        match self.assert_response(response, name, format, expected_status) {
            Ok(()) => {}
            Err(AssertError::MatchFailed {
                mismatch,
                expected,
                actual,
            }) => {
                let mut stderr = StandardStream::stderr(ColorChoice::Auto);
                let _ = diff::write_colored(&mut stderr, &expected, &actual, &mismatch);
                let _ = stderr.flush();
                panic!(
                    "response content did not match '{}': {}",
                    name,
                    diff::render(&expected, &actual, &mismatch)
                );
            }
            Err(e) => panic!("response assertion failed: {}", e),
        }
    }

    /// Decoded mocked-response fixture `<name>.<format>` from the mocked
    /// responses directory.
    pub fn mock_fixture(&self, name: &str, format: Format) -> Result<Value, AssertError> {
        let text = self.mocked.load(name, format)?;
        Ok(format.decode(&text)?)
    }

    /// Write a (typically 5xx) response body to a temp html file for
    /// inspection and return the path.
    pub fn dump_error_response(&self, response: &TestResponse) -> std::io::Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("apitest-response-")
            .suffix(".html")
            .tempfile()?;
        std::fs::write(file.path(), &response.body)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    }

    /// Explicit teardown; the suite calls this once when it is done.
    pub fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(mut loader) = self.fixture_loader.take() {
            loader.teardown().context("fixture loader teardown failed")?;
        }
        if let Some(mut database) = self.database.take() {
            database.teardown().context("database teardown failed")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_layout() {
        let paths = HarnessPaths::new("/srv/app/tests");
        assert_eq!(
            paths.expected_responses,
            PathBuf::from("/srv/app/tests/Responses/Expected")
        );
        assert_eq!(paths.fixtures, PathBuf::from("/srv/app/tests/DataFixtures"));
    }

    #[test]
    fn test_status_code_assertion() {
        let ctx = TestContext::new(HarnessPaths::new("/nonexistent"));
        let response = TestResponse::new(404, "gone");
        let err = ctx.assert_response_code(&response, 200).unwrap_err();
        assert!(err.to_string().contains("expected status code 200, got 404"));
        assert!(ctx.assert_response_code(&response, 404).is_ok());
    }

    #[test]
    fn test_content_type_assertion() {
        let ctx = TestContext::new(HarnessPaths::new("/nonexistent"));
        let json = TestResponse::new(200, "{}")
            .with_header("Content-Type", "application/json; charset=utf-8");
        assert!(ctx.assert_content_type(&json, Format::Json).is_ok());
        assert!(matches!(
            ctx.assert_content_type(&json, Format::Xml),
            Err(AssertError::ContentType { .. })
        ));
    }

    #[test]
    fn test_fixture_loading_without_loader_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("DataFixtures")).unwrap();
        std::fs::write(dir.path().join("DataFixtures/users.yml"), "users: []").unwrap();

        let mut ctx = TestContext::new(HarnessPaths::new(dir.path()));
        let err = ctx.load_fixtures_from_file("users.yml").unwrap_err();
        assert!(err.to_string().contains("no fixture loader configured"));
    }

    #[test]
    fn test_dump_error_response() {
        let ctx = TestContext::new(HarnessPaths::new("/nonexistent"));
        let response = TestResponse::new(500, "<html>boom</html>");
        let path = ctx.dump_error_response(&response).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>boom</html>");
        let _ = std::fs::remove_file(path);
    }
}
