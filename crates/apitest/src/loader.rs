//! Expected-response file loading.

use crate::format::Format;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("expected response file {0} does not exist")]
    Missing(PathBuf),
    #[error("{0} is a directory, not a response file")]
    Directory(PathBuf),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves and reads `<dir>/<name>.<ext>` expected-response files.
#[derive(Debug, Clone)]
pub struct ResponseLoader {
    dir: PathBuf,
}

impl ResponseLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, name: &str, format: Format) -> PathBuf {
        self.dir.join(format!("{}.{}", name, format.extension()))
    }

    pub fn load(&self, name: &str, format: Format) -> Result<String, LoaderError> {
        self.read(&self.path(name, format))
    }

    fn read(&self, path: &Path) -> Result<String, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::Missing(path.to_path_buf()));
        }
        if path.is_dir() {
            return Err(LoaderError::Directory(path.to_path_buf()));
        }
        std::fs::read_to_string(path).map_err(|source| LoaderError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}
