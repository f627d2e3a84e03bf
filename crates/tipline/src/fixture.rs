//! Test fixture files.
//!
//! Scenarios refer to fixtures by logical name (`"antani.txt"`); the
//! resolver turns those into paths under the configured fixtures directory.

use crate::result::HarnessResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maps logical fixture names to files on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureResolver {
    root: PathBuf,
}

impl FixtureResolver {
    /// Resolver rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Fixtures directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a fixture; absolute names are returned unchanged
    #[must_use]
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.root.join(name)
        }
    }

    /// Paths of several fixtures, in the given order
    #[must_use]
    pub fn resolve_all<I, S>(&self, names: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        names.into_iter().map(|n| self.resolve(n)).collect()
    }

    /// Read a fixture file as UTF-8 text
    pub async fn read_text(&self, path: impl AsRef<Path>) -> HarnessResult<String> {
        let path = self.resolve(path);
        debug!(path = %path.display(), "reading fixture");
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}
