use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, TestIdentity};

/// Directory fixtures are looked up in, relative to the package under test.
pub const DEFAULT_FIXTURES_DIR: &str = "tests/fixtures";

/// Result of looking a fixture up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The fixture exists at this path.
    Found(PathBuf),
    /// Nothing exists at this path.
    Missing(PathBuf),
}

/// The directory test fixtures live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    /// Fixtures in `root`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The fixture directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look `filename` up. Only regular files count as found.
    #[must_use]
    pub fn find(&self, filename: &str) -> Lookup {
        let path = self.root.join(filename);
        if path.is_file() {
            Lookup::Found(path)
        } else {
            Lookup::Missing(path)
        }
    }

    /// Path of an existing fixture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFixture`] naming the test class and the filename when the
    /// fixture does not exist.
    pub fn require(&self, filename: &str, test: &TestIdentity) -> Result<PathBuf, Error> {
        match self.find(filename) {
            Lookup::Found(path) => Ok(path),
            Lookup::Missing(path) => Err(Error::MissingFixture {
                class: test.class().to_string(),
                filename: filename.to_string(),
                path,
            }),
        }
    }

    /// Read a fixture exactly as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture is missing or cannot be read as UTF-8.
    pub fn read_to_string(&self, filename: &str, test: &TestIdentity) -> Result<String, Error> {
        let path = self.require(filename, test)?;
        tracing::debug!(path = %path.display(), "reading fixture");
        Ok(fs::read_to_string(path)?)
    }

    /// Copy a fixture to `destination`, replacing whatever is there.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture is missing or the copy fails.
    pub fn copy_to(
        &self,
        filename: &str,
        test: &TestIdentity,
        destination: &Path,
    ) -> Result<(), Error> {
        let path = self.require(filename, test)?;
        tracing::debug!(from = %path.display(), to = %destination.display(), "copying fixture");
        fs::copy(&path, destination)?;
        Ok(())
    }
}

impl Default for Resources {
    /// `$CARGO_MANIFEST_DIR/tests/fixtures`, or `tests/fixtures` relative to the working
    /// directory when cargo did not set the variable.
    fn default() -> Self {
        let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_default();
        Self::new(manifest_dir.join(DEFAULT_FIXTURES_DIR))
    }
}
