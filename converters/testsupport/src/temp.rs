//! The temporary directory scoped to one test invocation.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use tempfile::TempDir;

use crate::{
    Error, ExtensionContext,
    store::{CloseableResource, Namespace},
};

/// Prefix of every temporary directory created for a test invocation.
pub const TEMP_PREFIX: &str = "acdc-testsupport";

const OUTPUT_DIR_KEY: &str = "output.dir";

/// The temporary directory of one test invocation.
///
/// Shared by every parameter resolved within the invocation and removed when its
/// [`ExtensionContext`] closes.
#[derive(Debug)]
pub struct Temp {
    path: PathBuf,
    dir: RefCell<Option<TempDir>>,
}

impl Temp {
    /// The invocation's directory, created on first use.
    ///
    /// `root` is where the directory is created; `None` means the system temporary
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtensionConfiguration`] if the directory cannot be created.
    pub fn get(
        namespace: Namespace,
        context: &ExtensionContext,
        root: Option<&Path>,
    ) -> Result<Rc<Self>, Error> {
        context
            .store()
            .get_or_try_insert_closeable(namespace, OUTPUT_DIR_KEY, || Self::create(root))
    }

    fn create(root: Option<&Path>) -> Result<Self, Error> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| Error::ExtensionConfiguration {
            message: "Failed to create output directory".to_string(),
            source,
        })?;
        tracing::debug!(path = %dir.path().display(), "created temporary directory");
        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: RefCell::new(Some(dir)),
        })
    }

    /// The directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `name` inside the directory.
    #[must_use]
    pub fn resolve<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }
}

impl CloseableResource for Temp {
    fn close(&self) -> std::io::Result<()> {
        let Some(dir) = self.dir.borrow_mut().take() else {
            return Ok(());
        };
        tracing::debug!(path = %self.path.display(), "removing temporary directory");
        dir.close()
    }
}
