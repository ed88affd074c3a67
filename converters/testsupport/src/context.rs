use crate::{Error, Resources, TestIdentity, store::Store};

/// One test invocation.
///
/// Owns the [`Store`] that resolvers memoize per-invocation resources in. Closing the
/// context, explicitly with [`close`](Self::close) or implicitly on drop, releases
/// those resources. Drop also runs while a failing test unwinds, so temporary
/// directories never outlive their test.
///
/// A context is not `Send`: every test builds its own.
#[derive(Debug)]
pub struct ExtensionContext {
    test: TestIdentity,
    resources: Resources,
    store: Store,
}

impl ExtensionContext {
    /// Context for `test` with fixtures in the default [`Resources`] directory.
    #[must_use]
    pub fn new(test: TestIdentity) -> Self {
        Self {
            test,
            resources: Resources::default(),
            store: Store::new(),
        }
    }

    /// Look fixtures up in `resources` instead.
    #[must_use]
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// The test function this invocation runs.
    #[must_use]
    pub fn test(&self) -> &TestIdentity {
        &self.test
    }

    /// Where fixtures are looked up.
    #[must_use]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Per-invocation storage shared by the registered resolvers.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Release every resource the invocation acquired.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while releasing; the remaining resources are
    /// still released.
    pub fn close(self) -> Result<(), Error> {
        tracing::debug!(test = %self.test, "closing extension context");
        self.store.close()
    }
}

impl Drop for ExtensionContext {
    fn drop(&mut self) {
        if let Err(e) = self.store.close() {
            tracing::warn!(test = %self.test, error = %e, "failed to release test resources");
        }
    }
}
