//! Per-invocation key/value storage.
//!
//! Values are keyed by a [`Namespace`] and a string key, created at most once and
//! handed out as shared [`Rc`] handles. Values that implement [`CloseableResource`]
//! are released, newest first, when the store is closed.

use std::{any::Any, cell::RefCell, fmt, rc::Rc};

use crate::Error;

/// Groups store keys so that independent resolvers cannot clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(&'static str);

impl Namespace {
    /// A namespace called `name`.
    #[must_use]
    pub const fn create(name: &'static str) -> Self {
        Self(name)
    }

    /// The namespace name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// A stored value that owns something outside the process, such as a directory.
pub trait CloseableResource {
    /// Release the resource. Called once, when the owning store closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource could not be released.
    fn close(&self) -> std::io::Result<()>;
}

struct Entry {
    namespace: Namespace,
    key: String,
    value: Rc<dyn Any>,
    closeable: Option<Rc<dyn CloseableResource>>,
}

/// Values memoized for one test invocation.
#[derive(Default)]
pub struct Store {
    entries: RefCell<Vec<Entry>>,
}

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreTypeMismatch`] if the stored value is not a `T`.
    pub fn get<T: Any>(&self, namespace: Namespace, key: &str) -> Result<Option<Rc<T>>, Error> {
        let existing = self
            .entries
            .borrow()
            .iter()
            .find(|entry| entry.namespace == namespace && entry.key == key)
            .map(|entry| Rc::clone(&entry.value));
        existing
            .map(|value| downcast(value, namespace, key))
            .transpose()
    }

    /// The value stored under `key`, creating it with `create` when absent.
    ///
    /// # Errors
    ///
    /// Returns the error from `create`, or [`Error::StoreTypeMismatch`] if the stored
    /// value is not a `T`.
    pub fn get_or_try_insert_with<T, F>(
        &self,
        namespace: Namespace,
        key: &str,
        create: F,
    ) -> Result<Rc<T>, Error>
    where
        T: Any,
        F: FnOnce() -> Result<T, Error>,
    {
        if let Some(value) = self.get(namespace, key)? {
            return Ok(value);
        }
        let value = Rc::new(create()?);
        self.insert(namespace, key, Rc::clone(&value) as Rc<dyn Any>, None);
        Ok(value)
    }

    /// Like [`get_or_try_insert_with`](Self::get_or_try_insert_with), for values that
    /// must be closed with the store.
    ///
    /// # Errors
    ///
    /// Returns the error from `create`, or [`Error::StoreTypeMismatch`] if the stored
    /// value is not a `T`.
    pub fn get_or_try_insert_closeable<T, F>(
        &self,
        namespace: Namespace,
        key: &str,
        create: F,
    ) -> Result<Rc<T>, Error>
    where
        T: Any + CloseableResource,
        F: FnOnce() -> Result<T, Error>,
    {
        if let Some(value) = self.get(namespace, key)? {
            return Ok(value);
        }
        let value = Rc::new(create()?);
        self.insert(
            namespace,
            key,
            Rc::clone(&value) as Rc<dyn Any>,
            Some(Rc::clone(&value) as Rc<dyn CloseableResource>),
        );
        Ok(value)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove every entry, closing closeable ones newest first.
    ///
    /// Every resource is closed even if an earlier one fails; the first failure is
    /// returned.
    pub(crate) fn close(&self) -> Result<(), Error> {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        let mut first_error = None;
        for entry in entries.into_iter().rev() {
            let Some(closeable) = entry.closeable else {
                continue;
            };
            tracing::debug!(
                namespace = entry.namespace.name(),
                key = entry.key.as_str(),
                "closing resource"
            );
            if let Err(e) = closeable.close() {
                tracing::debug!(key = entry.key.as_str(), error = %e, "failed to close resource");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(Error::Io(e)),
            None => Ok(()),
        }
    }

    fn insert(
        &self,
        namespace: Namespace,
        key: &str,
        value: Rc<dyn Any>,
        closeable: Option<Rc<dyn CloseableResource>>,
    ) {
        self.entries.borrow_mut().push(Entry {
            namespace,
            key: key.to_string(),
            value,
            closeable,
        });
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .borrow()
                    .iter()
                    .map(|entry| format!("{}/{}", entry.namespace.name(), entry.key)),
            )
            .finish()
    }
}

fn downcast<T: Any>(value: Rc<dyn Any>, namespace: Namespace, key: &str) -> Result<Rc<T>, Error> {
    value.downcast::<T>().map_err(|_| Error::StoreTypeMismatch {
        namespace: namespace.name(),
        key: key.to_string(),
        expected: std::any::type_name::<T>(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    const NAMESPACE: Namespace = Namespace::create("store-tests");

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl CloseableResource for Recorder {
        fn close(&self) -> std::io::Result<()> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                return Err(std::io::Error::other(format!("{} is busy", self.name)));
            }
            Ok(())
        }
    }

    #[test]
    fn creates_value_once() {
        let store = Store::new();
        let calls = Cell::new(0);
        let create = || {
            calls.set(calls.get() + 1);
            Ok(String::from("value"))
        };
        let first = store.get_or_try_insert_with(NAMESPACE, "key", create).unwrap();
        let second = store
            .get_or_try_insert_with(NAMESPACE, "key", || Ok(String::from("other")))
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(*second, "value");
    }

    #[test]
    fn namespaces_are_separate() {
        let store = Store::new();
        let other = Namespace::create("other");
        store.get_or_try_insert_with(NAMESPACE, "key", || Ok(1_u32)).unwrap();
        let value = store.get_or_try_insert_with(other, "key", || Ok(2_u32)).unwrap();
        assert_eq!(*value, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn failed_creation_stores_nothing() {
        let store = Store::new();
        let result = store.get_or_try_insert_with::<u32, _>(NAMESPACE, "key", || {
            Err(Error::Io(std::io::Error::other("boom")))
        });
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn type_mismatch_is_reported() {
        let store = Store::new();
        store.get_or_try_insert_with(NAMESPACE, "key", || Ok(1_u32)).unwrap();
        let err = store.get::<String>(NAMESPACE, "key").unwrap_err();
        assert!(matches!(err, Error::StoreTypeMismatch { .. }), "{err:?}");
    }

    #[test]
    fn closes_newest_first_and_reports_first_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = Store::new();
        for (name, fail) in [("first", true), ("second", false), ("third", true)] {
            let log = Rc::clone(&log);
            store
                .get_or_try_insert_closeable(NAMESPACE, name, || Ok(Recorder { name, log, fail }))
                .unwrap();
        }
        store.get_or_try_insert_with(NAMESPACE, "plain", || Ok(0_u8)).unwrap();

        let err = store.close().unwrap_err();

        assert_eq!(*log.borrow(), ["third", "second", "first"]);
        assert!(err.to_string().contains("third is busy"), "{err}");
        assert!(store.is_empty());
        assert!(store.close().is_ok());
    }
}
