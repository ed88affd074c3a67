//! Test identity and the fixture naming convention.
//!
//! A test "class" is the module path that groups test functions. Fixtures are named
//! after the last segment of that path and the test function:
//!
//! - `<SimpleClass>_<method>.adoc` for the source converted into HTML
//! - `<SimpleClass>_<method>_<parameter>.html` for expected HTML

/// Identifies one test function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestIdentity {
    class: String,
    method: String,
}

impl TestIdentity {
    /// Create an identity from a class path and a test function name.
    #[must_use]
    pub fn new<C: Into<String>, M: Into<String>>(class: C, method: M) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Build an identity from the type path of a test function, e.g.
    /// `integration_test::converts_paragraph`.
    ///
    /// Compiler generated `{{closure}}` segments are dropped. The last remaining segment
    /// is the method, the ones before it are the class.
    #[must_use]
    pub fn from_function_path(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split("::")
            .filter(|segment| *segment != "{{closure}}")
            .collect();
        match segments.split_last() {
            Some((method, class)) => Self::new(class.join("::"), *method),
            None => Self::new("", path),
        }
    }

    /// The full class path.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The test function name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The last segment of the class path.
    #[must_use]
    pub fn simple_class_name(&self) -> &str {
        self.class.rsplit("::").next().unwrap_or(&self.class)
    }

    /// `<SimpleClass>_<method><suffix>`.
    #[must_use]
    pub fn fixture_filename(&self, suffix: &str) -> String {
        format!("{}_{}{suffix}", self.simple_class_name(), self.method)
    }

    /// Name of the fixture converted by default: `<SimpleClass>_<method>.adoc`.
    #[must_use]
    pub fn source_filename(&self) -> String {
        self.fixture_filename(".adoc")
    }

    /// Name of the expected HTML fixture for `parameter`:
    /// `<SimpleClass>_<method>_<parameter>.html`.
    #[must_use]
    pub fn expected_filename(&self, parameter: &str) -> String {
        self.fixture_filename(&format!("_{parameter}.html"))
    }
}

impl std::fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}

/// The [`TestIdentity`] of the enclosing function.
///
/// ```
/// use acdc_converters_testsupport::test_identity;
///
/// fn tables() -> acdc_converters_testsupport::TestIdentity {
///     test_identity!()
/// }
///
/// let identity = tables();
/// assert_eq!(identity.method(), "tables");
/// ```
#[macro_export]
macro_rules! test_identity {
    () => {{
        fn here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let path = type_name_of(here);
        $crate::TestIdentity::from_function_path(path.strip_suffix("::here").unwrap_or(path))
    }};
}
