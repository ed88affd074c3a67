use std::any::{Any, TypeId};

/// A value a test asks to have resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    source: Option<String>,
}

impl Parameter {
    /// A parameter called `name` declared as a `T`.
    #[must_use]
    pub fn of<T: Any>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            source: None,
        }
    }

    /// Convert `filename` instead of the fixture the naming convention picks.
    #[must_use]
    pub fn with_source(mut self, filename: impl Into<String>) -> Self {
        self.source = Some(filename.into());
        self
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The fixture to convert instead of the conventional one, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether the parameter is declared as a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}
