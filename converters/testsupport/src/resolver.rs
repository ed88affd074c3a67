use std::any::Any;

use crate::{Error, ExtensionContext, Parameter};

/// Supplies test parameters of the types it recognizes.
pub trait ParameterResolver {
    /// Whether this resolver can supply `parameter`.
    fn supports_parameter(&self, parameter: &Parameter, context: &ExtensionContext) -> bool;

    /// Produce the value for `parameter`. Only called when
    /// [`supports_parameter`](Self::supports_parameter) returned `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be produced.
    fn resolve_parameter(
        &self,
        parameter: &Parameter,
        context: &ExtensionContext,
    ) -> Result<Box<dyn Any>, Error>;
}

/// Registered resolvers, consulted in registration order.
#[derive(Default)]
pub struct Resolvers {
    resolvers: Vec<Box<dyn ParameterResolver>>,
}

impl Resolvers {
    /// A registry with no resolvers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `resolver` after the ones already registered.
    #[must_use]
    pub fn with<R: ParameterResolver + 'static>(mut self, resolver: R) -> Self {
        self.register(resolver);
        self
    }

    /// Add `resolver` after the ones already registered.
    pub fn register<R: ParameterResolver + 'static>(&mut self, resolver: R) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Whether any registered resolver supports `parameter`.
    #[must_use]
    pub fn supports(&self, parameter: &Parameter, context: &ExtensionContext) -> bool {
        self.resolvers
            .iter()
            .any(|resolver| resolver.supports_parameter(parameter, context))
    }

    /// Resolve `parameter` with the first resolver that supports it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedParameter`] if no resolver supports the parameter, or
    /// the error of the resolver that handled it.
    pub fn resolve(
        &self,
        parameter: &Parameter,
        context: &ExtensionContext,
    ) -> Result<Box<dyn Any>, Error> {
        let Some(resolver) = self
            .resolvers
            .iter()
            .find(|resolver| resolver.supports_parameter(parameter, context))
        else {
            return Err(Error::UnsupportedParameter {
                name: parameter.name().to_string(),
                type_name: parameter.type_name(),
            });
        };
        resolver.resolve_parameter(parameter, context)
    }

    /// Resolve `parameter` and take the value as a `T`.
    ///
    /// # Errors
    ///
    /// Returns the resolution error, or [`Error::ParameterTypeMismatch`] if the resolver
    /// produced something other than a `T`.
    pub fn resolve_parameter_as<T: Any>(
        &self,
        parameter: &Parameter,
        context: &ExtensionContext,
    ) -> Result<T, Error> {
        self.resolve(parameter, context)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::ParameterTypeMismatch {
                name: parameter.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolve a parameter called `name` declared as a `T`.
    ///
    /// ```no_run
    /// use acdc_converters_testsupport::{
    ///     AsciidoctorExtension, ConvertedHtml, ExpectedHtml, ExtensionContext, Resolvers,
    ///     test_identity,
    /// };
    ///
    /// # fn main() -> Result<(), acdc_converters_testsupport::Error> {
    /// let resolvers = Resolvers::new().with(AsciidoctorExtension::new());
    /// let context = ExtensionContext::new(test_identity!());
    /// let actual: ConvertedHtml = resolvers.resolve_as("actual", &context)?;
    /// let expected: ExpectedHtml = resolvers.resolve_as("expected", &context)?;
    /// assert_eq!(actual.html()?, expected);
    /// context.close()
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// See [`resolve_parameter_as`](Self::resolve_parameter_as).
    pub fn resolve_as<T: Any>(&self, name: &str, context: &ExtensionContext) -> Result<T, Error> {
        self.resolve_parameter_as(&Parameter::of::<T>(name), context)
    }
}

impl std::fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolvers")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}
