//! Fixture-driven parameter resolution for converter tests.
//!
//! A test asks for [`ConvertedHtml`] and [`ExpectedHtml`] values instead of reading,
//! copying and converting fixture files itself:
//!
//! - [`ConvertedHtml`] - the fixture `<Class>_<method>.adoc` converted by an external
//!   [`Converter`] into a temporary directory
//! - [`ExpectedHtml`] - the fixture `<Class>_<method>_<parameter>.html`, verbatim
//!
//! Every test builds an [`ExtensionContext`] for itself. The context owns the
//! temporary directory shared by all parameters of that test and removes it when the
//! context is closed or dropped.
//!
//! # Example
//!
//! ```no_run
//! use acdc_converters_testsupport::{
//!     AsciidoctorCli, AsciidoctorExtension, ConvertedHtml, ExpectedHtml, ExtensionContext,
//!     Resolvers, test_identity,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolvers = Resolvers::new().with(
//!     AsciidoctorExtension::builder()
//!         .converter(AsciidoctorCli::from_env().require("./lib/spring-html.rb"))
//!         .build(),
//! );
//! let context = ExtensionContext::new(test_identity!());
//! let converted: ConvertedHtml = resolvers.resolve_as("converted", &context)?;
//! let expected: ExpectedHtml = resolvers.resolve_as("expected", &context)?;
//! assert_eq!(converted.html()?, expected);
//! context.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`converter`] - converter invocation: options, safe mode, the `asciidoctor` process
//! - [`store`] - per-invocation key/value storage with closeable resources
//! - [`temp`] - the scoped temporary directory

mod asciidoctor;
mod context;
pub mod converter;
mod error;
mod identity;
mod parameter;
mod resolver;
mod resources;
pub mod store;
pub mod temp;

pub use asciidoctor::{
    AsciidoctorExtension, AsciidoctorExtensionBuilder, ConvertedHtml, ExpectedHtml,
};
pub use context::ExtensionContext;
pub use converter::{AsciidoctorCli, Converter, Options, SafeMode};
pub use error::{BoxError, ConvertError, Error};
pub use identity::TestIdentity;
pub use parameter::Parameter;
pub use resolver::{ParameterResolver, Resolvers};
pub use resources::{Lookup, Resources};
