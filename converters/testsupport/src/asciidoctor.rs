//! Resolution of [`ConvertedHtml`] and [`ExpectedHtml`] parameters.

use std::{
    any::Any,
    fmt,
    ops::Deref,
    path::{Path, PathBuf},
};

use crate::{
    AsciidoctorCli, Converter, Error, ExtensionContext, Parameter, ParameterResolver, SafeMode,
    converter::{DEFAULT_BACKEND, Options},
    store::Namespace,
    temp::Temp,
};

const NAMESPACE: Namespace = Namespace::create("acdc-testsupport::asciidoctor");

/// Base name of the files in the temporary directory: the fixture is copied to
/// `test.adoc` and converted to `test.html`.
const DOCUMENT_NAME: &str = "test";

/// HTML produced by converting a fixture.
///
/// Both paths live in the invocation's temporary directory and disappear when the
/// [`ExtensionContext`] closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedHtml {
    directory: PathBuf,
    file: PathBuf,
}

impl ConvertedHtml {
    /// `file` converted into `directory`.
    #[must_use]
    pub fn new(directory: PathBuf, file: PathBuf) -> Self {
        Self { directory, file }
    }

    /// The temporary directory the converter wrote to.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The generated HTML file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Contents of the generated HTML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn html(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.file)
    }
}

/// Reference HTML loaded verbatim from a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpectedHtml(String);

impl ExpectedHtml {
    /// Wrap `html` as is.
    #[must_use]
    pub fn new<S: Into<String>>(html: S) -> Self {
        Self(html.into())
    }

    /// The HTML.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the HTML out.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for ExpectedHtml {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ExpectedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpectedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ExpectedHtml {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ExpectedHtml {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for ExpectedHtml {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

impl PartialEq<ExpectedHtml> for String {
    fn eq(&self, other: &ExpectedHtml) -> bool {
        *self == other.0
    }
}

/// Resolves [`ConvertedHtml`] and [`ExpectedHtml`] parameters from fixtures.
///
/// For a test function `m` in class `C`:
///
/// - a [`ConvertedHtml`] parameter converts `C_m.adoc`, or the file named by
///   [`Parameter::with_source`], with the configured converter;
/// - an [`ExpectedHtml`] parameter called `p` reads `C_m_p.html`.
///
/// Use [`AsciidoctorExtension::builder`] to configure the converter, backend, safe mode
/// or where temporary directories are created.
pub struct AsciidoctorExtension {
    converter: Box<dyn Converter>,
    backend: String,
    safe_mode: SafeMode,
    attributes: Vec<(String, String)>,
    temp_root: Option<PathBuf>,
}

impl AsciidoctorExtension {
    /// An extension with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring an extension.
    #[must_use]
    pub fn builder() -> AsciidoctorExtensionBuilder {
        AsciidoctorExtensionBuilder::default()
    }

    /// Backend identifier passed to the converter.
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Safe mode passed to the converter.
    #[must_use]
    pub fn safe_mode(&self) -> SafeMode {
        self.safe_mode
    }

    #[tracing::instrument(skip_all, fields(test = %context.test(), parameter = parameter.name()))]
    fn resolve_converted_html(
        &self,
        parameter: &Parameter,
        context: &ExtensionContext,
    ) -> Result<ConvertedHtml, Error> {
        let filename = parameter
            .source()
            .map_or_else(|| context.test().source_filename(), ToString::to_string);
        self.convert(&filename, context).map_err(|e| {
            Error::parameter_resolution(format!("Error converting asciidoc {filename}"), e)
        })
    }

    fn convert(&self, filename: &str, context: &ExtensionContext) -> Result<ConvertedHtml, Error> {
        let temp = Temp::get(NAMESPACE, context, self.temp_root.as_deref())?;
        let source = temp.resolve(format!("{DOCUMENT_NAME}.adoc"));
        context
            .resources()
            .copy_to(filename, context.test(), &source)?;
        let options = Options::builder()
            .safe_mode(self.safe_mode)
            .backend(self.backend.as_str())
            .to_dir(temp.path())
            .attributes(&self.attributes)
            .build();
        tracing::debug!(
            fixture = filename,
            backend = self.backend.as_str(),
            "converting fixture"
        );
        self.converter.convert_file(&source, &options)?;
        Ok(ConvertedHtml::new(
            temp.path().to_path_buf(),
            temp.resolve(format!("{DOCUMENT_NAME}.html")),
        ))
    }

    #[tracing::instrument(skip_all, fields(test = %context.test(), parameter = parameter.name()))]
    fn resolve_expected_html(
        &self,
        parameter: &Parameter,
        context: &ExtensionContext,
    ) -> Result<ExpectedHtml, Error> {
        let filename = context.test().expected_filename(parameter.name());
        context
            .resources()
            .read_to_string(&filename, context.test())
            .map(ExpectedHtml)
            .map_err(|e| {
                Error::parameter_resolution(
                    format!("Error reading expected HTML file {filename}"),
                    e,
                )
            })
    }
}

impl Default for AsciidoctorExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AsciidoctorExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsciidoctorExtension")
            .field("backend", &self.backend)
            .field("safe_mode", &self.safe_mode)
            .field("attributes", &self.attributes)
            .field("temp_root", &self.temp_root)
            .finish_non_exhaustive()
    }
}

impl ParameterResolver for AsciidoctorExtension {
    fn supports_parameter(&self, parameter: &Parameter, _: &ExtensionContext) -> bool {
        parameter.is::<ConvertedHtml>() || parameter.is::<ExpectedHtml>()
    }

    fn resolve_parameter(
        &self,
        parameter: &Parameter,
        context: &ExtensionContext,
    ) -> Result<Box<dyn Any>, Error> {
        if parameter.is::<ConvertedHtml>() {
            return Ok(Box::new(self.resolve_converted_html(parameter, context)?));
        }
        if parameter.is::<ExpectedHtml>() {
            return Ok(Box::new(self.resolve_expected_html(parameter, context)?));
        }
        Err(Error::UnsupportedParameter {
            name: parameter.name().to_string(),
            type_name: parameter.type_name(),
        })
    }
}

/// Builder for [`AsciidoctorExtension`].
pub struct AsciidoctorExtensionBuilder {
    converter: Option<Box<dyn Converter>>,
    backend: String,
    safe_mode: SafeMode,
    attributes: Vec<(String, String)>,
    temp_root: Option<PathBuf>,
}

impl Default for AsciidoctorExtensionBuilder {
    fn default() -> Self {
        Self {
            converter: None,
            backend: DEFAULT_BACKEND.to_string(),
            safe_mode: SafeMode::Unsafe,
            attributes: Vec::new(),
            temp_root: None,
        }
    }
}

impl AsciidoctorExtensionBuilder {
    /// Convert fixtures with `converter`. Defaults to [`AsciidoctorCli::from_env`].
    #[must_use]
    pub fn converter<C: Converter + 'static>(mut self, converter: C) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    /// Backend identifier passed to the converter. Defaults to `spring-html`.
    #[must_use]
    pub fn backend<S: Into<String>>(mut self, backend: S) -> Self {
        self.backend = backend.into();
        self
    }

    /// Defaults to [`SafeMode::Unsafe`]: fixtures may include whatever they like.
    #[must_use]
    pub fn safe_mode(mut self, safe_mode: SafeMode) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    /// Document attribute passed along with every conversion.
    #[must_use]
    pub fn attribute<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Create temporary directories under `root` instead of the system temporary
    /// directory.
    #[must_use]
    pub fn temp_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Build the [`AsciidoctorExtension`].
    #[must_use]
    pub fn build(self) -> AsciidoctorExtension {
        AsciidoctorExtension {
            converter: self
                .converter
                .unwrap_or_else(|| Box::new(AsciidoctorCli::from_env())),
            backend: self.backend,
            safe_mode: self.safe_mode,
            attributes: self.attributes,
            temp_root: self.temp_root,
        }
    }
}

impl fmt::Debug for AsciidoctorExtensionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsciidoctorExtensionBuilder")
            .field("backend", &self.backend)
            .field("safe_mode", &self.safe_mode)
            .finish_non_exhaustive()
    }
}
