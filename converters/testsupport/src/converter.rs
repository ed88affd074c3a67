//! The converter seam.
//!
//! Conversion is owned by an external converter. This module only describes how it is
//! invoked: a source file, a [`SafeMode`], a backend identifier and an output
//! directory. [`AsciidoctorCli`] drives the `asciidoctor` executable; any
//! `Fn(&Path, &Options) -> Result<(), BoxError>` can stand in for it.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

use crate::error::{BoxError, ConvertError};

/// Backend identifier passed to the converter unless configured otherwise.
pub const DEFAULT_BACKEND: &str = "spring-html";

/// Environment variable naming the `asciidoctor` executable.
pub const ASCIIDOCTOR_ENV: &str = "ASCIIDOCTOR";

/// Safe mode to use when converting a document. Follows the levels described in
/// <https://docs.asciidoctor.org/asciidoctor/latest/safe-modes/>.
#[derive(Debug, Clone, Default, PartialOrd, PartialEq, Eq, Copy)]
pub enum SafeMode {
    /// Disables all security measures. Fixtures are trusted, so this is what tests use.
    #[default]
    Unsafe,

    /// Prevents access to files outside of the parent directory of the source file.
    Safe,

    /// Like `Safe`, and additionally stops the document from setting attributes that
    /// affect conversion (`source-highlighter`, `doctype`, `docinfo`, `backend`).
    Server,

    /// Disallows reading files from the file system and including their contents.
    Secure,
}

impl FromStr for SafeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unsafe" => Ok(Self::Unsafe),
            "safe" => Ok(Self::Safe),
            "server" => Ok(Self::Server),
            "secure" => Ok(Self::Secure),
            _ => Err(format!(
                "invalid safe mode: '{s}', expected: unsafe, safe, server, secure"
            )),
        }
    }
}

impl std::fmt::Display for SafeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsafe => write!(f, "unsafe"),
            Self::Safe => write!(f, "safe"),
            Self::Server => write!(f, "server"),
            Self::Secure => write!(f, "secure"),
        }
    }
}

/// Per-call conversion options.
///
/// Use [`Options::builder()`] to construct an instance.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    safe_mode: SafeMode,
    backend: String,
    to_dir: PathBuf,
    attributes: Vec<(String, String)>,
}

impl Options {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Get the safe mode.
    #[must_use]
    pub fn safe_mode(&self) -> SafeMode {
        self.safe_mode
    }

    /// Get the backend identifier.
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Get the directory the converter writes its output to.
    #[must_use]
    pub fn to_dir(&self) -> &Path {
        &self.to_dir
    }

    /// Get the document attributes passed to the converter, in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    safe_mode: SafeMode,
    backend: String,
    to_dir: PathBuf,
    attributes: Vec<(String, String)>,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            safe_mode: SafeMode::default(),
            backend: DEFAULT_BACKEND.to_string(),
            to_dir: PathBuf::from("."),
            attributes: Vec::new(),
        }
    }
}

impl OptionsBuilder {
    /// Set the safe mode for processing.
    #[must_use]
    pub fn safe_mode(mut self, mode: SafeMode) -> Self {
        self.safe_mode = mode;
        self
    }

    /// Set the backend identifier.
    #[must_use]
    pub fn backend<S: Into<String>>(mut self, backend: S) -> Self {
        self.backend = backend.into();
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn to_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.to_dir = dir.into();
        self
    }

    /// Add a document attribute.
    #[must_use]
    pub fn attribute<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add every attribute from `attributes`.
    #[must_use]
    pub fn attributes<'a, I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        self.attributes.extend(attributes.into_iter().cloned());
        self
    }

    /// Build the [`Options`] instance.
    #[must_use]
    pub fn build(self) -> Options {
        Options {
            safe_mode: self.safe_mode,
            backend: self.backend,
            to_dir: self.to_dir,
            attributes: self.attributes,
        }
    }
}

/// A document converter.
///
/// Implementations write `<stem>.html` for the source `<stem>.adoc` into
/// [`Options::to_dir`]. They are shared read-only between resolutions, so all per-call
/// configuration travels in [`Options`].
pub trait Converter {
    /// Convert `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the converter cannot run or reports a failure.
    fn convert_file(&self, source: &Path, options: &Options) -> Result<(), ConvertError>;
}

impl<F> Converter for F
where
    F: Fn(&Path, &Options) -> Result<(), BoxError>,
{
    fn convert_file(&self, source: &Path, options: &Options) -> Result<(), ConvertError> {
        self(source, options).map_err(ConvertError::Backend)
    }
}

/// Path of the HTML file a converter produces for `source`.
#[must_use]
pub fn output_file(source: &Path, options: &Options) -> PathBuf {
    let mut name = source
        .file_stem()
        .unwrap_or(source.as_os_str())
        .to_os_string();
    name.push(".html");
    options.to_dir().join(name)
}

/// Runs the `asciidoctor` executable.
#[derive(Debug, Clone)]
pub struct AsciidoctorCli {
    program: PathBuf,
    requires: Vec<String>,
}

impl AsciidoctorCli {
    /// Use `program` as the `asciidoctor` executable.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            requires: Vec::new(),
        }
    }

    /// Use the executable named by `ASCIIDOCTOR`, or `asciidoctor` from `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(ASCIIDOCTOR_ENV).unwrap_or_else(|| OsString::from("asciidoctor")),
        )
    }

    /// Require a library before converting (`-r`). Custom backends are usually loaded
    /// this way.
    #[must_use]
    pub fn require<S: Into<String>>(mut self, library: S) -> Self {
        self.requires.push(library.into());
        self
    }

    /// The executable that will be run.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub(crate) fn command(&self, source: &Path, options: &Options) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-S")
            .arg(options.safe_mode().to_string())
            .arg("-b")
            .arg(options.backend())
            .arg("-D")
            .arg(options.to_dir());
        for library in &self.requires {
            command.arg("-r").arg(library);
        }
        for (name, value) in options.attributes() {
            command.arg("-a").arg(format!("{name}={value}"));
        }
        command.arg(source);
        command
    }
}

impl Default for AsciidoctorCli {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Converter for AsciidoctorCli {
    #[tracing::instrument(
        skip(self, options),
        fields(program = %self.program.display(), backend = options.backend())
    )]
    fn convert_file(&self, source: &Path, options: &Options) -> Result<(), ConvertError> {
        let output = self
            .command(source, options)
            .output()
            .map_err(|source| ConvertError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ConvertError::Process {
                program: self.program.clone(),
                source_file: source.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        if !output.stderr.is_empty() {
            tracing::debug!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "converter reported warnings"
            );
        }
        Ok(())
    }
}
