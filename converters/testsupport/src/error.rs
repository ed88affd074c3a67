use std::{path::PathBuf, process::ExitStatus};

/// Boxed error returned by closure-based converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving test parameters.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Resolving a parameter failed. The message names the fixture involved.
    #[error("{message}")]
    ParameterResolution {
        /// What was being resolved.
        message: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The extension could not set up what a test invocation needs.
    #[error("{message}")]
    ExtensionConfiguration {
        /// What could not be set up.
        message: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A fixture the test needs does not exist.
    #[error("{class} {filename}: fixture not found at {}", path.display())]
    MissingFixture {
        /// Class of the test that asked for the fixture.
        class: String,
        /// Name of the fixture.
        filename: String,
        /// Where the fixture was looked up.
        path: PathBuf,
    },

    /// No registered resolver accepts the parameter.
    #[error("no resolver supports parameter '{name}' of type {type_name}")]
    UnsupportedParameter {
        /// Parameter name.
        name: String,
        /// Declared type of the parameter.
        type_name: &'static str,
    },

    /// A resolver produced a value of the wrong type.
    #[error("parameter '{name}' was not resolved to a value of type {expected}")]
    ParameterTypeMismatch {
        /// Parameter name.
        name: String,
        /// Type the caller asked for.
        expected: &'static str,
    },

    /// A store entry holds a value of another type.
    #[error("store entry '{namespace}/{key}' does not hold a value of type {expected}")]
    StoreTypeMismatch {
        /// Namespace of the entry.
        namespace: &'static str,
        /// Key of the entry.
        key: String,
        /// Type the caller asked for.
        expected: &'static str,
    },

    /// The converter failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Reading, copying or removing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parameter_resolution<S: Into<String>>(message: S, source: Error) -> Self {
        Self::ParameterResolution {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Errors raised by a [`Converter`](crate::Converter).
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConvertError {
    /// The converter process could not be started.
    #[error("failed to run converter '{}'", program.display())]
    Spawn {
        /// The executable.
        program: PathBuf,
        /// Why it could not be started.
        #[source]
        source: std::io::Error,
    },

    /// The converter process exited unsuccessfully.
    #[error(
        "converter '{}' failed on {} ({status}): {stderr}",
        program.display(),
        source_file.display()
    )]
    Process {
        /// The executable.
        program: PathBuf,
        /// The document being converted.
        source_file: PathBuf,
        /// Exit status of the process.
        status: ExitStatus,
        /// Captured standard error, without trailing whitespace.
        stderr: String,
    },

    /// Preparing or collecting converter files failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A closure-based converter returned an error.
    #[error("{0}")]
    Backend(#[source] BoxError),
}
