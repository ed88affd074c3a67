#![allow(clippy::unwrap_used)]

use std::{
    cell::RefCell,
    fs,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
};

use acdc_converters_testsupport::{
    AsciidoctorExtension, BoxError, ConvertedHtml, Error, ExpectedHtml, ExtensionContext, Options,
    Parameter, Resolvers, Resources, TestIdentity, converter::output_file, test_identity,
};
use pretty_assertions::assert_eq;

/// Stand-in for a real backend: titles, list items and paragraphs, one per line.
fn line_converter(source: &Path, options: &Options) -> Result<(), BoxError> {
    let adoc = fs::read_to_string(source)?;
    let html: String = adoc
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(title) = line.strip_prefix("= ") {
                format!("<h1>{title}</h1>\n")
            } else if let Some(item) = line.strip_prefix("* ") {
                format!("<li>{item}</li>\n")
            } else {
                format!("<p>{line}</p>\n")
            }
        })
        .collect();
    fs::write(output_file(source, options), html)?;
    Ok(())
}

fn failing_converter(_: &Path, options: &Options) -> Result<(), BoxError> {
    Err(format!("backend '{}' is not registered", options.backend()).into())
}

fn resolvers() -> Resolvers {
    Resolvers::new().with(
        AsciidoctorExtension::builder()
            .converter(line_converter)
            .build(),
    )
}

fn shared_list() -> Parameter {
    Parameter::of::<ConvertedHtml>("html").with_source("shared_list.adoc")
}

fn error_chain(err: &Error) -> Vec<String> {
    let mut messages = vec![err.to_string()];
    let mut current = std::error::Error::source(err);
    while let Some(source) = current {
        messages.push(source.to_string());
        current = std::error::Error::source(source);
    }
    messages
}

#[test]
fn converts_paragraph() -> Result<(), Error> {
    let resolvers = resolvers();
    let context = ExtensionContext::new(test_identity!());

    let actual: ConvertedHtml = resolvers.resolve_as("actual", &context)?;
    let expected: ExpectedHtml = resolvers.resolve_as("expected", &context)?;

    assert!(actual.file().is_file());
    assert_eq!(actual.file(), actual.directory().join("test.html"));
    let html = actual.html()?;
    assert!(!html.is_empty());
    assert_eq!(html, expected.as_str());
    context.close()
}

#[test]
fn shares_temporary_directory() -> Result<(), Error> {
    let resolvers = resolvers();
    let context = ExtensionContext::new(test_identity!());

    let first: ConvertedHtml = resolvers.resolve_as("first", &context)?;
    let second: ConvertedHtml = resolvers.resolve_parameter_as(&shared_list(), &context)?;

    assert_eq!(first.directory(), second.directory());
    assert_eq!(
        second.html()?,
        "<li>alpha</li>\n<li>beta</li>\n<li>gamma</li>\n"
    );
    context.close()
}

#[test]
fn removes_temporary_directory_on_close() -> Result<(), Error> {
    let context = ExtensionContext::new(test_identity!());
    let converted: ConvertedHtml = resolvers().resolve_as("html", &context)?;
    assert!(converted.directory().is_dir());

    context.close()?;

    assert!(!converted.directory().exists());
    assert!(!converted.file().exists());
    Ok(())
}

#[test]
#[allow(clippy::panic)]
fn removes_temporary_directory_when_test_panics() {
    let directory: RefCell<Option<PathBuf>> = RefCell::new(None);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let context = ExtensionContext::new(test_identity!());
        let converted: Result<ConvertedHtml, Error> = resolvers().resolve_as("html", &context);
        if let Ok(converted) = converted {
            directory.replace(Some(converted.directory().to_path_buf()));
            panic!("assertion failed inside the test body");
        }
    }));

    assert!(outcome.is_err());
    let directory = directory.into_inner();
    assert!(directory.is_some(), "conversion did not run");
    assert!(directory.is_some_and(|directory| !directory.exists()));
}

#[test]
fn isolates_test_invocations() -> Result<(), Error> {
    let resolvers = resolvers();
    let first_context = ExtensionContext::new(TestIdentity::new("integration_test", "first"));
    let second_context = ExtensionContext::new(TestIdentity::new("integration_test", "second"));

    let first: ConvertedHtml = resolvers.resolve_parameter_as(&shared_list(), &first_context)?;
    let second: ConvertedHtml = resolvers.resolve_parameter_as(&shared_list(), &second_context)?;

    assert_ne!(first.directory(), second.directory());

    first_context.close()?;
    assert!(!first.directory().exists());
    assert!(second.file().is_file());
    second_context.close()
}

#[test]
fn expected_html_is_verbatim() -> Result<(), Error> {
    let context = ExtensionContext::new(test_identity!());
    let fixture = context
        .resources()
        .root()
        .join("integration_test_expected_html_is_verbatim_expected.html");

    let expected: ExpectedHtml = resolvers().resolve_as("expected", &context)?;

    assert_eq!(expected.as_str(), fs::read_to_string(fixture)?);
    assert!(expected.starts_with("  <div"));
    assert!(expected.contains("  \r\n"));
    assert!(expected.ends_with("</div>\n\n"));
    context.close()
}

#[test]
fn source_override_replaces_convention() -> Result<(), Error> {
    // No fixture follows the naming convention for this test.
    let context = ExtensionContext::new(test_identity!());

    let converted: ConvertedHtml = resolvers().resolve_parameter_as(&shared_list(), &context)?;

    assert!(converted.html()?.starts_with("<li>alpha</li>"));
    context.close()
}

#[test]
fn missing_source_fixture_fails() {
    let context = ExtensionContext::new(test_identity!());

    let err = resolvers()
        .resolve_as::<ConvertedHtml>("html", &context)
        .unwrap_err();

    let chain = error_chain(&err);
    assert_eq!(
        chain.first().map(String::as_str),
        Some("Error converting asciidoc integration_test_missing_source_fixture_fails.adoc")
    );
    assert!(
        chain
            .iter()
            .skip(1)
            .any(|message| message.starts_with(
                "integration_test integration_test_missing_source_fixture_fails.adoc"
            )),
        "{chain:?}"
    );
}

#[test]
fn missing_expected_fixture_fails() {
    let context = ExtensionContext::new(test_identity!());

    let err = resolvers()
        .resolve_as::<ExpectedHtml>("expected", &context)
        .unwrap_err();

    assert!(matches!(err, Error::ParameterResolution { .. }), "{err:?}");
    assert_eq!(
        err.to_string(),
        "Error reading expected HTML file integration_test_missing_expected_fixture_fails_expected.html"
    );
}

#[test]
fn converter_failure_is_wrapped() {
    let resolvers = Resolvers::new().with(
        AsciidoctorExtension::builder()
            .converter(failing_converter)
            .backend("spring-html")
            .build(),
    );
    let context = ExtensionContext::new(test_identity!());

    let err = resolvers
        .resolve_parameter_as::<ConvertedHtml>(&shared_list(), &context)
        .unwrap_err();

    let chain = error_chain(&err);
    assert_eq!(
        chain.first().map(String::as_str),
        Some("Error converting asciidoc shared_list.adoc")
    );
    assert!(
        chain
            .iter()
            .any(|message| message == "backend 'spring-html' is not registered"),
        "{chain:?}"
    );
}

#[test]
fn temporary_directory_creation_failure_is_fatal() -> Result<(), Error> {
    let root = tempfile::tempdir()?;
    let resolvers = Resolvers::new().with(
        AsciidoctorExtension::builder()
            .converter(line_converter)
            .temp_root(root.path().join("missing"))
            .build(),
    );
    let context = ExtensionContext::new(test_identity!());

    let err = resolvers
        .resolve_parameter_as::<ConvertedHtml>(&shared_list(), &context)
        .unwrap_err();

    assert!(
        matches!(&err, Error::ParameterResolution { source, .. }
            if matches!(**source, Error::ExtensionConfiguration { .. })),
        "{err:?}"
    );
    assert!(error_chain(&err).contains(&"Failed to create output directory".to_string()));
    Ok(())
}

#[test]
fn unsupported_parameter_is_rejected() {
    let context = ExtensionContext::new(test_identity!());
    let parameter = Parameter::of::<String>("title");

    assert!(!resolvers().supports(&parameter, &context));
    let err = resolvers().resolve(&parameter, &context).unwrap_err();
    assert!(matches!(err, Error::UnsupportedParameter { .. }), "{err:?}");
}

#[test]
fn fixtures_resolve_from_manifest_directory() {
    let context = ExtensionContext::new(test_identity!());
    assert_eq!(
        context.resources(),
        &Resources::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
    );
}
