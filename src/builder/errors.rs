//! Test build error types and diagnostics.

use thiserror::Error;

use crate::core::value::ValueError;
use crate::util::diagnostic::Diagnostic;

/// Fatal error while configuring or assembling a test build.
///
/// None of these are retried: the task aborts and registers nothing.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum TestBuildError {
    #[error("No Tests Specified")]
    #[diagnostic(code(testbuild::task::no_tests))]
    NoTestsSpecified,

    #[error("No Test Source Files")]
    #[diagnostic(code(testbuild::task::no_test_source))]
    NoTestSourceSpecified,

    #[error("missing required property `{key}` in `{table}` table")]
    #[diagnostic(code(testbuild::load::missing_property))]
    MissingRequiredProperty {
        table: String,
        key: String,
        #[source]
        cause: ValueError,
    },

    #[error("invalid property `{key}` in `{table}` table: {reason}")]
    #[diagnostic(code(testbuild::load::invalid_property))]
    InvalidProperty {
        table: String,
        key: String,
        reason: String,
    },

    #[error("Unknown compiler: {name}")]
    #[diagnostic(code(testbuild::task::unknown_compiler))]
    UnknownCompiler { name: String, known: Vec<String> },

    #[error("build engine failed")]
    #[diagnostic(code(testbuild::engine::failed))]
    Engine {
        #[source]
        source: anyhow::Error,
    },
}

impl TestBuildError {
    pub(crate) fn missing(table: &str, key: &str, cause: ValueError) -> Self {
        TestBuildError::MissingRequiredProperty {
            table: table.to_string(),
            key: key.to_string(),
            cause,
        }
    }

    pub(crate) fn invalid(table: &str, key: &str, reason: impl ToString) -> Self {
        TestBuildError::InvalidProperty {
            table: table.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The property name carried by a property error, if any.
    pub fn property(&self) -> Option<&str> {
        match self {
            TestBuildError::MissingRequiredProperty { key, .. }
            | TestBuildError::InvalidProperty { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TestBuildError::NoTestsSpecified => {
                Diagnostic::error("no tests specified in the recipe")
                    .with_suggestion("Add a `[Tests]` table with a `Source` list to the recipe")
            }

            TestBuildError::NoTestSourceSpecified => {
                Diagnostic::error("the recipe `Tests` table has no `Source` list")
                    .with_suggestion("List the test source files: `Source = [\"tests/main.cpp\"]`")
            }

            TestBuildError::MissingRequiredProperty { table, key, cause } => {
                Diagnostic::error(format!("missing required property `{}`", key))
                    .with_context(format!("in the `{}` table: {}", table, cause))
                    .with_suggestion(format!("Set `{}` in the `{}` table", key, table))
            }

            TestBuildError::InvalidProperty { table, key, reason } => {
                Diagnostic::error(format!("invalid property `{}`", key))
                    .with_context(format!("in the `{}` table: {}", table, reason))
            }

            TestBuildError::UnknownCompiler { name, known } => {
                let mut diag = Diagnostic::error(format!("unknown compiler `{}`", name));
                if !known.is_empty() {
                    diag = diag.with_context(format!("registered compilers: {}", known.join(", ")));
                }
                diag.with_suggestion("Set `Parameters.Compiler` to a registered compiler")
            }

            TestBuildError::Engine { source } => {
                Diagnostic::error("build engine failed").with_context(format!("{:#}", source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_property_names_key() {
        let err = TestBuildError::missing(
            "Build",
            "SourceRootDirectory",
            ValueError::NotFound {
                key: "SourceRootDirectory".to_string(),
            },
        );
        assert_eq!(err.property(), Some("SourceRootDirectory"));
        assert!(err.to_string().contains("SourceRootDirectory"));

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: missing required property `SourceRootDirectory`"));
        assert!(output.contains("Set `SourceRootDirectory` in the `Build` table"));
    }

    #[test]
    fn test_unknown_compiler_lists_known() {
        let err = TestBuildError::UnknownCompiler {
            name: "Clang".to_string(),
            known: vec!["MSVC".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown compiler: Clang");

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("registered compilers: MSVC"));
    }
}
