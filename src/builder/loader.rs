//! Property loading.
//!
//! Reads typed fields out of configuration tables into [`BuildArguments`].
//! Required properties fail with `MissingRequiredProperty` when absent or of
//! the wrong type. Optional properties are only applied when present; an
//! optional property of the wrong type is an `InvalidProperty` error rather
//! than being silently ignored.

use std::path::PathBuf;

use crate::builder::errors::TestBuildError;
use crate::builder::variant::TestVariant;
use crate::core::arguments::{BuildArguments, BuildTargetType, LanguageStandard, OptimizationLevel};
use crate::core::path_set::PathSet;
use crate::core::value::{Value, ValueError, ValueKind, ValueTable};

/// Name given to every test harness target.
pub const TEST_TARGET_NAME: &str = "TestHarness";

/// A table paired with the name used to report errors against it.
#[derive(Debug, Clone, Copy)]
pub struct TableReader<'a> {
    name: &'a str,
    table: &'a ValueTable,
}

impl<'a> TableReader<'a> {
    pub fn new(name: &'a str, table: &'a ValueTable) -> Self {
        TableReader { name, table }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn table(&self) -> &'a ValueTable {
        self.table
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str, TestBuildError> {
        self.table
            .get(key)
            .and_then(Value::as_str)
            .map_err(|cause| TestBuildError::missing(self.name, key, cause))
    }

    pub fn required_path(&self, key: &str) -> Result<PathBuf, TestBuildError> {
        self.required_str(key).map(PathBuf::from)
    }

    pub fn required_table(&self, key: &str) -> Result<&'a ValueTable, TestBuildError> {
        self.table
            .table(key)
            .map_err(|cause| TestBuildError::missing(self.name, key, cause))
    }

    /// A nested table that may be absent but must be a table when present.
    pub fn optional_table(&self, key: &str) -> Result<Option<&'a ValueTable>, TestBuildError> {
        self.table
            .try_get(key)
            .map(|value| value.as_table().map_err(|e| TestBuildError::invalid(self.name, key, e)))
            .transpose()
    }

    pub fn optional_paths(&self, key: &str) -> Result<Option<Vec<PathBuf>>, TestBuildError> {
        self.table
            .try_get(key)
            .map(|value| {
                value
                    .as_path_list()
                    .map_err(|e| TestBuildError::invalid(self.name, key, e))
            })
            .transpose()
    }

    pub fn optional_strings(&self, key: &str) -> Result<Option<Vec<String>>, TestBuildError> {
        self.table
            .try_get(key)
            .map(|value| {
                value
                    .as_string_list()
                    .map_err(|e| TestBuildError::invalid(self.name, key, e))
            })
            .transpose()
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, TestBuildError> {
        self.table
            .try_get(key)
            .map(|value| value.as_bool().map_err(|e| TestBuildError::invalid(self.name, key, e)))
            .transpose()
    }

    /// Merge an optional path list into `target`.
    pub fn merge_paths_into(&self, key: &str, target: &mut PathSet) -> Result<(), TestBuildError> {
        if let Some(paths) = self.optional_paths(key)? {
            let before = target.len();
            *target = PathSet::merge(target, paths);
            tracing::debug!(
                "{}.{}: {} new path(s), {} total",
                self.name,
                key,
                target.len() - before,
                target.len()
            );
        }
        Ok(())
    }
}

/// Load the common build properties from the active `Build` table.
pub fn load_build_properties(
    build: TableReader<'_>,
    variant: &TestVariant,
    arguments: &mut BuildArguments,
) -> Result<(), TestBuildError> {
    if variant.requires_language_standard {
        arguments.language_standard = Some(language_standard(build)?);
    }

    arguments.source_root_directory = build.required_path("SourceRootDirectory")?;
    arguments.target_root_directory = build.required_path("TargetRootDirectory")?;
    arguments.object_directory = build.required_path("ObjectDirectory")?;
    arguments.binary_directory = build.required_path("BinaryDirectory")?;

    build.merge_paths_into("IncludeDirectories", &mut arguments.include_directories)?;
    build.merge_paths_into("PlatformLibraries", &mut arguments.platform_link_dependencies)?;
    build.merge_paths_into("LinkLibraries", &mut arguments.link_dependencies)?;
    build.merge_paths_into("LinkDependencies", &mut arguments.link_dependencies)?;
    build.merge_paths_into("LibraryPaths", &mut arguments.library_paths)?;

    if let Some(definitions) = build.optional_strings("PreprocessorDefinitions")? {
        arguments.add_preprocessor_definitions(definitions);
    }

    arguments.optimization_level = optimization_level(build)?;
    arguments.generate_source_debug_info = build
        .optional_bool("GenerateSourceDebugInfo")?
        .unwrap_or(false);

    Ok(())
}

/// Load the test properties from the recipe `Tests` table.
///
/// Also fixes the harness identity: the test target is always an executable
/// named [`TEST_TARGET_NAME`].
pub fn load_test_properties(
    tests: TableReader<'_>,
    arguments: &mut BuildArguments,
) -> Result<(), TestBuildError> {
    let sources = match tests.table().try_get("Source") {
        Some(value) => value
            .as_path_list()
            .map_err(|e| TestBuildError::missing(tests.name(), "Source", e))?,
        None => return Err(TestBuildError::NoTestSourceSpecified),
    };
    if sources.is_empty() {
        return Err(TestBuildError::NoTestSourceSpecified);
    }
    arguments.source_files = sources;

    // Combine the include paths from the recipe and the system
    tests.merge_paths_into("IncludePaths", &mut arguments.include_directories)?;
    tests.merge_paths_into("PlatformLibraries", &mut arguments.platform_link_dependencies)?;

    arguments.target_name = TEST_TARGET_NAME.to_string();
    arguments.target_type = BuildTargetType::Executable;

    Ok(())
}

fn language_standard(build: TableReader<'_>) -> Result<LanguageStandard, TestBuildError> {
    let key = "LanguageStandard";
    let value = build
        .table()
        .get(key)
        .map_err(|cause| TestBuildError::missing(build.name(), key, cause))?;

    let parsed = match value {
        Value::Integer(i) => LanguageStandard::from_integer(*i)
            .ok_or_else(|| format!("unsupported language standard {}", i)),
        Value::String(s) => s.parse(),
        other => {
            let cause = ValueError::TypeMismatch {
                expected: ValueKind::Integer,
                found: other.kind(),
            };
            return Err(TestBuildError::missing(build.name(), key, cause));
        }
    };
    parsed.map_err(|reason| TestBuildError::invalid(build.name(), key, reason))
}

fn optimization_level(build: TableReader<'_>) -> Result<OptimizationLevel, TestBuildError> {
    let key = "OptimizationLevel";
    let Some(value) = build.table().try_get(key) else {
        return Ok(OptimizationLevel::None);
    };

    let parsed = match value {
        Value::Integer(i) => OptimizationLevel::from_integer(*i)
            .ok_or_else(|| format!("unsupported optimization level {}", i)),
        Value::String(s) => s.parse(),
        other => Err(format!("expected integer or string, found {}", other.kind())),
    };
    parsed.map_err(|reason| TestBuildError::invalid(build.name(), key, reason))
}
