//! Test fixtures for testbuild unit tests.
//!
//! Provides canned build-state tables in the shape the host hands to the
//! task, plus fake compilers for exercising the engine without real tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use testbuild::test_support::{end_to_end_state, fake_registry};
//!
//! #[test]
//! fn test_example() {
//!     let mut state = end_to_end_state();
//!     let task = TestBuildTask::new(TestVariant::native(), fake_registry("MSVC", false));
//!     task.execute(&mut state).unwrap();
//! }
//! ```

use std::path::Path;

use anyhow::{bail, Result};

use crate::builder::compiler::{Compiler, CompilerRegistry};
use crate::core::arguments::BuildArguments;
use crate::core::operation::BuildOperation;
use crate::core::path_set::PathSet;
use crate::core::state::MemoryBuildState;
use crate::core::value::ValueTable;

/// A `Build` table with only the four required directories.
pub fn build_table() -> ValueTable {
    ValueTable::new()
        .with("SourceRootDirectory", "/src")
        .with("TargetRootDirectory", "/out")
        .with("ObjectDirectory", "/out/obj")
        .with("BinaryDirectory", "/out/bin")
}

/// A `Recipe` table declaring the given test sources.
pub fn recipe_table(sources: Vec<&str>) -> ValueTable {
    ValueTable::new()
        .with("Name", "Sample")
        .with("Tests", ValueTable::new().with("Source", sources))
}

pub fn parameters_table(architecture: &str, compiler: &str) -> ValueTable {
    ValueTable::new()
        .with("Architecture", architecture)
        .with("Compiler", compiler)
}

/// An active state with `Recipe`, `Build` and `Parameters` tables.
pub fn active_state(recipe: ValueTable, build: ValueTable, parameters: ValueTable) -> ValueTable {
    ValueTable::new()
        .with("Recipe", recipe)
        .with("Build", build)
        .with("Parameters", parameters)
}

/// One test source, one shared runtime dependency, and one test dependency
/// that re-exports it alongside a second library.
pub fn end_to_end_state() -> MemoryBuildState {
    let foo = ValueTable::new().with(
        "Build",
        ValueTable::new().with("RuntimeDependencies", vec!["/libs/a.dll", "/libs/b.dll"]),
    );
    let active = active_state(
        recipe_table(vec!["test_main.ext"]),
        build_table(),
        parameters_table("x64", "MSVC"),
    )
    .with(
        "Dependencies",
        ValueTable::new().with("Test", ValueTable::new().with("Foo", foo)),
    );

    let shared = ValueTable::new().with(
        "Build",
        ValueTable::new().with("RuntimeDependencies", vec!["/libs/a.dll"]),
    );

    MemoryBuildState::new(active, shared)
}

/// Compiler that emits a single operation producing `<name>.exe`.
#[derive(Debug, Clone, Copy)]
pub struct FakeCompiler;

impl Compiler for FakeCompiler {
    fn name(&self) -> &str {
        "Fake"
    }

    fn target_file_name(&self, arguments: &BuildArguments) -> String {
        format!("{}.exe", arguments.target_name)
    }

    fn create_operations(
        &self,
        arguments: &BuildArguments,
        target_file: &Path,
    ) -> Result<Vec<BuildOperation>> {
        let inputs: PathSet = arguments
            .source_files
            .iter()
            .map(|source| arguments.source_root_directory.join(source))
            .collect();
        Ok(vec![BuildOperation::new(
            format!("Build - {}", arguments.target_name),
            &arguments.target_root_directory,
            "fake-cc",
            "",
            inputs,
            PathSet::unique([target_file]),
        )])
    }
}

/// Compiler whose operation generation always fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingCompiler;

impl Compiler for FailingCompiler {
    fn name(&self) -> &str {
        "Failing"
    }

    fn target_file_name(&self, arguments: &BuildArguments) -> String {
        format!("{}.exe", arguments.target_name)
    }

    fn create_operations(&self, _: &BuildArguments, _: &Path) -> Result<Vec<BuildOperation>> {
        bail!("compiler exploded")
    }
}

/// A registry holding one fake compiler under `name`.
pub fn fake_registry(name: &str, failing: bool) -> CompilerRegistry {
    if failing {
        CompilerRegistry::new().with(name, |_| Ok(Box::new(FailingCompiler) as Box<dyn Compiler>))
    } else {
        CompilerRegistry::new().with(name, |_| Ok(Box::new(FakeCompiler) as Box<dyn Compiler>))
    }
}
