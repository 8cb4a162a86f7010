//! Dependency merging.
//!
//! Folds the build tables exported by the shared (parent) build and by each
//! test dependency into the task's own [`BuildArguments`]. Sources are applied
//! in a fixed order:
//!
//! 1. the task's own recipe and `Build` properties (loaded earlier)
//! 2. the shared state's `Build` table
//! 3. `Dependencies.Test.<name>.Build` for each test dependency, in table order
//!
//! Every step is a set union. Nothing merged earlier is ever replaced, and a
//! missing table or list simply contributes nothing.

use crate::builder::errors::TestBuildError;
use crate::builder::loader::TableReader;
use crate::core::arguments::BuildArguments;
use crate::core::state::{BuildState, TraceLevel};
use crate::core::value::ValueTable;

/// The path lists a dependency exports through its `Build` table.
const EXPORTED_RUNTIME: &str = "RuntimeDependencies";
const EXPORTED_LINK: &str = "LinkDependencies";
const EXPORTED_MODULE: &str = "ModuleDependencies";

/// Merge one exported `Build` table into `arguments`.
pub fn merge_dependency_build(
    build: TableReader<'_>,
    arguments: &mut BuildArguments,
) -> Result<(), TestBuildError> {
    build.merge_paths_into(EXPORTED_RUNTIME, &mut arguments.runtime_dependencies)?;
    build.merge_paths_into(EXPORTED_LINK, &mut arguments.link_dependencies)?;
    build.merge_paths_into(EXPORTED_MODULE, &mut arguments.module_dependencies)?;
    Ok(())
}

/// Merge the shared build state's `Build` table, as if this were a dependency build.
pub fn merge_shared_build(
    shared_state: &ValueTable,
    arguments: &mut BuildArguments,
) -> Result<(), TestBuildError> {
    let shared = TableReader::new("SharedState", shared_state);
    match shared.optional_table("Build")? {
        Some(build) => merge_dependency_build(TableReader::new("SharedState.Build", build), arguments),
        None => {
            tracing::debug!("shared state exports no Build table");
            Ok(())
        }
    }
}

/// Merge every `Dependencies.Test.<name>.Build` table from the active state.
///
/// Only one level is walked: each dependency's exported lists are expected to
/// already contain its own transitive dependencies.
pub fn merge_test_dependencies(
    state: &dyn BuildState,
    arguments: &mut BuildArguments,
) -> Result<(), TestBuildError> {
    let active = TableReader::new("ActiveState", state.active_state());
    let Some(dependencies) = active.optional_table("Dependencies")? else {
        return Ok(());
    };
    let Some(test_dependencies) =
        TableReader::new("Dependencies", dependencies).optional_table("Test")?
    else {
        return Ok(());
    };

    for (name, value) in test_dependencies.iter() {
        state.log_trace(
            TraceLevel::Information,
            &format!("Combine Test Dependency: {}", name),
        );

        let table_name = format!("Dependencies.Test.{}", name);
        let dependency = value
            .as_table()
            .map_err(|e| TestBuildError::invalid("Dependencies.Test", name, e))?;

        match TableReader::new(&table_name, dependency).optional_table("Build")? {
            Some(build) => {
                let build_name = format!("{}.Build", table_name);
                merge_dependency_build(TableReader::new(&build_name, build), arguments)?;
            }
            None => tracing::debug!("test dependency {} exports no Build table", name),
        }
    }

    Ok(())
}
