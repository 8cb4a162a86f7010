//! Operation graph assembly.
//!
//! Appends the "run tests" operation to the operations produced by the build
//! engine and registers the whole list with the host.
//!
//! The run operation declares no outputs. A test run produces no tracked
//! artifacts, so the host can only decide to skip it from input staleness
//! (or always run it); it can never be skipped because its outputs are up to
//! date.

use crate::builder::variant::TestVariant;
use crate::core::arguments::BuildArguments;
use crate::core::operation::{BuildOperation, BuildResult};
use crate::core::path_set::PathSet;
use crate::core::state::BuildState;

pub const RUN_TESTS_TITLE: &str = "Run Tests";

/// Create the operation that runs the test harness.
///
/// Inputs are the harness itself, its runtime dependencies, and whatever the
/// variant needs to launch it. Leaving one out would let the host skip a run
/// after that file changed.
pub fn run_tests_operation(
    result: &BuildResult,
    arguments: &BuildArguments,
    variant: &TestVariant,
) -> BuildOperation {
    let (program, run_arguments) = variant.run_command(&result.target_file);

    let mut input_files = result.runtime_dependencies.clone();
    input_files.insert(&result.target_file);
    input_files.extend(variant.launcher_files(arguments));

    BuildOperation::new(
        RUN_TESTS_TITLE,
        &arguments.target_root_directory,
        program,
        run_arguments,
        input_files,
        PathSet::new(),
    )
}

/// The engine's operations followed by the run operation.
pub fn assemble(
    result: BuildResult,
    arguments: &BuildArguments,
    variant: &TestVariant,
) -> Vec<BuildOperation> {
    let run_tests = run_tests_operation(&result, arguments, variant);
    let mut operations = result.build_operations;
    operations.push(run_tests);
    operations
}

/// Register operations with the host, in list order.
pub fn register(state: &mut dyn BuildState, operations: Vec<BuildOperation>) {
    let count = operations.len();
    for operation in operations {
        tracing::debug!("registering operation: {}", operation);
        state.create_operation(operation);
    }
    tracing::info!("registered {} build operation(s)", count);
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::state::MemoryBuildState;

    fn arguments() -> BuildArguments {
        BuildArguments {
            target_name: "TestHarness".to_string(),
            target_root_directory: PathBuf::from("/out"),
            binary_directory: PathBuf::from("/out/bin/Test/"),
            ..Default::default()
        }
    }

    fn result(extension: &str) -> BuildResult {
        BuildResult {
            target_file: PathBuf::from(format!("/out/bin/Test/TestHarness.{}", extension)),
            runtime_dependencies: PathSet::unique(["/libs/a.dll", "/libs/b.dll"]),
            build_operations: vec![BuildOperation::new(
                "Link - TestHarness",
                "/out",
                "link.exe",
                "",
                PathSet::new(),
                PathSet::unique([format!("/out/bin/Test/TestHarness.{}", extension)]),
            )],
        }
    }

    #[test]
    fn test_native_run_operation() {
        let op = run_tests_operation(&result("exe"), &arguments(), &TestVariant::native());

        assert_eq!(op.title, RUN_TESTS_TITLE);
        assert_eq!(op.working_directory, PathBuf::from("/out"));
        assert_eq!(op.program, PathBuf::from("/out/bin/Test/TestHarness.exe"));
        assert_eq!(op.arguments, "");
        assert_eq!(
            op.input_files,
            PathSet::unique(["/libs/a.dll", "/libs/b.dll", "/out/bin/Test/TestHarness.exe"])
        );
        assert!(op.output_files.is_empty());
    }

    #[test]
    fn test_managed_run_operation() {
        let variant = TestVariant::managed("C:/Program Files/dotnet/dotnet.exe");
        let op = run_tests_operation(&result("dll"), &arguments(), &variant);

        assert_eq!(op.program, PathBuf::from("C:/Program Files/dotnet/dotnet.exe"));
        assert_eq!(op.arguments, "/out/bin/Test/TestHarness.dll");
        assert!(op.reads("/out/bin/Test/TestHarness.dll"));
        assert!(op.reads("C:/Program Files/dotnet/dotnet.exe"));
        assert!(op.reads("/out/bin/Test/TestHarness.runtimeconfig.json"));
        assert!(op.reads("/libs/a.dll"));
        assert_eq!(op.input_files.len(), 5);
        assert!(op.output_files.is_empty());
    }

    #[test]
    fn test_runtime_dependency_equal_to_target_is_not_duplicated() {
        let mut result = result("exe");
        result.runtime_dependencies.insert("/out/bin/Test//TestHarness.exe");
        let op = run_tests_operation(&result, &arguments(), &TestVariant::native());
        assert_eq!(op.input_files.len(), 3);
    }

    #[test]
    fn test_assemble_appends_exactly_one() {
        let operations = assemble(result("exe"), &arguments(), &TestVariant::native());
        assert_eq!(operations.len(), 2);
        assert_eq!(operations[0].title, "Link - TestHarness");
        assert_eq!(operations[1].title, RUN_TESTS_TITLE);
    }

    #[test]
    fn test_register_in_order() {
        let mut state = MemoryBuildState::default();
        let operations = assemble(result("exe"), &arguments(), &TestVariant::native());
        register(&mut state, operations.clone());
        assert_eq!(state.operations(), operations.as_slice());
    }
}
