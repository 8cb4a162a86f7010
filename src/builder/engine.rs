//! Build engine.
//!
//! Turns resolved [`BuildArguments`] into a [`BuildResult`] using the
//! selected [`Compiler`].

use crate::builder::compiler::Compiler;
use crate::builder::errors::TestBuildError;
use crate::core::arguments::BuildArguments;
use crate::core::operation::BuildResult;
use crate::core::state::{BuildState, TraceLevel};

pub struct BuildEngine {
    compiler: Box<dyn Compiler>,
}

impl BuildEngine {
    pub fn new(compiler: Box<dyn Compiler>) -> Self {
        BuildEngine { compiler }
    }

    pub fn compiler(&self) -> &dyn Compiler {
        self.compiler.as_ref()
    }

    /// Generate the operations that produce the target.
    ///
    /// The target lands in the binary directory. Runtime dependencies are
    /// passed through unchanged so the caller can wire them into whatever
    /// runs the target.
    pub fn execute(
        &self,
        state: &dyn BuildState,
        arguments: &BuildArguments,
    ) -> Result<BuildResult, TestBuildError> {
        let target_file = arguments
            .binary_directory
            .join(self.compiler.target_file_name(arguments));

        state.log_trace(
            TraceLevel::Information,
            &format!(
                "Generate {} build operations for {}",
                self.compiler.name(),
                target_file.display()
            ),
        );

        let build_operations = self
            .compiler
            .create_operations(arguments, &target_file)
            .map_err(|source| TestBuildError::Engine { source })?;

        Ok(BuildResult {
            target_file,
            runtime_dependencies: arguments.runtime_dependencies.clone(),
            build_operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::path_set::PathSet;
    use crate::core::state::MemoryBuildState;
    use crate::test_support::{FailingCompiler, FakeCompiler};

    fn arguments() -> BuildArguments {
        BuildArguments {
            target_name: "TestHarness".to_string(),
            binary_directory: PathBuf::from("/out/bin/Test/"),
            source_files: vec![PathBuf::from("test_main.cpp")],
            runtime_dependencies: PathSet::unique(["/libs/a.dll"]),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_result() {
        let state = MemoryBuildState::default();
        let engine = BuildEngine::new(Box::new(FakeCompiler));
        let result = engine.execute(&state, &arguments()).unwrap();

        assert_eq!(result.target_file, PathBuf::from("/out/bin/Test/TestHarness.exe"));
        assert_eq!(result.runtime_dependencies, PathSet::unique(["/libs/a.dll"]));
        assert_eq!(result.build_operations.len(), 1);
        assert!(result.build_operations[0].writes(&result.target_file));
        assert_eq!(state.traces().len(), 1);
    }

    #[test]
    fn test_engine_failure_is_wrapped() {
        let state = MemoryBuildState::default();
        let engine = BuildEngine::new(Box::new(FailingCompiler));
        let err = engine.execute(&state, &arguments()).unwrap_err();
        assert!(matches!(err, TestBuildError::Engine { .. }));
    }
}
