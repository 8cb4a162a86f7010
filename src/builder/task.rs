//! The test build task.
//!
//! Runs after the main build task. Loads the test harness configuration from
//! the active build state, folds in the shared build and test dependency
//! exports, generates the harness build operations, appends a run-tests
//! operation, and registers everything with the host.
//!
//! Registration is the last step: if anything fails earlier, the host sees
//! no operations at all from this invocation.

use crate::builder::assemble;
use crate::builder::compiler::{Compiler, CompilerRegistry};
use crate::builder::engine::BuildEngine;
use crate::builder::errors::TestBuildError;
use crate::builder::loader::{self, TableReader};
use crate::builder::merge;
use crate::builder::variant::TestVariant;
use crate::core::arguments::BuildArguments;
use crate::core::state::{BuildState, TraceLevel};

/// Test artifacts go under this subdirectory of the main build's output.
pub const TEST_OUTPUT_SUBDIRECTORY: &str = "Test/";

/// The test build task.
#[derive(Debug)]
pub struct TestBuildTask {
    variant: TestVariant,
    compilers: CompilerRegistry,
}

impl TestBuildTask {
    /// Tasks this task must run before.
    pub const RUN_BEFORE: &'static [&'static str] = &[];

    /// Tasks this task must run after.
    pub const RUN_AFTER: &'static [&'static str] = &["BuildTask"];

    pub fn new(variant: TestVariant, compilers: CompilerRegistry) -> Self {
        TestBuildTask { variant, compilers }
    }

    /// Create a task with the variant's default compilers.
    pub fn with_default_compilers(variant: TestVariant) -> Self {
        let compilers = variant.default_compilers();
        TestBuildTask::new(variant, compilers)
    }

    pub fn variant(&self) -> &TestVariant {
        &self.variant
    }

    pub fn compilers(&self) -> &CompilerRegistry {
        &self.compilers
    }

    /// Run the task against `state`.
    pub fn execute(&self, state: &mut dyn BuildState) -> Result<(), TestBuildError> {
        let arguments = self.resolve_arguments(&*state)?;

        let compiler = self.create_compiler(&*state)?;
        let engine = BuildEngine::new(compiler);
        let result = engine.execute(&*state, &arguments)?;

        let operations = assemble::assemble(result, &arguments, &self.variant);
        assemble::register(state, operations);

        Ok(())
    }

    /// Load and merge the build arguments for the test harness.
    ///
    /// The returned arguments already point their object and binary
    /// directories at the test output subdirectory.
    pub fn resolve_arguments(&self, state: &dyn BuildState) -> Result<BuildArguments, TestBuildError> {
        let active = TableReader::new("ActiveState", state.active_state());
        let recipe = active.required_table("Recipe")?;

        if !recipe.contains_key("Tests") {
            return Err(TestBuildError::NoTestsSpecified);
        }

        let build = active.required_table("Build")?;
        let parameters = TableReader::new("Parameters", active.required_table("Parameters")?);

        let mut arguments = BuildArguments {
            target_architecture: parameters.required_str("Architecture")?.to_string(),
            ..Default::default()
        };

        // Common build properties from the main build
        loader::load_build_properties(TableReader::new("Build", build), &self.variant, &mut arguments)?;

        let tests = TableReader::new("Recipe", recipe).required_table("Tests")?;
        loader::load_test_properties(TableReader::new("Tests", tests), &mut arguments)?;

        // The shared build is consumed as if this were a dependency build
        merge::merge_shared_build(state.shared_state(), &mut arguments)?;
        merge::merge_test_dependencies(state, &mut arguments)?;

        arguments.redirect_output(TEST_OUTPUT_SUBDIRECTORY);

        tracing::debug!(
            "resolved test arguments: {} source(s), {} runtime dependencies, {} link dependencies",
            arguments.source_files.len(),
            arguments.runtime_dependencies.len(),
            arguments.link_dependencies.len()
        );

        Ok(arguments)
    }

    fn create_compiler(&self, state: &dyn BuildState) -> Result<Box<dyn Compiler>, TestBuildError> {
        let active = TableReader::new("ActiveState", state.active_state());
        let parameters = TableReader::new("Parameters", active.required_table("Parameters")?);
        let name = parameters.required_str("Compiler")?;

        match self.compilers.create(name, state.active_state()) {
            Some(compiler) => compiler.map_err(|source| TestBuildError::Engine { source }),
            None => {
                state.log_trace(TraceLevel::Error, &format!("Unknown compiler: {}", name));
                Err(TestBuildError::UnknownCompiler {
                    name: name.to_string(),
                    known: self.compilers.names(),
                })
            }
        }
    }
}
