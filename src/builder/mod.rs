//! Test harness build task.
//!
//! This module loads the test configuration from the host build state,
//! merges dependency exports, and assembles the operation graph that builds
//! and runs the test harness.

pub mod assemble;
pub mod compiler;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod merge;
pub mod task;
pub mod variant;

pub use compiler::{Compiler, CompilerRegistry, MsvcCompiler, RoslynCompiler};
pub use engine::BuildEngine;
pub use errors::TestBuildError;
pub use loader::TableReader;
pub use task::TestBuildTask;
pub use variant::{Launch, TestVariant, VariantKind};
