//! Testbuild - the test build task for a recipe-driven build host
//!
//! This crate provides the library side of the task: typed configuration
//! values, deduplicating path sets, dependency merging, and the operation
//! graph that builds and runs a test harness.

pub mod builder;
pub mod core;
pub mod util;

/// Test fixtures for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides canned build-state tables and fake
/// compilers.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{TestBuildError, TestBuildTask, TestVariant, VariantKind};
pub use crate::core::{
    BuildArguments, BuildOperation, BuildState, MemoryBuildState, PathSet,
    Value, ValueTable,
};
