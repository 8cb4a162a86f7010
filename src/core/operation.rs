//! Build operations and build results.
//!
//! A [`BuildOperation`] is the unit the host's incremental engine schedules.
//! Operations declare files, not edges: the engine derives ordering and
//! staleness purely from `input_files` and `output_files`, so both sets must
//! be complete.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::path_set::PathSet;

/// A declared unit of work with explicit input and output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOperation {
    pub title: String,
    pub working_directory: PathBuf,
    pub program: PathBuf,
    pub arguments: String,
    pub input_files: PathSet,
    pub output_files: PathSet,
}

impl BuildOperation {
    pub fn new(
        title: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        program: impl Into<PathBuf>,
        arguments: impl Into<String>,
        input_files: PathSet,
        output_files: PathSet,
    ) -> Self {
        BuildOperation {
            title: title.into(),
            working_directory: working_directory.into(),
            program: program.into(),
            arguments: arguments.into(),
            input_files,
            output_files,
        }
    }

    /// Whether this operation declares `path` as an input.
    pub fn reads(&self, path: impl AsRef<Path>) -> bool {
        self.input_files.contains(path)
    }

    /// Whether this operation declares `path` as an output.
    pub fn writes(&self, path: impl AsRef<Path>) -> bool {
        self.output_files.contains(path)
    }
}

impl fmt::Display for BuildOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.program.display())?;
        if !self.arguments.is_empty() {
            write!(f, " {}", self.arguments)?;
        }
        Ok(())
    }
}

/// Output of the build engine for one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    /// The produced artifact
    pub target_file: PathBuf,

    /// Files that must sit next to the artifact at run time
    pub runtime_dependencies: PathSet,

    /// Operations producing the artifact, in execution order
    pub build_operations: Vec<BuildOperation>,
}
