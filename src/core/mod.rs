//! Core data types: configuration values, path sets, build arguments,
//! operations, and the host build-state interface.

pub mod arguments;
pub mod operation;
pub mod path_set;
pub mod state;
pub mod value;

pub use arguments::{BuildArguments, BuildTargetType, LanguageStandard, OptimizationLevel};
pub use operation::{BuildOperation, BuildResult};
pub use path_set::PathSet;
pub use state::{BuildState, MemoryBuildState, TraceLevel};
pub use value::{Value, ValueError, ValueKind, ValueTable};
