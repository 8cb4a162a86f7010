//! Host build state.
//!
//! The task never talks to the host directly; everything goes through the
//! [`BuildState`] trait. [`MemoryBuildState`] is an in-process host used by
//! the command-line front end and by tests.

use std::fmt;
use std::sync::Mutex;

use crate::core::operation::BuildOperation;
use crate::core::value::ValueTable;

/// Severity of a trace message sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    Error,
    Warning,
    Information,
    Debug,
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceLevel::Error => write!(f, "error"),
            TraceLevel::Warning => write!(f, "warning"),
            TraceLevel::Information => write!(f, "info"),
            TraceLevel::Debug => write!(f, "debug"),
        }
    }
}

/// The host side of a task invocation.
pub trait BuildState {
    /// The active build: `Recipe`, `Build`, `Parameters` and `Dependencies`.
    fn active_state(&self) -> &ValueTable;

    /// The shared build state exported by the parent build.
    fn shared_state(&self) -> &ValueTable;

    /// Fire-and-forget trace message.
    fn log_trace(&self, level: TraceLevel, message: &str);

    /// Register an operation with the host engine.
    fn create_operation(&mut self, operation: BuildOperation);
}

/// In-memory host state.
///
/// Repeated registration of an identical operation is ignored, so running
/// the same task twice against one state yields the same operation list.
#[derive(Debug, Default)]
pub struct MemoryBuildState {
    active: ValueTable,
    shared: ValueTable,
    operations: Vec<BuildOperation>,
    traces: Mutex<Vec<(TraceLevel, String)>>,
}

impl MemoryBuildState {
    pub fn new(active: ValueTable, shared: ValueTable) -> Self {
        MemoryBuildState {
            active,
            shared,
            operations: Vec::new(),
            traces: Mutex::new(Vec::new()),
        }
    }

    /// Operations in registration order.
    pub fn operations(&self) -> &[BuildOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<BuildOperation> {
        self.operations
    }

    /// Snapshot of every trace logged so far.
    pub fn traces(&self) -> Vec<(TraceLevel, String)> {
        self.traces
            .lock()
            .map(|traces| traces.clone())
            .unwrap_or_default()
    }
}

impl BuildState for MemoryBuildState {
    fn active_state(&self) -> &ValueTable {
        &self.active
    }

    fn shared_state(&self) -> &ValueTable {
        &self.shared
    }

    fn log_trace(&self, level: TraceLevel, message: &str) {
        match level {
            TraceLevel::Error => tracing::error!("{}", message),
            TraceLevel::Warning => tracing::warn!("{}", message),
            TraceLevel::Information => tracing::info!("{}", message),
            TraceLevel::Debug => tracing::debug!("{}", message),
        }

        if let Ok(mut traces) = self.traces.lock() {
            traces.push((level, message.to_string()));
        }
    }

    fn create_operation(&mut self, operation: BuildOperation) {
        if self.operations.contains(&operation) {
            tracing::debug!("operation already registered: {}", operation.title);
            return;
        }
        self.operations.push(operation);
    }
}
