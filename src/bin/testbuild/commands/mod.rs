//! Command implementations

pub mod args;
pub mod plan;

use std::env;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::StateArgs;
use testbuild::builder::{TestBuildError, TestBuildTask, TestVariant, VariantKind};
use testbuild::core::{MemoryBuildState, ValueTable};
use testbuild::util::config::{self, Config};
use testbuild::util::diagnostic;

/// Load the build state tables and construct the task they describe.
pub fn load_inputs(args: &StateArgs) -> Result<(MemoryBuildState, TestBuildTask)> {
    let active = read_table(&args.state)?;
    let shared = match &args.shared {
        Some(path) => read_table(path)?,
        None => ValueTable::new(),
    };

    let config = load_config()?;
    let kind = match &args.variant {
        Some(variant) => variant
            .parse::<VariantKind>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid variant: {}", variant))?,
        None => config.variant(),
    };

    let launcher = match kind {
        VariantKind::Native => None,
        VariantKind::Managed => Some(config::resolve_launcher(args.launcher.clone(), &config)),
    };
    let variant = TestVariant::for_kind(kind, launcher.as_deref());
    tracing::debug!("using {} test variant", variant.kind);

    Ok((
        MemoryBuildState::new(active, shared),
        TestBuildTask::with_default_compilers(variant),
    ))
}

/// Print a task failure and exit.
pub fn fail(error: &TestBuildError, state_path: &Path, color: bool) -> ! {
    let diagnostic = error.to_diagnostic().with_location(state_path);
    diagnostic::emit(&diagnostic, color);
    std::process::exit(1);
}

fn read_table(path: &Path) -> Result<ValueTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read build state: {}", path.display()))?;
    ValueTable::from_toml_str(&contents)
        .with_context(|| format!("failed to parse build state: {}", path.display()))
}

fn load_config() -> Result<Config> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let project = config::project_config_path(&cwd);
    let config = match config::global_config_path() {
        Some(global) => config::load_config(&global, &project),
        None => Config::load_or_default(&project),
    };
    Ok(config)
}
