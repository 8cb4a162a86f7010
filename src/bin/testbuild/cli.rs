//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Testbuild - build and run a recipe's test harness
#[derive(Parser)]
#[command(name = "testbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the test build task and print the registered operations
    Plan(PlanArgs),

    /// Print the resolved build arguments for the test harness
    Args(ArgsArgs),
}

/// Inputs shared by every command.
#[derive(Args)]
pub struct StateArgs {
    /// Active build state (TOML with Recipe, Build, Parameters and Dependencies tables)
    #[arg(long, value_name = "FILE")]
    pub state: PathBuf,

    /// Shared build state exported by the parent build (TOML)
    #[arg(long, value_name = "FILE")]
    pub shared: Option<PathBuf>,

    /// Test variant (native, managed); defaults to the configured variant
    #[arg(long, env = "TESTBUILD_VARIANT")]
    pub variant: Option<String>,

    /// Runtime launcher for managed harnesses
    #[arg(long, value_name = "PATH", env = "TESTBUILD_LAUNCHER")]
    pub launcher: Option<PathBuf>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub inputs: StateArgs,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args)]
pub struct ArgsArgs {
    #[command(flatten)]
    pub inputs: StateArgs,
}
