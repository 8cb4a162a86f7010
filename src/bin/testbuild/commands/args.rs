//! `testbuild args` command

use anyhow::{Context, Result};

use crate::cli::ArgsArgs;
use crate::commands::{fail, load_inputs};

pub fn execute(args: ArgsArgs, color: bool) -> Result<()> {
    let (state, task) = load_inputs(&args.inputs)?;

    let arguments = match task.resolve_arguments(&state) {
        Ok(arguments) => arguments,
        Err(e) => fail(&e, &args.inputs.state, color),
    };

    let json = serde_json::to_string_pretty(&arguments)
        .context("failed to serialize build arguments")?;
    println!("{}", json);

    Ok(())
}
