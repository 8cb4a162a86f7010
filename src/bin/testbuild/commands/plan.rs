//! `testbuild plan` command

use anyhow::{bail, Context, Result};

use crate::cli::PlanArgs;
use crate::commands::{fail, load_inputs};
use testbuild::core::BuildOperation;

pub fn execute(args: PlanArgs, color: bool) -> Result<()> {
    let (mut state, task) = load_inputs(&args.inputs)?;

    if let Err(e) = task.execute(&mut state) {
        fail(&e, &args.inputs.state, color);
    }

    let operations = state.into_operations();
    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&operations)
                .context("failed to serialize operations")?;
            println!("{}", json);
        }
        "text" => print_operations(&operations),
        other => bail!("invalid output format: {} (expected text or json)", other),
    }

    Ok(())
}

fn print_operations(operations: &[BuildOperation]) {
    println!("Registered {} operation(s):", operations.len());
    println!();

    for (index, operation) in operations.iter().enumerate() {
        println!("  {}. {}", index + 1, operation.title);
        println!("     cwd: {}", operation.working_directory.display());
        if operation.arguments.is_empty() {
            println!("     run: {}", operation.program.display());
        } else {
            println!("     run: {} {}", operation.program.display(), operation.arguments);
        }
        for input in &operation.input_files {
            println!("     in:  {}", input.display());
        }
        for output in &operation.output_files {
            println!("     out: {}", output.display());
        }
        println!();
    }
}
