//! Implementation of the `tbgen generate` command.

use super::load_inputs;
use crate::cli::GenerateArgs;
use crate::error::Result;
use crate::generation;
use crate::pipeline::{Pipeline, RunReport};

/// Execute the `tbgen generate` command.
///
/// Per-unit failures are reported and do not fail the command; see
/// [`RunReport::fatal_error`] for when the run as a whole fails.
pub fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let inputs = load_inputs(&args.run)?;
    let mut generator = generation::from_config(&inputs.config.generator)?;

    let report = Pipeline::new(&inputs.config, &inputs.templates)
        .run(&inputs.plan, generator.as_mut())?;

    print_report(&report);

    match report.fatal_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn print_report(report: &RunReport) {
    println!("Generated {} unit(s) with strategy {}:", report.outcomes.len(), report.strategy);
    println!();
    for outcome in &report.outcomes {
        println!("  {}", outcome.summary());
    }
    if let Some(path) = &report.aggregate_file {
        println!();
        println!("  Aggregate: {}", path.display());
    }
    println!();
    println!(
        "Generation complete. Output saved in {}",
        report.output_root.display()
    );
}
