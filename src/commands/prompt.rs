//! Implementation of the `tbgen prompt` command.

use super::load_inputs;
use crate::cli::PromptArgs;
use crate::error::{Result, TbgenError};
use crate::pipeline::Pipeline;
use crate::plan::normalize_name;
use crate::prompt::{Prompt, ResponseShape};

/// Execute the `tbgen prompt` command (dry run).
pub fn cmd_prompt(args: PromptArgs) -> Result<()> {
    let inputs = load_inputs(&args.run)?;
    let prompts = Pipeline::new(&inputs.config, &inputs.templates).prompts(&inputs.plan)?;
    let selected = select(&prompts, args.unit.as_deref())?;

    for (i, prompt) in selected.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", header(prompt));
        println!("{}", prompt.text);
    }
    Ok(())
}

/// Prompts for one unit, matched by normalized name, or all of them.
fn select<'a>(prompts: &'a [Prompt], unit: Option<&str>) -> Result<Vec<&'a Prompt>> {
    let Some(unit) = unit else {
        return Ok(prompts.iter().collect());
    };

    let wanted = normalize_name(unit);
    let matched: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| normalize_name(&p.unit) == wanted)
        .collect();

    if matched.is_empty() {
        return Err(TbgenError::UserError(format!(
            "no unit named '{}'. Available units: {}",
            unit,
            prompts
                .iter()
                .map(|p| p.unit.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(matched)
}

fn header(prompt: &Prompt) -> String {
    let target = match &prompt.shape {
        ResponseShape::Delimited => "delimited files".to_string(),
        ResponseShape::Single { filename } => filename.clone(),
    };
    format!("===== {} [{}] -> {} =====", prompt.unit, prompt.strategy, target)
}
