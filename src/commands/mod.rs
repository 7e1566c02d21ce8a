//! Command implementations for tbgen.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod generate;
mod init;
mod prompt;
mod sheets;
mod split;

use crate::cli::{Command, RunOptions};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::plan::{Plan, load_plan};
use crate::templates::{TemplateSet, TemplateStore};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate::cmd_generate(args),
        Command::Prompt(args) => prompt::cmd_prompt(args),
        Command::Sheets(args) => sheets::cmd_sheets(args),
        Command::Split(args) => split::cmd_split(args),
        Command::Init(args) => init::cmd_init(args),
    }
}

/// Config file plus command-line overrides.
fn resolve_config(options: &RunOptions) -> Result<PipelineConfig> {
    PipelineConfig::discover_with(options.config.as_deref(), options.overrides())
}

/// Everything a run reads before the first generation call.
struct RunInputs {
    config: PipelineConfig,
    plan: Plan,
    templates: TemplateSet,
}

fn load_inputs(options: &RunOptions) -> Result<RunInputs> {
    let config = resolve_config(options)?;
    let plan = load_plan(&config.source_path, config.sheet_name.as_deref())?;
    let mut store = TemplateStore::new(&config.templates_root);
    let templates = TemplateSet::load(&mut store);
    Ok(RunInputs {
        config,
        plan,
        templates,
    })
}
