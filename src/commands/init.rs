//! Implementation of the `tbgen init` command.

use crate::cli::InitArgs;
use crate::config::PipelineConfig;
use crate::error::{Result, TbgenError};
use crate::fs::replace_file;
use std::path::Path;

const CONFIG_HEADER: &str = "\
# tbgen configuration.
#
# Command-line flags (--source, --output, --strategy, ...) override these values.
# strategy:  whole_plan | per_feature | per_artifact_type
# placement: flat | per_feature_folder | aggregate
# generator.backend: gemini | command
#   gemini reads its API key from the variable named by generator.api_key_env.
#   command runs generator.command; {prompt}, {model} and {unit} are substituted,
#   and the prompt is sent on stdin when {prompt} is not used.

";

/// Execute the `tbgen init` command.
pub fn cmd_init(args: InitArgs) -> Result<()> {
    write_default_config(&args.path, args.force)?;

    let config = PipelineConfig::default();
    println!("Wrote {}", args.path.display());
    println!();
    println!("  Source:    {}", config.source_path);
    println!("  Output:    {}", config.output_root);
    println!("  Templates: {}", config.templates_root);
    println!("  Strategy:  {}", config.strategy);
    println!();
    println!("Edit the file, then run `tbgen generate`.");
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(TbgenError::UserError(format!(
            "'{}' already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    let yaml = PipelineConfig::default().to_yaml()?;
    replace_file(path, &format!("{}{}", CONFIG_HEADER, yaml))
}
