//! CLI argument parsing for tbgen.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::{Backend, ConfigOverrides, Placement, Strategy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tbgen: generate UVM testbench code from a verification plan.
///
/// Each row of the plan describes a feature to verify. tbgen turns the plan
/// into prompts, sends them to a code-generation service, and writes the
/// returned SystemVerilog files under an output directory.
#[derive(Parser, Debug)]
#[command(name = "tbgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for tbgen.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate testbench files from the verification plan.
    ///
    /// Prints one line per unit of work and the output directory.
    Generate(GenerateArgs),

    /// Print the prompts a run would send, without calling the service.
    Prompt(PromptArgs),

    /// List the sheets of a verification plan source.
    Sheets(SheetsArgs),

    /// Split a saved delimited completion into files.
    ///
    /// Files are written flat under the output directory.
    Split(SplitArgs),

    /// Write a default tbgen.yaml in the current directory.
    Init(InitArgs),
}

/// Config file and overrides shared by `generate` and `prompt`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Config file (default: ./tbgen.yaml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verification plan: a .csv/.tsv file or a directory of them.
    #[arg(long)]
    pub source: Option<String>,

    /// Only load this sheet.
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output directory.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory holding reference templates.
    #[arg(long)]
    pub templates: Option<String>,

    /// Generation strategy (whole_plan, per_feature, per_artifact_type).
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<Strategy>,

    /// Placement policy (flat, per_feature_folder, aggregate).
    #[arg(long, value_parser = parse_placement)]
    pub placement: Option<Placement>,

    /// Design name used in whole-plan and per-artifact filenames.
    #[arg(long)]
    pub design: Option<String>,

    /// Generation backend (gemini, command).
    #[arg(long, value_parser = parse_backend)]
    pub backend: Option<Backend>,

    /// Model identifier.
    #[arg(long)]
    pub model: Option<String>,
}

impl RunOptions {
    /// Command-line values that take precedence over the config file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source_path: self.source.clone(),
            sheet_name: self.sheet.clone(),
            output_root: self.output.clone(),
            templates_root: self.templates.clone(),
            strategy: self.strategy,
            placement: self.placement,
            design_name: self.design.clone(),
            backend: self.backend,
            model: self.model.clone(),
        }
    }
}

/// Arguments for the `generate` command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub run: RunOptions,
}

/// Arguments for the `prompt` command.
#[derive(Parser, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub run: RunOptions,

    /// Only print the prompt for this unit (feature name or artifact kind).
    #[arg(long)]
    pub unit: Option<String>,
}

/// Arguments for the `sheets` command.
#[derive(Parser, Debug)]
pub struct SheetsArgs {
    /// Config file (default: ./tbgen.yaml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verification plan: a .csv/.tsv file or a directory of them.
    #[arg(long)]
    pub source: Option<String>,
}

/// Arguments for the `split` command.
#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// File holding a saved completion.
    pub completion: PathBuf,

    /// Config file (default: ./tbgen.yaml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Marker token preceding each filename.
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Remove markdown code fences around each file.
    #[arg(long)]
    pub strip_fences: bool,
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,

    /// Where to write the config.
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    Strategy::from_str(s).ok_or_else(|| {
        format!(
            "invalid strategy '{}': expected whole_plan, per_feature or per_artifact_type",
            s
        )
    })
}

fn parse_placement(s: &str) -> Result<Placement, String> {
    Placement::from_str(s).ok_or_else(|| {
        format!(
            "invalid placement '{}': expected flat, per_feature_folder or aggregate",
            s
        )
    })
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    Backend::from_str(s)
        .ok_or_else(|| format!("invalid backend '{}': expected gemini or command", s))
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_minimal() {
        let cli = Cli::try_parse_from(["tbgen", "generate"]).unwrap();
        assert!(!cli.verbose);
        if let Command::Generate(args) = cli.command {
            assert!(args.run.config.is_none());
            assert!(args.run.strategy.is_none());
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn parse_generate_overrides() {
        let cli = Cli::try_parse_from([
            "tbgen",
            "generate",
            "--source",
            "plan.csv",
            "--sheet",
            "Verification Plan",
            "-o",
            "out",
            "--strategy",
            "whole_plan",
            "--placement",
            "flat",
            "--design",
            "and",
            "--backend",
            "command",
            "--model",
            "gemini-1.5-pro",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Command::Generate(args) = cli.command else {
            panic!("Expected Generate command");
        };
        let overrides = args.run.overrides();
        assert_eq!(overrides.source_path.as_deref(), Some("plan.csv"));
        assert_eq!(overrides.sheet_name.as_deref(), Some("Verification Plan"));
        assert_eq!(overrides.output_root.as_deref(), Some("out"));
        assert_eq!(overrides.strategy, Some(Strategy::WholePlan));
        assert_eq!(overrides.placement, Some(Placement::Flat));
        assert_eq!(overrides.design_name.as_deref(), Some("and"));
        assert_eq!(overrides.backend, Some(Backend::Command));
        assert_eq!(overrides.model.as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn parse_invalid_strategy() {
        let err = Cli::try_parse_from(["tbgen", "generate", "--strategy", "per_row"]).unwrap_err();
        assert!(err.to_string().contains("invalid strategy 'per_row'"));
    }

    #[test]
    fn parse_prompt_with_unit() {
        let cli =
            Cli::try_parse_from(["tbgen", "prompt", "--unit", "Parity Check"]).unwrap();
        if let Command::Prompt(args) = cli.command {
            assert_eq!(args.unit.as_deref(), Some("Parity Check"));
        } else {
            panic!("Expected Prompt command");
        }
    }

    #[test]
    fn parse_split() {
        let cli = Cli::try_parse_from([
            "tbgen",
            "split",
            "response.txt",
            "--delimiter",
            "###",
            "--strip-fences",
        ])
        .unwrap();
        if let Command::Split(args) = cli.command {
            assert_eq!(args.completion, PathBuf::from("response.txt"));
            assert_eq!(args.delimiter.as_deref(), Some("###"));
            assert!(args.strip_fences);
            assert!(args.output.is_none());
        } else {
            panic!("Expected Split command");
        }
    }

    #[test]
    fn parse_init_defaults() {
        let cli = Cli::try_parse_from(["tbgen", "init"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert!(!args.force);
            assert_eq!(args.path, PathBuf::from("tbgen.yaml"));
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn parse_sheets_source() {
        let cli = Cli::try_parse_from(["tbgen", "sheets", "--source", "plans/"]).unwrap();
        if let Command::Sheets(args) = cli.command {
            assert_eq!(args.source.as_deref(), Some("plans/"));
        } else {
            panic!("Expected Sheets command");
        }
    }
}
