//! Implementation of the `tbgen split` command.
//!
//! Re-places a completion saved from an earlier run (or pasted from a chat
//! session) without calling the service again.

use crate::cli::SplitArgs;
use crate::config::{PipelineConfig, Placement};
use crate::error::{Result, TbgenError};
use crate::output::OutputPlacer;
use crate::partition::Partitioner;

/// Execute the `tbgen split` command.
pub fn cmd_split(args: SplitArgs) -> Result<()> {
    let config = PipelineConfig::discover(args.config.as_deref())?;
    let delimiter = args.delimiter.unwrap_or(config.delimiter);
    let output_root = args.output.unwrap_or(config.output_root);

    if delimiter.trim().is_empty() {
        return Err(TbgenError::UserError(
            "delimiter must be non-empty".to_string(),
        ));
    }

    let text = std::fs::read_to_string(&args.completion).map_err(|e| {
        TbgenError::UserError(format!(
            "failed to read completion file '{}': {}",
            args.completion.display(),
            e
        ))
    })?;

    let partitioner = Partitioner::new(&delimiter)
        .with_fence_stripping(args.strip_fences || config.strip_code_fences);
    let units = partitioner.split(&text);
    if units.is_empty() {
        return Err(TbgenError::UserError(format!(
            "no files found in '{}': expected lines starting with '{}'",
            args.completion.display(),
            delimiter
        )));
    }

    let mut placer = OutputPlacer::new(&output_root, Placement::Flat, config.aggregate_file_name);
    placer.prepare()?;
    let stem = args
        .completion
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let files = placer.place(&stem, &units)?;

    println!("Split {} into {} file(s):", args.completion.display(), files.len());
    println!();
    for file in &files {
        println!("  {}", file.display());
    }
    println!();
    println!("Output saved in {}", output_root);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use crate::test_support::write_file;
    use std::fs;
    use tempfile::TempDir;

    fn args(completion: std::path::PathBuf, output: &std::path::Path) -> SplitArgs {
        SplitArgs {
            completion,
            config: Some(std::path::PathBuf::from("/nonexistent/tbgen.yaml")),
            output: Some(output.to_string_lossy().to_string()),
            delimiter: None,
            strip_fences: false,
        }
    }

    #[test]
    fn test_split_requires_readable_config_when_given() {
        let temp_dir = TempDir::new().unwrap();
        let completion = write_file(temp_dir.path(), "resp.txt", "// FILE: a.sv\nx");
        let err = cmd_split(args(completion, temp_dir.path())).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn test_split_writes_flat_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_file(temp_dir.path(), "tbgen.yaml", "delimiter: \"// FILE:\"\n");
        let completion = write_file(
            temp_dir.path(),
            "resp.txt",
            "Here you go\n// FILE: and_driver.sv\nclass and_driver;\n// FILE: and_test.sv\n```sv\nclass and_test;\n```\n",
        );
        let out = temp_dir.path().join("out");

        cmd_split(SplitArgs {
            config: Some(config),
            strip_fences: true,
            ..args(completion, &out)
        })
        .unwrap();

        assert_eq!(
            fs::read_to_string(out.join("and_driver.sv")).unwrap(),
            "class and_driver;"
        );
        assert_eq!(fs::read_to_string(out.join("and_test.sv")).unwrap(), "class and_test;");
    }

    #[test]
    fn test_split_without_markers_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_file(temp_dir.path(), "tbgen.yaml", "");
        let completion = write_file(temp_dir.path(), "resp.txt", "module m; endmodule");

        let err = cmd_split(SplitArgs {
            config: Some(config),
            ..args(completion, &temp_dir.path().join("out"))
        })
        .unwrap_err();
        assert!(err.to_string().contains("expected lines starting with '// FILE:'"));
    }

    #[test]
    fn test_split_custom_delimiter() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_file(temp_dir.path(), "tbgen.yaml", "");
        let completion = write_file(temp_dir.path(), "resp.txt", "### tb_pkg.sv\npackage tb_pkg;");
        let out = temp_dir.path().join("out");

        cmd_split(SplitArgs {
            config: Some(config),
            delimiter: Some("###".to_string()),
            ..args(completion, &out)
        })
        .unwrap();

        assert!(out.join("tb_pkg.sv").exists());
    }
}
