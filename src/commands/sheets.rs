//! Implementation of the `tbgen sheets` command.

use crate::cli::SheetsArgs;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::plan::summarize_sheets;

/// Execute the `tbgen sheets` command.
pub fn cmd_sheets(args: SheetsArgs) -> Result<()> {
    let source = match args.source {
        Some(source) => source,
        None => PipelineConfig::discover(args.config.as_deref())?.source_path,
    };

    let summaries = summarize_sheets(&source)?;

    println!("Sheets in {} ({}):", source, summaries.len());
    println!();
    for sheet in &summaries {
        println!("  {}", sheet.name);
        println!("    Rows:     {}", sheet.rows);
        println!("    Columns:  {}", sheet.columns.join(", "));
        println!("    Path:     {}", sheet.path.display());
        println!();
    }
    Ok(())
}
