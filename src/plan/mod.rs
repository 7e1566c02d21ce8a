//! Verification plan ingestion.
//!
//! A plan is read from a tabular source made of one or more named sheets
//! and flattened into an ordered sequence of [`FeatureRecord`]s:
//!
//! - **Record**: typed accessors over one row, with empty-string defaults
//! - **Loader**: CSV/TSV sheets, either a single file or a directory of them

mod loader;
mod record;


pub use loader::{SheetSummary, load_plan, summarize_sheets};
pub use record::{FeatureRecord, Plan, columns, normalize_name};
