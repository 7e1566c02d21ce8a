//! PipelineConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for one tbgen run.
///
/// This struct represents the contents of `tbgen.yaml`. It is built once,
/// adjusted by command-line overrides, validated, and then passed explicitly
/// to the pipeline. Unknown fields in the YAML are ignored for forward
/// compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // =========================================================================
    // Input
    // =========================================================================
    /// CSV/TSV file (one sheet) or directory of them (one sheet per file).
    #[serde(default = "default_source_path")]
    pub source_path: String,

    /// Restrict loading to this sheet. Unset loads and concatenates every sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,

    /// Directory holding style-reference templates.
    #[serde(default = "default_templates_root")]
    pub templates_root: String,

    // =========================================================================
    // Generation
    // =========================================================================
    /// How the plan is cut into generation calls.
    pub strategy: Strategy,

    /// Design prefix for whole-plan and per-artifact filenames (e.g. `and`).
    #[serde(default = "default_design_name")]
    pub design_name: String,

    /// Whole-plan artifact list. Empty means the built-in list for `design_name`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,

    /// Prompt body overrides keyed by strategy name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompt_templates: BTreeMap<String, String>,

    /// Generation backend settings.
    pub generator: GeneratorConfig,

    // =========================================================================
    // Response handling and output
    // =========================================================================
    /// Marker token that precedes each filename in a multi-file completion.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Remove a markdown code fence wrapping an artifact.
    pub strip_code_fences: bool,

    /// Output directory.
    #[serde(default = "default_output_root")]
    pub output_root: String,

    /// Placement policy for generated artifacts.
    pub placement: Placement,

    /// Extension of generated files (no leading dot).
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// File written under the output root by the aggregate policy.
    #[serde(default = "default_aggregate_file_name")]
    pub aggregate_file_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            sheet_name: None,
            templates_root: default_templates_root(),
            strategy: Strategy::default(),
            design_name: default_design_name(),
            artifacts: Vec::new(),
            prompt_templates: BTreeMap::new(),
            generator: GeneratorConfig::default(),
            delimiter: default_delimiter(),
            strip_code_fences: false,
            output_root: default_output_root(),
            placement: Placement::default(),
            file_extension: default_file_extension(),
            aggregate_file_name: default_aggregate_file_name(),
        }
    }
}

/// Command-line values that take precedence over `tbgen.yaml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_path: Option<String>,
    pub sheet_name: Option<String>,
    pub output_root: Option<String>,
    pub templates_root: Option<String>,
    pub strategy: Option<Strategy>,
    pub placement: Option<Placement>,
    pub design_name: Option<String>,
    pub backend: Option<Backend>,
    pub model: Option<String>,
}
