//! Configuration types and defaults for tbgen.
//!
//! This module defines enums, constants, and default value functions
//! used by the `PipelineConfig` struct.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How the plan is cut into units of work, one generation call per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One call for the entire plan, answered with delimited files.
    WholePlan,
    /// One call per feature row, answered with a single test file (default).
    #[default]
    PerFeature,
    /// One call per artifact kind (sequence item, sequence, test) covering the whole plan.
    PerArtifactType,
}

impl Strategy {
    /// Parse a strategy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "whole_plan" => Some(Self::WholePlan),
            "per_feature" => Some(Self::PerFeature),
            "per_artifact_type" => Some(Self::PerArtifactType),
            _ => None,
        }
    }

    /// Name used in configuration and prompt template overrides.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WholePlan => "whole_plan",
            Self::PerFeature => "per_feature",
            Self::PerArtifactType => "per_artifact_type",
        }
    }

    /// All strategies, in declaration order.
    pub fn all() -> [Strategy; 3] {
        [Self::WholePlan, Self::PerFeature, Self::PerArtifactType]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule mapping generated artifacts to paths under the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// `<root>/<filename>`.
    Flat,
    /// `<root>/<normalized unit>/<filename>` (default).
    #[default]
    PerFeatureFolder,
    /// Every artifact of the run concatenated into one file, written at the end.
    Aggregate,
}

impl Placement {
    /// Parse a placement policy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "flat" => Some(Self::Flat),
            "per_feature_folder" => Some(Self::PerFeatureFolder),
            "aggregate" => Some(Self::Aggregate),
            _ => None,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flat => "flat",
            Self::PerFeatureFolder => "per_feature_folder",
            Self::Aggregate => "aggregate",
        })
    }
}

/// Which generation service implementation to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Gemini `generateContent` over HTTPS (default).
    #[default]
    Gemini,
    /// Any CLI that prints a completion for a prompt.
    Command,
}

impl Backend {
    /// Parse a backend from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gemini" => Some(Self::Gemini),
            "command" => Some(Self::Command),
            _ => None,
        }
    }
}

/// Settings for the generation backend (`generator:` in `tbgen.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Backend implementation.
    pub backend: Backend,

    /// Model identifier passed to the service.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Gemini API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Command template for the `command` backend.
    ///
    /// Placeholders: `{prompt}`, `{model}`, `{unit}`. Without `{prompt}` the
    /// prompt is written to stdin.
    pub command: String,

    /// Optional per-call limit. Unset means the call may block indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Extra environment variables for the `command` backend.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            command: String::new(),
            timeout_seconds: None,
            environment: BTreeMap::new(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_source_path() -> String {
    "verification_plan.csv".to_string()
}
pub(crate) fn default_output_root() -> String {
    "uvm_tests".to_string()
}
pub(crate) fn default_templates_root() -> String {
    "Templates".to_string()
}
pub(crate) fn default_design_name() -> String {
    "dut".to_string()
}
pub(crate) fn default_file_extension() -> String {
    "sv".to_string()
}
pub(crate) fn default_aggregate_file_name() -> String {
    "all_features_testcases.sv".to_string()
}
pub(crate) fn default_delimiter() -> String {
    "// FILE:".to_string()
}
pub(crate) fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
pub(crate) fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
pub(crate) fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Whole-plan artifact stems, before the design prefix and extension are applied.
///
/// Stems starting with `_` receive the design name as a prefix.
pub const WHOLE_PLAN_ARTIFACT_STEMS: [&str; 14] = [
    "_sequence_item",
    "_sequence",
    "_sequencer",
    "_driver",
    "_monitor",
    "_agent",
    "_env",
    "_scoreboard",
    "_coverage",
    "_test",
    "interface",
    "design",
    "tb_pkg",
    "testbench",
];

/// Default whole-plan artifact list for a design, e.g. `and_driver.sv`.
pub fn default_artifacts(design_name: &str, extension: &str) -> Vec<String> {
    WHOLE_PLAN_ARTIFACT_STEMS
        .iter()
        .map(|stem| {
            if stem.starts_with('_') {
                format!("{}{}.{}", design_name, stem, extension)
            } else {
                format!("{}.{}", stem, extension)
            }
        })
        .collect()
}
