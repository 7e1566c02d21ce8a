//! Config loading, validation, and utility operations.

use super::model::{ConfigOverrides, PipelineConfig};
use super::types::{Backend, Strategy, default_artifacts};
use crate::error::{Result, TbgenError};
use crate::prompt::check_template;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tbgen.yaml";

impl PipelineConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for a command invocation.
    ///
    /// An explicit path must exist. Without one, `tbgen.yaml` in the current
    /// directory is used when present, and defaults otherwise.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let config = Self::locate(explicit)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`discover`](Self::discover), but validates only after the
    /// overrides are applied, so a flag can repair a value the file gets wrong.
    pub fn discover_with(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        Self::locate(explicit)?.with_overrides(overrides)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn locate(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::read(&path)
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TbgenError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content)
    }

    /// Deserialize without validating.
    fn parse(yaml: &str) -> Result<Self> {
        if yaml.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Self::default());
        }

        serde_yaml::from_str(yaml)
            .map_err(|e| TbgenError::UserError(format!("failed to parse config YAML: {}", e)))
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            TbgenError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Apply command-line overrides, then re-validate.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(v) = overrides.source_path {
            self.source_path = v;
        }
        if let Some(v) = overrides.sheet_name {
            self.sheet_name = Some(v);
        }
        if let Some(v) = overrides.output_root {
            self.output_root = v;
        }
        if let Some(v) = overrides.templates_root {
            self.templates_root = v;
        }
        if let Some(v) = overrides.strategy {
            self.strategy = v;
        }
        if let Some(v) = overrides.placement {
            self.placement = v;
        }
        if let Some(v) = overrides.design_name {
            self.design_name = v;
        }
        if let Some(v) = overrides.backend {
            self.generator.backend = v;
        }
        if let Some(v) = overrides.model {
            self.generator.model = v;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `delimiter`, `design_name`, `aggregate_file_name` must be non-empty
    /// - `file_extension` must be non-empty and have no leading dot
    /// - `artifacts` entries must be non-empty
    /// - `prompt_templates` keys must name a strategy and render with its variables
    /// - generator settings must be usable by the selected backend
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.trim().is_empty() {
            return Err(TbgenError::UserError(
                "config validation failed: delimiter must be non-empty".to_string(),
            ));
        }

        if self.design_name.trim().is_empty() {
            return Err(TbgenError::UserError(
                "config validation failed: design_name must be non-empty".to_string(),
            ));
        }

        if self.aggregate_file_name.trim().is_empty() {
            return Err(TbgenError::UserError(
                "config validation failed: aggregate_file_name must be non-empty".to_string(),
            ));
        }

        if self.file_extension.is_empty() {
            return Err(TbgenError::UserError(
                "config validation failed: file_extension must be non-empty".to_string(),
            ));
        }
        if self.file_extension.starts_with('.') {
            return Err(TbgenError::UserError(format!(
                "config validation failed: file_extension must not have a leading dot (found '{}'). Use '{}' instead.",
                self.file_extension,
                self.file_extension.trim_start_matches('.')
            )));
        }

        if self.artifacts.iter().any(|a| a.trim().is_empty()) {
            return Err(TbgenError::UserError(
                "config validation failed: artifacts entries must be non-empty".to_string(),
            ));
        }

        for (name, body) in &self.prompt_templates {
            let strategy = Strategy::from_str(name).ok_or_else(|| {
                TbgenError::UserError(format!(
                    "config validation failed: prompt_templates key '{}' is not a strategy (expected whole_plan, per_feature or per_artifact_type)",
                    name
                ))
            })?;
            check_template(strategy, body).map_err(|e| {
                TbgenError::UserError(format!(
                    "config validation failed: prompt_templates.{}: {}",
                    name, e
                ))
            })?;
        }

        self.validate_generator()
    }

    fn validate_generator(&self) -> Result<()> {
        let generator = &self.generator;

        if generator.timeout_seconds == Some(0) {
            return Err(TbgenError::UserError(
                "config validation failed: generator.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        match generator.backend {
            Backend::Gemini => {
                if generator.model.trim().is_empty() {
                    return Err(TbgenError::UserError(
                        "config validation failed: generator.model must be non-empty".to_string(),
                    ));
                }
                if generator.endpoint.trim().is_empty() {
                    return Err(TbgenError::UserError(
                        "config validation failed: generator.endpoint must be non-empty"
                            .to_string(),
                    ));
                }
                if generator.api_key_env.trim().is_empty() {
                    return Err(TbgenError::UserError(
                        "config validation failed: generator.api_key_env must be non-empty"
                            .to_string(),
                    ));
                }
            }
            Backend::Command => {
                if generator.command.trim().is_empty() {
                    return Err(TbgenError::UserError(
                        "config validation failed: generator.command is required for the command backend"
                            .to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// The whole-plan artifact list in effect.
    pub fn effective_artifacts(&self) -> Vec<String> {
        if self.artifacts.is_empty() {
            default_artifacts(&self.design_name, &self.file_extension)
        } else {
            self.artifacts.clone()
        }
    }

    /// The prompt body override for a strategy, if configured.
    pub fn prompt_template(&self, strategy: Strategy) -> Option<&str> {
        self.prompt_templates
            .get(strategy.as_str())
            .map(String::as_str)
    }
}
