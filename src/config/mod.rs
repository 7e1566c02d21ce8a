//! Configuration model for tbgen.
//!
//! This module defines the `PipelineConfig` struct that represents `tbgen.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, command-line overrides, and
//! validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::{ConfigOverrides, PipelineConfig};
pub use operations::DEFAULT_CONFIG_FILE;
pub use types::{Backend, GeneratorConfig, Placement, Strategy};
