//! Prompt assembly.
//!
//! This module provides:
//!
//! - **Template**: `{variable}` substitution engine for prompt bodies
//! - **Context**: verbatim serialization of feature records and plans
//! - **Builder**: the three generation strategies turned into prompts
//!
//! # Template Syntax
//!
//! Prompt bodies use `{variable}` placeholders:
//!
//! ```text
//! Feature: {feature}
//! Inputs: {inputs}
//! ```
//!
//! Use `{{` to escape and render a literal `{`. Substituted values are never
//! re-scanned, so SystemVerilog braces inside plan fields or templates are safe.

mod builder;
mod context;
mod template;

pub use builder::{Prompt, PromptBuilder, ResponseShape, check_template, template_variables};
pub use context::{describe_plan, describe_record};
pub use template::{TemplateError, render, vars};
