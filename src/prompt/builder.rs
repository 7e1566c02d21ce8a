//! Prompt construction for each strategy.

use super::context::{describe_plan, feature_vars};
use super::template::{TemplateError, render, vars};
use crate::config::{PipelineConfig, Strategy};
use crate::plan::{Plan, normalize_name};
use crate::templates::{TemplateRole, TemplateSet};
use std::collections::HashMap;

const WHOLE_PLAN_PROMPT: &str = "\
You are a UVM SystemVerilog expert.
Generate a complete UVM testbench for the design '{design_name}' that covers every feature of the verification plan below.

Verification plan:
{plan}

Generate these files: {artifacts}.
Emit every file in full, starting each file with a line of the form: {delimiter} <filename>
Do NOT add explanations outside the files.";

const PER_FEATURE_PROMPT: &str = "\
You are a UVM SystemVerilog expert.
{reference}Generate a self-contained UVM testcase for the following feature.

Feature: {feature}
Inputs: {inputs}
Steps: {steps}
Expected Outputs: {outputs}
{details}
Requirements:
{requirements}";

const PER_ARTIFACT_TYPE_PROMPT: &str = "\
You are a UVM SystemVerilog expert.
Generate ONLY the UVM {artifact_kind} for the design '{design_name}', covering every feature of the verification plan below.
{template}
Verification plan:
{plan}

Output valid SystemVerilog code only, without explanations.";

/// What the caller should expect back for a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// Several files, each introduced by a delimiter line.
    Delimited,
    /// One artifact; the filename is chosen by the caller.
    Single { filename: String },
}

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub strategy: Strategy,
    /// Unit identity used for logs, folders and the aggregate separator.
    pub unit: String,
    pub shape: ResponseShape,
    pub text: String,
}

/// Variables a strategy's prompt body may reference.
pub fn template_variables(strategy: Strategy) -> &'static [&'static str] {
    match strategy {
        Strategy::WholePlan => &["design_name", "plan", "artifacts", "delimiter"],
        Strategy::PerFeature => &[
            "reference",
            "feature",
            "inputs",
            "steps",
            "outputs",
            "details",
            "requirements",
        ],
        Strategy::PerArtifactType => &["design_name", "artifact_kind", "template", "plan"],
    }
}

/// Check that a prompt body renders with the strategy's variable set.
pub fn check_template(strategy: Strategy, text: &str) -> Result<(), TemplateError> {
    let empty: HashMap<String, String> = template_variables(strategy)
        .iter()
        .map(|name| (name.to_string(), String::new()))
        .collect();
    render(text, &empty).map(|_| ())
}

fn default_body(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::WholePlan => WHOLE_PLAN_PROMPT,
        Strategy::PerFeature => PER_FEATURE_PROMPT,
        Strategy::PerArtifactType => PER_ARTIFACT_TYPE_PROMPT,
    }
}

/// Builds the prompts of a run. Pure: never touches the service or the disk.
pub struct PromptBuilder<'a> {
    config: &'a PipelineConfig,
    templates: &'a TemplateSet,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(config: &'a PipelineConfig, templates: &'a TemplateSet) -> Self {
        Self { config, templates }
    }

    /// Build every prompt for `strategy`, in unit order.
    ///
    /// An empty plan yields no prompts.
    pub fn build(&self, plan: &Plan, strategy: Strategy) -> Result<Vec<Prompt>, TemplateError> {
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        match strategy {
            Strategy::WholePlan => self.whole_plan(plan).map(|p| vec![p]),
            Strategy::PerFeature => self.per_feature(plan),
            Strategy::PerArtifactType => self.per_artifact_type(plan),
        }
    }

    fn body(&self, strategy: Strategy) -> &str {
        self.config
            .prompt_template(strategy)
            .unwrap_or_else(|| default_body(strategy))
    }

    fn whole_plan(&self, plan: &Plan) -> Result<Prompt, TemplateError> {
        let variables = vars([
            ("design_name", self.config.design_name.clone()),
            ("plan", describe_plan(plan)),
            ("artifacts", self.config.effective_artifacts().join(", ")),
            ("delimiter", self.config.delimiter.clone()),
        ]);

        Ok(Prompt {
            strategy: Strategy::WholePlan,
            unit: self.config.design_name.clone(),
            shape: ResponseShape::Delimited,
            text: render(self.body(Strategy::WholePlan), &variables)?,
        })
    }

    fn per_feature(&self, plan: &Plan) -> Result<Vec<Prompt>, TemplateError> {
        let reference = self.reference_block();
        let body = self.body(Strategy::PerFeature);

        plan.iter()
            .map(|record| -> Result<Prompt, TemplateError> {
                let unit = record.unit_name();
                let filename = format!(
                    "{}_test.{}",
                    normalize_name(&unit),
                    self.config.file_extension
                );
                Ok(Prompt {
                    strategy: Strategy::PerFeature,
                    text: render(body, &feature_vars(record, &reference))?,
                    unit,
                    shape: ResponseShape::Single { filename },
                })
            })
            .collect()
    }

    fn per_artifact_type(&self, plan: &Plan) -> Result<Vec<Prompt>, TemplateError> {
        let described = describe_plan(plan);
        let body = self.body(Strategy::PerArtifactType);

        TemplateRole::all()
            .into_iter()
            .map(|role| -> Result<Prompt, TemplateError> {
                let template = self.templates.get(role);
                let guidance = if template.trim().is_empty() {
                    String::new()
                } else {
                    format!(
                        "Follow the structure and style of this reference {}:\n{}\n",
                        role.label(),
                        template
                    )
                };

                let variables = vars([
                    ("design_name", self.config.design_name.clone()),
                    ("artifact_kind", role.label().to_string()),
                    ("template", guidance),
                    ("plan", described.clone()),
                ]);

                Ok(Prompt {
                    strategy: Strategy::PerArtifactType,
                    unit: role.label().to_string(),
                    shape: ResponseShape::Single {
                        filename: format!(
                            "{}_{}.{}",
                            self.config.design_name,
                            role.file_suffix(),
                            self.config.file_extension
                        ),
                    },
                    text: render(body, &variables)?,
                })
            })
            .collect()
    }

    /// Combined template reference for per-feature prompts, or `""` when no
    /// template has text.
    fn reference_block(&self) -> String {
        if self.templates.is_empty() {
            return String::new();
        }

        let mut block = String::from("Reference Templates:\n");
        for role in [
            TemplateRole::Test,
            TemplateRole::Sequence,
            TemplateRole::SequenceItem,
        ] {
            let text = self.templates.get(role);
            if text.trim().is_empty() {
                continue;
            }
            block.push_str(&format!("--- {} template ---\n{}\n", role.label(), text.trim_end()));
        }
        block.push_str("End of Reference Templates\n\n");
        block
    }
}
