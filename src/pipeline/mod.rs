//! The generation pipeline.
//!
//! Units run strictly one after another:
//!
//! ```text
//! Pending -> Prompted -> Completed -> Partitioned -> Placed
//!               |             \
//!               +-> Failed     +-> Empty
//! ```
//!
//! A failing unit is recorded in its [`UnitOutcome`] and the run moves on.
//! Aggregate output is finished once every unit is terminal.

mod report;

pub use report::{RunReport, UnitFailure, UnitOutcome, UnitState};

use crate::config::{PipelineConfig, Strategy};
use crate::error::{Result, TbgenError};
use crate::generation::{Completion, Generator};
use crate::output::OutputPlacer;
use crate::partition::Partitioner;
use crate::plan::Plan;
use crate::prompt::{Prompt, PromptBuilder};
use crate::templates::TemplateSet;

/// Drives one run over a loaded plan.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    templates: &'a TemplateSet,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, templates: &'a TemplateSet) -> Self {
        Self { config, templates }
    }

    /// Prompts the run would send, in unit order.
    pub fn prompts(&self, plan: &Plan) -> Result<Vec<Prompt>> {
        PromptBuilder::new(self.config, self.templates)
            .build(plan, self.config.strategy)
            .map_err(|e| {
                TbgenError::UserError(format!(
                    "failed to render {} prompt: {}",
                    self.config.strategy, e
                ))
            })
    }

    /// Run every unit of the plan through `generator`.
    ///
    /// Per-unit failures end up in the report; only a bad plan, an unusable
    /// output root, or a failed aggregate write return `Err`.
    pub fn run(&self, plan: &Plan, generator: &mut dyn Generator) -> Result<RunReport> {
        if plan.is_empty() {
            return Err(TbgenError::DataSource(format!(
                "verification plan '{}' has no feature rows",
                self.config.source_path
            )));
        }

        let prompts = self.prompts(plan)?;
        let partitioner = Partitioner::new(&self.config.delimiter)
            .with_fence_stripping(self.config.strip_code_fences);
        let mut placer = OutputPlacer::from_config(self.config);
        placer.prepare()?;

        tracing::info!(
            strategy = %self.config.strategy,
            placement = %placer.policy(),
            units = prompts.len(),
            output = %placer.root().display(),
            "starting generation"
        );

        let mut outcomes = Vec::with_capacity(prompts.len());
        for (index, prompt) in prompts.iter().enumerate() {
            tracing::info!(unit = %prompt.unit, "[{}/{}] generating", index + 1, prompts.len());
            let outcome = run_unit(prompt, generator, &partitioner, &mut placer);
            outcomes.push(outcome);
        }

        let aggregate_file = placer.finish()?;

        let report = RunReport {
            strategy: self.config.strategy,
            output_root: self.config.output_root.clone().into(),
            outcomes,
            aggregate_file,
        };
        tracing::info!(
            placed = report.count(UnitState::Placed),
            empty = report.count(UnitState::Empty),
            failed = report.count(UnitState::Failed),
            files = report.files().len(),
            "generation finished"
        );
        Ok(report)
    }
}

fn run_unit(
    prompt: &Prompt,
    generator: &mut dyn Generator,
    partitioner: &Partitioner,
    placer: &mut OutputPlacer,
) -> UnitOutcome {
    let mut outcome = UnitOutcome::new(&prompt.unit);
    outcome.advance(UnitState::Prompted);

    let text = match generator.generate(prompt) {
        Ok(Completion::Text(text)) => text,
        Ok(Completion::Empty) => {
            tracing::warn!(unit = %prompt.unit, "service returned no completion");
            outcome.advance(UnitState::Empty);
            return outcome;
        }
        Err(e) => {
            tracing::warn!(unit = %prompt.unit, error = %e, "generation failed");
            outcome.fail(UnitFailure::Generation(e));
            return outcome;
        }
    };
    outcome.advance(UnitState::Completed);

    let artifacts = partitioner.partition(&text, &prompt.shape);
    outcome.artifacts = artifacts.len();
    outcome.advance(UnitState::Partitioned);

    if artifacts.is_empty() {
        let hint = if prompt.strategy == Strategy::WholePlan {
            format!(" (expected lines starting with '{}')", partitioner.marker())
        } else {
            String::new()
        };
        tracing::warn!(unit = %prompt.unit, "no artifacts found in completion{}", hint);
    }

    match placer.place(&prompt.unit, &artifacts) {
        Ok(files) => {
            outcome.files = files;
            outcome.advance(UnitState::Placed);
            tracing::info!(unit = %prompt.unit, artifacts = outcome.artifacts, "unit placed");
        }
        Err(e) => {
            tracing::warn!(unit = %prompt.unit, error = %e, "failed to place artifacts");
            outcome.fail(UnitFailure::Output(e.to_string()));
        }
    }
    outcome
}
