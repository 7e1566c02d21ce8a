//! Per-unit outcomes and the run report.

use crate::config::Strategy;
use crate::error::TbgenError;
use crate::generation::GenerationError;
use std::fmt;
use std::path::PathBuf;

/// Where a unit is in its lifecycle.
///
/// `Placed`, `Failed` and `Empty` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Prompted,
    Completed,
    Partitioned,
    Placed,
    Failed,
    Empty,
}

impl UnitState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Placed | Self::Failed | Self::Empty)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Prompted => "prompted",
            Self::Completed => "completed",
            Self::Partitioned => "partitioned",
            Self::Placed => "placed",
            Self::Failed => "failed",
            Self::Empty => "empty",
        })
    }
}

/// Why a unit failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitFailure {
    Generation(GenerationError),
    Output(String),
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generation(e) => write!(f, "{}", e),
            Self::Output(message) => f.write_str(message),
        }
    }
}

/// Result of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub unit: String,
    pub state: UnitState,
    /// Artifacts carved out of the completion.
    pub artifacts: usize,
    /// Files written for this unit (empty under aggregate placement).
    pub files: Vec<PathBuf>,
    pub failure: Option<UnitFailure>,
}

impl UnitOutcome {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            state: UnitState::Pending,
            artifacts: 0,
            files: Vec::new(),
            failure: None,
        }
    }

    pub(super) fn advance(&mut self, state: UnitState) {
        tracing::debug!(unit = %self.unit, from = %self.state, to = %state, "unit transition");
        self.state = state;
    }

    pub(super) fn fail(&mut self, failure: UnitFailure) {
        self.advance(UnitState::Failed);
        self.failure = Some(failure);
    }

    pub fn is_generation_failure(&self) -> bool {
        matches!(self.failure, Some(UnitFailure::Generation(_)))
    }

    /// One-line summary for the user-facing report.
    pub fn summary(&self) -> String {
        match self.state {
            UnitState::Placed if self.files.is_empty() && self.artifacts > 0 => format!(
                "[ok] {}: {} artifact(s) added to aggregate",
                self.unit, self.artifacts
            ),
            UnitState::Placed if self.files.is_empty() => {
                format!("[warn] {}: no files found in completion", self.unit)
            }
            UnitState::Placed => {
                let names: Vec<String> = self.files.iter().map(|p| p.display().to_string()).collect();
                format!("[ok] {}: {}", self.unit, names.join(", "))
            }
            UnitState::Empty => format!("[empty] {}: no completion returned", self.unit),
            UnitState::Failed => format!(
                "[failed] {}: {}",
                self.unit,
                self.failure
                    .as_ref()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unknown error".to_string())
            ),
            other => format!("[{}] {}", other, self.unit),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: Strategy,
    pub output_root: PathBuf,
    pub outcomes: Vec<UnitOutcome>,
    /// Aggregate file, when aggregate placement wrote one.
    pub aggregate_file: Option<PathBuf>,
}

impl RunReport {
    /// Every file written by the run, in unit order.
    pub fn files(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .flat_map(|o| o.files.iter())
            .chain(self.aggregate_file.iter())
            .collect()
    }

    pub fn count(&self, state: UnitState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    /// Run-level failure, if the run as a whole should exit non-zero.
    ///
    /// A whole-plan run fails when it wrote no files. Per-feature and
    /// per-artifact-type runs fail only when every unit failed with a
    /// generation error.
    pub fn fatal_error(&self) -> Option<TbgenError> {
        if self.outcomes.is_empty() {
            return None;
        }

        if self.strategy == Strategy::WholePlan && self.files().is_empty() {
            let reason = self
                .outcomes
                .iter()
                .find_map(|o| match (&o.failure, o.state) {
                    (Some(failure), _) => Some(failure.to_string()),
                    (None, UnitState::Empty) => Some("the service returned no completion".to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| "the completion contained no delimited files".to_string());
            return Some(TbgenError::Generation(format!(
                "whole-plan run produced no files: {}",
                reason
            )));
        }

        if self.strategy != Strategy::WholePlan
            && self.outcomes.iter().all(|o| o.is_generation_failure())
        {
            let last = self
                .outcomes
                .last()
                .and_then(|o| o.failure.as_ref())
                .map(|f| f.to_string())
                .unwrap_or_default();
            return Some(TbgenError::Generation(format!(
                "all {} units failed; last error: {}",
                self.outcomes.len(),
                last
            )));
        }

        None
    }
}
