//! Result types for evaluation runs.

use serde::{Deserialize, Serialize};

/// Summary of one evaluation run over a dataset partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Partition name ("train", "valid", or "test").
    pub partition: String,
    /// Model-selection tag the run evaluated.
    pub core: String,
    /// Number of data files enumerated for the partition.
    pub total_files: usize,
    /// Goals actually scored.
    pub states_evaluated: usize,
    /// Goals skipped as duplicates of an already-seen state.
    pub duplicates_skipped: usize,
    /// Goals skipped because the tactic names no hypothesis argument.
    pub no_argument_skipped: usize,
    /// Goals skipped because the argument is not among the scored slots.
    pub target_missing_skipped: usize,
    /// Top-1 correct predictions.
    pub correct: usize,
    /// Mean cross-entropy loss over evaluated goals.
    pub mean_loss: f64,
    /// Tactic heads found in the tactic vocabulary.
    pub known_tactics: usize,
    /// Non-placeholder global-context entries seen across all states.
    pub global_constants_seen: usize,
}

impl EvalSummary {
    /// Top-1 accuracy over evaluated goals. Zero when nothing was scored.
    pub fn accuracy(&self) -> f64 {
        if self.states_evaluated == 0 {
            0.0
        } else {
            self.correct as f64 / self.states_evaluated as f64
        }
    }
}
