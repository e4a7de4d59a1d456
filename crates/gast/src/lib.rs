//! Graph neural network over proof-state ASTs.
//!
//! Embeds a goal and its local-context hypotheses as graphs, pools them to
//! fixed-size vectors, and classifies which hypothesis a tactic targets.
//! Built on burn; graph convolution and sort-pooling are composed from
//! burn tensor ops.

pub mod graph;
pub mod model;
pub mod predictor;
pub mod vocab;

pub use graph::GraphBatch;
pub use model::lc_model::{GastLcModel, GastLcModelConfig, CONTEXT_SLOTS};
pub use predictor::{LcOutput, LcPrediction, LcPredictor, LcSample};
pub use vocab::{NonterminalVocab, TacticVocab};
