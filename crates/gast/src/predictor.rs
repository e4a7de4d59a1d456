//! Bridging plain proof-state data to the network.
//!
//! [`LcPredictor`] owns the model together with its vocabularies and
//! device, builds graph batches from a goal and its local context, and
//! extracts per-hypothesis predictions plus the training loss from the
//! network output.

use std::path::Path;

use burn::prelude::*;
use burn::tensor::activation::softmax;

use proofstate::{ContextEntry, Goal};

use crate::graph::GraphBatch;
use crate::model::lc_model::{GastLcModel, GastLcModelConfig, CONTEXT_SLOTS};
use crate::vocab::{NonterminalVocab, TacticVocab};

/// One classification input: a goal, its local context, and the ground
/// truth hypothesis identifier the tactic targets.
#[derive(Debug, Clone)]
pub struct LcSample {
    /// The goal being solved.
    pub goal: Goal,
    /// Hypotheses in scope. The model scores the first
    /// [`CONTEXT_SLOTS`] entries; the rest are ignored.
    pub local_context: Vec<ContextEntry>,
    /// Identifier of the hypothesis the tactic actually used.
    pub target_ident: String,
}

/// Predicted relevance of one hypothesis.
#[derive(Debug, Clone)]
pub struct LcPrediction {
    /// Hypothesis identifier.
    pub ident: String,
    /// Softmax probability of this hypothesis being the target.
    pub prob: f32,
}

/// Network output for one sample.
#[derive(Debug)]
pub struct LcOutput<B: Backend> {
    /// One prediction per real (non-placeholder) hypothesis the model saw.
    pub preds: Vec<LcPrediction>,
    /// Ground-truth identifiers for the sample.
    pub trues: Vec<String>,
    /// Cross-entropy loss against the target slot.
    pub loss: Tensor<B, 1>,
}

impl<B: Backend> LcOutput<B> {
    /// The hypothesis with the highest predicted probability.
    pub fn top_prediction(&self) -> Option<&LcPrediction> {
        self.preds
            .iter()
            .max_by(|a, b| a.prob.total_cmp(&b.prob))
    }

    /// Scalar loss value.
    pub fn loss_value(&self) -> f64 {
        let value: f32 = self.loss.clone().into_scalar().elem();
        value as f64
    }
}

/// Local-context predictor: model + vocabularies + device.
pub struct LcPredictor<B: Backend> {
    model: GastLcModel<B>,
    nonterminals: NonterminalVocab,
    tactics: TacticVocab,
    device: B::Device,
}

impl<B: Backend> LcPredictor<B> {
    /// Create a predictor from already-loaded parts.
    pub fn new(
        model: GastLcModel<B>,
        nonterminals: NonterminalVocab,
        tactics: TacticVocab,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            nonterminals,
            tactics,
            device,
        }
    }

    /// Load both vocabulary files and initialize a fresh model.
    ///
    /// The nonterminal vocabulary's size fixes the one-hot width of the
    /// first graph convolution.
    pub fn from_files(
        nonterminals_path: &Path,
        tactics_path: &Path,
        embedding_dim: usize,
        sortk: usize,
        dropout: f64,
        device: B::Device,
    ) -> anyhow::Result<Self> {
        let nonterminals = NonterminalVocab::from_json(nonterminals_path)?;
        let tactics = TacticVocab::from_json(tactics_path)?;
        if nonterminals.is_empty() {
            anyhow::bail!(
                "nonterminal vocabulary {} is empty",
                nonterminals_path.display()
            );
        }

        let model = GastLcModelConfig::new(nonterminals.len())
            .with_embedding_dim(embedding_dim)
            .with_sortk(sortk)
            .with_dropout(dropout)
            .init(&device);

        tracing::info!(
            nonterminals = nonterminals.len(),
            tactics = tactics.len(),
            embedding_dim,
            sortk,
            "Initialized local-context model"
        );

        Ok(Self::new(model, nonterminals, tactics, device))
    }

    /// The tactic vocabulary the predictor was built with.
    pub fn tactics(&self) -> &TacticVocab {
        &self.tactics
    }

    /// The underlying model.
    pub fn model(&self) -> &GastLcModel<B> {
        &self.model
    }

    /// Run the network on one sample.
    ///
    /// Returns one prediction per real hypothesis among the scored slots
    /// and the cross-entropy loss against the target.
    ///
    /// # Errors
    /// Fails if the target identifier is not among the scored context
    /// slots.
    pub fn predict(&self, sample: &LcSample) -> anyhow::Result<LcOutput<B>> {
        let scored: Vec<&ContextEntry> = sample
            .local_context
            .iter()
            .take(CONTEXT_SLOTS)
            .collect();

        let target_slot = scored
            .iter()
            .position(|entry| entry.ident == sample.target_ident)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "target ident '{}' not among the first {CONTEXT_SLOTS} context entries",
                    sample.target_ident
                )
            })?;

        let goal_batch = GraphBatch::build(&self.nonterminals, &[&sample.goal.ast], 1);
        let context_asts: Vec<&proofstate::Ast> = scored.iter().map(|e| &e.ast).collect();
        let lc_batch = GraphBatch::build(&self.nonterminals, &context_asts, CONTEXT_SLOTS);

        let goal_emb = self.model.embeddings(&goal_batch, &self.device);
        let lc_emb = self.model.embeddings(&lc_batch, &self.device);
        let logits = self.model.forward_logits(goal_emb, lc_emb);

        let loss = self.model.loss(logits.clone(), target_slot, &self.device);

        let probs: Vec<f32> = softmax(logits, 1)
            .reshape([CONTEXT_SLOTS])
            .into_data()
            .to_vec()
            .unwrap();

        let preds = scored
            .iter()
            .zip(&probs)
            .filter(|(entry, _)| !entry.ident.is_empty())
            .map(|(entry, &prob)| LcPrediction {
                ident: entry.ident.clone(),
                prob,
            })
            .collect();

        Ok(LcOutput {
            preds,
            trues: vec![sample.target_ident.clone()],
            loss,
        })
    }
}
