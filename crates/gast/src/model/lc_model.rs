//! The local-context classification network.
//!
//! Embeds a goal graph and ten context-slot graphs through a shared
//! four-layer graph-convolution stack with sort-pooling and two 1-D
//! convolution stages, then classifies which slot holds the hypothesis
//! the tactic targets.
//!
//! ```text
//! (nodes, V)
//!   → GcnConv(V→D) → tanh → GcnConv(D→D) → tanh (twice) → GcnConv(D→1) → tanh
//!   → concat all four layer outputs per node: C = 3D+1 channels
//!   → sort-pool to k nodes → (graphs, 1, k·C)
//!   → Conv1d(1→D/2, kernel C, stride C) → relu → MaxPool1d(2, 2)
//!   → Conv1d(D/2→D, kernel 5) → relu → flatten → (graphs, dense_dim)
//! goal (1, dense) ++ context (10, dense) → flatten (11·dense)
//!   → Linear(11·dense→128) → relu → dropout → Linear(128→10) → logits
//! ```
//!
//! The convolution/pooling geometry is fixed by construction; the kernel
//! and stride of the first 1-D stage must stay `3·D+1` so the sorted node
//! blocks line up with the convolution windows.

use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::nn::pool::{MaxPool1d, MaxPool1dConfig};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{relu, tanh};

use crate::graph::GraphBatch;
use crate::model::gcn::{GcnConv, GcnConvConfig};
use crate::model::sort_pool::global_sort_pool;

/// Number of local-context slots the classifier scores.
pub const CONTEXT_SLOTS: usize = 10;

/// Hidden width of the classifier head.
const CLASSIFIER_HIDDEN: usize = 128;

/// Kernel size of the second 1-D convolution stage.
const CONV6_KERNEL: usize = 5;

/// Configuration for [`GastLcModel`].
#[derive(Config, Debug)]
pub struct GastLcModelConfig {
    /// Nonterminal vocabulary size (one-hot input width).
    pub num_nonterminals: usize,
    /// Node embedding dimension D. Must be even.
    #[config(default = 16)]
    pub embedding_dim: usize,
    /// Sort-pooling node count k. Must be at least 10 so the fixed
    /// convolution/pooling geometry leaves a positive length.
    #[config(default = 30)]
    pub sortk: usize,
    /// Dropout probability in the classifier head.
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl GastLcModelConfig {
    /// Per-graph embedding width after the 1-D convolution stages.
    pub fn dense_dim(&self) -> usize {
        let pooled_len = (self.sortk - 2) / 2 + 1;
        (pooled_len - CONV6_KERNEL + 1) * self.embedding_dim
    }

    /// Initialize a [`GastLcModel`].
    pub fn init<B: Backend>(&self, device: &B::Device) -> GastLcModel<B> {
        assert!(
            self.embedding_dim >= 2 && self.embedding_dim % 2 == 0,
            "embedding_dim must be even and >= 2, got {}",
            self.embedding_dim
        );
        assert!(
            self.sortk >= 2 * CONV6_KERNEL,
            "sortk must be at least {} for the fixed conv/pool geometry, got {}",
            2 * CONV6_KERNEL,
            self.sortk
        );

        let d = self.embedding_dim;
        let node_channels = 3 * d + 1;

        GastLcModel {
            conv1: GcnConvConfig::new(self.num_nonterminals, d).init(device),
            conv2: GcnConvConfig::new(d, d).init(device),
            conv3: GcnConvConfig::new(d, d).init(device),
            conv4: GcnConvConfig::new(d, 1).init(device),
            conv5: Conv1dConfig::new(1, d / 2, node_channels)
                .with_stride(node_channels)
                .init(device),
            conv6: Conv1dConfig::new(d / 2, d, CONV6_KERNEL).init(device),
            pool: MaxPool1dConfig::new(2).with_stride(2).init(),
            classifier_1: LinearConfig::new(
                (CONTEXT_SLOTS + 1) * self.dense_dim(),
                CLASSIFIER_HIDDEN,
            )
            .init(device),
            drop_out: DropoutConfig::new(self.dropout).init(),
            classifier_2: LinearConfig::new(CLASSIFIER_HIDDEN, CONTEXT_SLOTS).init(device),
            sortk: self.sortk,
            dense_dim: self.dense_dim(),
        }
    }
}

/// GNN embedding + classification network over goal and context graphs.
#[derive(Module, Debug)]
pub struct GastLcModel<B: Backend> {
    /// First graph convolution: one-hot width → D.
    pub conv1: GcnConv<B>,
    conv2: GcnConv<B>,
    conv3: GcnConv<B>,
    /// Last graph convolution: D → 1. Its output channel ranks nodes for
    /// sort-pooling.
    conv4: GcnConv<B>,
    conv5: Conv1d<B>,
    conv6: Conv1d<B>,
    pool: MaxPool1d,
    classifier_1: Linear<B>,
    drop_out: Dropout,
    classifier_2: Linear<B>,
    sortk: usize,
    dense_dim: usize,
}

impl<B: Backend> GastLcModel<B> {
    /// Per-graph embedding width.
    pub fn dense_dim(&self) -> usize {
        self.dense_dim
    }

    /// Embed every graph slot of a batch to a fixed-size vector.
    ///
    /// Returns `(batch.num_slots, dense_dim)`. A batch with no nodes at
    /// all (every slot empty) embeds to zeros.
    pub fn embeddings(&self, batch: &GraphBatch, device: &B::Device) -> Tensor<B, 2> {
        if batch.total_nodes == 0 {
            return Tensor::zeros([batch.num_slots, self.dense_dim], device);
        }

        let x = batch.node_features::<B>(device);
        let adj = batch.normalized_adjacency::<B>(device);

        let x1 = tanh(self.conv1.forward(x, adj.clone()));
        let x2 = tanh(self.conv2.forward(x1.clone(), adj.clone()));
        let x3 = tanh(self.conv3.forward(x2.clone(), adj.clone()));
        let x4 = tanh(self.conv4.forward(x3.clone(), adj));
        let x = Tensor::cat(vec![x1, x2, x3, x4], 1);

        let x = global_sort_pool(x, &batch.ranges, self.sortk);
        let [graphs, width] = x.dims();
        let x = x.reshape([graphs, 1, width]);

        let x = relu(self.conv5.forward(x));
        let x = self.pool.forward(x);
        let x = relu(self.conv6.forward(x));
        x.reshape([graphs, self.dense_dim])
    }

    /// Classify which context slot the tactic targets.
    ///
    /// `goal`: `(1, dense_dim)`; `context`: `(CONTEXT_SLOTS, dense_dim)`.
    /// Returns logits `(1, CONTEXT_SLOTS)`.
    pub fn forward_logits(&self, goal: Tensor<B, 2>, context: Tensor<B, 2>) -> Tensor<B, 2> {
        let embeddings = Tensor::cat(vec![goal, context], 0);
        let flat = embeddings.reshape([1, (CONTEXT_SLOTS + 1) * self.dense_dim]);

        let out = relu(self.classifier_1.forward(flat));
        let out = self.drop_out.forward(out);
        self.classifier_2.forward(out)
    }

    /// Cross-entropy loss of the logits against a target slot index.
    pub fn loss(
        &self,
        logits: Tensor<B, 2>,
        target_slot: usize,
        device: &B::Device,
    ) -> Tensor<B, 1> {
        let targets = Tensor::<B, 1, Int>::from_ints([target_slot as i32], device);
        CrossEntropyLossConfig::new()
            .init(device)
            .forward(logits, targets)
    }
}
