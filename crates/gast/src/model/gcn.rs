//! Graph convolution layer.
//!
//! One message-passing step over a pre-normalized dense adjacency:
//! `h' = Â · h · W + b`. The adjacency carries self-loops and symmetric
//! normalization (see `GraphBatch::normalized_adjacency`), so the layer
//! itself is just an aggregate-then-project.

use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;

/// Configuration for a graph convolution layer.
#[derive(Config, Debug)]
pub struct GcnConvConfig {
    /// Input feature dimension.
    pub d_input: usize,
    /// Output feature dimension.
    pub d_output: usize,
}

/// Graph convolution: neighbor aggregation followed by a linear map.
#[derive(Module, Debug)]
pub struct GcnConv<B: Backend> {
    /// Projection applied after aggregation.
    pub linear: Linear<B>,
}

impl GcnConvConfig {
    /// Initialize a GcnConv layer.
    pub fn init<B: Backend>(&self, device: &B::Device) -> GcnConv<B> {
        GcnConv {
            linear: LinearConfig::new(self.d_input, self.d_output).init(device),
        }
    }
}

impl<B: Backend> GcnConv<B> {
    /// Forward pass.
    ///
    /// `x`: node features `(n, d_input)`; `adj`: normalized adjacency
    /// `(n, n)`. Returns `(n, d_output)`.
    pub fn forward(&self, x: Tensor<B, 2>, adj: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(adj.matmul(x))
    }
}
