//! AST-to-graph conversion for the convolution layers.
//!
//! A batch packs several ASTs ("slots") into one node set: features are
//! one-hot rows over the nonterminal vocabulary, edges connect parents and
//! children, and each slot owns a contiguous node range so pooling can
//! split the batch back into per-graph blocks. Empty slots (padding
//! placeholders or slots beyond the provided ASTs) contribute no nodes.

use burn::prelude::*;
use burn::tensor::TensorData;

use proofstate::Ast;

use crate::vocab::NonterminalVocab;

/// A batch of AST graphs lowered to flat buffers.
#[derive(Debug, Clone)]
pub struct GraphBatch {
    /// Number of graph slots in the batch (including empty ones).
    pub num_slots: usize,
    /// Total nodes across all slots.
    pub total_nodes: usize,
    /// One-hot width (nonterminal vocabulary size).
    pub feature_dim: usize,
    /// Row-major node features, `total_nodes * feature_dim` long.
    pub features: Vec<f32>,
    /// Parent→child edge list in batch-global node indices.
    pub edges: Vec<(usize, usize)>,
    /// Per-slot `(start, len)` node ranges, contiguous and in slot order.
    pub ranges: Vec<(usize, usize)>,
}

impl GraphBatch {
    /// Pack `asts` into a batch with exactly `num_slots` slots.
    ///
    /// ASTs beyond `num_slots` are dropped; missing slots stay empty.
    /// Unknown labels get an all-zero feature row.
    pub fn build(vocab: &NonterminalVocab, asts: &[&Ast], num_slots: usize) -> Self {
        let mut batch = GraphBatch {
            num_slots,
            total_nodes: 0,
            feature_dim: vocab.len(),
            features: Vec::new(),
            edges: Vec::new(),
            ranges: Vec::with_capacity(num_slots),
        };

        for slot in 0..num_slots {
            let start = batch.total_nodes;
            if let Some(ast) = asts.get(slot) {
                batch.add_tree(vocab, ast);
            }
            batch.ranges.push((start, batch.total_nodes - start));
        }

        batch
    }

    /// Add one tree's nodes and edges; returns the root index, if any.
    fn add_tree(&mut self, vocab: &NonterminalVocab, ast: &Ast) -> Option<usize> {
        let Ast::Node { label, children } = ast else {
            return None;
        };

        let node = self.total_nodes;
        self.total_nodes += 1;
        let mut row = vec![0.0; self.feature_dim];
        if let Some(i) = vocab.index_of(label) {
            row[i] = 1.0;
        }
        self.features.extend_from_slice(&row);

        for child in children {
            if let Some(child_node) = self.add_tree(vocab, child) {
                self.edges.push((node, child_node));
            }
        }

        Some(node)
    }

    /// Node-feature matrix of shape `(total_nodes, feature_dim)`.
    ///
    /// Must not be called on a batch with zero nodes.
    pub fn node_features<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        debug_assert!(self.total_nodes > 0, "empty batch has no feature matrix");
        Tensor::from_data(
            TensorData::new(self.features.clone(), [self.total_nodes, self.feature_dim]),
            device,
        )
    }

    /// Dense symmetric-normalized adjacency `D^-1/2 (A+I) D^-1/2` of shape
    /// `(total_nodes, total_nodes)`, with undirected edges and self-loops.
    ///
    /// Must not be called on a batch with zero nodes.
    pub fn normalized_adjacency<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        debug_assert!(self.total_nodes > 0, "empty batch has no adjacency");
        let n = self.total_nodes;
        let mut adj = vec![0.0f32; n * n];

        for i in 0..n {
            adj[i * n + i] = 1.0;
        }
        for &(src, dst) in &self.edges {
            adj[src * n + dst] = 1.0;
            adj[dst * n + src] = 1.0;
        }

        let mut degrees = vec![0.0f32; n];
        for i in 0..n {
            for j in 0..n {
                degrees[i] += adj[i * n + j];
            }
        }
        for i in 0..n {
            for j in 0..n {
                if adj[i * n + j] > 0.0 {
                    adj[i * n + j] /= (degrees[i] * degrees[j]).sqrt();
                }
            }
        }

        Tensor::from_data(TensorData::new(adj, [n, n]), device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn vocab() -> NonterminalVocab {
        NonterminalVocab::from_labels(
            ["App", "Const", "Var"].iter().map(|s| s.to_string()).collect(),
        )
    }

    fn small_tree() -> Ast {
        // App(Const, Var) — 3 nodes, 2 edges
        Ast::node("App", vec![Ast::leaf("Const"), Ast::leaf("Var")])
    }

    #[test]
    fn test_build_counts_and_ranges() {
        let vocab = vocab();
        let a = small_tree();
        let b = Ast::leaf("Var");
        let batch = GraphBatch::build(&vocab, &[&a, &b], 4);

        assert_eq!(batch.num_slots, 4);
        assert_eq!(batch.total_nodes, 4);
        assert_eq!(batch.edges.len(), 2);
        assert_eq!(batch.ranges, vec![(0, 3), (3, 1), (4, 0), (4, 0)]);
    }

    #[test]
    fn test_one_hot_placement() {
        let vocab = vocab();
        let tree = small_tree();
        let batch = GraphBatch::build(&vocab, &[&tree], 1);

        // Preorder: App, Const, Var → rows one-hot at indices 0, 1, 2.
        assert_eq!(batch.feature_dim, 3);
        assert_eq!(batch.features[0..3], [1.0, 0.0, 0.0]);
        assert_eq!(batch.features[3..6], [0.0, 1.0, 0.0]);
        assert_eq!(batch.features[6..9], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_label_zero_row() {
        let vocab = vocab();
        let tree = Ast::leaf("Lambda");
        let batch = GraphBatch::build(&vocab, &[&tree], 1);
        assert_eq!(batch.total_nodes, 1);
        assert_eq!(batch.features, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_ast_contributes_nothing() {
        let vocab = vocab();
        let batch = GraphBatch::build(&vocab, &[&Ast::Empty], 2);
        assert_eq!(batch.total_nodes, 0);
        assert_eq!(batch.ranges, vec![(0, 0), (0, 0)]);
        assert!(batch.edges.is_empty());
    }

    #[test]
    fn test_extra_asts_dropped() {
        let vocab = vocab();
        let a = Ast::leaf("Var");
        let b = Ast::leaf("Const");
        let batch = GraphBatch::build(&vocab, &[&a, &b], 1);
        assert_eq!(batch.num_slots, 1);
        assert_eq!(batch.total_nodes, 1);
    }

    #[test]
    fn test_edges_parent_to_child() {
        let vocab = vocab();
        // App(App(Var), Const): edges 0→1, 1→2, 0→3
        let tree = Ast::node(
            "App",
            vec![Ast::node("App", vec![Ast::leaf("Var")]), Ast::leaf("Const")],
        );
        let batch = GraphBatch::build(&vocab, &[&tree], 1);
        assert_eq!(batch.edges, vec![(1, 2), (0, 1), (0, 3)]);
        assert_eq!(batch.total_nodes, 4);
    }

    #[test]
    fn test_normalized_adjacency_symmetric() {
        let vocab = vocab();
        let tree = small_tree();
        let batch = GraphBatch::build(&vocab, &[&tree], 1);

        let adj = batch.normalized_adjacency::<TestBackend>(&Default::default());
        assert_eq!(adj.dims(), [3, 3]);

        let values: Vec<f32> = adj.into_data().to_vec().unwrap();
        // Symmetric
        for i in 0..3 {
            for j in 0..3 {
                assert!((values[i * 3 + j] - values[j * 3 + i]).abs() < 1e-6);
            }
        }
        // Root has degree 3 (self + 2 children): diagonal entry 1/3.
        assert!((values[0] - 1.0 / 3.0).abs() < 1e-6);
        // Leaf diagonal: 1/2.
        assert!((values[4] - 0.5).abs() < 1e-6);
        // Root↔leaf: 1/sqrt(6).
        assert!((values[1] - 1.0 / 6.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_node_features_tensor_shape() {
        let vocab = vocab();
        let tree = small_tree();
        let batch = GraphBatch::build(&vocab, &[&tree], 1);
        let x = batch.node_features::<TestBackend>(&Default::default());
        assert_eq!(x.dims(), [3, 3]);
    }
}
