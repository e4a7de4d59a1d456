//! Global sort-pooling.
//!
//! Orders each graph's nodes by the last feature channel (descending) and
//! truncates or zero-pads to exactly `k` nodes, producing one fixed-size
//! row per graph. Sorting happens through `argsort` + `select`, so the
//! gathered values stay on the autodiff graph.

use burn::prelude::*;

/// Pool a node-feature matrix into per-graph rows of width `k * channels`.
///
/// `x` is `(total_nodes, channels)`; `ranges` gives each graph's
/// contiguous `(start, len)` node range. Graphs with no nodes become
/// all-zero rows. Returns `(ranges.len(), k * channels)`.
pub fn global_sort_pool<B: Backend>(
    x: Tensor<B, 2>,
    ranges: &[(usize, usize)],
    k: usize,
) -> Tensor<B, 2> {
    let [_, channels] = x.dims();
    let device = x.device();

    let mut pooled = Vec::with_capacity(ranges.len());
    for &(start, len) in ranges {
        let graph = if len == 0 {
            Tensor::zeros([k, channels], &device)
        } else {
            let rows = x.clone().slice([start..start + len, 0..channels]);
            let order = rows
                .clone()
                .slice([0..len, channels - 1..channels])
                .reshape([len])
                .argsort_descending(0);

            let keep = usize::min(len, k);
            let sorted = rows.select(0, order.slice([0..keep]));
            if keep < k {
                Tensor::cat(vec![sorted, Tensor::zeros([k - keep, channels], &device)], 0)
            } else {
                sorted
            }
        };
        pooled.push(graph.reshape([1, k * channels]));
    }

    Tensor::cat(pooled, 0)
}
