//! Proximity-based social network accumulated over one generation.
//!
//! Weights live in a flat upper-triangular array: row `i` holds pairs
//! `(i, j)` for `j > i`, so rows are disjoint slices and can be filled in
//! parallel.

use crate::spatial_hash::SpatialHash;
use pathomove_data::EdgeRecord;
use petgraph::graph::UnGraph;
use rayon::prelude::*;

#[derive(Clone, Debug, Default)]
pub struct ProximityNetwork {
    n: usize,
    weights: Vec<u32>,
    step_contacts: Vec<(usize, usize)>,
}

#[inline]
fn row_offset(n: usize, i: usize) -> usize {
    i * n - i * (i + 1) / 2
}

impl ProximityNetwork {
    /// Zero-initialised associations among `n` agents.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            weights: vec![0; n * n.saturating_sub(1) / 2],
            step_contacts: Vec::new(),
        }
    }

    /// Number of agents (nodes).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Zeroes all weights, keeping the allocation.
    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = 0);
        self.step_contacts.clear();
    }

    #[inline]
    fn pair_index(&self, i: usize, j: usize) -> Option<usize> {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        if a == b || b >= self.n {
            None
        } else {
            Some(row_offset(self.n, a) + (b - a - 1))
        }
    }

    /// Association weight between two distinct agents.
    ///
    /// Self-pairs have no weight and return `None`, as do out-of-range ids.
    pub fn weight(&self, i: usize, j: usize) -> Option<u32> {
        self.pair_index(i, j).map(|k| self.weights[k])
    }

    /// Adds one unit of association between `i` and `j`. Self-pairs and
    /// out-of-range ids are ignored.
    pub fn record_contact(&mut self, i: usize, j: usize) {
        if let Some(k) = self.pair_index(i, j) {
            self.weights[k] += 1;
        }
    }

    /// Total association weight of agent `i`.
    pub fn degree(&self, i: usize) -> u64 {
        (0..self.n)
            .filter_map(|j| self.weight(i, j))
            .map(u64::from)
            .sum()
    }

    pub fn degrees(&self) -> Vec<u64> {
        let mut degrees = vec![0u64; self.n];
        for (i, j, w) in self.edges() {
            degrees[i] += u64::from(w);
            degrees[j] += u64::from(w);
        }
        degrees
    }

    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|&w| u64::from(w)).sum()
    }

    /// Non-zero edges as `(i, j, weight)` with `i < j`, in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        (0..self.n).flat_map(move |i| {
            let start = row_offset(self.n, i);
            let row = &self.weights[start..start + (self.n - 1 - i)];
            row.iter()
                .enumerate()
                .filter(|&(_, &w)| w > 0)
                .map(move |(k, &w)| (i, i + 1 + k, w))
        })
    }

    pub fn edge_records(&self, gen: usize) -> Vec<EdgeRecord> {
        self.edges()
            .map(|(id1, id2, weight)| EdgeRecord {
                gen,
                id1,
                id2,
                weight,
            })
            .collect()
    }

    /// Pairs that came within range during the latest
    /// [`accumulate`](Self::accumulate) call, ordered by `(i, j)`.
    pub fn step_contacts(&self) -> &[(usize, usize)] {
        &self.step_contacts
    }

    /// One timestep of association: every pair at distance `<= range` gains
    /// one unit of weight.
    ///
    /// `index` must have been built from `positions`.
    pub fn accumulate(&mut self, positions: &[(f64, f64)], index: &SpatialHash, range: f64) {
        debug_assert_eq!(positions.len(), self.n);
        let n = self.n;
        let r2 = range * range;

        let mut rows: Vec<&mut [u32]> = Vec::with_capacity(n);
        let mut rest = self.weights.as_mut_slice();
        for i in 0..n {
            let (row, tail) = std::mem::take(&mut rest).split_at_mut(n - 1 - i);
            rows.push(row);
            rest = tail;
        }

        let contacts: Vec<Vec<usize>> = rows
            .into_par_iter()
            .enumerate()
            .map(|(i, row)| {
                let (xi, yi) = positions[i];
                let mut found = Vec::new();
                index.query_callback(xi, yi, range, |j| {
                    if j > i {
                        let (xj, yj) = positions[j];
                        let dx = xj - xi;
                        let dy = yj - yi;
                        if dx * dx + dy * dy <= r2 {
                            row[j - i - 1] += 1;
                            found.push(j);
                        }
                    }
                });
                found.sort_unstable();
                found
            })
            .collect();

        self.step_contacts.clear();
        for (i, partners) in contacts.into_iter().enumerate() {
            self.step_contacts.extend(partners.into_iter().map(|j| (i, j)));
        }
    }

    /// Undirected graph with one node per agent and one edge per non-zero
    /// association, weighted by the association count.
    pub fn to_graph(&self) -> UnGraph<usize, u32> {
        let mut graph = UnGraph::with_capacity(self.n, 0);
        let nodes: Vec<_> = (0..self.n).map(|i| graph.add_node(i)).collect();
        for (i, j, w) in self.edges() {
            graph.add_edge(nodes[i], nodes[j], w);
        }
        graph
    }

    /// Number of connected components, counting isolated agents.
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.to_graph())
    }
}
