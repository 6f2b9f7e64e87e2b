use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Upper bound on grid cells along one axis, so tiny query radii on large
/// landscapes do not allocate huge grids.
pub const MAX_CELLS_PER_AXIS: usize = 128;

#[derive(Clone, Debug, Default)]
/// Uniform grid index over point positions on a square landscape.
///
/// Uses the "offset array" layout (like compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i+1]` indexes the slice of
/// `entity_indices` holding every point in cell `i`. Within a cell, points
/// keep their original order, so queries visit candidates deterministically.
///
/// Queries return candidates from every cell overlapping the query square;
/// callers apply the exact distance test.
///
/// # Examples
/// ```
/// use pathomove_core::spatial_hash::SpatialHash;
///
/// let mut index = SpatialHash::new(10.0, 100.0);
/// index.build(&[(15.0, 15.0), (25.0, 25.0), (85.0, 85.0)]);
///
/// let mut nearby = Vec::new();
/// index.query_into(15.0, 15.0, 20.0, &mut nearby);
/// assert!(nearby.contains(&0));
/// assert!(!nearby.contains(&2));
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub extent: f64,
    pub cols: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
}

impl SpatialHash {
    /// Creates an empty index over `[0, extent]²` with square cells of
    /// `cell_size`.
    pub fn new(cell_size: f64, extent: f64) -> Self {
        let cols = Self::cols_for(cell_size, extent);
        Self {
            cell_size,
            extent,
            cols,
            cell_offsets: vec![0; cols * cols + 1],
            entity_indices: Vec::new(),
        }
    }

    /// Creates an index whose cells match a typical query radius.
    pub fn with_query_radius(extent: f64, radius: f64) -> Self {
        Self::new(Self::cell_size_for(extent, radius), extent)
    }

    pub fn cell_size_for(extent: f64, radius: f64) -> f64 {
        let floor = extent / MAX_CELLS_PER_AXIS as f64;
        if radius.is_finite() {
            radius.max(floor).max(f64::MIN_POSITIVE)
        } else {
            extent.max(f64::MIN_POSITIVE)
        }
    }

    fn cols_for(cell_size: f64, extent: f64) -> usize {
        ((extent / cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS)
    }

    /// Re-targets the grid geometry if the extent or radius changed.
    pub fn reshape(&mut self, extent: f64, radius: f64) {
        let cell_size = Self::cell_size_for(extent, radius);
        if cell_size != self.cell_size || extent != self.extent {
            *self = Self::new(cell_size, extent);
        }
    }

    /// Computes the cell index for a landscape coordinate.
    ///
    /// Non-finite coordinates and coordinates outside `[0, extent]` return
    /// `None`. Points on the far edge fall in the last cell.
    #[inline]
    pub fn get_cell_idx(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        if x < 0.0 || y < 0.0 || x > self.extent || y > self.extent {
            return None;
        }
        let cx = ((x / self.cell_size) as usize).min(self.cols - 1);
        let cy = ((y / self.cell_size) as usize).min(self.cols - 1);
        Some(cy * self.cols + cx)
    }

    /// Rebuilds the index from `positions`; point `i` is reported as `i`.
    pub fn build(&mut self, positions: &[(f64, f64)]) {
        let cell_count = self.cols * self.cols;

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        positions.par_iter().for_each(|&(x, y)| {
            if let Some(idx) = self.get_cell_idx(x, y) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, count) in atomic_counts.into_iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count.into_inner();
        }
        self.cell_offsets[cell_count] = total;

        self.entity_indices.resize(total, 0);
        let mut current_offsets = self.cell_offsets[..cell_count].to_vec();
        for (entity_idx, &(x, y)) in positions.iter().enumerate() {
            if let Some(cell_idx) = self.get_cell_idx(x, y) {
                self.entity_indices[current_offsets[cell_idx]] = entity_idx;
                current_offsets[cell_idx] += 1;
            }
        }
    }

    /// Inclusive range of cell coordinates overlapping `[v - r, v + r]`.
    #[inline]
    fn cell_span(&self, v: f64, radius: f64) -> (usize, usize) {
        let last = self.cols as f64 - 1.0;
        let lo = ((v - radius) / self.cell_size).floor().clamp(0.0, last);
        let hi = ((v + radius) / self.cell_size).floor().clamp(0.0, last);
        (lo as usize, hi as usize)
    }

    /// Calls `callback` with every indexed point in cells overlapping the
    /// square of half-width `radius` around `(x, y)`.
    pub fn query_callback<F>(&self, x: f64, y: f64, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        if self.entity_indices.is_empty() || !x.is_finite() || !y.is_finite() || radius < 0.0 {
            return;
        }
        let (min_cx, max_cx) = self.cell_span(x, radius);
        let (min_cy, max_cy) = self.cell_span(y, radius);

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let cell_idx = cy * self.cols + cx;
                let start = self.cell_offsets[cell_idx];
                let end = self.cell_offsets[cell_idx + 1];
                for &entity_idx in &self.entity_indices[start..end] {
                    callback(entity_idx);
                }
            }
        }
    }

    pub fn count_nearby(&self, x: f64, y: f64, radius: f64) -> usize {
        let mut count = 0;
        self.query_callback(x, y, radius, |_| count += 1);
        count
    }

    #[inline]
    pub fn query_into(&self, x: f64, y: f64, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(x, y, radius, |idx| result.push(idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_hash_query_finds_nearby() {
        let mut sh = SpatialHash::new(5.0, 20.0);
        sh.build(&[(1.0, 1.0), (2.0, 2.0), (10.0, 10.0)]);

        let mut count = 0;
        sh.query_callback(1.5, 1.5, 2.0, |_| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_spatial_hash_far_edge_is_indexed() {
        let mut sh = SpatialHash::new(5.0, 20.0);
        sh.build(&[(20.0, 20.0), (0.0, 0.0)]);
        assert_eq!(sh.get_cell_idx(20.0, 20.0), Some(15));
        assert_eq!(sh.count_nearby(19.0, 19.0, 1.0), 1);
    }

    #[test]
    fn test_spatial_hash_rejects_outside_points() {
        let sh = SpatialHash::new(5.0, 20.0);
        assert_eq!(sh.get_cell_idx(-0.1, 3.0), None);
        assert_eq!(sh.get_cell_idx(3.0, 20.1), None);
        assert_eq!(sh.get_cell_idx(f64::NAN, 3.0), None);
    }

    #[test]
    fn test_rebuild_with_no_points_empties_index() {
        let mut sh = SpatialHash::new(5.0, 20.0);
        sh.build(&[(1.0, 1.0)]);
        sh.build(&[]);
        assert_eq!(sh.count_nearby(1.0, 1.0, 10.0), 0);
    }

    #[test]
    fn test_huge_radius_visits_everything_once() {
        let mut sh = SpatialHash::with_query_radius(10.0, 1.0e9);
        assert_eq!(sh.cols, 1);
        sh.build(&[(1.0, 1.0), (9.0, 9.0), (5.0, 2.0)]);
        let mut found = Vec::new();
        sh.query_into(0.0, 0.0, 1.0e9, &mut found);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn test_small_radius_caps_grid() {
        let sh = SpatialHash::with_query_radius(1000.0, 0.0);
        assert_eq!(sh.cols, MAX_CELLS_PER_AXIS);
    }
}
