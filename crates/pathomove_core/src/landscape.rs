//! Clustered resource landscape.
//!
//! Items are scattered around uniformly placed cluster centres and carry a
//! regeneration counter. An item is available when its counter is zero.

use crate::config::LandscapeConfig;
use crate::error::{ConfigError, Result};
use crate::spatial_hash::SpatialHash;
use pathomove_data::{ItemRecord, ResourceItem};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Folds `value` back into `[0, size]` by reflecting at both edges.
#[inline]
pub fn reflect(value: f64, size: f64) -> f64 {
    let period = 2.0 * size;
    let folded = value.rem_euclid(period);
    if folded > size {
        period - folded
    } else {
        folded
    }
}

#[derive(Clone, Debug)]
pub struct ResourceField {
    items: Vec<ResourceItem>,
    centres: Vec<(f64, f64)>,
    land_size: f64,
    index: SpatialHash,
}

impl ResourceField {
    /// Generates a clustered field.
    ///
    /// Cluster centres are uniform over the landscape; each item picks a
    /// centre uniformly and is displaced by Gaussian jitter with standard
    /// deviation `cluster_spread` on both axes. With no clusters or no
    /// items the field is empty.
    pub fn generate<R: Rng + ?Sized>(config: &LandscapeConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let size = config.land_size;

        let centres: Vec<(f64, f64)> = (0..config.cluster_count)
            .map(|_| (rng.gen::<f64>() * size, rng.gen::<f64>() * size))
            .collect();

        let mut items = Vec::new();
        if !centres.is_empty() {
            let jitter = Normal::new(0.0, config.cluster_spread)
                .map_err(|e| ConfigError::range("cluster_spread", e.to_string()))?;
            items.reserve(config.item_count);
            for _ in 0..config.item_count {
                let cluster = rng.gen_range(0..centres.len());
                let (cx, cy) = centres[cluster];
                let x = reflect(cx + jitter.sample(rng), size);
                let y = reflect(cy + jitter.sample(rng), size);
                items.push(ResourceItem::new(x, y, cluster));
            }
        }

        Ok(Self::with_centres(size, centres, items))
    }

    /// Builds a field from explicit items, e.g. for hand-made scenarios.
    /// Coordinates outside `[0, land_size]` are reflected back inside, the
    /// same way generated items are.
    pub fn from_items(land_size: f64, mut items: Vec<ResourceItem>) -> Self {
        for item in &mut items {
            item.x = reflect(item.x, land_size);
            item.y = reflect(item.y, land_size);
        }
        Self::with_centres(land_size, Vec::new(), items)
    }

    fn with_centres(land_size: f64, centres: Vec<(f64, f64)>, items: Vec<ResourceItem>) -> Self {
        let mut index = SpatialHash::with_query_radius(land_size, land_size / 32.0);
        let positions: Vec<(f64, f64)> = items.iter().map(|item| (item.x, item.y)).collect();
        index.build(&positions);
        Self {
            items,
            centres,
            land_size,
            index,
        }
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    pub fn centres(&self) -> &[(f64, f64)] {
        &self.centres
    }

    pub fn land_size(&self) -> f64 {
        self.land_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_available(&self, idx: usize) -> bool {
        self.items.get(idx).is_some_and(ResourceItem::is_available)
    }

    /// Number of items currently available. Does not touch the counters.
    pub fn count_available(&self) -> usize {
        self.items.iter().filter(|item| item.is_available()).count()
    }

    /// Marks an item as eaten; it becomes available after `regen_time`
    /// calls to [`tick_regeneration`](Self::tick_regeneration). An eaten item
    /// always stays unavailable until the next pass, so `regen_time = 0`
    /// behaves like `1`.
    pub fn consume(&mut self, idx: usize, regen_time: u32) {
        if let Some(item) = self.items.get_mut(idx) {
            item.counter = regen_time.max(1);
        }
    }

    /// End-of-timestep regeneration pass.
    pub fn tick_regeneration(&mut self) {
        for item in &mut self.items {
            item.counter = item.counter.saturating_sub(1);
        }
    }

    pub fn reset_counters(&mut self) {
        for item in &mut self.items {
            item.counter = 0;
        }
    }

    /// Available items within `range` of `(x, y)`, nearest first. Ties on
    /// distance go to the lower item index.
    pub fn available_within(&self, x: f64, y: f64, range: f64) -> Vec<usize> {
        let r2 = range * range;
        let mut found: Vec<(f64, usize)> = Vec::new();
        self.index.query_callback(x, y, range, |idx| {
            let item = &self.items[idx];
            if item.is_available() {
                let dx = item.x - x;
                let dy = item.y - y;
                let d2 = dx * dx + dy * dy;
                if d2 <= r2 {
                    found.push((d2, idx));
                }
            }
        });
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, idx)| idx).collect()
    }

    pub fn records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(ItemRecord::from).collect()
    }
}
