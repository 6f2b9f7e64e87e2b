use serde::{Deserialize, Serialize};

/// A discrete food item on the landscape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub x: f64,
    pub y: f64,
    /// Index of the cluster centre the item was placed around.
    pub cluster: usize,
    /// Ticks remaining until the item can be eaten again.
    pub counter: u32,
}

impl ResourceItem {
    pub fn new(x: f64, y: f64, cluster: usize) -> Self {
        Self {
            x,
            y,
            cluster,
            counter: 0,
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.counter == 0
    }
}

/// Coordinates of a generated item, as returned by landscape queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub x: f64,
    pub y: f64,
}

impl From<&ResourceItem> for ItemRecord {
    fn from(item: &ResourceItem) -> Self {
        Self {
            x: item.x,
            y: item.y,
        }
    }
}
