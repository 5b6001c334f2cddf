use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    common::{ColorIdx, PALETTE_SIZE},
    state::Tile,
};

/// Pixel coordinate inside a tilesheet, addressed as `tilesheet[tile][row][col]`.
/// Serialized as a `[tile, row, col]` array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRef(pub usize, pub usize, pub usize);

/// Sparse tilesheet edit: for each palette index, the pixels that were changed to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileDelta {
    pub buckets: [Vec<PixelRef>; PALETTE_SIZE],
}

impl TileDelta {
    pub fn diff(baseline: &[Tile], modified: &[Tile]) -> Self {
        if baseline.len() != modified.len() {
            warn!(
                "diffing tilesheets of different lengths ({} vs {})",
                baseline.len(),
                modified.len()
            );
        }
        let mut delta = TileDelta::default();
        for (t, (base, tile)) in baseline.iter().zip(modified).enumerate() {
            for row in 0..8 {
                for col in 0..8 {
                    let p = tile[row][col];
                    if p != base[row][col] {
                        delta.buckets[p as usize].push(PixelRef(t, row, col));
                    }
                }
            }
        }
        delta
    }

    /// Writes every recorded pixel into `tilesheet`. Coordinates outside the sheet are skipped.
    pub fn apply(&self, tilesheet: &mut [Tile]) {
        for (c, bucket) in self.buckets.iter().enumerate() {
            for &PixelRef(t, row, col) in bucket {
                match tilesheet.get_mut(t) {
                    Some(tile) if row < 8 && col < 8 => tile[row][col] = c as ColorIdx,
                    _ => warn!("skipping out-of-range delta pixel ({}, {}, {})", t, row, col),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
