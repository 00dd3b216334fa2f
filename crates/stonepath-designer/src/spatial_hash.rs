//! Uniform-grid spatial hashing
//!
//! [`SpatialHash`] buckets item indices by `floor(x / cell), floor(y / cell)`
//! and answers 3x3 neighborhood queries. [`OverlapIndex`] builds the
//! insert-and-reject-if-too-close rule on top of it for round elements:
//! two elements with diameters `d1`, `d2` must keep their centers at least
//! `(d1 + d2) / 2 + min_gap` apart.
//!
//! The cell size must be at least the largest possible separation so that
//! every conflicting neighbor lies in the 3x3 block around a candidate.
//! Processing is first-come-first-kept: earlier insertions always win.
//!
//! [`non_overlapping_boxes`] applies the same scheme to axis-aligned boxes.

use smallvec::SmallVec;
use std::collections::HashMap;
use stonepath_core::{Bounds, Point};

type CellKey = (i64, i64);

/// Grid of item indices keyed by cell coordinates
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<CellKey, SmallVec<[usize; 4]>>,
}

impl SpatialHash {
    /// Create a hash with the given cell size. Non-positive sizes are
    /// replaced by 1.0.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell coordinates of a position
    pub fn cell_key(&self, x: f64, y: f64) -> CellKey {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Record item `index` at a position
    pub fn insert(&mut self, x: f64, y: f64, index: usize) {
        let key = self.cell_key(x, y);
        self.cells.entry(key).or_default().push(index);
    }

    /// Indices stored in the 3x3 block of cells around a position
    pub fn neighbors(&self, x: f64, y: f64) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_key(x, y);
        (cx - 1..=cx + 1)
            .flat_map(move |gx| (cy - 1..=cy + 1).map(move |gy| (gx, gy)))
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Disc {
    x: f64,
    y: f64,
    diameter: f64,
}

/// Minimum-separation index for round elements
#[derive(Debug, Clone)]
pub struct OverlapIndex {
    hash: SpatialHash,
    min_gap: f64,
    accepted: Vec<Disc>,
}

impl OverlapIndex {
    /// Index for a batch whose largest element diameter is `max_diameter`.
    /// The cell size is `max_diameter + max(min_gap, 0)`.
    pub fn new(max_diameter: f64, min_gap: f64) -> Self {
        let min_gap = min_gap.max(0.0);
        Self {
            hash: SpatialHash::new(max_diameter.max(0.0) + min_gap),
            min_gap,
            accepted: Vec::new(),
        }
    }

    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Whether a disc at (x, y) keeps the required separation from every
    /// accepted disc
    pub fn is_clear(&self, x: f64, y: f64, diameter: f64) -> bool {
        self.hash.neighbors(x, y).all(|idx| {
            let other = &self.accepted[idx];
            let min_dist = (diameter + other.diameter) / 2.0 + self.min_gap;
            let dx = x - other.x;
            let dy = y - other.y;
            dx * dx + dy * dy >= min_dist * min_dist
        })
    }

    /// Accept the disc if it is clear of all accepted discs.
    /// Returns whether it was accepted.
    pub fn insert_if_clear(&mut self, x: f64, y: f64, diameter: f64) -> bool {
        if !self.is_clear(x, y, diameter) {
            return false;
        }
        self.hash.insert(x, y, self.accepted.len());
        self.accepted.push(Disc { x, y, diameter });
        true
    }
}

/// Drop every item that violates the separation rule against an earlier
/// kept item. Order of the survivors is preserved.
pub fn filter_overlaps<T>(
    items: Vec<T>,
    min_gap: f64,
    center: impl Fn(&T) -> Point,
    diameter: impl Fn(&T) -> f64,
) -> Vec<T> {
    if items.is_empty() {
        return items;
    }

    let max_diameter = items.iter().map(&diameter).fold(0.0_f64, f64::max);
    if max_diameter + min_gap.max(0.0) <= 0.0 {
        return items;
    }

    let mut index = OverlapIndex::new(max_diameter, min_gap);
    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let c = center(item);
            index.insert_if_clear(c.x, c.y, diameter(item))
        })
        .collect();

    tracing::debug!(
        "Overlap filter kept {} of {} items (cell {:.3})",
        kept.len(),
        before,
        index.hash.cell_size()
    );
    kept
}

/// Keep-mask for a list of boxes: `false` for every box whose interior
/// overlaps an earlier kept box. Cells are sized from the largest box edge,
/// at least 1.0.
pub fn non_overlapping_boxes(boxes: &[Bounds]) -> Vec<bool> {
    let cell = boxes
        .iter()
        .map(Bounds::max_dimension)
        .fold(1.0_f64, f64::max);
    let mut hash = SpatialHash::new(cell);
    let mut kept: Vec<Bounds> = Vec::new();

    boxes
        .iter()
        .map(|b| {
            let c = b.center();
            let overlaps = hash.neighbors(c.x, c.y).any(|k| {
                let other = &kept[k];
                let oc = other.center();
                (c.x - oc.x).abs() < (b.width() + other.width()) / 2.0
                    && (c.y - oc.y).abs() < (b.height() + other.height()) / 2.0
            });
            if !overlaps {
                hash.insert(c.x, c.y, kept.len());
                kept.push(*b);
            }
            !overlaps
        })
        .collect()
}
