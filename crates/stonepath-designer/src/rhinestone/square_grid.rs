//! Square grid fill
//!
//! Rows and columns share one pitch, [`grid_pitch`]. The grid is centered in
//! the region so that the leftover space splits evenly on both sides.

use super::{grid_pitch, FillRegion, GridCollector, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings, StoneSizer};
use crate::random::rng_from_seed;
use stonepath_core::{Bounds, PlacementError, Point};

/// Offsets of `n` stones spread over `span`, centered, with the stone edges
/// inside
fn axis_positions(start: f64, span: f64, diameter: f64, pitch: f64) -> Vec<f64> {
    let usable = span - diameter;
    if usable < 0.0 {
        return Vec::new();
    }
    let n = (usable / pitch) as usize + 1;
    let first = start + diameter / 2.0 + (usable - (n - 1) as f64 * pitch) / 2.0;
    (0..n).map(|i| first + i as f64 * pitch).collect()
}

/// Fill `region` with a square grid, clipped to the container outline
pub fn calculate_square_grid(
    region: &FillRegion<'_>,
    settings: &RhinestoneSettings,
    element_bounds: &[Bounds],
) -> Result<RhinestoneLayout, PlacementError> {
    let mut rng = rng_from_seed(settings.seed);
    let sizer = StoneSizer::new(settings, element_bounds);
    let diameter = sizer.base_diameter(settings);
    let pitch = grid_pitch(settings, diameter)?;

    let bounds = region.bounds;
    let xs = axis_positions(bounds.left, bounds.width(), diameter, pitch);
    let ys = axis_positions(bounds.bottom, bounds.height(), diameter, pitch);

    let mut collector = GridCollector::new(region, settings, Some(bounds), sizer.max_diameter());
    for &y in &ys {
        for &x in &xs {
            let point = Point::new(x, y);
            let (stone_size, element_index, stone) = sizer.next(collector.placed(), &mut rng);
            if !collector.admits(point, stone) {
                continue;
            }
            collector.push(RhinestonePlacement {
                x,
                y,
                stone_size,
                rotation: settings.stone_rotation(&mut rng),
                element_index,
                diameter: Some(stone),
            });
        }
    }

    let (layout, removed) = collector.finish(settings);
    tracing::info!(
        "Square grid: {} stones on a {:.3}mm pitch ({} removed as overlaps)",
        layout.len(),
        pitch,
        removed
    );
    Ok(layout)
}
