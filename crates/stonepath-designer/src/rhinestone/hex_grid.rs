//! Hexagonal (honeycomb) grid fill
//!
//! Rows are `base * sqrt(3) / 2` apart and alternate rows shift by
//! `stagger_amount` percent of the horizontal spacing; 50% gives a true
//! honeycomb. Both spacings are divided by the density so that lower
//! densities spread stones out.

use super::{FillRegion, GridCollector, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings, StoneSizer};
use crate::random::rng_from_seed;
use serde::{Deserialize, Serialize};
use stonepath_core::geometry::rotate_point;
use stonepath_core::{Bounds, PlacementError, Point};

/// Grid layout options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexGridParams {
    /// Fixed row count; derived from the region height when unset
    pub rows: Option<usize>,
    /// Fixed column count; derived from the region width when unset
    pub cols: Option<usize>,
    pub stagger: bool,
    /// Percent of the horizontal spacing applied to odd rows
    pub stagger_amount: f64,
    /// Rigid grid rotation around the region center, in degrees
    pub rotation: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub edge_margin: f64,
    pub clip_to_container: bool,
    pub center_grid: bool,
    /// Extra horizontal spacing in mm
    pub horizontal_spacing: f64,
    /// Extra vertical spacing in mm
    pub vertical_spacing: f64,
    pub scale_factor: f64,
}

impl Default for HexGridParams {
    fn default() -> Self {
        Self {
            rows: None,
            cols: None,
            stagger: true,
            stagger_amount: 50.0,
            rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            edge_margin: 1.0,
            clip_to_container: true,
            center_grid: true,
            horizontal_spacing: 0.0,
            vertical_spacing: 0.0,
            scale_factor: 1.0,
        }
    }
}

/// Effective grid spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexGridMetrics {
    pub horizontal_spacing: f64,
    pub row_height: f64,
    /// Shift of odd rows
    pub stagger_offset: f64,
}

/// Spacing for stones of `diameter` under `settings` and `params`
pub fn hex_grid_metrics(
    settings: &RhinestoneSettings,
    params: &HexGridParams,
    diameter: f64,
) -> Result<HexGridMetrics, PlacementError> {
    let density = settings.clamped_density();

    let mut base = diameter + settings.min_gap;
    if settings.spacing > 0.0 {
        base += settings.spacing;
    }
    base *= params.scale_factor;

    let horizontal_spacing = (base + params.horizontal_spacing) / density;
    let row_height = (base * 3.0_f64.sqrt() / 2.0 + params.vertical_spacing) / density;

    if !(horizontal_spacing.is_finite() && horizontal_spacing > 0.0) {
        return Err(PlacementError::invalid(
            "spacing",
            format!("horizontal grid spacing must be positive, got {horizontal_spacing}"),
        ));
    }
    if !(row_height.is_finite() && row_height > 0.0) {
        return Err(PlacementError::invalid(
            "spacing",
            format!("row height must be positive, got {row_height}"),
        ));
    }

    let stagger_offset = if params.stagger {
        horizontal_spacing * params.stagger_amount / 100.0
    } else {
        0.0
    };

    Ok(HexGridMetrics {
        horizontal_spacing,
        row_height,
        stagger_offset,
    })
}

/// Fill `region` with a staggered grid.
///
/// Candidate points are clipped to the inset bounding box (stone edge
/// included) and then to the container outline. With `gap_optimization`
/// and without `remove_overlaps`, candidates too close to an accepted stone
/// are skipped during generation.
pub fn calculate_hexagonal_grid(
    region: &FillRegion<'_>,
    settings: &RhinestoneSettings,
    params: &HexGridParams,
    element_bounds: &[Bounds],
) -> Result<RhinestoneLayout, PlacementError> {
    let mut rng = rng_from_seed(settings.seed);
    let sizer = StoneSizer::new(settings, element_bounds);
    let metrics = hex_grid_metrics(settings, params, sizer.base_diameter(settings))?;

    let outer = region.bounds;
    let margin = params.edge_margin;
    let min_x = outer.left + margin + params.offset_x;
    let min_y = outer.bottom + margin + params.offset_y;
    let width = (outer.width() - 2.0 * margin).max(0.0);
    let height = (outer.height() - 2.0 * margin).max(0.0);

    let h = metrics.horizontal_spacing;
    let row_height = metrics.row_height;
    let rows = params
        .rows
        .unwrap_or_else(|| (height / row_height) as usize + 2);
    let cols = params.cols.unwrap_or_else(|| (width / h) as usize + 2);

    let (center_dx, center_dy) = if params.center_grid {
        let grid_width = cols.saturating_sub(1) as f64 * h + metrics.stagger_offset;
        let grid_height = rows.saturating_sub(1) as f64 * row_height;
        ((width - grid_width) / 2.0, (height - grid_height) / 2.0)
    } else {
        (0.0, 0.0)
    };

    let clip = params.clip_to_container.then(|| outer.inset(margin));
    let pivot = outer.center();
    let mut collector = GridCollector::new(region, settings, clip, sizer.max_diameter());

    for row in 0..rows {
        let row_shift = if row % 2 == 1 { metrics.stagger_offset } else { 0.0 };
        let base_y = min_y + center_dy + row as f64 * row_height;

        for col in 0..cols {
            let base_x = min_x + center_dx + col as f64 * h + row_shift;
            let point = if params.rotation != 0.0 {
                rotate_point(Point::new(base_x, base_y), params.rotation, pivot)
            } else {
                Point::new(base_x, base_y)
            };

            let (stone_size, element_index, diameter) = sizer.next(collector.placed(), &mut rng);
            if !collector.admits(point, diameter) {
                continue;
            }

            collector.push(RhinestonePlacement {
                x: point.x,
                y: point.y,
                stone_size,
                rotation: settings.stone_rotation(&mut rng),
                element_index,
                diameter: Some(diameter),
            });
        }
    }

    let (layout, removed) = collector.finish(settings);
    tracing::info!(
        "Hexagonal grid: {} stones ({} rows x {} cols, {} removed as overlaps)",
        layout.len(),
        rows,
        cols,
        removed
    );
    Ok(layout)
}
