//! Outline fill
//!
//! Stones stepped along a curve every `diameter + min_gap + spacing`,
//! starting at the curve start. Open curves get a stone on the end point
//! when the length divides evenly; on closed curves the start stone stands
//! in for the end. `outline_offset` shifts every stone sideways from the
//! curve.

use super::{remove_overlaps, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings, StoneSizer};
use crate::curve::Curve;
use crate::random::rng_from_seed;
use stonepath_core::{Bounds, PlacementError};

const END_TOLERANCE: f64 = 1e-9;

/// Distance between consecutive outline stones
pub fn outline_step(settings: &RhinestoneSettings, diameter: f64) -> Result<f64, PlacementError> {
    let step = diameter + settings.min_gap + settings.spacing.max(0.0);
    if !(step.is_finite() && step > 0.0) {
        return Err(PlacementError::invalid(
            "min_gap",
            format!("outline step must be positive, got {step}"),
        ));
    }
    Ok(step)
}

/// Place stones along `curve`
pub fn calculate_outline(
    curve: &Curve,
    settings: &RhinestoneSettings,
    element_bounds: &[Bounds],
) -> Result<RhinestoneLayout, PlacementError> {
    if curve.is_empty() {
        return Err(PlacementError::EmptyCurve);
    }

    let mut rng = rng_from_seed(settings.seed);
    let sizer = StoneSizer::new(settings, element_bounds);
    let step = outline_step(settings, sizer.base_diameter(settings))?;

    let length = curve.total_length();
    let closed = curve.is_closed();
    let mut placements = Vec::new();

    for i in 0.. {
        let distance = i as f64 * step;
        let past_end = if closed {
            distance >= length - END_TOLERANCE && i > 0
        } else {
            distance > length + END_TOLERANCE
        };
        if past_end {
            break;
        }
        let Some(sample) = curve.try_point_at_distance(distance) else {
            break;
        };

        let point = if settings.outline_offset != 0.0 {
            sample.point.offset_along(sample.angle + 90.0, settings.outline_offset)
        } else {
            sample.point
        };
        let (stone_size, element_index, diameter) = sizer.next(placements.len(), &mut rng);
        placements.push(RhinestonePlacement {
            x: point.x,
            y: point.y,
            stone_size,
            rotation: settings.stone_rotation(&mut rng),
            element_index,
            diameter: Some(diameter),
        });
    }

    let generated = placements.len();
    if settings.remove_overlaps {
        placements = remove_overlaps(placements, settings.min_gap);
    }

    tracing::info!(
        "Outline: {} stones along {:.2}mm ({} removed as overlaps)",
        placements.len(),
        length,
        generated - placements.len()
    );
    Ok(RhinestoneLayout::new(placements))
}
