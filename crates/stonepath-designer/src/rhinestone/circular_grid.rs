//! Circular (radial) fill
//!
//! Rings one pitch apart around the region center. Ring `k` holds
//! `max(1, floor(2 * pi * r / pitch))` stones evenly spaced by angle, and
//! each stone is turned to face outward along its ring angle. Rings stop
//! at half the shorter region side.

use super::{grid_pitch, FillRegion, GridCollector, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings, StoneSizer};
use crate::random::rng_from_seed;
use std::f64::consts::TAU;
use stonepath_core::geometry::normalize_angle;
use stonepath_core::{Bounds, PlacementError, Point};

/// Stones on ring `ring` of a radial layout with `pitch` between rings
pub fn ring_stone_count(ring: usize, pitch: f64) -> usize {
    let radius = ring as f64 * pitch;
    ((TAU * radius / pitch) as usize).max(1)
}

/// Fill `region` with concentric rings, clipped to the container outline
pub fn calculate_circular_grid(
    region: &FillRegion<'_>,
    settings: &RhinestoneSettings,
    element_bounds: &[Bounds],
) -> Result<RhinestoneLayout, PlacementError> {
    let mut rng = rng_from_seed(settings.seed);
    let sizer = StoneSizer::new(settings, element_bounds);
    let pitch = grid_pitch(settings, sizer.base_diameter(settings))?;

    let bounds = region.bounds;
    let center = bounds.center();
    let max_radius = bounds.width().min(bounds.height()) / 2.0;

    let mut collector = GridCollector::new(region, settings, Some(bounds), sizer.max_diameter());
    let mut rings = 0;
    for ring in (0..).take_while(|k| (*k as f64) * pitch < max_radius) {
        rings += 1;
        let radius = ring as f64 * pitch;
        let count = ring_stone_count(ring, pitch);

        for i in 0..count {
            let angle = TAU * i as f64 / count as f64;
            let point = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
            let (stone_size, element_index, stone) = sizer.next(collector.placed(), &mut rng);
            if !collector.admits(point, stone) {
                continue;
            }
            let rotation = if settings.random_rotation {
                settings.stone_rotation(&mut rng)
            } else {
                normalize_angle(settings.rotation + angle.to_degrees())
            };
            collector.push(RhinestonePlacement {
                x: point.x,
                y: point.y,
                stone_size,
                rotation,
                element_index,
                diameter: Some(stone),
            });
        }
    }

    let (layout, removed) = collector.finish(settings);
    tracing::info!(
        "Circular grid: {} stones in {} rings ({} removed as overlaps)",
        layout.len(),
        rings,
        removed
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_counts() {
        assert_eq!(ring_stone_count(0, 3.0), 1);
        assert_eq!(ring_stone_count(1, 3.0), 6);
        assert_eq!(ring_stone_count(2, 3.0), 12);
        assert_eq!(ring_stone_count(6, 3.0), 37);
    }

    #[test]
    fn test_stones_face_outward() {
        let settings = RhinestoneSettings {
            min_gap: 0.2,
            density: 1.0,
            remove_overlaps: false,
            gap_optimization: false,
            ..RhinestoneSettings::default()
        };
        let layout = calculate_circular_grid(
            &FillRegion::rect(Bounds::new(0.0, 0.0, 10.0, 10.0)),
            &settings,
            &[],
        )
        .unwrap();
        // center stone plus the six of ring 1
        assert_eq!(layout.len(), 7);
        let east = &layout.placements[1];
        assert!((east.x - 8.0).abs() < 1e-9 && (east.y - 5.0).abs() < 1e-9);
        assert!(east.rotation.abs() < 1e-9);
        assert!((layout.placements[2].rotation - 60.0).abs() < 1e-9);
    }
}
