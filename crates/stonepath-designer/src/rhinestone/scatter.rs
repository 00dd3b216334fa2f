//! Random scatter fill
//!
//! Rejection sampling: uniform candidates inside the region bounds are
//! rejected when outside the container or too close to an accepted stone.
//! Sampling stops at the target count or after ten attempts per target
//! stone, so small regions or high densities return fewer stones.

use super::{remove_overlaps, FillRegion, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings, StoneSizer};
use crate::random::{rng_from_seed, uniform};
use crate::spatial_hash::OverlapIndex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use stonepath_core::Bounds;

/// Upper bound on stones per scatter
pub const MAX_SCATTER_STONES: usize = 10_000;

/// Candidate draws allowed per target stone
pub const ATTEMPTS_PER_STONE: usize = 10;

/// Scatter options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterParams {
    /// Explicit stone count; derived from area and density when unset
    pub count: Option<usize>,
    /// Density used instead of the settings density for the count estimate
    pub density: Option<f64>,
}

/// Target stone count: explicit, or `area * density / (pi * r^2)`,
/// capped at [`MAX_SCATTER_STONES`]
pub fn target_stone_count(bounds: &Bounds, diameter: f64, density: f64, count: Option<usize>) -> usize {
    let target = match count {
        Some(count) => count,
        None => {
            let radius = diameter / 2.0;
            let stone_area = PI * radius * radius;
            if stone_area > 0.0 {
                (bounds.area() * density / stone_area).max(0.0) as usize
            } else {
                0
            }
        }
    };
    target.min(MAX_SCATTER_STONES)
}

/// Scatter stones over `region`. A settings seed makes the result
/// reproducible.
pub fn calculate_random_scatter(
    region: &FillRegion<'_>,
    settings: &RhinestoneSettings,
    params: &ScatterParams,
    element_bounds: &[Bounds],
) -> RhinestoneLayout {
    let mut rng = rng_from_seed(settings.seed);
    let sizer = StoneSizer::new(settings, element_bounds);
    let bounds = region.bounds;

    let density = params.density.unwrap_or(settings.density);
    let target = target_stone_count(&bounds, sizer.base_diameter(settings), density, params.count);
    let max_attempts = target * ATTEMPTS_PER_STONE;

    let checker = region.checker();
    let mut index = OverlapIndex::new(sizer.max_diameter(), settings.min_gap);
    let mut placements: Vec<RhinestonePlacement> = Vec::with_capacity(target);
    let mut attempts = 0;

    while placements.len() < target && attempts < max_attempts {
        attempts += 1;
        let x = uniform(&mut rng, bounds.left, bounds.right);
        let y = uniform(&mut rng, bounds.bottom, bounds.top);
        let (stone_size, element_index, diameter) = sizer.next(placements.len(), &mut rng);

        if !checker.contains(x, y) || !index.insert_if_clear(x, y, diameter) {
            continue;
        }

        placements.push(RhinestonePlacement {
            x,
            y,
            stone_size,
            rotation: settings.stone_rotation(&mut rng),
            element_index,
            diameter: Some(diameter),
        });
    }

    if placements.len() < target {
        tracing::warn!(
            "Random scatter placed {} of {} stones after {} attempts",
            placements.len(),
            target,
            attempts
        );
    }

    if settings.remove_overlaps {
        placements = remove_overlaps(placements, settings.min_gap);
    }

    tracing::info!("Random scatter: {} stones", placements.len());
    RhinestoneLayout {
        placements,
        containment_fallbacks: checker.fallback_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(seed: u64) -> RhinestoneSettings {
        RhinestoneSettings {
            stone_size: "SS10".to_string(),
            density: 0.6,
            seed: Some(seed),
            ..RhinestoneSettings::default()
        }
    }

    #[test]
    fn test_target_count_from_density() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let expected = (10_000.0 * 0.6 / (PI * 1.4 * 1.4)) as usize;
        assert_eq!(target_stone_count(&bounds, 2.8, 0.6, None), expected);
        assert_eq!(target_stone_count(&bounds, 2.8, 0.6, Some(50_000)), MAX_SCATTER_STONES);
        assert_eq!(target_stone_count(&bounds, 0.0, 0.6, None), 0);
    }

    #[test]
    fn test_explicit_count_in_roomy_region() {
        let region = FillRegion::rect(Bounds::new(0.0, 0.0, 100.0, 100.0));
        let params = ScatterParams {
            count: Some(20),
            density: None,
        };
        let layout = calculate_random_scatter(&region, &settings(9), &params, &[]);
        assert_eq!(layout.len(), 20);
        assert!(layout
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.x) && (0.0..=100.0).contains(&p.y)));
    }

    #[test]
    fn test_tiny_region_returns_fewer() {
        let region = FillRegion::rect(Bounds::new(0.0, 0.0, 3.0, 3.0));
        let params = ScatterParams {
            count: Some(50),
            density: None,
        };
        let layout = calculate_random_scatter(&region, &settings(5), &params, &[]);
        assert!(layout.len() < 50);
        assert!(!layout.is_empty());
    }
}
