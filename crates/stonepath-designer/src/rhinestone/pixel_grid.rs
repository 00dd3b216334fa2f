//! Pixel-art grid fill
//!
//! Same-size stones on the centers of square cells that tile the region from
//! its bottom-left corner, like pixels. Only the container outline clips;
//! cells near the region edge keep their stone. With `random_rotation` each
//! stone turns by a quarter-turn multiple.

use super::{grid_pitch, stone_diameter, FillRegion, GridCollector, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings};
use crate::random::{index, rng_from_seed};
use stonepath_core::{PlacementError, Point};

const QUARTER_TURNS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Fill `region` with uniform pixel cells of the primary stone size
pub fn calculate_pixel_grid(
    region: &FillRegion<'_>,
    settings: &RhinestoneSettings,
) -> Result<RhinestoneLayout, PlacementError> {
    let mut rng = rng_from_seed(settings.seed);
    let diameter = stone_diameter(&settings.stone_size);
    let pitch = grid_pitch(settings, diameter)?;

    let bounds = region.bounds;
    let cells = |start: f64, end: f64| {
        (0..)
            .map(move |i| start + pitch / 2.0 + i as f64 * pitch)
            .take_while(move |c| *c < end)
    };

    let mut collector = GridCollector::new(region, settings, None, diameter);
    let container = region.checker();
    let (mut columns, mut rows) = (0, 0);

    for x in cells(bounds.left, bounds.right) {
        columns += 1;
        rows = 0;
        for y in cells(bounds.bottom, bounds.top) {
            rows += 1;
            let point = Point::new(x, y);
            if !container.contains(x, y) || !collector.admits(point, diameter) {
                continue;
            }
            let rotation = if settings.random_rotation {
                QUARTER_TURNS[index(&mut rng, QUARTER_TURNS.len())]
            } else {
                settings.rotation
            };
            collector.push(RhinestonePlacement {
                x,
                y,
                stone_size: settings.stone_size.clone(),
                rotation,
                element_index: None,
                diameter: None,
            });
        }
    }

    let (mut layout, removed) = collector.finish(settings);
    layout.containment_fallbacks = container.fallback_count();
    tracing::info!(
        "Pixel grid: {} stones in {} x {} cells ({} removed as overlaps)",
        layout.len(),
        columns,
        rows,
        removed
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Polygon;
    use stonepath_core::Bounds;

    fn settings() -> RhinestoneSettings {
        RhinestoneSettings {
            min_gap: 0.2,
            density: 1.0,
            remove_overlaps: false,
            gap_optimization: false,
            ..RhinestoneSettings::default()
        }
    }

    #[test]
    fn test_cells_tile_the_region() {
        let layout = calculate_pixel_grid(
            &FillRegion::rect(Bounds::new(0.0, 0.0, 12.0, 9.0)),
            &settings(),
        )
        .unwrap();
        assert_eq!(layout.len(), 12);
        assert!((layout.placements[0].x - 1.5).abs() < 1e-9);
        assert!((layout.placements[0].y - 1.5).abs() < 1e-9);
        assert!(layout.iter().all(|p| p.stone_size == "SS10"));
    }

    #[test]
    fn test_quarter_turn_rotations_are_seeded() {
        let settings = RhinestoneSettings {
            random_rotation: true,
            seed: Some(7),
            ..settings()
        };
        let region = FillRegion::rect(Bounds::new(0.0, 0.0, 30.0, 30.0));
        let a = calculate_pixel_grid(&region, &settings).unwrap();
        let b = calculate_pixel_grid(&region, &settings).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|p| QUARTER_TURNS.contains(&p.rotation)));
    }

    #[test]
    fn test_container_clips_cells() {
        let triangle = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(12.0, 0.0),
            Point::new(0.0, 12.0),
        ]);
        let region = FillRegion::rect(Bounds::new(0.0, 0.0, 12.0, 12.0)).with_container(&triangle);
        let layout = calculate_pixel_grid(&region, &settings()).unwrap();
        assert!(layout.len() < 16);
        assert!(layout.iter().all(|p| p.x + p.y <= 12.0 + 1e-9));
    }
}
