// Integration tests for the rhinestone generators

use std::collections::BTreeMap;
use stonepath_designer::rhinestone::scatter::target_stone_count;
use stonepath_designer::rhinestone::{stone_diameter, MAX_SCATTER_STONES};
use stonepath_designer::{
    calculate_circular_grid, calculate_hexagonal_grid, calculate_outline, calculate_pixel_grid,
    calculate_random_scatter, calculate_square_grid, place_stones, render_template,
    write_template, Bounds, Curve, FillRegion, HexGridParams, MemoryDocument, Point, Polygon,
    RhinestoneLayout, RhinestoneSettings, ScatterParams, TemplateParams,
};

fn ss10() -> RhinestoneSettings {
    RhinestoneSettings {
        stone_size: "SS10".to_string(),
        density: 1.0,
        min_gap: 0.5,
        gap_optimization: false,
        remove_overlaps: false,
        ..RhinestoneSettings::default()
    }
}

#[test]
fn test_hex_grid_is_a_honeycomb() {
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 100.0, 100.0));
    let layout = calculate_hexagonal_grid(&region, &ss10(), &HexGridParams::default(), &[]).unwrap();
    assert!(!layout.is_empty());

    // group by row
    let mut rows: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for p in layout.iter() {
        rows.entry((p.y * 1000.0).round() as i64).or_default().push(p.x);
    }
    assert!(rows.len() >= 2);
    let min_x: Vec<f64> = rows
        .values()
        .take(2)
        .map(|xs| xs.iter().copied().fold(f64::INFINITY, f64::min))
        .collect();

    let h = stone_diameter("SS10") + 0.5;
    let shift = (min_x[1] - min_x[0]).rem_euclid(h);
    assert!((shift - h / 2.0).abs() < 1e-6, "row shift {shift}, expected {}", h / 2.0);
}

#[test]
fn test_hex_grid_respects_container() {
    let triangle = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(60.0, 0.0),
        Point::new(0.0, 60.0),
    ]);
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 60.0, 60.0)).with_container(&triangle);
    let layout = calculate_hexagonal_grid(&region, &ss10(), &HexGridParams::default(), &[]).unwrap();
    assert!(!layout.is_empty());
    assert!(layout.iter().all(|p| p.x + p.y <= 60.0));
}

#[test]
fn test_scatter_with_seed_is_deterministic_and_capped() {
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 100.0, 100.0));
    let settings = RhinestoneSettings {
        density: 0.6,
        seed: Some(42),
        ..ss10()
    };
    let a = calculate_random_scatter(&region, &settings, &ScatterParams::default(), &[]);
    let b = calculate_random_scatter(&region, &settings, &ScatterParams::default(), &[]);
    assert_eq!(a, b);
    assert!(a.len() <= MAX_SCATTER_STONES);
    assert!(a.len() <= target_stone_count(&region.bounds, 2.8, 0.6, None));
}

#[test]
fn test_density_clamp_is_idempotent() {
    for density in [-3.0, 0.0, 0.05, 0.5, 1.0, 7.0, f64::NAN] {
        let once = RhinestoneSettings {
            density,
            ..ss10()
        }
        .clamped_density();
        let twice = RhinestoneSettings {
            density: once,
            ..ss10()
        }
        .clamped_density();
        assert_eq!(once, twice);
        assert!((0.1..=1.0).contains(&once));
    }
}

#[test]
fn test_statistics_count_sizes() {
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 40.0, 40.0));
    let settings = RhinestoneSettings {
        stone_sizes: vec!["SS6".to_string(), "SS16".to_string()],
        size_distribution: vec![1.0, 1.0],
        seed: Some(8),
        ..ss10()
    };
    let layout = calculate_hexagonal_grid(&region, &settings, &HexGridParams::default(), &[]).unwrap();
    let stats = layout.statistics();
    assert_eq!(stats.total_stones, layout.len());
    assert_eq!(stats.size_distribution.values().sum::<usize>(), layout.len());
    assert!(stats.size_distribution.keys().all(|k| k == "SS6" || k == "SS16"));
    assert!(stats.coverage_area > 0.0);
}

#[test]
fn test_place_stones_in_memory_document() {
    let mut doc = MemoryDocument::new();
    let source = doc.add_shape(Bounds::new(0.0, 0.0, 1.0, 1.0));
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 20.0, 20.0));
    let layout = calculate_hexagonal_grid(&region, &ss10(), &HexGridParams::default(), &[]).unwrap();

    let placed = place_stones(&layout, &mut doc, &[source]).unwrap();
    assert_eq!(placed.len(), layout.len());
    assert_eq!(doc.shape_count(), layout.len() + 1);
    assert!(!doc.is_optimizing());
}

fn min_pair_distance(layout: &RhinestoneLayout) -> f64 {
    let points: Vec<Point> = layout.iter().map(|p| p.position()).collect();
    let mut min = f64::INFINITY;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            min = min.min(a.distance_to(b));
        }
    }
    min
}

#[test]
fn test_outline_steps_stone_plus_gap() {
    let curve = Curve::from_polyline(
        &[Point::new(0.0, 0.0), Point::new(40.0, 0.0), Point::new(40.0, 30.0)],
        false,
    );
    let layout = calculate_outline(&curve, &ss10(), &[]).unwrap();

    let step = stone_diameter("SS10") + 0.5;
    let expected = (curve.total_length() / step).floor() as usize + 1;
    assert_eq!(layout.len(), expected);

    // neighbours on the same straight run sit exactly one step apart
    for pair in layout.placements.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let same_run = (a.y == 0.0 && b.y == 0.0)
            || ((a.x - 40.0).abs() < 1e-9 && (b.x - 40.0).abs() < 1e-9);
        if same_run {
            assert!((a.position().distance_to(&b.position()) - step).abs() < 1e-9);
        }
    }
    assert_eq!(layout.placements[0].position(), Point::new(0.0, 0.0));
}

#[test]
fn test_outline_overlap_removal_on_doubled_path() {
    // out and back along the same line: the return stones land on the outbound ones
    let curve = Curve::from_polyline(
        &[Point::new(0.0, 0.0), Point::new(30.0, 0.0), Point::new(0.0, 0.0)],
        false,
    );
    let kept = calculate_outline(&curve, &ss10(), &[]).unwrap();
    let filtered = calculate_outline(
        &curve,
        &RhinestoneSettings {
            remove_overlaps: true,
            ..ss10()
        },
        &[],
    )
    .unwrap();
    assert!(filtered.len() < kept.len());
    assert!(min_pair_distance(&filtered) >= stone_diameter("SS10") + 0.5 - 1e-6);
}

#[test]
fn test_square_grid_rows_and_columns() {
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 20.0, 20.0));
    let layout = calculate_square_grid(&region, &ss10(), &[]).unwrap();
    // pitch 3.3 over 20 - 2.8 of usable span: 6 per axis
    assert_eq!(layout.len(), 36);
    assert!(layout.iter().all(|p| p.x - 1.4 >= -1e-9 && p.x + 1.4 <= 20.0 + 1e-9));
    assert!((layout.placements[1].x - layout.placements[0].x - 3.3).abs() < 1e-9);
    assert!((min_pair_distance(&layout) - 3.3).abs() < 1e-9);
}

#[test]
fn test_circular_grid_ring_totals() {
    let settings = RhinestoneSettings {
        min_gap: 0.2,
        ..ss10()
    };
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 40.0, 40.0));
    let layout = calculate_circular_grid(&region, &settings, &[]).unwrap();
    // 1 + 6 + 12 + 18 + 25 + 31 + 37
    assert_eq!(layout.len(), 130);
    assert_eq!(layout.placements[0].position(), Point::new(20.0, 20.0));
    let center = Point::new(20.0, 20.0);
    assert!(layout.iter().all(|p| p.position().distance_to(&center) < 20.0));
}

#[test]
fn test_pixel_grid_and_template() {
    let settings = RhinestoneSettings {
        min_gap: 0.2,
        ..ss10()
    };
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 30.0, 30.0));
    let layout = calculate_pixel_grid(&region, &settings).unwrap();
    assert_eq!(layout.len(), 100);
    assert!(layout.iter().all(|p| p.stone_size == "SS10" && p.diameter.is_none()));

    let svg = render_template(&layout, &TemplateParams::default());
    assert_eq!(svg.matches("<circle").count(), 100);
    assert_eq!(svg.matches(">SS10</text>").count(), 100);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixels.svg");
    write_template(&layout, &path, &TemplateParams::default()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), svg);
}
