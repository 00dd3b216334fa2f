// Integration tests for curve fill placement and fill sessions

use proptest::prelude::*;
use stonepath_designer::{
    execute_fill, AngleMode, Bounds, Curve, CurveFillEngine, CurveSegment, Error, FillSettings,
    MemoryDocument, PatternMode, PlacementError, Point, ScaleMode, SpacingMode,
};

fn straight(length: f64) -> Curve {
    Curve::new(vec![CurveSegment::line(
        Point::new(0.0, 0.0),
        Point::new(length, 0.0),
    )])
}

fn engine(length: f64) -> CurveFillEngine {
    CurveFillEngine::new(straight(length), vec![Bounds::new(0.0, 0.0, 2.0, 2.0)]).unwrap()
}

#[test]
fn test_fixed_spacing_on_straight_line() {
    let settings = FillSettings {
        spacing_mode: SpacingMode::Fixed,
        spacing_value: 25.0,
        use_element_size: false,
        ..FillSettings::default()
    };
    let placements = engine(100.0).calculate_placements(&settings).unwrap();
    let xs: Vec<f64> = placements.iter().map(|p| p.position.x).collect();
    assert_eq!(xs, vec![0.0, 25.0, 50.0, 75.0]);
    assert!(placements.iter().all(|p| p.rotation.abs() < 1e-9));
}

#[test]
fn test_padding_longer_than_curve_is_empty() {
    let settings = FillSettings {
        start_padding: 30.0,
        end_padding: 30.0,
        ..FillSettings::default()
    };
    assert!(engine(50.0).calculate_placements(&settings).unwrap().is_empty());
}

#[test]
fn test_empty_curve_and_missing_elements_are_rejected() {
    assert_eq!(
        CurveFillEngine::new(Curve::default(), vec![Bounds::new(0.0, 0.0, 1.0, 1.0)]).unwrap_err(),
        PlacementError::EmptyCurve
    );
    assert_eq!(
        CurveFillEngine::new(straight(10.0), Vec::new()).unwrap_err(),
        PlacementError::NoFillElements
    );
}

#[test]
fn test_random_modes_are_reproducible_with_seed() {
    let settings = FillSettings {
        spacing_mode: SpacingMode::Random,
        spacing_min: 3.0,
        spacing_max: 9.0,
        angle_mode: AngleMode::Random,
        scale_mode: ScaleMode::Random,
        pattern_mode: PatternMode::Random,
        seed: Some(42),
        remove_overlaps: false,
        ..FillSettings::default()
    };
    let engine = CurveFillEngine::new(
        straight(200.0),
        vec![Bounds::new(0.0, 0.0, 1.0, 1.0), Bounds::new(0.0, 0.0, 2.0, 1.0)],
    )
    .unwrap();
    let a = engine.calculate_placements(&settings).unwrap();
    let b = engine.calculate_placements(&settings).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_session_round_trip_through_memory_document() {
    let mut doc = MemoryDocument::new();
    let element = doc.add_shape(Bounds::new(0.0, 0.0, 2.0, 2.0));
    let settings = FillSettings {
        spacing_value: 10.0,
        use_element_size: false,
        ..FillSettings::default()
    };

    let session = execute_fill(engine(100.0), &mut doc, &[element.clone()], settings).unwrap();
    assert_eq!(session.len(), 10);
    assert_eq!(doc.shape_count(), 11);

    let session = session.adjust_count(&mut doc, &[element.clone()], 4).unwrap();
    assert_eq!(session.len(), 4);
    assert_eq!(doc.shape_count(), 5);

    let removed = session.clear(&mut doc);
    assert_eq!(removed, 4);
    assert_eq!(doc.shape_count(), 1);
    assert_eq!(doc.open_group_count(), 0);
    assert!(!doc.is_optimizing());
}

#[test]
fn test_non_positive_fixed_spacing_is_invalid() {
    let settings = FillSettings {
        spacing_value: 0.0,
        use_element_size: false,
        ..FillSettings::default()
    };
    let err = engine(10.0).calculate_placements(&settings).unwrap_err();
    assert!(matches!(err, PlacementError::InvalidParameter { .. }));
    let _: Error = err.into();
}

proptest! {
    #[test]
    fn prop_fixed_spacing_count(
        length in 20u32..500,
        spacing in 1u32..20,
        start in 0u32..5,
        end in 0u32..5,
    ) {
        let usable = length - start - end;
        prop_assume!(usable % spacing != 0);

        let settings = FillSettings {
            spacing_value: f64::from(spacing),
            start_padding: f64::from(start),
            end_padding: f64::from(end),
            use_element_size: false,
            remove_overlaps: false,
            ..FillSettings::default()
        };
        let placements = engine(f64::from(length)).calculate_placements(&settings).unwrap();
        prop_assert_eq!(placements.len(), (usable / spacing + 1) as usize);
    }
}
