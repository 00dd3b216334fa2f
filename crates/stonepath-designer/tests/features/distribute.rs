// Integration tests for even and random distribution

use stonepath_designer::{
    distribute_evenly, distribute_randomly, random_distribution, Bounds, DistributeAxis,
    MemoryDocument, Point, Polygon, RandomDistributeParams, ShapeHandle,
};

#[test]
fn test_vertical_center_to_center() {
    let mut doc = MemoryDocument::new();
    let mut shapes = vec![
        doc.add_shape(Bounds::new(0.0, 10.0, 2.0, 12.0)),
        doc.add_shape(Bounds::new(0.0, 0.0, 2.0, 2.0)),
        doc.add_shape(Bounds::new(0.0, 4.0, 2.0, 6.0)),
    ];
    distribute_evenly(&mut shapes, &mut doc, DistributeAxis::Vertical, 3.0, false).unwrap();
    let ys: Vec<f64> = shapes.iter().map(|s| s.bounds().unwrap().center().y).collect();
    assert_eq!(ys, vec![7.0, 1.0, 4.0]);
}

#[test]
fn test_random_distribution_inside_polygon() {
    let diamond = Polygon::new(vec![
        Point::new(50.0, 0.0),
        Point::new(100.0, 50.0),
        Point::new(50.0, 100.0),
        Point::new(0.0, 50.0),
    ]);
    let sizes = vec![Bounds::new(0.0, 0.0, 3.0, 3.0); 15];
    let params = RandomDistributeParams {
        gap: 1.0,
        seed: Some(11),
        ..RandomDistributeParams::default()
    };
    let result = random_distribution(&sizes, &Bounds::new(0.0, 0.0, 100.0, 100.0), Some(&diamond), &params);
    assert_eq!(result.placed_count(), 15);
    for target in result.targets.iter().flatten() {
        assert!((target.x - 50.0).abs() + (target.y - 50.0).abs() <= 50.0);
    }
}

#[test]
fn test_center_gap_without_element_size() {
    let sizes = vec![Bounds::new(0.0, 0.0, 1.0, 1.0); 10];
    let params = RandomDistributeParams {
        gap: 8.0,
        use_element_size: false,
        seed: Some(2),
        ..RandomDistributeParams::default()
    };
    let result = random_distribution(&sizes, &Bounds::new(0.0, 0.0, 60.0, 60.0), None, &params);
    let placed: Vec<Point> = result.targets.iter().flatten().copied().collect();
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            assert!(a.distance_to(b) >= 8.0);
        }
    }
}

#[test]
fn test_unplaced_shapes_stay_put() {
    let mut doc = MemoryDocument::new();
    let mut shapes = vec![
        doc.add_shape(Bounds::new(0.0, 0.0, 5.0, 5.0)),
        doc.add_shape(Bounds::new(0.0, 0.0, 5.0, 5.0)),
    ];
    let params = RandomDistributeParams {
        seed: Some(5),
        max_tries: 20,
        ..RandomDistributeParams::default()
    };
    let result = distribute_randomly(&mut shapes, &mut doc, None, &params).unwrap();
    // the union region only fits one box
    assert_eq!(result.placed_count(), 1);
    assert_eq!(result.unplaced(), vec![1]);
    assert_eq!(shapes[1].bounds().unwrap(), Bounds::new(0.0, 0.0, 5.0, 5.0));
}
