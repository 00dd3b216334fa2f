// Integration tests for array operations

use stonepath_designer::{
    create_array, ArrayGenerator, ArrayOperation, ArrayType, Bounds, CircularArrayParams, Curve,
    CurveSegment, GridArrayParams, LinearArrayParams, LinearDirection, MemoryDocument,
    PathArrayParams, Point, ShapeHandle,
};

fn base() -> Bounds {
    Bounds::new(-1.0, -1.0, 1.0, 1.0)
}

#[test]
fn test_array_types() {
    let ops = [
        ArrayOperation::Linear(LinearArrayParams::new(2, LinearDirection::Horizontal, 1.0)),
        ArrayOperation::Grid(GridArrayParams::new(2, 2, 1.0, 1.0)),
        ArrayOperation::Circular(CircularArrayParams::new(3, 5.0)),
    ];
    let types: Vec<ArrayType> = ops.iter().map(ArrayOperation::array_type).collect();
    assert_eq!(types, vec![ArrayType::Linear, ArrayType::Grid, ArrayType::Circular]);
}

#[test]
fn test_grid_with_element_size_spacing() {
    let mut params = GridArrayParams::new(3, 2, 0.5, 1.0);
    params.use_element_size = true;
    let copies = ArrayGenerator::generate(&ArrayOperation::Grid(params), &base()).unwrap();
    assert_eq!(copies.len(), 6);
    assert_eq!(copies[2].center, Point::new(5.0, 0.0));
    assert_eq!(copies[5].center, Point::new(5.0, 3.0));
}

#[test]
fn test_circular_copies_sit_on_the_circle() {
    let mut params = CircularArrayParams::new(6, 10.0);
    params.center = Some(Point::new(20.0, 0.0));
    let copies = ArrayGenerator::generate(&ArrayOperation::Circular(params), &base()).unwrap();
    assert_eq!(copies.len(), 6);
    for copy in &copies[1..] {
        assert!((copy.center.distance_to(&Point::new(20.0, 0.0)) - 10.0).abs() < 1e-9);
    }
}

#[test]
fn test_path_array_follows_tangent() {
    let path = Curve::new(vec![CurveSegment::line(
        Point::new(0.0, 0.0),
        Point::new(0.0, 20.0),
    )]);
    let mut params = PathArrayParams::new(path, 5.0);
    params.rotate_copies = true;
    let copies = ArrayGenerator::generate(&ArrayOperation::Path(params), &base()).unwrap();
    assert_eq!(copies.len(), 5);
    assert!(copies[1..].iter().all(|c| (c.rotation - 90.0).abs() < 1e-9));
}

#[test]
fn test_create_circular_array_in_document() {
    let mut doc = MemoryDocument::new();
    let source = doc.add_shape(base());
    let mut params = CircularArrayParams::new(4, 10.0);
    params.rotate_copies = true;
    let copies = create_array(&ArrayOperation::Circular(params), &source, &mut doc, true).unwrap();
    assert_eq!(copies.len(), 3);
    assert_eq!(doc.shape_count(), 4);
    let c = copies[1].bounds().unwrap().center();
    assert!((c.x + 10.0).abs() < 1e-9 && c.y.abs() < 1e-9);
}
