// Integration tests for the spatial hash and overlap filtering

use proptest::prelude::*;
use stonepath_designer::{filter_overlaps, non_overlapping_boxes, Bounds, OverlapIndex, Point};

#[derive(Debug, Clone, Copy)]
struct Disc {
    center: Point,
    diameter: f64,
}

fn disc_strategy() -> impl Strategy<Value = Disc> {
    (0.0..100.0f64, 0.0..100.0f64, 0.5..6.0f64).prop_map(|(x, y, d)| Disc {
        center: Point::new(x, y),
        diameter: d,
    })
}

proptest! {
    #[test]
    fn prop_filtered_discs_are_separated(
        discs in prop::collection::vec(disc_strategy(), 0..200),
        gap in 0.0..2.0f64,
    ) {
        let kept = filter_overlaps(discs.clone(), gap, |d| d.center, |d| d.diameter);
        prop_assert!(kept.len() <= discs.len());
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                let required = (a.diameter + b.diameter) / 2.0 + gap;
                prop_assert!(a.center.distance_to(&b.center) >= required - 1e-9);
            }
        }
    }

    #[test]
    fn prop_overlap_index_keeps_separation(
        discs in prop::collection::vec(disc_strategy(), 0..200),
    ) {
        let mut index = OverlapIndex::new(6.0, 0.25);
        let mut accepted = Vec::new();
        for d in &discs {
            if index.insert_if_clear(d.center.x, d.center.y, d.diameter) {
                accepted.push(*d);
            }
        }
        prop_assert_eq!(index.len(), accepted.len());
        for (i, a) in accepted.iter().enumerate() {
            for b in &accepted[i + 1..] {
                let required = (a.diameter + b.diameter) / 2.0 + 0.25;
                prop_assert!(a.center.distance_to(&b.center) >= required - 1e-9);
            }
        }
    }
}

#[test]
fn test_first_come_first_kept() {
    let discs = vec![
        Disc { center: Point::new(0.0, 0.0), diameter: 2.0 },
        Disc { center: Point::new(1.0, 0.0), diameter: 2.0 },
        Disc { center: Point::new(3.0, 0.0), diameter: 2.0 },
    ];
    let kept = filter_overlaps(discs, 0.0, |d| d.center, |d| d.diameter);
    let xs: Vec<f64> = kept.iter().map(|d| d.center.x).collect();
    assert_eq!(xs, vec![0.0, 3.0]);
}

#[test]
fn test_touching_boxes_do_not_overlap() {
    let boxes = vec![
        Bounds::new(0.0, 0.0, 2.0, 2.0),
        Bounds::new(2.0, 0.0, 4.0, 2.0),
        Bounds::new(3.0, 1.0, 5.0, 3.0),
    ];
    assert_eq!(non_overlapping_boxes(&boxes), vec![true, true, false]);
}
