//! Materialize a stone layout into a host document

use super::RhinestoneLayout;
use crate::curve_fill::AlignmentMode;
use crate::host::{place_copy, BatchScope, HostSession, ShapeHandle};
use stonepath_core::{PlacementError, Point, Result};

const RHINESTONE_GROUP: &str = "Rhinestone Fill";

/// Duplicate a source stone for every placement, sized to the placement's
/// diameter and centered on it.
///
/// The source is `sources[element_index]` when the stone came from an
/// element, otherwise sources cycle by placement order. Stones the host
/// refuses are logged and skipped.
pub fn place_stones<S, H>(layout: &RhinestoneLayout, host: &mut H, sources: &[S]) -> Result<Vec<S>>
where
    S: ShapeHandle,
    H: HostSession + ?Sized,
{
    if sources.is_empty() {
        return Err(PlacementError::NoFillElements.into());
    }
    if layout.is_empty() {
        tracing::warn!("No stones to place");
        return Ok(Vec::new());
    }

    // Unreadable sources place unscaled
    let source_sizes: Vec<f64> = sources
        .iter()
        .map(|s| s.bounds().map_or(0.0, |b| b.mean_dimension()))
        .collect();

    let _scope = BatchScope::enter(host, RHINESTONE_GROUP);
    let mut placed = Vec::with_capacity(layout.len());

    for (i, stone) in layout.iter().enumerate() {
        let source_idx = stone.element_index.unwrap_or(i) % sources.len();
        let desired = stone.effective_diameter();
        let base = source_sizes[source_idx];
        let scale = if desired > 0.0 && base > 0.0 {
            desired / base
        } else {
            1.0
        };

        match place_copy(
            &sources[source_idx],
            Point::new(stone.x, stone.y),
            stone.rotation,
            scale,
            AlignmentMode::Center,
        ) {
            Ok(shape) => placed.push(shape),
            Err(err) => tracing::warn!("Skipping stone {}: {}", i, err),
        }
    }

    tracing::info!("Placed {} of {} rhinestones", placed.len(), layout.len());
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::rhinestone::RhinestonePlacement;
    use stonepath_core::{Bounds, Error};

    #[test]
    fn test_stones_are_sized_and_centered() {
        let mut doc = MemoryDocument::new();
        let source = doc.add_shape(Bounds::new(0.0, 0.0, 1.0, 1.0));
        let layout = RhinestoneLayout::new(vec![RhinestonePlacement {
            x: 10.0,
            y: 20.0,
            stone_size: "SS10".to_string(),
            rotation: 0.0,
            element_index: None,
            diameter: None,
        }]);

        let placed = place_stones(&layout, &mut doc, &[source]).unwrap();
        assert_eq!(placed.len(), 1);
        let b = placed[0].bounds().unwrap();
        assert!((b.width() - 2.8).abs() < 1e-9);
        assert!((b.center().x - 10.0).abs() < 1e-9);
        assert!((b.center().y - 20.0).abs() < 1e-9);
        assert_eq!(doc.committed_groups(), vec![RHINESTONE_GROUP.to_string()]);
    }

    #[test]
    fn test_no_sources_is_an_error() {
        let mut doc = MemoryDocument::new();
        let sources: Vec<crate::memory::MemoryShape> = Vec::new();
        let err = place_stones(&RhinestoneLayout::default(), &mut doc, &sources).unwrap_err();
        assert!(matches!(err, Error::Placement(PlacementError::NoFillElements)));
    }
}
