//! Curve fill sessions
//!
//! [`execute_fill`] computes placements and materializes them into a host
//! document inside one optimization scope and one undo group. The returned
//! [`FillSession`] owns the created handles and the settings used, so count
//! adjustment and clearing take the session instead of relying on engine
//! state.

use crate::curve_fill::{CurveFillEngine, FillSettings, PlacementPoint};
use crate::host::{place_copy, BatchScope, HostSession, ShapeGrouping, ShapeHandle};
use serde::Serialize;
use stonepath_core::{PlacementError, Result};
use uuid::Uuid;

const FILL_GROUP: &str = "Curve Fill";
const ADJUST_GROUP: &str = "Adjust Element Count";
const CLEAR_GROUP: &str = "Clear Fill";

/// Summary of a fill session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillStatistics {
    pub session_id: Uuid,
    pub element_count: usize,
    pub curve_length: f64,
    pub fill_element_count: usize,
    pub spacing_mode: String,
    pub angle_mode: String,
    /// Placements skipped because the host refused them
    pub failed_placements: usize,
}

/// Result of one executed curve fill
#[derive(Debug)]
pub struct FillSession<S: ShapeHandle> {
    id: Uuid,
    engine: CurveFillEngine,
    settings: FillSettings,
    placements: Vec<PlacementPoint>,
    shapes: Vec<S>,
    failed: usize,
}

/// Compute placements for `settings` and materialize them by duplicating
/// `elements[placement.element_index]`.
///
/// Individual placements the host refuses are logged and dropped, so
/// `placements()[i]` always describes `shapes()[i]`.
pub fn execute_fill<S, H>(
    engine: CurveFillEngine,
    host: &mut H,
    elements: &[S],
    settings: FillSettings,
) -> Result<FillSession<S>>
where
    S: ShapeHandle,
    H: HostSession + ?Sized,
{
    check_elements(&engine, elements)?;
    let placements = engine.calculate_placements(&settings)?;

    let mut session = FillSession {
        id: Uuid::new_v4(),
        engine,
        settings,
        placements,
        shapes: Vec::new(),
        failed: 0,
    };

    if session.placements.is_empty() {
        tracing::warn!("No placements to execute");
        return Ok(session);
    }

    let _scope = BatchScope::enter(host, FILL_GROUP);
    session.materialize(elements);
    Ok(session)
}

fn check_elements<S: ShapeHandle>(engine: &CurveFillEngine, elements: &[S]) -> Result<()> {
    if elements.len() != engine.element_count() {
        return Err(PlacementError::invalid(
            "elements",
            format!(
                "engine was built for {} fill elements, got {}",
                engine.element_count(),
                elements.len()
            ),
        )
        .into());
    }
    Ok(())
}

impl<S: ShapeHandle> FillSession<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &FillSettings {
        &self.settings
    }

    pub fn placements(&self) -> &[PlacementPoint] {
        &self.placements
    }

    /// Handles of the placed copies
    pub fn shapes(&self) -> &[S] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Give up ownership of the placed copies
    pub fn into_shapes(self) -> Vec<S> {
        self.shapes
    }

    fn materialize(&mut self, elements: &[S]) {
        let total = self.placements.len();
        let mut placed = Vec::with_capacity(total);
        for (i, placement) in std::mem::take(&mut self.placements).into_iter().enumerate() {
            let Some(source) = elements.get(placement.element_index) else {
                self.failed += 1;
                tracing::warn!("Placement {} selects missing element {}", i, placement.element_index);
                continue;
            };
            match place_copy(
                source,
                placement.position,
                placement.rotation,
                placement.scale,
                self.settings.alignment,
            ) {
                Ok(shape) => {
                    self.shapes.push(shape);
                    placed.push(placement);
                }
                Err(err) => {
                    self.failed += 1;
                    tracing::warn!("Skipping placement {}: {}", i, err);
                }
            }
            if (i + 1) % 10 == 0 {
                tracing::debug!("Placed {}/{} elements", i + 1, total);
            }
        }
        self.placements = placed;
        tracing::info!(
            "Placed {} elements ({} skipped)",
            self.shapes.len(),
            self.failed
        );
    }

    /// Group the placed copies. Returns `None` when nothing was placed.
    pub fn group_placed<H>(&self, host: &mut H) -> Result<Option<S>>
    where
        H: ShapeGrouping<S> + ?Sized,
    {
        if self.shapes.is_empty() {
            tracing::warn!("No placed elements to group");
            return Ok(None);
        }
        let group = host.group(&self.shapes)?;
        tracing::info!("Grouped {} placed elements", self.shapes.len());
        Ok(Some(group))
    }

    /// Make the placed copies the current selection
    pub fn select_placed<H>(&self, host: &mut H) -> Result<()>
    where
        H: ShapeGrouping<S> + ?Sized,
    {
        if self.shapes.is_empty() {
            return Ok(());
        }
        host.select(&self.shapes)?;
        Ok(())
    }

    /// Change the number of placed elements.
    ///
    /// Shrinking deletes copies from the tail and keeps the session id.
    /// Growing recomputes every placement with `element_count = new_count`,
    /// deletes all old copies and places the new ones; the result is a new
    /// session.
    pub fn adjust_count<H>(self, host: &mut H, elements: &[S], new_count: usize) -> Result<Self>
    where
        H: HostSession + ?Sized,
    {
        if self.shapes.is_empty() {
            return Err(PlacementError::NoPreviousFill.into());
        }
        check_elements(&self.engine, elements)?;

        let current = self.shapes.len();
        if new_count == current {
            return Ok(self);
        }

        let mut session = self;
        if new_count < current {
            let _scope = BatchScope::enter(host, ADJUST_GROUP);
            let excess = session.shapes.split_off(new_count);
            delete_all(excess);
            session.placements.truncate(new_count);
        } else {
            let mut settings = session.settings.clone();
            settings.element_count = new_count;
            let placements = session.engine.calculate_placements(&settings)?;

            let _scope = BatchScope::enter(host, ADJUST_GROUP);
            delete_all(std::mem::take(&mut session.shapes));
            session = FillSession {
                id: Uuid::new_v4(),
                engine: session.engine,
                settings,
                placements,
                shapes: Vec::new(),
                failed: 0,
            };
            session.materialize(elements);
        }

        tracing::info!("Element count adjusted from {} to {}", current, session.len());
        Ok(session)
    }

    /// Delete every placed copy. Returns the number deleted.
    pub fn clear<H>(self, host: &mut H) -> usize
    where
        H: HostSession + ?Sized,
    {
        let _scope = BatchScope::enter(host, CLEAR_GROUP);
        let deleted = delete_all(self.shapes);
        tracing::info!("Cleared {} placed elements", deleted);
        deleted
    }

    pub fn statistics(&self) -> FillStatistics {
        FillStatistics {
            session_id: self.id,
            element_count: self.shapes.len(),
            curve_length: self.engine.curve().total_length(),
            fill_element_count: self.engine.element_count(),
            spacing_mode: self.settings.spacing_mode.as_str().to_string(),
            angle_mode: self.settings.angle_mode.as_str().to_string(),
            failed_placements: self.failed,
        }
    }
}

/// Delete shapes, logging failures. Returns the number deleted.
fn delete_all<S: ShapeHandle>(shapes: Vec<S>) -> usize {
    let mut deleted = 0;
    for shape in shapes {
        match shape.delete() {
            Ok(()) => deleted += 1,
            Err(err) => tracing::warn!("Could not delete placed element: {}", err),
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Curve, CurveSegment};
    use crate::memory::{MemoryDocument, MemoryShape};
    use stonepath_core::{Bounds, Error, Point};

    fn setup() -> (MemoryDocument, Vec<MemoryShape>, CurveFillEngine) {
        let doc = MemoryDocument::new();
        let element = doc.add_shape(Bounds::new(-1.0, -1.0, 1.0, 1.0));
        let curve = Curve::new(vec![CurveSegment::line(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        )]);
        let engine = CurveFillEngine::new(curve, vec![element.bounds().unwrap()]).unwrap();
        (doc, vec![element], engine)
    }

    fn settings() -> FillSettings {
        FillSettings {
            spacing_value: 25.0,
            use_element_size: false,
            ..FillSettings::default()
        }
    }

    #[test]
    fn test_execute_places_copies_inside_one_group() {
        let (mut doc, elements, engine) = setup();
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        assert_eq!(session.len(), 4);
        assert_eq!(doc.shape_count(), 5);
        assert_eq!(doc.committed_groups(), vec![FILL_GROUP.to_string()]);
        assert!(!doc.is_optimizing());

        let centers: Vec<f64> = session
            .shapes()
            .iter()
            .map(|s| s.bounds().unwrap().center().x)
            .collect();
        assert_eq!(centers, vec![0.0, 25.0, 50.0, 75.0]);
    }

    #[test]
    fn test_refused_duplicates_are_skipped() {
        let (mut doc, elements, engine) = setup();
        doc.set_fail_duplicates(true);
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        assert!(session.is_empty());
        assert_eq!(session.failed_count(), 4);
        assert_eq!(doc.open_group_count(), 0);
    }

    #[test]
    fn test_partial_failure_keeps_placements_aligned() {
        let (mut doc, elements, engine) = setup();
        doc.fail_duplicate_after(1);
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        assert_eq!(session.len(), 3);
        assert_eq!(session.failed_count(), 1);
        let xs: Vec<f64> = session.placements().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 50.0, 75.0]);

        let session = session.adjust_count(&mut doc, &elements, 2).unwrap();
        let placed: Vec<f64> = session
            .shapes()
            .iter()
            .map(|s| s.bounds().unwrap().center().x)
            .collect();
        let planned: Vec<f64> = session.placements().iter().map(|p| p.position.x).collect();
        assert_eq!(placed, vec![0.0, 50.0]);
        assert_eq!(planned, placed);
    }

    #[test]
    fn test_group_and_select_placed() {
        let (mut doc, elements, engine) = setup();
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        let group = session.group_placed(&mut doc).unwrap().unwrap();
        let ids: Vec<u64> = session.shapes().iter().map(MemoryShape::id).collect();
        assert_eq!(doc.group_members(group.id()), Some(ids.clone()));
        assert_eq!(group.bounds().unwrap(), Bounds::new(-1.0, -1.0, 76.0, 1.0));

        session.select_placed(&mut doc).unwrap();
        assert_eq!(doc.selection(), ids);
    }

    #[test]
    fn test_group_of_empty_session_is_none() {
        let (mut doc, elements, engine) = setup();
        doc.set_fail_duplicates(true);
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        assert!(session.group_placed(&mut doc).unwrap().is_none());
        session.select_placed(&mut doc).unwrap();
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn test_adjust_count_shrink_keeps_id() {
        let (mut doc, elements, engine) = setup();
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        let id = session.id();
        let session = session.adjust_count(&mut doc, &elements, 2).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.id(), id);
        assert_eq!(doc.shape_count(), 3);
    }

    #[test]
    fn test_adjust_count_grow_regenerates() {
        let (mut doc, elements, engine) = setup();
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        let id = session.id();
        let session = session.adjust_count(&mut doc, &elements, 8).unwrap();
        assert_eq!(session.len(), 8);
        assert_ne!(session.id(), id);
        assert_eq!(session.settings().element_count, 8);
        assert_eq!(doc.shape_count(), 9);
        assert_eq!(
            doc.committed_groups(),
            vec![FILL_GROUP.to_string(), ADJUST_GROUP.to_string()]
        );
    }

    #[test]
    fn test_adjust_empty_session_fails() {
        let (mut doc, elements, engine) = setup();
        let empty = FillSettings {
            start_padding: 200.0,
            ..settings()
        };
        let session = execute_fill(engine, &mut doc, &elements, empty).unwrap();
        let err = session.adjust_count(&mut doc, &elements, 3).unwrap_err();
        assert!(matches!(err, Error::Placement(PlacementError::NoPreviousFill)));
    }

    #[test]
    fn test_clear_and_statistics() {
        let (mut doc, elements, engine) = setup();
        let session = execute_fill(engine, &mut doc, &elements, settings()).unwrap();
        let stats = session.statistics();
        assert_eq!(stats.element_count, 4);
        assert_eq!(stats.curve_length, 100.0);
        assert_eq!(stats.spacing_mode, "fixed");
        assert_eq!(stats.angle_mode, "follow_curve");

        assert_eq!(session.clear(&mut doc), 4);
        assert_eq!(doc.shape_count(), 1);
    }
}
