//! In-memory host document
//!
//! A minimal host adapter that keeps shapes as bounding boxes (optionally with
//! a polygon outline) and records optimization and undo-group scopes. The
//! job runner materializes into it, and the integration tests use it to check
//! materialization, count adjustment and distribution without a drawing
//! application.

use crate::host::{HostSession, ShapeGrouping, ShapeHandle};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use stonepath_core::geometry::{point_in_polygon, rotate_point};
use stonepath_core::{Bounds, HostError, Point};

#[derive(Debug, Clone)]
struct ShapeRecord {
    bounds: Bounds,
    rotation: f64,
    outline: Option<Vec<Point>>,
}

impl ShapeRecord {
    fn refresh_bounds(&mut self) {
        if let Some(b) = self.outline.as_deref().and_then(Bounds::from_points) {
            self.bounds = b;
        }
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    shapes: BTreeMap<u64, ShapeRecord>,
    next_id: u64,
    optimization_depth: usize,
    open_groups: Vec<String>,
    committed_groups: Vec<String>,
    fail_duplicates: bool,
    /// Refuse the duplicate call after this many more have succeeded
    duplicates_until_failure: Option<usize>,
    shape_groups: BTreeMap<u64, Vec<u64>>,
    selection: Vec<u64>,
}

impl DocumentState {
    fn insert(&mut self, record: ShapeRecord) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.shapes.insert(id, record);
        id
    }

    fn refuse_duplicate(&mut self) -> bool {
        if self.fail_duplicates {
            return true;
        }
        match self.duplicates_until_failure.as_mut() {
            Some(0) => {
                self.duplicates_until_failure = None;
                true
            }
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}

/// Shared document holding every shape created through it
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    state: Rc<RefCell<DocumentState>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rectangular shape
    pub fn add_shape(&self, bounds: Bounds) -> MemoryShape {
        let id = self.state.borrow_mut().insert(ShapeRecord {
            bounds,
            rotation: 0.0,
            outline: None,
        });
        self.handle(id)
    }

    /// Add a shape with a polygon outline; containment follows the outline
    pub fn add_outline(&self, vertices: Vec<Point>) -> MemoryShape {
        let bounds = Bounds::from_points(&vertices).unwrap_or_default();
        let id = self.state.borrow_mut().insert(ShapeRecord {
            bounds,
            rotation: 0.0,
            outline: Some(vertices),
        });
        self.handle(id)
    }

    fn handle(&self, id: u64) -> MemoryShape {
        MemoryShape {
            id,
            state: Rc::clone(&self.state),
        }
    }

    pub fn shape_count(&self) -> usize {
        self.state.borrow().shapes.len()
    }

    /// Bounds of every live shape in creation order
    pub fn all_bounds(&self) -> Vec<Bounds> {
        self.state.borrow().shapes.values().map(|r| r.bounds).collect()
    }

    pub fn is_optimizing(&self) -> bool {
        self.state.borrow().optimization_depth > 0
    }

    pub fn open_group_count(&self) -> usize {
        self.state.borrow().open_groups.len()
    }

    /// Names of the closed undo groups, oldest first
    pub fn committed_groups(&self) -> Vec<String> {
        self.state.borrow().committed_groups.clone()
    }

    /// Make every following duplicate call fail
    pub fn set_fail_duplicates(&self, fail: bool) {
        self.state.borrow_mut().fail_duplicates = fail;
    }

    /// Let `successes` more duplicate calls through, refuse the next one,
    /// then behave normally again
    pub fn fail_duplicate_after(&self, successes: usize) {
        self.state.borrow_mut().duplicates_until_failure = Some(successes);
    }

    /// Ids of the currently selected shapes
    pub fn selection(&self) -> Vec<u64> {
        self.state.borrow().selection.clone()
    }

    /// Member ids of the group shape `group_id`
    pub fn group_members(&self, group_id: u64) -> Option<Vec<u64>> {
        self.state.borrow().shape_groups.get(&group_id).cloned()
    }

    fn live_bounds(state: &DocumentState, shapes: &[MemoryShape]) -> Result<Vec<Bounds>, HostError> {
        shapes
            .iter()
            .map(|shape| {
                state
                    .shapes
                    .get(&shape.id)
                    .map(|r| r.bounds)
                    .ok_or_else(|| HostError::ShapeAccess {
                        reason: format!("shape {} no longer exists", shape.id),
                    })
            })
            .collect()
    }
}

impl HostSession for MemoryDocument {
    fn begin_optimization(&mut self) {
        self.state.borrow_mut().optimization_depth += 1;
    }

    fn end_optimization(&mut self) {
        let mut state = self.state.borrow_mut();
        state.optimization_depth = state.optimization_depth.saturating_sub(1);
    }

    fn begin_command_group(&mut self, name: &str) {
        self.state.borrow_mut().open_groups.push(name.to_string());
    }

    fn end_command_group(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(name) = state.open_groups.pop() {
            state.committed_groups.push(name);
        }
    }
}

impl ShapeGrouping<MemoryShape> for MemoryDocument {
    fn group(&mut self, shapes: &[MemoryShape]) -> Result<MemoryShape, HostError> {
        let mut state = self.state.borrow_mut();
        let bounds = Self::live_bounds(&state, shapes)?
            .into_iter()
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| HostError::ShapeAccess {
                reason: "cannot group an empty shape set".to_string(),
            })?;
        let id = state.insert(ShapeRecord {
            bounds,
            rotation: 0.0,
            outline: None,
        });
        state
            .shape_groups
            .insert(id, shapes.iter().map(MemoryShape::id).collect());
        drop(state);
        Ok(self.handle(id))
    }

    fn select(&mut self, shapes: &[MemoryShape]) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        Self::live_bounds(&state, shapes)?;
        state.selection = shapes.iter().map(MemoryShape::id).collect();
        Ok(())
    }
}

/// Handle to a shape in a [`MemoryDocument`]
#[derive(Debug, Clone)]
pub struct MemoryShape {
    id: u64,
    state: Rc<RefCell<DocumentState>>,
}

impl MemoryShape {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Accumulated rotation in degrees
    pub fn rotation(&self) -> Result<f64, HostError> {
        self.with_record(|r| r.rotation)
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut ShapeRecord) -> T) -> Result<T, HostError> {
        let mut state = self.state.borrow_mut();
        state
            .shapes
            .get_mut(&self.id)
            .map(f)
            .ok_or_else(|| HostError::ShapeAccess {
                reason: format!("shape {} no longer exists", self.id),
            })
    }
}

impl ShapeHandle for MemoryShape {
    fn bounds(&self) -> Result<Bounds, HostError> {
        self.with_record(|r| r.bounds)
    }

    fn duplicate(&self) -> Result<Self, HostError> {
        let mut state = self.state.borrow_mut();
        if state.refuse_duplicate() {
            return Err(HostError::Duplicate {
                reason: format!("duplicating shape {} was refused", self.id),
            });
        }
        let record = state
            .shapes
            .get(&self.id)
            .cloned()
            .ok_or_else(|| HostError::Duplicate {
                reason: format!("shape {} no longer exists", self.id),
            })?;
        let id = state.insert(record);
        Ok(MemoryShape {
            id,
            state: Rc::clone(&self.state),
        })
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> Result<(), HostError> {
        self.with_record(|r| {
            r.bounds = r.bounds.translated(dx, dy);
            if let Some(outline) = r.outline.as_mut() {
                for p in outline.iter_mut() {
                    p.x += dx;
                    p.y += dy;
                }
            }
        })
    }

    fn rotate(&mut self, angle_deg: f64, cx: f64, cy: f64) -> Result<(), HostError> {
        let pivot = Point::new(cx, cy);
        self.with_record(|r| {
            r.rotation += angle_deg;
            match r.outline.as_mut() {
                Some(outline) => {
                    for p in outline.iter_mut() {
                        *p = rotate_point(*p, angle_deg, pivot);
                    }
                    r.refresh_bounds();
                }
                None => {
                    // boxes keep their extent; only the center travels
                    let center = r.bounds.center();
                    let moved = rotate_point(center, angle_deg, pivot);
                    r.bounds = r.bounds.translated(moved.x - center.x, moved.y - center.y);
                }
            }
        })
    }

    fn scale(&mut self, factor: f64) -> Result<(), HostError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(HostError::Transform {
                reason: format!("invalid scale factor {factor}"),
            });
        }
        self.with_record(|r| {
            let c = r.bounds.center();
            let half_w = r.bounds.width() * factor / 2.0;
            let half_h = r.bounds.height() * factor / 2.0;
            r.bounds = Bounds::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h);
            if let Some(outline) = r.outline.as_mut() {
                for p in outline.iter_mut() {
                    p.x = c.x + (p.x - c.x) * factor;
                    p.y = c.y + (p.y - c.y) * factor;
                }
            }
        })
    }

    fn is_point_inside(&self, x: f64, y: f64) -> Result<bool, HostError> {
        self.with_record(|r| match r.outline.as_deref() {
            Some(outline) => point_in_polygon(x, y, outline),
            None => r.bounds.contains_point(x, y),
        })
        .map_err(|err| HostError::Containment {
            reason: err.to_string(),
        })
    }

    fn delete(self) -> Result<(), HostError> {
        self.state
            .borrow_mut()
            .shapes
            .remove(&self.id)
            .map(|_| ())
            .ok_or_else(|| HostError::Delete {
                reason: format!("shape {} no longer exists", self.id),
            })
    }
}
