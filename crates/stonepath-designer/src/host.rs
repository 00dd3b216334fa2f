//! Host binding capabilities
//!
//! The engines never talk to a drawing application directly. A host adapter
//! implements these narrow traits:
//! - [`ShapeHandle`]: one shape (bounds, duplicate, transform, delete,
//!   containment)
//! - [`HostSession`]: the deferred-redraw and undo-group switches
//! - [`ShapeGrouping`]: grouping and selecting sets of shapes
//! - [`ContainmentTest`]: anything that can answer "is this point inside"
//!
//! Host failures come back as [`HostError`] values. Call sites choose the
//! fallback explicitly, e.g. through a [`ContainmentChecker`] with a
//! [`FallbackPolicy`].

use crate::curve_fill::AlignmentMode;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use stonepath_core::geometry::point_in_polygon;
use stonepath_core::{Bounds, HostError, Point};

/// Handle to one shape in the host document
pub trait ShapeHandle: Sized {
    /// Bounding box in document units
    fn bounds(&self) -> Result<Bounds, HostError>;

    /// Duplicate the shape in place
    fn duplicate(&self) -> Result<Self, HostError>;

    /// Translate by (dx, dy)
    fn move_by(&mut self, dx: f64, dy: f64) -> Result<(), HostError>;

    /// Rotate by `angle_deg` around (cx, cy)
    fn rotate(&mut self, angle_deg: f64, cx: f64, cy: f64) -> Result<(), HostError>;

    /// Uniform scale around the shape's own center
    fn scale(&mut self, factor: f64) -> Result<(), HostError>;

    /// Point-containment test against the shape outline
    fn is_point_inside(&self, x: f64, y: f64) -> Result<bool, HostError>;

    /// Remove the shape from the document
    fn delete(self) -> Result<(), HostError>;
}

/// Application-wide switches wrapped around a materialization batch
pub trait HostSession {
    /// Defer redraw and event processing
    fn begin_optimization(&mut self);
    /// Restore redraw and refresh
    fn end_optimization(&mut self);
    /// Open an atomic undo group
    fn begin_command_group(&mut self, name: &str);
    /// Close the undo group
    fn end_command_group(&mut self);
}

/// Document-level operations on sets of shapes
pub trait ShapeGrouping<S: ShapeHandle> {
    /// Combine `shapes` into one group and return the group's handle
    fn group(&mut self, shapes: &[S]) -> Result<S, HostError>;

    /// Replace the current selection with `shapes`
    fn select(&mut self, shapes: &[S]) -> Result<(), HostError>;
}

/// Scope that holds optimization mode and a command group open for the
/// lifetime of a batch. Both are released on drop, on every exit path.
pub struct BatchScope<'a, H: HostSession + ?Sized> {
    host: &'a mut H,
}

impl<'a, H: HostSession + ?Sized> BatchScope<'a, H> {
    /// Enter optimization mode, then open the command group
    pub fn enter(host: &'a mut H, name: &str) -> Self {
        host.begin_optimization();
        host.begin_command_group(name);
        tracing::debug!("Entered batch scope '{}'", name);
        Self { host }
    }
}

impl<H: HostSession + ?Sized> Deref for BatchScope<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: HostSession + ?Sized> DerefMut for BatchScope<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: HostSession + ?Sized> Drop for BatchScope<'_, H> {
    fn drop(&mut self) {
        self.host.end_command_group();
        self.host.end_optimization();
    }
}

/// Duplicate `source` and transform the copy so that its `alignment` anchor
/// sits on `target`: scale first, then move, then rotate around `target`.
///
/// A copy that fails mid-way is deleted again before the error is returned.
pub fn place_copy<S: ShapeHandle>(
    source: &S,
    target: Point,
    rotation: f64,
    scale: f64,
    alignment: AlignmentMode,
) -> Result<S, HostError> {
    let mut copy = source.duplicate()?;
    match transform_copy(&mut copy, target, rotation, scale, alignment) {
        Ok(()) => Ok(copy),
        Err(err) => {
            if let Err(cleanup) = copy.delete() {
                tracing::debug!("Could not remove partial copy: {}", cleanup);
            }
            Err(err)
        }
    }
}

fn transform_copy<S: ShapeHandle>(
    copy: &mut S,
    target: Point,
    rotation: f64,
    scale: f64,
    alignment: AlignmentMode,
) -> Result<(), HostError> {
    if scale != 1.0 {
        copy.scale(scale)?;
    }
    let anchor = alignment.anchor(&copy.bounds()?);
    copy.move_by(target.x - anchor.x, target.y - anchor.y)?;
    if rotation != 0.0 {
        copy.rotate(rotation, target.x, target.y)?;
    }
    Ok(())
}

/// Point-containment capability
pub trait ContainmentTest {
    fn contains(&self, x: f64, y: f64) -> Result<bool, HostError>;

    /// Bounding box used by the [`FallbackPolicy::BoundingBox`] policy
    fn outline_bounds(&self) -> Option<Bounds> {
        None
    }
}

impl ContainmentTest for Bounds {
    fn contains(&self, x: f64, y: f64) -> Result<bool, HostError> {
        Ok(self.contains_point(x, y))
    }

    fn outline_bounds(&self) -> Option<Bounds> {
        Some(*self)
    }
}

/// Closed polygon outline, e.g. a flattened container curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }
}

impl ContainmentTest for Polygon {
    fn contains(&self, x: f64, y: f64) -> Result<bool, HostError> {
        Ok(point_in_polygon(x, y, &self.vertices))
    }

    fn outline_bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }
}

/// Adapts any shape handle into a containment test
pub struct ShapeOutline<'a, S: ShapeHandle>(pub &'a S);

impl<S: ShapeHandle> ContainmentTest for ShapeOutline<'_, S> {
    fn contains(&self, x: f64, y: f64) -> Result<bool, HostError> {
        self.0.is_point_inside(x, y)
    }

    fn outline_bounds(&self) -> Option<Bounds> {
        self.0.bounds().ok()
    }
}

/// What a failed containment test counts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Treat the point as inside
    #[default]
    AssumeInside,
    /// Treat the point as outside
    AssumeOutside,
    /// Use the outline's bounding box; inside when no box is available
    BoundingBox,
}

/// Containment test with an explicit fallback policy and a fallback counter
pub struct ContainmentChecker<'a> {
    test: Option<&'a dyn ContainmentTest>,
    policy: FallbackPolicy,
    fallbacks: Cell<usize>,
}

impl<'a> ContainmentChecker<'a> {
    pub fn new(test: Option<&'a dyn ContainmentTest>, policy: FallbackPolicy) -> Self {
        Self {
            test,
            policy,
            fallbacks: Cell::new(0),
        }
    }

    /// Whether a container outline is present at all
    pub fn has_container(&self) -> bool {
        self.test.is_some()
    }

    /// Without a container every point is inside
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let Some(test) = self.test else {
            return true;
        };
        match test.contains(x, y) {
            Ok(inside) => inside,
            Err(err) => {
                let count = self.fallbacks.get() + 1;
                self.fallbacks.set(count);
                if count == 1 {
                    tracing::warn!("Containment test failed ({}); applying {:?}", err, self.policy);
                }
                match self.policy {
                    FallbackPolicy::AssumeInside => true,
                    FallbackPolicy::AssumeOutside => false,
                    FallbackPolicy::BoundingBox => test
                        .outline_bounds()
                        .map_or(true, |b| b.contains_point(x, y)),
                }
            }
        }
    }

    /// Number of containment failures resolved by the fallback policy
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.get()
    }
}
