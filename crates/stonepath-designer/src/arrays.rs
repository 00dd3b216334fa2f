//! # Array Operations Module
//!
//! Creates multiple copies of a base shape in linear, grid, circular and
//! path patterns.
//!
//! Supports:
//! - Linear arrays (a single row or column of copies)
//! - Grid arrays (rows x columns)
//! - Circular arrays (copies around a center, optionally rotated)
//! - Path arrays (copies stepped along a curve, optionally following it)
//! - Element-size spacing (gaps measured edge to edge)
//! - Removing copies whose boxes overlap earlier ones
//!
//! The generators are pure: they return the target center and rotation of
//! every copy, where copy 0 is the base shape itself. [`create_array`] turns
//! the result into duplicated shapes.

use crate::curve::Curve;
use crate::curve_fill::AlignmentMode;
use crate::host::{place_copy, BatchScope, HostSession, ShapeHandle};
use crate::spatial_hash::non_overlapping_boxes;
use serde::{Deserialize, Serialize};
use stonepath_core::{Bounds, HostError, PlacementError, Point, Result};

const ARRAY_GROUP: &str = "Create Array";

/// Represents different types of array operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayType {
    /// Single row or column
    Linear,
    /// Copies around a center point
    Circular,
    /// Rows and columns
    Grid,
    /// Copies along a curve
    Path,
}

/// Direction of a linear array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinearDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Parameters for linear array operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArrayParams {
    /// Number of objects including the base
    pub count: u32,
    pub direction: LinearDirection,
    /// Spacing between copies (mm)
    pub spacing: f64,
    /// Measure `spacing` between edges instead of between centers
    #[serde(default)]
    pub use_element_size: bool,
}

impl LinearArrayParams {
    /// Create new linear array parameters
    pub fn new(count: u32, direction: LinearDirection, spacing: f64) -> Self {
        debug_assert!(spacing.is_finite(), "spacing must be finite, got {spacing}");
        Self {
            count,
            direction,
            spacing,
            use_element_size: false,
        }
    }

    /// Validate parameters
    pub fn is_valid(&self) -> bool {
        self.count > 0 && self.spacing.is_finite() && self.spacing >= 0.0
    }

    /// Equivalent grid
    fn as_grid(&self) -> GridArrayParams {
        let (columns, rows) = match self.direction {
            LinearDirection::Horizontal => (self.count, 1),
            LinearDirection::Vertical => (1, self.count),
        };
        GridArrayParams {
            columns,
            rows,
            column_spacing: self.spacing,
            row_spacing: self.spacing,
            use_element_size: self.use_element_size,
        }
    }
}

/// Parameters for circular array operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularArrayParams {
    /// Number of objects including the base
    pub count: u32,
    /// Center of the circle; the base shape's center when unset
    #[serde(default)]
    pub center: Option<Point>,
    /// Radius from the center to every copy
    pub radius: f64,
    /// Angle of the first copy step in degrees (0-360)
    #[serde(default)]
    pub start_angle: f64,
    /// Rotation direction: true = clockwise, false = counter-clockwise
    #[serde(default)]
    pub clockwise: bool,
    /// Rotate each copy by its angle on the circle
    #[serde(default)]
    pub rotate_copies: bool,
}

impl CircularArrayParams {
    /// Create new circular array parameters
    pub fn new(count: u32, radius: f64) -> Self {
        debug_assert!(radius.is_finite(), "radius must be finite, got {radius}");
        Self {
            count,
            center: None,
            radius,
            start_angle: 0.0,
            clockwise: false,
            rotate_copies: false,
        }
    }

    /// Validate parameters
    pub fn is_valid(&self) -> bool {
        self.count > 0
            && self.radius.is_finite()
            && self.radius >= 0.0
            && (0.0..=360.0).contains(&self.start_angle)
    }

    /// Calculate angle step between copies
    pub fn angle_step(&self) -> f64 {
        360.0 / self.count as f64
    }

    /// Angle of copy `copy_index` in degrees
    pub fn angle_of(&self, copy_index: u32) -> f64 {
        let sweep = copy_index as f64 * self.angle_step();
        if self.clockwise {
            self.start_angle - sweep
        } else {
            self.start_angle + sweep
        }
    }
}

/// Parameters for grid array operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridArrayParams {
    /// Number of columns
    pub columns: u32,
    /// Number of rows
    pub rows: u32,
    /// Horizontal spacing between columns (mm)
    pub column_spacing: f64,
    /// Vertical spacing between rows (mm)
    pub row_spacing: f64,
    /// Measure spacings between edges instead of between centers
    #[serde(default)]
    pub use_element_size: bool,
}

impl GridArrayParams {
    /// Create new grid array parameters
    pub fn new(columns: u32, rows: u32, column_spacing: f64, row_spacing: f64) -> Self {
        debug_assert!(
            column_spacing.is_finite(),
            "column_spacing must be finite, got {column_spacing}"
        );
        debug_assert!(
            row_spacing.is_finite(),
            "row_spacing must be finite, got {row_spacing}"
        );
        Self {
            columns,
            rows,
            column_spacing,
            row_spacing,
            use_element_size: false,
        }
    }

    /// Validate parameters
    pub fn is_valid(&self) -> bool {
        self.columns > 0
            && self.rows > 0
            && self.column_spacing.is_finite()
            && self.row_spacing.is_finite()
            && self.column_spacing >= 0.0
            && self.row_spacing >= 0.0
    }

    /// Get total number of objects
    pub fn total_copies(&self) -> u32 {
        self.columns * self.rows
    }

    /// Center-to-center pitch for a base of the given size
    pub fn pitch(&self, base: &Bounds) -> (f64, f64) {
        if self.use_element_size {
            (
                base.width() + self.column_spacing,
                base.height() + self.row_spacing,
            )
        } else {
            (self.column_spacing, self.row_spacing)
        }
    }

    /// Calculate bounding box of the grid array
    pub fn calculate_bounds(&self, base: &Bounds) -> Bounds {
        let (pitch_x, pitch_y) = self.pitch(base);
        let array_width = base.width() + (self.columns.saturating_sub(1)) as f64 * pitch_x;
        let array_height = base.height() + (self.rows.saturating_sub(1)) as f64 * pitch_y;
        Bounds::from_origin_size(base.left, base.bottom, array_width, array_height)
    }
}

/// Parameters for path array operations
#[derive(Debug, Clone)]
pub struct PathArrayParams {
    pub path: Curve,
    /// Distance between copies; when not positive it is derived from `count`
    pub step: f64,
    /// Number of path positions used when `step` is not positive (at least 2)
    pub count: u32,
    /// Rotate each copy to the path tangent
    pub rotate_copies: bool,
}

impl PathArrayParams {
    pub fn new(path: Curve, step: f64) -> Self {
        Self {
            path,
            step,
            count: 2,
            rotate_copies: false,
        }
    }

    /// Step actually used along the path
    pub fn effective_step(&self) -> f64 {
        if self.step > 0.0 {
            self.step
        } else {
            let count = self.count.max(2);
            self.path.total_length() / (count - 1) as f64
        }
    }
}

/// Main array operation combining type and parameters
#[derive(Debug, Clone)]
pub enum ArrayOperation {
    /// Linear array with its parameters
    Linear(LinearArrayParams),
    /// Circular array with its parameters
    Circular(CircularArrayParams),
    /// Grid array with its parameters
    Grid(GridArrayParams),
    /// Path array with its parameters
    Path(PathArrayParams),
}

impl ArrayOperation {
    /// Get the array type
    pub fn array_type(&self) -> ArrayType {
        match self {
            ArrayOperation::Linear(_) => ArrayType::Linear,
            ArrayOperation::Circular(_) => ArrayType::Circular,
            ArrayOperation::Grid(_) => ArrayType::Grid,
            ArrayOperation::Path(_) => ArrayType::Path,
        }
    }
}

/// Target of one array object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayCopy {
    /// Center of the object
    pub center: Point,
    /// Rotation applied around `center`, in degrees
    pub rotation: f64,
}

/// Generator for array copies
pub struct ArrayGenerator;

impl ArrayGenerator {
    /// Targets of a linear array
    pub fn generate_linear(params: &LinearArrayParams, base: &Bounds) -> Result<Vec<ArrayCopy>> {
        if !params.is_valid() {
            return Err(PlacementError::invalid(
                "linear_array",
                format!("count={}, spacing={}", params.count, params.spacing),
            )
            .into());
        }
        Self::generate_grid(&params.as_grid(), base)
    }

    /// Targets of a grid array, row by row
    pub fn generate_grid(params: &GridArrayParams, base: &Bounds) -> Result<Vec<ArrayCopy>> {
        if !params.is_valid() {
            return Err(PlacementError::invalid(
                "grid_array",
                format!(
                    "columns={}, rows={}, column_spacing={}, row_spacing={}",
                    params.columns, params.rows, params.column_spacing, params.row_spacing
                ),
            )
            .into());
        }

        let origin = base.center();
        let (pitch_x, pitch_y) = params.pitch(base);
        let mut copies = Vec::with_capacity(params.total_copies() as usize);
        for row in 0..params.rows {
            for col in 0..params.columns {
                copies.push(ArrayCopy {
                    center: Point::new(
                        origin.x + col as f64 * pitch_x,
                        origin.y + row as f64 * pitch_y,
                    ),
                    rotation: 0.0,
                });
            }
        }

        Ok(copies)
    }

    /// Targets of a circular array. The base stays in place; copy `i`
    /// sits on the circle at [`CircularArrayParams::angle_of`].
    pub fn generate_circular(params: &CircularArrayParams, base: &Bounds) -> Result<Vec<ArrayCopy>> {
        if !params.is_valid() {
            return Err(PlacementError::invalid(
                "circular_array",
                format!(
                    "count={}, radius={}, start_angle={}",
                    params.count, params.radius, params.start_angle
                ),
            )
            .into());
        }

        let center = params.center.unwrap_or_else(|| base.center());
        let mut copies = vec![ArrayCopy {
            center: base.center(),
            rotation: 0.0,
        }];
        for i in 1..params.count {
            let angle = params.angle_of(i);
            copies.push(ArrayCopy {
                center: center.offset_along(angle, params.radius),
                rotation: if params.rotate_copies { angle } else { 0.0 },
            });
        }

        Ok(copies)
    }

    /// Targets of a path array. The base stays in place; copies go to every
    /// further step along the path, end point included.
    pub fn generate_path(params: &PathArrayParams, base: &Bounds) -> Result<Vec<ArrayCopy>> {
        if params.path.is_empty() {
            return Err(PlacementError::EmptyCurve.into());
        }
        let total = params.path.total_length();
        if total <= 0.0 {
            return Err(PlacementError::invalid("path", "path has no length").into());
        }
        let step = params.effective_step();
        if !(step.is_finite() && step > 0.0) {
            return Err(PlacementError::invalid("step", format!("step must be positive, got {step}")).into());
        }

        // tolerate rounding on the final step
        let limit = total + step * 1e-9;
        let mut copies = vec![ArrayCopy {
            center: base.center(),
            rotation: 0.0,
        }];
        copies.extend(
            (1..)
                .map(|i| i as f64 * step)
                .take_while(|d| *d <= limit)
                .map(|d| {
                    let sample = params.path.point_at_distance(d.min(total));
                    ArrayCopy {
                        center: sample.point,
                        rotation: if params.rotate_copies { sample.angle } else { 0.0 },
                    }
                }),
        );

        Ok(copies)
    }

    /// Targets for any array operation
    pub fn generate(operation: &ArrayOperation, base: &Bounds) -> Result<Vec<ArrayCopy>> {
        match operation {
            ArrayOperation::Linear(params) => Self::generate_linear(params, base),
            ArrayOperation::Circular(params) => Self::generate_circular(params, base),
            ArrayOperation::Grid(params) => Self::generate_grid(params, base),
            ArrayOperation::Path(params) => Self::generate_path(params, base),
        }
    }
}

/// Duplicate `base` to every array target except copy 0. Copies the host
/// refuses are skipped. With `remove_overlaps`, copies whose boxes overlap
/// the base or an earlier copy are deleted again.
pub fn create_array<S, H>(
    operation: &ArrayOperation,
    base: &S,
    host: &mut H,
    remove_overlaps: bool,
) -> Result<Vec<S>>
where
    S: ShapeHandle,
    H: HostSession + ?Sized,
{
    let base_bounds = base.bounds()?;
    let targets = ArrayGenerator::generate(operation, &base_bounds)?;

    let _scope = BatchScope::enter(host, ARRAY_GROUP);
    let mut created: Vec<S> = Vec::with_capacity(targets.len().saturating_sub(1));

    for (i, target) in targets.iter().enumerate().skip(1) {
        match place_centered(base, target) {
            Ok(shape) => created.push(shape),
            Err(err) => tracing::warn!("Skipping array copy {}: {}", i, err),
        }
    }

    if remove_overlaps {
        created = drop_overlapping_copies(base_bounds, created);
    }

    tracing::info!(
        "Created {:?} array: {} objects",
        operation.array_type(),
        created.len() + 1
    );
    Ok(created)
}

fn place_centered<S: ShapeHandle>(base: &S, target: &ArrayCopy) -> std::result::Result<S, HostError> {
    place_copy(base, target.center, target.rotation, 1.0, AlignmentMode::Center)
}

fn drop_overlapping_copies<S: ShapeHandle>(base_bounds: Bounds, created: Vec<S>) -> Vec<S> {
    // copies whose bounds cannot be read are kept and left out of the test
    let copy_bounds: Vec<Option<Bounds>> = created.iter().map(|s| s.bounds().ok()).collect();
    let mut boxes = vec![base_bounds];
    boxes.extend(copy_bounds.iter().flatten().copied());
    let mut verdicts = non_overlapping_boxes(&boxes).into_iter().skip(1);

    let mut kept = Vec::with_capacity(created.len());
    let mut removed = 0;
    for (shape, b) in created.into_iter().zip(copy_bounds) {
        let keep = b.is_none() || verdicts.next().unwrap_or(true);
        if keep {
            kept.push(shape);
        } else {
            removed += 1;
            if let Err(err) = shape.delete() {
                tracing::warn!("Could not delete overlapping copy: {}", err);
            }
        }
    }
    if removed > 0 {
        tracing::info!("Removed {} overlapping array copies", removed);
    }
    kept
}
