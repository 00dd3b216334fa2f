//! Curve fill placement engine
//!
//! Places copies of fill elements along a container curve. The engine turns a
//! [`FillSettings`] aggregate into an ordered list of [`PlacementPoint`]s:
//!
//! 1. usable length = curve length minus start and end padding
//! 2. distances along the curve from the spacing mode (or a count override)
//! 3. per distance: sampled position, rotation, scale, perpendicular offset
//!    and element selector
//! 4. optional local collision filter against the last accepted placement
//! 5. optional global overlap filter through the spatial hash
//!
//! Materialization into a host document lives in [`crate::fill_session`].

use crate::curve::Curve;
use crate::host::ShapeHandle;
use crate::random::{index, rng_from_seed, uniform};
use crate::spatial_hash::filter_overlaps;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use stonepath_core::geometry::{lerp, normalize_angle};
use stonepath_core::{Bounds, HostError, PlacementError, Point};

/// Collision filter threshold as a fraction of the summed radii
pub const COLLISION_THRESHOLD: f64 = 0.9;

/// Spacing calculation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpacingMode {
    #[default]
    Fixed,
    Percentage,
    AutoFit,
    Random,
    /// Reserved; produces no positions
    Formula,
}

/// Element rotation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    #[default]
    FollowCurve,
    Fixed,
    Random,
    Incremental,
    Perpendicular,
}

/// Which anchor of a placed element lands on the placement point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    Top,
    #[default]
    Center,
    Bottom,
    /// Shapes carry no text baseline; treated as the bottom edge
    Baseline,
}

impl AlignmentMode {
    /// Anchor point of `bounds` for this alignment
    pub fn anchor(&self, bounds: &Bounds) -> Point {
        let center = bounds.center();
        match self {
            AlignmentMode::Top => Point::new(center.x, bounds.top),
            AlignmentMode::Center => center,
            AlignmentMode::Bottom | AlignmentMode::Baseline => Point::new(center.x, bounds.bottom),
        }
    }
}

/// Element pattern modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    #[default]
    Single,
    Sequence,
    Random,
    Alternating,
    /// Reserved; always selects the first element
    GradientScale,
}

/// Per-placement scale policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    #[default]
    Uniform,
    Gradient,
    Random,
}

impl SpacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpacingMode::Fixed => "fixed",
            SpacingMode::Percentage => "percentage",
            SpacingMode::AutoFit => "auto_fit",
            SpacingMode::Random => "random",
            SpacingMode::Formula => "formula",
        }
    }
}

impl AngleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AngleMode::FollowCurve => "follow_curve",
            AngleMode::Fixed => "fixed",
            AngleMode::Random => "random",
            AngleMode::Incremental => "incremental",
            AngleMode::Perpendicular => "perpendicular",
        }
    }
}

/// Settings for one curve fill operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    pub spacing_mode: SpacingMode,
    /// Fixed spacing in mm
    pub spacing_value: f64,
    pub spacing_percentage: f64,
    pub spacing_min: f64,
    pub spacing_max: f64,
    pub start_padding: f64,
    pub end_padding: f64,

    pub angle_mode: AngleMode,
    pub fixed_angle: f64,
    pub angle_min: f64,
    pub angle_max: f64,
    pub angle_increment: f64,

    pub alignment: AlignmentMode,
    pub offset_from_curve: f64,

    /// Element count override; 0 derives the count from spacing
    pub element_count: usize,

    pub pattern_mode: PatternMode,
    pub pattern_sequence: Vec<usize>,

    pub scale_mode: ScaleMode,
    pub scale_factor: f64,
    pub scale_start: f64,
    pub scale_end: f64,
    pub scale_min: f64,
    pub scale_max: f64,

    pub collision_detection: bool,
    /// Add the average element size to fixed spacing
    pub use_element_size: bool,
    pub remove_overlaps: bool,
    /// With an element count override: divide the usable length into
    /// `count - 1` gaps instead of centering each element in its own segment
    pub distribute_evenly: bool,

    /// Seed for every random draw of the fill
    pub seed: Option<u64>,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            spacing_mode: SpacingMode::Fixed,
            spacing_value: 10.0,
            spacing_percentage: 100.0,
            spacing_min: 5.0,
            spacing_max: 20.0,
            start_padding: 0.0,
            end_padding: 0.0,
            angle_mode: AngleMode::FollowCurve,
            fixed_angle: 0.0,
            angle_min: 0.0,
            angle_max: 360.0,
            angle_increment: 15.0,
            alignment: AlignmentMode::Center,
            offset_from_curve: 0.0,
            element_count: 0,
            pattern_mode: PatternMode::Single,
            pattern_sequence: Vec::new(),
            scale_mode: ScaleMode::Uniform,
            scale_factor: 1.0,
            scale_start: 1.0,
            scale_end: 1.0,
            scale_min: 0.5,
            scale_max: 1.5,
            collision_detection: false,
            use_element_size: true,
            remove_overlaps: true,
            distribute_evenly: false,
            seed: None,
        }
    }
}

/// Where one element copy goes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementPoint {
    pub position: Point,
    /// Degrees
    pub rotation: f64,
    pub scale: f64,
    /// Selector into the fill element list
    pub element_index: usize,
}

/// Bounding boxes of a list of shapes, in order
pub fn collect_element_bounds<S: ShapeHandle>(shapes: &[S]) -> Result<Vec<Bounds>, HostError> {
    shapes.iter().map(ShapeHandle::bounds).collect()
}

/// Computes curve fill placements for one container curve and one list of
/// fill elements
#[derive(Debug, Clone)]
pub struct CurveFillEngine {
    curve: Curve,
    element_bounds: Vec<Bounds>,
}

impl CurveFillEngine {
    /// Snapshot the container curve and the fill elements' bounding boxes
    pub fn new(curve: Curve, element_bounds: Vec<Bounds>) -> Result<Self, PlacementError> {
        if curve.is_empty() {
            return Err(PlacementError::EmptyCurve);
        }
        if element_bounds.is_empty() {
            return Err(PlacementError::NoFillElements);
        }
        tracing::info!(
            "Curve fill engine ready: curve length {:.2}, {} fill elements",
            curve.total_length(),
            element_bounds.len()
        );
        Ok(Self {
            curve,
            element_bounds,
        })
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn element_bounds(&self) -> &[Bounds] {
        &self.element_bounds
    }

    pub fn element_count(&self) -> usize {
        self.element_bounds.len()
    }

    /// `max(width, height)` of an element, 0 for an unknown index
    pub fn element_size(&self, element_index: usize) -> f64 {
        self.element_bounds
            .get(element_index)
            .map_or(0.0, Bounds::max_dimension)
    }

    /// Average `max(width, height)` across all fill elements
    pub fn average_element_size(&self) -> f64 {
        let total: f64 = self.element_bounds.iter().map(Bounds::max_dimension).sum();
        total / self.element_bounds.len() as f64
    }

    /// Size used by percentage and auto-fit spacing: the average when
    /// element-size spacing is on, otherwise the first element's size
    fn reference_size(&self, settings: &FillSettings) -> f64 {
        if settings.use_element_size {
            self.average_element_size()
        } else {
            self.element_size(0)
        }
    }

    /// Compute all placements for `settings`.
    ///
    /// A usable length of zero or less after padding yields an empty list.
    pub fn calculate_placements(
        &self,
        settings: &FillSettings,
    ) -> Result<Vec<PlacementPoint>, PlacementError> {
        let total_length = self.curve.total_length();
        let usable_length = total_length - settings.start_padding - settings.end_padding;

        if usable_length <= 0.0 {
            tracing::warn!(
                "No usable length after padding (length {:.2}, padding {:.2} + {:.2})",
                total_length,
                settings.start_padding,
                settings.end_padding
            );
            return Ok(Vec::new());
        }

        let mut rng = rng_from_seed(settings.seed);
        let distances = self.calculate_distances(settings, usable_length, &mut rng)?;
        let count = distances.len();

        let mut placements = Vec::with_capacity(count);
        let mut current_angle = settings.fixed_angle;

        for (i, distance) in distances.into_iter().enumerate() {
            let sample = self
                .curve
                .point_at_distance(settings.start_padding + distance);

            let rotation = normalize_angle(match settings.angle_mode {
                AngleMode::FollowCurve => sample.angle,
                AngleMode::Fixed => settings.fixed_angle,
                AngleMode::Random => uniform(&mut rng, settings.angle_min, settings.angle_max),
                AngleMode::Incremental => {
                    let angle = current_angle;
                    current_angle += settings.angle_increment;
                    angle
                }
                AngleMode::Perpendicular => sample.angle + 90.0,
            });

            let scale = match settings.scale_mode {
                ScaleMode::Uniform => settings.scale_factor,
                ScaleMode::Gradient if count <= 1 => settings.scale_start,
                ScaleMode::Gradient => lerp(
                    settings.scale_start,
                    settings.scale_end,
                    i as f64 / (count - 1) as f64,
                ),
                ScaleMode::Random => uniform(&mut rng, settings.scale_min, settings.scale_max),
            };

            let position = if settings.offset_from_curve != 0.0 {
                sample
                    .point
                    .offset_along(sample.angle + 90.0, settings.offset_from_curve)
            } else {
                sample.point
            };

            placements.push(PlacementPoint {
                position,
                rotation,
                scale,
                element_index: self.select_element(settings, i, &mut rng),
            });
        }

        if settings.collision_detection {
            placements = self.remove_collisions(placements);
        }

        if settings.remove_overlaps {
            let before = placements.len();
            placements = filter_overlaps(
                placements,
                0.0,
                |p| p.position,
                |p| self.element_size(p.element_index) * p.scale,
            );
            tracing::debug!("Overlap removal dropped {} placements", before - placements.len());
        }

        tracing::info!("Calculated {} placement points", placements.len());
        Ok(placements)
    }

    /// Distances along the usable part of the curve, measured from the
    /// start padding
    fn calculate_distances(
        &self,
        settings: &FillSettings,
        usable_length: f64,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, PlacementError> {
        let count_override = settings.element_count;

        if count_override > 0 && settings.spacing_mode != SpacingMode::Random {
            return Ok(if settings.distribute_evenly && count_override > 1 {
                evenly_divided(usable_length, count_override)
            } else {
                let segment = usable_length / count_override as f64;
                (0..count_override)
                    .map(|i| i as f64 * segment + segment / 2.0)
                    .collect()
            });
        }

        match settings.spacing_mode {
            SpacingMode::Fixed => {
                let mut spacing = settings.spacing_value;
                if settings.use_element_size {
                    spacing += self.average_element_size();
                }
                if spacing <= 0.0 {
                    return Err(PlacementError::invalid(
                        "spacing_value",
                        format!("effective spacing must be positive, got {spacing}"),
                    ));
                }
                Ok(stepped(usable_length, spacing))
            }
            SpacingMode::Percentage => {
                let spacing = self.reference_size(settings) * settings.spacing_percentage / 100.0;
                if spacing <= 0.0 {
                    return Err(PlacementError::invalid(
                        "spacing_percentage",
                        format!("effective spacing must be positive, got {spacing}"),
                    ));
                }
                Ok(stepped(usable_length, spacing))
            }
            SpacingMode::AutoFit => {
                let size = self.reference_size(settings);
                let count = if size > 0.0 {
                    ((usable_length / size) as usize).max(1)
                } else {
                    1
                };
                Ok(if count > 1 {
                    evenly_divided(usable_length, count)
                } else {
                    vec![usable_length / 2.0]
                })
            }
            SpacingMode::Random => {
                if settings.spacing_min <= 0.0 || settings.spacing_max <= 0.0 {
                    return Err(PlacementError::invalid(
                        "spacing_min",
                        format!(
                            "random spacing bounds must be positive, got {}..{}",
                            settings.spacing_min, settings.spacing_max
                        ),
                    ));
                }
                let mut distances = Vec::new();
                let mut distance = 0.0;
                while distance < usable_length {
                    distances.push(distance);
                    distance += uniform(rng, settings.spacing_min, settings.spacing_max);
                }
                Ok(distances)
            }
            SpacingMode::Formula => {
                tracing::warn!("Formula spacing is not available; no positions generated");
                Ok(Vec::new())
            }
        }
    }

    fn select_element(&self, settings: &FillSettings, placement_index: usize, rng: &mut StdRng) -> usize {
        let n = self.element_bounds.len();
        match settings.pattern_mode {
            PatternMode::Single | PatternMode::GradientScale => 0,
            PatternMode::Sequence if settings.pattern_sequence.is_empty() => placement_index % n,
            PatternMode::Sequence => {
                let seq = &settings.pattern_sequence;
                seq[placement_index % seq.len()] % n
            }
            PatternMode::Random => index(rng, n),
            PatternMode::Alternating => placement_index % n,
        }
    }

    /// Drop placements closer than 90% of the summed radii to the last
    /// accepted placement
    fn remove_collisions(&self, placements: Vec<PlacementPoint>) -> Vec<PlacementPoint> {
        let before = placements.len();
        let mut kept: Vec<PlacementPoint> = Vec::with_capacity(before);

        for current in placements {
            if let Some(prev) = kept.last() {
                let current_size = self.element_size(current.element_index) * current.scale;
                let prev_size = self.element_size(prev.element_index) * prev.scale;
                let min_distance = (current_size + prev_size) / 2.0;
                if prev.position.distance_to(&current.position) < min_distance * COLLISION_THRESHOLD {
                    continue;
                }
            }
            kept.push(current);
        }

        tracing::info!("Collision detection removed {} placements", before - kept.len());
        kept
    }
}

/// `0, s, 2s, ...` strictly below `length`
fn stepped(length: f64, spacing: f64) -> Vec<f64> {
    (0..)
        .map(|i| i as f64 * spacing)
        .take_while(|d| *d < length)
        .collect()
}

/// `count` distances with `count - 1` equal gaps spanning `[0, length]`
fn evenly_divided(length: f64, count: usize) -> Vec<f64> {
    let gap = length / (count - 1) as f64;
    (0..count).map(|i| i as f64 * gap).collect()
}
