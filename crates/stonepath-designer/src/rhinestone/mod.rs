//! Rhinestone placement engine
//!
//! Area and outline fills with round stones:
//! - [`hex_grid`]: staggered (honeycomb) grids clipped to a container
//! - [`square_grid`]: rows and columns on one pitch
//! - [`circular_grid`]: concentric rings around the region center
//! - [`scatter`]: seeded rejection sampling with a spatial hash
//! - [`outline`]: stones stepped along a curve
//! - [`image_map`]: stones on a grid wherever an image is dark (or bright)
//! - [`pixel_grid`]: uniform pixel-art cells over the whole region
//!
//! Every generator returns a [`RhinestoneLayout`]. With `remove_overlaps`
//! set, all of them run the same final overlap pass, [`remove_overlaps`].
//! Layouts can be exported ([`export`]), drawn as a printable
//! [`template`], or materialized into a host document ([`place`]).

pub mod circular_grid;
pub mod export;
pub mod hex_grid;
pub mod image_map;
pub mod outline;
pub mod pixel_grid;
pub mod place;
pub mod scatter;
pub mod square_grid;
pub mod stones;
pub mod template;

pub use circular_grid::calculate_circular_grid;
pub use export::{export_to_file, write_layout, ExportFormat};
pub use hex_grid::{calculate_hexagonal_grid, hex_grid_metrics, HexGridMetrics, HexGridParams};
pub use image_map::{calculate_image_map, calculate_image_map_from_path, ImageMapParams, SizeMode};
pub use outline::calculate_outline;
pub use pixel_grid::calculate_pixel_grid;
pub use place::place_stones;
pub use scatter::{calculate_random_scatter, ScatterParams, MAX_SCATTER_STONES};
pub use square_grid::calculate_square_grid;
pub use stones::{nearest_stone_size, stone_diameter, SizePicker, STONE_SIZES};
pub use template::{render_template, write_template, TemplateParams};

use crate::host::{ContainmentChecker, ContainmentTest, FallbackPolicy};
use crate::random::uniform;
use crate::spatial_hash::{filter_overlaps, OverlapIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use stonepath_core::{Bounds, PlacementError, Point};

/// Fill pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    #[default]
    Hexagonal,
    Random,
}

/// Settings shared by every rhinestone generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhinestoneSettings {
    pub stone_size: String,
    /// Sizes for mixed fills; empty means `stone_size` only
    pub stone_sizes: Vec<String>,
    /// Relative weight per entry of `stone_sizes`
    pub size_distribution: Vec<f64>,
    pub pattern: PatternType,
    /// 0.1 to 1.0; lower values spread stones out
    pub density: f64,
    /// Additional spacing in mm
    pub spacing: f64,
    pub min_gap: f64,
    pub gap_optimization: bool,
    /// Stone rotation in degrees
    pub rotation: f64,
    pub random_rotation: bool,
    /// Sideways shift of outline stones from the curve in mm; positive is
    /// left of the travel direction
    pub outline_offset: f64,
    /// Derive spacing from the source element sizes
    pub use_element_size: bool,
    pub remove_overlaps: bool,
    pub seed: Option<u64>,
}

impl Default for RhinestoneSettings {
    fn default() -> Self {
        Self {
            stone_size: stones::DEFAULT_STONE_SIZE.to_string(),
            stone_sizes: Vec::new(),
            size_distribution: Vec::new(),
            pattern: PatternType::Hexagonal,
            density: 0.85,
            spacing: 0.0,
            min_gap: 0.5,
            gap_optimization: true,
            rotation: 0.0,
            random_rotation: false,
            outline_offset: 0.0,
            use_element_size: true,
            remove_overlaps: true,
            seed: None,
        }
    }
}

impl RhinestoneSettings {
    /// Size labels in play: `stone_sizes`, or the single `stone_size`
    pub fn size_choices(&self) -> Vec<String> {
        if self.stone_sizes.is_empty() {
            vec![self.stone_size.clone()]
        } else {
            self.stone_sizes.clone()
        }
    }

    pub fn size_picker(&self) -> SizePicker {
        SizePicker::new(&self.size_choices(), &self.size_distribution)
    }

    /// Density clamped into `[0.1, 1.0]`; non-finite or zero means 1.0
    pub fn clamped_density(&self) -> f64 {
        if !self.density.is_finite() || self.density == 0.0 {
            return 1.0;
        }
        self.density.clamp(0.1, 1.0)
    }

    pub(crate) fn stone_rotation<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.random_rotation {
            uniform(rng, 0.0, 360.0)
        } else {
            self.rotation
        }
    }
}

/// One stone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhinestonePlacement {
    pub x: f64,
    pub y: f64,
    pub stone_size: String,
    pub rotation: f64,
    /// Source element the stone was sized from
    #[serde(default)]
    pub element_index: Option<usize>,
    /// Explicit diameter; overrides the size lookup
    #[serde(default)]
    pub diameter: Option<f64>,
}

impl RhinestonePlacement {
    /// Explicit diameter when set, otherwise the size table entry
    pub fn effective_diameter(&self) -> f64 {
        self.diameter
            .unwrap_or_else(|| stone_diameter(&self.stone_size))
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Summary of a layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhinestoneStatistics {
    pub total_stones: usize,
    /// Stone count per size label
    pub size_distribution: BTreeMap<String, usize>,
    /// Summed disc area in mm²
    pub coverage_area: f64,
}

/// Output of a rhinestone generator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RhinestoneLayout {
    pub placements: Vec<RhinestonePlacement>,
    /// Containment failures resolved by the region's fallback policy
    pub containment_fallbacks: usize,
}

impl RhinestoneLayout {
    pub fn new(placements: Vec<RhinestonePlacement>) -> Self {
        Self {
            placements,
            containment_fallbacks: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RhinestonePlacement> {
        self.placements.iter()
    }

    pub fn statistics(&self) -> RhinestoneStatistics {
        let mut size_distribution = BTreeMap::new();
        for p in &self.placements {
            *size_distribution.entry(p.stone_size.clone()).or_insert(0) += 1;
        }
        let coverage_area = self
            .placements
            .iter()
            .map(|p| {
                let r = p.effective_diameter() / 2.0;
                PI * r * r
            })
            .sum();
        RhinestoneStatistics {
            total_stones: self.placements.len(),
            size_distribution,
            coverage_area,
        }
    }
}

/// Area to fill: a bounding box and an optional container outline
#[derive(Clone, Copy)]
pub struct FillRegion<'a> {
    pub bounds: Bounds,
    pub container: Option<&'a dyn ContainmentTest>,
    pub fallback: FallbackPolicy,
}

impl<'a> FillRegion<'a> {
    /// Rectangular region without a container outline
    pub fn rect(bounds: Bounds) -> Self {
        Self {
            bounds,
            container: None,
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_container(mut self, container: &'a dyn ContainmentTest) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub(crate) fn checker(&self) -> ContainmentChecker<'a> {
        ContainmentChecker::new(self.container, self.fallback)
    }
}

/// Drop stones closer than `(d1 + d2) / 2 + min_gap` to an earlier stone
pub fn remove_overlaps(placements: Vec<RhinestonePlacement>, min_gap: f64) -> Vec<RhinestonePlacement> {
    filter_overlaps(
        placements,
        min_gap,
        RhinestonePlacement::position,
        RhinestonePlacement::effective_diameter,
    )
}

/// Square pitch shared by the grid generators:
/// `(diameter + min_gap + spacing) / density`
pub fn grid_pitch(settings: &RhinestoneSettings, diameter: f64) -> Result<f64, PlacementError> {
    let pitch = (diameter + settings.min_gap + settings.spacing.max(0.0)) / settings.clamped_density();
    if !(pitch.is_finite() && pitch > 0.0) {
        return Err(PlacementError::invalid(
            "spacing",
            format!("grid pitch must be positive, got {pitch}"),
        ));
    }
    Ok(pitch)
}

/// Acceptance pipeline shared by the grid generators: edge clip against a
/// box (stone edge included), container test, then the in-generation gap
/// check when `gap_optimization` is on and no overlap pass follows
pub(crate) struct GridCollector<'a> {
    clip: Option<Bounds>,
    checker: Option<ContainmentChecker<'a>>,
    gap_index: Option<OverlapIndex>,
    placements: Vec<RhinestonePlacement>,
}

impl<'a> GridCollector<'a> {
    /// `clip: None` turns off both the edge clip and the container test
    pub(crate) fn new(
        region: &FillRegion<'a>,
        settings: &RhinestoneSettings,
        clip: Option<Bounds>,
        max_diameter: f64,
    ) -> Self {
        Self {
            clip,
            checker: clip.map(|_| region.checker()),
            gap_index: (settings.gap_optimization && !settings.remove_overlaps)
                .then(|| OverlapIndex::new(max_diameter, settings.min_gap)),
            placements: Vec::new(),
        }
    }

    /// Stones accepted so far
    pub(crate) fn placed(&self) -> usize {
        self.placements.len()
    }

    /// Whether a stone of `diameter` at `point` passes every check. An
    /// admitted stone is recorded in the gap index, so follow with
    /// [`GridCollector::push`].
    pub(crate) fn admits(&mut self, point: Point, diameter: f64) -> bool {
        if let Some(clip) = self.clip {
            let radius = diameter / 2.0;
            if point.x - radius < clip.left
                || point.x + radius > clip.right
                || point.y - radius < clip.bottom
                || point.y + radius > clip.top
            {
                return false;
            }
        }
        if let Some(checker) = &self.checker {
            if !checker.contains(point.x, point.y) {
                return false;
            }
        }
        match self.gap_index.as_mut() {
            Some(index) => index.insert_if_clear(point.x, point.y, diameter),
            None => true,
        }
    }

    pub(crate) fn push(&mut self, placement: RhinestonePlacement) {
        self.placements.push(placement);
    }

    /// Run the overlap pass when enabled. Returns the layout and the number
    /// of stones it removed.
    pub(crate) fn finish(self, settings: &RhinestoneSettings) -> (RhinestoneLayout, usize) {
        let containment_fallbacks = self.checker.as_ref().map_or(0, |c| c.fallback_count());
        let generated = self.placements.len();
        let placements = if settings.remove_overlaps {
            remove_overlaps(self.placements, settings.min_gap)
        } else {
            self.placements
        };
        let removed = generated - placements.len();
        (
            RhinestoneLayout {
                placements,
                containment_fallbacks,
            },
            removed,
        )
    }
}

/// Effective diameters of source elements: `(width + height) / 2`,
/// dropping empty boxes
pub fn element_diameters(element_bounds: &[Bounds]) -> Vec<f64> {
    element_bounds
        .iter()
        .map(Bounds::mean_dimension)
        .filter(|d| *d > 0.0)
        .collect()
}

/// Chooses the size of each generated stone
pub(crate) struct StoneSizer {
    stone_size: String,
    element_diameters: Vec<f64>,
    picker: SizePicker,
}

impl StoneSizer {
    pub(crate) fn new(settings: &RhinestoneSettings, element_bounds: &[Bounds]) -> Self {
        Self {
            stone_size: settings.stone_size.clone(),
            element_diameters: element_diameters(element_bounds),
            picker: settings.size_picker(),
        }
    }

    /// Diameter the grid spacing is derived from
    pub(crate) fn base_diameter(&self, settings: &RhinestoneSettings) -> f64 {
        let stone = stone_diameter(&self.stone_size);
        if settings.use_element_size && !self.element_diameters.is_empty() {
            let avg = self.element_diameters.iter().sum::<f64>() / self.element_diameters.len() as f64;
            stone.max(avg)
        } else if self.picker.is_mixed() {
            self.picker.average_diameter()
        } else {
            stone
        }
    }

    /// Largest diameter [`StoneSizer::next`] can return
    pub(crate) fn max_diameter(&self) -> f64 {
        if self.element_diameters.is_empty() {
            self.picker.max_diameter().max(stone_diameter(&self.stone_size))
        } else {
            self.element_diameters.iter().copied().fold(0.0, f64::max)
        }
    }

    /// Size for the stone that would become placement number `placed`:
    /// source elements cycle, mixed sizes are drawn by weight
    pub(crate) fn next<R: Rng + ?Sized>(&self, placed: usize, rng: &mut R) -> (String, Option<usize>, f64) {
        if !self.element_diameters.is_empty() {
            let index = placed % self.element_diameters.len();
            let diameter = self.element_diameters[index];
            return (nearest_stone_size(diameter).to_string(), Some(index), diameter);
        }
        let label = if self.picker.is_mixed() {
            self.picker.pick(rng).to_string()
        } else {
            self.stone_size.clone()
        };
        let diameter = stone_diameter(&label);
        (label, None, diameter)
    }
}
