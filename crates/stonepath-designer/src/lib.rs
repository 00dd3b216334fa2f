//! # Stonepath Designer
//!
//! Placement engines for decorating vector designs. The engines compute
//! where copies of existing elements or rhinestones go; a host binding
//! then duplicates and transforms shapes in the drawing application.
//!
//! ## Core Components
//!
//! ### Placement Engines
//! - **Curve Fill**: distribute elements along a Bezier path with spacing,
//!   angle, pattern and scale policies
//! - **Rhinestones**: hexagonal, square, circular and pixel grids, random
//!   scatter, outline and image-driven stone layouts, with multi-size stone
//!   tables, exports and printable templates
//! - **Arrays**: linear, grid, circular and path arrays of a base shape
//! - **Distribute**: even and random redistribution of existing shapes
//!
//! ### Shared Infrastructure
//! - **Curve Sampler**: arc-length queries over line and cubic segments
//! - **Spatial Hash**: uniform-grid overlap index
//! - **Host Traits**: shape handles, grouping, batch scopes and containment
//!   tests
//! - **Memory Document**: an in-memory host for jobs and tests
//!
//! ## Architecture
//!
//! ```text
//! Settings ──> Engine (pure) ──> placements ──> materialize (host)
//!                 │
//!                 ├── Curve Sampler
//!                 └── Spatial Hash
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stonepath_designer::{Curve, CurveFillEngine, FillSettings};
//!
//! let engine = CurveFillEngine::new(curve, element_bounds)?;
//! let placements = engine.calculate_placements(&FillSettings::default())?;
//! ```

pub mod arrays;
pub mod curve;
pub mod curve_fill;
pub mod distribute;
pub mod fill_session;
pub mod host;
pub mod memory;
pub mod random;
pub mod rhinestone;
pub mod spatial_hash;

// Re-export all public types from submodules
pub use arrays::{
    create_array, ArrayCopy, ArrayGenerator, ArrayOperation, ArrayType, CircularArrayParams,
    GridArrayParams, LinearArrayParams, LinearDirection, PathArrayParams,
};
pub use curve::{Curve, CurveSample, CurveSegment};
pub use curve_fill::{
    collect_element_bounds, AlignmentMode, AngleMode, CurveFillEngine, FillSettings, PatternMode,
    PlacementPoint, ScaleMode, SpacingMode,
};
pub use distribute::{
    distribute_evenly, distribute_randomly, even_distribution, random_distribution, DistributeAxis,
    RandomDistributeParams, RandomDistribution,
};
pub use fill_session::{execute_fill, FillSession, FillStatistics};
pub use host::{
    place_copy, BatchScope, ContainmentChecker, ContainmentTest, FallbackPolicy, HostSession,
    Polygon, ShapeGrouping, ShapeHandle, ShapeOutline,
};
pub use memory::{MemoryDocument, MemoryShape};
pub use rhinestone::{
    calculate_circular_grid, calculate_hexagonal_grid, calculate_image_map,
    calculate_image_map_from_path, calculate_outline, calculate_pixel_grid,
    calculate_random_scatter, calculate_square_grid, export_to_file, place_stones,
    render_template, write_template, ExportFormat, FillRegion, HexGridParams, ImageMapParams,
    PatternType, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings, RhinestoneStatistics,
    ScatterParams, SizeMode, TemplateParams,
};
pub use spatial_hash::{filter_overlaps, non_overlapping_boxes, OverlapIndex, SpatialHash};

pub use stonepath_core::{Bounds, Error, HostError, PlacementError, Point, Result};
