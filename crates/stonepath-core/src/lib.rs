//! # Stonepath Core
//!
//! Core types and utilities shared by the Stonepath crates.
//! Provides the document-space value types (points, bounding boxes),
//! the pure geometry kernel used by the placement engines, length units
//! and the error taxonomy.

pub mod bounds;
pub mod error;
pub mod geometry;
pub mod units;

pub use bounds::Bounds;
pub use error::{Error, HostError, PlacementError, Result};
pub use geometry::Point;
pub use units::LengthUnit;
