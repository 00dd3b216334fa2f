//! Error handling for Stonepath
//!
//! Provides the error types for every layer of the placement pipeline:
//! - Placement errors (precondition violations surfaced immediately)
//! - Host errors (failures reported by the host application binding)
//!
//! Degenerate geometry is never an error: the engines return empty or
//! clamped results for it instead.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Placement error type
///
/// Represents programmer or workflow errors detected before a placement
/// computation starts. These are not retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// The container curve has no segments
    #[error("Container curve has no valid curve data")]
    EmptyCurve,

    /// No fill elements were supplied
    #[error("No fill elements provided")]
    NoFillElements,

    /// An adjustment was requested before any fill was executed
    #[error("No fill operation has been performed yet")]
    NoPreviousFill,

    /// A setting would make generation meaningless or non-terminating
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        param: String,
        /// The reason the parameter is invalid.
        reason: String,
    },

    /// Export was requested for an empty placement list
    #[error("No placements to export")]
    NothingToExport,
}

impl PlacementError {
    /// Shorthand for [`PlacementError::InvalidParameter`]
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        PlacementError::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Host error type
///
/// Represents failures reported by the host application binding.
/// Callers decide per call site whether a failure aborts or falls back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// A shape property could not be read
    #[error("Shape access failed: {reason}")]
    ShapeAccess {
        /// The reason the access failed.
        reason: String,
    },

    /// The point-containment test failed
    #[error("Containment test failed: {reason}")]
    Containment {
        /// The reason the test failed.
        reason: String,
    },

    /// Moving, rotating or scaling a shape failed
    #[error("Transform failed: {reason}")]
    Transform {
        /// The reason the transform failed.
        reason: String,
    },

    /// Duplicating a shape failed
    #[error("Duplicate failed: {reason}")]
    Duplicate {
        /// The reason the duplication failed.
        reason: String,
    },

    /// Deleting a shape failed
    #[error("Delete failed: {reason}")]
    Delete {
        /// The reason the deletion failed.
        reason: String,
    },
}

/// Main error type for Stonepath
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Placement precondition error
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Host binding error
    #[error(transparent)]
    Host(#[from] HostError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a placement precondition error
    pub fn is_placement_error(&self) -> bool {
        matches!(self, Error::Placement(_))
    }

    /// Check if this is a host binding error
    pub fn is_host_error(&self) -> bool {
        matches!(self, Error::Host(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_error_display() {
        assert_eq!(
            PlacementError::EmptyCurve.to_string(),
            "Container curve has no valid curve data"
        );
        let err = PlacementError::invalid("spacing_value", "must be > 0");
        assert_eq!(err.to_string(), "Invalid parameter 'spacing_value': must be > 0");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = PlacementError::NoFillElements.into();
        assert!(err.is_placement_error());
        assert!(!err.is_host_error());

        let err: Error = HostError::Containment {
            reason: "COM call rejected".to_string(),
        }
        .into();
        assert!(err.is_host_error());
        assert_eq!(err.to_string(), "Containment test failed: COM call rejected");
    }
}
