//! Unit conversion utilities
//!
//! Placement math runs in millimeters. Inputs declared in inches or
//! typographic points are converted on the way in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Document length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimeters
    #[default]
    Mm,
    /// Inches
    Inch,
    /// Typographic points (1/72 inch)
    Point,
}

impl LengthUnit {
    /// Convert a value in this unit to millimeters
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            Self::Mm => value,
            Self::Inch => value * MM_PER_INCH,
            Self::Point => value * MM_PER_INCH / POINTS_PER_INCH,
        }
    }

    /// Convert a value in millimeters to this unit
    pub fn from_mm(self, value_mm: f64) -> f64 {
        match self {
            Self::Mm => value_mm,
            Self::Inch => value_mm / MM_PER_INCH,
            Self::Point => value_mm * POINTS_PER_INCH / MM_PER_INCH,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mm => write!(f, "mm"),
            Self::Inch => write!(f, "in"),
            Self::Point => write!(f, "pt"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Ok(Self::Mm),
            "in" | "inch" | "inches" => Ok(Self::Inch),
            "pt" | "point" | "points" => Ok(Self::Point),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Format a millimeter value in `unit` with a fixed number of decimals
pub fn format_length(value_mm: f64, unit: LengthUnit, precision: usize) -> String {
    format!("{:.*}", precision, unit.from_mm(value_mm))
}
