//! Standard rhinestone sizes
//!
//! Stone sizes are labelled `SSn` ("stone size"); the table maps each label
//! to its diameter in millimeters.

use crate::random::uniform;
use rand::Rng;

/// Label used when nothing else is known
pub const DEFAULT_STONE_SIZE: &str = "SS10";

/// Diameter assumed for labels missing from [`STONE_SIZES`]
pub const DEFAULT_STONE_DIAMETER: f64 = 2.8;

/// Label to diameter (mm), smallest first
pub const STONE_SIZES: [(&str, f64); 16] = [
    ("SS2", 0.8),
    ("SS3", 1.0),
    ("SS4", 1.2),
    ("SS5", 1.5),
    ("SS6", 2.0),
    ("SS8", 2.4),
    ("SS10", 2.8),
    ("SS12", 3.1),
    ("SS14", 3.5),
    ("SS16", 3.9),
    ("SS18", 4.3),
    ("SS20", 4.7),
    ("SS30", 6.3),
    ("SS34", 7.1),
    ("SS40", 8.4),
    ("SS48", 11.0),
];

/// Diameter for a label; unknown labels fall back to 2.8mm
pub fn stone_diameter(label: &str) -> f64 {
    STONE_SIZES
        .iter()
        .find(|(name, _)| *name == label)
        .map_or(DEFAULT_STONE_DIAMETER, |(_, d)| *d)
}

pub fn is_known_size(label: &str) -> bool {
    STONE_SIZES.iter().any(|(name, _)| *name == label)
}

/// Closest standard label for a diameter. Non-positive diameters map to
/// [`DEFAULT_STONE_SIZE`]; ties resolve to the smaller stone.
pub fn nearest_stone_size(diameter: f64) -> &'static str {
    if diameter <= 0.0 || !diameter.is_finite() {
        return DEFAULT_STONE_SIZE;
    }
    STONE_SIZES
        .iter()
        .fold((DEFAULT_STONE_SIZE, f64::INFINITY), |best, &(name, size)| {
            let diff = (size - diameter).abs();
            if diff < best.1 {
                (name, diff)
            } else {
                best
            }
        })
        .0
}

/// Weighted selection among several stone sizes.
///
/// Missing weights count as 1.0 and negative weights as 0. When all weights
/// are zero the first size is always chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct SizePicker {
    sizes: Vec<String>,
    weights: Vec<f64>,
    total: f64,
}

impl SizePicker {
    pub fn new(sizes: &[String], weights: &[f64]) -> Self {
        let weights: Vec<f64> = (0..sizes.len())
            .map(|i| weights.get(i).copied().unwrap_or(1.0).max(0.0))
            .collect();
        let total = weights.iter().sum();
        Self {
            sizes: sizes.to_vec(),
            weights,
            total,
        }
    }

    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// Whether more than one size is in play
    pub fn is_mixed(&self) -> bool {
        self.sizes.len() > 1
    }

    /// Weights normalized to sum to 1; empty when all weights are zero
    pub fn normalized_weights(&self) -> Vec<f64> {
        if self.total <= 0.0 {
            return Vec::new();
        }
        self.weights.iter().map(|w| w / self.total).collect()
    }

    /// Distribution-weighted average diameter
    pub fn average_diameter(&self) -> f64 {
        if self.sizes.is_empty() {
            return 0.0;
        }
        let total = if self.total > 0.0 { self.total } else { 1.0 };
        self.sizes
            .iter()
            .zip(&self.weights)
            .map(|(size, w)| stone_diameter(size) * w)
            .sum::<f64>()
            / total
    }

    /// Largest diameter any pick can return
    pub fn max_diameter(&self) -> f64 {
        self.sizes
            .iter()
            .map(|s| stone_diameter(s))
            .fold(0.0, f64::max)
    }

    /// Draw a size label
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let Some(first) = self.sizes.first() else {
            return DEFAULT_STONE_SIZE;
        };
        if self.sizes.len() == 1 || self.total <= 0.0 {
            return first;
        }

        let r = uniform(rng, 0.0, self.total);
        let mut cumulative = 0.0;
        for (size, weight) in self.sizes.iter().zip(&self.weights) {
            cumulative += weight;
            if r <= cumulative {
                return size;
            }
        }
        self.sizes.last().map_or(DEFAULT_STONE_SIZE, String::as_str)
    }
}
