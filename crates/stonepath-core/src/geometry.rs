//! Geometry kernel
//!
//! Pure functions over document-space coordinates (millimeters): interpolation,
//! angle handling, point rotation, cubic Bezier evaluation and arc-length
//! approximation. Angles are in degrees unless a name says otherwise.

use serde::{Deserialize, Serialize};

/// Number of uniform-t samples used to approximate a Bezier arc length.
pub const BEZIER_LENGTH_SAMPLES: usize = 20;

/// Parameter step used for finite-difference tangent estimation.
pub const TANGENT_DELTA: f64 = 0.001;

/// A point in document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }

    /// Squared distance to another point
    pub fn distance_squared_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Bearing from this point to another, in degrees
    pub fn angle_to(&self, other: &Point) -> f64 {
        angle_between(self.x, self.y, other.x, other.y)
    }

    /// Point reached by travelling `dist` along bearing `angle_deg`
    pub fn offset_along(&self, angle_deg: f64, dist: f64) -> Point {
        let rad = angle_deg.to_radians();
        Point::new(self.x + dist * rad.cos(), self.y + dist * rad.sin())
    }

    /// Linear interpolation between two points
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp a value between min and max
pub fn clamp(value: f64, min_val: f64, max_val: f64) -> f64 {
    min_val.max(max_val.min(value))
}

/// Wrap an angle into `[0, 360)`
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Angle rotated by 90 degrees, normalized
pub fn perpendicular_angle(angle: f64) -> f64 {
    normalize_angle(angle + 90.0)
}

/// Rotate `point` by `angle_deg` around `center`
pub fn rotate_point(point: Point, angle_deg: f64, center: Point) -> Point {
    let rad = angle_deg.to_radians();
    let (sin_a, cos_a) = rad.sin_cos();

    let tx = point.x - center.x;
    let ty = point.y - center.y;

    Point::new(
        tx * cos_a - ty * sin_a + center.x,
        tx * sin_a + ty * cos_a + center.y,
    )
}

/// Distance between two coordinates
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

/// Bearing from point 1 to point 2 in degrees, via atan2
pub fn angle_between(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (y2 - y1).atan2(x2 - x1).to_degrees()
}

/// Midpoint of two points
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Point on a cubic Bezier at parameter `t` (Bernstein blend)
pub fn bezier_point(t: f64, p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    Point::new(
        mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x,
        mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y,
    )
}

/// Polyline approximation of a cubic Bezier's arc length over `segments`
/// uniform-t steps
pub fn bezier_length(p0: Point, p1: Point, p2: Point, p3: Point, segments: usize) -> f64 {
    let segments = segments.max(1);
    let mut total = 0.0;
    let mut prev = p0;

    for i in 1..=segments {
        let t = i as f64 / segments as f64;
        let curr = bezier_point(t, p0, p1, p2, p3);
        total += prev.distance_to(&curr);
        prev = curr;
    }

    total
}

/// Ray-casting point-in-polygon test. Polygons with fewer than three
/// vertices contain nothing.
pub fn point_in_polygon(x: f64, y: f64, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > y) != (pj.y > y) {
            let x_cross = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}
