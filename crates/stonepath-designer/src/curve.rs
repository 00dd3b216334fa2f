//! Curve model and arc-length sampler.
//!
//! A [`Curve`] is a read-only snapshot of a host path: an ordered list of
//! line or cubic Bezier segments. The sampler maps a linear distance along the
//! curve to a point and a tangent angle. Both curve fill and path arrays walk
//! curves through [`Curve::point_at_distance`].

use serde::{Deserialize, Serialize};
use stonepath_core::geometry::{
    bezier_length, bezier_point, Point, BEZIER_LENGTH_SAMPLES, TANGENT_DELTA,
};
use stonepath_core::Bounds;

/// One segment of a host path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub control1: Option<Point>,
    #[serde(default)]
    pub control2: Option<Point>,
    #[serde(default)]
    pub is_bezier: bool,
}

impl CurveSegment {
    /// Straight segment
    pub fn line(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            control1: None,
            control2: None,
            is_bezier: false,
        }
    }

    /// Cubic Bezier segment
    pub fn cubic(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        Self {
            start,
            end,
            control1: Some(control1),
            control2: Some(control2),
            is_bezier: true,
        }
    }

    /// Control points when the segment is evaluated as a Bezier
    fn controls(&self) -> Option<(Point, Point)> {
        if !self.is_bezier {
            return None;
        }
        Some((self.control1?, self.control2?))
    }

    /// Point at parameter `t` in `[0, 1]`
    pub fn point_at(&self, t: f64) -> Point {
        match self.controls() {
            Some((c1, c2)) => bezier_point(t, self.start, c1, c2, self.end),
            None => self.start.lerp(&self.end, t),
        }
    }

    /// Tangent angle at `t`, estimated from samples at `t ± 0.001`
    /// clamped to the segment
    pub fn tangent_at(&self, t: f64) -> f64 {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        self.point_at(t1).angle_to(&self.point_at(t2))
    }

    /// Straight-line length, or the sampled Bezier arc length
    pub fn length(&self) -> f64 {
        match self.controls() {
            Some((c1, c2)) => bezier_length(self.start, c1, c2, self.end, BEZIER_LENGTH_SAMPLES),
            None => self.start.distance_to(&self.end),
        }
    }
}

/// A point sampled on a curve together with its tangent angle (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub point: Point,
    pub angle: f64,
}

/// Ordered sequence of segments with cached per-segment lengths
#[derive(Debug, Clone, Default)]
pub struct Curve {
    segments: Vec<CurveSegment>,
    lengths: Vec<f64>,
    total_length: f64,
}

impl Curve {
    /// Snapshot a list of segments
    pub fn new(segments: Vec<CurveSegment>) -> Self {
        let lengths: Vec<f64> = segments.iter().map(CurveSegment::length).collect();
        let total_length = lengths.iter().sum();
        Self {
            segments,
            lengths,
            total_length,
        }
    }

    /// Curve through a list of points, optionally closed back to the first
    pub fn from_polyline(points: &[Point], closed: bool) -> Self {
        let mut segments: Vec<CurveSegment> = points
            .windows(2)
            .map(|w| CurveSegment::line(w[0], w[1]))
            .collect();
        if closed && points.len() > 2 {
            segments.push(CurveSegment::line(points[points.len() - 1], points[0]));
        }
        Self::new(segments)
    }

    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the last segment ends where the first one starts
    pub fn is_closed(&self) -> bool {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => first.start.distance_to(&last.end) < 1e-9,
            _ => false,
        }
    }

    /// Sum of per-segment lengths
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Point and tangent at distance `d` along the curve.
    ///
    /// Distances past the end clamp to the final point and end tangent.
    /// Returns `None` only for a curve without segments.
    pub fn try_point_at_distance(&self, d: f64) -> Option<CurveSample> {
        let last = self.segments.last()?;
        let mut accumulated = 0.0;

        for (segment, &seg_len) in self.segments.iter().zip(&self.lengths) {
            if accumulated + seg_len >= d {
                let t = if seg_len > 0.0 {
                    ((d - accumulated) / seg_len).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                return Some(CurveSample {
                    point: segment.point_at(t),
                    angle: segment.tangent_at(t),
                });
            }
            accumulated += seg_len;
        }

        Some(CurveSample {
            point: last.end,
            angle: last.tangent_at(1.0),
        })
    }

    /// Like [`Curve::try_point_at_distance`], falling back to the origin with
    /// angle 0 for an empty curve. The fallback is logged.
    pub fn point_at_distance(&self, d: f64) -> CurveSample {
        self.try_point_at_distance(d).unwrap_or_else(|| {
            tracing::warn!("Sampled an empty curve at {:.3}; using origin fallback", d);
            CurveSample {
                point: Point::origin(),
                angle: 0.0,
            }
        })
    }

    /// Flatten into a polyline with `steps_per_curve` samples per Bezier
    /// segment. Line segments contribute their end points only.
    pub fn flatten(&self, steps_per_curve: usize) -> Vec<Point> {
        let mut points = Vec::new();
        let steps = steps_per_curve.max(1);

        for segment in &self.segments {
            if points.last() != Some(&segment.start) {
                points.push(segment.start);
            }
            if segment.controls().is_some() {
                for i in 1..=steps {
                    points.push(segment.point_at(i as f64 / steps as f64));
                }
            } else {
                points.push(segment.end);
            }
        }

        points
    }

    /// Bounding box of the flattened curve
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.flatten(BEZIER_LENGTH_SAMPLES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn straight(len: f64) -> Curve {
        Curve::new(vec![CurveSegment::line(Point::new(0.0, 0.0), Point::new(len, 0.0))])
    }

    #[test]
    fn test_line_segment_length_and_point() {
        let seg = CurveSegment::line(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((seg.length() - 5.0).abs() < EPS);
        assert_eq!(seg.point_at(0.5), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_bezier_flag_without_controls_is_line() {
        let mut seg = CurveSegment::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        seg.is_bezier = true;
        assert!((seg.length() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_controls_ignored_when_not_bezier() {
        let mut seg = CurveSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(10.0, 50.0),
            Point::new(10.0, 0.0),
        );
        seg.is_bezier = false;
        assert!((seg.length() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_total_length_sums_segments() {
        let curve = Curve::from_polyline(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.0)],
            false,
        );
        assert!((curve.total_length() - 15.0).abs() < EPS);

        let closed = Curve::from_polyline(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            true,
        );
        assert_eq!(closed.segments().len(), 3);
        assert!(closed.is_closed());
        assert!(!curve.is_closed());
        assert!(!Curve::default().is_closed());
    }

    #[test]
    fn test_point_at_distance_on_second_segment() {
        let curve = Curve::from_polyline(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            false,
        );
        let sample = curve.point_at_distance(15.0);
        assert!((sample.point.x - 10.0).abs() < EPS);
        assert!((sample.point.y - 5.0).abs() < EPS);
        assert!((sample.angle - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_past_end_clamps_idempotently() {
        let curve = straight(100.0);
        let a = curve.point_at_distance(150.0);
        let b = curve.point_at_distance(1_000.0);
        assert_eq!(a, b);
        assert_eq!(a.point, Point::new(100.0, 0.0));
        assert!(a.angle.abs() < EPS);
    }

    #[test]
    fn test_empty_curve_fallback() {
        let curve = Curve::default();
        assert!(curve.try_point_at_distance(5.0).is_none());
        let sample = curve.point_at_distance(5.0);
        assert_eq!(sample.point, Point::origin());
        assert_eq!(sample.angle, 0.0);
    }

    #[test]
    fn test_zero_length_segment_is_skipped_safely() {
        let curve = Curve::new(vec![
            CurveSegment::line(Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            CurveSegment::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
        ]);
        let sample = curve.point_at_distance(0.0);
        assert_eq!(sample.point, Point::new(0.0, 0.0));
        let sample = curve.point_at_distance(4.0);
        assert!((sample.point.x - 4.0).abs() < EPS);
    }

    #[test]
    fn test_flatten_and_bounds() {
        let curve = Curve::new(vec![CurveSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        )]);
        let pts = curve.flatten(8);
        assert_eq!(pts.len(), 9);
        let b = curve.bounds().unwrap();
        assert!(b.top > 7.0 && b.top <= 7.5 + EPS);
        assert!((b.right - 10.0).abs() < EPS);
    }
}
