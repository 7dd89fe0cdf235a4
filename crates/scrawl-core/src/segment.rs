//! The line segment, the single drawable unit.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// One drawn stroke unit: two canvas-space endpoints plus style.
///
/// Field names match the wire format exactly; a segment is created per
/// pointer move while drawing, transmitted once, and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    /// Stroke color as a hex string (`#rgb` / `#rrggbb` / `#rrggbbaa`).
    pub color: String,
    /// Stroke width in pixels.
    pub size: f64,
}

impl Segment {
    /// Create a segment between two points.
    pub fn new(start: Point, end: Point, color: impl Into<String>, size: f64) -> Self {
        Self {
            x0: start.x,
            y0: start.y,
            x1: end.x,
            y1: end.y,
            color: color.into(),
            size,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn length(&self) -> f64 {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        (dx * dx + dy * dy).sqrt()
    }

    /// Axis-aligned bounding box of the stroked segment, including the
    /// half-width overhang of the round caps.
    pub fn bounds(&self) -> Rect {
        let radius = self.size / 2.0;
        Rect::new(
            self.x0.min(self.x1) - radius,
            self.y0.min(self.y1) - radius,
            self.x0.max(self.x1) + radius,
            self.y0.max(self.y1) + radius,
        )
    }

    /// Distance from a point to the stroked centerline, clamped to the
    /// segment. Degenerate zero-length segments measure to the single point.
    pub fn distance_to(&self, point: Point) -> f64 {
        let line_vec = kurbo::Vec2::new(self.x1 - self.x0, self.y1 - self.y0);
        let point_vec = kurbo::Vec2::new(point.x - self.x0, point.y - self.y0);

        let line_len_sq = line_vec.hypot2();
        if line_len_sq < f64::EPSILON {
            return point_vec.hypot();
        }

        let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
        let projection = Point::new(self.x0 + t * line_vec.x, self.y0 + t * line_vec.y);
        ((point.x - projection.x).powi(2) + (point.y - projection.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0), "#000", 2.0);
        assert!((seg.length() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_to_segment() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "#000", 2.0);
        assert!(seg.distance_to(Point::new(50.0, 0.0)) < f64::EPSILON);
        assert!((seg.distance_to(Point::new(50.0, 3.0)) - 3.0).abs() < f64::EPSILON);
        // Past the endpoint the distance clamps to the cap.
        assert!((seg.distance_to(Point::new(110.0, 0.0)) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_to_degenerate() {
        let seg = Segment::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0), "#000", 2.0);
        assert!((seg.distance_to(Point::new(8.0, 9.0)) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_includes_cap() {
        let seg = Segment::new(Point::new(10.0, 20.0), Point::new(30.0, 20.0), "#000", 4.0);
        let b = seg.bounds();
        assert!((b.x0 - 8.0).abs() < f64::EPSILON);
        assert!((b.y0 - 18.0).abs() < f64::EPSILON);
        assert!((b.x1 - 32.0).abs() < f64::EPSILON);
        assert!((b.y1 - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_field_names() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), "#000", 2.0);
        let json: serde_json::Value = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["x0"], 0.0);
        assert_eq!(json["x1"], 10.0);
        assert_eq!(json["y1"], 10.0);
        assert_eq!(json["color"], "#000");
        assert_eq!(json["size"], 2.0);
    }
}
