//! Axis-aligned rectangle

use super::Point2D;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `min` inclusive, `max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect2D {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_points(points: &[Point2D]) -> Self {
        assert!(!points.is_empty(), "cannot bound an empty point set");
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x, max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow the rectangle by `d` on every side.
    pub fn inflate(&self, d: f64) -> Rect2D {
        Rect2D::new(
            self.min_x - d,
            self.min_y - d,
            self.max_x + d,
            self.max_y + d,
        )
    }

    pub fn union(&self, other: &Rect2D) -> Rect2D {
        Rect2D::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn intersects(&self, other: &Rect2D) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_bounds_all() {
        let pts = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, -2.0),
            Point2D::new(-3.0, 8.0),
        ];
        let r = Rect2D::from_points(&pts);
        assert_eq!(r.min_x, -3.0);
        assert_eq!(r.min_y, -2.0);
        assert_eq!(r.max_x, 5.0);
        assert_eq!(r.max_y, 8.0);
    }

    #[test]
    fn inflate_grows_all_sides() {
        let r = Rect2D::new(0.0, 0.0, 10.0, 10.0).inflate(2.0);
        assert_eq!(r.min_x, -2.0);
        assert_eq!(r.max_x, 12.0);
    }

    #[test]
    fn intersects_detects_overlap() {
        let a = Rect2D::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect2D::new(4.0, 4.0, 10.0, 10.0);
        let c = Rect2D::new(6.0, 6.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn contains_point() {
        let r = Rect2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(&Point2D::new(5.0, 5.0)));
        assert!(!r.contains(&Point2D::new(11.0, 5.0)));
    }
}
