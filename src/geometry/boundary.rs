//! Closed polygonal boundary

use super::{Point2D, Rect2D};
use crate::error::{BemError, BemResult};
use serde::{Deserialize, Serialize};

const COINCIDENCE_TOLERANCE: f64 = 1e-9;

/// An ordered, logically-closed sequence of vertices (last -> first is a
/// segment). Passed by value into the core and never mutated by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub vertices: Vec<Point2D>,
    /// Marks this boundary as the (traction-free) ground surface when
    /// the half-space option is active.
    pub is_ground_surface: bool,
}

impl Boundary {
    pub fn new(vertices: Vec<Point2D>, is_ground_surface: bool) -> Self {
        Self {
            vertices,
            is_ground_surface,
        }
    }

    /// Validate the boundary per the invariants in the data model: at
    /// least 3 vertices, no two consecutive vertices coincident, and a
    /// positive total length.
    pub fn validate(&self) -> BemResult<()> {
        if self.vertices.len() < 3 {
            return Err(BemError::InvalidBoundary(format!(
                "boundary needs at least 3 vertices, got {}",
                self.vertices.len()
            )));
        }
        for v in &self.vertices {
            if !v.is_finite() {
                return Err(BemError::InvalidBoundary(
                    "boundary vertex is not finite".to_string(),
                ));
            }
        }
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if a.distance_to(&b) < COINCIDENCE_TOLERANCE {
                return Err(BemError::InvalidBoundary(format!(
                    "consecutive vertices {} and {} coincide",
                    i,
                    (i + 1) % n
                )));
            }
        }
        if self.length() <= 0.0 {
            return Err(BemError::InvalidBoundary(
                "boundary has zero total length".to_string(),
            ));
        }
        Ok(())
    }

    /// Segments as (start, end) pairs, closing last -> first.
    pub fn segments(&self) -> Vec<(Point2D, Point2D)> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| (self.vertices[i], self.vertices[(i + 1) % n]))
            .collect()
    }

    pub fn length(&self) -> f64 {
        self.segments().iter().map(|(a, b)| a.distance_to(b)).sum()
    }

    pub fn bounds(&self) -> Rect2D {
        Rect2D::from_points(&self.vertices)
    }

    /// Interior angle at vertex `i`, in degrees, formed by the incoming
    /// segment (i-1 -> i) and outgoing segment (i -> i+1).
    pub fn interior_angle_deg(&self, i: usize) -> f64 {
        let n = self.vertices.len();
        let prev = self.vertices[(i + n - 1) % n];
        let curr = self.vertices[i];
        let next = self.vertices[(i + 1) % n];

        let incoming = curr - prev;
        let outgoing = next - curr;

        let dot = incoming.dot(&outgoing);
        let cross = incoming.cross(&outgoing);
        let turn = cross.atan2(dot).to_degrees();
        180.0 - turn
    }

    /// Ray-cast classification: true if `p` is strictly inside the
    /// polygon (odd crossing count with a ray to +X infinity).
    pub fn contains_point(&self, p: &Point2D) -> bool {
        let mut inside = false;
        for (a, b) in self.segments() {
            let (x1, y1) = (a.x, a.y);
            let (x2, y2) = (b.x, b.y);
            let crosses = (y1 > p.y) != (y2 > p.y);
            if crosses {
                let x_intersect = x1 + (p.y - y1) / (y2 - y1) * (x2 - x1);
                if p.x < x_intersect {
                    inside = !inside;
                }
            }
        }
        inside
    }
}
