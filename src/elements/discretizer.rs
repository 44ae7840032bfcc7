//! Adaptive subdivision of closed boundaries into boundary elements (C3)

use super::{BoundaryElement, ElementOrder};
use crate::error::BemResult;
use crate::geometry::Boundary;
use serde::{Deserialize, Serialize};

/// Options controlling discretisation. Mirrors the subset of
/// [`crate::config::BemConfig`] that the discretiser consumes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiscretizeOptions {
    pub target_element_count: u32,
    pub element_order: ElementOrder,
    pub use_adaptive_sizing: bool,
    pub max_refinement_factor: f64,
}

impl Default for DiscretizeOptions {
    fn default() -> Self {
        Self {
            target_element_count: 100,
            element_order: ElementOrder::Constant,
            use_adaptive_sizing: false,
            max_refinement_factor: 3.0,
        }
    }
}

/// Discretise a set of closed boundaries into boundary elements.
///
/// Deterministic in its inputs: equal boundaries + options always
/// produce an equal element sequence, in boundary order then segment
/// order then sub-element order (testable property 1, §8).
pub fn discretize(
    boundaries: &[Boundary],
    options: &DiscretizeOptions,
) -> BemResult<Vec<BoundaryElement>> {
    for b in boundaries {
        b.validate()?;
    }

    let total_perimeter: f64 = boundaries.iter().map(|b| b.length()).sum();
    let target = options.target_element_count.max(1) as f64;
    let h = total_perimeter / target;

    let mut elements = Vec::new();

    for (boundary_id, boundary) in boundaries.iter().enumerate() {
        let n = boundary.vertices.len();
        let segments = boundary.segments();

        for (seg_idx, (a, b)) in segments.iter().enumerate() {
            let length = a.distance_to(b);
            let base_count = ((length / h) + 0.5).floor().max(1.0) as u32;

            let count = if options.use_adaptive_sizing {
                // Interior angle at the starting vertex of this segment.
                let theta = boundary.interior_angle_deg(seg_idx % n);
                let f = 1.0 + ((180.0 - theta).abs() / 180.0) * (options.max_refinement_factor - 1.0);
                ((base_count as f64 * f) + 0.5).floor().max(1.0) as u32
            } else {
                base_count
            };

            for k in 0..count {
                let t0 = k as f64 / count as f64;
                let t1 = (k + 1) as f64 / count as f64;
                let p0 = crate::geometry::Point2D::new(
                    a.x + t0 * (b.x - a.x),
                    a.y + t0 * (b.y - a.y),
                );
                let p1 = crate::geometry::Point2D::new(
                    a.x + t1 * (b.x - a.x),
                    a.y + t1 * (b.y - a.y),
                );
                elements.push(BoundaryElement::new(
                    p0,
                    p1,
                    options.element_order,
                    boundary_id,
                    boundary.is_ground_surface,
                ));
            }
        }
    }

    Ok(elements)
}
