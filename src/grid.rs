//! Adaptive multi-resolution field-point grid (C7)

use crate::elements::BoundaryElement;
use crate::geometry::{Boundary, Point2D, Rect2D};
use serde::{Deserialize, Serialize};

/// A single field point with its validity flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldPoint {
    pub location: Point2D,
    /// True if the point falls inside an excavation boundary and
    /// should be excluded from evaluation.
    pub inside_excavation: bool,
    /// True if the point is nearer to a boundary element than the
    /// minimum standoff distance, where the kernel loses accuracy.
    pub too_close_to_element: bool,
}

impl FieldPoint {
    pub fn is_valid(&self) -> bool {
        !self.inside_excavation && !self.too_close_to_element
    }
}

/// Controls for the adaptive grid generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridConfig {
    /// Spacing of the coarse background grid.
    pub coarse_spacing: f64,
    /// Spacing of the near-boundary refinement band.
    pub near_boundary_spacing: f64,
    /// Width of the near-boundary refinement band, in multiples of
    /// `coarse_spacing`.
    pub near_boundary_band_width: f64,
    /// Spacing of the corner-refinement patches.
    pub corner_spacing: f64,
    /// Radius of a corner-refinement patch, in multiples of
    /// `corner_spacing`.
    pub corner_patch_radius: f64,
    /// Interior-angle threshold, in degrees, below which a vertex is
    /// considered high-curvature and gets a corner-refinement patch.
    pub high_curvature_angle_deg: f64,
    /// Minimum allowed distance from a field point to the nearest
    /// element midpoint before it is flagged `too_close_to_element`.
    pub min_standoff: f64,
    /// Enable the gradient-adaptive fourth level (requires a first
    /// pass of coarse results; the orchestrator drives this).
    pub use_gradient_adaptive: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            coarse_spacing: 5.0,
            near_boundary_spacing: 1.0,
            near_boundary_band_width: 3.0,
            corner_spacing: 0.25,
            corner_patch_radius: 4.0,
            high_curvature_angle_deg: 135.0,
            min_standoff: 0.1,
            use_gradient_adaptive: false,
        }
    }
}

/// Generate the coarse background grid over `bounds`, inflated by
/// `inflate`.
fn coarse_level(bounds: &Rect2D, spacing: f64, inflate: f64) -> Vec<Point2D> {
    let region = bounds.inflate(inflate);
    let mut points = Vec::new();
    let mut x = region.min_x;
    while x <= region.max_x {
        let mut y = region.min_y;
        while y <= region.max_y {
            points.push(Point2D::new(x, y));
            y += spacing;
        }
        x += spacing;
    }
    points
}

/// Generate a band of points following each element's chord, offset
/// outward by `spacing`, `2*spacing`, ... up to `band_width *
/// spacing`.
fn near_boundary_level(elements: &[BoundaryElement], spacing: f64, band_width: f64) -> Vec<Point2D> {
    let rings = band_width.max(1.0).round() as u32;
    let mut points = Vec::new();
    for e in elements {
        let normal = (-e.sin_beta, e.cos_beta);
        for ring in 1..=rings {
            let offset = spacing * ring as f64;
            points.push(Point2D::new(
                e.midpoint.x + normal.0 * offset,
                e.midpoint.y + normal.1 * offset,
            ));
            points.push(Point2D::new(
                e.midpoint.x - normal.0 * offset,
                e.midpoint.y - normal.1 * offset,
            ));
        }
    }
    points
}

/// Generate a dense local patch of points around every boundary vertex
/// whose interior angle falls below `high_curvature_angle_deg` (stress
/// gradients are steepest at sharp corners; gentle vertices don't earn
/// the extra density).
fn corner_level(boundaries: &[Boundary], spacing: f64, patch_radius: f64, high_curvature_angle_deg: f64) -> Vec<Point2D> {
    let radius = patch_radius * spacing;
    let steps = patch_radius.max(1.0).round() as i32;
    let mut points = Vec::new();
    for boundary in boundaries {
        for (i, vertex) in boundary.vertices.iter().enumerate() {
            if boundary.interior_angle_deg(i) >= high_curvature_angle_deg {
                continue;
            }
            for di in -steps..=steps {
                for dj in -steps..=steps {
                    let dx = di as f64 * spacing;
                    let dy = dj as f64 * spacing;
                    if dx * dx + dy * dy <= radius * radius {
                        points.push(Point2D::new(vertex.x + dx, vertex.y + dy));
                    }
                }
            }
        }
    }
    points
}

/// Refine around points whose field value (from a prior coarse pass)
/// exceeds `threshold`, inserting a local patch of finer points.
fn gradient_adaptive_level(seed_points: &[(Point2D, f64)], threshold: f64, spacing: f64) -> Vec<Point2D> {
    let mut points = Vec::new();
    for &(p, value) in seed_points {
        if value.abs() > threshold {
            for di in -1..=1 {
                for dj in -1..=1 {
                    if di == 0 && dj == 0 {
                        continue;
                    }
                    points.push(Point2D::new(p.x + di as f64 * spacing, p.y + dj as f64 * spacing));
                }
            }
        }
    }
    points
}

/// Deduplicate points within `tolerance` of one another, keeping the
/// first occurrence (coarse points are generated before finer ones, so
/// a finer duplicate near a coarse point is dropped in favour of the
/// coarse one... overlap is resolved by simple proximity merge, not by
/// level priority).
fn merge_overlapping(points: Vec<Point2D>, tolerance: f64) -> Vec<Point2D> {
    let mut merged: Vec<Point2D> = Vec::with_capacity(points.len());
    'outer: for p in points {
        for m in &merged {
            if p.distance_to(m) < tolerance {
                continue 'outer;
            }
        }
        merged.push(p);
    }
    merged
}

fn nearest_element_distance(p: &Point2D, elements: &[BoundaryElement]) -> f64 {
    elements
        .iter()
        .map(|e| p.distance_to(&e.midpoint))
        .fold(f64::INFINITY, f64::min)
}

/// Build the adaptive field-point grid for a solved model: coarse
/// background, near-boundary band, and corner patches, merged and
/// flagged for validity. The gradient-adaptive fourth level is added
/// separately by [`refine_with_gradient`] once a first field
/// evaluation pass is available.
pub fn generate(boundaries: &[Boundary], elements: &[BoundaryElement], config: &GridConfig) -> Vec<FieldPoint> {
    let bounds = boundaries
        .iter()
        .map(|b| b.bounds())
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Rect2D::new(0.0, 0.0, 0.0, 0.0));

    let mut points = coarse_level(&bounds, config.coarse_spacing, config.coarse_spacing * 2.0);
    points.extend(near_boundary_level(elements, config.near_boundary_spacing, config.near_boundary_band_width));
    points.extend(corner_level(boundaries, config.corner_spacing, config.corner_patch_radius, config.high_curvature_angle_deg));

    let merged = merge_overlapping(points, config.min_standoff * 0.5);

    classify(merged, boundaries, elements, config.min_standoff)
}

/// Add a gradient-adaptive refinement pass around points whose
/// evaluated field value exceeds `threshold`, and return the combined,
/// re-deduplicated, re-classified set.
pub fn refine_with_gradient(
    existing: &[FieldPoint],
    seed_values: &[(Point2D, f64)],
    threshold: f64,
    spacing: f64,
    boundaries: &[Boundary],
    elements: &[BoundaryElement],
    min_standoff: f64,
) -> Vec<FieldPoint> {
    let mut points: Vec<Point2D> = existing.iter().map(|fp| fp.location).collect();
    points.extend(gradient_adaptive_level(seed_values, threshold, spacing));
    let merged = merge_overlapping(points, min_standoff * 0.5);
    classify(merged, boundaries, elements, min_standoff)
}

fn classify(points: Vec<Point2D>, boundaries: &[Boundary], elements: &[BoundaryElement], min_standoff: f64) -> Vec<FieldPoint> {
    points
        .into_iter()
        .map(|p| {
            let inside_excavation = boundaries.iter().any(|b| b.contains_point(&p));
            let too_close_to_element = nearest_element_distance(&p, elements) < min_standoff;
            FieldPoint {
                location: p,
                inside_excavation,
                too_close_to_element,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementOrder;

    fn square_boundary() -> Boundary {
        Boundary::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
                Point2D::new(0.0, 10.0),
            ],
            false,
        )
    }

    fn ring_elements() -> Vec<BoundaryElement> {
        (0..8)
            .map(|i| {
                let a_angle = i as f64 / 8.0 * std::f64::consts::TAU;
                let b_angle = (i + 1) as f64 / 8.0 * std::f64::consts::TAU;
                let a = Point2D::new(5.0 + 2.0 * a_angle.cos(), 5.0 + 2.0 * a_angle.sin());
                let b = Point2D::new(5.0 + 2.0 * b_angle.cos(), 5.0 + 2.0 * b_angle.sin());
                BoundaryElement::new(a, b, ElementOrder::Constant, 0, false)
            })
            .collect()
    }

    #[test]
    fn generated_grid_is_non_empty() {
        let boundaries = vec![square_boundary()];
        let elements = ring_elements();
        let grid = generate(&boundaries, &elements, &GridConfig::default());
        assert!(!grid.is_empty());
    }

    #[test]
    fn points_inside_excavation_are_flagged_invalid() {
        let boundaries = vec![square_boundary()];
        let elements = ring_elements();
        let mut config = GridConfig::default();
        config.coarse_spacing = 1.0;
        let grid = generate(&boundaries, &elements, &config);
        assert!(grid.iter().any(|fp| fp.inside_excavation));
        assert!(grid.iter().any(|fp| fp.is_valid()));
    }

    #[test]
    fn merge_overlapping_drops_near_duplicates() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.001, 0.0),
            Point2D::new(5.0, 5.0),
        ];
        let merged = merge_overlapping(points, 0.1);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn gradient_refinement_adds_points_near_high_value_seeds() {
        let boundaries = vec![square_boundary()];
        let elements = ring_elements();
        let config = GridConfig::default();
        let base = generate(&boundaries, &elements, &config);
        let seeds = vec![(Point2D::new(1.0, 1.0), 1.0e9)];
        let refined = refine_with_gradient(&base, &seeds, 1.0e6, 0.2, &boundaries, &elements, config.min_standoff);
        assert!(refined.len() >= base.len());
    }
}
