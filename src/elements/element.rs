//! Boundary element: a straight segment carrying a boundary condition

use crate::geometry::Point2D;
use serde::{Deserialize, Serialize};

/// Collocation/interpolation order of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementOrder {
    Constant = 1,
    Linear = 2,
    Quadratic = 3,
}

impl ElementOrder {
    pub fn node_count(self) -> usize {
        self as usize
    }
}

/// Boundary-condition type applied to an element, in the element-local
/// normal/shear frame. Any value outside 1-4 is a programming error
/// (see [`crate::error::BemError::InvalidBoundaryConditionType`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BcType {
    /// Prescribed traction (normal, shear)
    Traction = 1,
    /// Prescribed displacement (normal, shear)
    Displacement = 2,
    /// Prescribed normal displacement, shear traction
    MixedNormalDispShearStress = 3,
    /// Prescribed normal traction, shear displacement
    MixedNormalStressShearDisp = 4,
}

impl BcType {
    pub fn from_u8(v: u8) -> Option<BcType> {
        match v {
            1 => Some(BcType::Traction),
            2 => Some(BcType::Displacement),
            3 => Some(BcType::MixedNormalDispShearStress),
            4 => Some(BcType::MixedNormalStressShearDisp),
            _ => None,
        }
    }
}

/// A straight boundary element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryElement {
    pub a: Point2D,
    pub b: Point2D,
    /// Midpoint (A+B)/2
    pub midpoint: Point2D,
    /// Half-length |B-A|/2
    pub half_length: f64,
    /// Direction cosine along the chord, x-component
    pub cos_beta: f64,
    /// Direction cosine along the chord, y-component
    pub sin_beta: f64,
    pub order: ElementOrder,
    pub bc_type: BcType,
    /// (normal, shear) BC magnitudes in the element-local frame
    pub bc_normal: f64,
    pub bc_shear: f64,
    /// Which source boundary this element came from
    pub boundary_id: usize,
    pub is_ground_surface: bool,
}

impl BoundaryElement {
    pub fn new(
        a: Point2D,
        b: Point2D,
        order: ElementOrder,
        boundary_id: usize,
        is_ground_surface: bool,
    ) -> Self {
        let midpoint = a.midpoint(&b);
        let chord = b - a;
        let length = chord.length();
        assert!(length > 0.0, "boundary element has zero length");
        let dir = chord.normalized();
        Self {
            a,
            b,
            midpoint,
            half_length: length / 2.0,
            cos_beta: dir.x,
            sin_beta: dir.y,
            order,
            bc_type: BcType::Traction,
            bc_normal: 0.0,
            bc_shear: 0.0,
            boundary_id,
            is_ground_surface,
        }
    }

    pub fn length(&self) -> f64 {
        self.half_length * 2.0
    }

    /// Collocation nodes in the element-local chord parameter t in
    /// [-half_length, half_length], measured from the midpoint.
    pub fn collocation_offsets(&self) -> Vec<f64> {
        match self.order {
            ElementOrder::Constant => vec![0.0],
            ElementOrder::Linear => {
                let f = std::f64::consts::FRAC_1_SQRT_2;
                vec![-f * self.half_length, f * self.half_length]
            }
            ElementOrder::Quadratic => {
                let f = (3.0_f64).sqrt() / 2.0;
                vec![-f * self.half_length, 0.0, f * self.half_length]
            }
        }
    }

    /// Collocation nodes in global coordinates.
    pub fn collocation_points(&self) -> Vec<Point2D> {
        self.collocation_offsets()
            .into_iter()
            .map(|t| Point2D::new(self.midpoint.x + t * self.cos_beta, self.midpoint.y + t * self.sin_beta))
            .collect()
    }

    /// `|cos^2(beta) + sin^2(beta) - 1| < 1e-4` invariant check.
    pub fn direction_cosines_normalized(&self) -> bool {
        (self.cos_beta.powi(2) + self.sin_beta.powi(2) - 1.0).abs() < 1e-4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_element_has_unit_x_direction() {
        let e = BoundaryElement::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            ElementOrder::Constant,
            0,
            false,
        );
        assert!((e.cos_beta - 1.0).abs() < 1e-12);
        assert!(e.sin_beta.abs() < 1e-12);
        assert!((e.half_length - 1.0).abs() < 1e-12);
    }

    #[test]
    fn direction_cosines_are_normalized() {
        let e = BoundaryElement::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 4.0),
            ElementOrder::Constant,
            0,
            false,
        );
        assert!(e.direction_cosines_normalized());
    }

    #[test]
    fn quadratic_collocation_has_three_nodes() {
        let e = BoundaryElement::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            ElementOrder::Quadratic,
            0,
            false,
        );
        assert_eq!(e.collocation_offsets().len(), 3);
    }

    #[test]
    fn bc_type_round_trips_from_u8() {
        assert_eq!(BcType::from_u8(1), Some(BcType::Traction));
        assert_eq!(BcType::from_u8(4), Some(BcType::MixedNormalStressShearDisp));
        assert_eq!(BcType::from_u8(5), None);
    }
}
