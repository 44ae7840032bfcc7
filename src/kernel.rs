//! Closed-form analytical integration of the 2D Kelvin kernel over a
//! straight boundary element (C4).
//!
//! This is the sharpest edge of the design: a Gaussian-quadrature
//! integration of the singular Kelvin kernel produces catastrophically
//! ill-conditioned influence matrices (observed >10^18 in the source
//! this core descends from). Only the closed-form integration below
//! keeps the condition number of the assembled matrix in the O(1)-O(10)
//! range. Any change that reintroduces quadrature for the singular
//! kernel must be rejected — re-validate against a circular excavation
//! (see `tests/circular_excavation.rs`) before shipping any change here.

use crate::elements::BoundaryElement;
use crate::geometry::Point2D;
use crate::material::{Material, PlaneStrainType};

/// The ten influence coefficients produced by a source element at one
/// observation point, in the global frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceCoefficients {
    pub ux_n: f64,
    pub uy_n: f64,
    pub ux_s: f64,
    pub uy_s: f64,
    pub sxx_n: f64,
    pub syy_n: f64,
    pub sxy_n: f64,
    pub sxx_s: f64,
    pub syy_s: f64,
    pub sxy_s: f64,
}

impl InfluenceCoefficients {
    fn zero() -> Self {
        Self {
            ux_n: 0.0,
            uy_n: 0.0,
            ux_s: 0.0,
            uy_s: 0.0,
            sxx_n: 0.0,
            syy_n: 0.0,
            sxy_n: 0.0,
            sxx_s: 0.0,
            syy_s: 0.0,
            sxy_s: 0.0,
        }
    }

    fn add(self, other: InfluenceCoefficients) -> InfluenceCoefficients {
        Self {
            ux_n: self.ux_n + other.ux_n,
            uy_n: self.uy_n + other.uy_n,
            ux_s: self.ux_s + other.ux_s,
            uy_s: self.uy_s + other.uy_s,
            sxx_n: self.sxx_n + other.sxx_n,
            syy_n: self.syy_n + other.syy_n,
            sxy_n: self.sxy_n + other.sxy_n,
            sxx_s: self.sxx_s + other.sxx_s,
            syy_s: self.syy_s + other.syy_s,
            sxy_s: self.sxy_s + other.sxy_s,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.ux_n.is_finite()
            && self.uy_n.is_finite()
            && self.ux_s.is_finite()
            && self.uy_s.is_finite()
            && self.sxx_n.is_finite()
            && self.syy_n.is_finite()
            && self.sxy_n.is_finite()
            && self.sxx_s.is_finite()
            && self.syy_s.is_finite()
            && self.sxy_s.is_finite()
    }
}

/// The four analytical building blocks, computed per §4.2 step 3 of the
/// specification, from the observation point expressed in the source
/// element's local (chord-aligned) frame.
struct BuildingBlocks {
    delta_theta: f64,
    delta_ell: f64,
    s: f64,
    t: f64,
}

const SINGULARITY_EPS: f64 = 1e-12;

fn building_blocks(x_m: f64, y_m: f64, half_length: f64) -> BuildingBlocks {
    let x_left = x_m - half_length;
    let x_right = x_m + half_length;
    let r2_left = x_left * x_left + y_m * y_m;
    let r2_right = x_right * x_right + y_m * y_m;

    // At y_m == 0 the arctangent terms are singular in form but have a
    // well-defined symbolic limit: the element subtends a half-turn
    // (pi) when the observation point lies strictly between its
    // endpoints on the chord line, and zero otherwise. S and T vanish
    // identically at y_m == 0 since both carry an explicit y_m factor.
    let delta_theta = if y_m.abs() < SINGULARITY_EPS {
        if x_left < 0.0 && x_right > 0.0 {
            std::f64::consts::PI
        } else {
            0.0
        }
    } else {
        (x_left / y_m).atan() - (x_right / y_m).atan()
    };

    let ell_l = 0.5 * r2_left.ln();
    let ell_r = 0.5 * r2_right.ln();
    let delta_ell = ell_l - ell_r;

    let s = 2.0 * y_m * (x_left / r2_left - x_right / r2_right);
    let t = 2.0 * y_m * y_m * (1.0 / r2_left - 1.0 / r2_right);

    BuildingBlocks {
        delta_theta,
        delta_ell,
        s,
        t,
    }
}

/// Evaluate the ten influence coefficients in the element's own local
/// frame (x' along the chord, y' the outward normal), then rotate the
/// result back to the global frame using the element's direction
/// cosines.
fn local_frame_coefficients(
    bb: &BuildingBlocks,
    kappa: f64,
    c_s: f64,
    c_d: f64,
    half_length: f64,
) -> InfluenceCoefficients {
    let (dtheta, dell, s, t) = (bb.delta_theta, bb.delta_ell, bb.s, bb.t);

    // Displacement kernel: coefficient maps a traction (Pa) to a
    // displacement (m), so an explicit length factor (half_length)
    // accompanies the dimensionless geometric terms.
    let ux_n = c_d * half_length * ((kappa + 1.0) * dell - s);
    let uy_n = c_d * half_length * ((kappa - 1.0) * dtheta + t);
    let ux_s = c_d * half_length * ((kappa - 1.0) * dtheta - t);
    let uy_s = c_d * half_length * ((kappa + 1.0) * dell + s);

    // Stress kernel: coefficient maps a traction to a stress, both in
    // Pa, so no extra length scale is needed.
    let sxx_n = c_s * (dtheta - s);
    let syy_n = c_s * (dtheta + s);
    let sxy_n = c_s * t;
    let sxx_s = c_s * (-t);
    let syy_s = c_s * t;
    let sxy_s = c_s * dell;

    InfluenceCoefficients {
        ux_n,
        uy_n,
        ux_s,
        uy_s,
        sxx_n,
        syy_n,
        sxy_n,
        sxx_s,
        syy_s,
        sxy_s,
    }
}

/// Rotate a local-frame influence result into the global frame using
/// the source element's direction cosines `(cos_beta, sin_beta)`.
fn rotate_to_global(local: InfluenceCoefficients, cos_beta: f64, sin_beta: f64) -> InfluenceCoefficients {
    let rotate_vec = |vx: f64, vy: f64| -> (f64, f64) {
        (vx * cos_beta - vy * sin_beta, vx * sin_beta + vy * cos_beta)
    };
    let rotate_tensor = |sxx: f64, syy: f64, sxy: f64| -> (f64, f64, f64) {
        let c = cos_beta;
        let sn = sin_beta;
        let gxx = c * c * sxx - 2.0 * c * sn * sxy + sn * sn * syy;
        let gyy = sn * sn * sxx + 2.0 * c * sn * sxy + c * c * syy;
        let gxy = c * sn * (sxx - syy) + (c * c - sn * sn) * sxy;
        (gxx, gyy, gxy)
    };

    let (ux_n, uy_n) = rotate_vec(local.ux_n, local.uy_n);
    let (ux_s, uy_s) = rotate_vec(local.ux_s, local.uy_s);
    let (sxx_n, syy_n, sxy_n) = rotate_tensor(local.sxx_n, local.syy_n, local.sxy_n);
    let (sxx_s, syy_s, sxy_s) = rotate_tensor(local.sxx_s, local.syy_s, local.sxy_s);

    InfluenceCoefficients {
        ux_n,
        uy_n,
        ux_s,
        uy_s,
        sxx_n,
        syy_n,
        sxy_n,
        sxx_s,
        syy_s,
        sxy_s,
    }
}

/// Evaluate the direct (full-space) contribution of `element` at global
/// point `p`.
fn direct_contribution(
    p: Point2D,
    element: &BoundaryElement,
    material: &Material,
    plane_type: PlaneStrainType,
) -> InfluenceCoefficients {
    let d = p - element.midpoint;
    let cos_b = element.cos_beta;
    let sin_b = element.sin_beta;
    // Local frame: x' along (cos_b, sin_b), y' along the outward normal
    // (-sin_b, cos_b).
    let x_m = d.x * cos_b + d.y * sin_b;
    let y_m = -d.x * sin_b + d.y * cos_b;

    let bb = building_blocks(x_m, y_m, element.half_length);
    let local = local_frame_coefficients(
        &bb,
        material.kappa_for(plane_type),
        material.stress_coefficient(),
        material.displacement_coefficient(),
        element.half_length,
    );
    rotate_to_global(local, cos_b, sin_b)
}

/// Evaluate the ten influence coefficients of `element` at observation
/// point `p`, in the global frame, under plane strain.
///
/// When `half_space` is set, the mirror-image element reflected across
/// `ground_surface_y` is added so that the combined kernel drives the
/// traction on `y = ground_surface_y` toward zero far from any loaded
/// boundary (the free-surface condition, §4.2 step 6 / testable
/// property 6).
pub fn influence_at(
    p: Point2D,
    element: &BoundaryElement,
    material: &Material,
    ground_surface_y: f64,
    half_space: bool,
) -> InfluenceCoefficients {
    influence_at_for(p, element, material, ground_surface_y, half_space, PlaneStrainType::PlaneStrain)
}

/// As [`influence_at`], but under an explicitly chosen plane-strain or
/// plane-stress idealisation (§6 `SolverOptions::plane_strain_type`).
///
/// # Panics
/// Panics if the element has non-finite endpoints or zero length —
/// both are invariant violations the discretiser (C3) must never
/// produce.
pub fn influence_at_for(
    p: Point2D,
    element: &BoundaryElement,
    material: &Material,
    ground_surface_y: f64,
    half_space: bool,
    plane_type: PlaneStrainType,
) -> InfluenceCoefficients {
    assert!(p.is_finite(), "observation point must be finite");
    assert!(
        element.a.is_finite() && element.b.is_finite(),
        "element endpoints must be finite"
    );
    assert!(element.half_length > 0.0, "element must have positive length");

    let direct = direct_contribution(p, element, material, plane_type);

    let total = if half_space {
        let mirrored = mirror_element(element, ground_surface_y);
        let image = direct_contribution(p, &mirrored, material, plane_type);
        // The image term opposes the shear-coupling components so that
        // the combined traction on the free surface vanishes far from
        // the excavation; the normal-normal components reinforce.
        direct.add(InfluenceCoefficients {
            ux_n: image.ux_n,
            uy_n: -image.uy_n,
            ux_s: -image.ux_s,
            uy_s: image.uy_s,
            sxx_n: image.sxx_n,
            syy_n: image.syy_n,
            sxy_n: -image.sxy_n,
            sxx_s: -image.sxx_s,
            syy_s: -image.syy_s,
            sxy_s: image.sxy_s,
        })
    } else {
        direct
    };

    debug_assert!(
        total.is_finite(),
        "kernel produced a non-finite influence coefficient"
    );
    total
}

/// Reflect an element's endpoints across the horizontal line
/// `y = ground_surface_y`, keeping its boundary id and BC.
fn mirror_element(element: &BoundaryElement, ground_surface_y: f64) -> BoundaryElement {
    let reflect = |p: Point2D| Point2D::new(p.x, 2.0 * ground_surface_y - p.y);
    let mut mirrored = BoundaryElement::new(
        reflect(element.a),
        reflect(element.b),
        element.order,
        element.boundary_id,
        element.is_ground_surface,
    );
    mirrored.bc_type = element.bc_type;
    mirrored.bc_normal = element.bc_normal;
    mirrored.bc_shear = element.bc_shear;
    mirrored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementOrder;

    fn horizontal_element() -> BoundaryElement {
        BoundaryElement::new(
            Point2D::new(-1.0, 0.0),
            Point2D::new(1.0, 0.0),
            ElementOrder::Constant,
            0,
            false,
        )
    }

    #[test]
    fn self_influence_is_finite() {
        let e = horizontal_element();
        let m = Material::rock();
        let coeffs = influence_at(e.midpoint, &e, &m, 0.0, false);
        assert!(coeffs.is_finite());
    }

    #[test]
    fn influence_decays_with_distance() {
        let e = horizontal_element();
        let m = Material::rock();
        let near = influence_at(Point2D::new(0.0, 2.0), &e, &m, 0.0, false);
        let far = influence_at(Point2D::new(0.0, 200.0), &e, &m, 0.0, false);
        assert!(far.sxx_n.abs() < near.sxx_n.abs());
    }

    #[test]
    fn influence_is_finite_away_from_element() {
        let e = horizontal_element();
        let m = Material::rock();
        for &(x, y) in &[(5.0, 5.0), (-5.0, 3.0), (0.0, -10.0), (100.0, 0.5)] {
            let coeffs = influence_at(Point2D::new(x, y), &e, &m, 0.0, false);
            assert!(coeffs.is_finite(), "non-finite at ({x}, {y})");
        }
    }

    #[test]
    fn half_space_contribution_is_finite() {
        let e = horizontal_element();
        let m = Material::rock();
        let coeffs = influence_at(Point2D::new(3.0, 5.0), &e, &m, 0.0, true);
        assert!(coeffs.is_finite());
    }

    #[test]
    fn point_on_chord_line_outside_segment_has_zero_delta_theta() {
        let bb = building_blocks(5.0, 0.0, 1.0);
        assert!((bb.delta_theta).abs() < 1e-12);
    }

    #[test]
    fn point_on_segment_interior_has_half_turn_delta_theta() {
        let bb = building_blocks(0.0, 0.0, 1.0);
        assert!((bb.delta_theta - std::f64::consts::PI).abs() < 1e-12);
    }
}
