//! Field evaluation: stresses, displacements, principal values,
//! invariants, and strength factors at field points (C8)

use crate::config::FarFieldStress;
use crate::elements::BoundaryElement;
use crate::geometry::Point2D;
use crate::kernel::{self, InfluenceCoefficients};
use crate::material::{Material, PlaneStrainType};
use crate::strength::StrengthCriterion;
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Full state evaluated at one field point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldResult {
    pub location: Point2D,
    pub sigma_xx: f64,
    pub sigma_yy: f64,
    pub sigma_zz: f64,
    pub sigma_xy: f64,
    pub ux: f64,
    pub uy: f64,
    /// (major, minor) in-plane principal stresses.
    pub sigma_1: f64,
    pub sigma_3: f64,
    /// Principal direction of sigma_1, radians from +x.
    pub theta_p: f64,
    /// Out-of-plane principal stress equals sigma_zz in plane strain
    /// when ordered among the three; kept separately since ordering
    /// sigma_1 >= sigma_2 >= sigma_3 in 3D can place sigma_zz between
    /// the in-plane pair.
    pub sigma_2_3d: f64,
    pub i1: f64,
    pub j2: f64,
    pub lode_angle: f64,
    pub factor_of_safety: Option<f64>,
}

/// Sum the ten influence coefficients of every element at `p`, each
/// weighted by that element's solved fictitious load strengths, then
/// derive stress, displacement, and out-of-plane stress.
#[allow(clippy::too_many_arguments)]
fn accumulate(
    p: Point2D,
    elements: &[BoundaryElement],
    loads: &DVector<f64>,
    material: &Material,
    half_space: bool,
    ground_surface_y: f64,
    plane_type: PlaneStrainType,
    far_field: &FarFieldStress,
) -> (f64, f64, f64, f64, f64) {
    // The far-field stress is a uniform in-situ state superposed
    // directly on the induced field; it does not affect displacement
    // (displacements are measured relative to the unexcavated state).
    let mut sxx = far_field.sigma_x;
    let mut syy = far_field.sigma_y;
    let mut sxy = far_field.tau_xy;
    let mut ux = 0.0;
    let mut uy = 0.0;

    for (j, e) in elements.iter().enumerate() {
        let q_n = loads[2 * j];
        let q_s = loads[2 * j + 1];
        let c: InfluenceCoefficients = kernel::influence_at_for(p, e, material, ground_surface_y, half_space, plane_type);

        sxx += c.sxx_n * q_n + c.sxx_s * q_s;
        syy += c.syy_n * q_n + c.syy_s * q_s;
        sxy += c.sxy_n * q_n + c.sxy_s * q_s;
        ux += c.ux_n * q_n + c.ux_s * q_s;
        uy += c.uy_n * q_n + c.uy_s * q_s;
    }

    (sxx, syy, sxy, ux, uy)
}

/// Two-dimensional principal stresses and the angle (radians, from
/// +x) of the major principal direction.
pub fn principal_stresses_2d(sxx: f64, syy: f64, sxy: f64) -> (f64, f64, f64) {
    let avg = (sxx + syy) / 2.0;
    let radius = (((sxx - syy) / 2.0).powi(2) + sxy * sxy).sqrt();
    let sigma_1 = avg + radius;
    let sigma_3 = avg - radius;
    let theta_p = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    (sigma_1, sigma_3, theta_p)
}

/// Order the three principal stresses (two in-plane plus sigma_zz)
/// descending, returning `(sigma_1, sigma_2, sigma_3)`.
pub fn principal_stresses_3d(sigma_1_2d: f64, sigma_3_2d: f64, sigma_zz: f64) -> (f64, f64, f64) {
    let mut values = [sigma_1_2d, sigma_3_2d, sigma_zz];
    values.sort_by(|a, b| b.partial_cmp(a).unwrap());
    (values[0], values[1], values[2])
}

/// First stress invariant and second deviatoric invariant from the
/// three ordered principal stresses.
pub fn invariants(sigma_1: f64, sigma_2: f64, sigma_3: f64) -> (f64, f64) {
    let i1 = sigma_1 + sigma_2 + sigma_3;
    let mean = i1 / 3.0;
    let (s1, s2, s3) = (sigma_1 - mean, sigma_2 - mean, sigma_3 - mean);
    let j2 = 0.5 * (s1 * s1 + s2 * s2 + s3 * s3);
    (i1, j2)
}

/// Lode angle in radians, in `[-pi/6, pi/6]`, from the three ordered
/// principal stresses. Returns `0.0` when `j2` is numerically zero
/// (hydrostatic state, direction undefined).
pub fn lode_angle(sigma_1: f64, sigma_2: f64, sigma_3: f64, j2: f64) -> f64 {
    if j2 < 1e-9 {
        return 0.0;
    }
    let mean = (sigma_1 + sigma_2 + sigma_3) / 3.0;
    let (s1, s2, s3) = (sigma_1 - mean, sigma_2 - mean, sigma_3 - mean);
    let j3 = s1 * s2 * s3;
    let arg = (3.0_f64.sqrt() / 2.0) * j3 / j2.powf(1.5);
    (arg.clamp(-1.0, 1.0)).asin() / 3.0
}

/// Evaluate the full field state at every point, in parallel (rayon)
/// since each point is independent.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    points: &[Point2D],
    elements: &[BoundaryElement],
    loads: &DVector<f64>,
    material: &Material,
    half_space: bool,
    ground_surface_y: f64,
    plane_type: PlaneStrainType,
    far_field: &FarFieldStress,
    criterion: Option<&StrengthCriterion>,
) -> Vec<FieldResult> {
    points
        .par_iter()
        .map(|&p| {
            let (sxx, syy, sxy, ux, uy) = accumulate(p, elements, loads, material, half_space, ground_surface_y, plane_type, far_field);
            let sigma_zz = material.sigma_zz(sxx, syy, plane_type);
            let (sigma_1, sigma_3, theta_p) = principal_stresses_2d(sxx, syy, sxy);
            let (s1_3d, s2_3d, s3_3d) = principal_stresses_3d(sigma_1, sigma_3, sigma_zz);
            let (i1, j2) = invariants(s1_3d, s2_3d, s3_3d);
            let lode = lode_angle(s1_3d, s2_3d, s3_3d, j2);
            let factor_of_safety = criterion.map(|c| c.factor_of_safety(s1_3d, s3_3d));

            FieldResult {
                location: p,
                sigma_xx: sxx,
                sigma_yy: syy,
                sigma_zz,
                sigma_xy: sxy,
                ux,
                uy,
                sigma_1,
                sigma_3,
                theta_p,
                sigma_2_3d: s2_3d,
                i1,
                j2,
                lode_angle: lode,
                factor_of_safety,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn principal_stresses_recover_uniaxial_state() {
        let (s1, s3, _) = principal_stresses_2d(10.0, 0.0, 0.0);
        assert_relative_eq!(s1, 10.0, epsilon = 1e-9);
        assert_relative_eq!(s3, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn principal_stresses_ordered_major_ge_minor() {
        let (s1, s3, _) = principal_stresses_2d(3.0, 7.0, 2.0);
        assert!(s1 >= s3);
    }

    #[test]
    fn hydrostatic_state_has_zero_j2_and_zero_lode_angle() {
        let (i1, j2) = invariants(5.0, 5.0, 5.0);
        assert_relative_eq!(i1, 15.0, epsilon = 1e-9);
        assert_relative_eq!(j2, 0.0, epsilon = 1e-9);
        assert_relative_eq!(lode_angle(5.0, 5.0, 5.0, j2), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn three_d_ordering_places_largest_first() {
        let (s1, s2, s3) = principal_stresses_3d(4.0, 1.0, 2.5);
        assert_eq!((s1, s2, s3), (4.0, 2.5, 1.0));
    }

    #[test]
    fn lode_angle_is_within_bounds() {
        let (i1, j2) = invariants(10.0, 2.0, 1.0);
        let _ = i1;
        let angle = lode_angle(10.0, 2.0, 1.0, j2);
        assert!(angle >= -std::f64::consts::FRAC_PI_6 - 1e-9 && angle <= std::f64::consts::FRAC_PI_6 + 1e-9);
    }

    #[test]
    fn far_field_stress_superposes_directly_with_no_elements() {
        let loads = DVector::<f64>::zeros(0);
        let far = FarFieldStress {
            sigma_x: -5.0e6,
            sigma_y: -3.0e6,
            tau_xy: 1.0e6,
        };
        let results = evaluate(
            &[Point2D::new(0.0, 0.0)],
            &[],
            &loads,
            &Material::rock(),
            false,
            0.0,
            PlaneStrainType::PlaneStrain,
            &far,
            None,
        );
        assert_relative_eq!(results[0].sigma_xx, -5.0e6, epsilon = 1.0);
        assert_relative_eq!(results[0].sigma_yy, -3.0e6, epsilon = 1.0);
        assert_relative_eq!(results[0].sigma_xy, 1.0e6, epsilon = 1.0);
    }

    #[test]
    fn plane_stress_has_zero_out_of_plane_stress() {
        let loads = DVector::<f64>::zeros(0);
        let far = FarFieldStress {
            sigma_x: -5.0e6,
            sigma_y: -3.0e6,
            tau_xy: 0.0,
        };
        let results = evaluate(
            &[Point2D::new(0.0, 0.0)],
            &[],
            &loads,
            &Material::rock(),
            false,
            0.0,
            PlaneStrainType::PlaneStress,
            &far,
            None,
        );
        assert_relative_eq!(results[0].sigma_zz, 0.0, epsilon = 1e-9);
    }
}
