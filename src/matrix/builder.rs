//! Assembly of the dense influence-coefficient matrix (C5)
//!
//! Unknowns are the fictitious normal/shear load strengths `(Q_n, Q_s)`
//! carried by each boundary element (the indirect, Crouch & Starfield
//! style formulation the closed-form kernel in [`crate::kernel`] is
//! built for). Row `2*i` and `2*i+1` encode element `i`'s two boundary
//! conditions; column `2*j` and `2*j+1` are element `j`'s unknowns. The
//! system is square, dense, and in general non-symmetric.

use crate::config::FarFieldStress;
use crate::elements::{BcType, BoundaryElement};
use crate::kernel::{self, InfluenceCoefficients};
use crate::material::{Material, PlaneStrainType};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::time::Instant;

/// Diagnostics describing one assembly pass.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyDiagnostics {
    pub size: usize,
    pub assembly_time_secs: f64,
    pub hash_time_secs: f64,
    pub cache_hit: bool,
    pub frobenius_norm: Option<f64>,
    pub condition_estimate: Option<f64>,
}

/// Normal (n) and tangent (s) unit vectors of an element, in the
/// convention the kernel uses: normal is the chord direction rotated 90
/// degrees counter-clockwise.
fn normal_tangent(e: &BoundaryElement) -> ((f64, f64), (f64, f64)) {
    let tangent = (e.cos_beta, e.sin_beta);
    let normal = (-e.sin_beta, e.cos_beta);
    (normal, tangent)
}

fn traction_components(c: &InfluenceCoefficients, normal: (f64, f64), tangent: (f64, f64)) -> (f64, f64, f64, f64) {
    let (nx, ny) = normal;
    let (sx, sy) = tangent;

    let tn_from_n = c.sxx_n * nx * nx + c.syy_n * ny * ny + 2.0 * c.sxy_n * nx * ny;
    let ts_from_n = (c.sxx_n * nx + c.sxy_n * ny) * sx + (c.sxy_n * nx + c.syy_n * ny) * sy;
    let tn_from_s = c.sxx_s * nx * nx + c.syy_s * ny * ny + 2.0 * c.sxy_s * nx * ny;
    let ts_from_s = (c.sxx_s * nx + c.sxy_s * ny) * sx + (c.sxy_s * nx + c.syy_s * ny) * sy;

    (tn_from_n, ts_from_n, tn_from_s, ts_from_s)
}

fn displacement_components(c: &InfluenceCoefficients, normal: (f64, f64), tangent: (f64, f64)) -> (f64, f64, f64, f64) {
    let (nx, ny) = normal;
    let (sx, sy) = tangent;

    let un_from_n = c.ux_n * nx + c.uy_n * ny;
    let us_from_n = c.ux_n * sx + c.uy_n * sy;
    let un_from_s = c.ux_s * nx + c.uy_s * ny;
    let us_from_s = c.ux_s * sx + c.uy_s * sy;

    (un_from_n, us_from_n, un_from_s, us_from_s)
}

/// Half the fictitious-load jump across the element itself, applied to
/// the diagonal traction block only (the free term of the direct-BEM
/// jump relation). Displacement components are continuous across the
/// boundary and receive no jump term.
const SELF_JUMP: f64 = 0.5;

/// Assemble the dense `2N x 2N` influence matrix and right-hand side
/// for `elements`, rows partitioned across threads (rayon) since each
/// row is independent of every other.
///
/// Each element contributes exactly one fictitious-load unknown pair
/// `(Q_n, Q_s)` regardless of its collocation order `p`, since the
/// closed-form kernel (§4.2) integrates a uniform load density over
/// the whole element; it has no native notion of a sub-element shape
/// function to assign separate unknowns to. For `p > 1`, the order
/// instead controls how many collocation points the BC is enforced at:
/// the row is the average of the kernel evaluated at each of the
/// element's `p` nodes (§4.3's "per-source shape-function weighting"
/// applied on the observation side, since the source side has no
/// sub-element decomposition to weight). A uniform far-field stress
/// (`far_field`), if nonzero, is subtracted from the traction-type
/// rows' right-hand side so the solved loads represent the
/// perturbation on top of it (§6 `SolverOptions::far_field_stress`).
pub fn assemble(
    elements: &[BoundaryElement],
    material: &Material,
    half_space: bool,
    ground_surface_y: f64,
    plane_type: PlaneStrainType,
    far_field: &FarFieldStress,
    compute_diagnostics: bool,
) -> (DMatrix<f64>, DVector<f64>, AssemblyDiagnostics) {
    let n = elements.len();
    let dim = 2 * n;
    let start = Instant::now();

    let normals_tangents: Vec<((f64, f64), (f64, f64))> = elements.iter().map(normal_tangent).collect();

    // Each row pair is computed independently; row-partitioned
    // parallel assembly writes disjoint slices of the flattened buffer.
    let rows: Vec<([f64; 2], Vec<f64>, Vec<f64>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let ei = &elements[i];
            let (normal_i, tangent_i) = normals_tangents[i];
            let observation_nodes = ei.collocation_points();
            let node_weight = 1.0 / observation_nodes.len() as f64;

            let mut row_n = vec![0.0; dim];
            let mut row_s = vec![0.0; dim];

            for (j, ej) in elements.iter().enumerate() {
                let mut tn_n = 0.0;
                let mut ts_n = 0.0;
                let mut tn_s = 0.0;
                let mut ts_s = 0.0;
                let mut un_n = 0.0;
                let mut us_n = 0.0;
                let mut un_s = 0.0;
                let mut us_s = 0.0;

                for &obs in &observation_nodes {
                    let coeffs = kernel::influence_at_for(obs, ej, material, ground_surface_y, half_space, plane_type);
                    let (t_n, t_s, t_n2, t_s2) = traction_components(&coeffs, normal_i, tangent_i);
                    let (u_n, u_s, u_n2, u_s2) = displacement_components(&coeffs, normal_i, tangent_i);
                    tn_n += t_n * node_weight;
                    ts_n += t_s * node_weight;
                    tn_s += t_n2 * node_weight;
                    ts_s += t_s2 * node_weight;
                    un_n += u_n * node_weight;
                    us_n += u_s * node_weight;
                    un_s += u_n2 * node_weight;
                    us_s += u_s2 * node_weight;
                }

                let (mut a_n_qn, mut a_n_qs, mut a_s_qn, mut a_s_qs) = match ei.bc_type {
                    BcType::Traction => (tn_n, tn_s, ts_n, ts_s),
                    BcType::Displacement => (un_n, un_s, us_n, us_s),
                    BcType::MixedNormalDispShearStress => (un_n, un_s, ts_n, ts_s),
                    BcType::MixedNormalStressShearDisp => (tn_n, tn_s, us_n, us_s),
                };

                if i == j {
                    let normal_row_is_traction =
                        matches!(ei.bc_type, BcType::Traction | BcType::MixedNormalStressShearDisp);
                    let shear_row_is_traction =
                        matches!(ei.bc_type, BcType::Traction | BcType::MixedNormalDispShearStress);
                    if normal_row_is_traction {
                        a_n_qn -= SELF_JUMP;
                    }
                    if shear_row_is_traction {
                        a_s_qs -= SELF_JUMP;
                    }
                }

                row_n[2 * j] = a_n_qn;
                row_n[2 * j + 1] = a_n_qs;
                row_s[2 * j] = a_s_qn;
                row_s[2 * j + 1] = a_s_qs;
            }

            let mut rhs_n = ei.bc_normal;
            let mut rhs_s = ei.bc_shear;
            if !far_field.is_zero() {
                let (far_n, far_s) = far_field.traction_normal_shear(normal_i, tangent_i);
                let normal_row_is_traction =
                    matches!(ei.bc_type, BcType::Traction | BcType::MixedNormalStressShearDisp);
                let shear_row_is_traction =
                    matches!(ei.bc_type, BcType::Traction | BcType::MixedNormalDispShearStress);
                if normal_row_is_traction {
                    rhs_n -= far_n;
                }
                if shear_row_is_traction {
                    rhs_s -= far_s;
                }
            }

            ([rhs_n, rhs_s], row_n, row_s)
        })
        .collect();

    let mut a = DMatrix::<f64>::zeros(dim, dim);
    let mut b = DVector::<f64>::zeros(dim);
    for (i, (rhs, row_n, row_s)) in rows.into_iter().enumerate() {
        b[2 * i] = rhs[0];
        b[2 * i + 1] = rhs[1];
        for col in 0..dim {
            a[(2 * i, col)] = row_n[col];
            a[(2 * i + 1, col)] = row_s[col];
        }
    }

    let assembly_time_secs = start.elapsed().as_secs_f64();

    let (frobenius_norm, condition_estimate) = if compute_diagnostics {
        (Some(a.norm()), estimate_condition_number(&a))
    } else {
        (None, None)
    };

    let diagnostics = AssemblyDiagnostics {
        size: dim,
        assembly_time_secs,
        hash_time_secs: 0.0,
        cache_hit: false,
        frobenius_norm,
        condition_estimate,
    };

    (a, b, diagnostics)
}

/// A cheap condition-number estimate via a handful of inverse-power
/// iterations against the LU factorisation: `cond ~= ||A|| * ||A^-1||`,
/// with `||A^-1||` approximated by the growth rate of solving `A x =
/// b_k` for a fixed random-ish `b_k` repeatedly. Returns `None` if the
/// matrix is singular to working precision.
fn estimate_condition_number(a: &DMatrix<f64>) -> Option<f64> {
    let n = a.nrows();
    if n == 0 {
        return None;
    }
    let lu = a.clone().lu();
    if lu.determinant().abs() < f64::EPSILON {
        return None;
    }

    let mut v = DVector::<f64>::from_element(n, 1.0 / (n as f64).sqrt());
    let mut inv_norm_estimate = 0.0;
    for _ in 0..8 {
        let solved = lu.solve(&v)?;
        let norm = solved.norm();
        if norm < f64::EPSILON {
            return None;
        }
        inv_norm_estimate = norm / v.norm();
        v = solved / norm;
    }

    Some(a.norm() * inv_norm_estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementOrder;
    use crate::geometry::Point2D;

    fn square_elements(bc: BcType) -> Vec<BoundaryElement> {
        let corners = [
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];
        let mut elements = Vec::new();
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            for k in 0..5 {
                let t0 = k as f64 / 5.0;
                let t1 = (k + 1) as f64 / 5.0;
                let p0 = Point2D::new(a.x + t0 * (b.x - a.x), a.y + t0 * (b.y - a.y));
                let p1 = Point2D::new(a.x + t1 * (b.x - a.x), a.y + t1 * (b.y - a.y));
                let mut e = BoundaryElement::new(p0, p1, ElementOrder::Constant, 0, false);
                e.bc_type = bc;
                e.bc_normal = -1.0e6;
                e.bc_shear = 0.0;
                elements.push(e);
            }
        }
        elements
    }

    #[test]
    fn assembled_matrix_has_expected_shape() {
        let elements = square_elements(BcType::Traction);
        let material = Material::rock();
        let (a, b, diag) = assemble(&elements, &material, false, 0.0, PlaneStrainType::PlaneStrain, &FarFieldStress::default(), false);
        assert_eq!(a.nrows(), 40);
        assert_eq!(a.ncols(), 40);
        assert_eq!(b.len(), 40);
        assert_eq!(diag.size, 40);
    }

    #[test]
    fn assembled_matrix_has_no_non_finite_entries() {
        let elements = square_elements(BcType::Traction);
        let material = Material::rock();
        let (a, _, _) = assemble(&elements, &material, false, 0.0, PlaneStrainType::PlaneStrain, &FarFieldStress::default(), false);
        assert!(a.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn diagnostics_reports_finite_frobenius_norm_when_requested() {
        let elements = square_elements(BcType::Displacement);
        let material = Material::rock();
        let (_, _, diag) = assemble(&elements, &material, false, 0.0, PlaneStrainType::PlaneStrain, &FarFieldStress::default(), true);
        assert!(diag.frobenius_norm.unwrap().is_finite());
    }

    #[test]
    fn rhs_carries_prescribed_bc_values() {
        let elements = square_elements(BcType::Traction);
        let material = Material::rock();
        let (_, b, _) = assemble(&elements, &material, false, 0.0, PlaneStrainType::PlaneStrain, &FarFieldStress::default(), false);
        assert!((b[0] - (-1.0e6)).abs() < 1e-6);
    }

    #[test]
    fn far_field_stress_shifts_the_rhs_of_traction_rows() {
        let elements = square_elements(BcType::Traction);
        let material = Material::rock();
        let far = FarFieldStress {
            sigma_x: -5.0e6,
            sigma_y: -5.0e6,
            tau_xy: 0.0,
        };
        let (_, b_zero, _) = assemble(&elements, &material, false, 0.0, PlaneStrainType::PlaneStrain, &FarFieldStress::default(), false);
        let (_, b_far, _) = assemble(&elements, &material, false, 0.0, PlaneStrainType::PlaneStrain, &far, false);
        assert!((b_zero[0] - b_far[0]).abs() > 1.0);
    }
}
