//! S6: a single horizontal element under BC type 1 (prescribed normal
//! traction) versus BC type 2 (prescribed normal displacement) solves
//! to hand-computable fictitious-load vectors.

use bem_rock_core::prelude::*;

fn single_horizontal_element(bc_type: BcType, bc_normal: f64, bc_shear: f64) -> Vec<BoundaryElement> {
    let mut e = BoundaryElement::new(Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0), ElementOrder::Constant, 0, false);
    e.bc_type = bc_type;
    e.bc_normal = bc_normal;
    e.bc_shear = bc_shear;
    vec![e]
}

#[test]
fn traction_bc_produces_a_nonzero_fictitious_normal_load_of_the_expected_magnitude() {
    let elements = single_horizontal_element(BcType::Traction, -10.0e6, 0.0);
    let material = Material::rock();
    let (a, b, _) = bem_rock_core::matrix::assemble(
        &elements,
        &material,
        false,
        0.0,
        PlaneStrainType::PlaneStrain,
        &FarFieldStress::default(),
        false,
    );

    let x = bem_rock_core::solver::solve_direct(&a, &b).unwrap();

    // By hand: at an element's own midpoint the closed-form kernel's
    // direct traction term reduces to c_s*pi on the normal-normal
    // entry (dtheta = pi, s = t = dell = 0) and the diagonal carries
    // the -1/2 free-term jump, leaving a_nn = 1/(8*(1-nu)) - 1/2. The
    // normal-shear and shear-normal couplings vanish identically at
    // the self node, so Q_n = bc_normal / a_nn and Q_s = 0.
    let c_s_pi = 1.0 / (8.0 * (1.0 - material.nu));
    let expected_q_n = -10.0e6 / (c_s_pi - 0.5);
    assert!((x[0] - expected_q_n).abs() / expected_q_n.abs() < 1e-6);
    assert!(x[1].abs() < 1.0);
    assert!(x[0] > 0.0, "a compressive prescribed traction should resolve to a positive fictitious load here");
}

#[test]
fn displacement_bc_with_zero_prescribed_displacement_yields_the_trivial_solution() {
    let elements = single_horizontal_element(BcType::Displacement, 0.0, 0.0);
    let material = Material::rock();
    let (a, b, _) = bem_rock_core::matrix::assemble(
        &elements,
        &material,
        false,
        0.0,
        PlaneStrainType::PlaneStrain,
        &FarFieldStress::default(),
        false,
    );

    let x = bem_rock_core::solver::solve_direct(&a, &b).unwrap();

    assert!(x[0].abs() < 1e-6);
    assert!(x[1].abs() < 1e-6);
}

#[test]
fn the_two_bc_types_disagree_on_their_solution_vectors() {
    let material = Material::rock();

    let traction_elements = single_horizontal_element(BcType::Traction, -10.0e6, 0.0);
    let (a1, b1, _) = bem_rock_core::matrix::assemble(
        &traction_elements,
        &material,
        false,
        0.0,
        PlaneStrainType::PlaneStrain,
        &FarFieldStress::default(),
        false,
    );
    let x1 = bem_rock_core::solver::solve_direct(&a1, &b1).unwrap();

    let displacement_elements = single_horizontal_element(BcType::Displacement, 0.0, 0.0);
    let (a2, b2, _) = bem_rock_core::matrix::assemble(
        &displacement_elements,
        &material,
        false,
        0.0,
        PlaneStrainType::PlaneStrain,
        &FarFieldStress::default(),
        false,
    );
    let x2 = bem_rock_core::solver::solve_direct(&a2, &b2).unwrap();

    assert!((x1[0] - x2[0]).abs() > 1.0);
}
