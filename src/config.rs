//! Configuration surface: the inputs a solve is parameterised by

use crate::elements::{DiscretizeOptions, ElementOrder};
use crate::grid::GridConfig;
use crate::material::{Material, PlaneStrainType};
use crate::strength::StrengthCriterion;
use serde::{Deserialize, Serialize};

/// A uniform, pre-existing in-situ stress state, superposed on the
/// boundary-element solution (§6 `SolverOptions::far_field_stress`).
///
/// The boundary conditions specified on each element are for the
/// *total* traction or displacement; the fictitious loads the BE
/// system solves for are the perturbation needed on top of this
/// far-field state, so a traction-free excavation wall in a
/// hydrostatic far field still draws a nonzero solution. Zero (the
/// default) reduces the model to the familiar "no pre-existing
/// stress" case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FarFieldStress {
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub tau_xy: f64,
}

impl Default for FarFieldStress {
    fn default() -> Self {
        Self {
            sigma_x: 0.0,
            sigma_y: 0.0,
            tau_xy: 0.0,
        }
    }
}

impl FarFieldStress {
    pub fn is_zero(&self) -> bool {
        self.sigma_x == 0.0 && self.sigma_y == 0.0 && self.tau_xy == 0.0
    }

    /// Resolve this uniform stress state into normal and shear
    /// traction components on a surface with outward unit normal
    /// `(nx, ny)` and tangent `(sx, sy)`.
    pub fn traction_normal_shear(&self, normal: (f64, f64), tangent: (f64, f64)) -> (f64, f64) {
        let (nx, ny) = normal;
        let (sx, sy) = tangent;
        let tx = self.sigma_x * nx + self.tau_xy * ny;
        let ty = self.tau_xy * nx + self.sigma_y * ny;
        (tx * nx + ty * ny, tx * sx + ty * sy)
    }
}

/// Full input configuration for one orchestrated solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BemConfig {
    pub boundaries: Vec<crate::geometry::Boundary>,
    pub material: Material,
    pub discretize_options: DiscretizeOptions,
    pub grid_config: GridConfig,
    pub solver_options: SolverOptions,
    /// Model a free traction surface at `y = ground_surface_y`.
    pub half_space: bool,
    pub ground_surface_y: f64,
    pub strength_criterion: Option<StrengthCriterion>,
}

impl BemConfig {
    pub fn new(boundaries: Vec<crate::geometry::Boundary>, material: Material) -> Self {
        Self {
            boundaries,
            material,
            discretize_options: DiscretizeOptions::default(),
            grid_config: GridConfig::default(),
            solver_options: SolverOptions::default(),
            half_space: false,
            ground_surface_y: 0.0,
            strength_criterion: None,
        }
    }

    pub fn with_element_order(mut self, order: ElementOrder) -> Self {
        self.discretize_options.element_order = order;
        self
    }

    pub fn with_half_space(mut self, ground_surface_y: f64) -> Self {
        self.half_space = true;
        self.ground_surface_y = ground_surface_y;
        self
    }

    pub fn with_strength_criterion(mut self, criterion: StrengthCriterion) -> Self {
        self.strength_criterion = Some(criterion);
        self
    }

    pub fn with_far_field_stress(mut self, far_field: FarFieldStress) -> Self {
        self.solver_options.far_field_stress = far_field;
        self
    }

    pub fn with_plane_strain_type(mut self, plane_type: PlaneStrainType) -> Self {
        self.solver_options.plane_strain_type = plane_type;
        self
    }
}

/// Controls for the linear-solver stage (C6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Force direct or iterative regardless of system size; `None`
    /// defers to [`crate::solver::DIRECT_SOLVER_THRESHOLD`].
    pub force_direct: Option<bool>,
    pub iterative_max_iterations: u32,
    pub iterative_tolerance: f64,
    /// Reuse the previous solve's solution as a warm start when the
    /// geometry hash is unchanged but loads differ.
    pub warm_start: bool,
    /// Compute the Frobenius norm and a condition-number estimate
    /// during assembly (adds O(n) extra solves for the estimate).
    pub compute_diagnostics: bool,
    /// Plane strain (default) or plane stress out-of-plane idealisation.
    pub plane_strain_type: PlaneStrainType,
    /// Uniform in-situ stress superposed on the boundary-element
    /// solution; zero by default (no pre-existing stress).
    pub far_field_stress: FarFieldStress,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            force_direct: None,
            iterative_max_iterations: 2000,
            iterative_tolerance: 1e-10,
            warm_start: true,
            compute_diagnostics: false,
            plane_strain_type: PlaneStrainType::PlaneStrain,
            far_field_stress: FarFieldStress::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Boundary, Point2D};

    fn square() -> crate::geometry::Boundary {
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

    #[test]
    fn builder_methods_set_expected_fields() {
        let config = BemConfig::new(vec![square()], Material::rock())
            .with_element_order(ElementOrder::Linear)
            .with_half_space(0.0);
        assert_eq!(config.discretize_options.element_order, ElementOrder::Linear);
        assert!(config.half_space);
    }

    #[test]
    fn default_solver_options_prefer_warm_start() {
        assert!(SolverOptions::default().warm_start);
    }

    #[test]
    fn default_far_field_stress_is_zero() {
        assert!(FarFieldStress::default().is_zero());
    }

    #[test]
    fn hydrostatic_far_field_resolves_to_pure_normal_traction() {
        use approx::assert_relative_eq;
        let far = FarFieldStress {
            sigma_x: -10.0e6,
            sigma_y: -10.0e6,
            tau_xy: 0.0,
        };
        let (tn, ts) = far.traction_normal_shear((1.0, 0.0), (0.0, 1.0));
        assert_relative_eq!(tn, -10.0e6, epsilon = 1.0);
        assert_relative_eq!(ts, 0.0, epsilon = 1.0);
    }
}
