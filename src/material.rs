//! Isotropic elastic material and its plane-strain derived constants

use crate::error::{BemError, BemResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Which 2D idealisation the out-of-plane response follows.
///
/// The closed-form kernel in [`crate::kernel`] is formulated for plane
/// strain; [`PlaneStrainType::PlaneStress`] is supported by substituting
/// the Kolosov constant for its plane-stress form and evaluating
/// `sigma_zz` as zero rather than `nu*(sigma_xx+sigma_yy)` (§6
/// `SolverOptions::plane_strain_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneStrainType {
    PlaneStrain,
    PlaneStress,
}

impl Default for PlaneStrainType {
    fn default() -> Self {
        PlaneStrainType::PlaneStrain
    }
}

/// Isotropic elastic material.
///
/// `nu` must lie in `(-1, 0.5)` and `E` must be positive; both are
/// checked by [`Material::validate`], which every entry point into the
/// core calls before any element or matrix is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Young's modulus in Pa
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Density in kg/m^3
    pub rho: f64,
}

impl Material {
    pub fn new(name: impl Into<String>, e: f64, nu: f64, rho: f64) -> Self {
        Self {
            name: name.into(),
            e,
            nu,
            rho,
        }
    }

    /// A representative hard-rock material (granite-ish).
    pub fn rock() -> Self {
        Self::new("Rock", 10e9, 0.25, 2700.0)
    }

    pub fn validate(&self) -> BemResult<()> {
        if !(self.e > 0.0) || !self.e.is_finite() {
            return Err(BemError::InvalidMaterial(format!(
                "E must be positive and finite, got {}",
                self.e
            )));
        }
        if !(self.nu > -1.0 && self.nu < 0.5) || !self.nu.is_finite() {
            return Err(BemError::InvalidMaterial(format!(
                "nu must lie in (-1, 0.5), got {}",
                self.nu
            )));
        }
        if self.rho < 0.0 || !self.rho.is_finite() {
            return Err(BemError::InvalidMaterial(format!(
                "rho must be non-negative and finite, got {}",
                self.rho
            )));
        }
        Ok(())
    }

    /// Shear modulus G = E / (2(1+nu))
    pub fn shear_modulus(&self) -> f64 {
        self.e / (2.0 * (1.0 + self.nu))
    }

    /// Kolosov constant for plane strain: kappa = 3 - 4*nu
    pub fn kappa(&self) -> f64 {
        3.0 - 4.0 * self.nu
    }

    /// Kolosov constant for the requested 2D idealisation: plane strain
    /// uses `3 - 4*nu`, plane stress uses `(3-nu)/(1+nu)`.
    pub fn kappa_for(&self, plane_type: PlaneStrainType) -> f64 {
        match plane_type {
            PlaneStrainType::PlaneStrain => self.kappa(),
            PlaneStrainType::PlaneStress => (3.0 - self.nu) / (1.0 + self.nu),
        }
    }

    /// Out-of-plane stress sigma_zz given the in-plane stress sum,
    /// under the requested 2D idealisation. Plane strain carries a
    /// nonzero out-of-plane stress `nu*(sigma_xx+sigma_yy)`; plane
    /// stress is zero by definition.
    pub fn sigma_zz(&self, sigma_xx: f64, sigma_yy: f64, plane_type: PlaneStrainType) -> f64 {
        match plane_type {
            PlaneStrainType::PlaneStrain => self.nu * (sigma_xx + sigma_yy),
            PlaneStrainType::PlaneStress => 0.0,
        }
    }

    /// Stress-kernel coefficient c_s = 1 / (8*pi*(1-nu))
    pub fn stress_coefficient(&self) -> f64 {
        1.0 / (8.0 * PI * (1.0 - self.nu))
    }

    /// Displacement-kernel coefficient c_d = (1+nu) / (4*pi*E*(1-nu))
    pub fn displacement_coefficient(&self) -> f64 {
        (1.0 + self.nu) / (4.0 * PI * self.e * (1.0 - self.nu))
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::rock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rock_material_validates() {
        Material::rock().validate().unwrap();
    }

    #[test]
    fn rejects_poisson_out_of_range() {
        let m = Material::new("Bad", 10e9, 0.5, 2700.0);
        assert!(m.validate().is_err());
        let m = Material::new("Bad", 10e9, -1.0, 2700.0);
        assert!(m.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_modulus() {
        let m = Material::new("Bad", 0.0, 0.25, 2700.0);
        assert!(m.validate().is_err());
    }

    #[test]
    fn kappa_matches_plane_strain_formula() {
        let m = Material::new("M", 10e9, 0.25, 2700.0);
        assert_relative_eq!(m.kappa(), 3.0 - 4.0 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn shear_modulus_formula() {
        let m = Material::new("M", 10e9, 0.25, 2700.0);
        assert_relative_eq!(m.shear_modulus(), 10e9 / (2.0 * 1.25), epsilon = 1.0);
    }
}
