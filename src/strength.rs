//! Strength criteria and factor-of-safety evaluation

use serde::{Deserialize, Serialize};

/// A rock-mass strength criterion, evaluated from the major/minor
/// principal stresses at a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrengthCriterion {
    /// Linear Mohr-Coulomb envelope: cohesion `c` (Pa), friction angle
    /// `phi` (degrees).
    MohrCoulomb { cohesion: f64, friction_angle_deg: f64 },
    /// Original Hoek-Brown: uniaxial compressive strength `sigma_ci`
    /// (Pa) and material constant `m_i`.
    HoekBrown { sigma_ci: f64, m_i: f64 },
    /// Generalized Hoek-Brown, parameterised by GSI, `m_i`, and
    /// disturbance factor `d`.
    GeneralizedHoekBrown { sigma_ci: f64, m_i: f64, gsi: f64, d: f64 },
}

impl StrengthCriterion {
    /// Factor of safety at a point given its major/minor principal
    /// stresses (compression positive), defined as the ratio of
    /// strength-available to stress-demanded deviatoric capacity:
    /// `(sigma1_strength - sigma3) / (sigma1 - sigma3)` where
    /// `sigma1_strength` is the major principal stress the criterion
    /// would permit at the given `sigma3`. Returns `f64::INFINITY` when
    /// the demanded deviatoric stress is (numerically) zero.
    pub fn factor_of_safety(&self, sigma1: f64, sigma3: f64) -> f64 {
        let demanded = sigma1 - sigma3;
        if demanded.abs() < 1e-9 {
            return f64::INFINITY;
        }
        let capacity = self.sigma1_at_failure(sigma3) - sigma3;
        capacity / demanded
    }

    /// The major principal stress at failure for a given minor
    /// principal stress, per this criterion.
    fn sigma1_at_failure(&self, sigma3: f64) -> f64 {
        match *self {
            StrengthCriterion::MohrCoulomb {
                cohesion,
                friction_angle_deg,
            } => {
                let phi = friction_angle_deg.to_radians();
                let sin_phi = phi.sin();
                // Standard Mohr-Coulomb envelope in principal-stress form:
                // sigma1 = sigma3 * Nphi + 2c*sqrt(Nphi)
                let n_phi = (1.0 + sin_phi) / (1.0 - sin_phi);
                sigma3 * n_phi + 2.0 * cohesion * n_phi.sqrt()
            }
            StrengthCriterion::HoekBrown { sigma_ci, m_i } => {
                let ratio = (m_i * sigma3 / sigma_ci + 1.0).max(0.0);
                sigma3 + sigma_ci * ratio.sqrt()
            }
            StrengthCriterion::GeneralizedHoekBrown { sigma_ci, m_i, gsi, d } => {
                let mb = m_i * ((gsi - 100.0) / (28.0 - 14.0 * d)).exp();
                let s = ((gsi - 100.0) / (9.0 - 3.0 * d)).exp();
                let a = 0.5 + ((-gsi / 15.0).exp() - (-20.0_f64 / 3.0).exp()) / 6.0;
                let ratio = (mb * sigma3 / sigma_ci + s).max(0.0);
                sigma3 + sigma_ci * ratio.powf(a)
            }
        }
    }
}
