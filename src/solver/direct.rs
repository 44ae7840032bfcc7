//! Direct solver: dense LU via nalgebra.

use crate::error::{BemError, BemResult};
use nalgebra::{DMatrix, DVector};

/// Solve `a x = b` by LU decomposition. Returns
/// [`BemError::MatrixSingular`] if `a` is singular to working
/// precision.
pub fn solve_direct(a: &DMatrix<f64>, b: &DVector<f64>) -> BemResult<DVector<f64>> {
    let lu = a.clone().lu();
    lu.solve(b).ok_or(BemError::MatrixSingular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solves_identity_system() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = solve_direct(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_singular_matrix() {
        let a = DMatrix::<f64>::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(solve_direct(&a, &b), Err(BemError::MatrixSingular)));
    }

    #[test]
    fn solves_non_symmetric_system() {
        let a = DMatrix::<f64>::from_row_slice(2, 2, &[4.0, 1.0, 2.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 5.0]);
        let x = solve_direct(&a, &b).unwrap();
        let residual = &a * &x - &b;
        assert!(residual.norm() < 1e-9);
    }
}
