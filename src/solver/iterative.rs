//! Iterative solver: BiCGStab with a Jacobi (diagonal) preconditioner,
//! suited to the dense non-symmetric influence matrix at sizes where a
//! direct factorisation gets expensive.

use nalgebra::DVector;

#[derive(Debug, Clone, Copy)]
pub struct IterativeOptions {
    pub max_iterations: u32,
    pub tolerance: f64,
}

impl Default for IterativeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-10,
        }
    }
}

/// Diagonal of `a`, inverted in place, with near-zero entries fell
/// back to 1.0 so the preconditioner never divides by (near) zero.
fn jacobi_preconditioner(a: &nalgebra::DMatrix<f64>) -> DVector<f64> {
    let n = a.nrows();
    let mut inv_diag = DVector::zeros(n);
    for i in 0..n {
        let d = a[(i, i)];
        inv_diag[i] = if d.abs() < 1e-15 { 1.0 } else { 1.0 / d };
    }
    inv_diag
}

/// Biconjugate Gradient Stabilized method with a Jacobi preconditioner
/// built once from `a`'s diagonal. Returns `(solution, iterations_used,
/// final_relative_residual)` on convergence, or
/// `Err((iterations_used, final_relative_residual))` if
/// `max_iterations` is exhausted first or the method breaks down (a
/// near-zero denominator).
pub fn solve_iterative(
    a: &nalgebra::DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    options: &IterativeOptions,
) -> Result<(DVector<f64>, u32, f64), (u32, f64)> {
    let n = b.len();
    let b_norm = b.norm().max(1e-300);
    let inv_diag = jacobi_preconditioner(a);
    let precondition = |v: &DVector<f64>| v.component_mul(&inv_diag);

    let mut x = x0.clone();
    let mut r = b - a * &x;
    let r_hat = r.clone();
    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;
    let mut v = DVector::<f64>::zeros(n);
    let mut p = DVector::<f64>::zeros(n);

    let initial_residual = r.norm() / b_norm;
    if initial_residual < options.tolerance {
        return Ok((x, 0, initial_residual));
    }

    for iter in 1..=options.max_iterations {
        let rho_new = r_hat.dot(&r);
        if rho_new.abs() < 1e-300 {
            return Err((iter, r.norm() / b_norm));
        }
        let beta = (rho_new / rho) * (alpha / omega);
        p = &r + (p - &v * omega) * beta;
        rho = rho_new;

        let y = precondition(&p);
        v = a * &y;
        let denom = r_hat.dot(&v);
        if denom.abs() < 1e-300 {
            return Err((iter, r.norm() / b_norm));
        }
        alpha = rho / denom;

        let s = &r - &v * alpha;
        let s_norm = s.norm() / b_norm;
        if s_norm < options.tolerance {
            x += &y * alpha;
            return Ok((x, iter, s_norm));
        }

        let z = precondition(&s);
        let t = a * &z;
        let t_dot_t = t.dot(&t);
        if t_dot_t.abs() < 1e-300 {
            return Err((iter, s_norm));
        }
        omega = t.dot(&s) / t_dot_t;

        x += &y * alpha + &z * omega;
        r = &s - &t * omega;

        let residual = r.norm() / b_norm;
        if residual < options.tolerance {
            return Ok((x, iter, residual));
        }
    }

    Err((options.max_iterations, r.norm() / b_norm))
}
