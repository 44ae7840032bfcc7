//! Error types for the boundary-element core

use thiserror::Error;

/// Main error type for BEM operations.
///
/// Input validation failures and recoverable numerical failures are
/// reported through this enum. Invariant violations (NaN in kernel
/// output, an unknown boundary-condition type reaching assembly) are
/// programming bugs and panic instead — see the kernel and matrix
/// builder modules.
#[derive(Error, Debug)]
pub enum BemError {
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    #[error("invalid boundary condition type: {0} (must be 1-4)")]
    InvalidBoundaryConditionType(u8),

    #[error("matrix singular to working precision")]
    MatrixSingular,

    #[error("iterative solver did not converge in {iterations} iterations (residual {last_residual:e})")]
    IterativeSolverDidNotConverge { iterations: u32, last_residual: f64 },

    #[error("solve cancelled")]
    Cancelled,
}

/// Result type for BEM operations
pub type BemResult<T> = Result<T, BemError>;
