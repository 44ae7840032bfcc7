//! Output types: the solved field and assembly/solve statistics

use crate::field::FieldResult;
use crate::matrix::AssemblyDiagnostics;
use crate::solver::SolveReport;
use serde::{Deserialize, Serialize};

/// The full result of one orchestrated solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultField {
    pub points: Vec<FieldResult>,
    pub element_count: usize,
    pub stats: SolveStats,
}

/// Timing and diagnostic summary of a solve, surfaced to callers so
/// they can judge conditioning and cache effectiveness without
/// re-deriving them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStats {
    pub matrix_size: usize,
    pub assembly_time_secs: f64,
    pub matrix_cache_hit: bool,
    pub solve_time_secs: f64,
    pub solver_used: String,
    pub iterations: Option<u32>,
    pub residual: Option<f64>,
    pub frobenius_norm: Option<f64>,
    pub condition_estimate: Option<f64>,
    pub field_point_count: usize,
    pub field_point_valid_count: usize,
}

impl SolveStats {
    pub fn from_diagnostics(assembly: &AssemblyDiagnostics, solve: &SolveReport, field_point_count: usize, field_point_valid_count: usize) -> Self {
        Self {
            matrix_size: assembly.size,
            assembly_time_secs: assembly.assembly_time_secs,
            matrix_cache_hit: assembly.cache_hit,
            solve_time_secs: solve.solve_time_secs,
            solver_used: match solve.kind {
                crate::solver::SolverKind::Direct => "direct".to_string(),
                crate::solver::SolverKind::Iterative => "iterative".to_string(),
            },
            iterations: solve.iterations,
            residual: solve.residual,
            frobenius_norm: assembly.frobenius_norm,
            condition_estimate: assembly.condition_estimate,
            field_point_count,
            field_point_valid_count,
        }
    }
}
