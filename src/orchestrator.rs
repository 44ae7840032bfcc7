//! Top-level solve orchestration: three-tier caching across
//! discretisation, assembly, and field evaluation (C9)

use crate::config::BemConfig;
use crate::elements::{self, BoundaryElement};
use crate::error::{BemError, BemResult};
use crate::field;
use crate::grid;
use crate::matrix::{self, MatrixCache};
use crate::results::{ResultField, SolveStats};
use crate::solver;
use log::{debug, info};
use nalgebra::DVector;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation flag, checked between orchestrator
/// phases. Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> BemResult<()> {
        if self.is_cancelled() {
            Err(BemError::Cancelled)
        } else {
            Ok(())
        }
    }
}

fn hash_boundaries_and_options(boundaries: &[crate::geometry::Boundary], options: &elements::DiscretizeOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    boundaries.len().hash(&mut hasher);
    for b in boundaries {
        b.is_ground_surface.hash(&mut hasher);
        for v in &b.vertices {
            v.x.to_bits().hash(&mut hasher);
            v.y.to_bits().hash(&mut hasher);
        }
    }
    options.target_element_count.hash(&mut hasher);
    (options.element_order as u8).hash(&mut hasher);
    options.use_adaptive_sizing.hash(&mut hasher);
    options.max_refinement_factor.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn hash_result_inputs(matrix_key: u64, grid_config: &crate::grid::GridConfig, criterion: &Option<crate::strength::StrengthCriterion>) -> u64 {
    let mut hasher = DefaultHasher::new();
    matrix_key.hash(&mut hasher);
    grid_config.coarse_spacing.to_bits().hash(&mut hasher);
    grid_config.near_boundary_spacing.to_bits().hash(&mut hasher);
    grid_config.corner_spacing.to_bits().hash(&mut hasher);
    grid_config.min_standoff.to_bits().hash(&mut hasher);
    grid_config.use_gradient_adaptive.hash(&mut hasher);
    criterion.is_some().hash(&mut hasher);
    hasher.finish()
}

/// Owns the three caches that make repeated solves over the same
/// geometry (or the same matrix with different loads) cheap: the
/// discretised-elements cache, the assembled-matrix cache, and the
/// evaluated-field cache.
#[derive(Default)]
pub struct Orchestrator {
    element_cache: HashMap<u64, Vec<BoundaryElement>>,
    matrix_cache: MatrixCache,
    last_solution: HashMap<u64, DVector<f64>>,
    result_cache: HashMap<u64, ResultField>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_caches(&mut self) {
        self.element_cache.clear();
        self.matrix_cache.clear();
        self.last_solution.clear();
        self.result_cache.clear();
    }

    /// Run a complete solve: discretise, assemble, solve, generate the
    /// field grid, and evaluate. Each phase is skipped in favour of a
    /// cached result when its inputs are unchanged from a previous
    /// call on this orchestrator.
    pub fn solve(&mut self, config: &BemConfig, cancellation: Option<&CancellationToken>) -> BemResult<ResultField> {
        let check = |token: Option<&CancellationToken>| -> BemResult<()> {
            if let Some(t) = token {
                t.check()
            } else {
                Ok(())
            }
        };

        config.material.validate()?;
        check(cancellation)?;

        let element_key = hash_boundaries_and_options(&config.boundaries, &config.discretize_options);
        let elements = if let Some(cached) = self.element_cache.get(&element_key) {
            debug!("discretisation cache hit for key {element_key:x}");
            cached.clone()
        } else {
            let fresh = elements::discretize(&config.boundaries, &config.discretize_options)?;
            self.element_cache.insert(element_key, fresh.clone());
            fresh
        };

        check(cancellation)?;

        let matrix_key = matrix::geometry_hash(
            &elements,
            &config.material,
            config.half_space,
            config.ground_surface_y,
            config.solver_options.plane_strain_type,
            &config.solver_options.far_field_stress,
        );
        let (a, b, mut assembly_diag, cache_hit) = if let Some((cached_a, cached_b)) = self.matrix_cache.get(matrix_key) {
            debug!("matrix cache hit for key {matrix_key:x}");
            (
                cached_a.clone(),
                cached_b.clone(),
                matrix::AssemblyDiagnostics {
                    size: cached_a.nrows(),
                    assembly_time_secs: 0.0,
                    hash_time_secs: 0.0,
                    cache_hit: true,
                    frobenius_norm: None,
                    condition_estimate: None,
                },
                true,
            )
        } else {
            let (fresh_a, fresh_b, diag) = matrix::assemble(
                &elements,
                &config.material,
                config.half_space,
                config.ground_surface_y,
                config.solver_options.plane_strain_type,
                &config.solver_options.far_field_stress,
                config.solver_options.compute_diagnostics,
            );
            self.matrix_cache.insert(matrix_key, fresh_a.clone(), fresh_b.clone());
            (fresh_a, fresh_b, diag, false)
        };
        assembly_diag.cache_hit = cache_hit;

        check(cancellation)?;

        let warm_start = if config.solver_options.warm_start {
            self.last_solution.get(&matrix_key)
        } else {
            None
        };
        let effective_size = a.nrows();
        let forced = config.solver_options.force_direct;
        let (solution, report) = match forced {
            Some(true) => {
                let started = std::time::Instant::now();
                let x = solver::solve_direct(&a, &b)?;
                (
                    x,
                    solver::SolveReport {
                        kind: solver::SolverKind::Direct,
                        iterations: None,
                        residual: None,
                        solve_time_secs: started.elapsed().as_secs_f64(),
                    },
                )
            }
            Some(false) => {
                let started = std::time::Instant::now();
                let options = solver::IterativeOptions {
                    max_iterations: config.solver_options.iterative_max_iterations,
                    tolerance: config.solver_options.iterative_tolerance,
                };
                let x0 = warm_start.cloned().unwrap_or_else(|| DVector::zeros(effective_size));
                let (x, iters, residual) = solver::solve_iterative(&a, &b, &x0, &options).map_err(|(iterations, last_residual)| {
                    BemError::IterativeSolverDidNotConverge { iterations, last_residual }
                })?;
                (
                    x,
                    solver::SolveReport {
                        kind: solver::SolverKind::Iterative,
                        iterations: Some(iters),
                        residual: Some(residual),
                        solve_time_secs: started.elapsed().as_secs_f64(),
                    },
                )
            }
            None => solver::solve(&a, &b, warm_start)?,
        };
        self.last_solution.insert(matrix_key, solution.clone());

        check(cancellation)?;

        let result_key = hash_result_inputs(matrix_key, &config.grid_config, &config.strength_criterion);
        if let Some(cached) = self.result_cache.get(&result_key) {
            info!("solve served entirely from cache (result key {result_key:x})");
            let mut result = cached.clone();
            result.stats = SolveStats::from_diagnostics(&assembly_diag, &report, result.stats.field_point_count, result.stats.field_point_valid_count);
            return Ok(result);
        }

        let mut field_points = grid::generate(&config.boundaries, &elements, &config.grid_config);
        check(cancellation)?;

        let locations: Vec<_> = field_points.iter().filter(|p| p.is_valid()).map(|p| p.location).collect();
        let mut field_results = field::evaluate(
            &locations,
            &elements,
            &solution,
            &config.material,
            config.half_space,
            config.ground_surface_y,
            config.solver_options.plane_strain_type,
            &config.solver_options.far_field_stress,
            config.strength_criterion.as_ref(),
        );

        if config.grid_config.use_gradient_adaptive {
            let seeds: Vec<_> = field_results.iter().map(|r| (r.location, r.sigma_1 - r.sigma_3)).collect();
            let threshold = seeds.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max) * 0.5;
            field_points = grid::refine_with_gradient(
                &field_points,
                &seeds,
                threshold,
                config.grid_config.corner_spacing,
                &config.boundaries,
                &elements,
                config.grid_config.min_standoff,
            );
            let refined_locations: Vec<_> = field_points.iter().filter(|p| p.is_valid()).map(|p| p.location).collect();
            field_results = field::evaluate(
                &refined_locations,
                &elements,
                &solution,
                &config.material,
                config.half_space,
                config.ground_surface_y,
                config.solver_options.plane_strain_type,
                &config.solver_options.far_field_stress,
                config.strength_criterion.as_ref(),
            );
        }

        let valid_count = field_points.iter().filter(|p| p.is_valid()).count();
        let stats = SolveStats::from_diagnostics(&assembly_diag, &report, field_points.len(), valid_count);

        let result = ResultField {
            points: field_results,
            element_count: elements.len(),
            stats,
        };
        self.result_cache.insert(result_key, result.clone());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::BcType;
    use crate::geometry::{Boundary, Point2D};
    use crate::material::Material;

    fn excavation_config() -> BemConfig {
        let outer = Boundary::new(
            vec![
                Point2D::new(-20.0, -20.0),
                Point2D::new(20.0, -20.0),
                Point2D::new(20.0, 20.0),
                Point2D::new(-20.0, 20.0),
            ],
            false,
        );
        let mut config = BemConfig::new(vec![outer], Material::rock());
        config.discretize_options.target_element_count = 16;
        config
    }

    #[test]
    fn first_solve_assembles_and_caches() {
        let mut orchestrator = Orchestrator::new();
        let config = excavation_config();
        let result = orchestrator.solve(&config, None).unwrap();
        assert!(!result.stats.matrix_cache_hit);
        assert_eq!(result.element_count, 16);
    }

    #[test]
    fn second_identical_solve_hits_the_matrix_cache() {
        let mut orchestrator = Orchestrator::new();
        let config = excavation_config();
        let _ = orchestrator.solve(&config, None).unwrap();
        let result = orchestrator.solve(&config, None).unwrap();
        assert!(result.stats.matrix_cache_hit);
    }

    #[test]
    fn cancellation_before_any_work_returns_cancelled_error() {
        let mut orchestrator = Orchestrator::new();
        let config = excavation_config();
        let token = CancellationToken::new();
        token.cancel();
        let err = orchestrator.solve(&config, Some(&token)).unwrap_err();
        assert!(matches!(err, BemError::Cancelled));
    }

    #[test]
    fn rejects_invalid_material() {
        let mut orchestrator = Orchestrator::new();
        let mut config = excavation_config();
        config.material = Material::new("Bad", -1.0, 0.25, 2700.0);
        assert!(orchestrator.solve(&config, None).is_err());
    }

    #[test]
    fn bc_type_default_is_traction_and_survives_a_solve() {
        let mut orchestrator = Orchestrator::new();
        let config = excavation_config();
        let result = orchestrator.solve(&config, None).unwrap();
        assert!(!result.points.is_empty());
        let _ = BcType::Traction;
    }
}
