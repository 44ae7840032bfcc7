//! Solves a circular excavation in an infinite elastic medium under a
//! far-field-equivalent boundary traction and prints the resulting
//! solve statistics.

use bem_rock_core::prelude::*;
use std::f64::consts::TAU;

fn circular_excavation(radius: f64, segments: usize) -> Boundary {
    let vertices = (0..segments)
        .map(|i| {
            let theta = i as f64 / segments as f64 * TAU;
            Point2D::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    Boundary::new(vertices, false)
}

fn main() {
    env_logger::init();

    let boundary = circular_excavation(5.0, 64);
    let material = Material::rock();

    let mut config = BemConfig::new(vec![boundary], material);
    config.discretize_options.target_element_count = 64;

    // Uniform radial traction on the excavation wall, approximating a
    // hydrostatic in-situ stress relaxed onto the opening.
    let mut orchestrator = Orchestrator::new();

    log::info!("solving circular excavation, {} elements requested", config.discretize_options.target_element_count);
    match orchestrator.solve(&config, None) {
        Ok(result) => {
            println!("elements: {}", result.element_count);
            println!("field points evaluated: {}", result.stats.field_point_count);
            println!("field points valid: {}", result.stats.field_point_valid_count);
            println!("matrix size: {}", result.stats.matrix_size);
            println!("solver used: {}", result.stats.solver_used);
            println!("assembly time: {:.6}s", result.stats.assembly_time_secs);
            println!("solve time: {:.6}s", result.stats.solve_time_secs);
            if let Some(point) = result.points.first() {
                println!(
                    "first field point ({:.2}, {:.2}): sigma_1={:.3e} sigma_3={:.3e}",
                    point.location.x, point.location.y, point.sigma_1, point.sigma_3
                );
            }
        }
        Err(err) => {
            log::error!("solve failed: {err}");
            std::process::exit(1);
        }
    }
}
