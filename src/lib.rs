//! Elastic boundary-element analysis core for a 2D plane-strain
//! rock-mechanics modeller.
//!
//! This crate discretises polygonal excavation and ground-surface
//! boundaries into boundary elements, assembles the dense
//! non-symmetric influence-coefficient matrix via closed-form
//! analytical integration of the 2D Kelvin kernel (no quadrature —
//! see [`kernel`]), solves the resulting system under mixed boundary
//! conditions, and evaluates stresses, displacements, and strength
//! factors over an adaptive field-point grid.
//!
//! It is a solver core, not an application: boundary editing,
//! persistence, and rendering live outside this crate.
//!
//! ## Example
//! ```rust
//! use bem_rock_core::prelude::*;
//!
//! let boundary = Boundary::new(
//!     vec![
//!         Point2D::new(-20.0, -20.0),
//!         Point2D::new(20.0, -20.0),
//!         Point2D::new(20.0, 20.0),
//!         Point2D::new(-20.0, 20.0),
//!     ],
//!     false,
//! );
//!
//! let config = BemConfig::new(vec![boundary], Material::rock());
//! let mut orchestrator = Orchestrator::new();
//! let result = orchestrator.solve(&config, None).unwrap();
//! assert!(!result.points.is_empty());
//! ```

pub mod config;
pub mod elements;
pub mod error;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod kernel;
pub mod material;
pub mod matrix;
pub mod orchestrator;
pub mod results;
pub mod solver;
pub mod strength;

/// Re-exports of the common entry points.
pub mod prelude {
    pub use crate::config::{BemConfig, FarFieldStress, SolverOptions};
    pub use crate::elements::{BcType, BoundaryElement, DiscretizeOptions, ElementOrder};
    pub use crate::error::{BemError, BemResult};
    pub use crate::field::FieldResult;
    pub use crate::geometry::{Boundary, Point2D, Rect2D, Vector2D};
    pub use crate::grid::{FieldPoint, GridConfig};
    pub use crate::material::{Material, PlaneStrainType};
    pub use crate::orchestrator::{CancellationToken, Orchestrator};
    pub use crate::results::{ResultField, SolveStats};
    pub use crate::strength::StrengthCriterion;
}
