//! Geometry-hash keyed cache of assembled matrices.
//!
//! Hashed with [`std::collections::hash_map::DefaultHasher`] (SipHash):
//! not cryptographic, and a 64-bit collision is theoretically possible.
//! Given the key space here (element geometry + BC + material, hashed
//! per solve rather than per untrusted input), that risk is accepted
//! rather than pulled in a dedicated hash crate for it.

use crate::config::FarFieldStress;
use crate::elements::BoundaryElement;
use crate::material::{Material, PlaneStrainType};
use nalgebra::{DMatrix, DVector};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Hash the inputs that determine an assembled matrix and
/// right-hand-side: element geometry and BC, material constants,
/// half-space setting, the plane-strain/stress idealisation, and any
/// far-field stress. Field-point grid and solver choice do not affect
/// this key.
pub fn geometry_hash(
    elements: &[BoundaryElement],
    material: &Material,
    half_space: bool,
    ground_surface_y: f64,
    plane_type: PlaneStrainType,
    far_field: &FarFieldStress,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    elements.len().hash(&mut hasher);
    for e in elements {
        e.a.x.to_bits().hash(&mut hasher);
        e.a.y.to_bits().hash(&mut hasher);
        e.b.x.to_bits().hash(&mut hasher);
        e.b.y.to_bits().hash(&mut hasher);
        (e.order as u8).hash(&mut hasher);
        (e.bc_type as u8).hash(&mut hasher);
        e.bc_normal.to_bits().hash(&mut hasher);
        e.bc_shear.to_bits().hash(&mut hasher);
        e.boundary_id.hash(&mut hasher);
    }
    material.e.to_bits().hash(&mut hasher);
    material.nu.to_bits().hash(&mut hasher);
    half_space.hash(&mut hasher);
    ground_surface_y.to_bits().hash(&mut hasher);
    (plane_type == PlaneStrainType::PlaneStress).hash(&mut hasher);
    far_field.sigma_x.to_bits().hash(&mut hasher);
    far_field.sigma_y.to_bits().hash(&mut hasher);
    far_field.tau_xy.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// An in-memory cache of assembled `(matrix, rhs)` pairs keyed by
/// [`geometry_hash`]. One entry is kept per distinct key; a cache hit
/// on warm start skips assembly entirely (C5/C9).
#[derive(Debug, Default)]
pub struct MatrixCache {
    entries: HashMap<u64, (DMatrix<f64>, DVector<f64>)>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: u64) -> Option<&(DMatrix<f64>, DVector<f64>)> {
        self.entries.get(&key)
    }

    pub fn insert(&mut self, key: u64, matrix: DMatrix<f64>, rhs: DVector<f64>) {
        self.entries.insert(key, (matrix, rhs));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
