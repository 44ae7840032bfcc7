//! Boundary elements and the discretiser that produces them from a set
//! of closed boundaries (C3)

mod discretizer;
mod element;

pub use discretizer::{discretize, DiscretizeOptions};
pub use element::{BcType, BoundaryElement, ElementOrder};
