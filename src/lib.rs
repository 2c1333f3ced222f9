//! Scalar and vector fields sampled on regular grids.
//!
//! A [`ScalarField`] (2D or 3D) or [`VectorField`] (1D, 2D or 3D) owns an
//! `ndarray` grid plus a [`Geometry`] placing it in physical space. Fields
//! support shape-checked elementwise arithmetic and the finite-difference
//! operators gradient, divergence and curl. Every operator returns a new
//! value; nothing is mutated in place.
//!
//! Differential operators come in two flavours selected by [`Convention`].
//! The default keeps the compatibility formulas exactly, including their
//! quirks; `Convention::Standard` gives textbook vector calculus on the same
//! axis mapping.

pub mod analysis;
pub mod config;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod samples;
pub mod scalar_field;
pub mod stencil;
pub mod vector;
pub mod vector_field;
pub mod visualisation;

pub use error::{FieldError, Result};
pub use grid::{Convention, Dimensionality, Geometry, PhysicalAxis};
pub use mesh::{Indexing, Mesh};
pub use scalar_field::{FieldSummary, ScalarField, ScalarOperand};
pub use vector::{Operand, Vector};
pub use vector_field::{VectorField, VectorOperand};

/// Items intended for glob-import: `use field_calculus::prelude::*;`
pub mod prelude {
    pub use crate::error::{FieldError, Result};
    pub use crate::grid::{Convention, Dimensionality, Geometry};
    pub use crate::mesh::{Indexing, Mesh};
    pub use crate::scalar_field::ScalarField;
    pub use crate::vector::Vector;
    pub use crate::vector_field::VectorField;
}
