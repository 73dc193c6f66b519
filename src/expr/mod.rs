//! Affine expressions over host-model variables.
//!
//! This module provides:
//! - `VariableIndex` / `ConstraintIndex` - opaque handles into a host model
//! - `VectorAffineFunction` - sparse vector affine function of scalar variables
//! - `AffineVector` - extraction, combination and concatenation primitives

pub mod affine;
pub mod index;

pub use affine::{AffineVector, VectorAffineFunction};
pub use index::{ConstraintIndex, VariableIndex};
