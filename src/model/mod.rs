//! The host-model contract bridges are written against.
//!
//! A host model owns variable and constraint storage and exposes it through
//! opaque handles. Bridges only ever reach the host through [`HostModel`].

pub mod memory;

pub use memory::Model;

use crate::error::ModelError;
use crate::expr::{ConstraintIndex, VariableIndex, VectorAffineFunction};
use crate::sets::ConeSet;

/// Result type for host-model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Operations a bridge needs from the model that stores its variables and constraints.
///
/// Every method is synchronous and acts on already-resident data.
pub trait HostModel {
    /// Add `count` new scalar variables.
    fn add_variables(&mut self, count: usize) -> ModelResult<Vec<VariableIndex>>;

    /// Add the constraint `function in set`.
    fn add_constraint(
        &mut self,
        function: VectorAffineFunction,
        set: ConeSet,
    ) -> ModelResult<ConstraintIndex>;

    /// Current function of a constraint.
    fn constraint_function(&self, c: ConstraintIndex) -> ModelResult<VectorAffineFunction>;

    /// Replace the function of a constraint, keeping its set.
    fn set_constraint_function(
        &mut self,
        c: ConstraintIndex,
        function: VectorAffineFunction,
    ) -> ModelResult<()>;

    /// Set of a constraint.
    fn constraint_set(&self, c: ConstraintIndex) -> ModelResult<ConeSet>;

    /// Value of the constraint function at the current solution.
    fn constraint_primal(&self, c: ConstraintIndex) -> ModelResult<Vec<f64>>;

    /// Dual multiplier of the constraint at the current solution.
    fn constraint_dual(&self, c: ConstraintIndex) -> ModelResult<Vec<f64>>;

    /// Primal start of a constraint, if one was given.
    fn constraint_primal_start(&self, c: ConstraintIndex) -> ModelResult<Option<Vec<f64>>>;

    /// Dual start of a constraint, if one was given.
    fn constraint_dual_start(&self, c: ConstraintIndex) -> ModelResult<Option<Vec<f64>>>;

    /// Give a constraint a primal start.
    fn set_constraint_primal_start(&mut self, c: ConstraintIndex, value: &[f64])
        -> ModelResult<()>;

    /// Give a constraint a dual start.
    fn set_constraint_dual_start(&mut self, c: ConstraintIndex, value: &[f64]) -> ModelResult<()>;

    /// Primal start of a variable, if one was given.
    fn variable_primal_start(&self, v: VariableIndex) -> ModelResult<Option<f64>>;

    /// Give a variable a primal start.
    fn set_variable_primal_start(&mut self, v: VariableIndex, value: f64) -> ModelResult<()>;

    /// Remove a constraint.
    fn delete_constraint(&mut self, c: ConstraintIndex) -> ModelResult<()>;

    /// Remove variables. Either all are removed or none.
    fn delete_variables(&mut self, vars: &[VariableIndex]) -> ModelResult<()>;

    /// Check if a variable handle refers to a live variable.
    fn is_valid_variable(&self, v: VariableIndex) -> bool;

    /// Check if a constraint handle refers to a live constraint.
    fn is_valid_constraint(&self, c: ConstraintIndex) -> bool;
}
