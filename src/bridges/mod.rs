//! Bridges: reformulations of norm-cone constraints into linear constraints.
//!
//! Two capability tiers are provided:
//! - [`SetMap`] - a stateless, variable-free affine image of one cone onto another,
//!   consumed by the generic [`SetMapBridge`]
//! - [`ConstraintBridge`] - the full read/write attribute interface, implemented
//!   directly when auxiliary variables are needed ([`NormOneBridge`])
//!
//! Every bridge owns the constraints and variables it adds to the host model and
//! releases them, in reverse order of creation, when deleted.

pub mod norm_inf;
pub mod norm_one;
pub mod registry;
pub mod set_map;

pub use norm_inf::{NormInfinityBridge, NormInfinityMap};
pub use norm_one::NormOneBridge;
pub use registry::BridgeRegistry;
pub use set_map::{SetMap, SetMapBridge};

use std::fmt;

use nalgebra::DVector;

use crate::error::{BridgeError, Result};
use crate::expr::{ConstraintIndex, VariableIndex, VectorAffineFunction};
use crate::model::HostModel;
use crate::sets::{ConeKind, ConeSet, FunctionKind};

/// Numerical settings shared by every bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Largest magnitude an auxiliary-variable coefficient may have when it is
    /// eliminated from a reconstructed function.
    pub elimination_tol: f64,
    /// Relative slack allowed when a dual start lies just outside the dual cone.
    pub dual_feasibility_tol: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            elimination_tol: 1e-9,
            dual_feasibility_tol: 1e-9,
        }
    }
}

impl Settings {
    /// Set the elimination tolerance.
    pub fn with_elimination_tol(mut self, tol: f64) -> Self {
        self.elimination_tol = tol;
        self
    }

    /// Set the dual feasibility tolerance.
    pub fn with_dual_feasibility_tol(mut self, tol: f64) -> Self {
        self.dual_feasibility_tol = tol;
        self
    }
}

/// An installed reformulation of one source constraint.
///
/// Reads and writes on the source constraint are answered by the bridge from the
/// constraints it owns. `delete` consumes the bridge, so a deleted bridge can no
/// longer be called.
pub trait ConstraintBridge: fmt::Debug {
    /// Cone of the constraint this bridge stands in for.
    fn source_kind(&self) -> ConeKind;

    /// Variables created by this bridge.
    fn added_variables(&self) -> Vec<VariableIndex>;

    /// Constraints created by this bridge, in creation order.
    fn added_constraints(&self) -> Vec<ConstraintIndex>;

    /// Function of the source constraint, over the original variables only.
    fn function(&self, model: &dyn HostModel) -> Result<VectorAffineFunction>;

    /// Set of the source constraint.
    fn set(&self, model: &dyn HostModel) -> Result<ConeSet>;

    /// Primal value of the source constraint.
    fn primal(&self, model: &dyn HostModel) -> Result<DVector<f64>>;

    /// Dual value of the source constraint.
    fn dual(&self, model: &dyn HostModel) -> Result<DVector<f64>>;

    /// Primal start of the source constraint, if every owned start is set.
    fn primal_start(&self, model: &dyn HostModel) -> Result<Option<DVector<f64>>>;

    /// Dual start of the source constraint, if every owned start is set.
    fn dual_start(&self, model: &dyn HostModel) -> Result<Option<DVector<f64>>>;

    /// Translate a primal start of the source constraint onto the owned constraints.
    fn set_primal_start(&self, model: &mut dyn HostModel, value: &[f64]) -> Result<()>;

    /// Translate a dual start of the source constraint onto the owned constraints.
    fn set_dual_start(&self, model: &mut dyn HostModel, value: &[f64]) -> Result<()>;

    /// Remove everything this bridge created.
    fn delete(self: Box<Self>, model: &mut dyn HostModel) -> Result<()>;
}

/// Static declarations a registry needs about a bridge type.
pub trait BridgeType: ConstraintBridge + Sized + 'static {
    /// Cone this bridge reformulates.
    const SOURCE: ConeKind;

    /// Whether `function in cone` can be bridged by this type.
    fn supports(function: FunctionKind, cone: ConeKind) -> bool {
        cone == Self::SOURCE
            && matches!(
                function,
                FunctionKind::VectorAffine | FunctionKind::VectorOfVariables
            )
    }

    /// Constrained-variable kinds this bridge adds. Auxiliary variables are free.
    fn added_constrained_variable_kinds() -> Vec<ConeKind> {
        Vec::new()
    }

    /// Constraint kinds this bridge adds, so a registry can plan bridge chains.
    fn added_constraint_kinds() -> Vec<(FunctionKind, ConeKind)>;

    /// Build the bridge, adding its variables and constraints to `model`.
    ///
    /// On error nothing the bridge created is left in the model.
    fn construct(
        model: &mut dyn HostModel,
        function: VectorAffineFunction,
        set: ConeSet,
        settings: &Settings,
    ) -> Result<Self>;
}

/// Number of non-epigraph coordinates `d` of an epigraph cone of dimension `n = d + 1`.
pub(crate) fn epigraph_split(set: &ConeSet) -> Result<usize> {
    let n = set.dimension();
    if n < 2 {
        return Err(BridgeError::shape(
            format!("{:?} of dimension at least 2", set.kind()),
            set,
        ));
    }
    Ok(n - 1)
}

/// Number `d` of row pairs in a nonnegative block of dimension `2d`.
pub(crate) fn nonneg_split(dim: usize) -> Result<usize> {
    if dim < 2 || dim % 2 != 0 {
        return Err(BridgeError::shape(
            "nonnegative block of even dimension at least 2",
            format!("dimension {}", dim),
        ));
    }
    Ok(dim / 2)
}

/// Check that a function or value has the dimension of the cone it belongs to.
pub(crate) fn check_dimension(set: &ConeSet, got: usize) -> Result<()> {
    if set.dimension() != got {
        return Err(BridgeError::shape(
            format!("dimension {} for {}", set.dimension(), set),
            format!("dimension {}", got),
        ));
    }
    Ok(())
}

/// Check that a set has the cone kind a bridge expects.
pub(crate) fn check_kind(set: &ConeSet, expected: ConeKind) -> Result<()> {
    if set.kind() != expected {
        return Err(BridgeError::UnsupportedCone(format!(
            "expected {:?}, got {}",
            expected, set
        )));
    }
    Ok(())
}
