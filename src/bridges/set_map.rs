//! Generic bridge for reformulations that are an exact affine image of one cone.
//!
//! A [`SetMap`] supplies the forward map, its left inverse, the adjoint and a
//! right inverse of the adjoint. [`SetMapBridge`] forwards every attribute of the
//! source constraint through those four functions with no map-specific code.

use std::fmt;
use std::marker::PhantomData;

use log::{debug, trace};
use nalgebra::DVector;

use super::{check_dimension, check_kind, BridgeType, ConstraintBridge, Settings};
use crate::error::Result;
use crate::expr::{AffineVector, ConstraintIndex, VariableIndex, VectorAffineFunction};
use crate::model::HostModel;
use crate::sets::{ConeKind, ConeSet, FunctionKind};

/// A variable-free reformulation `A x in target  <=>  x in source`.
///
/// The function maps are written against [`AffineVector`] so the same map applies
/// to constraint functions and to primal or dual values.
pub trait SetMap: fmt::Debug + 'static {
    /// Cone being reformulated.
    const SOURCE: ConeKind;
    /// Cone of the single constraint that replaces it.
    const TARGET: ConeKind;

    /// Target cone for a source cone.
    fn map_set(set: &ConeSet) -> Result<ConeSet>;

    /// Source cone for a target cone. Exact inverse of [`SetMap::map_set`].
    fn inverse_map_set(set: &ConeSet) -> Result<ConeSet>;

    /// Apply the forward operator `A`.
    fn map_function<V: AffineVector>(func: &V) -> Result<V>;

    /// Left inverse of `A`: recovers `x` from any `A x`.
    fn inverse_map_function<V: AffineVector>(func: &V) -> Result<V>;

    /// Apply the transpose `A'`, mapping target multipliers to source multipliers.
    fn adjoint_map_function<V: AffineVector>(func: &V) -> Result<V>;

    /// A right inverse of `A'` that stays in the target's dual cone. Only used to
    /// translate dual starts.
    fn inverse_adjoint_map_function(
        value: &DVector<f64>,
        settings: &Settings,
    ) -> Result<DVector<f64>>;
}

/// Bridge that stores a source constraint as one target constraint.
pub struct SetMapBridge<M: SetMap> {
    constraint: ConstraintIndex,
    settings: Settings,
    map: PhantomData<M>,
}

impl<M: SetMap> fmt::Debug for SetMapBridge<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetMapBridge")
            .field("map", &std::any::type_name::<M>())
            .field("constraint", &self.constraint)
            .finish()
    }
}

impl<M: SetMap> SetMapBridge<M> {
    /// Handle of the target constraint.
    pub fn constraint(&self) -> ConstraintIndex {
        self.constraint
    }

    /// Replace the function of the source constraint.
    pub fn set_function(
        &self,
        model: &mut dyn HostModel,
        function: &VectorAffineFunction,
    ) -> Result<()> {
        let set = self.set(model)?;
        check_dimension(&set, function.dimension())?;
        let mapped = M::map_function(function)?;
        model.set_constraint_function(self.constraint, mapped)?;
        Ok(())
    }

    /// Remove the target constraint.
    pub fn delete(self, model: &mut dyn HostModel) -> Result<()> {
        model.delete_constraint(self.constraint)?;
        debug!("deleted {:?} bridge: constraint {:?}", M::SOURCE, self.constraint);
        Ok(())
    }
}

impl<M: SetMap> ConstraintBridge for SetMapBridge<M> {
    fn source_kind(&self) -> ConeKind {
        M::SOURCE
    }

    fn added_variables(&self) -> Vec<VariableIndex> {
        Vec::new()
    }

    fn added_constraints(&self) -> Vec<ConstraintIndex> {
        vec![self.constraint]
    }

    fn function(&self, model: &dyn HostModel) -> Result<VectorAffineFunction> {
        let mapped = model.constraint_function(self.constraint)?;
        Ok(M::inverse_map_function(&mapped)?.prune(0.0))
    }

    fn set(&self, model: &dyn HostModel) -> Result<ConeSet> {
        M::inverse_map_set(&model.constraint_set(self.constraint)?)
    }

    fn primal(&self, model: &dyn HostModel) -> Result<DVector<f64>> {
        let value = DVector::from_vec(model.constraint_primal(self.constraint)?);
        M::inverse_map_function(&value)
    }

    fn dual(&self, model: &dyn HostModel) -> Result<DVector<f64>> {
        let value = DVector::from_vec(model.constraint_dual(self.constraint)?);
        M::adjoint_map_function(&value)
    }

    fn primal_start(&self, model: &dyn HostModel) -> Result<Option<DVector<f64>>> {
        model
            .constraint_primal_start(self.constraint)?
            .map(|v| M::inverse_map_function(&DVector::from_vec(v)))
            .transpose()
    }

    fn dual_start(&self, model: &dyn HostModel) -> Result<Option<DVector<f64>>> {
        model
            .constraint_dual_start(self.constraint)?
            .map(|v| M::adjoint_map_function(&DVector::from_vec(v)))
            .transpose()
    }

    fn set_primal_start(&self, model: &mut dyn HostModel, value: &[f64]) -> Result<()> {
        check_dimension(&self.set(model)?, value.len())?;
        let mapped = M::map_function(&DVector::from_column_slice(value))?;
        trace!("primal start {:?} -> {:?}", value, mapped.as_slice());
        model.set_constraint_primal_start(self.constraint, mapped.as_slice())?;
        Ok(())
    }

    fn set_dual_start(&self, model: &mut dyn HostModel, value: &[f64]) -> Result<()> {
        check_dimension(&self.set(model)?, value.len())?;
        let mapped =
            M::inverse_adjoint_map_function(&DVector::from_column_slice(value), &self.settings)?;
        trace!("dual start {:?} -> {:?}", value, mapped.as_slice());
        model.set_constraint_dual_start(self.constraint, mapped.as_slice())?;
        Ok(())
    }

    fn delete(self: Box<Self>, model: &mut dyn HostModel) -> Result<()> {
        (*self).delete(model)
    }
}

impl<M: SetMap> BridgeType for SetMapBridge<M> {
    const SOURCE: ConeKind = M::SOURCE;

    fn added_constraint_kinds() -> Vec<(FunctionKind, ConeKind)> {
        vec![(FunctionKind::VectorAffine, M::TARGET)]
    }

    fn construct(
        model: &mut dyn HostModel,
        function: VectorAffineFunction,
        set: ConeSet,
        settings: &Settings,
    ) -> Result<Self> {
        check_kind(&set, M::SOURCE)?;
        check_dimension(&set, function.dimension())?;
        let target = M::map_set(&set)?;
        let mapped = M::map_function(&function)?;
        let constraint = model.add_constraint(mapped, target)?;
        debug!(
            "bridged {} as {}: constraint {:?}",
            set, target, constraint
        );
        Ok(SetMapBridge {
            constraint,
            settings: *settings,
            map: PhantomData,
        })
    }
}
