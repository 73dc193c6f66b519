//! One-norm epigraph through auxiliary variables.
//!
//! `t >= sum_i |x_i|` over `[t; x]` of dimension `d + 1` is replaced by `d` new
//! variables `y` and two constraints:
//!
//! ```text
//! t - sum(y) >= 0
//! [y_1 - x_1, ..., y_d - x_d, y_1 + x_1, ..., y_d + x_d] >= 0
//! ```
//!
//! The nonnegative block uses the same row order as the infinity-norm bridge.

use log::{debug, trace, warn};
use nalgebra::DVector;

use super::{check_dimension, check_kind, epigraph_split, nonneg_split};
use super::{BridgeType, ConstraintBridge, Settings};
use crate::error::{BridgeError, Result};
use crate::expr::{AffineVector, ConstraintIndex, VariableIndex, VectorAffineFunction};
use crate::model::HostModel;
use crate::sets::{ConeKind, ConeSet, FunctionKind};

/// Bridge for one-norm epigraph constraints.
#[derive(Debug, Clone)]
pub struct NormOneBridge {
    y: Vec<VariableIndex>,
    ge: ConstraintIndex,
    nn: ConstraintIndex,
    settings: Settings,
}

/// Split `[t; x]` with auxiliary values `y` into the greater-than and nonnegative parts.
fn split<V: AffineVector>(t: &V, x: &V, y: &V) -> (V, V) {
    let ge = t.minus(&y.sum_components());
    let nn = V::concat(&[y.minus(x), y.plus(x)]);
    (ge, nn)
}

/// Recover `[t; x]` from the greater-than part `t - sum(y)` and the nonnegative block.
///
/// `y` cancels: half the block sums to `sum(y)` and the half-difference is `x`.
fn recombine<V: AffineVector>(ge: &V, nn: &V) -> Result<V> {
    let d = nonneg_split(nn.dimension())?;
    let upper = nn.subvector(0, d);
    let lower = nn.subvector(d, 2 * d);
    let t = ge.plus(&nn.sum_components().scaled(0.5));
    let x = lower.minus(&upper).scaled(0.5);
    Ok(V::concat(&[t, x]))
}

/// Recover source multipliers from the multipliers of the two owned constraints.
fn recombine_dual<V: AffineVector>(ge: &V, nn: &V) -> Result<V> {
    let d = nonneg_split(nn.dimension())?;
    let x = nn.subvector(d, 2 * d).minus(&nn.subvector(0, d));
    Ok(V::concat(&[ge.clone(), x]))
}

/// Delete what a failed construction created. Errors here are logged, the
/// construction error is what the caller sees.
fn discard(model: &mut dyn HostModel, constraints: &[ConstraintIndex], vars: &[VariableIndex]) {
    for c in constraints.iter().rev() {
        if let Err(e) = model.delete_constraint(*c) {
            warn!("failed to discard constraint {:?}: {}", c, e);
        }
    }
    if let Err(e) = model.delete_variables(vars) {
        warn!("failed to discard {} auxiliary variables: {}", vars.len(), e);
    }
}

impl NormOneBridge {
    /// Auxiliary variables `y`.
    pub fn auxiliary_variables(&self) -> &[VariableIndex] {
        &self.y
    }

    /// Handle of the `t - sum(y) >= 0` constraint.
    pub fn greater_than_constraint(&self) -> ConstraintIndex {
        self.ge
    }

    /// Handle of the `[y - x; y + x] >= 0` constraint.
    pub fn nonneg_constraint(&self) -> ConstraintIndex {
        self.nn
    }

    /// Number of non-epigraph coordinates.
    pub fn dimension(&self) -> usize {
        self.y.len()
    }

    /// Remove the nonnegative constraint, the greater-than constraint and the
    /// auxiliary variables, in that order.
    ///
    /// The first failing step aborts the teardown and its error is returned.
    pub fn delete(self, model: &mut dyn HostModel) -> Result<()> {
        model.delete_constraint(self.nn)?;
        model.delete_constraint(self.ge)?;
        model.delete_variables(&self.y)?;
        debug!(
            "deleted NormOne bridge: constraints {:?}, {:?} and {} variables",
            self.nn,
            self.ge,
            self.y.len()
        );
        Ok(())
    }

    /// Lower bound of the greater-than constraint, as stored by the host.
    ///
    /// The bridge adds it with a zero bound; a host that moves the function
    /// constant into the set is still read back correctly.
    fn ge_lower(&self, model: &dyn HostModel) -> Result<f64> {
        match model.constraint_set(self.ge)? {
            ConeSet::GreaterThan(lower) => Ok(lower),
            other => Err(BridgeError::InvariantViolation(format!(
                "greater-than constraint {:?} holds {}",
                self.ge, other
            ))),
        }
    }

    fn check_block(&self, dim: usize) -> Result<()> {
        if dim != 2 * self.y.len() {
            return Err(BridgeError::InvariantViolation(format!(
                "nonnegative block of dimension {} for {} auxiliary variables",
                dim,
                self.y.len()
            )));
        }
        Ok(())
    }

    fn values(&self, ge: Vec<f64>, nn: Vec<f64>) -> Result<(DVector<f64>, DVector<f64>)> {
        self.check_block(nn.len())?;
        Ok((DVector::from_vec(ge), DVector::from_vec(nn)))
    }
}

impl ConstraintBridge for NormOneBridge {
    fn source_kind(&self) -> ConeKind {
        ConeKind::NormOne
    }

    fn added_variables(&self) -> Vec<VariableIndex> {
        self.y.clone()
    }

    fn added_constraints(&self) -> Vec<ConstraintIndex> {
        vec![self.ge, self.nn]
    }

    fn function(&self, model: &dyn HostModel) -> Result<VectorAffineFunction> {
        let lower = self.ge_lower(model)?;
        let ge = model
            .constraint_function(self.ge)?
            .minus(&VectorAffineFunction::constant(&[lower]));
        let nn = model.constraint_function(self.nn)?;
        self.check_block(nn.dimension())?;

        let combined = recombine(&ge, &nn)?;
        for y in &self.y {
            let residual = combined.coefficient_magnitude(*y);
            if residual > self.settings.elimination_tol {
                return Err(BridgeError::InvariantViolation(format!(
                    "auxiliary variable {:?} does not cancel (coefficient {})",
                    y, residual
                )));
            }
        }
        Ok(combined.remove_variables(&self.y).prune(0.0))
    }

    fn set(&self, model: &dyn HostModel) -> Result<ConeSet> {
        let dim = model.constraint_set(self.nn)?.dimension();
        self.check_block(dim)?;
        Ok(ConeSet::NormOne(nonneg_split(dim)? + 1))
    }

    fn primal(&self, model: &dyn HostModel) -> Result<DVector<f64>> {
        let lower = self.ge_lower(model)?;
        let (ge, nn) = self.values(
            model.constraint_primal(self.ge)?,
            model.constraint_primal(self.nn)?,
        )?;
        recombine(&ge.add_scalar(-lower), &nn)
    }

    fn dual(&self, model: &dyn HostModel) -> Result<DVector<f64>> {
        let (ge, nn) = self.values(
            model.constraint_dual(self.ge)?,
            model.constraint_dual(self.nn)?,
        )?;
        recombine_dual(&ge, &nn)
    }

    fn primal_start(&self, model: &dyn HostModel) -> Result<Option<DVector<f64>>> {
        let lower = self.ge_lower(model)?;
        let ge = model.constraint_primal_start(self.ge)?;
        let nn = model.constraint_primal_start(self.nn)?;
        match (ge, nn) {
            (Some(ge), Some(nn)) => {
                let (ge, nn) = self.values(ge, nn)?;
                recombine(&ge.add_scalar(-lower), &nn).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn dual_start(&self, model: &dyn HostModel) -> Result<Option<DVector<f64>>> {
        let ge = model.constraint_dual_start(self.ge)?;
        let nn = model.constraint_dual_start(self.nn)?;
        match (ge, nn) {
            (Some(ge), Some(nn)) => {
                let (ge, nn) = self.values(ge, nn)?;
                recombine_dual(&ge, &nn).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn set_primal_start(&self, model: &mut dyn HostModel, value: &[f64]) -> Result<()> {
        let d = self.y.len();
        check_dimension(&ConeSet::NormOne(d + 1), value.len())?;
        let lower = self.ge_lower(model)?;

        let value = DVector::from_column_slice(value);
        let t = value.component(0);
        let x = value.subvector(1, d + 1);
        // Smallest feasible y: each auxiliary variable sits at |x_i|
        let y = x.abs();
        let (ge, nn) = split(&t, &x, &y);
        trace!(
            "primal start: y = {:?}, nonneg = {:?}, greater-than = {}",
            y.as_slice(),
            nn.as_slice(),
            ge[0]
        );

        for (var, start) in self.y.iter().zip(y.iter()) {
            model.set_variable_primal_start(*var, *start)?;
        }
        model.set_constraint_primal_start(self.nn, nn.as_slice())?;
        model.set_constraint_primal_start(self.ge, &[ge[0] + lower])?;
        Ok(())
    }

    fn set_dual_start(&self, model: &mut dyn HostModel, value: &[f64]) -> Result<()> {
        let d = self.y.len();
        check_dimension(&ConeSet::NormOne(d + 1), value.len())?;

        // y absorbs |x| exactly, so each pair needs a single nonzero row
        let mut nn = vec![0.0; 2 * d];
        for (i, &x) in value[1..].iter().enumerate() {
            if x < 0.0 {
                nn[i] = -x;
            } else {
                nn[d + i] = x;
            }
        }
        trace!("dual start: greater-than = {}, nonneg = {:?}", value[0], nn);

        model.set_constraint_dual_start(self.ge, &value[..1])?;
        model.set_constraint_dual_start(self.nn, &nn)?;
        Ok(())
    }

    fn delete(self: Box<Self>, model: &mut dyn HostModel) -> Result<()> {
        (*self).delete(model)
    }
}

impl BridgeType for NormOneBridge {
    const SOURCE: ConeKind = ConeKind::NormOne;

    fn added_constraint_kinds() -> Vec<(FunctionKind, ConeKind)> {
        vec![
            (FunctionKind::ScalarAffine, ConeKind::GreaterThan),
            (FunctionKind::VectorAffine, ConeKind::Nonnegatives),
        ]
    }

    fn construct(
        model: &mut dyn HostModel,
        function: VectorAffineFunction,
        set: ConeSet,
        settings: &Settings,
    ) -> Result<Self> {
        check_kind(&set, ConeKind::NormOne)?;
        check_dimension(&set, function.dimension())?;
        let d = epigraph_split(&set)?;

        let y = model.add_variables(d)?;
        if y.len() != d {
            discard(model, &[], &y);
            return Err(BridgeError::InvariantViolation(format!(
                "requested {} auxiliary variables, host added {}",
                d,
                y.len()
            )));
        }

        let t = function.component(0);
        let x = function.subvector(1, d + 1);
        let (ge_func, nn_func) = split(&t, &x, &VectorAffineFunction::variables(&y));

        let ge = match model.add_constraint(ge_func, ConeSet::GreaterThan(0.0)) {
            Ok(c) => c,
            Err(e) => {
                discard(model, &[], &y);
                return Err(e.into());
            }
        };
        let nn = match model.add_constraint(nn_func, ConeSet::Nonnegatives(2 * d)) {
            Ok(c) => c,
            Err(e) => {
                discard(model, &[ge], &y);
                return Err(e.into());
            }
        };

        debug!(
            "bridged {} with {} auxiliary variables: constraints {:?}, {:?}",
            set, d, ge, nn
        );
        Ok(NormOneBridge {
            y,
            ge,
            nn,
            settings: *settings,
        })
    }
}
