//! In-memory host model.
//!
//! Stores variables and constraints keyed by handle. It does not solve anything:
//! solution values are injected with [`Model::set_variable_primal`] and
//! [`Model::set_constraint_dual`], and constraint primals are evaluated from the
//! variable values.

use std::collections::BTreeMap;

use super::{HostModel, ModelResult};
use crate::error::ModelError;
use crate::expr::{AffineVector, ConstraintIndex, VariableIndex, VectorAffineFunction};
use crate::sets::ConeSet;

#[derive(Debug, Clone, Default)]
struct VariableData {
    primal: Option<f64>,
    primal_start: Option<f64>,
}

#[derive(Debug, Clone)]
struct ConstraintData {
    function: VectorAffineFunction,
    set: ConeSet,
    dual: Option<Vec<f64>>,
    primal_start: Option<Vec<f64>>,
    dual_start: Option<Vec<f64>>,
}

/// A model holding variables and constraints in memory.
#[derive(Debug, Clone, Default)]
pub struct Model {
    next_variable: u64,
    next_constraint: u64,
    variables: BTreeMap<VariableIndex, VariableData>,
    constraints: BTreeMap<ConstraintIndex, ConstraintData>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of live constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Live variable handles, in creation order.
    pub fn variable_indices(&self) -> Vec<VariableIndex> {
        self.variables.keys().copied().collect()
    }

    /// Live constraint handles, in creation order.
    pub fn constraint_indices(&self) -> Vec<ConstraintIndex> {
        self.constraints.keys().copied().collect()
    }

    /// Record the solution value of a variable.
    pub fn set_variable_primal(&mut self, v: VariableIndex, value: f64) -> ModelResult<()> {
        self.variable_mut(v)?.primal = Some(value);
        Ok(())
    }

    /// Solution value of a variable.
    pub fn variable_primal(&self, v: VariableIndex) -> ModelResult<f64> {
        self.variable(v)?
            .primal
            .ok_or_else(|| ModelError::ResultUnavailable(format!("primal of {:?}", v)))
    }

    /// Record the dual multiplier of a constraint.
    pub fn set_constraint_dual(&mut self, c: ConstraintIndex, value: &[f64]) -> ModelResult<()> {
        let data = self.constraint_mut(c)?;
        check_dimension(data.set.dimension(), value.len())?;
        data.dual = Some(value.to_vec());
        Ok(())
    }

    /// Forget every injected solution value.
    pub fn clear_solution(&mut self) {
        for data in self.variables.values_mut() {
            data.primal = None;
        }
        for data in self.constraints.values_mut() {
            data.dual = None;
        }
    }

    fn variable(&self, v: VariableIndex) -> ModelResult<&VariableData> {
        self.variables
            .get(&v)
            .ok_or(ModelError::InvalidVariable(v))
    }

    fn variable_mut(&mut self, v: VariableIndex) -> ModelResult<&mut VariableData> {
        self.variables
            .get_mut(&v)
            .ok_or(ModelError::InvalidVariable(v))
    }

    fn constraint(&self, c: ConstraintIndex) -> ModelResult<&ConstraintData> {
        self.constraints
            .get(&c)
            .ok_or(ModelError::InvalidConstraint(c))
    }

    fn constraint_mut(&mut self, c: ConstraintIndex) -> ModelResult<&mut ConstraintData> {
        self.constraints
            .get_mut(&c)
            .ok_or(ModelError::InvalidConstraint(c))
    }

    fn check_function(&self, function: &VectorAffineFunction, set: &ConeSet) -> ModelResult<()> {
        check_dimension(set.dimension(), function.dimension())?;
        match function
            .variable_ids()
            .into_iter()
            .find(|v| !self.variables.contains_key(v))
        {
            Some(v) => Err(ModelError::InvalidVariable(v)),
            None => Ok(()),
        }
    }
}

fn check_dimension(expected: usize, got: usize) -> ModelResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch { expected, got })
    }
}

impl HostModel for Model {
    fn add_variables(&mut self, count: usize) -> ModelResult<Vec<VariableIndex>> {
        let mut added = Vec::with_capacity(count);
        for _ in 0..count {
            let v = VariableIndex::new(self.next_variable);
            self.next_variable += 1;
            self.variables.insert(v, VariableData::default());
            added.push(v);
        }
        Ok(added)
    }

    fn add_constraint(
        &mut self,
        function: VectorAffineFunction,
        set: ConeSet,
    ) -> ModelResult<ConstraintIndex> {
        self.check_function(&function, &set)?;
        let c = ConstraintIndex::new(self.next_constraint);
        self.next_constraint += 1;
        self.constraints.insert(
            c,
            ConstraintData {
                function,
                set,
                dual: None,
                primal_start: None,
                dual_start: None,
            },
        );
        Ok(c)
    }

    fn constraint_function(&self, c: ConstraintIndex) -> ModelResult<VectorAffineFunction> {
        Ok(self.constraint(c)?.function.clone())
    }

    fn set_constraint_function(
        &mut self,
        c: ConstraintIndex,
        function: VectorAffineFunction,
    ) -> ModelResult<()> {
        let set = self.constraint(c)?.set;
        self.check_function(&function, &set)?;
        self.constraint_mut(c)?.function = function;
        Ok(())
    }

    fn constraint_set(&self, c: ConstraintIndex) -> ModelResult<ConeSet> {
        Ok(self.constraint(c)?.set)
    }

    fn constraint_primal(&self, c: ConstraintIndex) -> ModelResult<Vec<f64>> {
        let data = self.constraint(c)?;
        data.function
            .evaluate(|v| self.variables.get(&v).and_then(|d| d.primal))
            .map(|value| value.as_slice().to_vec())
            .ok_or_else(|| ModelError::ResultUnavailable(format!("primal of {:?}", c)))
    }

    fn constraint_dual(&self, c: ConstraintIndex) -> ModelResult<Vec<f64>> {
        self.constraint(c)?
            .dual
            .clone()
            .ok_or_else(|| ModelError::ResultUnavailable(format!("dual of {:?}", c)))
    }

    fn constraint_primal_start(&self, c: ConstraintIndex) -> ModelResult<Option<Vec<f64>>> {
        Ok(self.constraint(c)?.primal_start.clone())
    }

    fn constraint_dual_start(&self, c: ConstraintIndex) -> ModelResult<Option<Vec<f64>>> {
        Ok(self.constraint(c)?.dual_start.clone())
    }

    fn set_constraint_primal_start(
        &mut self,
        c: ConstraintIndex,
        value: &[f64],
    ) -> ModelResult<()> {
        let data = self.constraint_mut(c)?;
        check_dimension(data.set.dimension(), value.len())?;
        data.primal_start = Some(value.to_vec());
        Ok(())
    }

    fn set_constraint_dual_start(&mut self, c: ConstraintIndex, value: &[f64]) -> ModelResult<()> {
        let data = self.constraint_mut(c)?;
        check_dimension(data.set.dimension(), value.len())?;
        data.dual_start = Some(value.to_vec());
        Ok(())
    }

    fn variable_primal_start(&self, v: VariableIndex) -> ModelResult<Option<f64>> {
        Ok(self.variable(v)?.primal_start)
    }

    fn set_variable_primal_start(&mut self, v: VariableIndex, value: f64) -> ModelResult<()> {
        self.variable_mut(v)?.primal_start = Some(value);
        Ok(())
    }

    fn delete_constraint(&mut self, c: ConstraintIndex) -> ModelResult<()> {
        self.constraints
            .remove(&c)
            .map(|_| ())
            .ok_or(ModelError::InvalidConstraint(c))
    }

    fn delete_variables(&mut self, vars: &[VariableIndex]) -> ModelResult<()> {
        if let Some(v) = vars.iter().find(|v| !self.variables.contains_key(*v)) {
            return Err(ModelError::InvalidVariable(*v));
        }
        for v in vars {
            self.variables.remove(v);
        }
        Ok(())
    }

    fn is_valid_variable(&self, v: VariableIndex) -> bool {
        self.variables.contains_key(&v)
    }

    fn is_valid_constraint(&self, c: ConstraintIndex) -> bool {
        self.constraints.contains_key(&c)
    }
}
