//! Vector affine functions and the affine-vector primitives shared with numeric vectors.
//!
//! A vector affine function has the standard form `sum_i(a_i * v_i) + b` where each
//! `v_i` is a scalar variable handle, `a_i` is a sparse column of the output dimension
//! and `b` is a dense constant.

use std::collections::HashMap;

use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;

use super::index::VariableIndex;
use crate::sparse::{
    csc_add, csc_div, csc_max_abs, csc_prune, csc_repeat_rows, csc_rows, csc_scale, csc_sum_rows,
    csc_unit, csc_vstack,
};

/// The primitives every set map is written against: scalar extraction,
/// linear combination and concatenation.
///
/// Implemented by [`VectorAffineFunction`] and by `DVector<f64>`, so a map written
/// once applies to constraint functions and to primal/dual values alike.
pub trait AffineVector: Clone + Sized {
    /// Number of output components.
    fn dimension(&self) -> usize;

    /// Components `start..end` as a new vector.
    fn subvector(&self, start: usize, end: usize) -> Self;

    /// Component `i` as a vector of dimension 1.
    fn component(&self, i: usize) -> Self {
        self.subvector(i, i + 1)
    }

    /// Componentwise sum. Both operands must have the same dimension.
    fn plus(&self, other: &Self) -> Self;

    /// Multiply every component by `scalar`.
    fn scaled(&self, scalar: f64) -> Self;

    /// Divide every component by `divisor`.
    ///
    /// Not the same as scaling by the reciprocal, which is rounded first.
    fn divided(&self, divisor: f64) -> Self;

    /// Componentwise difference.
    fn minus(&self, other: &Self) -> Self {
        self.plus(&other.scaled(-1.0))
    }

    /// Sum of all components, as a vector of dimension 1.
    fn sum_components(&self) -> Self;

    /// The whole vector repeated `times` times.
    fn broadcast(&self, times: usize) -> Self;

    /// Concatenate `parts` in order.
    fn concat(parts: &[Self]) -> Self;
}

/// A vector affine function of scalar variables.
#[derive(Debug, Clone)]
pub struct VectorAffineFunction {
    /// Coefficient columns, one per variable, each of shape (dimension, 1).
    pub coeffs: HashMap<VariableIndex, CscMatrix<f64>>,
    /// Constant term.
    pub constant: DVector<f64>,
}

impl VectorAffineFunction {
    /// Create a zero function of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        VectorAffineFunction {
            coeffs: HashMap::new(),
            constant: DVector::zeros(dim),
        }
    }

    /// Create a scalar function equal to a single variable.
    pub fn variable(var: VariableIndex) -> Self {
        Self::variables(&[var])
    }

    /// Create the function `[v_1, ..., v_n]`.
    ///
    /// Repeated handles accumulate into the same coefficient column.
    pub fn variables(vars: &[VariableIndex]) -> Self {
        let dim = vars.len();
        let mut coeffs: HashMap<VariableIndex, CscMatrix<f64>> = HashMap::new();
        for (row, var) in vars.iter().enumerate() {
            let unit = csc_unit(dim, row, 1.0);
            coeffs
                .entry(*var)
                .and_modify(|c| *c = csc_add(c, &unit))
                .or_insert(unit);
        }
        VectorAffineFunction {
            coeffs,
            constant: DVector::zeros(dim),
        }
    }

    /// Create a constant function.
    pub fn constant(values: &[f64]) -> Self {
        VectorAffineFunction {
            coeffs: HashMap::new(),
            constant: DVector::from_column_slice(values),
        }
    }

    /// Add `coefficient * var` to output component `row`.
    pub fn with_term(mut self, row: usize, var: VariableIndex, coefficient: f64) -> Self {
        let dim = self.dimension();
        let term = csc_unit(dim, row, coefficient);
        self.coeffs
            .entry(var)
            .and_modify(|c| *c = csc_add(c, &term))
            .or_insert(term);
        self
    }

    /// Check if this is a constant (no variables).
    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Get all variable handles in this function, sorted.
    pub fn variable_ids(&self) -> Vec<VariableIndex> {
        let mut vars: Vec<_> = self.coeffs.keys().copied().collect();
        vars.sort();
        vars
    }

    /// Coefficient of `var` in output component `row`.
    pub fn coefficient(&self, row: usize, var: VariableIndex) -> f64 {
        self.coeffs
            .get(&var)
            .map(|c| {
                c.triplet_iter()
                    .filter(|(r, _, _)| *r == row)
                    .map(|(_, _, v)| *v)
                    .sum::<f64>()
            })
            .unwrap_or(0.0)
    }

    /// Largest coefficient magnitude of `var` over all components.
    pub fn coefficient_magnitude(&self, var: VariableIndex) -> f64 {
        self.coeffs.get(&var).map(csc_max_abs).unwrap_or(0.0)
    }

    /// Evaluate at the variable values supplied by `value`.
    ///
    /// Returns `None` if any variable has no value.
    pub fn evaluate<F>(&self, value: F) -> Option<DVector<f64>>
    where
        F: Fn(VariableIndex) -> Option<f64>,
    {
        let mut result = self.constant.clone();
        for (var, coeff) in &self.coeffs {
            let x = value(*var)?;
            for (row, _col, a) in coeff.triplet_iter() {
                result[row] += a * x;
            }
        }
        Some(result)
    }

    /// Drop the given variables from the function.
    pub fn remove_variables(&self, vars: &[VariableIndex]) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .filter(|(k, _)| !vars.contains(k))
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: self.constant.clone(),
        }
    }

    /// Drop coefficients with magnitude at most `tol`, and variables left without any.
    pub fn prune(&self, tol: f64) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(k, v)| (*k, csc_prune(v, tol)))
            .filter(|(_, v)| v.nnz() > 0)
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: self.constant.clone(),
        }
    }
}

impl AffineVector for VectorAffineFunction {
    fn dimension(&self) -> usize {
        self.constant.len()
    }

    fn subvector(&self, start: usize, end: usize) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(k, v)| (*k, csc_rows(v, start, end)))
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: self.constant.rows(start, end - start).into_owned(),
        }
    }

    fn plus(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dimension(), other.dimension());
        let mut coeffs = self.coeffs.clone();
        coeffs.reserve(other.coeffs.len());
        for (var, coeff) in &other.coeffs {
            coeffs
                .entry(*var)
                .and_modify(|c| *c = csc_add(c, coeff))
                .or_insert_with(|| coeff.clone());
        }
        VectorAffineFunction {
            coeffs,
            constant: &self.constant + &other.constant,
        }
    }

    fn scaled(&self, scalar: f64) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(k, v)| (*k, csc_scale(v, scalar)))
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: &self.constant * scalar,
        }
    }

    fn divided(&self, divisor: f64) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(k, v)| (*k, csc_div(v, divisor)))
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: &self.constant / divisor,
        }
    }

    fn sum_components(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(k, v)| (*k, csc_sum_rows(v)))
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: DVector::from_element(1, self.constant.sum()),
        }
    }

    fn broadcast(&self, times: usize) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(k, v)| (*k, csc_repeat_rows(v, times)))
            .collect();
        VectorAffineFunction {
            coeffs,
            constant: AffineVector::broadcast(&self.constant, times),
        }
    }

    fn concat(parts: &[Self]) -> Self {
        let dims: Vec<usize> = parts.iter().map(|p| p.dimension()).collect();
        let total: usize = dims.iter().sum();

        let mut vars: Vec<VariableIndex> =
            parts.iter().flat_map(|p| p.coeffs.keys().copied()).collect();
        vars.sort();
        vars.dedup();

        let mut coeffs = HashMap::with_capacity(vars.len());
        for var in vars {
            // Parts without the variable contribute an all-zero block
            let blocks: Vec<CscMatrix<f64>> = parts
                .iter()
                .zip(&dims)
                .map(|(p, &d)| {
                    p.coeffs
                        .get(&var)
                        .cloned()
                        .unwrap_or_else(|| CscMatrix::zeros(d, 1))
                })
                .collect();
            let refs: Vec<&CscMatrix<f64>> = blocks.iter().collect();
            coeffs.insert(var, csc_vstack(&refs));
        }

        let constants: Vec<DVector<f64>> = parts.iter().map(|p| p.constant.clone()).collect();
        let constant = <DVector<f64> as AffineVector>::concat(&constants);
        debug_assert_eq!(constant.len(), total);

        VectorAffineFunction { coeffs, constant }
    }
}

impl AffineVector for DVector<f64> {
    fn dimension(&self) -> usize {
        self.len()
    }

    fn subvector(&self, start: usize, end: usize) -> Self {
        self.rows(start, end - start).into_owned()
    }

    fn plus(&self, other: &Self) -> Self {
        self + other
    }

    fn scaled(&self, scalar: f64) -> Self {
        self * scalar
    }

    fn divided(&self, divisor: f64) -> Self {
        self / divisor
    }

    fn sum_components(&self) -> Self {
        DVector::from_element(1, self.sum())
    }

    fn broadcast(&self, times: usize) -> Self {
        let n = self.len();
        DVector::from_fn(n * times, |i, _| self[i % n])
    }

    fn concat(parts: &[Self]) -> Self {
        let total = parts.iter().map(|p| p.len()).sum();
        DVector::from_iterator(total, parts.iter().flat_map(|p| p.iter().copied()))
    }
}
