//! Cone sets constraints are declared against.
//!
//! - NormInfinity: `t >= max_i |x_i|` over `[t; x]`
//! - NormOne: `t >= sum_i |x_i|` over `[t; x]`
//! - Nonnegatives: every component `>= 0`
//! - GreaterThan: scalar `f >= lower`

use std::fmt;

/// A cone, tagged with its dimension (or bound, for the scalar set).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConeSet {
    /// Epigraph of the infinity norm, of dimension `1 + d`.
    NormInfinity(usize),
    /// Epigraph of the one norm, of dimension `1 + d`.
    NormOne(usize),
    /// Nonnegative orthant of the given dimension.
    Nonnegatives(usize),
    /// Scalar lower bound.
    GreaterThan(f64),
}

/// Payload-free tag of a [`ConeSet`], used as a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConeKind {
    NormInfinity,
    NormOne,
    Nonnegatives,
    GreaterThan,
}

/// Shape of a constraint function, as declared to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// A single affine function.
    ScalarAffine,
    /// A vector of single variables.
    VectorOfVariables,
    /// A general vector affine function.
    VectorAffine,
}

impl ConeSet {
    /// Number of components a function in this set must have.
    pub fn dimension(&self) -> usize {
        match self {
            ConeSet::NormInfinity(n) | ConeSet::NormOne(n) | ConeSet::Nonnegatives(n) => *n,
            ConeSet::GreaterThan(_) => 1,
        }
    }

    /// The payload-free tag of this set.
    pub fn kind(&self) -> ConeKind {
        match self {
            ConeSet::NormInfinity(_) => ConeKind::NormInfinity,
            ConeSet::NormOne(_) => ConeKind::NormOne,
            ConeSet::Nonnegatives(_) => ConeKind::Nonnegatives,
            ConeSet::GreaterThan(_) => ConeKind::GreaterThan,
        }
    }

    /// Check whether `value` lies in the set, up to `tol`.
    pub fn contains(&self, value: &[f64], tol: f64) -> bool {
        if value.len() != self.dimension() {
            return false;
        }
        match self {
            ConeSet::NormInfinity(_) => {
                let Some(&t) = value.first() else {
                    return false;
                };
                t >= -tol && value[1..].iter().all(|x| x.abs() <= t + tol)
            }
            ConeSet::NormOne(_) => {
                let Some(&t) = value.first() else {
                    return false;
                };
                value[1..].iter().map(|x| x.abs()).sum::<f64>() <= t + tol
            }
            ConeSet::Nonnegatives(_) => value.iter().all(|v| *v >= -tol),
            ConeSet::GreaterThan(lower) => value[0] >= lower - tol,
        }
    }
}

impl fmt::Display for ConeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConeSet::NormInfinity(n) => write!(f, "NormInfinity({})", n),
            ConeSet::NormOne(n) => write!(f, "NormOne({})", n),
            ConeSet::Nonnegatives(n) => write!(f, "Nonnegatives({})", n),
            ConeSet::GreaterThan(lower) => write!(f, "GreaterThan({})", lower),
        }
    }
}
