//! Opaque handles into a host model's variable and constraint stores.

/// Handle to a scalar variable owned by a host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableIndex(u64);

impl VariableIndex {
    /// Wrap a raw host identifier.
    pub fn new(raw: u64) -> Self {
        VariableIndex(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Handle to a constraint owned by a host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintIndex(u64);

impl ConstraintIndex {
    /// Wrap a raw host identifier.
    pub fn new(raw: u64) -> Self {
        ConstraintIndex(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}
