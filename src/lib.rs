//! # cvxbridge
//!
//! Linear reformulations ("bridges") of norm-cone constraints.
//!
//! A solver that only understands nonnegativity and scalar lower bounds can still
//! accept epigraph constraints of the infinity norm and the one norm once they are
//! bridged. Each bridge translates the constraint function forward, and translates
//! primal values, dual multipliers and start values in both directions, so the
//! bridged constraint behaves like the native cone.
//!
//! ## Quick Start
//!
//! ```
//! use cvxbridge::prelude::*;
//!
//! let mut model = Model::new();
//! let vars = model.add_variables(3).unwrap();
//!
//! // t >= |x_1| + |x_2|
//! let registry = BridgeRegistry::default();
//! let bridge = registry
//!     .install(&mut model, VectorAffineFunction::variables(&vars), ConeSet::NormOne(3))
//!     .unwrap();
//!
//! bridge.set_primal_start(&mut model, &[7.0, 3.0, -4.0]).unwrap();
//! let start = bridge.primal_start(&model).unwrap().unwrap();
//! assert_eq!(start.as_slice(), &[7.0, 3.0, -4.0]);
//!
//! bridge.delete(&mut model).unwrap();
//! assert_eq!(model.num_variables(), 3);
//! ```
//!
//! ## Supported Cones
//!
//! - **NormInfinity** `t >= max_i |x_i|`: mapped to `2d` nonnegative rows, no
//!   auxiliary variables ([`bridges::NormInfinityBridge`])
//! - **NormOne** `t >= sum_i |x_i|`: `d` auxiliary variables, one scalar lower
//!   bound and `2d` nonnegative rows ([`bridges::NormOneBridge`])
//!
//! ## Architecture
//!
//! - **Host model** behind the [`model::HostModel`] trait, with an in-memory
//!   [`model::Model`] for tests and embedding
//! - **Sparse affine functions** keyed by variable handle, as nalgebra-sparse columns
//! - **Set maps** written once over [`expr::AffineVector`], applied to both functions
//!   and values
//! - **Registry** mapping cone tags to bridge constructors

pub mod bridges;
pub mod error;
pub mod expr;
pub mod model;
pub mod sets;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```
/// use cvxbridge::prelude::*;
/// ```
pub mod prelude {
    // Expressions
    pub use crate::expr::{AffineVector, ConstraintIndex, VariableIndex, VectorAffineFunction};

    // Sets
    pub use crate::sets::{ConeKind, ConeSet, FunctionKind};

    // Host model
    pub use crate::model::{HostModel, Model};

    // Bridges
    pub use crate::bridges::{
        BridgeRegistry, BridgeType, ConstraintBridge, NormInfinityBridge, NormInfinityMap,
        NormOneBridge, SetMap, SetMapBridge, Settings,
    };

    // Errors
    pub use crate::error::{BridgeError, ModelError, Result};
}

// Re-export main types at crate root
pub use bridges::{BridgeRegistry, ConstraintBridge, Settings};
pub use error::{BridgeError, ModelError, Result};
pub use model::{HostModel, Model};
