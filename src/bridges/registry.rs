//! Registry resolving a cone tag to the bridge that reformulates it.

use std::collections::HashMap;

use log::debug;

use super::{BridgeType, ConstraintBridge, NormInfinityBridge, NormOneBridge, Settings};
use crate::error::{BridgeError, Result};
use crate::expr::VectorAffineFunction;
use crate::model::HostModel;
use crate::sets::{ConeKind, ConeSet, FunctionKind};

type Constructor = fn(
    &mut dyn HostModel,
    VectorAffineFunction,
    ConeSet,
    &Settings,
) -> Result<Box<dyn ConstraintBridge>>;

struct Entry {
    supports: fn(FunctionKind, ConeKind) -> bool,
    added_constraint_kinds: fn() -> Vec<(FunctionKind, ConeKind)>,
    construct: Constructor,
}

fn construct_boxed<B: BridgeType>(
    model: &mut dyn HostModel,
    function: VectorAffineFunction,
    set: ConeSet,
    settings: &Settings,
) -> Result<Box<dyn ConstraintBridge>> {
    Ok(Box::new(B::construct(model, function, set, settings)?))
}

/// Maps each cone tag to one bridge type, resolved once per constraint at install time.
pub struct BridgeRegistry {
    settings: Settings,
    entries: HashMap<ConeKind, Entry>,
}

impl Default for BridgeRegistry {
    /// A registry with the infinity-norm and one-norm bridges and default settings.
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl BridgeRegistry {
    /// A registry with no bridges.
    pub fn empty(settings: Settings) -> Self {
        BridgeRegistry {
            settings,
            entries: HashMap::new(),
        }
    }

    /// A registry with the infinity-norm and one-norm bridges.
    pub fn with_settings(settings: Settings) -> Self {
        let mut registry = Self::empty(settings);
        registry.register::<NormInfinityBridge>();
        registry.register::<NormOneBridge>();
        registry
    }

    /// Settings passed to every bridge this registry constructs.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register `B` for its source cone, replacing any earlier bridge for that cone.
    pub fn register<B: BridgeType>(&mut self) {
        self.entries.insert(
            B::SOURCE,
            Entry {
                supports: B::supports,
                added_constraint_kinds: B::added_constraint_kinds,
                construct: construct_boxed::<B>,
            },
        );
    }

    /// Whether some registered bridge handles `function in cone`.
    pub fn supports(&self, function: FunctionKind, cone: ConeKind) -> bool {
        self.entries
            .get(&cone)
            .map(|e| (e.supports)(function, cone))
            .unwrap_or(false)
    }

    /// Constraint kinds the bridge for `cone` adds, if one is registered.
    pub fn added_constraint_kinds(&self, cone: ConeKind) -> Option<Vec<(FunctionKind, ConeKind)>> {
        self.entries.get(&cone).map(|e| (e.added_constraint_kinds)())
    }

    /// Bridge `function in set`, adding the replacement constraints to `model`.
    pub fn install(
        &self,
        model: &mut dyn HostModel,
        function: VectorAffineFunction,
        set: ConeSet,
    ) -> Result<Box<dyn ConstraintBridge>> {
        let entry = self.entries.get(&set.kind()).ok_or_else(|| {
            BridgeError::UnsupportedCone(format!("no bridge registered for {}", set))
        })?;
        let bridge = (entry.construct)(model, function, set, &self.settings)?;
        debug!("installed {:?}", bridge);
        Ok(bridge)
    }
}
