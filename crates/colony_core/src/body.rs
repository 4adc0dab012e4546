//! Unit bodies.
//!
//! A body is fixed when the unit is produced and never changes. Damage is
//! tracked per module; a module only counts while it still has integrity.

use serde::{Deserialize, Serialize};

use crate::catalog::ModuleKind;

/// Full integrity of an undamaged module.
pub const FULL_INTEGRITY: u8 = 100;

/// One capability module of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyModule {
    /// Type of the module.
    pub kind: ModuleKind,
    /// Remaining integrity, 0 means destroyed.
    pub integrity: u8,
}

impl BodyModule {
    /// Whether the module still contributes.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.integrity > 0
    }
}

/// An ordered, immutable set of capability modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Body {
    modules: Vec<BodyModule>,
}

impl Body {
    /// Build an undamaged body from `(kind, count)` pairs, in the given order.
    #[must_use]
    pub fn from_counts(counts: &[(ModuleKind, u32)]) -> Self {
        let modules = counts
            .iter()
            .flat_map(|&(kind, count)| {
                std::iter::repeat(BodyModule {
                    kind,
                    integrity: FULL_INTEGRITY,
                })
                .take(count as usize)
            })
            .collect();
        Self { modules }
    }

    /// The modules in body order.
    #[must_use]
    pub fn modules(&self) -> &[BodyModule] {
        &self.modules
    }

    /// Total modules, damaged or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the body has no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Energy cost of the whole body.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.modules.iter().map(|m| m.kind.cost()).sum()
    }

    /// Number of modules of `kind`, whatever their state.
    #[must_use]
    pub fn count(&self, kind: ModuleKind) -> u32 {
        self.modules.iter().filter(|m| m.kind == kind).count() as u32
    }

    /// Number of still-working modules of `kind`.
    #[must_use]
    pub fn active(&self, kind: ModuleKind) -> u32 {
        self.modules
            .iter()
            .filter(|m| m.kind == kind && m.is_active())
            .count() as u32
    }

    /// Whether any working module is offensive.
    #[must_use]
    pub fn is_combat_capable(&self) -> bool {
        self.modules
            .iter()
            .any(|m| m.is_active() && m.kind.is_offensive())
    }

    /// Apply `amount` damage, front modules first.
    ///
    /// Models incoming damage for sandbox runs and tests; the body layout
    /// itself never changes.
    pub fn take_damage(&mut self, mut amount: u32) {
        for module in &mut self.modules {
            if amount == 0 {
                break;
            }
            let absorbed = amount.min(u32::from(module.integrity));
            module.integrity -= absorbed as u8;
            amount -= absorbed;
        }
    }
}
