//! Capability catalog.
//!
//! Static table of module costs and the body shape of every role: which
//! module the role is sized by, and how many support modules ride along
//! per sized module.

use serde::{Deserialize, Serialize};

use crate::math::{floor_mul, ratio, Fixed};
use crate::units::{BuilderTask, CombatStyle, Role, SiegeRole};

/// Hard ceiling on the number of modules in a single body.
pub const MAX_BODY_MODULES: u32 = 50;

/// Type of a capability module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleKind {
    /// Extraction and construction output.
    Labor,
    /// Storage capacity.
    Carry,
    /// Movement.
    Mobility,
    /// Melee attack.
    Melee,
    /// Ranged attack.
    Ranged,
    /// Healing.
    Heal,
    /// Damage resistance.
    Tough,
    /// Territorial claim.
    Claim,
}

impl ModuleKind {
    /// Every module kind, in body order.
    pub const ALL: [Self; 8] = [
        Self::Tough,
        Self::Labor,
        Self::Carry,
        Self::Melee,
        Self::Ranged,
        Self::Heal,
        Self::Claim,
        Self::Mobility,
    ];

    /// Energy cost of one module of this kind.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Labor => 100,
            Self::Carry | Self::Mobility => 50,
            Self::Melee => 80,
            Self::Ranged => 150,
            Self::Heal => 250,
            Self::Tough => 10,
            Self::Claim => 600,
        }
    }

    /// Whether a hostile carrying this module makes a zone a war zone.
    #[must_use]
    pub const fn is_offensive(self) -> bool {
        matches!(self, Self::Melee | Self::Ranged)
    }
}

/// Body proportions for one role.
///
/// A role is sized by its `primary` module; `carry_per_primary` and
/// `mobility_per_primary` scale with it, `fixed_extras` do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleShape {
    /// The module this role is sized by.
    pub primary: ModuleKind,
    /// Carry modules per primary module.
    pub carry_per_primary: Fixed,
    /// Mobility modules per primary module (at least one is always added).
    pub mobility_per_primary: Fixed,
    /// Modules added regardless of size.
    pub fixed_extras: Vec<(ModuleKind, u32)>,
    /// Add one more carry module once the primary count reaches this.
    pub second_carry_at: Option<u32>,
    /// Largest primary count a single unit may carry.
    pub cap: u32,
}

impl RoleShape {
    fn new(primary: ModuleKind, mobility_per_primary: Fixed, cap: u32) -> Self {
        Self {
            primary,
            carry_per_primary: Fixed::ZERO,
            mobility_per_primary,
            fixed_extras: Vec::new(),
            second_carry_at: None,
            cap,
        }
    }

    fn with_carry_ratio(mut self, carry_per_primary: Fixed) -> Self {
        self.carry_per_primary = carry_per_primary;
        self
    }

    fn with_extra(mut self, kind: ModuleKind, count: u32) -> Self {
        self.fixed_extras.push((kind, count));
        self
    }

    fn with_second_carry_at(mut self, threshold: u32) -> Self {
        self.second_carry_at = Some(threshold);
        self
    }

    /// Look up the shape for a role.
    ///
    /// `second_carry_at` is the labor count at which labor-centric roles
    /// receive a second carry module.
    #[must_use]
    pub fn for_role(role: Role, second_carry_at: u32) -> Self {
        match role {
            Role::Harvester => Self::new(ModuleKind::Labor, ratio(1, 3), 20)
                .with_extra(ModuleKind::Carry, 1)
                .with_second_carry_at(second_carry_at),
            Role::Transporter => Self::new(ModuleKind::Carry, ratio(1, 2), 32),
            Role::Builder(BuilderTask::WallBuilder) => {
                Self::new(ModuleKind::Labor, ratio(1, 2), 15).with_carry_ratio(ratio(1, 2))
            }
            Role::Builder(BuilderTask::Upgrader) => Self::new(ModuleKind::Labor, ratio(1, 3), 15)
                .with_extra(ModuleKind::Carry, 1)
                .with_second_carry_at(second_carry_at),
            Role::Builder(BuilderTask::Colonist { claim }) => {
                let shape = Self::new(ModuleKind::Labor, Fixed::ONE, 10)
                    .with_carry_ratio(Fixed::ONE);
                if claim {
                    shape.with_extra(ModuleKind::Claim, 1)
                } else {
                    shape
                }
            }
            Role::Claimer => Self::new(ModuleKind::Claim, Fixed::ONE, 3),
            Role::Mercenary(CombatStyle::Melee) => {
                Self::new(ModuleKind::Melee, Fixed::ONE, 20).with_extra(ModuleKind::Tough, 2)
            }
            Role::Mercenary(CombatStyle::Ranged) => Self::new(ModuleKind::Ranged, Fixed::ONE, 15),
            Role::Ravager => {
                Self::new(ModuleKind::Melee, Fixed::ONE, 12).with_extra(ModuleKind::Heal, 1)
            }
            Role::Siege(SiegeRole::Assault) => {
                Self::new(ModuleKind::Melee, Fixed::ONE, 20).with_extra(ModuleKind::Tough, 4)
            }
            Role::Siege(SiegeRole::Medic) => Self::new(ModuleKind::Heal, Fixed::ONE, 10),
            Role::Siege(SiegeRole::Skirmisher) => Self::new(ModuleKind::Ranged, Fixed::ONE, 15),
            Role::Siege(SiegeRole::Downgrader) => Self::new(ModuleKind::Claim, Fixed::ONE, 5),
        }
    }

    /// Module counts for a body with `primary` sized modules.
    ///
    /// Returned in body order, zero counts omitted.
    #[must_use]
    pub fn composition(&self, primary: u32) -> Vec<(ModuleKind, u32)> {
        let mut carry = floor_mul(primary, self.carry_per_primary);
        let mut extras = self.fixed_extras.clone();
        if let Some(threshold) = self.second_carry_at {
            if primary >= threshold {
                carry += 1;
            }
        }
        if self.primary == ModuleKind::Carry {
            carry = 0;
        }
        if carry > 0 {
            extras.push((ModuleKind::Carry, carry));
        }
        let mobility = floor_mul(primary, self.mobility_per_primary).max(1);

        ModuleKind::ALL
            .iter()
            .filter_map(|&kind| {
                let mut count: u32 = extras
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, n)| n)
                    .sum();
                if kind == self.primary {
                    count += primary;
                }
                if kind == ModuleKind::Mobility {
                    count += mobility;
                }
                (count > 0).then_some((kind, count))
            })
            .collect()
    }

    /// Energy cost of a body with `primary` sized modules.
    #[must_use]
    pub fn cost(&self, primary: u32) -> u32 {
        self.composition(primary)
            .iter()
            .map(|(kind, count)| kind.cost() * count)
            .sum()
    }

    /// Total module count of a body with `primary` sized modules.
    #[must_use]
    pub fn module_count(&self, primary: u32) -> u32 {
        self.composition(primary).iter().map(|(_, n)| n).sum()
    }

    /// Largest primary count affordable with `energy`, bounded by `cap`
    /// and the body module ceiling. Zero when not even one fits.
    #[must_use]
    pub fn max_affordable(&self, energy: u32, cap: u32) -> u32 {
        let limit = cap.min(self.cap);
        (1..=limit)
            .take_while(|&n| self.cost(n) <= energy && self.module_count(n) <= MAX_BODY_MODULES)
            .last()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_of(composition: &[(ModuleKind, u32)], kind: ModuleKind) -> u32 {
        composition
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }

    #[test]
    fn test_module_costs() {
        assert_eq!(ModuleKind::Labor.cost(), 100);
        assert_eq!(ModuleKind::Carry.cost(), 50);
        assert_eq!(ModuleKind::Claim.cost(), 600);
    }

    #[test]
    fn test_harvester_mobility_ratio() {
        let shape = RoleShape::for_role(Role::Harvester, 10);
        let body = shape.composition(6);
        assert_eq!(count_of(&body, ModuleKind::Labor), 6);
        assert_eq!(count_of(&body, ModuleKind::Mobility), 2);
        assert_eq!(count_of(&body, ModuleKind::Carry), 1);
    }

    #[test]
    fn test_mobility_never_below_one() {
        let shape = RoleShape::for_role(Role::Harvester, 10);
        assert_eq!(count_of(&shape.composition(1), ModuleKind::Mobility), 1);
    }

    #[test]
    fn test_second_carry_at_threshold() {
        let shape = RoleShape::for_role(Role::Harvester, 10);
        assert_eq!(count_of(&shape.composition(9), ModuleKind::Carry), 1);
        assert_eq!(count_of(&shape.composition(10), ModuleKind::Carry), 2);
    }

    #[test]
    fn test_transporter_has_no_labor() {
        let shape = RoleShape::for_role(Role::Transporter, 10);
        let body = shape.composition(4);
        assert_eq!(count_of(&body, ModuleKind::Carry), 4);
        assert_eq!(count_of(&body, ModuleKind::Mobility), 2);
        assert_eq!(count_of(&body, ModuleKind::Labor), 0);
        assert_eq!(shape.cost(4), 300);
    }

    #[test]
    fn test_max_affordable_respects_energy() {
        let shape = RoleShape::for_role(Role::Transporter, 10);
        // 6 carry + 3 mobility = 450
        assert_eq!(shape.max_affordable(450, 32), 6);
        assert_eq!(shape.max_affordable(449, 32), 5);
    }

    #[test]
    fn test_max_affordable_respects_cap() {
        let shape = RoleShape::for_role(Role::Transporter, 10);
        assert_eq!(shape.max_affordable(10_000, 5), 5);
    }

    #[test]
    fn test_max_affordable_zero_when_broke() {
        let shape = RoleShape::for_role(Role::Claimer, 10);
        assert_eq!(shape.max_affordable(300, 3), 0);
    }

    #[test]
    fn test_colonist_claim_extra() {
        let shape = RoleShape::for_role(Role::Builder(BuilderTask::Colonist { claim: true }), 10);
        let body = shape.composition(1);
        assert_eq!(count_of(&body, ModuleKind::Claim), 1);
        assert_eq!(shape.cost(1), 800);
    }
}
