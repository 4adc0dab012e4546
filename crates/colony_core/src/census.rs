//! Zone census.
//!
//! Read-only tallies of the units filling a role in a zone.

use crate::body::Body;
use crate::catalog::ModuleKind;
use crate::math::Fixed;
use crate::units::{Lifecycle, Role, Unit, UnitId};
use crate::world::{World, ZoneName};

/// One counted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    /// Unit id.
    pub id: UnitId,
    /// Active primary-module count.
    pub size: u32,
    /// Cycles the unit has left.
    pub ticks_to_live: u32,
}

/// Tally of one role in one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCensus {
    /// Living, non-decommissioned units.
    pub members: Vec<Member>,
    /// Units walking home that could still be reinstated.
    pub decommissioned: Vec<Member>,
}

impl RoleCensus {
    /// Count units of `role` working in `zone` that also pass `filter`,
    /// measuring each by its active `primary` modules.
    pub fn take(
        world: &World,
        zone: &ZoneName,
        role: Role,
        primary: ModuleKind,
        filter: impl Fn(&Unit) -> bool,
    ) -> Self {
        let mut census = Self::default();
        for unit in world.query_units(zone, move |u| u.role.same_slot(role)) {
            if !filter(unit) {
                continue;
            }
            let member = Member {
                id: unit.id,
                size: unit.size(primary),
                ticks_to_live: unit.ticks_to_live,
            };
            match unit.lifecycle {
                Lifecycle::Active => census.members.push(member),
                Lifecycle::Decommissioned => census.decommissioned.push(member),
                Lifecycle::Retired => {}
            }
        }
        census
    }

    /// Summed active primary modules of the counted units.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Number of counted units.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Whether any counted unit is smaller than `size`.
    #[must_use]
    pub fn has_undersized(&self, size: u32) -> bool {
        self.members.iter().any(|m| m.size < size)
    }

    /// The unit to retire first: smallest, then closest to expiry, then lowest id.
    #[must_use]
    pub fn most_replaceable(&self) -> Option<Member> {
        self.members
            .iter()
            .min_by_key(|m| (m.size, m.ticks_to_live, m.id))
            .copied()
    }
}

/// Weighted attack power of a set of bodies: melee modules count
/// `melee_weight` each, ranged modules one each.
pub fn attack_power<'a>(bodies: impl IntoIterator<Item = &'a Body>, melee_weight: Fixed) -> Fixed {
    bodies.into_iter().fold(Fixed::ZERO, |acc, body| {
        acc + Fixed::from_num(body.active(ModuleKind::Melee)) * melee_weight
            + Fixed::from_num(body.active(ModuleKind::Ranged))
    })
}

/// Melee power of a set of bodies.
pub fn melee_power<'a>(bodies: impl IntoIterator<Item = &'a Body>, melee_weight: Fixed) -> Fixed {
    bodies.into_iter().fold(Fixed::ZERO, |acc, body| {
        acc + Fixed::from_num(body.active(ModuleKind::Melee)) * melee_weight
    })
}

/// Ranged power of a set of bodies.
pub fn ranged_power<'a>(bodies: impl IntoIterator<Item = &'a Body>) -> Fixed {
    bodies.into_iter().fold(Fixed::ZERO, |acc, body| {
        acc + Fixed::from_num(body.active(ModuleKind::Ranged))
    })
}
