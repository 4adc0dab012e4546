//! Worker units, their roles and their lifecycle.

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::catalog::ModuleKind;
use crate::error::{ColonyError, Result};
use crate::world::{EntityId, Ownership, ZoneName};

/// Unique identifier for units.
pub type UnitId = u64;

/// Specialisation of a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuilderTask {
    /// Builds and repairs walls and ramparts.
    WallBuilder,
    /// Upgrades the zone controller.
    Upgrader,
    /// Travels to a new zone to bootstrap it, optionally carrying a claim module.
    Colonist {
        /// Whether the body carries a claim module.
        claim: bool,
    },
}

/// Fighting style of a defensive mercenary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatStyle {
    /// Close-range attacker.
    Melee,
    /// Ranged attacker.
    Ranged,
}

/// Roles of the dedicated assault force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiegeRole {
    /// Front-line melee unit.
    Assault,
    /// Healer.
    Medic,
    /// Ranged support.
    Skirmisher,
    /// Attacks the target controller once its defences are gone.
    Downgrader,
}

/// Functional category of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Works an extraction node.
    Harvester,
    /// Moves resources between nodes, storage and facilities.
    Transporter,
    /// Construction, upgrading or colonising.
    Builder(BuilderTask),
    /// Dedicated controller claimer / reserver / attacker.
    Claimer,
    /// Defensive unit produced in wartime.
    Mercenary(CombatStyle),
    /// Lone raider kept alive in contested unowned zones.
    Ravager,
    /// Member of the siege force.
    Siege(SiegeRole),
}

impl Role {
    /// Whether the sizer may decommission surplus units of this role.
    ///
    /// Colonists are only ever replaced when their directive changes.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Builder(BuilderTask::Colonist { .. }))
    }

    /// Whether two roles fill the same census slot.
    ///
    /// Colonists with and without claim modules count together.
    #[must_use]
    pub fn same_slot(self, other: Self) -> bool {
        match (self, other) {
            (
                Self::Builder(BuilderTask::Colonist { .. }),
                Self::Builder(BuilderTask::Colonist { .. }),
            ) => true,
            _ => self == other,
        }
    }
}

/// What a unit is assigned to work on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Assignment {
    /// No fixed assignment.
    #[default]
    Unassigned,
    /// A specific extraction node.
    Node(EntityId),
    /// A specific structure.
    Structure(EntityId),
}

/// What a claim-capable unit should do to the target controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimIntent {
    /// Take ownership.
    Claim,
    /// Hold a reservation.
    Reserve,
    /// Downgrade a controller held by someone else.
    Attack,
}

impl ClaimIntent {
    /// Action a claim unit takes on arrival, given the controller it finds
    /// and whether the colony may own another zone.
    ///
    /// Owned or reserved by another party: attack. Unowned with a claim
    /// intent: claim if capacity allows, otherwise fall back to reserving.
    #[must_use]
    pub fn resolve_on_arrival(self, ownership: &Ownership, claim_capacity: u32) -> Option<Self> {
        if ownership.is_hostile() {
            return Some(Self::Attack);
        }
        if ownership.is_owned_by_colony() {
            return None;
        }
        match self {
            Self::Claim if claim_capacity > 0 => Some(Self::Claim),
            Self::Claim | Self::Reserve | Self::Attack => Some(Self::Reserve),
        }
    }
}

/// Lifecycle of a unit.
///
/// `Active -> Decommissioned -> Retired`, with `Decommissioned -> Active`
/// allowed while the unit has not yet reached home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Working normally.
    #[default]
    Active,
    /// Walking home to be recycled.
    Decommissioned,
    /// Recycled or expired.
    Retired,
}

/// A worker unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Role.
    pub role: Role,
    /// Zone whose facilities produced the unit and where it retires.
    pub home: ZoneName,
    /// Zone the unit works in.
    pub zone: ZoneName,
    /// Fixed body.
    pub body: Body,
    /// Current assignment.
    pub assignment: Assignment,
    /// Controller action for claim-capable units.
    #[serde(default)]
    pub claim_intent: Option<ClaimIntent>,
    /// Lifecycle state.
    pub lifecycle: Lifecycle,
    /// Set by the behavior subsystem while the unit idles for work.
    #[serde(default)]
    pub waiting: bool,
    /// Cycles until the unit expires.
    pub ticks_to_live: u32,
}

impl Unit {
    /// Whether the unit still exists in the world.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lifecycle != Lifecycle::Retired
    }

    /// Whether the unit counts toward its role's census.
    #[must_use]
    pub fn is_counted(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Active module count of the unit's sizing module.
    #[must_use]
    pub fn size(&self, primary: ModuleKind) -> u32 {
        self.body.active(primary)
    }

    /// Mark the unit for voluntary retirement.
    pub fn decommission(&mut self) -> Result<()> {
        self.transition(Lifecycle::Decommissioned)
    }

    /// Cancel a pending decommission. The cached assignment is cleared so
    /// the behavior subsystem picks a fresh one.
    pub fn reinstate(&mut self) -> Result<()> {
        self.transition(Lifecycle::Active)?;
        self.assignment = Assignment::Unassigned;
        Ok(())
    }

    /// Remove the unit from play (recycled at home, or expired).
    pub fn retire(&mut self) -> Result<()> {
        self.transition(Lifecycle::Retired)
    }

    fn transition(&mut self, to: Lifecycle) -> Result<()> {
        let allowed = matches!(
            (self.lifecycle, to),
            (Lifecycle::Active, Lifecycle::Decommissioned)
                | (Lifecycle::Decommissioned, Lifecycle::Active)
                | (Lifecycle::Active | Lifecycle::Decommissioned, Lifecycle::Retired)
        );
        if !allowed {
            return Err(ColonyError::InvalidTransition {
                unit: self.id,
                from: self.lifecycle,
                to,
            });
        }
        self.lifecycle = to;
        Ok(())
    }
}
