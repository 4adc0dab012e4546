//! World snapshot the scheduler reads and writes each cycle.
//!
//! The snapshot is taken at cycle start; the scheduler only mutates it
//! through unit flag changes and [`World::produce`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::body::Body;
use crate::catalog::ModuleKind;
use crate::units::{Assignment, ClaimIntent, Lifecycle, Role, Unit, UnitId};

/// Unique identifier for world entities (facilities, nodes, structures).
pub type EntityId = u64;

/// Lifetime of a freshly produced unit, in cycles.
pub const UNIT_LIFETIME: u32 = 1500;

/// Lifetime of a unit carrying a claim module, in cycles.
pub const CLAIM_UNIT_LIFETIME: u32 = 600;

/// Production time per body module, in cycles.
pub const SPAWN_TIME_PER_MODULE: u32 = 3;

/// Tiles along one side of a zone.
pub const ZONE_SIZE: i32 = 50;

/// Longest reservation a controller can hold, in cycles.
pub const RESERVATION_MAX: u32 = 5000;

/// Upgrade block left on a controller after an attack, in cycles.
pub const ATTACK_UPGRADE_BLOCK: u32 = 1000;

/// Name of a zone, e.g. `W3N5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneName(String);

impl ZoneName {
    /// Create a zone name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Global zone-grid coordinates parsed from a `W3N5`-style name.
    ///
    /// `E0`/`S0` map to 0, `W0`/`N0` map to -1. Returns `None` for names
    /// that do not follow the pattern.
    #[must_use]
    pub fn coords(&self) -> Option<(i32, i32)> {
        let s = self.0.as_str();
        if s.len() < 4 || !s.is_ascii() {
            return None;
        }
        let split = s[1..].find(|c: char| c.is_ascii_alphabetic())? + 1;
        let (horizontal, vertical) = s.split_at(split);
        let axis = |part: &str, positive: char, negative: char| -> Option<i32> {
            let mut chars = part.chars();
            let dir = chars.next()?;
            let digits = chars.as_str();
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let n: i32 = digits.parse().ok()?;
            if dir == positive {
                Some(n)
            } else if dir == negative {
                Some(-n - 1)
            } else {
                None
            }
        };
        Some((axis(horizontal, 'E', 'W')?, axis(vertical, 'S', 'N')?))
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tile position inside a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zone the tile belongs to.
    pub zone: ZoneName,
    /// Column, 0..50.
    pub x: u8,
    /// Row, 0..50.
    pub y: u8,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(zone: ZoneName, x: u8, y: u8) -> Self {
        Self { zone, x, y }
    }

    /// Centre tile of a zone.
    #[must_use]
    pub fn center(zone: ZoneName) -> Self {
        Self::new(zone, 25, 25)
    }
}

/// Resource yielded by an extraction node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Energy source.
    Energy,
    /// Mineral deposit, only workable with an extractor.
    Mineral,
}

/// A location yielding raw resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionNode {
    /// Unique identifier.
    pub id: EntityId,
    /// Resource type.
    pub kind: NodeKind,
    /// Location.
    pub position: Position,
    /// Resource capacity, 0 when exhausted.
    pub capacity: u32,
    /// Whether a collector sits within two tiles.
    #[serde(default)]
    pub collector: bool,
}

/// Party holding a controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// This colony.
    Colony,
    /// Anybody else.
    Other(String),
}

/// Ownership state of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ownership {
    /// Nobody holds it.
    #[default]
    Unowned,
    /// Held by a reservation that lapses after `ticks_remaining` cycles.
    Reserved {
        /// Reserving party.
        owner: Owner,
        /// Cycles until the reservation ends.
        ticks_remaining: u32,
    },
    /// Claimed.
    Owned(Owner),
}

impl Ownership {
    /// Whether this colony owns the controller.
    #[must_use]
    pub fn is_owned_by_colony(&self) -> bool {
        matches!(self, Self::Owned(Owner::Colony))
    }

    /// Whether another party owns or reserves the controller.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            Self::Owned(Owner::Other(_))
                | Self::Reserved {
                    owner: Owner::Other(_),
                    ..
                }
        )
    }
}

/// A zone controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    /// Unique identifier.
    pub id: EntityId,
    /// Location.
    pub position: Position,
    /// Ownership state.
    #[serde(default)]
    pub ownership: Ownership,
    /// Cycles until the controller can be attacked or upgraded again.
    #[serde(default)]
    pub upgrade_blocked: u32,
}

impl Controller {
    /// Run timers down by one cycle. A lapsed reservation frees the controller.
    fn tick(&mut self) {
        self.upgrade_blocked = self.upgrade_blocked.saturating_sub(1);
        if let Ownership::Reserved {
            ticks_remaining, ..
        } = &mut self.ownership
        {
            *ticks_remaining = ticks_remaining.saturating_sub(1);
            if *ticks_remaining == 0 {
                self.ownership = Ownership::Unowned;
            }
        }
    }

    /// Extend this colony's reservation by one cycle per claim module.
    fn reserve(&mut self, modules: u32) {
        let held = match &self.ownership {
            Ownership::Reserved {
                owner: Owner::Colony,
                ticks_remaining,
            } => *ticks_remaining,
            _ => 0,
        };
        self.ownership = Ownership::Reserved {
            owner: Owner::Colony,
            ticks_remaining: held.saturating_add(modules).min(RESERVATION_MAX),
        };
    }

    /// Wear down another party's hold. A reservation loses one cycle per
    /// claim module; an owned controller has its upgrades blocked.
    fn attack(&mut self, modules: u32) {
        match &mut self.ownership {
            Ownership::Reserved {
                ticks_remaining, ..
            } => {
                *ticks_remaining = ticks_remaining.saturating_sub(modules);
                if *ticks_remaining == 0 {
                    self.ownership = Ownership::Unowned;
                }
            }
            Ownership::Owned(_) if self.upgrade_blocked == 0 && modules > 0 => {
                self.upgrade_blocked = ATTACK_UPGRADE_BLOCK;
            }
            Ownership::Owned(_) | Ownership::Unowned => {}
        }
    }
}

/// Kinds of static structures the scheduler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Production facility.
    Facility,
    /// Energy capacity extension.
    Extension,
    /// Defensive tower.
    Tower,
    /// Energy link.
    Link,
    /// Mineral extractor.
    Extractor,
    /// Bulk storage.
    Storage,
    /// Wall or rampart.
    Wall,
    /// Road.
    Road,
    /// Container next to a node.
    Collector,
}

/// A built structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Unique identifier.
    pub id: EntityId,
    /// Structure type.
    pub kind: StructureKind,
    /// Location.
    pub position: Position,
    /// Whether the structure belongs to another party.
    #[serde(default)]
    pub hostile: bool,
}

/// A pending construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionSite {
    /// Unique identifier.
    pub id: EntityId,
    /// What will be built.
    pub kind: StructureKind,
}

/// A production facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// Unique identifier.
    pub id: EntityId,
    /// Location.
    pub position: Position,
    /// Cycles until the current production finishes, 0 when idle.
    #[serde(default)]
    pub busy_for: u32,
}

impl Facility {
    /// Whether the facility can start a new unit.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.busy_for == 0
    }
}

/// A foreign unit visible in a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hostile {
    /// Unique identifier.
    pub id: EntityId,
    /// Body of the hostile.
    pub body: Body,
}

/// An explored zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone name.
    pub name: ZoneName,
    /// Production facilities owned by this colony.
    #[serde(default)]
    pub facilities: Vec<Facility>,
    /// Number of active extensions.
    #[serde(default)]
    pub extension_count: u32,
    /// Energy currently available for production.
    #[serde(default)]
    pub energy_available: u32,
    /// Extraction nodes.
    #[serde(default)]
    pub nodes: Vec<ExtractionNode>,
    /// Controller, if the zone has one.
    #[serde(default)]
    pub controller: Option<Controller>,
    /// Built structures other than facilities and extensions.
    #[serde(default)]
    pub structures: Vec<Structure>,
    /// Pending construction.
    #[serde(default)]
    pub construction_sites: Vec<ConstructionSite>,
    /// Total resources held in bulk storage.
    #[serde(default)]
    pub stored_total: u64,
    /// Visible foreign units.
    #[serde(default)]
    pub hostiles: Vec<Hostile>,
    /// Set when resources were delivered to a facility this cycle.
    #[serde(default)]
    pub resource_delivered: bool,
}

impl Zone {
    /// Create an empty zone.
    #[must_use]
    pub fn new(name: ZoneName) -> Self {
        Self {
            name,
            facilities: Vec::new(),
            extension_count: 0,
            energy_available: 0,
            nodes: Vec::new(),
            controller: None,
            structures: Vec::new(),
            construction_sites: Vec::new(),
            stored_total: 0,
            hostiles: Vec::new(),
            resource_delivered: false,
        }
    }

    /// Energy the facility group can hold: `300 + 50 * extensions`.
    #[must_use]
    pub const fn energy_capacity(&self) -> u32 {
        self.extension_count.saturating_mul(50).saturating_add(300)
    }

    /// Whether the zone has a structure of `kind` owned by this colony.
    #[must_use]
    pub fn has_structure(&self, kind: StructureKind) -> bool {
        self.structures.iter().any(|s| s.kind == kind && !s.hostile)
    }

    /// Whether this colony owns the controller.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|c| c.ownership.is_owned_by_colony())
    }

    /// Nodes currently worth working: energy nodes with capacity, and
    /// mineral nodes with capacity once an extractor stands.
    pub fn active_nodes(&self) -> impl Iterator<Item = &ExtractionNode> {
        let extractor = self.has_structure(StructureKind::Extractor);
        self.nodes.iter().filter(move |n| {
            n.capacity > 0 && (n.kind == NodeKind::Energy || extractor)
        })
    }

    /// Whether any construction is pending.
    #[must_use]
    pub fn has_construction(&self) -> bool {
        !self.construction_sites.is_empty()
    }

    /// Whether construction other than roads is pending.
    #[must_use]
    pub fn has_non_road_construction(&self) -> bool {
        self.construction_sites
            .iter()
            .any(|s| s.kind != StructureKind::Road)
    }

    /// Whether a combat-capable hostile is present.
    #[must_use]
    pub fn is_at_war(&self) -> bool {
        self.hostiles.iter().any(|h| h.body.is_combat_capable())
    }
}

/// A production command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// Zone whose facilities produce the unit.
    pub group: ZoneName,
    /// Role of the new unit.
    pub role: Role,
    /// Body to assemble.
    pub body: Body,
    /// Zone the unit will work in.
    pub zone: ZoneName,
    /// Initial assignment.
    pub assignment: Assignment,
    /// What the unit should do to the target controller.
    pub claim_intent: Option<ClaimIntent>,
}

/// Why a production command was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProduceError {
    /// Every facility in the group is producing, or the group has none.
    #[error("All facilities are busy")]
    Busy,
    /// The group cannot pay for the body right now.
    #[error("Insufficient budget: need {required}, have {available}")]
    InsufficientBudget {
        /// Body cost.
        required: u32,
        /// Energy on hand.
        available: u32,
    },
}

/// The world snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    zones: BTreeMap<ZoneName, Zone>,
    units: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
    /// Zones this colony may still claim before hitting its global limit.
    #[serde(default)]
    pub claim_capacity: u32,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a zone.
    pub fn insert_zone(&mut self, zone: Zone) {
        self.zones.insert(zone.name.clone(), zone);
    }

    /// Look up an explored zone.
    #[must_use]
    pub fn zone(&self, name: &ZoneName) -> Option<&Zone> {
        self.zones.get(name)
    }

    /// Look up an explored zone mutably.
    pub fn zone_mut(&mut self, name: &ZoneName) -> Option<&mut Zone> {
        self.zones.get_mut(name)
    }

    /// All explored zones in name order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// All explored zones in name order, mutably.
    pub fn zones_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.values_mut()
    }

    /// All units in id order, retired ones included.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// All units in id order, mutably.
    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Living units working in `zone` that satisfy `filter`.
    pub fn query_units<'a>(
        &'a self,
        zone: &'a ZoneName,
        filter: impl Fn(&Unit) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units
            .values()
            .filter(move |u| u.is_alive() && &u.zone == zone && filter(u))
    }

    /// Structures in `zone` whose kind satisfies `predicate`.
    pub fn query_structures<'a>(
        &'a self,
        zone: &ZoneName,
        predicate: impl Fn(StructureKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Structure> + 'a {
        self.zones
            .get(zone)
            .into_iter()
            .flat_map(|z| z.structures.iter())
            .filter(move |s| predicate(s.kind))
    }

    /// Record that resources were just delivered to a facility in `zone`.
    pub fn note_delivery(&mut self, zone: &ZoneName) {
        if let Some(z) = self.zones.get_mut(zone) {
            z.resource_delivered = true;
        }
    }

    /// Insert a unit directly, bypassing production. Returns its id.
    pub fn add_unit(&mut self, unit: Unit) -> UnitId {
        self.next_unit_id = self.next_unit_id.max(unit.id) + 1;
        let id = unit.id;
        self.units.insert(id, unit);
        id
    }

    /// Allocate the next unit id.
    pub fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    /// Drop retired units from the snapshot.
    pub fn prune_retired(&mut self) {
        self.units.retain(|_, u| u.is_alive());
    }

    /// Advance the bookkeeping the scheduler reads by one cycle: facilities
    /// count down their production, energy refills to capacity, controller
    /// timers run down, claim units act on their controller, units age,
    /// and decommissioned units are recycled.
    ///
    /// Stands in for the movement and behavior subsystem in sandboxes.
    pub fn advance_cycle(&mut self) {
        for zone in self.zones.values_mut() {
            for facility in &mut zone.facilities {
                facility.busy_for = facility.busy_for.saturating_sub(1);
            }
            zone.energy_available = zone.energy_capacity();
            if let Some(controller) = &mut zone.controller {
                controller.tick();
            }
        }
        self.resolve_claims();
        for unit in self.units.values_mut() {
            unit.ticks_to_live = unit.ticks_to_live.saturating_sub(1);
            if unit.lifecycle == Lifecycle::Decommissioned || unit.ticks_to_live == 0 {
                if let Err(error) = unit.retire() {
                    tracing::warn!(%error, "Retirement refused");
                }
            }
        }
        self.prune_retired();
    }

    /// Let every active claim unit act on the controller of the zone it
    /// works in. Units arrive the cycle they are produced.
    fn resolve_claims(&mut self) {
        for unit in self.units.values_mut() {
            let Some(intent) = unit.claim_intent else {
                continue;
            };
            if unit.lifecycle != Lifecycle::Active {
                continue;
            }
            let Some(controller) = self
                .zones
                .get_mut(&unit.zone)
                .and_then(|z| z.controller.as_mut())
            else {
                continue;
            };
            let modules = unit.body.active(ModuleKind::Claim);
            match intent.resolve_on_arrival(&controller.ownership, self.claim_capacity) {
                Some(ClaimIntent::Claim) => {
                    controller.ownership = Ownership::Owned(Owner::Colony);
                    self.claim_capacity -= 1;
                    unit.claim_intent = None;
                    tracing::info!(zone = %unit.zone, unit = unit.id, "Controller claimed");
                }
                Some(ClaimIntent::Reserve) => controller.reserve(modules),
                Some(ClaimIntent::Attack) => controller.attack(modules),
                None => unit.claim_intent = None,
            }
        }
    }

    /// Issue a production command to the facilities of `order.group`.
    ///
    /// Tries facilities in id order and uses the first idle one.
    pub fn produce(&mut self, order: ProductionOrder) -> Result<UnitId, ProduceError> {
        let id = self.next_unit_id;
        let zone = self
            .zones
            .get_mut(&order.group)
            .ok_or(ProduceError::Busy)?;

        let cost = order.body.cost();
        let facility = zone
            .facilities
            .iter_mut()
            .find(|f| f.is_idle())
            .ok_or(ProduceError::Busy)?;
        if cost > zone.energy_available {
            return Err(ProduceError::InsufficientBudget {
                required: cost,
                available: zone.energy_available,
            });
        }

        facility.busy_for = SPAWN_TIME_PER_MODULE * order.body.len() as u32;
        zone.energy_available -= cost;

        let ticks_to_live = if order.body.count(ModuleKind::Claim) > 0 {
            CLAIM_UNIT_LIFETIME
        } else {
            UNIT_LIFETIME
        };
        let unit = Unit {
            id,
            role: order.role,
            home: order.group,
            zone: order.zone,
            body: order.body,
            assignment: order.assignment,
            claim_intent: order.claim_intent,
            lifecycle: Lifecycle::Active,
            waiting: false,
            ticks_to_live,
        };
        self.next_unit_id += 1;
        self.units.insert(id, unit);
        Ok(id)
    }
}
