//! Test fixtures and helpers.
//!
//! Builders for zones, units and whole worlds so tests can describe a
//! scenario in a few lines.

use colony_core::body::Body;
use colony_core::catalog::ModuleKind;
use colony_core::config::{ColonyConfig, Directive};
use colony_core::units::{Assignment, Lifecycle, Role, Unit, UnitId};
use colony_core::world::{
    ConstructionSite, Controller, EntityId, ExtractionNode, Facility, Hostile, NodeKind, Owner,
    Ownership, Position, Structure, StructureKind, World, Zone, ZoneName, UNIT_LIFETIME,
};

/// The zone most fixtures use as the colony's home.
#[must_use]
pub fn home() -> ZoneName {
    ZoneName::new("W1N1")
}

/// Fluent builder for a [`Zone`].
///
/// Entity ids are handed out from a counter seeded by the zone's grid
/// coordinates, so zones built independently never collide.
#[derive(Debug, Clone)]
pub struct ZoneBuilder {
    zone: Zone,
    next_id: EntityId,
    energy: Option<u32>,
}

impl ZoneBuilder {
    /// Start an empty zone.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let zone = ZoneName::new(name);
        let base = zone.coords().map_or(1, |(x, y)| {
            1 + (u64::from(x.unsigned_abs()) * 1000 + u64::from(y.unsigned_abs())) * 1000
        });
        Self {
            zone: Zone::new(zone),
            next_id: base,
            energy: None,
        }
    }

    /// A claimed zone with one idle facility and `extensions` extensions.
    #[must_use]
    pub fn claimed(name: &str, extensions: u32) -> Self {
        Self::new(name)
            .facility()
            .extensions(extensions)
            .controller(Ownership::Owned(Owner::Colony))
    }

    fn id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn at(&self, x: u8, y: u8) -> Position {
        Position::new(self.zone.name.clone(), x, y)
    }

    /// Add an idle production facility.
    #[must_use]
    pub fn facility(mut self) -> Self {
        let id = self.id();
        let offset = self.zone.facilities.len() as u8;
        let position = self.at(25 + offset, 25);
        self.zone.facilities.push(Facility {
            id,
            position,
            busy_for: 0,
        });
        self
    }

    /// Set the extension count.
    #[must_use]
    pub fn extensions(mut self, count: u32) -> Self {
        self.zone.extension_count = count;
        self
    }

    /// Set the energy available right now. Defaults to full capacity.
    #[must_use]
    pub fn energy(mut self, energy: u32) -> Self {
        self.energy = Some(energy);
        self
    }

    /// Add a controller with the given ownership.
    #[must_use]
    pub fn controller(mut self, ownership: Ownership) -> Self {
        let id = self.id();
        let position = self.at(40, 40);
        self.zone.controller = Some(Controller {
            id,
            position,
            ownership,
            upgrade_blocked: 0,
        });
        self
    }

    /// Reserve the controller for `owner` with `ticks` remaining.
    #[must_use]
    pub fn reserved(self, owner: Owner, ticks: u32) -> Self {
        self.controller(Ownership::Reserved {
            owner,
            ticks_remaining: ticks,
        })
    }

    /// Add a full energy node at `(x, y)`.
    #[must_use]
    pub fn energy_node(self, x: u8, y: u8) -> Self {
        self.node(NodeKind::Energy, x, y, 3000)
    }

    /// Add a full mineral node at `(x, y)`.
    #[must_use]
    pub fn mineral_node(self, x: u8, y: u8) -> Self {
        self.node(NodeKind::Mineral, x, y, 50_000)
    }

    /// Add a node of any kind and capacity.
    #[must_use]
    pub fn node(mut self, kind: NodeKind, x: u8, y: u8, capacity: u32) -> Self {
        let id = self.id();
        let position = self.at(x, y);
        self.zone.nodes.push(ExtractionNode {
            id,
            kind,
            position,
            capacity,
            collector: false,
        });
        self
    }

    /// Add one of the colony's structures.
    #[must_use]
    pub fn structure(self, kind: StructureKind) -> Self {
        self.structure_owned_by(kind, false)
    }

    /// Add a structure belonging to another party.
    #[must_use]
    pub fn hostile_structure(self, kind: StructureKind) -> Self {
        self.structure_owned_by(kind, true)
    }

    fn structure_owned_by(mut self, kind: StructureKind, hostile: bool) -> Self {
        let id = self.id();
        let position = self.at(5, 5);
        self.zone.structures.push(Structure {
            id,
            kind,
            position,
            hostile,
        });
        self
    }

    /// Add bulk storage holding `total` resources.
    #[must_use]
    pub fn storage(mut self, total: u64) -> Self {
        self.zone.stored_total = total;
        self.structure(StructureKind::Storage)
    }

    /// Add a pending construction site.
    #[must_use]
    pub fn construction(mut self, kind: StructureKind) -> Self {
        let id = self.id();
        self.zone.construction_sites.push(ConstructionSite { id, kind });
        self
    }

    /// Add a visible hostile with the given body.
    #[must_use]
    pub fn hostile(mut self, counts: &[(ModuleKind, u32)]) -> Self {
        let id = self.id();
        self.zone.hostiles.push(Hostile {
            id,
            body: Body::from_counts(counts),
        });
        self
    }

    /// Finish the zone.
    #[must_use]
    pub fn build(mut self) -> Zone {
        let capacity = self.zone.energy_capacity();
        self.zone.energy_available = self.energy.unwrap_or(capacity);
        self.zone
    }
}

/// Build a world from zones.
#[must_use]
pub fn world_of(zones: impl IntoIterator<Item = Zone>) -> World {
    let mut world = World::new();
    for zone in zones {
        world.insert_zone(zone);
    }
    world.claim_capacity = 1;
    world
}

/// Insert an active unit with the given body working in `zone`.
pub fn spawn_unit(
    world: &mut World,
    role: Role,
    zone: &ZoneName,
    counts: &[(ModuleKind, u32)],
) -> UnitId {
    spawn_unit_from(world, role, &home(), zone, counts)
}

/// Insert an active unit produced by `group`, working in `zone`.
pub fn spawn_unit_from(
    world: &mut World,
    role: Role,
    group: &ZoneName,
    zone: &ZoneName,
    counts: &[(ModuleKind, u32)],
) -> UnitId {
    let id = world.allocate_unit_id();
    world.add_unit(Unit {
        id,
        role,
        home: group.clone(),
        zone: zone.clone(),
        body: Body::from_counts(counts),
        assignment: Assignment::Unassigned,
        claim_intent: None,
        lifecycle: Lifecycle::Active,
        waiting: false,
        ticks_to_live: UNIT_LIFETIME,
    })
}

/// A bootstrapping colony: one claimed home zone at 800 energy capacity
/// with a single energy node and a pending road.
#[must_use]
pub fn bootstrap_world() -> World {
    world_of([ZoneBuilder::claimed("W1N1", 10)
        .energy_node(10, 10)
        .construction(StructureKind::Road)
        .build()])
}

/// Config managing only the home zone.
#[must_use]
pub fn home_config() -> ColonyConfig {
    ColonyConfig {
        directives: vec![Directive::new("W1N1", true)],
        ..ColonyConfig::default()
    }
}

/// A colony with a developed home zone, one remote harvesting zone and
/// one unexplored claim target.
#[must_use]
pub fn expanding_world() -> World {
    world_of([
        ZoneBuilder::claimed("W1N1", 30)
            .facility()
            .energy_node(10, 10)
            .energy_node(40, 12)
            .structure(StructureKind::Tower)
            .construction(StructureKind::Extension)
            .build(),
        ZoneBuilder::new("W2N1")
            .controller(Ownership::Unowned)
            .energy_node(20, 30)
            .build(),
    ])
}

/// Config for [`expanding_world`].
#[must_use]
pub fn expanding_config() -> ColonyConfig {
    ColonyConfig {
        directives: vec![
            Directive::new("W1N1", true),
            Directive::new("W2N1", false),
            Directive::new("W1N2", true),
        ],
        ..ColonyConfig::default()
    }
}
