//! Demand model.
//!
//! Computes the ideal total of sizing modules per role from what a zone
//! looks like right now. All adjustments are additive on a per-role base
//! and the result is clamped at zero.

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::math::ceil_mul;
use crate::units::{BuilderTask, Role};
use crate::world::{NodeKind, StructureKind, Zone};

/// Flags of a zone that drive demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneConditions {
    /// This colony owns the controller.
    pub claimed: bool,
    /// Active energy nodes.
    pub energy_nodes: u32,
    /// Active mineral nodes.
    pub mineral_nodes: u32,
    /// A tower stands.
    pub has_tower: bool,
    /// A link stands.
    pub has_link: bool,
    /// An extractor stands.
    pub has_extractor: bool,
    /// Bulk storage stands.
    pub has_storage: bool,
    /// Any construction site is pending.
    pub construction_pending: bool,
    /// A construction site other than a road is pending.
    pub non_road_pending: bool,
    /// Combat-capable hostiles are present.
    pub wartime: bool,
    /// Surplus-consumption mode is on.
    pub consumption_mode: bool,
}

impl ZoneConditions {
    /// Read the flags off a zone snapshot.
    ///
    /// `consumption_mode` comes from persisted state, not the snapshot.
    #[must_use]
    pub fn observe(zone: &Zone, consumption_mode: bool) -> Self {
        let (energy_nodes, mineral_nodes) =
            zone.active_nodes()
                .fold((0, 0), |(energy, mineral), node| match node.kind {
                    NodeKind::Energy => (energy + 1, mineral),
                    NodeKind::Mineral => (energy, mineral + 1),
                });
        Self {
            claimed: zone.is_claimed(),
            energy_nodes,
            mineral_nodes,
            has_tower: zone.has_structure(StructureKind::Tower),
            has_link: zone.has_structure(StructureKind::Link),
            has_extractor: zone.has_structure(StructureKind::Extractor),
            has_storage: zone.has_structure(StructureKind::Storage),
            construction_pending: zone.has_construction(),
            non_road_pending: zone.has_non_road_construction(),
            wartime: zone.is_at_war(),
            consumption_mode,
        }
    }

    /// All active nodes.
    #[must_use]
    pub const fn active_nodes(&self) -> u32 {
        self.energy_nodes + self.mineral_nodes
    }
}

/// Apply the consumption-mode hysteresis.
///
/// Only claimed zones with bulk storage can be in consumption mode. It
/// turns on strictly above the enable threshold and off strictly below the
/// disable threshold; anything in between keeps the previous value.
#[must_use]
pub fn consumption_mode(
    previous: bool,
    stored_total: u64,
    eligible: bool,
    config: &SchedulerConfig,
) -> bool {
    if !eligible {
        return false;
    }
    if stored_total > config.consumption_enable_above {
        true
    } else if stored_total < config.consumption_disable_below {
        false
    } else {
        previous
    }
}

/// Ideal labor modules on one extraction node.
#[must_use]
pub const fn node_ideal(kind: NodeKind, config: &SchedulerConfig) -> u32 {
    match kind {
        NodeKind::Energy => config.energy_node_labor,
        NodeKind::Mineral => config.mineral_node_labor,
    }
}

/// Ideal module totals per role for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Demand {
    /// Labor modules across all harvesters.
    pub harvester: u32,
    /// Carry modules across all transporters.
    pub transporter: u32,
    /// Extra carry modules allowed on a single transporter.
    pub transporter_size_bonus: u32,
    /// Labor modules across all upgraders.
    pub upgrader: u32,
    /// Labor modules across all wall-builders.
    pub wall_builder: u32,
}

impl Demand {
    /// Compute demand from zone conditions.
    #[must_use]
    pub fn compute(c: &ZoneConditions, config: &SchedulerConfig) -> Self {
        let nodes = c.active_nodes();
        let harvester = c.energy_nodes * config.energy_node_labor
            + c.mineral_nodes * config.mineral_node_labor;

        if !c.claimed {
            let mut transporter = nodes * config.transporter_per_node_unclaimed;
            if c.wartime {
                transporter += 6;
            }
            return Self {
                harvester,
                transporter,
                ..Self::default()
            };
        }

        let builder_base = ceil_mul(nodes, config.builder_per_node);
        let mut transporter = i64::from(nodes * config.transporter_per_node_claimed);
        let mut upgrader = i64::from(builder_base.max(config.upgrader_floor));
        let mut wall_builder = i64::from(builder_base.max(config.wall_builder_floor));
        let mut transporter_size_bonus = 0;

        if c.wartime {
            transporter += 6;
        }
        if !c.has_tower {
            transporter_size_bonus += 1;
            transporter -= 2;
            upgrader += 2;
            wall_builder += 2;
        }
        if !c.has_extractor {
            transporter -= 1;
            upgrader += 2;
        }
        if !c.has_link {
            transporter += 4;
        }
        if c.non_road_pending {
            upgrader += 1;
            wall_builder += 1;
        }
        if !c.construction_pending {
            upgrader = 1;
            wall_builder = 0;
        }
        if c.consumption_mode {
            transporter += 5;
            upgrader += 14;
        }

        Self {
            harvester,
            transporter: clamp(transporter),
            transporter_size_bonus,
            upgrader: clamp(upgrader),
            wall_builder: clamp(wall_builder),
        }
    }

    /// Ideal total for a role. Roles outside the economy have no module demand.
    #[must_use]
    pub const fn ideal(&self, role: Role) -> u32 {
        match role {
            Role::Harvester => self.harvester,
            Role::Transporter => self.transporter,
            Role::Builder(BuilderTask::Upgrader) => self.upgrader,
            Role::Builder(BuilderTask::WallBuilder) => self.wall_builder,
            Role::Builder(BuilderTask::Colonist { .. })
            | Role::Claimer
            | Role::Mercenary(_)
            | Role::Ravager
            | Role::Siege(_) => 0,
        }
    }
}

fn clamp(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}
