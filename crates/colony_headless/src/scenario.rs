//! Scenario loading and configuration.
//!
//! A scenario is a starting world snapshot plus the colony configuration
//! that schedules it, stored as RON.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     name: "bootstrap",
//!     cycles: 300,
//!     colony: ColonyConfig(
//!         directives: [Directive(zone: "W1N1", claim: true)],
//!     ),
//!     zones: [
//!         Zone(
//!             name: "W1N1",
//!             facilities: [Facility(id: 1, position: Position(zone: "W1N1", x: 25, y: 25))],
//!             extension_count: 10,
//!             energy_available: 800,
//!         ),
//!     ],
//! )
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use colony_core::config::{ColonyConfig, ConfigError, Directive, SiegeConfig, SiegeTargets};
use colony_core::units::Unit;
use colony_core::world::{
    ConstructionSite, Controller, ExtractionNode, Facility, NodeKind, Owner, Ownership, Position,
    Structure, StructureKind, World, Zone, ZoneName,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The embedded colony config is inconsistent.
    #[error("Invalid colony config: {0}")]
    Config(#[from] ConfigError),
    /// The world snapshot is inconsistent.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

const fn default_cycles() -> u64 {
    300
}

const fn default_claim_capacity() -> u32 {
    1
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Cycles to run when the caller does not say otherwise.
    #[serde(default = "default_cycles")]
    pub cycles: u64,
    /// Colony configuration.
    pub colony: ColonyConfig,
    /// Explored zones at cycle 0.
    pub zones: Vec<Zone>,
    /// Units alive at cycle 0.
    #[serde(default)]
    pub units: Vec<Unit>,
    /// Zones the colony may still claim.
    #[serde(default = "default_claim_capacity")]
    pub claim_capacity: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the scenario for internal consistency.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.colony.validate()?;

        let mut names = BTreeSet::new();
        for zone in &self.zones {
            if !names.insert(&zone.name) {
                return Err(ScenarioError::Invalid(format!("duplicate zone {}", zone.name)));
            }
        }
        let mut ids = BTreeSet::new();
        for unit in &self.units {
            if !ids.insert(unit.id) {
                return Err(ScenarioError::Invalid(format!("duplicate unit id {}", unit.id)));
            }
            if !names.contains(&unit.home) {
                return Err(ScenarioError::Invalid(format!(
                    "unit {} homed in unknown zone {}",
                    unit.id, unit.home
                )));
            }
        }
        Ok(())
    }

    /// Build the world snapshot at cycle 0.
    #[must_use]
    pub fn world(&self) -> World {
        let mut world = World::new();
        for zone in &self.zones {
            world.insert_zone(zone.clone());
        }
        for unit in &self.units {
            world.add_unit(unit.clone());
        }
        world.claim_capacity = self.claim_capacity;
        world
    }

    /// A fresh colony: one claimed zone at 800 energy capacity with a
    /// single energy node and a road under construction.
    #[must_use]
    pub fn bootstrap() -> Self {
        let home = ZoneName::new("W1N1");
        let mut zone = owned_zone(&home, 10, 100);
        zone.nodes.push(energy_node(&home, 110, 10, 12));
        zone.construction_sites.push(ConstructionSite {
            id: 120,
            kind: StructureKind::Road,
        });
        Self {
            name: "bootstrap".to_string(),
            description: "One claimed zone growing its first economy".to_string(),
            cycles: default_cycles(),
            colony: ColonyConfig {
                directives: vec![Directive::new("W1N1", true)],
                ..ColonyConfig::default()
            },
            zones: vec![zone],
            units: Vec::new(),
            claim_capacity: 1,
        }
    }

    /// A developed colony with a remote harvesting zone, an unexplored
    /// claim target and a siege against a rival's zone.
    #[must_use]
    pub fn frontier() -> Self {
        let home = ZoneName::new("W1N1");
        let mut base = owned_zone(&home, 40, 100);
        base.facilities.push(Facility {
            id: 102,
            position: Position::new(home.clone(), 27, 25),
            busy_for: 0,
        });
        base.nodes.push(energy_node(&home, 110, 10, 12));
        base.nodes.push(energy_node(&home, 111, 40, 8));
        base.structures.push(Structure {
            id: 130,
            kind: StructureKind::Tower,
            position: Position::new(home.clone(), 24, 28),
            hostile: false,
        });

        let remote = ZoneName::new("W2N1");
        let mut outpost = Zone::new(remote.clone());
        outpost.controller = Some(Controller {
            id: 201,
            position: Position::new(remote.clone(), 30, 20),
            ownership: Ownership::Unowned,
            upgrade_blocked: 0,
        });
        outpost.nodes.push(energy_node(&remote, 210, 15, 35));

        let rival = ZoneName::new("W3N1");
        let mut target = Zone::new(rival.clone());
        target.controller = Some(Controller {
            id: 301,
            position: Position::new(rival.clone(), 25, 25),
            ownership: Ownership::Owned(Owner::Other("rival".to_string())),
            upgrade_blocked: 0,
        });

        Self {
            name: "frontier".to_string(),
            description: "Remote harvesting, colonisation and a siege from one home".to_string(),
            cycles: 600,
            colony: ColonyConfig {
                directives: vec![
                    Directive::new("W1N1", true),
                    Directive::new("W2N1", false),
                    Directive::new("W1N2", true),
                ],
                siege: Some(SiegeConfig {
                    target: rival,
                    home: home.clone(),
                    targets: SiegeTargets {
                        assault: 2,
                        medic: 1,
                        skirmisher: 0,
                    },
                    downgrade_below: 250,
                }),
                ..ColonyConfig::default()
            },
            zones: vec![base, outpost, target],
            units: Vec::new(),
            claim_capacity: 1,
        }
    }

    /// Look up a built-in scenario by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "bootstrap" => Some(Self::bootstrap()),
            "frontier" => Some(Self::frontier()),
            _ => None,
        }
    }

    /// Resolve a scenario argument: a built-in name or a RON file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        match Self::builtin(name_or_path) {
            Some(scenario) => Ok(scenario),
            None => Self::load(name_or_path),
        }
    }
}

fn owned_zone(name: &ZoneName, extensions: u32, first_id: u64) -> Zone {
    let mut zone = Zone::new(name.clone());
    zone.extension_count = extensions;
    zone.energy_available = zone.energy_capacity();
    zone.facilities.push(Facility {
        id: first_id + 1,
        position: Position::new(name.clone(), 25, 25),
        busy_for: 0,
    });
    zone.controller = Some(Controller {
        id: first_id,
        position: Position::new(name.clone(), 20, 30),
        ownership: Ownership::Owned(Owner::Colony),
        upgrade_blocked: 0,
    });
    zone
}

fn energy_node(zone: &ZoneName, id: u64, x: u8, y: u8) -> ExtractionNode {
    ExtractionNode {
        id,
        kind: NodeKind::Energy,
        position: Position::new(zone.clone(), x, y),
        capacity: 3000,
        collector: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenarios_validate() {
        assert!(Scenario::bootstrap().validate().is_ok());
        assert!(Scenario::frontier().validate().is_ok());
    }

    #[test]
    fn test_resolve_builtin_by_name() {
        let scenario = Scenario::resolve("frontier").unwrap();
        assert_eq!(scenario.zones.len(), 3);
        assert!(scenario.colony.siege.is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = Scenario::load("/nonexistent/scenario.ron");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
    }

    #[test]
    fn test_ron_round_trip() {
        let scenario = Scenario::frontier();
        let ron = ron::ser::to_string_pretty(&scenario, ron::ser::PrettyConfig::default()).unwrap();
        let parsed = Scenario::from_ron_str(&ron).unwrap();
        assert_eq!(parsed, scenario);
    }

    #[test]
    fn test_minimal_ron() {
        let ron = r#"
            Scenario(
                name: "minimal",
                colony: ColonyConfig(
                    directives: [Directive(zone: "W1N1", claim: true)],
                ),
                zones: [
                    Zone(
                        name: "W1N1",
                        facilities: [Facility(id: 1, position: Position(zone: "W1N1", x: 25, y: 25))],
                        extension_count: 10,
                        energy_available: 800,
                    ),
                ],
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.cycles, 300);
        assert_eq!(scenario.claim_capacity, 1);
        let world = scenario.world();
        assert_eq!(world.zone(&ZoneName::new("W1N1")).unwrap().energy_capacity(), 800);
    }

    #[test]
    fn test_shipped_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/stockpile.ron");
        let scenario = Scenario::load(path).unwrap();
        assert_eq!(scenario.name, "stockpile");
        assert_eq!(scenario.colony.directives.len(), 2);
        let world = scenario.world();
        let remote = world.zone(&ZoneName::new("W1N2")).unwrap();
        assert!(remote.controller.as_ref().unwrap().ownership.is_hostile());
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let mut scenario = Scenario::bootstrap();
        scenario.zones.push(scenario.zones[0].clone());
        assert!(matches!(scenario.validate(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_invalid_colony_config_rejected() {
        let mut scenario = Scenario::bootstrap();
        scenario.colony.scheduler.recompute_interval = 0;
        assert!(matches!(scenario.validate(), Err(ScenarioError::Config(_))));
    }
}
