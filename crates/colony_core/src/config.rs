//! Colony configuration.
//!
//! Directives and tuned scheduler constants, loaded from RON. The
//! fractional constants are stored as raw fixed-point bits.
//!
//! # Example RON
//!
//! ```ron
//! ColonyConfig(
//!     directives: [
//!         Directive(zone: "W1N1", claim: true),
//!         Directive(zone: "W2N1", claim: false),
//!     ],
//!     siege: None,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{fixed_decimal, ratio, Fixed};
use crate::world::ZoneName;

/// Error type for config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed but inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A zone the colony manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Zone to manage.
    pub zone: ZoneName,
    /// Claim the controller (`true`) or only reserve it (`false`).
    #[serde(default)]
    pub claim: bool,
}

impl Directive {
    /// Create a directive.
    #[must_use]
    pub fn new(zone: impl Into<String>, claim: bool) -> Self {
        Self {
            zone: ZoneName::new(zone),
            claim,
        }
    }
}

/// Tuned scheduler constants.
///
/// These are empirically tuned heuristics; every one is overridable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Cycles between full re-evaluations of a peaceful zone.
    pub recompute_interval: u64,
    /// Stored total above which consumption mode switches on.
    pub consumption_enable_above: u64,
    /// Stored total below which consumption mode switches off.
    pub consumption_disable_below: u64,
    /// Cycles a cached proxy-facility lookup stays fresh.
    pub proxy_cache_ttl: u64,
    /// Reservation time left above which no replacement claimer is produced.
    pub reservation_refresh_below: u32,
    /// Units with at most this many cycles to live trigger a refresh.
    pub near_expiry: u32,
    /// Weight of a melee module against a ranged module.
    #[serde(with = "fixed_decimal")]
    pub melee_weight: Fixed,
    /// Own combat power sought relative to the hostile force.
    #[serde(with = "fixed_decimal")]
    pub mercenary_margin: Fixed,
    /// Largest transporter in a claimed zone, in carry modules.
    pub transporter_cap_claimed: u32,
    /// Largest transporter serving an unclaimed zone, in carry modules.
    pub transporter_cap_unclaimed: u32,
    /// Labor count at which labor-centric roles get a second carry module.
    pub second_carry_at: u32,
    /// Ideal labor modules per energy node.
    pub energy_node_labor: u32,
    /// Ideal labor modules per mineral node.
    pub mineral_node_labor: u32,
    /// Transporter carry modules per active node in claimed zones.
    pub transporter_per_node_claimed: u32,
    /// Transporter carry modules per active node in unclaimed zones.
    pub transporter_per_node_unclaimed: u32,
    /// Builder labor modules per active node.
    #[serde(with = "fixed_decimal")]
    pub builder_per_node: Fixed,
    /// Floor of the upgrader demand.
    pub upgrader_floor: u32,
    /// Floor of the wall-builder demand.
    pub wall_builder_floor: u32,
    /// Colonists kept on an explored target zone.
    pub colonist_target: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recompute_interval: 12,
            consumption_enable_above: 950_000,
            consumption_disable_below: 900_000,
            proxy_cache_ttl: 100,
            reservation_refresh_below: 3500,
            near_expiry: 150,
            melee_weight: ratio(3, 2),
            mercenary_margin: Fixed::ONE,
            transporter_cap_claimed: 5,
            transporter_cap_unclaimed: 16,
            second_carry_at: 10,
            energy_node_labor: 7,
            mineral_node_labor: 20,
            transporter_per_node_claimed: 7,
            transporter_per_node_unclaimed: 14,
            builder_per_node: ratio(7, 2),
            upgrader_floor: 3,
            wall_builder_floor: 2,
            colonist_target: 2,
        }
    }
}

/// Unit-count targets of the siege force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeTargets {
    /// Assault units.
    pub assault: u32,
    /// Medics.
    pub medic: u32,
    /// Skirmishers.
    pub skirmisher: u32,
}

impl Default for SiegeTargets {
    fn default() -> Self {
        Self {
            assault: 1,
            medic: 0,
            skirmisher: 0,
        }
    }
}

/// Siege scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiegeConfig {
    /// Zone under siege.
    pub target: ZoneName,
    /// Zone whose facilities produce the siege force.
    pub home: ZoneName,
    /// Unit-count targets.
    #[serde(default)]
    pub targets: SiegeTargets,
    /// Upgrade-block countdown below which a downgrader is sent.
    #[serde(default = "default_downgrade_below")]
    pub downgrade_below: u32,
}

const fn default_downgrade_below() -> u32 {
    250
}

/// Complete colony configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyConfig {
    /// Managed zones.
    pub directives: Vec<Directive>,
    /// Scheduler constants.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Optional siege.
    #[serde(default)]
    pub siege: Option<SiegeConfig>,
}

impl ColonyConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scheduler;
        if s.consumption_disable_below > s.consumption_enable_above {
            return Err(ConfigError::Invalid(format!(
                "consumption_disable_below ({}) exceeds consumption_enable_above ({})",
                s.consumption_disable_below, s.consumption_enable_above
            )));
        }
        if s.recompute_interval == 0 {
            return Err(ConfigError::Invalid("recompute_interval must be positive".into()));
        }
        for (name, value) in [
            ("melee_weight", s.melee_weight),
            ("mercenary_margin", s.mercenary_margin),
        ] {
            if value <= Fixed::ZERO {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if s.builder_per_node < Fixed::ZERO {
            return Err(ConfigError::Invalid(format!(
                "builder_per_node must not be negative, got {}",
                s.builder_per_node
            )));
        }
        let mut seen = std::collections::BTreeSet::new();
        for directive in &self.directives {
            if !seen.insert(&directive.zone) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate directive for {}",
                    directive.zone
                )));
            }
        }
        Ok(())
    }
}
