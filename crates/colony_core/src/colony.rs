//! Colony runner.
//!
//! Owns the configuration and persisted scheduling state and drives every
//! scheduler once per cycle: each directive zone in configuration order,
//! then the siege.

use serde::{Deserialize, Serialize};

use crate::config::ColonyConfig;
use crate::expansion::plan_expansion;
use crate::memory::ColonyMemory;
use crate::pathing::{GridPathOracle, PathOracle};
use crate::scheduler::{schedule_zone, CycleContext, ZoneOutcome};
use crate::siege::schedule_siege;
use crate::world::{World, ZoneName};

/// What happened in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Cycle number.
    pub cycle: u64,
    /// Outcome per scheduled zone, in evaluation order. The siege target
    /// comes last when a siege is configured.
    pub outcomes: Vec<(ZoneName, ZoneOutcome)>,
}

impl CycleReport {
    /// Outcome for `zone`, if it was scheduled.
    #[must_use]
    pub fn outcome(&self, zone: &ZoneName) -> Option<&ZoneOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == zone)
            .map(|(_, outcome)| outcome)
    }

    /// Number of units produced this cycle.
    #[must_use]
    pub fn produced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.produced().is_some())
            .count()
    }
}

/// The production scheduler of one colony.
#[derive(Debug, Clone)]
pub struct Colony<P = GridPathOracle> {
    config: ColonyConfig,
    memory: ColonyMemory,
    oracle: P,
}

impl Colony<GridPathOracle> {
    /// Create a colony with fresh state and the grid path oracle.
    #[must_use]
    pub fn new(config: ColonyConfig) -> Self {
        Self::with_oracle(config, GridPathOracle)
    }
}

impl<P: PathOracle> Colony<P> {
    /// Create a colony with fresh state and a custom path oracle.
    pub fn with_oracle(config: ColonyConfig, oracle: P) -> Self {
        Self {
            config,
            memory: ColonyMemory::default(),
            oracle,
        }
    }

    /// Resume from persisted state.
    #[must_use]
    pub fn with_memory(mut self, memory: ColonyMemory) -> Self {
        self.memory = memory;
        self
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Persisted scheduling state.
    #[must_use]
    pub fn memory(&self) -> &ColonyMemory {
        &self.memory
    }

    /// Persisted scheduling state, mutably (e.g. to request a refresh).
    pub fn memory_mut(&mut self) -> &mut ColonyMemory {
        &mut self.memory
    }

    /// Hand back the persisted state.
    #[must_use]
    pub fn into_memory(self) -> ColonyMemory {
        self.memory
    }

    /// Run every scheduler once against `world`.
    pub fn run_cycle(&mut self, world: &mut World, cycle: u64) -> CycleReport {
        self.collect_refresh_triggers(world);

        let mut ctx = CycleContext::new(&self.config.scheduler, &self.oracle, cycle);
        let mut outcomes = Vec::with_capacity(self.config.directives.len() + 1);

        for directive in &self.config.directives {
            let name = &directive.zone;
            let state = self.memory.take_zone(name);
            let local = world.zone(name).is_some_and(|z| !z.facilities.is_empty());
            let (state, outcome) = if local {
                schedule_zone(&mut ctx, world, name, state)
            } else {
                plan_expansion(&mut ctx, world, directive, state)
            };
            self.memory.store_zone(name.clone(), state);
            outcomes.push((name.clone(), outcome));
        }

        if let Some(siege) = &self.config.siege {
            let outcome = schedule_siege(&mut ctx, world, siege, &mut self.memory.siege);
            outcomes.push((siege.target.clone(), outcome));
        }

        self.memory.last_cycle = Some(cycle);
        let report = CycleReport { cycle, outcomes };
        tracing::debug!(cycle, produced = report.produced(), "Cycle scheduled");
        report
    }

    /// Request a full evaluation of directive zones whose cached decision
    /// may be out of date: a unit working there is about to expire, or
    /// resources were just delivered to one of its facilities.
    fn collect_refresh_triggers(&mut self, world: &mut World) {
        let near_expiry = self.config.scheduler.near_expiry;
        let managed = |zone: &ZoneName| self.config.directives.iter().any(|d| &d.zone == zone);

        let mut stale: Vec<ZoneName> = world
            .units()
            .filter(|u| u.is_alive() && u.ticks_to_live <= near_expiry && managed(&u.zone))
            .map(|u| u.zone.clone())
            .collect();
        for zone in world.zones_mut() {
            if zone.resource_delivered {
                zone.resource_delivered = false;
                if managed(&zone.name) {
                    stale.push(zone.name.clone());
                }
            }
        }

        stale.sort();
        stale.dedup();
        for zone in stale {
            tracing::trace!(zone = %zone, "Refresh requested");
            self.memory.request_refresh(&zone);
        }
    }
}
