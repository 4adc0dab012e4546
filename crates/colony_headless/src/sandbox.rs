//! Sandbox runner.
//!
//! Drives a toy world with the colony scheduler, one cycle at a time.
//! Between cycles the world does its own bookkeeping: facilities finish
//! production, energy refills, units age and decommissioned units walk
//! home to be recycled.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

use colony_core::colony::{Colony, CycleReport};
use colony_core::error::ColonyError;
use colony_core::memory::ColonyMemory;
use colony_core::scheduler::{Action, ZoneOutcome};
use colony_core::world::World;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scenario::Scenario;

/// Error type for sandbox IO.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Reading or writing the memory file failed.
    #[error("Memory file error: {0}")]
    Io(#[from] std::io::Error),
    /// Colony memory could not be encoded.
    #[error(transparent)]
    State(#[from] ColonyError),
}

/// Aggregate of a sandbox run, printed as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// Cycles run.
    pub cycles: u64,
    /// Units produced, per role.
    pub produced: BTreeMap<String, u32>,
    /// Units decommissioned.
    pub decommissioned: u32,
    /// Decommissions cancelled.
    pub reinstated: u32,
    /// Production commands refused by the world.
    pub deferred: u32,
    /// Roles with demand that no body fit the budget for.
    pub unaffordable: u32,
    /// Zone evaluations skipped on an error.
    pub skipped: u32,
    /// Living units at the end, per role.
    pub census: BTreeMap<String, u32>,
    /// Hash of the final world and memory.
    pub state_hash: u64,
    /// Every cycle that did something, when requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reports: Vec<CycleReport>,
}

impl RunSummary {
    fn record(&mut self, report: &CycleReport) {
        for (_, outcome) in &report.outcomes {
            if matches!(outcome, ZoneOutcome::Skipped { .. }) {
                self.skipped += 1;
            }
            for action in outcome.actions() {
                match action {
                    Action::Produced { role, .. } => {
                        *self.produced.entry(format!("{role:?}")).or_insert(0) += 1;
                    }
                    Action::Decommissioned { .. } => self.decommissioned += 1,
                    Action::Reinstated { .. } => self.reinstated += 1,
                    Action::Deferred { .. } => self.deferred += 1,
                    Action::Unaffordable { .. } => self.unaffordable += 1,
                }
            }
        }
    }

    /// Total units produced.
    #[must_use]
    pub fn total_produced(&self) -> u32 {
        self.produced.values().sum()
    }
}

/// A world and the colony scheduling it.
#[derive(Debug, Clone)]
pub struct Sandbox {
    name: String,
    world: World,
    colony: Colony,
    cycle: u64,
}

impl Sandbox {
    /// Set up a scenario at cycle 0 with fresh memory.
    #[must_use]
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            name: scenario.name.clone(),
            world: scenario.world(),
            colony: Colony::new(scenario.colony.clone()),
            cycle: 0,
        }
    }

    /// Resume with persisted memory, continuing the cycle count where the
    /// saved run stopped.
    #[must_use]
    pub fn with_memory(mut self, memory: ColonyMemory) -> Self {
        self.cycle = memory.next_cycle();
        self.colony = self.colony.with_memory(memory);
        self
    }

    /// The world as it stands.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world, for injecting events between cycles.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The scheduler's persisted state.
    #[must_use]
    pub fn memory(&self) -> &ColonyMemory {
        self.colony.memory()
    }

    /// Next cycle number.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Run one cycle.
    pub fn step(&mut self) -> CycleReport {
        let report = self.colony.run_cycle(&mut self.world, self.cycle);
        for (zone, outcome) in &report.outcomes {
            if let ZoneOutcome::Skipped { reason } = outcome {
                tracing::warn!(zone = %zone, cycle = self.cycle, %reason, "Zone skipped");
            }
        }
        self.world.advance_cycle();
        self.cycle += 1;
        report
    }

    /// Run `cycles` cycles and summarise them.
    pub fn run(&mut self, cycles: u64, keep_reports: bool) -> RunSummary {
        let mut summary = RunSummary {
            scenario: self.name.clone(),
            cycles,
            ..RunSummary::default()
        };
        for _ in 0..cycles {
            let report = self.step();
            summary.record(&report);
            if keep_reports && report.outcomes.iter().any(|(_, o)| !o.actions().is_empty()) {
                summary.reports.push(report);
            }
        }
        for unit in self.world.units().filter(|u| u.is_alive()) {
            *summary.census.entry(format!("{:?}", unit.role)).or_insert(0) += 1;
        }
        summary.state_hash = self.state_hash();

        tracing::info!(
            scenario = %self.name,
            cycles,
            produced = summary.total_produced(),
            decommissioned = summary.decommissioned,
            "Run finished"
        );
        summary
    }

    /// Hash of the serialized world and memory.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let bytes = bincode::serialize(&(&self.world, self.colony.memory())).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        hasher.finish()
    }
}

/// Read persisted memory. A missing file is a fresh start; an unreadable
/// blob is logged and also treated as a fresh start.
pub fn load_memory(path: &Path) -> Result<ColonyMemory, SandboxError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No memory file, starting fresh");
        return Ok(ColonyMemory::default());
    }
    let bytes = std::fs::read(path)?;
    Ok(ColonyMemory::from_bytes_or_default(&bytes))
}

/// Write memory at a cycle boundary.
pub fn save_memory(path: &Path, memory: &ColonyMemory) -> Result<(), SandboxError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, memory.to_bytes()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::units::{BuilderTask, Role};
    use colony_core::world::ZoneName;

    #[test]
    fn test_bootstrap_grows_an_economy() {
        let mut sandbox = Sandbox::new(&Scenario::bootstrap());
        let summary = sandbox.run(200, false);
        assert!(summary.total_produced() > 0);
        assert!(summary.produced.contains_key(&format!("{:?}", Role::Harvester)));
        assert!(summary
            .produced
            .contains_key(&format!("{:?}", Role::Builder(BuilderTask::WallBuilder))));
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_one_production_per_group_per_cycle() {
        let mut sandbox = Sandbox::new(&Scenario::frontier());
        for _ in 0..100 {
            let report = sandbox.step();
            // Every producer in the frontier scenario shares one facility group.
            assert!(report.produced() <= 1);
        }
    }

    #[test]
    fn test_frontier_expands() {
        let mut sandbox = Sandbox::new(&Scenario::frontier());
        sandbox.run(600, false);
        let target = ZoneName::new("W1N2");
        assert!(sandbox.world().units().any(|u| u.zone == target));
        let remote = ZoneName::new("W2N1");
        assert!(sandbox.world().units().any(|u| u.zone == remote));
    }

    #[test]
    fn test_runs_are_reproducible() {
        let a = Sandbox::new(&Scenario::frontier()).run(150, true);
        let b = Sandbox::new(&Scenario::frontier()).run(150, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reports_only_kept_on_request() {
        let summary = Sandbox::new(&Scenario::bootstrap()).run(20, false);
        assert!(summary.reports.is_empty());
        let summary = Sandbox::new(&Scenario::bootstrap()).run(20, true);
        assert!(!summary.reports.is_empty());
    }

    #[test]
    fn test_memory_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("memory.bin");

        let mut sandbox = Sandbox::new(&Scenario::bootstrap());
        sandbox.run(5, false);
        save_memory(&path, sandbox.memory()).unwrap();

        let loaded = load_memory(&path).unwrap();
        assert_eq!(&loaded, sandbox.memory());
    }

    #[test]
    fn test_resumed_run_is_not_throttled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.bin");

        let mut first = Sandbox::new(&Scenario::bootstrap());
        first.run(30, false);
        save_memory(&path, first.memory()).unwrap();

        let memory = load_memory(&path).unwrap();
        let mut resumed = Sandbox::new(&Scenario::bootstrap()).with_memory(memory);
        assert_eq!(resumed.cycle(), 30);
        let home = ZoneName::new("W1N1");
        let evaluated = (0..12).any(|_| {
            matches!(
                resumed.step().outcome(&home),
                Some(ZoneOutcome::Evaluated { .. })
            )
        });
        assert!(evaluated);
        assert_eq!(resumed.memory().next_cycle(), 42);
    }

    #[test]
    fn test_missing_memory_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let memory = load_memory(&dir.path().join("absent.bin")).unwrap();
        assert_eq!(memory, ColonyMemory::default());
    }

    #[test]
    fn test_corrupt_memory_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.bin");
        std::fs::write(&path, [0xff, 0x00, 0x13]).unwrap();
        assert_eq!(load_memory(&path).unwrap(), ColonyMemory::default());
    }
}
