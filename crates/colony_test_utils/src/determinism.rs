//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the scheduler makes identical
//! decisions given identical inputs.
//!
//! # Testing Strategy
//!
//! Production decisions must be reproducible so a colony can resume from
//! persisted state and replay a recorded cycle. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`colony_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   World and memory collections are ordered maps, iterated by key.
//!
//! - **Hidden state**: Everything the scheduler remembers between cycles
//!   lives in [`ColonyMemory`] and round-trips through bincode.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual schedulers are pure functions of their inputs
//! 2. **Property tests**: Random worlds still produce deterministic outcomes
//! 3. **Integration tests**: Multi-cycle runs are reproducible
//! 4. **Parallel tests**: Running N colonies on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use colony_core::colony::{Colony, CycleReport};
use colony_core::config::ColonyConfig;
use colony_core::memory::ColonyMemory;
use colony_core::world::World;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of cycles run.
    pub cycles: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Scheduler is non-deterministic!\n\
                 Runs: {}\n\
                 Cycles: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.cycles,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// A colony driving a world, one cycle at a time.
///
/// Each step runs every scheduler and then advances the world's own
/// bookkeeping, the way a live host would between cycles.
#[derive(Debug, Clone)]
pub struct ColonyRun {
    /// The world being scheduled.
    pub world: World,
    /// The scheduler.
    pub colony: Colony,
    /// Next cycle number.
    pub cycle: u64,
}

impl ColonyRun {
    /// Start a run at cycle 0 with fresh memory.
    #[must_use]
    pub fn new(world: World, config: ColonyConfig) -> Self {
        Self {
            world,
            colony: Colony::new(config),
            cycle: 0,
        }
    }

    /// Run one cycle.
    pub fn step(&mut self) -> CycleReport {
        let report = self.colony.run_cycle(&mut self.world, self.cycle);
        self.world.advance_cycle();
        self.cycle += 1;
        report
    }

    /// Run `cycles` cycles and return every report.
    pub fn run(&mut self, cycles: u64) -> Vec<CycleReport> {
        (0..cycles).map(|_| self.step()).collect()
    }

    /// Hash of the world and the persisted memory.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        state_hash(&self.world, self.colony.memory())
    }
}

/// Hash the serialized form of a world and colony memory.
#[must_use]
pub fn state_hash(world: &World, memory: &ColonyMemory) -> u64 {
    let bytes = bincode::serialize(&(world, memory)).unwrap_or_default();
    compute_hash(&bytes)
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `cycles` - Number of cycles per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one cycle
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use colony_test_utils::determinism::{verify_determinism, ColonyRun};
/// use colony_test_utils::fixtures::{bootstrap_world, home_config};
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 cycles each
///     || ColonyRun::new(bootstrap_world(), home_config()),
///     |run| { run.step(); },
///     ColonyRun::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    cycles: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..cycles {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        cycles,
    }
}

/// Run a colony scenario twice and compare final state hashes.
pub fn verify_colony_determinism<F>(setup_fn: F, cycles: u64) -> DeterminismResult
where
    F: Fn() -> ColonyRun,
{
    verify_determinism(
        2,
        cycles,
        setup_fn,
        |run| {
            run.step();
        },
        ColonyRun::state_hash,
    )
}

/// Run N colonies on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// or memory layout differences.
pub fn run_parallel_colonies<F>(setup_fn: F, runs: usize, cycles: u64) -> DeterminismResult
where
    F: Fn() -> ColonyRun + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| {
                s.spawn(|| {
                    let mut run = setup_fn();
                    run.run(cycles);
                    run.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .collect()
    });

    let is_deterministic = hashes.len() == runs && hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        cycles,
    }
}

/// Compare two runs cycle-by-cycle, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(cycle)` for the first
/// cycle after which their states differ.
pub fn find_first_divergence<F>(setup_fn: F, cycles: u64) -> Option<u64>
where
    F: Fn() -> ColonyRun,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for cycle in 1..=cycles {
        let report_a = a.step();
        let report_b = b.step();

        if report_a != report_b || a.state_hash() != b.state_hash() {
            tracing::debug!(cycle, "Runs diverged");
            return Some(cycle);
        }
    }

    None
}

/// Verify that persisting the colony memory mid-run changes nothing.
///
/// Runs `cycles` cycles, then continues for `after` more cycles both with
/// the live colony and with one resumed from serialized memory.
pub fn verify_memory_round_trip<F>(setup_fn: F, cycles: u64, after: u64) -> bool
where
    F: Fn() -> ColonyRun,
{
    let mut live = setup_fn();
    live.run(cycles);

    let Ok(bytes) = live.colony.memory().to_bytes() else {
        return false;
    };
    let Ok(memory) = ColonyMemory::from_bytes(&bytes) else {
        return false;
    };
    let mut resumed = ColonyRun {
        world: live.world.clone(),
        colony: Colony::new(live.colony.config().clone()).with_memory(memory),
        cycle: live.cycle,
    };

    live.run(after) == resumed.run(after) && live.state_hash() == resumed.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
