//! Headless sandbox runner for the colony scheduler.
//!
//! Loads a scenario (a world snapshot plus the colony configuration that
//! schedules it), advances a toy world cycle by cycle with the scheduler
//! in the loop, and reports what was produced. This enables:
//!
//! - **Tuning**: see how config changes shift production over many cycles
//! - **CI verification**: automated checks of scheduling and determinism
//! - **Resume testing**: persist colony memory between runs
//!
//! # Output
//!
//! - **stdout**: JSON run summaries
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run a built-in scenario
//! cargo run -p colony_headless -- run --scenario frontier --cycles 600
//!
//! # Check a colony config
//! cargo run -p colony_headless -- validate --config colony.ron
//!
//! # Verify determinism
//! cargo run -p colony_headless -- verify --scenario bootstrap --runs 5
//! ```

pub mod batch;
pub mod sandbox;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use sandbox::{load_memory, save_memory, RunSummary, Sandbox, SandboxError};
pub use scenario::{Scenario, ScenarioError};
