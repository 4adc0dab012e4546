//! Batch scenario runner.
//!
//! Runs many scenarios in parallel using rayon and collects their
//! summaries into one JSON file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sandbox::{RunSummary, Sandbox};
use crate::scenario::Scenario;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Built-in scenario names or RON file paths
    pub scenarios: Vec<String>,
    /// Cycles per run; `None` uses each scenario's own count
    pub cycles: Option<u64>,
    /// Maximum parallel runs (0 = use rayon default)
    pub parallel_runs: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenarios: vec!["bootstrap".to_string(), "frontier".to_string()],
            cycles: None,
            parallel_runs: 0,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for a set of scenarios
    pub fn new(scenarios: Vec<String>) -> Self {
        Self {
            scenarios,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Override the cycle count of every scenario
    pub fn with_cycles(mut self, cycles: u64) -> Self {
        self.cycles = Some(cycles);
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Summary per completed run, in config order
    pub runs: Vec<RunSummary>,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Index of the scenario in the config
    pub index: usize,
    /// Scenario name or path
    pub scenario: String,
    /// Error message
    pub message: String,
}

fn run_one(name: &str, cycles: Option<u64>) -> Result<RunSummary, String> {
    let scenario = Scenario::resolve(name).map_err(|e| e.to_string())?;
    let cycles = cycles.unwrap_or(scenario.cycles);
    Ok(Sandbox::new(&scenario).run(cycles, false))
}

/// Run a batch of scenarios
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();

    info!(
        scenarios = config.scenarios.len(),
        cycles = ?config.cycles,
        "Starting batch run"
    );

    // Configure thread pool if specified
    if config.parallel_runs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_runs as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<RunSummary, BatchError>> = config
        .scenarios
        .par_iter()
        .enumerate()
        .map(|(index, scenario)| {
            run_one(scenario, config.cycles).map_err(|message| {
                warn!(scenario = %scenario, %message, "Run failed");
                BatchError {
                    index,
                    scenario: scenario.clone(),
                    message,
                }
            })
        })
        .collect();

    let (runs, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let runs: Vec<RunSummary> = runs.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        completed = runs.len(),
        failed = errors.len(),
        duration_secs = format!("{duration_seconds:.2}"),
        "Batch complete"
    );

    BatchResults {
        config,
        runs,
        duration_seconds,
        errors,
    }
}

/// Run the same scenario `runs` times in parallel and check that every
/// run ends in the same state.
pub fn verify_determinism(scenario: &Scenario, cycles: u64, runs: u32) -> bool {
    let hashes: Vec<u64> = (0..runs)
        .into_par_iter()
        .map(|_| Sandbox::new(scenario).run(cycles, false).state_hash)
        .collect();
    hashes.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.scenarios.len(), 2);
        assert_eq!(config.cycles, None);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(vec!["bootstrap".into()])
            .with_output(PathBuf::from("/tmp/results"))
            .with_cycles(50);

        assert_eq!(config.scenarios, vec!["bootstrap".to_string()]);
        assert_eq!(config.cycles, Some(50));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/results"));
    }

    #[test]
    fn test_run_batch_small() {
        let config = BatchConfig::new(vec![
            "bootstrap".into(),
            "frontier".into(),
            "bootstrap".into(),
        ])
        .with_cycles(60);
        let results = run_batch(config);

        assert_eq!(results.runs.len(), 3);
        assert!(results.errors.is_empty());
        assert_eq!(results.runs[0], results.runs[2]);
        assert_eq!(results.runs[1].scenario, "frontier");
    }

    #[test]
    fn test_unknown_scenario_reported() {
        let config = BatchConfig::new(vec!["bootstrap".into(), "/nonexistent.ron".into()])
            .with_cycles(10);
        let results = run_batch(config);

        assert_eq!(results.runs.len(), 1);
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].index, 1);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&Scenario::frontier(), 120, 4));
    }

    #[test]
    fn test_batch_results_save_load() {
        let config = BatchConfig::new(vec!["bootstrap".into()]).with_cycles(30);
        let results = run_batch(config);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.runs, results.runs);
        assert_eq!(loaded.config, results.config);
    }
}
