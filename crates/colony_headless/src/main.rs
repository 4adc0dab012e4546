//! Headless colony scheduler runner.
//!
//! Runs scenarios without a live host, prints JSON summaries on stdout
//! and logs on stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run the default scenario
//! cargo run -p colony_headless
//!
//! # Run a scenario file, resuming from and saving colony memory
//! cargo run -p colony_headless -- run --scenario crates/colony_headless/scenarios/stockpile.ron --memory state/memory.bin
//!
//! # Run several scenarios in parallel
//! cargo run -p colony_headless -- batch bootstrap frontier --output results/
//!
//! # Check a colony config without running it
//! cargo run -p colony_headless -- validate --config colony.ron
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use colony_core::config::ColonyConfig;
use colony_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    sandbox::{load_memory, save_memory, Sandbox},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "colony_headless")]
#[command(about = "Headless sandbox runner for the colony scheduler")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print its summary
    Run {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "bootstrap")]
        scenario: String,

        /// Cycles to run (defaults to the scenario's own count)
        #[arg(short, long)]
        cycles: Option<u64>,

        /// Colony memory file to resume from and save to
        #[arg(short, long)]
        memory: Option<PathBuf>,

        /// Include every cycle that did something in the output
        #[arg(long)]
        reports: bool,
    },

    /// Run several scenarios in parallel
    Batch {
        /// Built-in scenario names or RON files
        #[arg(required = true)]
        scenarios: Vec<String>,

        /// Cycles per run (defaults to each scenario's own count)
        #[arg(short, long)]
        cycles: Option<u64>,

        /// Maximum parallel runs (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Check a colony config or scenario file
    Validate {
        /// Colony config RON file
        #[arg(short, long, conflicts_with = "scenario")]
        config: Option<PathBuf>,

        /// Scenario RON file
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },

    /// Verify determinism by running the same scenario several times
    Verify {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "bootstrap")]
        scenario: String,

        /// Cycles per run
        #[arg(short, long, default_value = "300")]
        cycles: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for JSON output)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            cycles,
            memory,
            reports,
        }) => {
            cmd_run(&scenario, cycles, memory, reports);
        }
        Some(Commands::Batch {
            scenarios,
            cycles,
            parallel,
            output,
        }) => {
            cmd_batch(scenarios, cycles, parallel, output);
        }
        Some(Commands::Validate { config, scenario }) => {
            cmd_validate(config, scenario);
        }
        Some(Commands::Verify {
            scenario,
            cycles,
            runs,
        }) => {
            cmd_verify(&scenario, cycles, runs);
        }
        None => {
            cmd_run("bootstrap", None, None, false);
        }
    }
}

fn load_scenario(name: &str) -> Scenario {
    match Scenario::resolve(name) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to encode output: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a single scenario
fn cmd_run(name: &str, cycles: Option<u64>, memory: Option<PathBuf>, reports: bool) {
    let scenario = load_scenario(name);
    let cycles = cycles.unwrap_or(scenario.cycles);
    tracing::info!(scenario = %scenario.name, cycles, "Starting run");

    let mut sandbox = Sandbox::new(&scenario);
    if let Some(path) = &memory {
        match load_memory(path) {
            Ok(state) => sandbox = sandbox.with_memory(state),
            Err(e) => {
                eprintln!("Failed to read memory file: {e}");
                std::process::exit(1);
            }
        }
    }

    let summary = sandbox.run(cycles, reports);

    if let Some(path) = &memory {
        if let Err(e) = save_memory(path, sandbox.memory()) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save memory");
            std::process::exit(1);
        }
    }

    print_json(&summary);
}

/// Run scenarios in parallel
fn cmd_batch(scenarios: Vec<String>, cycles: Option<u64>, parallel: u32, output: PathBuf) {
    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        std::process::exit(1);
    }

    let mut config = BatchConfig::new(scenarios).with_output(output.clone());
    config.cycles = cycles;
    config.parallel_runs = parallel;

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        std::process::exit(1);
    }

    eprintln!("Runs completed: {}", results.runs.len());
    for error in &results.errors {
        eprintln!("  FAILED {}: {}", error.scenario, error.message);
    }
    eprintln!("Results saved to: {}", results_path.display());

    if !results.errors.is_empty() {
        std::process::exit(1);
    }
}

/// Validate a config or scenario
fn cmd_validate(config: Option<PathBuf>, scenario: Option<PathBuf>) {
    let result = match (config, scenario) {
        (Some(path), _) => ColonyConfig::load(&path)
            .map(|c| format!("{} directives", c.directives.len()))
            .map_err(|e| e.to_string()),
        (None, Some(path)) => Scenario::load(&path)
            .map(|s| format!("{} zones, {} directives", s.zones.len(), s.colony.directives.len()))
            .map_err(|e| e.to_string()),
        (None, None) => Err("pass --config or --scenario".to_string()),
    };

    match result {
        Ok(detail) => eprintln!("OK: {detail}"),
        Err(e) => {
            eprintln!("INVALID: {e}");
            std::process::exit(1);
        }
    }
}

/// Verify determinism
fn cmd_verify(name: &str, cycles: u64, runs: u32) {
    let scenario = load_scenario(name);
    tracing::info!(scenario = %scenario.name, cycles, runs, "Verifying determinism");

    if verify_determinism(&scenario, cycles, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}
