//! `gesturectl` CLI: scenario runs, session log export and replay.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use gesture_core::RuntimeConfig;
use sim::replay::{load_log, replay, save_log};
use sim::runner::{run_sync, run_threaded};
use sim::scenarios::{Scenario, ScenarioKind};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "gesturectl", about = "Active-body gesture coordination CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario and output session statistics.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output statistics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the coordinator event log
        #[arg(long)]
        save_log: Option<PathBuf>,
        /// Run the coordinator on its own thread behind a command queue
        #[arg(long)]
        threaded: bool,
        /// Command queue depth in threaded mode
        #[arg(long, default_value_t = RuntimeConfig::default().queue_capacity)]
        queue_capacity: usize,
    },
    /// Replay a previously recorded session log.
    Replay {
        /// Path to session log JSON file
        input: PathBuf,
        /// Output statistics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            output,
            save_log: log_path,
            threaded,
            queue_capacity,
        } => {
            let runtime = threaded.then_some(RuntimeConfig { queue_capacity });
            run_scenario(scenario, seed, output.as_deref(), log_path.as_deref(), runtime)?;
        }
        Commands::Replay { input, output } => {
            run_replay(&input, output.as_deref())?;
        }
    }

    Ok(())
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    output_path: Option<&Path>,
    log_path: Option<&Path>,
    runtime: Option<RuntimeConfig>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.0}s, {} bodies)...",
        scenario.name,
        seed,
        scenario.duration,
        scenario.bodies.len()
    );

    let summary = match runtime {
        Some(runtime) => {
            if log_path.is_some() {
                bail!("session logs are only recorded in synchronous mode");
            }
            run_threaded(&scenario, runtime)?
        }
        None => {
            let (summary, log) = run_sync(&scenario)?;
            if let Some(lpath) = log_path {
                save_log(&log, lpath)?;
                println!("Session log saved to {} ({} events)", lpath.display(), log.events.len());
            }
            summary
        }
    };

    let stats = &summary.stats;
    println!(
        "Done: {} ticks, {} frames ({} empty, {} dropped), elapsed={:.2}s",
        summary.ticks,
        stats.frames,
        stats.empty_ticks,
        stats.frames_dropped,
        summary.elapsed_s,
    );
    println!(
        "Binding: {} rebinds, {} active switches; reports: {} applied, {} stale ({:.1}%)",
        stats.rebinds,
        stats.active_switches,
        stats.reports_applied,
        stats.reports_stale,
        stats.stale_ratio() * 100.0,
    );
    println!("Final result: {:?}", summary.final_result);

    if let Some(opath) = output_path {
        std::fs::write(opath, serde_json::to_string_pretty(&summary)?)?;
        println!("Statistics saved to {}", opath.display());
    }

    Ok(())
}

fn run_replay(input: &Path, output_path: Option<&Path>) -> Result<()> {
    let log = load_log(input)?;
    println!(
        "Replaying '{}' ({} events)...",
        log.scenario_name,
        log.events.len()
    );

    let start = std::time::Instant::now();
    let (result, stats) = replay(&log);
    let elapsed = start.elapsed();
    info!(frames = stats.frames, "replay finished");
    println!(
        "Replay done: {} frames, {} rebinds, final result {:?}, elapsed={:.2}s",
        stats.frames,
        stats.rebinds,
        result,
        elapsed.as_secs_f64()
    );

    if let Some(opath) = output_path {
        let json = serde_json::json!({
            "scenario": log.scenario_name,
            "seed": log.seed,
            "elapsed_s": elapsed.as_secs_f64(),
            "final_result": result,
            "stats": stats,
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
    }

    Ok(())
}
