use anyhow::Result;
use clap::Parser;
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::time::Instant;

use tissue_common::SimulationConfig;
use tissue_engine::TissueSimulation;

/// Command-line arguments for the engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation config file
    #[arg(default_value = "config.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting tissue growth engine...");

    // --- Load Configuration ---
    let args = Args::parse();
    info!("Loading configuration from {}", args.config.display());
    let config = SimulationConfig::load(&args.config)?;

    // --- Initialize Simulation ---
    let mut sim = TissueSimulation::new(config)?;
    debug!("Simulation Parameters: {:#?}", sim.params());

    // --- Simulation Loop ---
    let total_steps = sim.config().timing.max_iterations;
    let record_interval_steps = sim.config().timing.record_interval_steps;
    info!("Recording snapshot every {} steps.", record_interval_steps);

    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // --- Initial Snapshot (time = 0) ---
    if let Err(e) = sim.record_snapshot() {
        error!("Error recording initial snapshot: {}", e);
        anyhow::bail!("Failed to record initial snapshot.");
    }

    for step in 0..total_steps {
        let step_start_time = Instant::now();
        let report = match sim.step() {
            Ok(report) => report,
            Err(e) => {
                error!("Error during simulation step {}: {}", step + 1, e);
                if e.is_capacity() {
                    warn!("Raise population.capacity or mechanics.max_neighbors in the config.");
                }
                anyhow::bail!("Simulation step failed.");
            }
        };
        let step_duration = step_start_time.elapsed();

        // Print status periodically
        let current_time = Instant::now();
        let print_interval_secs = 5.0;
        let should_print_status =
            current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs;
        let is_record_step = (step + 1) % record_interval_steps == 0;
        let is_last_step = step + 1 == total_steps;

        if should_print_status || is_record_step || is_last_step {
            info!(
                "Step [{}/{}] (t = {:.4}) | Cells: {} | Edges: {} | Divisions: {} | Step Time: {:6.2} ms | Elapsed: {:.2} s",
                report.step,
                total_steps,
                report.time,
                report.cell_count,
                report.edges,
                report.divisions,
                step_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;

            // --- Record Snapshot ---
            if is_record_step || is_last_step {
                if let Err(e) = sim.record_snapshot() {
                    error!("Error recording snapshot at step {}: {}", step + 1, e);
                    anyhow::bail!("Failed to record snapshot.");
                }
            }
        } else {
            trace!(
                "Step [{}/{}] completed in {:.2} ms",
                step + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }

    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished in {:.3} seconds.",
        total_duration.as_secs_f64()
    );

    if let Some(last) = sim.get_recorded_snapshots().last() {
        info!(
            "{} snapshots held for rendering. Final frame: {} cells, total hormone A {:.4}",
            sim.get_recorded_snapshots().len(),
            last.cell_count(),
            last.total_hormone_a()
        );
        if let Some(amplitudes) = &last.fourier_amplitudes {
            debug!("Outline Fourier amplitudes: {:?}", amplitudes);
        }
    }

    info!("Simulation Complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_defaults_to_local_file() {
        let args = Args::try_parse_from(["tissue-engine"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn config_path_is_positional() {
        let args = Args::try_parse_from(["tissue-engine", "runs/wide.toml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("runs/wide.toml"));
        assert!(Args::try_parse_from(["tissue-engine", "a.toml", "b.toml"]).is_err());
    }
}
