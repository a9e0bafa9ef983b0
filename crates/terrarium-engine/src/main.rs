//! Engine binary for the Terrarium simulation.
//!
//! Wires together configuration, seeding, the engine thread, and the
//! stdin control console.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first CLI argument, else `terrarium-config.yaml`,
//!    else defaults)
//! 2. Initialize structured logging (tracing), on stderr
//! 3. Build the grid and seed the initial population
//! 4. Start the engine thread with a snapshot publisher
//! 5. Run the console on stdin until `quit` or end of input
//! 6. Join the engine thread and log the result

mod console;
mod error;
mod spawner;

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use terrarium_core::runner::{self, Engine};
use terrarium_core::{
    Simulation, SimulationConfig, SimulationControl, SnapshotPublisher, WorldSnapshot,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::{Console, SessionEnd};
use crate::error::EngineError;

/// Config file read when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "terrarium-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step, the console, or the engine
/// loop fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let requested = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, loaded_from) = load_config(requested.as_deref())?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    info!("terrarium-engine starting");
    match &loaded_from {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("config file not found, using defaults"),
    }
    info!(
        height = config.world.height,
        width = config.world.width,
        boundary = ?config.world.boundary,
        seed = config.world.seed,
        agent_order = ?config.schedule.agent_order,
        climate = %config.climate.name,
        "world configured"
    );

    // 3. Build the world and seed it.
    let mut simulation = Simulation::from_config(&config)?;
    let seeded = spawner::seed_population(&mut simulation, &config.population, &config.species)?;
    info!(agents = seeded.total(), "initial population placed");

    // 4. Start the engine thread.
    let control = Arc::new(SimulationControl::from_schedule(&config.schedule));
    let publisher = SnapshotPublisher::new(WorldSnapshot::capture(&simulation));
    let snapshots = publisher.handle();
    let engine = Engine::spawn(simulation, Arc::clone(&control), Box::new(publisher))?;
    info!(
        playing = control.is_playing(),
        tick_interval_ms = control.tick_interval_ms(),
        max_ticks = control.max_ticks(),
        "engine thread started"
    );

    // 5. Run the console.
    let console = Console::new(Arc::clone(&control), snapshots);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    Console::print_help(&mut out).map_err(|e| EngineError::Console {
        message: e.to_string(),
    })?;
    out.flush().map_err(|e| EngineError::Console {
        message: e.to_string(),
    })?;
    let session = console.run(io::stdin().lock(), &mut out)?;

    // 6. Stop and join. A bounded run that is playing is left to finish
    //    when input runs out.
    let finish_alone =
        session == SessionEnd::EndOfInput && control.max_ticks() > 0 && control.is_playing();
    let (_simulation, result) = if finish_alone {
        info!("input closed, waiting for the bounded run to finish");
        engine.join()?
    } else {
        engine.stop()?
    };

    runner::log_run_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "terrarium-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// An explicitly requested path must exist. Without one,
/// `terrarium-config.yaml` in the working directory is used if present,
/// otherwise defaults. Returns the path actually read, if any.
fn load_config(
    requested: Option<&Path>,
) -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = requested {
        let config = SimulationConfig::from_file(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = SimulationConfig::from_file(default_path)?;
        Ok((config, Some(default_path.to_path_buf())))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}
