//! Engine loop runner with play/pause/step/stop controls.
//!
//! This module provides [`run_simulation`], the loop that drives ticks
//! under the direction of a [`SimulationControl`]:
//!
//! - **Single step**: an armed step runs exactly one tick, playing or not
//! - **Free running**: while playing, ticks run back to back, optionally
//!   paced by `tick_interval_ms`
//! - **Idle**: otherwise the engine blocks until a request arrives
//! - **Bounded run**: stop after `max_ticks` completed ticks
//! - **Operator stop**: the loop exits at the top of its next iteration
//!
//! [`Engine`] runs the loop on its own thread and hands the simulation back
//! when it exits.

use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Serialize;
use tracing::info;

use crate::control::{EngineState, SimulationControl};
use crate::tick::{Simulation, TickError, TickSummary};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The engine thread could not be started.
    #[error("failed to spawn engine thread: {source}")]
    Spawn {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The engine thread panicked before returning.
    #[error("engine thread panicked")]
    EngineThreadPanicked,
}

/// Reason the engine loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A control thread requested a stop.
    OperatorStop,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the loop exited.
    pub end_reason: RunEndReason,
    /// Ticks executed by this run.
    pub total_ticks: u64,
    /// Tick counter when the loop exited.
    pub final_tick: u64,
    /// Summary of the last tick, if any ran.
    pub final_summary: Option<TickSummary>,
}

/// Callback invoked on the engine thread after each tick completes.
///
/// Implementations can use this to publish snapshots or metrics. The
/// callback receives the tick summary and read-only access to the
/// simulation.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _simulation: &Simulation) {}
}

/// Run the engine loop until stopped or the tick limit is reached.
///
/// Each iteration checks, in order: stop requested (exit); step armed (run
/// one tick and consume the request); playing (run one tick, then pace);
/// otherwise block until woken. The tick counter on `control` is published
/// after the callback returns, so a thread that waits for a tick sees
/// whatever the callback produced for it.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if a tick fails unrecoverably.
pub fn run_simulation(
    simulation: &mut Simulation,
    control: &SimulationControl,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    control.set_state(EngineState::Running);
    info!(
        tick = simulation.tick(),
        agents_alive = simulation.registry().len(),
        playing = control.is_playing(),
        tick_interval_ms = control.tick_interval_ms(),
        max_ticks = control.max_ticks(),
        "engine starting"
    );

    let outcome = drive(simulation, control, callback);
    control.set_state(EngineState::Stopped);
    outcome
}

fn drive(
    simulation: &mut Simulation,
    control: &SimulationControl,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut total_ticks: u64 = 0;
    let mut final_summary: Option<TickSummary> = None;
    let mut idle = false;

    loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!(tick = simulation.tick(), "operator stop requested");
            return Ok(RunResult {
                end_reason: RunEndReason::OperatorStop,
                total_ticks,
                final_tick: simulation.tick(),
                final_summary,
            });
        }

        let stepping = control.take_step();
        if !stepping && !control.is_playing() {
            if !idle {
                info!(tick = simulation.tick(), "engine idle, waiting for step or play");
                idle = true;
            }
            control.wait_for_work();
            continue;
        }
        if idle {
            info!(tick = simulation.tick(), stepping, "engine resumed");
            idle = false;
        }

        // --- Execute tick ---
        let summary = simulation.run_tick()?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback, then publish ---
        callback.on_tick(&summary, simulation);
        control.publish_tick(summary.tick);
        final_summary = Some(summary);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "tick limit reached"
            );
            return Ok(RunResult {
                end_reason: RunEndReason::MaxTicksReached,
                total_ticks,
                final_tick: summary.tick,
                final_summary,
            });
        }

        // --- Pace free-running ticks ---
        if !stepping {
            control.pace();
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_tick,
        final_agents_alive = result.final_summary.as_ref().map(|s| s.agents_alive),
        "engine stopped"
    );
}

/// Handle to an engine loop running on its own thread.
///
/// The thread owns the [`Simulation`] until the loop exits; [`join`]
/// returns it together with the [`RunResult`].
///
/// [`join`]: Engine::join
#[derive(Debug)]
pub struct Engine {
    control: Arc<SimulationControl>,
    handle: JoinHandle<Result<(Simulation, RunResult), RunnerError>>,
}

impl Engine {
    /// Start the engine loop on a new thread named `terrarium-engine`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Spawn`] if the thread cannot be created.
    pub fn spawn(
        mut simulation: Simulation,
        control: Arc<SimulationControl>,
        mut callback: Box<dyn TickCallback>,
    ) -> Result<Self, RunnerError> {
        let engine_control = Arc::clone(&control);
        let handle = std::thread::Builder::new()
            .name("terrarium-engine".to_owned())
            .spawn(move || {
                let result = run_simulation(&mut simulation, &engine_control, callback.as_mut())?;
                Ok((simulation, result))
            })?;
        Ok(Self { control, handle })
    }

    /// The control shared with the engine thread.
    pub const fn control(&self) -> &Arc<SimulationControl> {
        &self.control
    }

    /// Wait for the engine thread to exit.
    ///
    /// # Errors
    ///
    /// Returns the loop's own error, or [`RunnerError::EngineThreadPanicked`]
    /// if the thread panicked.
    pub fn join(self) -> Result<(Simulation, RunResult), RunnerError> {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(_panic) => Err(RunnerError::EngineThreadPanicked),
        }
    }

    /// Request a stop and wait for the engine thread to exit.
    ///
    /// # Errors
    ///
    /// Same as [`join`](Self::join).
    pub fn stop(self) -> Result<(Simulation, RunResult), RunnerError> {
        self.control.request_stop();
        self.join()
    }
}
