//! Cross-thread tests for the engine loop: a control thread steps, plays,
//! pauses, and stops an [`Engine`] running on its own thread.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use terrarium_core::runner::NoOpCallback;
use terrarium_core::{
    Engine, EngineState, RunEndReason, Simulation, SimulationControl, SnapshotPublisher,
    TickCallback, TickSummary, WorldSnapshot,
};
use terrarium_types::{AgentOrder, BoundaryMode};
use terrarium_world::{Climate, Grid, SimRng};

const PATIENCE: Duration = Duration::from_secs(10);

fn simulation() -> Simulation {
    Simulation::new(
        Grid::new(5, 5, BoundaryMode::Toroidal).unwrap(),
        Climate::temperate(),
        SimRng::seed_from_u64(3),
        AgentOrder::ById,
    )
}

#[test]
fn step_runs_exactly_one_tick() {
    let control = Arc::new(SimulationControl::new(0, 0, false));
    let publisher = SnapshotPublisher::new(WorldSnapshot::default());
    let snapshots = publisher.handle();
    let engine = Engine::spawn(simulation(), Arc::clone(&control), Box::new(publisher)).unwrap();

    control.request_step();
    assert_eq!(control.wait_for_tick(1, PATIENCE), 1);
    assert_eq!(snapshots.read().unwrap().tick, 1);

    // Paused: nothing more happens on its own.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(control.tick(), 1);
    assert_eq!(control.state(), EngineState::Running);

    control.request_step();
    assert_eq!(control.wait_for_tick(2, PATIENCE), 2);

    let (sim, result) = engine.stop().unwrap();
    assert_eq!(result.end_reason, RunEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 2);
    assert_eq!(sim.tick(), 2);
    assert_eq!(control.state(), EngineState::Stopped);
}

/// Arms one more step from inside the first tick it sees.
struct StepAgainOnce {
    control: Arc<SimulationControl>,
    armed_during: Option<u64>,
}

impl TickCallback for StepAgainOnce {
    fn on_tick(&mut self, summary: &TickSummary, _simulation: &Simulation) {
        if self.armed_during.is_none() {
            self.control.request_step();
            self.armed_during = Some(summary.tick);
        }
    }
}

#[test]
fn step_requested_mid_tick_is_not_lost() {
    let control = Arc::new(SimulationControl::new(0, 0, false));
    let callback = StepAgainOnce {
        control: Arc::clone(&control),
        armed_during: None,
    };
    let engine = Engine::spawn(simulation(), Arc::clone(&control), Box::new(callback)).unwrap();

    // One external step; the second comes from inside tick 1.
    control.request_step();
    assert_eq!(control.wait_for_tick(2, PATIENCE), 2);

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(control.tick(), 2);
    assert!(!control.is_step_armed());
    assert!(!control.is_playing());

    let (sim, result) = engine.stop().unwrap();
    assert_eq!(result.total_ticks, 2);
    assert_eq!(sim.tick(), 2);
}

#[test]
fn play_then_pause_then_stop() {
    let control = Arc::new(SimulationControl::new(1, 0, false));
    let engine = Engine::spawn(simulation(), Arc::clone(&control), Box::new(NoOpCallback)).unwrap();

    control.set_playing(true);
    assert!(control.wait_for_tick(5, PATIENCE) >= 5);

    control.set_playing(false);
    // Let a tick that was already under way finish.
    std::thread::sleep(Duration::from_millis(50));
    let paused_at = control.tick();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(control.tick(), paused_at);

    let (sim, result) = engine.stop().unwrap();
    assert_eq!(result.end_reason, RunEndReason::OperatorStop);
    assert_eq!(result.final_tick, paused_at);
    assert_eq!(sim.tick(), paused_at);
}

#[test]
fn stop_releases_an_idle_engine() {
    let control = Arc::new(SimulationControl::new(0, 0, false));
    let engine = Engine::spawn(simulation(), Arc::clone(&control), Box::new(NoOpCallback)).unwrap();
    std::thread::sleep(Duration::from_millis(20));

    let (sim, result) = engine.stop().unwrap();
    assert_eq!(result.end_reason, RunEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 0);
    assert_eq!(sim.tick(), 0);
}

#[test]
fn bounded_run_ends_on_its_own() {
    let control = Arc::new(SimulationControl::new(0, 12, true));
    let engine = Engine::spawn(simulation(), Arc::clone(&control), Box::new(NoOpCallback)).unwrap();

    let (sim, result) = engine.join().unwrap();
    assert_eq!(result.end_reason, RunEndReason::MaxTicksReached);
    assert_eq!(result.total_ticks, 12);
    assert_eq!(result.final_tick, 12);
    assert_eq!(result.final_summary.map(|s| s.tick), Some(12));
    assert_eq!(sim.tick(), 12);
    assert_eq!(control.tick(), 12);
}

#[test]
fn slow_pacing_does_not_delay_stop() {
    let control = Arc::new(SimulationControl::new(60_000, 0, true));
    let engine = Engine::spawn(simulation(), Arc::clone(&control), Box::new(NoOpCallback)).unwrap();
    assert_eq!(control.wait_for_tick(1, PATIENCE), 1);

    let started = std::time::Instant::now();
    let (_sim, result) = engine.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(result.final_tick, 1);
}
