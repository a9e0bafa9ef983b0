//! Run control shared between the engine thread and a control thread.
//!
//! The engine thread owns the [`Simulation`](crate::Simulation) and runs the
//! tick loop; any number of control threads hold an
//! `Arc<SimulationControl>` and issue requests through it.
//!
//! # Handshake
//!
//! Requests are lock-free atomic flags (`playing`, `step_armed`,
//! `stop_requested`). Blocking uses a mutex-guarded condition variable. The
//! mutex protects a *wake epoch* counter. Every request sets its flag, then
//! takes the mutex, bumps the epoch, and notifies all waiters. The engine
//! only decides to block while holding that mutex, after re-checking every
//! flag, so a request that races the engine going to sleep is either seen by
//! the check or delivered by the notify. Stopping always wakes.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ScheduleConfig;

/// Lifecycle of the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Constructed, loop not started.
    Idle,
    /// Loop active.
    Running,
    /// Loop exited; terminal.
    Stopped,
}

impl EngineState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Stopped => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Shared control state for one engine run.
#[derive(Debug)]
pub struct SimulationControl {
    /// Free-running mode.
    playing: AtomicBool,

    /// A single tick has been requested and not yet started.
    step_armed: AtomicBool,

    /// Stop has been requested.
    stop_requested: AtomicBool,

    /// [`EngineState`] as a `u8`.
    lifecycle: AtomicU8,

    /// Completed ticks, published by the engine after each tick.
    tick: AtomicU64,

    /// Delay between free-running ticks (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Wall-clock time the control was created.
    started_at: DateTime<Utc>,

    /// Bumped under the lock by every request.
    wake_epoch: Mutex<u64>,

    /// Signaled after every epoch bump.
    wake_signal: Condvar,
}

impl SimulationControl {
    /// Create control state for a run.
    pub fn new(tick_interval_ms: u64, max_ticks: u64, start_playing: bool) -> Self {
        Self {
            playing: AtomicBool::new(start_playing),
            step_armed: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            lifecycle: AtomicU8::new(EngineState::Idle.as_u8()),
            tick: AtomicU64::new(0),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
            started_at: Utc::now(),
            wake_epoch: Mutex::new(0),
            wake_signal: Condvar::new(),
        }
    }

    /// Create control state from the `schedule` configuration section.
    pub fn from_schedule(schedule: &ScheduleConfig) -> Self {
        Self::new(
            schedule.tick_interval_ms,
            schedule.max_ticks,
            schedule.start_playing,
        )
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.wake_epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Requests (control thread)
    // -----------------------------------------------------------------------

    /// Arm a single tick. The engine runs it at the top of its next loop
    /// iteration, whether or not it is playing.
    pub fn request_step(&self) {
        self.step_armed.store(true, Ordering::Release);
        self.wake();
    }

    /// Enter (`true`) or leave (`false`) free-running mode.
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
        self.wake();
    }

    /// Ask the engine loop to exit after the tick in progress, if any.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake();
    }

    /// Wake the engine so it re-checks every flag.
    pub fn wake(&self) {
        {
            let mut epoch = self.lock_epoch();
            *epoch = epoch.wrapping_add(1);
        }
        self.wake_signal.notify_all();
    }

    /// Change the delay between free-running ticks. Takes effect at once,
    /// including for a delay already in progress.
    pub fn set_tick_interval_ms(&self, ms: u64) {
        self.tick_interval_ms.store(ms, Ordering::Release);
        self.wake();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether free-running mode is on.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Whether a single tick is armed.
    pub fn is_step_armed(&self) -> bool {
        self.step_armed.load(Ordering::Acquire)
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Current lifecycle state of the engine loop.
    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    /// Completed ticks as last published by the engine.
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Acquire)
    }

    /// Current delay between free-running ticks.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Maximum number of ticks (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `tick` completed ticks satisfies the tick limit.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }

    /// Wall-clock time the control was created.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the control was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        u64::try_from(elapsed.num_seconds()).unwrap_or(0)
    }

    /// Block until the engine has published at least `tick` completed
    /// ticks or stopped, or `timeout` passes. Returns the published tick.
    pub fn wait_for_tick(&self, tick: u64, timeout: Duration) -> u64 {
        let guard = self.lock_epoch();
        let (_guard, _timed_out) = self
            .wake_signal
            .wait_timeout_while(guard, timeout, |_| {
                self.tick() < tick && self.state() != EngineState::Stopped
            })
            .unwrap_or_else(PoisonError::into_inner);
        self.tick()
    }

    // -----------------------------------------------------------------------
    // Engine side
    // -----------------------------------------------------------------------

    pub(crate) fn set_state(&self, state: EngineState) {
        self.lifecycle.store(state.as_u8(), Ordering::Release);
        self.wake();
    }

    pub(crate) fn publish_tick(&self, tick: u64) {
        self.tick.store(tick, Ordering::Release);
        self.wake();
    }

    /// Consume an armed step request. A request made while the resulting
    /// tick runs arms the next one.
    pub(crate) fn take_step(&self) -> bool {
        self.step_armed.swap(false, Ordering::AcqRel)
    }

    fn has_work(&self) -> bool {
        self.is_stop_requested() || self.is_step_armed() || self.is_playing()
    }

    /// Block until a request arrives or [`wake`](Self::wake) is called.
    ///
    /// Returns immediately if there is already work to do.
    pub(crate) fn wait_for_work(&self) {
        let guard = self.lock_epoch();
        let seen = *guard;
        let _guard = self
            .wake_signal
            .wait_while(guard, |epoch| *epoch == seen && !self.has_work())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Sleep for the tick interval between free-running ticks.
    ///
    /// Returns early on any request, so pause, step, stop, and speed changes
    /// are honored without waiting out the delay. Returns at once if the
    /// engine is no longer playing.
    pub(crate) fn pace(&self) {
        let interval = self.tick_interval_ms();
        if interval == 0 {
            return;
        }
        let guard = self.lock_epoch();
        let seen = *guard;
        let (_guard, _timed_out) = self
            .wake_signal
            .wait_timeout_while(guard, Duration::from_millis(interval), |epoch| {
                *epoch == seen
                    && self.is_playing()
                    && !self.is_stop_requested()
                    && !self.is_step_armed()
            })
            .unwrap_or_else(PoisonError::into_inner);
    }
}
