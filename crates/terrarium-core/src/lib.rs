//! Tick scheduling, run control, and configuration for the Terrarium
//! simulation.
//!
//! This crate owns the tick that drives the simulation (environment pass,
//! agent pass, queue drain) and the play/pause/step/stop handshake between
//! the engine thread and a control thread.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `terrarium-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`SimulationControl`], the flags and condition variable
//!   shared with control threads.
//! - [`runner`] -- The engine loop, [`TickCallback`], and the [`Engine`]
//!   thread handle.
//! - [`snapshot`] -- [`WorldSnapshot`] and the [`SnapshotPublisher`]
//!   callback.
//! - [`tick`] -- [`Simulation`] and the tick algorithm.

pub mod config;
pub mod control;
pub mod runner;
pub mod snapshot;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use control::{EngineState, SimulationControl};
pub use runner::{Engine, RunEndReason, RunResult, RunnerError, TickCallback};
pub use snapshot::{SnapshotPublisher, WorldSnapshot};
pub use tick::{Simulation, TickError, TickSummary};
