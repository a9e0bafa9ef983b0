//! Lattice, cells, climate, and randomness for the Terrarium simulation.
//!
//! This crate models the physical world the agents live in: a fixed
//! `height x width` lattice of [`Cell`]s, each carrying environmental state
//! and the set of agent identifiers currently located there.
//!
//! # Modules
//!
//! - [`cell`] -- [`Cell`] environmental scalars, weather, and occupants.
//! - [`climate`] -- [`Climate`] weather effects and transition table.
//! - [`error`] -- Error types for lattice construction and lookups.
//! - [`grid`] -- [`Grid`] ownership of cells, boundary resolution, and
//!   neighbor queries.
//! - [`rng`] -- [`SimRng`], the single shared random stream.

pub mod cell;
pub mod climate;
pub mod error;
pub mod grid;
pub mod rng;

// Re-export primary types at crate root.
pub use cell::{Cell, CellSummary};
pub use climate::{Climate, Transition, WeatherEffects};
pub use error::WorldError;
pub use grid::Grid;
pub use rng::SimRng;
