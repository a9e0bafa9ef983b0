//! Shared type definitions for the Terrarium simulation.
//!
//! This crate is the single source of truth for the small value types used
//! across the workspace: identifiers, lattice coordinates, and the closed
//! enumerations that replace string-typed dispatch.
//!
//! # Modules
//!
//! - [`ids`] -- Agent identifiers and lattice coordinates
//! - [`enums`] -- Species, sex, weather, boundary mode, and agent ordering

pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentOrder, BoundaryMode, Sex, Species, Weather};
pub use ids::{AgentId, CellCoord};
