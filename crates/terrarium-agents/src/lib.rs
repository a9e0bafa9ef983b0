//! Agents, their registry, and the built-in species for the Terrarium
//! simulation.
//!
//! This crate owns everything about agents that does not depend on the tick
//! loop: the [`Agent`] contract, the [`AgentRegistry`] that exclusively owns
//! live agents, the [`MutationQueue`] that defers lifecycle changes until the
//! end of a tick, and the tree, worm, and bird policies.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] trait, [`Vitals`], and [`PendingAgent`]
//! - [`config`] -- Species tunables ([`SpeciesConfig`])
//! - [`context`] -- [`ActContext`], an agent's view of the world while acting
//! - [`error`] -- Registry invariant violations ([`AgentError`])
//! - [`queue`] -- Pending additions/removals and identifier issuance
//! - [`registry`] -- [`AgentRegistry`] and [`DrainReport`]
//! - [`species`] -- [`Tree`], [`Worm`], and [`Bird`]

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod queue;
pub mod registry;
pub mod species;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentSummary, PendingAgent, Vitals};
pub use config::{BirdConfig, SpeciesConfig, TreeConfig, WormConfig};
pub use context::ActContext;
pub use error::AgentError;
pub use queue::MutationQueue;
pub use registry::{AgentRegistry, DrainReport};
pub use species::{Bird, Tree, Worm, new_agent};
