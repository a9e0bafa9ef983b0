//! The contract every species policy implements.
//!
//! The engine knows agents only through [`Agent`]: it calls
//! [`Agent::prepare`] and then [`Agent::act`] once per tick for every live
//! agent. Species-private state stays inside the implementing type; peers
//! observe each other only through [`Vitals`] and the registry.

use serde::Serialize;
use terrarium_types::{AgentId, CellCoord, Sex, Species};
use terrarium_world::Cell;

use crate::context::ActContext;

/// Behavior of one agent variant.
///
/// Implementations must not reach into the registry's live map. Lifecycle
/// changes (offspring, deaths, predation) go through the mutation queue via
/// [`ActContext::spawn`] and [`ActContext::remove`], which take effect only
/// when the queue is drained after the full agent pass.
pub trait Agent: Send + core::fmt::Debug {
    /// Species tag used for cross-species checks.
    fn species(&self) -> Species;

    /// Per-tick bookkeeping on the agent's own state (e.g. aging).
    ///
    /// `cell` is the agent's current cell, if it has one. It is provided
    /// read-only; `prepare` has no effects outside the agent itself.
    fn prepare(&mut self, cell: Option<&Cell>);

    /// The agent's decision for this tick.
    fn act(&mut self, ctx: &mut ActContext<'_>);

    /// Snapshot of the externally visible state.
    fn vitals(&self) -> Vitals;

    /// Apply an energy change caused by another agent (mating cost,
    /// predation). Species without an energy pool ignore it.
    fn adjust_energy(&mut self, _delta: i32) {}
}

/// Externally visible state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Vitals {
    /// Ticks lived (or growth cycles, for trees).
    pub age: u32,
    /// Energy pool. Trees report their health here.
    pub energy: i32,
    /// Sex, for species that need a partner.
    pub sex: Option<Sex>,
    /// Whether the agent is hidden underground.
    pub burrowed: bool,
    /// Whether the agent is advertising for a mate.
    pub receptive: bool,
}

/// An agent waiting in the mutation queue to become live.
#[derive(Debug)]
pub struct PendingAgent {
    /// Identifier issued by the registry.
    pub id: AgentId,
    /// Cell to place the agent in, if any.
    pub cell: Option<CellCoord>,
    /// The agent itself.
    pub body: Box<dyn Agent>,
}

impl PendingAgent {
    /// Bundle an issued identifier, a target cell, and an agent body.
    pub fn new(id: AgentId, cell: Option<CellCoord>, body: Box<dyn Agent>) -> Self {
        Self { id, cell, body }
    }

    /// Species of the pending agent.
    pub fn species(&self) -> Species {
        self.body.species()
    }
}

/// Read-only summary of a live agent, for snapshots and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    /// Identifier.
    pub id: AgentId,
    /// Species tag.
    pub species: Species,
    /// Current cell, if placed.
    pub cell: Option<CellCoord>,
    /// Visible state. `None` while the agent is mid-act.
    pub vitals: Option<Vitals>,
}
