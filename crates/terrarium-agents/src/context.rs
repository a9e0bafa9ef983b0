//! What an agent can see and do while it acts.
//!
//! An [`ActContext`] is built by the engine for exactly one agent's `act`
//! call. It lends the agent mutable access to the grid (cell mutators), the
//! registry (moves and lookups), and the shared random stream. Lifecycle
//! changes made through it are queued, never applied immediately.

use terrarium_types::{AgentId, CellCoord, Species};
use terrarium_world::{Cell, Grid, SimRng};

use crate::agent::{Agent, PendingAgent, Vitals};
use crate::registry::AgentRegistry;

/// Borrowed view of the world handed to [`Agent::act`].
#[derive(Debug)]
pub struct ActContext<'a> {
    agent: AgentId,
    tick: u64,
    grid: &'a mut Grid,
    registry: &'a mut AgentRegistry,
    rng: &'a mut SimRng,
}

impl<'a> ActContext<'a> {
    /// Build the context for `agent` acting during `tick`.
    pub const fn new(
        agent: AgentId,
        tick: u64,
        grid: &'a mut Grid,
        registry: &'a mut AgentRegistry,
        rng: &'a mut SimRng,
    ) -> Self {
        Self {
            agent,
            tick,
            grid,
            registry,
            rng,
        }
    }

    /// The acting agent's identifier.
    pub const fn id(&self) -> AgentId {
        self.agent
    }

    /// The tick in progress.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Read-only view of the grid.
    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// The shared random stream.
    pub const fn rng(&mut self) -> &mut SimRng {
        &mut *self.rng
    }

    // -----------------------------------------------------------------------
    // Own cell
    // -----------------------------------------------------------------------

    /// The acting agent's current cell, if it has one.
    pub fn cell(&self) -> Option<CellCoord> {
        self.registry.cell_of(self.agent)
    }

    /// State of the acting agent's current cell.
    pub fn cell_state(&self) -> Option<&Cell> {
        self.cell().and_then(|coord| self.grid.cell(coord))
    }

    /// Mutable state of the acting agent's current cell, for the cell
    /// mutators. Occupants cannot be changed through it by contract; moves
    /// go through [`move_to`](Self::move_to).
    pub fn cell_state_mut(&mut self) -> Option<&mut Cell> {
        let coord = self.cell()?;
        self.grid.cell_mut(coord)
    }

    /// One orthogonal neighbor of the acting agent's cell, chosen uniformly.
    ///
    /// Always consumes exactly one draw, even for an unplaced agent.
    pub fn random_neighbor(&mut self) -> Option<CellCoord> {
        match self.cell() {
            Some(origin) => self.grid.random_neighbor(origin, &mut *self.rng),
            None => self.rng.pick::<CellCoord>(&[]),
        }
    }

    /// One orthogonal neighbor of `origin`, chosen uniformly. One draw.
    pub fn random_neighbor_of(&mut self, origin: CellCoord) -> Option<CellCoord> {
        self.grid.random_neighbor(origin, &mut *self.rng)
    }

    /// Cells within Manhattan `distance` of the acting agent's cell,
    /// excluding the cell itself.
    pub fn neighbors_within(&self, distance: usize) -> Vec<CellCoord> {
        self.cell()
            .map(|origin| self.grid.neighbors_within_distance(origin, distance))
            .unwrap_or_default()
    }

    /// Move the acting agent to `destination`. Returns `false` if the move
    /// was not possible.
    pub fn move_to(&mut self, destination: CellCoord) -> bool {
        self.registry.move_agent(&mut *self.grid, self.agent, destination)
    }

    // -----------------------------------------------------------------------
    // Peers
    // -----------------------------------------------------------------------

    /// Live agents in the cell at `coord`, ascending.
    pub fn agents_at(&self, coord: CellCoord) -> Vec<AgentId> {
        self.registry.agents_at(&*self.grid, coord)
    }

    /// Current cell of a live peer.
    pub fn cell_of(&self, peer: AgentId) -> Option<CellCoord> {
        self.registry.cell_of(peer)
    }

    /// Species of a live peer.
    pub fn species_of(&self, peer: AgentId) -> Option<Species> {
        self.registry.species_of(peer)
    }

    /// Visible state of a live peer. `None` for the acting agent itself.
    pub fn vitals(&self, peer: AgentId) -> Option<Vitals> {
        self.registry.vitals(peer)
    }

    /// Whether a peer has already been queued for removal this tick.
    pub fn removal_pending(&self, peer: AgentId) -> bool {
        self.registry.removal_pending(peer)
    }

    /// Change a peer's energy. Returns `false` if the peer is unknown.
    pub fn adjust_peer_energy(&mut self, peer: AgentId, delta: i32) -> bool {
        self.registry.adjust_energy(peer, delta)
    }

    // -----------------------------------------------------------------------
    // Lifecycle (deferred)
    // -----------------------------------------------------------------------

    /// Queue a new agent at `cell`. It becomes live after this tick's agent
    /// pass and acts for the first time next tick.
    pub fn spawn(&mut self, body: Box<dyn Agent>, cell: CellCoord) -> AgentId {
        let id = self.registry.issue_id();
        self.registry
            .enqueue_addition(PendingAgent::new(id, Some(cell), body));
        id
    }

    /// Queue `peer` for removal at the end of this tick.
    pub fn remove(&mut self, peer: AgentId) {
        self.registry.enqueue_removal(peer);
    }

    /// Queue the acting agent's own removal.
    pub fn remove_self(&mut self) {
        self.registry.enqueue_removal(self.agent);
    }
}
