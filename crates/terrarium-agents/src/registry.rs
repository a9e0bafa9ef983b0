//! The agent registry: sole owner of every live agent.
//!
//! The registry maps [`AgentId`] to an owned agent body plus its species and
//! current cell. Cells hold identifiers only. Every operation that changes
//! where an agent lives (register, remove, move) updates the registry record
//! and the cell occupant sets together, so the two views never disagree.
//!
//! During a tick the engine *checks out* the acting agent's body so it can
//! hand the agent a mutable [`ActContext`](crate::ActContext) over the
//! registry. The record (id, species, cell) stays in place while the body is
//! out, so moves and lookups keep working.

use std::collections::BTreeMap;
use std::sync::Arc;

use terrarium_types::{AgentId, CellCoord, Species};
use terrarium_world::Grid;
use tracing::{debug, error, warn};

use crate::agent::{Agent, AgentSummary, PendingAgent, Vitals};
use crate::error::AgentError;
use crate::queue::MutationQueue;

#[derive(Debug)]
struct AgentRecord {
    species: Species,
    cell: Option<CellCoord>,
    body: Option<Box<dyn Agent>>,
}

/// Outcome of one [`AgentRegistry::drain_queues`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Live agents erased.
    pub removed: usize,
    /// Removal requests for identifiers that were already gone.
    pub missing: usize,
    /// Pending agents that became live.
    pub added: usize,
    /// Pending agents rejected because their identifier was taken.
    pub rejected: usize,
}

/// Owner of all live agents and the gateway for lifecycle changes.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, AgentRecord>,
    queue: Arc<MutationQueue>,
}

impl AgentRegistry {
    /// Create an empty registry with a fresh mutation queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the mutation queue, for enqueueing from other
    /// threads.
    pub fn queue_handle(&self) -> Arc<MutationQueue> {
        Arc::clone(&self.queue)
    }

    /// Issue a fresh, never-reused identifier.
    pub fn issue_id(&self) -> AgentId {
        self.queue.issue_id()
    }

    // -----------------------------------------------------------------------
    // Direct mutation (engine thread only)
    // -----------------------------------------------------------------------

    /// Make `pending` live and, if it names a cell, list it there.
    ///
    /// A cell coordinate outside the grid is not an error: the agent is
    /// registered without a cell and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateIdentifier`] if the identifier is
    /// already live. The pending agent is dropped in that case.
    pub fn register(&mut self, grid: &mut Grid, pending: PendingAgent) -> Result<(), AgentError> {
        let PendingAgent { id, cell, body } = pending;
        if self.agents.contains_key(&id) {
            return Err(AgentError::DuplicateIdentifier(id));
        }

        let placed = cell.and_then(|coord| {
            let slot = grid.cell_mut(coord);
            if slot.is_none() {
                warn!(agent_id = %id, %coord, "pending agent targets a cell off the grid; registering unplaced");
            }
            slot.map(|c| {
                c.insert_occupant(id);
                coord
            })
        });

        let species = body.species();
        self.agents.insert(
            id,
            AgentRecord {
                species,
                cell: placed,
                body: Some(body),
            },
        );
        Ok(())
    }

    /// Erase `id` from its cell and from the registry.
    ///
    /// Returns `false` (and does nothing) if `id` is not live, so repeated
    /// removal of the same identifier is harmless.
    pub fn remove(&mut self, grid: &mut Grid, id: AgentId) -> bool {
        let Some(record) = self.agents.remove(&id) else {
            return false;
        };
        if let Some(cell) = record.cell.and_then(|coord| grid.cell_mut(coord)) {
            cell.remove_occupant(id);
        }
        true
    }

    /// Move `id` to `destination`, updating both cells and the record.
    ///
    /// Returns `false` with no change if `id` is unknown or `destination`
    /// is off the grid.
    pub fn move_agent(&mut self, grid: &mut Grid, id: AgentId, destination: CellCoord) -> bool {
        let Some(record) = self.agents.get_mut(&id) else {
            return false;
        };
        if !grid.contains(destination) {
            return false;
        }
        if record.cell == Some(destination) {
            return true;
        }
        if let Some(source) = record.cell.and_then(|coord| grid.cell_mut(coord)) {
            source.remove_occupant(id);
        }
        if let Some(target) = grid.cell_mut(destination) {
            target.insert_occupant(id);
        }
        record.cell = Some(destination);
        true
    }

    // -----------------------------------------------------------------------
    // Deferred mutation
    // -----------------------------------------------------------------------

    /// Queue `pending` to become live at the next drain.
    pub fn enqueue_addition(&self, pending: PendingAgent) {
        self.queue.push_addition(pending);
    }

    /// Queue `id` for removal at the next drain.
    pub fn enqueue_removal(&self, id: AgentId) {
        self.queue.push_removal(id);
    }

    /// Whether `id` has a removal queued for the next drain.
    pub fn removal_pending(&self, id: AgentId) -> bool {
        self.queue.is_removal_pending(id)
    }

    /// Apply every queued removal, then every queued addition, in FIFO
    /// order within each, and leave both buffers empty.
    ///
    /// A duplicate identifier among the additions is an invariant violation:
    /// it is logged, counted in [`DrainReport::rejected`], and trips a debug
    /// assertion.
    pub fn drain_queues(&mut self, grid: &mut Grid) -> DrainReport {
        let drained = self.queue.take();
        let mut report = DrainReport::default();

        for id in drained.removals {
            if self.remove(grid, id) {
                report.removed = report.removed.saturating_add(1);
            } else {
                report.missing = report.missing.saturating_add(1);
            }
        }

        for pending in drained.additions {
            match self.register(grid, pending) {
                Ok(()) => report.added = report.added.saturating_add(1),
                Err(err) => {
                    error!(error = %err, "queued addition rejected");
                    report.rejected = report.rejected.saturating_add(1);
                }
            }
        }
        debug_assert_eq!(report.rejected, 0, "queued addition reused a live identifier");

        debug!(
            removed = report.removed,
            missing = report.missing,
            added = report.added,
            live = self.agents.len(),
            "mutation queues drained"
        );
        report
    }

    // -----------------------------------------------------------------------
    // Check-out for the agent pass
    // -----------------------------------------------------------------------

    /// Take the body of `id` out of the registry so it can act.
    ///
    /// The record stays live. Returns `None` if `id` is unknown or already
    /// checked out.
    pub fn checkout(&mut self, id: AgentId) -> Option<Box<dyn Agent>> {
        self.agents.get_mut(&id).and_then(|record| record.body.take())
    }

    /// Put a checked-out body back. Returns `false` (dropping the body) if
    /// the record no longer exists.
    pub fn checkin(&mut self, id: AgentId, body: Box<dyn Agent>) -> bool {
        match self.agents.get_mut(&id) {
            Some(record) => {
                record.body = Some(body);
                true
            }
            None => {
                warn!(agent_id = %id, "checked-out agent vanished before check-in");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether there are no live agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Whether `id` is live.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Live identifiers, ascending.
    pub fn live_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Current cell of `id`. `None` if unknown or unplaced.
    pub fn cell_of(&self, id: AgentId) -> Option<CellCoord> {
        self.agents.get(&id).and_then(|record| record.cell)
    }

    /// Species of `id`, if live.
    pub fn species_of(&self, id: AgentId) -> Option<Species> {
        self.agents.get(&id).map(|record| record.species)
    }

    /// Visible state of `id`. `None` if unknown or currently acting.
    pub fn vitals(&self, id: AgentId) -> Option<Vitals> {
        self.agents
            .get(&id)
            .and_then(|record| record.body.as_ref())
            .map(|body| body.vitals())
    }

    /// Apply an energy change to `id`. Returns `false` if it is unknown or
    /// currently acting.
    pub fn adjust_energy(&mut self, id: AgentId, delta: i32) -> bool {
        match self.agents.get_mut(&id).and_then(|record| record.body.as_mut()) {
            Some(body) => {
                body.adjust_energy(delta);
                true
            }
            None => false,
        }
    }

    /// Live agents listed in the cell at `coord`, ascending. Empty if the
    /// coordinate is off the grid.
    pub fn agents_at(&self, grid: &Grid, coord: CellCoord) -> Vec<AgentId> {
        grid.cell(coord)
            .map(|cell| cell.agent_ids().filter(|id| self.contains(*id)).collect())
            .unwrap_or_default()
    }

    /// Whether the cell at `coord` holds at least one live agent of
    /// `species`.
    pub fn has_species_at(&self, grid: &Grid, coord: CellCoord, species: Species) -> bool {
        grid.cell(coord).is_some_and(|cell| {
            cell.agent_ids()
                .any(|id| self.species_of(id) == Some(species))
        })
    }

    /// Number of live agents per species. Species with no agents are
    /// reported as zero.
    pub fn species_counts(&self) -> BTreeMap<Species, usize> {
        let mut counts: BTreeMap<Species, usize> =
            Species::ALL.iter().map(|&species| (species, 0)).collect();
        for record in self.agents.values() {
            let entry = counts.entry(record.species).or_insert(0);
            *entry = entry.saturating_add(1);
        }
        counts
    }

    /// Summaries of every live agent, ascending by identifier.
    pub fn summaries(&self) -> Vec<AgentSummary> {
        self.agents
            .iter()
            .map(|(&id, record)| AgentSummary {
                id,
                species: record.species,
                cell: record.cell,
                vitals: record.body.as_ref().map(|body| body.vitals()),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Check that the registry and the grid agree on where every agent is.
    ///
    /// For every live agent with a cell, that cell must list it; every
    /// identifier listed by any cell must be live and recorded at exactly
    /// that cell. Since each record names a single cell, this also rules out
    /// an identifier appearing in two cells.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn verify_consistency(&self, grid: &Grid) -> Result<(), AgentError> {
        for (&agent, record) in &self.agents {
            if let Some(expected) = record.cell {
                let listed = grid.cell(expected).is_some_and(|cell| cell.contains_agent(agent));
                if !listed {
                    let found = grid
                        .cells()
                        .find(|cell| cell.contains_agent(agent))
                        .map(terrarium_world::Cell::coord);
                    return Err(AgentError::CellDesync {
                        agent,
                        expected: Some(expected),
                        found,
                    });
                }
            }
        }

        for cell in grid.cells() {
            let coord = cell.coord();
            for agent in cell.agent_ids() {
                let record = self
                    .agents
                    .get(&agent)
                    .ok_or(AgentError::UnknownAgent(agent))?;
                match record.cell {
                    None => return Err(AgentError::UnplacedAgentInCell { agent, cell: coord }),
                    Some(expected) if expected != coord => {
                        return Err(AgentError::CellDesync {
                            agent,
                            expected: Some(expected),
                            found: Some(coord),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}
