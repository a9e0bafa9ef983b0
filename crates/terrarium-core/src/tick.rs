//! The tick: one environment pass, one agent pass, one queue drain.
//!
//! Each call to [`Simulation::run_tick`] runs these phases in order:
//!
//! 1. **Environment** -- every cell, row-major, applies its weather's water
//!    effects and draws its next weather from the climate.
//!
//! 2. **Agents** -- the live identifiers are snapshotted (ascending, or
//!    shuffled with the shared RNG) and each agent still live is given
//!    `prepare()` then `act()`. Lifecycle changes raised here are queued.
//!
//! 3. **Drain** -- queued removals, then queued additions, are applied.
//!    Agents added during this tick are first visited next tick.
//!
//! 4. **Advance** -- the tick counter is incremented.
//!
//! A tick, once started, always runs to completion.

use serde::Serialize;
use terrarium_agents::{ActContext, AgentRegistry, DrainReport, PendingAgent};
use terrarium_types::{AgentId, AgentOrder};
use terrarium_world::{Climate, Grid, SimRng, WorldError};
use tracing::{debug, error, warn};

use crate::config::SimulationConfig;

/// Errors that can occur while running a tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickError {
    /// The tick counter cannot advance past `u64::MAX`.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Tick counter after this tick (the number of completed ticks).
    pub tick: u64,
    /// Agents that were given a turn.
    pub agents_acted: usize,
    /// Live agents after the drain.
    pub agents_alive: usize,
    /// Agents that became live at the drain.
    pub added: usize,
    /// Agents erased at the drain.
    pub removed: usize,
}

/// The whole simulated world plus the tick counter.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    registry: AgentRegistry,
    climate: Climate,
    rng: SimRng,
    order: AgentOrder,
    tick: u64,
}

impl Simulation {
    /// Assemble a simulation at tick 0 with no agents.
    pub fn new(grid: Grid, climate: Climate, rng: SimRng, order: AgentOrder) -> Self {
        Self {
            grid,
            registry: AgentRegistry::new(),
            climate,
            rng,
            order,
            tick: 0,
        }
    }

    /// Build an empty simulation from configuration.
    ///
    /// Climate rows whose probabilities do not sum to 1.0 are logged with
    /// `warn!` here, once per row.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if the configured grid has a
    /// zero dimension.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, WorldError> {
        let grid = Grid::new(config.world.height, config.world.width, config.world.boundary)?;
        for (weather, total) in config.climate.unnormalized_rows() {
            warn!(
                climate = %config.climate.name,
                %weather,
                total,
                "transition row does not sum to 1.0; cells may keep their weather"
            );
        }
        Ok(Self::new(
            grid,
            config.climate.clone(),
            SimRng::seed_from_u64(config.world.seed),
            config.schedule.agent_order,
        ))
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// Number of completed ticks.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The lattice.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The agent registry.
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// The climate policy.
    pub const fn climate(&self) -> &Climate {
        &self.climate
    }

    /// Agent visiting order.
    pub const fn order(&self) -> AgentOrder {
        self.order
    }

    /// Number of values drawn from the shared random stream so far.
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    // -----------------------------------------------------------------------
    // Seeding (between ticks)
    // -----------------------------------------------------------------------

    /// The shared random stream, for seeding routines run between ticks.
    pub const fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Issue a fresh agent identifier.
    pub fn issue_id(&self) -> AgentId {
        self.registry.issue_id()
    }

    /// Queue an agent to become live at the next drain.
    pub fn enqueue_addition(&self, pending: PendingAgent) {
        self.registry.enqueue_addition(pending);
    }

    /// Drain the mutation queues outside of a tick (e.g. after seeding).
    pub fn apply_pending(&mut self) -> DrainReport {
        self.registry.drain_queues(&mut self.grid)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one full tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::TickOverflow`] if the counter is already at
    /// `u64::MAX`. The tick's effects have been applied in that case.
    pub fn run_tick(&mut self) -> Result<TickSummary, TickError> {
        let tick = self.tick;

        // --- Environment ---
        self.grid.update_environment(&self.climate, &mut self.rng);

        // --- Agents ---
        let mut visiting = self.registry.live_ids();
        if self.order == AgentOrder::Shuffled {
            self.rng.shuffle(&mut visiting);
        }

        let mut agents_acted: usize = 0;
        for id in visiting {
            // Every snapshotted id is still live: removals wait for the drain.
            let Some(mut body) = self.registry.checkout(id) else {
                continue;
            };
            let cell = self.registry.cell_of(id).and_then(|coord| self.grid.cell(coord));
            body.prepare(cell);

            let mut ctx = ActContext::new(id, tick, &mut self.grid, &mut self.registry, &mut self.rng);
            body.act(&mut ctx);

            self.registry.checkin(id, body);
            agents_acted = agents_acted.saturating_add(1);
        }

        // --- Drain ---
        let drained = self.registry.drain_queues(&mut self.grid);
        let consistency = if cfg!(debug_assertions) {
            self.registry.verify_consistency(&self.grid)
        } else {
            Ok(())
        };
        if let Err(err) = &consistency {
            error!(tick, error = %err, "registry and grid disagree after drain");
        }
        debug_assert!(consistency.is_ok(), "registry/grid desync: {consistency:?}");

        // --- Advance ---
        self.tick = tick.checked_add(1).ok_or(TickError::TickOverflow)?;

        let summary = TickSummary {
            tick: self.tick,
            agents_acted,
            agents_alive: self.registry.len(),
            added: drained.added,
            removed: drained.removed,
        };
        debug!(
            tick = summary.tick,
            agents_acted = summary.agents_acted,
            agents_alive = summary.agents_alive,
            added = summary.added,
            removed = summary.removed,
            "tick complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use terrarium_agents::{Agent, Vitals};
    use terrarium_types::{BoundaryMode, CellCoord, Species};
    use terrarium_world::Cell;

    use super::*;

    /// Records the ticks in which it acted, and spawns one child on its
    /// first turn.
    #[derive(Debug)]
    struct Diary {
        log: Arc<Mutex<Vec<(AgentId, u64)>>>,
        breed: bool,
    }

    impl Agent for Diary {
        fn species(&self) -> Species {
            Species::Worm
        }

        fn prepare(&mut self, _cell: Option<&Cell>) {}

        fn act(&mut self, ctx: &mut ActContext<'_>) {
            self.log.lock().unwrap().push((ctx.id(), ctx.tick()));
            if self.breed {
                self.breed = false;
                let child = Self {
                    log: Arc::clone(&self.log),
                    breed: false,
                };
                let here = ctx.cell().unwrap();
                ctx.spawn(Box::new(child), here);
            }
        }

        fn vitals(&self) -> Vitals {
            Vitals::default()
        }
    }

    fn simulation(order: AgentOrder) -> Simulation {
        Simulation::new(
            Grid::new(3, 3, BoundaryMode::Toroidal).unwrap(),
            Climate::temperate(),
            SimRng::seed_from_u64(42),
            order,
        )
    }

    fn seed(sim: &mut Simulation, log: &Arc<Mutex<Vec<(AgentId, u64)>>>, count: usize) {
        for _ in 0..count {
            let id = sim.issue_id();
            let body = Diary {
                log: Arc::clone(log),
                breed: true,
            };
            sim.enqueue_addition(PendingAgent::new(id, Some(CellCoord::new(0, 0)), Box::new(body)));
        }
        sim.apply_pending();
    }

    #[test]
    fn additions_are_not_visited_in_their_own_tick() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sim = simulation(AgentOrder::ById);
        seed(&mut sim, &log, 1);

        let first = sim.run_tick().unwrap();
        assert_eq!(first.agents_acted, 1);
        assert_eq!(first.added, 1);
        assert_eq!(first.agents_alive, 2);

        let second = sim.run_tick().unwrap();
        assert_eq!(second.agents_acted, 2);
        assert_eq!(sim.tick(), 2);

        let entries = log.lock().unwrap().clone();
        let child = AgentId(2);
        assert!(!entries.contains(&(child, 0)));
        assert!(entries.contains(&(child, 1)));
    }

    #[test]
    fn id_order_is_ascending() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sim = simulation(AgentOrder::ById);
        seed(&mut sim, &log, 5);
        sim.run_tick().unwrap();
        let ids: Vec<AgentId> = log.lock().unwrap().iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn shuffled_order_visits_everyone_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sim = simulation(AgentOrder::Shuffled);
        seed(&mut sim, &log, 8);
        sim.run_tick().unwrap();
        let mut ids: Vec<AgentId> = log.lock().unwrap().iter().map(|(id, _)| *id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn environment_pass_draws_once_per_cell() {
        let mut sim = simulation(AgentOrder::ById);
        sim.run_tick().unwrap();
        assert_eq!(sim.rng_draws(), 9);
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn counter_overflow_is_reported() {
        let mut sim = simulation(AgentOrder::ById);
        sim.tick = u64::MAX;
        assert_eq!(sim.run_tick(), Err(TickError::TickOverflow));
    }
}
