//! Built-in species policies.
//!
//! Each species is a plain struct implementing [`Agent`]. Cross-species
//! checks go through [`Species`] tags and [`Vitals`](crate::Vitals), never
//! through downcasts.

pub mod bird;
pub mod tree;
pub mod worm;

pub use bird::Bird;
pub use tree::Tree;
pub use worm::Worm;

use terrarium_types::{Sex, Species};

use crate::agent::Agent;
use crate::config::SpeciesConfig;

/// Build a fresh agent of `species` with parameters from `config`.
///
/// `sex` is used only by species that have one.
pub fn new_agent(species: Species, config: &SpeciesConfig, sex: Sex) -> Box<dyn Agent> {
    match species {
        Species::Tree => Box::new(Tree::new(config.tree)),
        Species::Worm => Box::new(Worm::new(config.worm)),
        Species::Bird => Box::new(Bird::new(config.bird, sex)),
    }
}

/// Convert a non-negative amount to an energy delta, saturating.
pub(crate) fn as_delta(amount: u32) -> i32 {
    i32::try_from(amount).unwrap_or(i32::MAX)
}

/// Death roll shared by the mortal species: past `senescence_age`, draw from
/// `0..=roll_max` and die if the draw is below the years past senescence.
///
/// Draws only when the agent is past senescence.
pub(crate) fn senescence_roll(
    rng: &mut terrarium_world::SimRng,
    age: u32,
    senescence_age: u32,
    roll_max: u32,
) -> bool {
    if age <= senescence_age {
        return false;
    }
    let roll = rng.below(roll_max.saturating_add(1));
    roll < age.saturating_sub(senescence_age)
}

#[cfg(test)]
pub(crate) mod harness {
    //! A one-agent world for exercising species policies.

    #![allow(clippy::unwrap_used)]

    use terrarium_types::{AgentId, BoundaryMode, CellCoord};
    use terrarium_world::{Grid, SimRng};

    use crate::agent::{Agent, PendingAgent};
    use crate::context::ActContext;
    use crate::registry::AgentRegistry;

    pub(crate) struct World {
        pub(crate) grid: Grid,
        pub(crate) registry: AgentRegistry,
        pub(crate) rng: SimRng,
        pub(crate) tick: u64,
    }

    impl World {
        pub(crate) fn new(size: usize, seed: u64) -> Self {
            Self {
                grid: Grid::new(size, size, BoundaryMode::Toroidal).unwrap(),
                registry: AgentRegistry::new(),
                rng: SimRng::seed_from_u64(seed),
                tick: 0,
            }
        }

        pub(crate) fn place(&mut self, body: Box<dyn Agent>, cell: CellCoord) -> AgentId {
            let id = self.registry.issue_id();
            self.registry
                .register(&mut self.grid, PendingAgent::new(id, Some(cell), body))
                .unwrap();
            id
        }

        /// Run `prepare` and `act` for one agent without draining.
        pub(crate) fn turn(&mut self, id: AgentId) {
            let mut body = self.registry.checkout(id).unwrap();
            let cell = self.registry.cell_of(id);
            body.prepare(cell.and_then(|c| self.grid.cell(c)));
            let mut ctx = ActContext::new(
                id,
                self.tick,
                &mut self.grid,
                &mut self.registry,
                &mut self.rng,
            );
            body.act(&mut ctx);
            self.registry.checkin(id, body);
        }

        pub(crate) fn drain(&mut self) {
            self.registry.drain_queues(&mut self.grid);
            self.tick = self.tick.saturating_add(1);
        }
    }
}
