//! Birds: mobile predators that hunt surface worms and pair up by calling.
//!
//! A bird with enough energy is *calling*: it advertises itself as
//! receptive through [`Vitals::receptive`] and looks for a calling bird of
//! the opposite sex in its own cell, then within its vision range. A match
//! costs both parents energy and produces one offspring next to the caller.

use terrarium_types::{AgentId, CellCoord, Sex, Species};
use terrarium_world::Cell;

use super::senescence_roll;
use crate::agent::{Agent, Vitals};
use crate::config::BirdConfig;
use crate::context::ActContext;

/// A bird.
#[derive(Debug, Clone)]
pub struct Bird {
    energy: i32,
    age: u32,
    sex: Sex,
    config: BirdConfig,
}

impl Bird {
    /// A newborn bird of the given sex.
    pub const fn new(config: BirdConfig, sex: Sex) -> Self {
        Self {
            energy: config.initial_energy,
            age: 0,
            sex,
            config,
        }
    }

    /// This bird's sex.
    pub const fn sex(&self) -> Sex {
        self.sex
    }

    /// Whether this bird is advertising for a mate.
    pub const fn is_calling(&self) -> bool {
        self.energy >= self.config.reproduction_threshold
    }

    /// Try to catch a worm in the current cell. Costs energy either way.
    fn hunt(&mut self, ctx: &mut ActContext<'_>) -> bool {
        self.energy = self.energy.saturating_sub(self.config.hunt_cost);
        let Some(here) = ctx.cell() else {
            return false;
        };
        let prey = ctx.agents_at(here).into_iter().find(|&id| {
            ctx.species_of(id) == Some(Species::Worm)
                && !ctx.removal_pending(id)
                && ctx.vitals(id).is_some_and(|v| !v.burrowed)
        });
        let Some(prey) = prey else {
            return false;
        };
        self.energy = self
            .energy
            .saturating_add(self.config.prey_energy)
            .min(self.config.max_energy);
        ctx.remove(prey);
        true
    }

    fn fly(&mut self, ctx: &mut ActContext<'_>) {
        let moved = ctx.random_neighbor().is_some_and(|spot| ctx.move_to(spot));
        if moved {
            self.energy = self.energy.saturating_sub(self.config.move_cost);
        }
    }

    /// First calling bird of the opposite sex, searching the own cell and
    /// then the vision range in neighbor order, ascending id within a cell.
    fn answer_to_call(&self, ctx: &ActContext<'_>) -> Option<AgentId> {
        let here = ctx.cell()?;
        let wanted = Some(self.sex.opposite());
        std::iter::once(here)
            .chain(ctx.neighbors_within(self.config.vision_range))
            .flat_map(|coord: CellCoord| ctx.agents_at(coord))
            .find(|&id| {
                id != ctx.id()
                    && ctx.species_of(id) == Some(Species::Bird)
                    && !ctx.removal_pending(id)
                    && ctx
                        .vitals(id)
                        .is_some_and(|v| v.receptive && v.sex == wanted)
            })
    }

    fn mate(&mut self, ctx: &mut ActContext<'_>) {
        let Some(partner) = self.answer_to_call(ctx) else {
            return;
        };
        let cost = self.config.mating_cost;
        self.energy = self.energy.saturating_sub(cost);
        ctx.adjust_peer_energy(partner, cost.saturating_neg());

        // The chick goes next to the caller, else next to the partner.
        let nest = ctx.random_neighbor().or_else(|| {
            ctx.cell_of(partner)
                .and_then(|coord| ctx.random_neighbor_of(coord))
        });
        if let Some(nest) = nest {
            let sex = if ctx.rng().below(2) == 0 {
                Sex::Female
            } else {
                Sex::Male
            };
            ctx.spawn(Box::new(Self::new(self.config, sex)), nest);
        }
    }
}

impl Agent for Bird {
    fn species(&self) -> Species {
        Species::Bird
    }

    fn prepare(&mut self, _cell: Option<&Cell>) {
        self.age = self.age.saturating_add(1);
    }

    fn act(&mut self, ctx: &mut ActContext<'_>) {
        if self.energy <= 0 || self.age > self.config.max_age {
            ctx.remove_self();
            return;
        }

        if !self.hunt(ctx) {
            self.fly(ctx);
        }
        if self.is_calling() {
            self.mate(ctx);
        }

        if senescence_roll(
            ctx.rng(),
            self.age,
            self.config.senescence_age,
            self.config.death_roll_max,
        ) {
            ctx.remove_self();
        }
    }

    fn vitals(&self) -> Vitals {
        Vitals {
            age: self.age,
            energy: self.energy,
            sex: Some(self.sex),
            burrowed: false,
            receptive: self.is_calling(),
        }
    }

    fn adjust_energy(&mut self, delta: i32) {
        self.energy = self.energy.saturating_add(delta);
    }
}
