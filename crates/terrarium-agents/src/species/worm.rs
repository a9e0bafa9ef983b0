//! Worms: soil dwellers that eat nutrients and burrow in dry weather.

use terrarium_types::{Species, Weather};
use terrarium_world::Cell;

use super::{as_delta, senescence_roll};
use crate::agent::{Agent, Vitals};
use crate::config::WormConfig;
use crate::context::ActContext;

/// A worm.
#[derive(Debug, Clone)]
pub struct Worm {
    energy: i32,
    age: u32,
    burrowed: bool,
    config: WormConfig,
}

impl Worm {
    /// A newborn worm with the configured starting energy.
    pub const fn new(config: WormConfig) -> Self {
        Self {
            energy: config.initial_energy,
            age: 0,
            burrowed: false,
            config,
        }
    }

    /// Whether the worm is underground (and out of reach of birds).
    pub const fn is_burrowed(&self) -> bool {
        self.burrowed
    }

    /// Return the worm's body to the soil and leave.
    fn die(&self, ctx: &mut ActContext<'_>) {
        if let Some(cell) = ctx.cell_state_mut() {
            cell.modify_nutrients(as_delta(self.age));
        }
        ctx.remove_self();
    }

    fn eat(&mut self, ctx: &mut ActContext<'_>) {
        let Some(cell) = ctx.cell_state_mut() else {
            return;
        };
        let eaten = cell.nutrients().min(self.config.bite);
        if eaten == 0 {
            return;
        }
        cell.modify_nutrients(as_delta(eaten).saturating_neg());
        self.energy = self
            .energy
            .saturating_add(as_delta(eaten))
            .min(self.config.max_energy);
    }

    fn reproduce(&mut self, ctx: &mut ActContext<'_>) {
        if let Some(spot) = ctx.random_neighbor() {
            ctx.spawn(Box::new(Self::new(self.config)), spot);
            self.energy = self.energy.saturating_sub(self.config.reproduction_cost);
        }
    }

    fn crawl(&mut self, ctx: &mut ActContext<'_>) {
        let moved = ctx.random_neighbor().is_some_and(|spot| ctx.move_to(spot));
        if moved {
            self.energy = self.energy.saturating_sub(1);
        }
    }
}

impl Agent for Worm {
    fn species(&self) -> Species {
        Species::Worm
    }

    fn prepare(&mut self, cell: Option<&Cell>) {
        self.age = self.age.saturating_add(1);
        self.energy = self.energy.saturating_sub(1);
        if let Some(cell) = cell {
            self.burrowed = matches!(cell.weather(), Weather::Drought | Weather::Sunny);
        }
    }

    fn act(&mut self, ctx: &mut ActContext<'_>) {
        if self.energy <= 0 || self.age > self.config.max_age {
            self.die(ctx);
            return;
        }

        self.eat(ctx);
        if self.energy >= self.config.reproduction_threshold {
            self.reproduce(ctx);
        }
        self.crawl(ctx);

        if senescence_roll(
            ctx.rng(),
            self.age,
            self.config.senescence_age,
            self.config.death_roll_max,
        ) {
            self.die(ctx);
        }
    }

    fn vitals(&self) -> Vitals {
        Vitals {
            age: self.age,
            energy: self.energy,
            burrowed: self.burrowed,
            ..Vitals::default()
        }
    }

    fn adjust_energy(&mut self, delta: i32) {
        self.energy = self.energy.saturating_add(delta);
    }
}
