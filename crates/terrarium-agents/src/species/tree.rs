//! Trees: stationary producers living off soil water and nutrients.

use terrarium_types::Species;
use terrarium_world::Cell;

use super::as_delta;
use crate::agent::{Agent, Vitals};
use crate::config::TreeConfig;
use crate::context::ActContext;

/// A tree rooted in one cell.
#[derive(Debug, Clone)]
pub struct Tree {
    health: i32,
    age: u32,
    config: TreeConfig,
}

impl Tree {
    /// A seedling with the configured starting health.
    pub const fn new(config: TreeConfig) -> Self {
        Self {
            health: config.initial_health,
            age: 0,
            config,
        }
    }

    /// Current health.
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Draw from the soil. Only a fully fed tree ages.
    fn grow(&mut self, cell: &mut Cell) {
        let wet = cell.soil_saturation() > 0;
        let fed = cell.nutrients() > 0;
        if wet {
            cell.modify_soil_saturation(-1);
        }
        if fed {
            cell.modify_nutrients(-1);
        }
        let change = match (wet, fed) {
            (true, true) => {
                self.age = self.age.saturating_add(1);
                self.config.growth_gain
            }
            (true, false) | (false, true) => self.config.scarcity_loss.saturating_neg(),
            (false, false) => self.config.barren_loss.saturating_neg(),
        };
        self.health = self.health.saturating_add(change);
    }

    fn reproduce(&mut self, ctx: &mut ActContext<'_>) {
        if self.health <= self.config.reproduction_threshold {
            return;
        }
        if let Some(spot) = ctx.random_neighbor() {
            ctx.spawn(Box::new(Self::new(self.config)), spot);
            self.health = self.health.saturating_sub(self.config.reproduction_cost);
        }
    }

    fn decay(&self, ctx: &mut ActContext<'_>) {
        if self.health > 0 {
            return;
        }
        let returned = self.age.checked_div(self.config.decay_divisor).unwrap_or(0);
        if let Some(cell) = ctx.cell_state_mut() {
            cell.modify_nutrients(as_delta(returned));
        }
        ctx.remove_self();
    }
}

impl Agent for Tree {
    fn species(&self) -> Species {
        Species::Tree
    }

    fn prepare(&mut self, _cell: Option<&Cell>) {}

    fn act(&mut self, ctx: &mut ActContext<'_>) {
        let Some(cell) = ctx.cell_state_mut() else {
            return;
        };
        self.grow(cell);
        self.reproduce(ctx);
        self.decay(ctx);
    }

    fn vitals(&self) -> Vitals {
        Vitals {
            age: self.age,
            energy: self.health,
            ..Vitals::default()
        }
    }
}
