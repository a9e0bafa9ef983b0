//! One lattice location: environmental state plus the set of agents present.
//!
//! A [`Cell`] never owns agents. It stores [`AgentId`]s only, and the agent
//! registry is the one component that inserts or removes them so that the
//! registry's "current cell" record and the cell's occupant set always agree.

use std::collections::BTreeSet;

use serde::Serialize;
use terrarium_types::{AgentId, CellCoord, Weather};

use crate::climate::Climate;
use crate::rng::SimRng;

/// Starting nutrient level of a fresh cell.
pub const DEFAULT_NUTRIENTS: u32 = 10;

/// Starting soil saturation of a fresh cell.
pub const DEFAULT_SOIL_SATURATION: u32 = 10;

/// Upper bound on soil saturation.
pub const DEFAULT_MAX_SOIL_SATURATION: u32 = 100;

/// Mutable state of a single lattice location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    coord: CellCoord,
    weather: Weather,
    water: u32,
    nutrients: u32,
    soil_saturation: u32,
    max_soil_saturation: u32,
    occupants: BTreeSet<AgentId>,
}

/// Read-only summary of a cell, used by snapshots and the `dump` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSummary {
    /// Cell coordinate.
    pub coord: CellCoord,
    /// Current weather.
    pub weather: Weather,
    /// Surface water.
    pub water: u32,
    /// Nutrients in the soil.
    pub nutrients: u32,
    /// Soil saturation.
    pub soil_saturation: u32,
    /// Identifiers of the agents present, ascending.
    pub agents: Vec<AgentId>,
}

impl Cell {
    /// Create a cell with default environmental state and sunny weather.
    pub const fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            weather: Weather::Sunny,
            water: 0,
            nutrients: DEFAULT_NUTRIENTS,
            soil_saturation: DEFAULT_SOIL_SATURATION,
            max_soil_saturation: DEFAULT_MAX_SOIL_SATURATION,
            occupants: BTreeSet::new(),
        }
    }

    /// This cell's coordinate.
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Current weather.
    pub const fn weather(&self) -> Weather {
        self.weather
    }

    /// Force the weather state.
    pub const fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    /// Surface water.
    pub const fn water(&self) -> u32 {
        self.water
    }

    /// Nutrients in the soil.
    pub const fn nutrients(&self) -> u32 {
        self.nutrients
    }

    /// Soil saturation, in `0..=max_soil_saturation`.
    pub const fn soil_saturation(&self) -> u32 {
        self.soil_saturation
    }

    /// Upper bound on soil saturation.
    pub const fn max_soil_saturation(&self) -> u32 {
        self.max_soil_saturation
    }

    /// Add `delta` to surface water, clamping at zero.
    pub const fn modify_water(&mut self, delta: i32) {
        self.water = self.water.saturating_add_signed(delta);
    }

    /// Add `delta` to nutrients, clamping at zero.
    pub const fn modify_nutrients(&mut self, delta: i32) {
        self.nutrients = self.nutrients.saturating_add_signed(delta);
    }

    /// Add `delta` to soil saturation, clamping to `[0, max]`.
    pub fn modify_soil_saturation(&mut self, delta: i32) {
        self.soil_saturation = self
            .soil_saturation
            .saturating_add_signed(delta)
            .min(self.max_soil_saturation);
    }

    /// Advance this cell's environment by one tick.
    ///
    /// Applies the current weather's water delta, then evaporation (rounded
    /// toward zero), then moves one unit of water into the soil if there is
    /// water and room for it. Finally draws exactly one uniform value and
    /// selects the next weather from the climate's transition row; if no
    /// state meets the draw the weather is left unchanged.
    pub fn update_environment(&mut self, climate: &Climate, rng: &mut SimRng) {
        if let Some(effects) = climate.effects_for(self.weather) {
            self.modify_water(effects.water_change);
            let evaporated = evaporation(self.water, effects.evaporation_rate);
            self.water = self.water.saturating_sub(evaporated);
        }

        if self.water > 0 && self.soil_saturation < self.max_soil_saturation {
            self.soil_saturation = self.soil_saturation.saturating_add(1);
            self.water = self.water.saturating_sub(1);
        }

        let draw = rng.unit();
        if let Some(next) = climate.next_weather(self.weather, draw) {
            self.weather = next;
        }
    }

    // -----------------------------------------------------------------------
    // Occupants (maintained by the agent registry)
    // -----------------------------------------------------------------------

    /// Whether `agent` is recorded in this cell.
    pub fn contains_agent(&self, agent: AgentId) -> bool {
        self.occupants.contains(&agent)
    }

    /// Identifiers present in this cell, ascending.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.occupants.iter().copied()
    }

    /// Number of agents present.
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    /// Record `agent` as present. Returns `false` if it already was.
    ///
    /// Only the agent registry should call this, as one half of a paired
    /// registry/cell update.
    pub fn insert_occupant(&mut self, agent: AgentId) -> bool {
        self.occupants.insert(agent)
    }

    /// Forget `agent`. Returns `false` if it was not present.
    ///
    /// Only the agent registry should call this, as one half of a paired
    /// registry/cell update.
    pub fn remove_occupant(&mut self, agent: AgentId) -> bool {
        self.occupants.remove(&agent)
    }

    /// Build a read-only summary of this cell.
    pub fn summary(&self) -> CellSummary {
        CellSummary {
            coord: self.coord,
            weather: self.weather,
            water: self.water,
            nutrients: self.nutrients,
            soil_saturation: self.soil_saturation,
            agents: self.occupants.iter().copied().collect(),
        }
    }
}

/// Water lost to evaporation, `trunc(water * rate)`, never more than `water`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn evaporation(water: u32, rate: f64) -> u32 {
    let lost = (f64::from(water) * rate.clamp(0.0, 1.0)).trunc();
    // Float-to-int `as` saturates; the clamp keeps the result within `water`.
    (lost as u32).min(water)
}
