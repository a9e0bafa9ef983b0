//! Read-only views of the world for the control surface.
//!
//! The engine thread owns the [`Simulation`]; other threads never touch it.
//! Instead, [`SnapshotPublisher`] captures a [`WorldSnapshot`] after every
//! tick and stores it behind an `Arc<RwLock<_>>` that control threads read.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use terrarium_agents::AgentSummary;
use terrarium_types::{BoundaryMode, Species, Weather};
use terrarium_world::{Cell, CellSummary};
use tracing::debug;

use crate::runner::TickCallback;
use crate::tick::{Simulation, TickSummary};

/// Complete view of the world at the end of a tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldSnapshot {
    /// Completed ticks when captured.
    pub tick: u64,
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    /// Edge behavior.
    pub boundary: BoundaryMode,
    /// Every cell, row-major.
    pub cells: Vec<CellSummary>,
    /// Whether each cell, row-major, holds a live tree.
    pub wooded: Vec<bool>,
    /// Every live agent, by ascending identifier.
    pub agents: Vec<AgentSummary>,
    /// Cells per weather state.
    pub weather_counts: BTreeMap<Weather, usize>,
    /// Live agents per species.
    pub species_counts: BTreeMap<Species, usize>,
    /// Values drawn from the shared random stream so far.
    pub rng_draws: u64,
}

impl WorldSnapshot {
    /// Capture the current state of `simulation`.
    pub fn capture(simulation: &Simulation) -> Self {
        let grid = simulation.grid();
        let registry = simulation.registry();
        Self {
            tick: simulation.tick(),
            height: grid.height(),
            width: grid.width(),
            boundary: grid.boundary(),
            cells: grid.cells().map(Cell::summary).collect(),
            wooded: grid
                .coords()
                .map(|coord| registry.has_species_at(grid, coord, Species::Tree))
                .collect(),
            agents: registry.summaries(),
            weather_counts: grid.weather_counts(),
            species_counts: registry.species_counts(),
            rng_draws: simulation.rng_draws(),
        }
    }

    /// Text map of the grid: `T` for a cell holding a tree, `.` otherwise,
    /// one line per row.
    pub fn render_grid(&self) -> String {
        let mut out = String::with_capacity(self.cells.len().saturating_add(self.height));
        for row in self.wooded.chunks(self.width.max(1)) {
            for &tree in row {
                out.push(if tree { 'T' } else { '.' });
            }
            out.push('\n');
        }
        out
    }

    /// Human-readable weather and population counts plus soil totals.
    pub fn metrics_report(&self) -> String {
        let water: u64 = self.cells.iter().map(|c| u64::from(c.water)).sum();
        let nutrients: u64 = self.cells.iter().map(|c| u64::from(c.nutrients)).sum();
        let saturation: u64 = self.cells.iter().map(|c| u64::from(c.soil_saturation)).sum();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "tick {} ({}x{} {})",
            self.tick,
            self.height,
            self.width,
            self.boundary_label()
        );
        let _ = writeln!(out, "agents: {}", self.agents.len());
        for (species, count) in &self.species_counts {
            let _ = writeln!(out, "  {species:<8} {count}");
        }
        let _ = writeln!(out, "weather:");
        for (weather, count) in &self.weather_counts {
            let _ = writeln!(out, "  {weather:<8} {count}");
        }
        let _ = writeln!(out, "soil: water {water}, nutrients {nutrients}, saturation {saturation}");
        let _ = writeln!(out, "rng draws: {}", self.rng_draws);
        out
    }

    const fn boundary_label(&self) -> &'static str {
        match self.boundary {
            BoundaryMode::Toroidal => "toroidal",
            BoundaryMode::Bounded => "bounded",
        }
    }

    /// Pretty-printed JSON of the whole snapshot.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Tick callback that publishes a fresh [`WorldSnapshot`] after every tick.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPublisher {
    shared: Arc<RwLock<WorldSnapshot>>,
}

impl SnapshotPublisher {
    /// Create a publisher whose snapshot starts as `initial`.
    pub fn new(initial: WorldSnapshot) -> Self {
        Self {
            shared: Arc::new(RwLock::new(initial)),
        }
    }

    /// Handle for readers on other threads.
    pub fn handle(&self) -> Arc<RwLock<WorldSnapshot>> {
        Arc::clone(&self.shared)
    }

    /// A copy of the latest snapshot.
    pub fn latest(&self) -> WorldSnapshot {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TickCallback for SnapshotPublisher {
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        let snapshot = WorldSnapshot::capture(simulation);
        *self.shared.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        debug!(tick = summary.tick, "snapshot published");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use terrarium_agents::{PendingAgent, SpeciesConfig, new_agent};
    use terrarium_types::{AgentOrder, CellCoord, Sex};
    use terrarium_world::{Climate, Grid, SimRng};

    use super::*;

    fn populated() -> Simulation {
        let mut sim = Simulation::new(
            Grid::new(2, 3, BoundaryMode::Toroidal).unwrap(),
            Climate::temperate(),
            SimRng::seed_from_u64(7),
            AgentOrder::ById,
        );
        let config = SpeciesConfig::default();
        for (species, coord) in [
            (Species::Tree, CellCoord::new(0, 1)),
            (Species::Worm, CellCoord::new(1, 0)),
            (Species::Tree, CellCoord::new(1, 2)),
        ] {
            let id = sim.issue_id();
            let body = new_agent(species, &config, Sex::Female);
            sim.enqueue_addition(PendingAgent::new(id, Some(coord), body));
        }
        sim.apply_pending();
        sim
    }

    #[test]
    fn capture_reflects_the_world() {
        let snapshot = WorldSnapshot::capture(&populated());
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.cells.len(), 6);
        assert_eq!(snapshot.agents.len(), 3);
        assert_eq!(snapshot.species_counts.get(&Species::Tree), Some(&2));
        assert_eq!(snapshot.species_counts.get(&Species::Bird), Some(&0));
        assert_eq!(snapshot.weather_counts.values().sum::<usize>(), 6);
    }

    #[test]
    fn grid_marks_tree_cells_only() {
        let snapshot = WorldSnapshot::capture(&populated());
        assert_eq!(snapshot.wooded, vec![false, true, false, false, false, true]);
        assert_eq!(snapshot.render_grid(), ".T.\n..T\n");
    }

    #[test]
    fn metrics_and_json_mention_counts() {
        let snapshot = WorldSnapshot::capture(&populated());
        let report = snapshot.metrics_report();
        assert!(report.contains("agents: 3"));
        assert!(report.contains("2x3 toroidal"));

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["width"], 3);
        assert_eq!(json["species_counts"]["tree"], 2);
    }

    #[test]
    fn publisher_replaces_the_shared_snapshot() {
        let mut sim = populated();
        let mut publisher = SnapshotPublisher::default();
        let reader = publisher.handle();
        let summary = sim.run_tick().unwrap();
        publisher.on_tick(&summary, &sim);
        assert_eq!(reader.read().unwrap().tick, 1);
        assert_eq!(publisher.latest().tick, 1);
    }
}
