//! Population seeding before the engine loop starts.
//!
//! Trees, then worms, then birds are placed at uniformly random cells. Each
//! agent costs two draws from the shared stream (row, then column). Every
//! agent is queued as an addition and the queue is drained once at the end,
//! so the first tick sees the whole population.

use terrarium_agents::{PendingAgent, SpeciesConfig, new_agent};
use terrarium_core::Simulation;
use terrarium_core::config::PopulationConfig;
use terrarium_types::{CellCoord, Sex, Species};
use tracing::info;

use crate::error::EngineError;

/// Outcome of seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    /// Trees placed.
    pub trees: usize,
    /// Worms placed.
    pub worms: usize,
    /// Birds placed.
    pub birds: usize,
}

impl SeedReport {
    /// Agents placed across all species.
    pub const fn total(&self) -> usize {
        self.trees.saturating_add(self.worms).saturating_add(self.birds)
    }
}

/// Seed `simulation` with the configured population.
///
/// Birds alternate female, male, female, and so on, so any flock of two or
/// more can breed.
pub fn seed_population(
    simulation: &mut Simulation,
    population: &PopulationConfig,
    species: &SpeciesConfig,
) -> Result<SeedReport, EngineError> {
    let plan = [
        (Species::Tree, population.trees),
        (Species::Worm, population.worms),
        (Species::Bird, population.birds),
    ];

    for (kind, count) in plan {
        for n in 0..count {
            let coord = random_cell(simulation)?;
            let sex = if n % 2 == 0 { Sex::Female } else { Sex::Male };
            let id = simulation.issue_id();
            simulation.enqueue_addition(PendingAgent::new(
                id,
                Some(coord),
                new_agent(kind, species, sex),
            ));
        }
    }

    let drained = simulation.apply_pending();
    let counts = simulation.registry().species_counts();
    let count_of = |kind: Species| counts.get(&kind).copied().unwrap_or(0);
    let report = SeedReport {
        trees: count_of(Species::Tree),
        worms: count_of(Species::Worm),
        birds: count_of(Species::Bird),
    };
    if drained.rejected > 0 {
        return Err(EngineError::Spawner {
            message: format!("{} seeded agents were rejected", drained.rejected),
        });
    }

    info!(
        trees = report.trees,
        worms = report.worms,
        birds = report.birds,
        rng_draws = simulation.rng_draws(),
        "population seeded"
    );
    Ok(report)
}

/// Draw a row, then a column.
fn random_cell(simulation: &mut Simulation) -> Result<CellCoord, EngineError> {
    let height = simulation.grid().height();
    let width = simulation.grid().width();
    let rng = simulation.rng_mut();
    let row = rng.index(height);
    let col = rng.index(width);
    match (row, col) {
        (Some(row), Some(col)) => Ok(CellCoord::new(row, col)),
        _ => Err(EngineError::Spawner {
            message: format!("cannot place agents on a {height}x{width} grid"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use terrarium_core::SimulationConfig;

    use super::*;

    fn config(trees: u32, worms: u32, birds: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.height = 4;
        config.world.width = 6;
        config.population = PopulationConfig {
            trees,
            worms,
            birds,
        };
        config
    }

    fn seeded(config: &SimulationConfig) -> (Simulation, SeedReport) {
        let mut sim = Simulation::from_config(config).unwrap();
        let report = seed_population(&mut sim, &config.population, &config.species).unwrap();
        (sim, report)
    }

    #[test]
    fn places_the_configured_population() {
        let (sim, report) = seeded(&config(3, 7, 4));
        assert_eq!(report, SeedReport { trees: 3, worms: 7, birds: 4 });
        assert_eq!(report.total(), 14);
        assert_eq!(sim.registry().len(), 14);
        assert_eq!(sim.tick(), 0);
        sim.registry().verify_consistency(sim.grid()).unwrap();
    }

    #[test]
    fn every_agent_is_placed_on_the_grid() {
        let (sim, _) = seeded(&config(5, 5, 5));
        for id in sim.registry().live_ids() {
            let coord = sim.registry().cell_of(id).unwrap();
            assert!(sim.grid().contains(coord));
        }
    }

    #[test]
    fn two_draws_per_agent() {
        let (sim, _) = seeded(&config(2, 3, 1));
        assert_eq!(sim.rng_draws(), 12);
    }

    #[test]
    fn birds_alternate_sex() {
        let (sim, _) = seeded(&config(0, 0, 4));
        let sexes: Vec<Option<Sex>> = sim
            .registry()
            .live_ids()
            .into_iter()
            .map(|id| sim.registry().vitals(id).unwrap().sex)
            .collect();
        assert_eq!(
            sexes,
            vec![Some(Sex::Female), Some(Sex::Male), Some(Sex::Female), Some(Sex::Male)]
        );
    }

    #[test]
    fn same_seed_same_layout() {
        let (a, _) = seeded(&config(4, 4, 4));
        let (b, _) = seeded(&config(4, 4, 4));
        let cells = |sim: &Simulation| {
            sim.registry()
                .live_ids()
                .into_iter()
                .map(|id| sim.registry().cell_of(id))
                .collect::<Vec<_>>()
        };
        assert_eq!(cells(&a), cells(&b));
    }

    #[test]
    fn empty_population_is_fine() {
        let (sim, report) = seeded(&config(0, 0, 0));
        assert_eq!(report.total(), 0);
        assert!(sim.registry().is_empty());
    }
}
