//! Configuration loading and typed config structures for the Terrarium
//! simulation.
//!
//! The configuration lives in `terrarium-config.yaml`. Every section and
//! every field has a default, so an empty file (or no file at all) yields
//! the stock 10x10 toroidal world seeded with 100 trees, 1000 worms, and 50
//! birds.

use std::path::Path;

use serde::Deserialize;
use terrarium_agents::SpeciesConfig;
use terrarium_types::{AgentOrder, BoundaryMode};
use terrarium_world::Climate;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible world.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Lattice shape and random seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Tick loop scheduling.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Weather effects and transitions.
    #[serde(default)]
    pub climate: Climate,

    /// Species tunables.
    #[serde(default)]
    pub species: SpeciesConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if it fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if it fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for impossible values.
    ///
    /// Climate rows whose probabilities do not sum to 1.0 are legal (a cell
    /// may then keep its weather on a high draw). They are reported when a
    /// [`Simulation`](crate::Simulation) is built from the config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either grid dimension is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.height == 0 || self.world.width == 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "world must be at least 1x1, got {}x{}",
                    self.world.height, self.world.width
                ),
            });
        }
        Ok(())
    }
}

/// Lattice shape and random seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Number of rows (default: 10).
    #[serde(default = "default_height")]
    pub height: usize,

    /// Number of columns (default: 10).
    #[serde(default = "default_width")]
    pub width: usize,

    /// Edge behavior (default: toroidal).
    #[serde(default)]
    pub boundary: BoundaryMode,

    /// Seed for the shared random stream (default: 42).
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            height: default_height(),
            width: default_width(),
            boundary: BoundaryMode::default(),
            seed: default_seed(),
        }
    }
}

const fn default_height() -> usize {
    10
}

const fn default_width() -> usize {
    10
}

const fn default_seed() -> u64 {
    42
}

/// Initial population, placed at uniformly random cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of trees (default: 100).
    #[serde(default = "default_trees")]
    pub trees: u32,

    /// Number of worms (default: 1000).
    #[serde(default = "default_worms")]
    pub worms: u32,

    /// Number of birds (default: 50).
    #[serde(default = "default_birds")]
    pub birds: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            worms: default_worms(),
            birds: default_birds(),
        }
    }
}

const fn default_trees() -> u32 {
    100
}

const fn default_worms() -> u32 {
    1000
}

const fn default_birds() -> u32 {
    50
}

/// Tick loop scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ScheduleConfig {
    /// Agent visiting order (default: `by_id`).
    #[serde(default)]
    pub agent_order: AgentOrder,

    /// Delay between free-running ticks in milliseconds (default: 0).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks; 0 means unlimited (default: 0).
    #[serde(default)]
    pub max_ticks: u64,

    /// Start free-running instead of waiting for a command
    /// (default: false).
    #[serde(default)]
    pub start_playing: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use terrarium_types::Weather;

    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.world.height, 10);
        assert_eq!(config.world.width, 10);
        assert_eq!(config.world.boundary, BoundaryMode::Toroidal);
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.population.worms, 1000);
        assert_eq!(config.schedule.agent_order, AgentOrder::ById);
        assert!(!config.schedule.start_playing);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = include_str!("../../../terrarium-config.yaml");
        let config = SimulationConfig::parse(shipped).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn sections_override_independently() {
        let yaml = r"
world:
  height: 5
  boundary: bounded
schedule:
  agent_order: shuffled
  max_ticks: 20
species:
  bird:
    vision_range: 1
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.height, 5);
        assert_eq!(config.world.width, 10);
        assert_eq!(config.world.boundary, BoundaryMode::Bounded);
        assert_eq!(config.schedule.agent_order, AgentOrder::Shuffled);
        assert_eq!(config.schedule.max_ticks, 20);
        assert_eq!(config.species.bird.vision_range, 1);
        assert_eq!(config.population.trees, 100);
    }

    #[test]
    fn climate_section_replaces_rows() {
        let yaml = r"
climate:
  name: monsoon
  transitions:
    sunny:
      - to: rainy
        probability: 0.5
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.climate.name, "monsoon");
        assert_eq!(config.climate.next_weather(Weather::Sunny, 0.9), None);
        assert_eq!(config.climate.next_weather(Weather::Sunny, 0.1), Some(Weather::Rainy));
    }

    #[test]
    fn zero_dimension_is_invalid() {
        let result = SimulationConfig::parse("world:\n  width: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let result = SimulationConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/terrarium-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
