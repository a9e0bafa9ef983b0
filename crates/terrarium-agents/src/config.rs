//! Tunables for the built-in species policies.
//!
//! These mirror the `species` section of `terrarium-config.yaml`. Every
//! field has a default, so a partial section (or none at all) is valid.

use serde::{Deserialize, Serialize};

/// Per-species parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Tree parameters.
    #[serde(default)]
    pub tree: TreeConfig,

    /// Worm parameters.
    #[serde(default)]
    pub worm: WormConfig,

    /// Bird parameters.
    #[serde(default)]
    pub bird: BirdConfig,
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Tree growth, reproduction, and decay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Health of a new tree (default: 20).
    #[serde(default = "default_tree_initial_health")]
    pub initial_health: i32,

    /// Health gained when both water and nutrients are available
    /// (default: 10).
    #[serde(default = "default_tree_growth_gain")]
    pub growth_gain: i32,

    /// Health lost when only one of water or nutrients is available
    /// (default: 5).
    #[serde(default = "default_tree_scarcity_loss")]
    pub scarcity_loss: i32,

    /// Health lost when neither is available (default: 20).
    #[serde(default = "default_tree_barren_loss")]
    pub barren_loss: i32,

    /// Health above which the tree seeds a neighbor (default: 50).
    #[serde(default = "default_tree_reproduction_threshold")]
    pub reproduction_threshold: i32,

    /// Health spent on each seedling (default: 30).
    #[serde(default = "default_tree_reproduction_cost")]
    pub reproduction_cost: i32,

    /// A dead tree returns `age / decay_divisor` nutrients (default: 5).
    #[serde(default = "default_tree_decay_divisor")]
    pub decay_divisor: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            initial_health: default_tree_initial_health(),
            growth_gain: default_tree_growth_gain(),
            scarcity_loss: default_tree_scarcity_loss(),
            barren_loss: default_tree_barren_loss(),
            reproduction_threshold: default_tree_reproduction_threshold(),
            reproduction_cost: default_tree_reproduction_cost(),
            decay_divisor: default_tree_decay_divisor(),
        }
    }
}

const fn default_tree_initial_health() -> i32 {
    20
}

const fn default_tree_growth_gain() -> i32 {
    10
}

const fn default_tree_scarcity_loss() -> i32 {
    5
}

const fn default_tree_barren_loss() -> i32 {
    20
}

const fn default_tree_reproduction_threshold() -> i32 {
    50
}

const fn default_tree_reproduction_cost() -> i32 {
    30
}

const fn default_tree_decay_divisor() -> u32 {
    5
}

// ---------------------------------------------------------------------------
// Worm
// ---------------------------------------------------------------------------

/// Worm feeding, reproduction, and aging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WormConfig {
    /// Energy of a new worm (default: 50).
    #[serde(default = "default_worm_initial_energy")]
    pub initial_energy: i32,

    /// Energy cap (default: 100).
    #[serde(default = "default_worm_max_energy")]
    pub max_energy: i32,

    /// Energy at which the worm reproduces (default: 80).
    #[serde(default = "default_worm_reproduction_threshold")]
    pub reproduction_threshold: i32,

    /// Energy spent per offspring (default: 40).
    #[serde(default = "default_worm_reproduction_cost")]
    pub reproduction_cost: i32,

    /// Most nutrients eaten per tick (default: 10).
    #[serde(default = "default_worm_bite")]
    pub bite: u32,

    /// Age past which the worm dies outright (default: 100).
    #[serde(default = "default_worm_max_age")]
    pub max_age: u32,

    /// Age after which each tick carries a death roll (default: 50).
    #[serde(default = "default_worm_senescence_age")]
    pub senescence_age: u32,

    /// The death roll draws uniformly from `0..=death_roll_max`
    /// (default: 100).
    #[serde(default = "default_worm_death_roll_max")]
    pub death_roll_max: u32,
}

impl Default for WormConfig {
    fn default() -> Self {
        Self {
            initial_energy: default_worm_initial_energy(),
            max_energy: default_worm_max_energy(),
            reproduction_threshold: default_worm_reproduction_threshold(),
            reproduction_cost: default_worm_reproduction_cost(),
            bite: default_worm_bite(),
            max_age: default_worm_max_age(),
            senescence_age: default_worm_senescence_age(),
            death_roll_max: default_worm_death_roll_max(),
        }
    }
}

const fn default_worm_initial_energy() -> i32 {
    50
}

const fn default_worm_max_energy() -> i32 {
    100
}

const fn default_worm_reproduction_threshold() -> i32 {
    80
}

const fn default_worm_reproduction_cost() -> i32 {
    40
}

const fn default_worm_bite() -> u32 {
    10
}

const fn default_worm_max_age() -> u32 {
    100
}

const fn default_worm_senescence_age() -> u32 {
    50
}

const fn default_worm_death_roll_max() -> u32 {
    100
}

// ---------------------------------------------------------------------------
// Bird
// ---------------------------------------------------------------------------

/// Bird hunting, mating, and aging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirdConfig {
    /// Energy of a new bird (default: 100).
    #[serde(default = "default_bird_initial_energy")]
    pub initial_energy: i32,

    /// Energy cap (default: 200).
    #[serde(default = "default_bird_max_energy")]
    pub max_energy: i32,

    /// Energy at which the bird calls for a mate (default: 150).
    #[serde(default = "default_bird_reproduction_threshold")]
    pub reproduction_threshold: i32,

    /// Energy each parent spends on an offspring (default: 50).
    #[serde(default = "default_bird_mating_cost")]
    pub mating_cost: i32,

    /// Energy spent per hunt attempt (default: 10).
    #[serde(default = "default_bird_hunt_cost")]
    pub hunt_cost: i32,

    /// Energy gained per worm eaten (default: 40).
    #[serde(default = "default_bird_prey_energy")]
    pub prey_energy: i32,

    /// Energy spent flying to a neighbor (default: 5).
    #[serde(default = "default_bird_move_cost")]
    pub move_cost: i32,

    /// Manhattan radius searched for a mate (default: 3).
    #[serde(default = "default_bird_vision_range")]
    pub vision_range: usize,

    /// Age past which the bird dies outright (default: 200).
    #[serde(default = "default_bird_max_age")]
    pub max_age: u32,

    /// Age after which each tick carries a death roll (default: 10).
    #[serde(default = "default_bird_senescence_age")]
    pub senescence_age: u32,

    /// The death roll draws uniformly from `0..=death_roll_max`
    /// (default: 10).
    #[serde(default = "default_bird_death_roll_max")]
    pub death_roll_max: u32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            initial_energy: default_bird_initial_energy(),
            max_energy: default_bird_max_energy(),
            reproduction_threshold: default_bird_reproduction_threshold(),
            mating_cost: default_bird_mating_cost(),
            hunt_cost: default_bird_hunt_cost(),
            prey_energy: default_bird_prey_energy(),
            move_cost: default_bird_move_cost(),
            vision_range: default_bird_vision_range(),
            max_age: default_bird_max_age(),
            senescence_age: default_bird_senescence_age(),
            death_roll_max: default_bird_death_roll_max(),
        }
    }
}

const fn default_bird_initial_energy() -> i32 {
    100
}

const fn default_bird_max_energy() -> i32 {
    200
}

const fn default_bird_reproduction_threshold() -> i32 {
    150
}

const fn default_bird_mating_cost() -> i32 {
    50
}

const fn default_bird_hunt_cost() -> i32 {
    10
}

const fn default_bird_prey_energy() -> i32 {
    40
}

const fn default_bird_move_cost() -> i32 {
    5
}

const fn default_bird_vision_range() -> usize {
    3
}

const fn default_bird_max_age() -> u32 {
    200
}

const fn default_bird_senescence_age() -> u32 {
    10
}

const fn default_bird_death_roll_max() -> u32 {
    10
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: SpeciesConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, SpeciesConfig::default());
        assert_eq!(config.tree.initial_health, 20);
        assert_eq!(config.worm.reproduction_threshold, 80);
        assert_eq!(config.bird.vision_range, 3);
    }

    #[test]
    fn partial_override() {
        let yaml = "worm:\n  bite: 3\nbird:\n  max_age: 50\n";
        let config: SpeciesConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.worm.bite, 3);
        assert_eq!(config.worm.max_energy, 100);
        assert_eq!(config.bird.max_age, 50);
        assert_eq!(config.bird.senescence_age, 10);
        assert_eq!(config.tree, TreeConfig::default());
    }
}
