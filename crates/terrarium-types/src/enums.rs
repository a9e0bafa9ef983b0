//! Enumeration types for the Terrarium simulation.
//!
//! Every category the engine dispatches on is a closed enumeration here,
//! so cross-species checks compare variants instead of type-name strings.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The species tag carried by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Stationary producer that draws water and nutrients from its cell.
    Tree,
    /// Soil dweller that eats nutrients and burrows in dry weather.
    Worm,
    /// Mobile predator that hunts surface worms.
    Bird,
}

impl Species {
    /// All species in declaration order.
    pub const ALL: [Self; 3] = [Self::Tree, Self::Worm, Self::Bird];

    /// Lower-case name used in logs and metrics output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Worm => "worm",
            Self::Bird => "bird",
        }
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Biological sex for species that need a partner to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Female.
    Female,
    /// Male.
    Male,
}

impl Sex {
    /// The complementary sex.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Female => Self::Male,
            Self::Male => Self::Female,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Per-cell weather state driven by the climate transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Strong drying, water drains every tick.
    Drought,
    /// Mild drying.
    Sunny,
    /// Neutral.
    Cloudy,
    /// Adds surface water.
    Rainy,
    /// Adds a lot of surface water.
    HeavyRain,
    /// Adds water but evaporates a good share of it.
    Stormy,
}

impl Weather {
    /// All weather states in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Drought,
        Self::Sunny,
        Self::Cloudy,
        Self::Rainy,
        Self::HeavyRain,
        Self::Stormy,
    ];

    /// Lower-case name used in logs and metrics output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drought => "drought",
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::HeavyRain => "heavy_rain",
            Self::Stormy => "stormy",
        }
    }
}

impl core::fmt::Display for Weather {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grid and scheduling modes
// ---------------------------------------------------------------------------

/// How coordinates beyond the lattice edge are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Coordinates wrap modulo each dimension.
    #[default]
    Toroidal,
    /// Coordinates outside the lattice do not exist.
    Bounded,
}

/// Order in which live agents are visited during the agent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentOrder {
    /// Ascending identifier order (deterministic).
    #[default]
    ById,
    /// A fresh RNG shuffle of the live set every tick.
    Shuffled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sex_round_trips() {
        assert_eq!(Sex::Female.opposite(), Sex::Male);
        assert_eq!(Sex::Male.opposite().opposite(), Sex::Male);
    }

    #[test]
    fn weather_names_are_snake_case() {
        assert_eq!(Weather::HeavyRain.to_string(), "heavy_rain");
        let json = serde_json::to_string(&Weather::HeavyRain).ok();
        assert_eq!(json.as_deref(), Some("\"heavy_rain\""));
    }

    #[test]
    fn boundary_mode_parses_from_snake_case() {
        let mode: Result<BoundaryMode, _> = serde_json::from_str("\"bounded\"");
        assert_eq!(mode.ok(), Some(BoundaryMode::Bounded));
        assert_eq!(BoundaryMode::default(), BoundaryMode::Toroidal);
    }

    #[test]
    fn agent_order_defaults_to_id_order() {
        assert_eq!(AgentOrder::default(), AgentOrder::ById);
        let order: Result<AgentOrder, _> = serde_json::from_str("\"shuffled\"");
        assert_eq!(order.ok(), Some(AgentOrder::Shuffled));
    }

    #[test]
    fn species_list_is_complete() {
        assert_eq!(Species::ALL.len(), 3);
        assert_eq!(Species::Bird.as_str(), "bird");
    }
}
