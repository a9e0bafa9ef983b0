//! Climate policy: per-weather water effects and the weather transition table.
//!
//! A [`Climate`] is read-only during a tick. Each cell consults it twice per
//! environment update: once for the water delta and evaporation rate of its
//! current weather, and once to pick the next weather from the transition
//! row of its current weather.
//!
//! # Default (temperate) table
//!
//! | Weather   | Water delta | Evaporation | Transitions                                       |
//! |-----------|-------------|-------------|---------------------------------------------------|
//! | Drought   | -2          | 0.80        | drought 0.6, sunny 0.4                            |
//! | Sunny     | -1          | 0.50        | sunny 0.5, cloudy 0.3, rainy 0.2                  |
//! | Cloudy    | 0           | 0.20        | sunny 0.3, cloudy 0.4, rainy 0.3                  |
//! | Rainy     | +2          | 0.10        | cloudy 0.3, rainy 0.4, heavy rain 0.2, stormy 0.1 |
//! | HeavyRain | +4          | 0.05        | rainy 0.4, heavy rain 0.3, stormy 0.3             |
//! | Stormy    | +3          | 0.30        | rainy 0.5, stormy 0.3, cloudy 0.2                 |
//!
//! Transition rows are walked in the order they are listed, which makes the
//! selected state a pure function of the uniform draw.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use terrarium_types::Weather;

/// Tolerance used when checking that a transition row sums to 1.0.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Water effects of a weather state, applied once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffects {
    /// Surface water added (or removed, if negative) per tick.
    pub water_change: i32,
    /// Fraction of the remaining surface water lost per tick.
    pub evaporation_rate: f64,
}

/// One entry in a transition row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Destination weather.
    pub to: Weather,
    /// Probability of moving to `to`.
    pub probability: f64,
}

/// Climate policy consumed by the environment pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Climate {
    /// Human-readable climate name. A configured table without one is
    /// reported as `custom`.
    #[serde(default = "custom_climate_name")]
    pub name: String,

    /// Per-weather water effects.
    #[serde(default = "temperate_effects")]
    pub effects: BTreeMap<Weather, WeatherEffects>,

    /// Per-weather transition rows, walked in listed order.
    #[serde(default = "temperate_transitions")]
    pub transitions: BTreeMap<Weather, Vec<Transition>>,
}

impl Default for Climate {
    fn default() -> Self {
        Self::temperate()
    }
}

impl Climate {
    /// The temperate climate used when no other is configured.
    pub fn temperate() -> Self {
        Self {
            name: "temperate".to_owned(),
            effects: temperate_effects(),
            transitions: temperate_transitions(),
        }
    }

    /// Water effects for `weather`, if the table has an entry.
    pub fn effects_for(&self, weather: Weather) -> Option<&WeatherEffects> {
        self.effects.get(&weather)
    }

    /// Select the weather that follows `current` for a uniform `draw` in
    /// `[0, 1)`.
    ///
    /// Walks the cumulative distribution of the row and returns the first
    /// state whose cumulative probability meets or exceeds the draw. Returns
    /// `None` when the row is missing or no entry reaches the draw, which
    /// happens when the row sums to less than 1.0; the caller keeps the
    /// current weather in that case.
    pub fn next_weather(&self, current: Weather, draw: f64) -> Option<Weather> {
        let row = self.transitions.get(&current)?;
        let mut cumulative = 0.0_f64;
        for transition in row {
            cumulative += transition.probability;
            if draw <= cumulative {
                return Some(transition.to);
            }
        }
        None
    }

    /// Sum of the probabilities in the row for `weather` (0.0 if missing).
    pub fn row_total(&self, weather: Weather) -> f64 {
        self.transitions
            .get(&weather)
            .map_or(0.0, |row| row.iter().map(|t| t.probability).sum())
    }

    /// Rows whose probabilities do not sum to 1.0, with their totals.
    ///
    /// Such rows are legal; a cell in one of those states may simply fail to
    /// transition on a high draw. Callers use this to warn at load time.
    pub fn unnormalized_rows(&self) -> Vec<(Weather, f64)> {
        self.transitions
            .keys()
            .map(|&weather| (weather, self.row_total(weather)))
            .filter(|(_, total)| (total - 1.0).abs() > ROW_SUM_TOLERANCE)
            .collect()
    }
}

fn custom_climate_name() -> String {
    "custom".to_owned()
}

fn temperate_effects() -> BTreeMap<Weather, WeatherEffects> {
    let effect = |water_change, evaporation_rate| WeatherEffects {
        water_change,
        evaporation_rate,
    };
    BTreeMap::from([
        (Weather::Drought, effect(-2, 0.8)),
        (Weather::Sunny, effect(-1, 0.5)),
        (Weather::Cloudy, effect(0, 0.2)),
        (Weather::Rainy, effect(2, 0.1)),
        (Weather::HeavyRain, effect(4, 0.05)),
        (Weather::Stormy, effect(3, 0.3)),
    ])
}

fn temperate_transitions() -> BTreeMap<Weather, Vec<Transition>> {
    let to = |to, probability| Transition { to, probability };
    BTreeMap::from([
        (
            Weather::Drought,
            vec![to(Weather::Drought, 0.6), to(Weather::Sunny, 0.4)],
        ),
        (
            Weather::Sunny,
            vec![
                to(Weather::Sunny, 0.5),
                to(Weather::Cloudy, 0.3),
                to(Weather::Rainy, 0.2),
            ],
        ),
        (
            Weather::Cloudy,
            vec![
                to(Weather::Sunny, 0.3),
                to(Weather::Cloudy, 0.4),
                to(Weather::Rainy, 0.3),
            ],
        ),
        (
            Weather::Rainy,
            vec![
                to(Weather::Cloudy, 0.3),
                to(Weather::Rainy, 0.4),
                to(Weather::HeavyRain, 0.2),
                to(Weather::Stormy, 0.1),
            ],
        ),
        (
            Weather::HeavyRain,
            vec![
                to(Weather::Rainy, 0.4),
                to(Weather::HeavyRain, 0.3),
                to(Weather::Stormy, 0.3),
            ],
        ),
        (
            Weather::Stormy,
            vec![
                to(Weather::Rainy, 0.5),
                to(Weather::Stormy, 0.3),
                to(Weather::Cloudy, 0.2),
            ],
        ),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    #[test]
    fn temperate_rows_are_normalized() {
        let climate = Climate::temperate();
        assert!(climate.unnormalized_rows().is_empty());
        for weather in Weather::ALL {
            assert!(climate.effects_for(weather).is_some());
        }
    }

    #[test]
    fn draw_selects_first_state_meeting_cumulative() {
        let climate = Climate::temperate();
        // Sunny row: sunny 0.5, cloudy 0.8, rainy 1.0 (cumulative).
        assert_eq!(climate.next_weather(Weather::Sunny, 0.0), Some(Weather::Sunny));
        assert_eq!(climate.next_weather(Weather::Sunny, 0.5), Some(Weather::Sunny));
        assert_eq!(climate.next_weather(Weather::Sunny, 0.51), Some(Weather::Cloudy));
        assert_eq!(climate.next_weather(Weather::Sunny, 0.95), Some(Weather::Rainy));
    }

    #[test]
    fn short_row_can_fail_to_transition() {
        let mut climate = Climate::temperate();
        climate.transitions.insert(
            Weather::Cloudy,
            vec![Transition {
                to: Weather::Rainy,
                probability: 0.25,
            }],
        );
        assert_eq!(climate.next_weather(Weather::Cloudy, 0.2), Some(Weather::Rainy));
        assert_eq!(climate.next_weather(Weather::Cloudy, 0.9), None);
        let drift = climate.unnormalized_rows();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift.first().map(|(w, _)| *w), Some(Weather::Cloudy));
    }

    #[test]
    fn missing_row_means_no_transition() {
        let mut climate = Climate::temperate();
        climate.transitions.remove(&Weather::Stormy);
        assert_eq!(climate.next_weather(Weather::Stormy, 0.1), None);
        assert_eq!(climate.row_total(Weather::Stormy), 0.0);
    }

    #[test]
    fn transitions_reproducible_for_same_seed() {
        let climate = Climate::temperate();
        let run = |seed| {
            let mut rng = SimRng::seed_from_u64(seed);
            let mut weather = Weather::Sunny;
            let mut trail = Vec::new();
            for _ in 0..200 {
                weather = climate.next_weather(weather, rng.unit()).unwrap_or(weather);
                trail.push(weather);
            }
            trail
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn climate_parses_from_yaml_with_defaults() {
        let yaml = "name: arid\n";
        let climate: Climate = serde_yml::from_str(yaml).unwrap();
        assert_eq!(climate.name, "arid");
        assert_eq!(climate.effects, temperate_effects());

        let yaml = "transitions:\n  sunny:\n    - to: drought\n      probability: 1.0\n";
        let climate: Climate = serde_yml::from_str(yaml).unwrap();
        assert_eq!(climate.name, "custom");
        assert_eq!(climate.next_weather(Weather::Sunny, 0.7), Some(Weather::Drought));
        assert!(climate.transitions.get(&Weather::Rainy).is_none());
    }
}
