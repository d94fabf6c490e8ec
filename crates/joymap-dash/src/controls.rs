//! Slider control state.

use joymap_data::Metric;
use joymap_rank::Weights;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest slider position.
pub const MIN_WEIGHT: u8 = 0;
/// Highest slider position.
pub const MAX_WEIGHT: u8 = 10;
/// Slider position on startup and after reset.
pub const DEFAULT_WEIGHT: u8 = 5;

/// A slider value outside `[MIN_WEIGHT, MAX_WEIGHT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid control value {value}: expected 0..=10")]
pub struct InvalidControlValue {
    pub value: i64,
}

/// One slider position, always within range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Weight(u8);

impl Weight {
    pub const DEFAULT: Weight = Weight(DEFAULT_WEIGHT);

    /// Validate a raw slider value.
    pub fn new(value: i64) -> Result<Self, InvalidControlValue> {
        if (MIN_WEIGHT as i64..=MAX_WEIGHT as i64).contains(&value) {
            Ok(Weight(value as u8))
        } else {
            Err(InvalidControlValue { value })
        }
    }

    /// Bring a raw slider value into range.
    pub fn clamped(value: i64) -> Self {
        match Self::new(value) {
            Ok(weight) => weight,
            Err(err) => {
                tracing::debug!(%err, "Clamping control value");
                Weight(value.clamp(MIN_WEIGHT as i64, MAX_WEIGHT as i64) as u8)
            }
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Weight {
    type Error = InvalidControlValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

/// Current position of the three sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlState {
    pub health: Weight,
    pub freedom: Weight,
    pub economy: Weight,
}

impl ControlState {
    pub fn get(&self, control: Metric) -> Weight {
        match control {
            Metric::Health => self.health,
            Metric::Freedom => self.freedom,
            Metric::Economy => self.economy,
        }
    }

    pub fn set(&mut self, control: Metric, weight: Weight) {
        match control {
            Metric::Health => self.health = weight,
            Metric::Freedom => self.freedom = weight,
            Metric::Economy => self.economy = weight,
        }
    }

    /// Weights handed to the ranking engine.
    pub fn weights(&self) -> Weights {
        Weights::new(self.health.get(), self.freedom.get(), self.economy.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five() {
        let state = ControlState::default();
        assert_eq!(state.weights(), Weights::new(5, 5, 5));
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert_eq!(Weight::new(0).map(Weight::get), Ok(0));
        assert_eq!(Weight::new(10).map(Weight::get), Ok(10));
        assert_eq!(Weight::new(11), Err(InvalidControlValue { value: 11 }));
        assert_eq!(Weight::new(-1), Err(InvalidControlValue { value: -1 }));
    }

    #[test]
    fn clamped_pins_to_bounds() {
        assert_eq!(Weight::clamped(-40).get(), 0);
        assert_eq!(Weight::clamped(7).get(), 7);
        assert_eq!(Weight::clamped(1_000).get(), 10);
    }

    #[test]
    fn set_updates_one_slider() {
        let mut state = ControlState::default();
        state.set(Metric::Freedom, Weight::clamped(9));
        assert_eq!(state.get(Metric::Freedom).get(), 9);
        assert_eq!(state.weights(), Weights::new(5, 9, 5));
    }

    #[test]
    fn serializes_as_plain_numbers() {
        let state = ControlState::default();
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json, serde_json::json!({"health": 5, "freedom": 5, "economy": 5}));

        let parsed: Result<ControlState, _> =
            serde_json::from_str(r#"{"health": 12, "freedom": 5, "economy": 5}"#);
        assert!(parsed.is_err());
    }
}
