//! The three weighted metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A metric the user can weight with a slider.
///
/// Declaration order is significant: it is the tie-break order used when
/// two weights are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Health,
    Freedom,
    Economy,
}

impl Metric {
    /// All metrics in tie-break order.
    pub const ALL: [Metric; 3] = [Metric::Health, Metric::Freedom, Metric::Economy];

    /// Dataset column holding this metric.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Health => "Healthy life expectancy",
            Metric::Freedom => "Freedom to make life choices",
            Metric::Economy => "Logged GDP per capita",
        }
    }

    /// Short label shown next to the slider.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Health => "Health",
            Metric::Freedom => "Freedom",
            Metric::Economy => "Economy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
