//! Slider weights and dominant-metric selection.

use joymap_data::Metric;
use serde::{Deserialize, Serialize};

/// The three user-set weights, one per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weights {
    pub health: u8,
    pub freedom: u8,
    pub economy: u8,
}

impl Weights {
    pub const fn new(health: u8, freedom: u8, economy: u8) -> Self {
        Self {
            health,
            freedom,
            economy,
        }
    }

    /// Weight assigned to a metric.
    pub fn get(&self, metric: Metric) -> u8 {
        match metric {
            Metric::Health => self.health,
            Metric::Freedom => self.freedom,
            Metric::Economy => self.economy,
        }
    }

    /// The metric/weight table in input order.
    pub fn table(&self) -> [(Metric, u8); 3] {
        Metric::ALL.map(|metric| (metric, self.get(metric)))
    }

    /// The metric carrying the highest weight.
    ///
    /// The table is stable-sorted descending, so equal weights resolve in
    /// input order: Health, then Freedom, then Economy.
    pub fn dominant(&self) -> Metric {
        let mut table = self.table();
        table.sort_by(|a, b| b.1.cmp(&a.1));
        table[0].0
    }
}
