//! Per-country record.

use crate::metric::Metric;
use serde::{Deserialize, Serialize};

/// One row of the happiness dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// ISO 3166-1 numeric code, the join key against world geometry
    pub region_id: u32,
    pub country: String,
    pub health: f64,
    pub freedom: f64,
    pub economy: f64,
    /// Precomputed happiness delta used to color the map
    pub delta_happy: f64,
    pub happiness_rank: u32,
}

impl CountryRecord {
    /// Value of a weighted metric for this country.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Health => self.health,
            Metric::Freedom => self.freedom,
            Metric::Economy => self.economy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_selects_field() {
        let record = CountryRecord {
            region_id: 578,
            country: "Norway".to_string(),
            health: 73.2,
            freedom: 0.95,
            economy: 11.05,
            delta_happy: 7.49,
            happiness_rank: 5,
        };
        assert_eq!(record.metric(Metric::Health), 73.2);
        assert_eq!(record.metric(Metric::Freedom), 0.95);
        assert_eq!(record.metric(Metric::Economy), 11.05);
    }
}
