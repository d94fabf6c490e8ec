//! Ranking by dominant metric.

use joymap_data::{CountryRecord, Metric};
use serde::Serialize;

use crate::weights::Weights;

/// Number of countries shown in the ranked list.
pub const TOP_N: usize = 5;

/// Outcome of one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub dominant: Metric,
    pub countries: Vec<String>,
}

impl Ranking {
    /// Compute the ranking for a set of weights.
    pub fn compute(weights: Weights, records: &[CountryRecord]) -> Self {
        let dominant = weights.dominant();

        let mut sorted: Vec<&CountryRecord> = records.iter().collect();
        // Stable: countries with equal values keep dataset order.
        sorted.sort_by(|a, b| a.metric(dominant).total_cmp(&b.metric(dominant)));

        let countries = sorted
            .into_iter()
            .take(TOP_N)
            .map(|record| record.country.clone())
            .collect();

        Self { dominant, countries }
    }

    /// Single-line rendering of the list, names separated by `", "`.
    pub fn display(&self) -> String {
        self.countries.join(", ")
    }
}

/// Rank countries by the metric with the highest weight.
///
/// Records are ordered ascending by that metric and the first [`TOP_N`]
/// names are returned. An empty table yields an empty list.
pub fn rank(
    weight_health: u8,
    weight_freedom: u8,
    weight_economy: u8,
    records: &[CountryRecord],
) -> Vec<String> {
    let weights = Weights::new(weight_health, weight_freedom, weight_economy);
    Ranking::compute(weights, records).countries
}

/// The metric [`rank`] would sort by for these weights.
pub fn dominant_metric(weights: Weights) -> Metric {
    weights.dominant()
}
