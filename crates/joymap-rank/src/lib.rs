//! Joymap Ranking Engine
//!
//! Picks the **dominant metric** (the one with the highest slider weight,
//! Health winning ties, then Freedom) and lists the first five countries
//! ordered ascending by it.
//!
//! ```
//! use joymap_data::CountryRecord;
//! use joymap_rank::rank;
//!
//! let records: Vec<CountryRecord> = Vec::new();
//! assert!(rank(5, 5, 5, &records).is_empty());
//! ```

mod engine;
mod weights;

pub use engine::{dominant_metric, rank, Ranking, TOP_N};
pub use weights::Weights;
