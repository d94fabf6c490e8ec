//! Joymap Dataset Store
//!
//! Loads the per-country happiness table once at startup and serves it
//! read-only for the rest of the process lifetime.
//!
//! # Format
//!
//! A CSV file with a header row containing at least:
//!
//! | Column | Type |
//! |--------|------|
//! | `Country` | text |
//! | `id` | ISO 3166-1 numeric region code |
//! | `Healthy life expectancy` | number |
//! | `Freedom to make life choices` | number |
//! | `Logged GDP per capita` | number |
//! | `Delta_happy` | number |
//! | `Happiness_rank` | integer |
//!
//! # Example
//!
//! ```no_run
//! use joymap_data::Dataset;
//!
//! let dataset = Dataset::load("data/processed/extra_clean.csv")?;
//! println!("{} countries", dataset.len());
//! # Ok::<(), joymap_data::Error>(())
//! ```

mod dataset;
mod error;
mod metric;
mod record;

pub use dataset::{Dataset, COL_COUNTRY, COL_DELTA_HAPPY, COL_HAPPINESS_RANK, COL_REGION_ID};
pub use error::{Error, Result};
pub use metric::Metric;
pub use record::CountryRecord;
