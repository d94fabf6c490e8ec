//! CSV-backed dataset store.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::record::CountryRecord;

pub const COL_COUNTRY: &str = "Country";
pub const COL_REGION_ID: &str = "id";
pub const COL_DELTA_HAPPY: &str = "Delta_happy";
pub const COL_HAPPINESS_RANK: &str = "Happiness_rank";

/// Column positions resolved from the header row.
struct Columns {
    country: usize,
    region_id: usize,
    health: usize,
    freedom: usize,
    economy: usize,
    delta_happy: usize,
    happiness_rank: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(Error::MissingColumn(name))
        };
        Ok(Self {
            country: find(COL_COUNTRY)?,
            region_id: find(COL_REGION_ID)?,
            health: find(Metric::Health.column())?,
            freedom: find(Metric::Freedom.column())?,
            economy: find(Metric::Economy.column())?,
            delta_happy: find(COL_DELTA_HAPPY)?,
            happiness_rank: find(COL_HAPPINESS_RANK)?,
        })
    }
}

/// Immutable, in-memory table of country records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<CountryRecord>,
    by_region: HashMap<u32, usize>,
}

impl Dataset {
    /// Load the dataset from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(path = %path.display(), records = dataset.len(), "Dataset loaded");
        Ok(dataset)
    }

    /// Parse a dataset from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let columns = Columns::resolve(csv.headers()?)?;

        let mut records = Vec::new();
        for (index, row) in csv.records().enumerate() {
            let row_number = index + 1;
            records.push(parse_row(&row?, &columns, row_number)?);
        }

        Self::build(records)
    }

    /// Build a dataset from records already in memory.
    ///
    /// The same checks as a file load apply: numeric fields must be finite
    /// and region ids unique.
    pub fn from_records(records: Vec<CountryRecord>) -> Result<Self> {
        Self::build(records)
    }

    fn build(records: Vec<CountryRecord>) -> Result<Self> {
        let mut by_region = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            check_finite(record, index + 1)?;
            if by_region.insert(record.region_id, index).is_some() {
                return Err(Error::DuplicateRegion {
                    row: index + 1,
                    id: record.region_id,
                });
            }
        }
        Ok(Self { records, by_region })
    }

    /// All records in file order.
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by region identifier.
    pub fn get(&self, region_id: u32) -> Option<&CountryRecord> {
        self.by_region.get(&region_id).map(|&i| &self.records[i])
    }
}

fn check_finite(record: &CountryRecord, row: usize) -> Result<()> {
    let fields = Metric::ALL
        .map(|metric| (metric.column(), record.metric(metric)))
        .into_iter()
        .chain([(COL_DELTA_HAPPY, record.delta_happy)]);
    for (column, value) in fields {
        if !value.is_finite() {
            return Err(Error::InvalidValue {
                row,
                column,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_row(row: &StringRecord, columns: &Columns, row_number: usize) -> Result<CountryRecord> {
    let row = Row { row, number: row_number };
    Ok(CountryRecord {
        region_id: row.integer(columns.region_id, COL_REGION_ID)?,
        country: row.text(columns.country, COL_COUNTRY)?.to_string(),
        health: row.number(columns.health, Metric::Health.column())?,
        freedom: row.number(columns.freedom, Metric::Freedom.column())?,
        economy: row.number(columns.economy, Metric::Economy.column())?,
        delta_happy: row.number(columns.delta_happy, COL_DELTA_HAPPY)?,
        happiness_rank: row.integer(columns.happiness_rank, COL_HAPPINESS_RANK)?,
    })
}

/// A data row together with its 1-based position, for error reporting.
struct Row<'a> {
    row: &'a StringRecord,
    number: usize,
}

impl<'a> Row<'a> {
    fn text(&self, index: usize, column: &'static str) -> Result<&'a str> {
        match self.row.get(index) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MissingValue {
                row: self.number,
                column,
            }),
        }
    }

    fn number(&self, index: usize, column: &'static str) -> Result<f64> {
        let value = self.text(index, column)?;
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(self.invalid(column, value)),
        }
    }

    // Integer columns may have been written as floats ("4.0") by the preprocessing step.
    fn integer(&self, index: usize, column: &'static str) -> Result<u32> {
        let value = self.text(index, column)?;
        if let Ok(n) = value.parse::<u32>() {
            return Ok(n);
        }
        match value.parse::<f64>() {
            Ok(n) if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) => Ok(n as u32),
            _ => Err(self.invalid(column, value)),
        }
    }

    fn invalid(&self, column: &'static str, value: &str) -> Error {
        Error::InvalidValue {
            row: self.number,
            column,
            value: value.to_string(),
        }
    }
}
