mod boundaries;
mod records;

pub use boundaries::{load_boundaries, parse_boundaries, CountryFeature, Polygon, Ring};
pub use records::{load_case_table, parse_case_table, CaseRecord, Count, TableReport};

use crate::error::LoadError;
use crate::stats::Stats;
use std::collections::HashSet;
use std::path::PathBuf;

/// Where the two startup datasets live
#[derive(Clone, Debug)]
pub struct DataSources {
    pub countries: PathBuf,
    pub cases: PathBuf,
    /// Topology object holding the country geometries
    pub object: String,
}

/// Both datasets, loaded once and never mutated afterwards
#[derive(Debug, Default)]
pub struct Dataset {
    features: Vec<CountryFeature>,
    records: Vec<CaseRecord>,
}

impl Dataset {
    pub fn new(features: Vec<CountryFeature>, records: Vec<CaseRecord>) -> Self {
        Self { features, records }
    }

    /// Read and parse both files in parallel. Either failure aborts the load.
    pub fn load(sources: &DataSources) -> Result<Self, LoadError> {
        let (features, table) = rayon::join(
            || load_boundaries(&sources.countries, &sources.object),
            || load_case_table(&sources.cases),
        );
        let features = features?;
        let (records, report) = table?;

        if features.is_empty() {
            return Err(LoadError::Empty {
                path: sources.countries.clone(),
                what: "country features",
            });
        }

        if report.bad_dates > 0 || report.invalid_counts > 0 {
            tracing::warn!(
                path = %sources.cases.display(),
                bad_dates = report.bad_dates,
                invalid_counts = report.invalid_counts,
                "case table has unusable cells"
            );
        }
        if records.is_empty() {
            tracing::warn!(path = %sources.cases.display(), "case table has no records, every country will aggregate to zero");
        }

        let dataset = Self::new(features, records);
        let unmatched = dataset.unmatched_features();
        for name in &unmatched {
            tracing::debug!(country = %name, "no case rows for this boundary name");
        }
        tracing::info!(
            features = dataset.features.len(),
            records = dataset.records.len(),
            rows = report.rows,
            unmatched = unmatched.len(),
            "datasets loaded"
        );
        Ok(dataset)
    }

    pub fn features(&self) -> &[CountryFeature] {
        &self.features
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// Query handle over the case table
    pub fn stats(&self) -> Stats<'_> {
        Stats::new(&self.records)
    }

    /// Boundary names with no exact match in the case table. These always
    /// aggregate to zero (e.g. "United States of America" vs "United States").
    pub fn unmatched_features(&self) -> Vec<&str> {
        let known: HashSet<&str> = self.records.iter().map(|r| r.country.as_str()).collect();
        self.features
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| !known.contains(name))
            .collect()
    }
}
