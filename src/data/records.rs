use crate::error::LoadError;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A case or death count as it appeared in the source table.
///
/// `Count(None)` flags a value that was not numeric. Aggregates skip it,
/// chart series draw it as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Count(Option<i64>);

impl Count {
    pub const INVALID: Count = Count(None);

    pub fn new(value: i64) -> Self {
        Count(Some(value))
    }

    /// Parse a raw cell. Integers parse exactly, finite decimals truncate
    /// toward zero, everything else is invalid.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return Count(Some(v));
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Count(Some(v.trunc() as i64)),
            _ => Count::INVALID,
        }
    }

    #[inline(always)]
    pub fn get(self) -> Option<i64> {
        self.0
    }

    #[inline(always)]
    pub fn is_valid(self) -> bool {
        self.0.is_some()
    }
}

impl From<i64> for Count {
    fn from(value: i64) -> Self {
        Count::new(value)
    }
}

/// One row of the case/death table: a country on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub country: String,
    pub date: NaiveDate,
    pub cases: Count,
    pub deaths: Count,
}

impl CaseRecord {
    pub fn new(country: &str, date: NaiveDate, cases: impl Into<Count>, deaths: impl Into<Count>) -> Self {
        Self {
            country: country.to_string(),
            date,
            cases: cases.into(),
            deaths: deaths.into(),
        }
    }

    /// Day of month, 1-based
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Column layout of the source CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    name_en: String,
    date: String,
    cases: String,
    deaths: String,
}

/// What the parser had to skip or flag while reading the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableReport {
    pub rows: usize,
    pub bad_dates: usize,
    pub invalid_counts: usize,
}

/// Read the case/death table from disk
pub fn load_case_table(path: &Path) -> Result<(Vec<CaseRecord>, TableReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_case_table(file, path)
}

/// Parse a case/death table from any reader; `path` is only used in errors
pub fn parse_case_table<R: Read>(reader: R, path: &Path) -> Result<(Vec<CaseRecord>, TableReport), LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut records = Vec::new();
    let mut report = TableReport::default();

    for row in rdr.deserialize::<RawRow>() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        report.rows += 1;

        let Ok(date) = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d") else {
            report.bad_dates += 1;
            tracing::debug!(country = %row.name_en, date = %row.date, "dropping row with unparseable date");
            continue;
        };

        let cases = Count::parse(&row.cases);
        let deaths = Count::parse(&row.deaths);
        report.invalid_counts += usize::from(!cases.is_valid()) + usize::from(!deaths.is_valid());

        records.push(CaseRecord {
            country: row.name_en,
            date,
            cases,
            deaths,
        });
    }

    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Vec<CaseRecord>, TableReport) {
        parse_case_table(text.as_bytes(), Path::new("inline.csv")).unwrap()
    }

    #[test]
    fn test_count_parse() {
        assert_eq!(Count::parse("42").get(), Some(42));
        assert_eq!(Count::parse("  7 ").get(), Some(7));
        assert_eq!(Count::parse("-3").get(), Some(-3));
        assert_eq!(Count::parse("12.9").get(), Some(12));
        assert_eq!(Count::parse("").get(), None);
        assert_eq!(Count::parse("n/a").get(), None);
        assert_eq!(Count::parse("NaN").get(), None);
        assert_eq!(Count::parse("inf").get(), None);
    }

    #[test]
    fn test_parse_table() {
        let (records, report) = parse(
            "name_en,date,cases,deaths,iso\n\
             Testland,2020-04-01,10,1,TL\n\
             Testland,2020-04-02,20,2,TL\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(report, TableReport { rows: 2, bad_dates: 0, invalid_counts: 0 });
        assert_eq!(records[1].country, "Testland");
        assert_eq!(records[1].day(), 2);
        assert_eq!(records[1].cases.get(), Some(20));
    }

    #[test]
    fn test_bad_rows_flagged() {
        let (records, report) = parse(
            "name_en,date,cases,deaths\n\
             Testland,not-a-date,10,1\n\
             Testland,2020-04-02,,x\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(report.bad_dates, 1);
        assert_eq!(report.invalid_counts, 2);
        assert!(!records[0].cases.is_valid());
    }

    #[test]
    fn test_missing_column_is_error() {
        let result = parse_case_table("name_en,date,cases\nA,2020-01-01,1\n".as_bytes(), Path::new("x.csv"));
        assert!(matches!(result, Err(LoadError::Csv { .. })));
    }
}
