//! Pure queries over the immutable case table.
//!
//! Nothing here caches: every call filters the record slice again. Maxima
//! over an empty (or all-invalid) selection are `None`; sums are `0`.

use crate::data::{CaseRecord, Count};
use crate::stats::Month;
use std::collections::HashMap;

/// Read-only query handle over a record slice
#[derive(Clone, Copy)]
pub struct Stats<'a> {
    records: &'a [CaseRecord],
}

/// Sums for one country (or the world) over one month
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub cases: i64,
    pub deaths: i64,
}

/// Everything the map needs about a month, gathered in one pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthSummary {
    pub max_cases: Option<i64>,
    pub max_deaths: Option<i64>,
    pub totals: Totals,
    pub records: usize,
}

/// One day of the drill-down chart, values scaled by the month maximum
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    pub day: u32,
    pub normalized_cases: f64,
    pub normalized_deaths: f64,
}

fn max_of<'r>(records: impl Iterator<Item = &'r CaseRecord>, field: fn(&CaseRecord) -> Count) -> Option<i64> {
    records.filter_map(|r| field(r).get()).max()
}

fn sum_of<'r>(records: impl Iterator<Item = &'r CaseRecord>, field: fn(&CaseRecord) -> Count) -> i64 {
    records.filter_map(|r| field(r).get()).fold(0i64, i64::saturating_add)
}

fn cases(r: &CaseRecord) -> Count {
    r.cases
}

fn deaths(r: &CaseRecord) -> Count {
    r.deaths
}

/// `value / max`, with an absent or non-positive maximum or an invalid
/// value contributing zero instead of NaN/inf
fn normalize(value: Count, max: Option<i64>) -> f64 {
    match (value.get(), max) {
        (Some(v), Some(m)) if m > 0 => v as f64 / m as f64,
        _ => 0.0,
    }
}

impl<'a> Stats<'a> {
    pub fn new(records: &'a [CaseRecord]) -> Self {
        Self { records }
    }

    /// Records dated inside the month, inclusive on both ends
    pub fn records_for_month(&self, month: Month) -> impl Iterator<Item = &'a CaseRecord> + 'a {
        let window = month.window();
        self.records.iter().filter(move |r| window.contains(r.date))
    }

    /// Records whose country matches exactly (case-sensitive)
    pub fn records_for_country<'q>(&self, country: &'q str) -> impl Iterator<Item = &'a CaseRecord> + 'q
    where
        'a: 'q,
    {
        self.records.iter().filter(move |r| r.country == country)
    }

    /// Country filter first, then the month window
    pub fn records_for_country_and_month<'q>(
        &self,
        country: &'q str,
        month: Month,
    ) -> impl Iterator<Item = &'a CaseRecord> + 'q
    where
        'a: 'q,
    {
        let window = month.window();
        self.records_for_country(country).filter(move |r| window.contains(r.date))
    }

    pub fn max_cases(&self, month: Month) -> Option<i64> {
        max_of(self.records_for_month(month), cases)
    }

    pub fn max_deaths(&self, month: Month) -> Option<i64> {
        max_of(self.records_for_month(month), deaths)
    }

    pub fn total_cases(&self, month: Month) -> i64 {
        sum_of(self.records_for_month(month), cases)
    }

    pub fn total_deaths(&self, month: Month) -> i64 {
        sum_of(self.records_for_month(month), deaths)
    }

    pub fn max_cases_for_country(&self, country: &str, month: Month) -> Option<i64> {
        max_of(self.records_for_country_and_month(country, month), cases)
    }

    pub fn max_deaths_for_country(&self, country: &str, month: Month) -> Option<i64> {
        max_of(self.records_for_country_and_month(country, month), deaths)
    }

    pub fn total_cases_for_country(&self, country: &str, month: Month) -> i64 {
        sum_of(self.records_for_country_and_month(country, month), cases)
    }

    pub fn total_deaths_for_country(&self, country: &str, month: Month) -> i64 {
        sum_of(self.records_for_country_and_month(country, month), deaths)
    }

    /// Maxima and world totals for a month in a single scan
    pub fn month_summary(&self, month: Month) -> MonthSummary {
        self.records_for_month(month).fold(MonthSummary::default(), |mut acc, r| {
            if let Some(c) = r.cases.get() {
                acc.max_cases = Some(acc.max_cases.map_or(c, |m| m.max(c)));
                acc.totals.cases = acc.totals.cases.saturating_add(c);
            }
            if let Some(d) = r.deaths.get() {
                acc.max_deaths = Some(acc.max_deaths.map_or(d, |m| m.max(d)));
                acc.totals.deaths = acc.totals.deaths.saturating_add(d);
            }
            acc.records += 1;
            acc
        })
    }

    /// Per-country sums for a month in a single scan. Countries without
    /// records in the month are absent.
    pub fn country_totals(&self, month: Month) -> HashMap<&'a str, Totals> {
        let mut totals: HashMap<&'a str, Totals> = HashMap::new();
        for r in self.records_for_month(month) {
            let entry = totals.entry(r.country.as_str()).or_default();
            if let Some(c) = r.cases.get() {
                entry.cases = entry.cases.saturating_add(c);
            }
            if let Some(d) = r.deaths.get() {
                entry.deaths = entry.deaths.saturating_add(d);
            }
        }
        totals
    }

    /// Daily points for the drill-down chart, in date order
    pub fn daily_series(&self, country: &str, month: Month) -> Vec<SeriesPoint> {
        let max_cases = self.max_cases_for_country(country, month);
        let max_deaths = self.max_deaths_for_country(country, month);

        let mut days: Vec<&CaseRecord> = self.records_for_country_and_month(country, month).collect();
        days.sort_by_key(|r| r.date);
        days.into_iter()
            .map(|r| SeriesPoint {
                day: r.day(),
                normalized_cases: normalize(r.cases, max_cases),
                normalized_deaths: normalize(r.deaths, max_deaths),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    fn testland() -> Vec<CaseRecord> {
        vec![
            CaseRecord::new("Testland", day(4, 1), 10, 1),
            CaseRecord::new("Testland", day(4, 2), 20, 2),
            CaseRecord::new("Testland", day(4, 30), 30, 3),
            CaseRecord::new("Testland", day(5, 1), 500, 50),
            CaseRecord::new("Otherland", day(4, 15), 7, 0),
            CaseRecord::new("Otherland", day(3, 31), 9, 9),
        ]
    }

    #[test]
    fn test_testland_scenario() {
        let records = testland();
        let stats = Stats::new(&records);
        assert_eq!(stats.total_cases_for_country("Testland", Month::April), 60);
        assert_eq!(stats.total_deaths_for_country("Testland", Month::April), 6);
        assert_eq!(stats.max_deaths_for_country("Testland", Month::April), Some(3));
        assert_eq!(stats.max_cases_for_country("Testland", Month::April), Some(30));
    }

    #[test]
    fn test_world_aggregates() {
        let records = testland();
        let stats = Stats::new(&records);
        assert_eq!(stats.total_cases(Month::April), 67);
        assert_eq!(stats.total_deaths(Month::April), 6);
        assert_eq!(stats.max_cases(Month::April), Some(30));
        assert_eq!(stats.max_deaths(Month::March), Some(9));
        assert_eq!(stats.records_for_month(Month::April).count(), 4);
    }

    #[test]
    fn test_month_edges_inclusive() {
        let records = testland();
        let stats = Stats::new(&records);
        let april: Vec<_> = stats.records_for_month(Month::April).map(|r| r.date).collect();
        assert!(april.contains(&day(4, 1)));
        assert!(april.contains(&day(4, 30)));
        assert!(!april.contains(&day(5, 1)));
        assert!(!april.contains(&day(3, 31)));
    }

    #[test]
    fn test_country_match_is_exact() {
        let records = testland();
        let stats = Stats::new(&records);
        assert_eq!(stats.records_for_country("Testland").count(), 4);
        assert_eq!(stats.records_for_country("testland").count(), 0);
        assert_eq!(stats.records_for_country("Testland ").count(), 0);
    }

    #[test]
    fn test_empty_selection_sentinels() {
        let records = testland();
        let stats = Stats::new(&records);
        assert_eq!(stats.max_cases_for_country("Nowhereland", Month::April), None);
        assert_eq!(stats.max_deaths_for_country("Nowhereland", Month::April), None);
        assert_eq!(stats.total_cases_for_country("Nowhereland", Month::April), 0);
        assert_eq!(stats.total_deaths_for_country("Nowhereland", Month::April), 0);
        assert_eq!(stats.max_cases(Month::January), None);
        assert_eq!(stats.total_cases(Month::January), 0);
        assert!(stats.daily_series("Nowhereland", Month::April).is_empty());

        let none: Vec<CaseRecord> = Vec::new();
        assert_eq!(Stats::new(&none).month_summary(Month::April), MonthSummary::default());
    }

    #[test]
    fn test_invalid_counts_are_skipped() {
        let records = vec![
            CaseRecord::new("Testland", day(4, 1), Count::INVALID, 4),
            CaseRecord::new("Testland", day(4, 2), 5, Count::INVALID),
        ];
        let stats = Stats::new(&records);
        assert_eq!(stats.total_cases(Month::April), 5);
        assert_eq!(stats.max_deaths(Month::April), Some(4));

        let series = stats.daily_series("Testland", Month::April);
        assert_eq!(series[0].normalized_cases, 0.0);
        assert_eq!(series[1].normalized_deaths, 0.0);

        let only_invalid = vec![CaseRecord::new("Testland", day(4, 1), Count::INVALID, Count::INVALID)];
        assert_eq!(Stats::new(&only_invalid).max_cases(Month::April), None);
    }

    #[test]
    fn test_daily_series() {
        let mut records = testland();
        records.swap(0, 2);
        let stats = Stats::new(&records);
        let series = stats.daily_series("Testland", Month::April);
        let days: Vec<u32> = series.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![1, 2, 30]);
        assert_eq!(series[2].normalized_cases, 1.0);
        assert!((series[0].normalized_deaths - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_series_with_zero_max_is_flat() {
        let records = vec![CaseRecord::new("Calmland", day(4, 3), 0, 0)];
        let series = Stats::new(&records).daily_series("Calmland", Month::April);
        assert_eq!(series[0].normalized_cases, 0.0);
        assert!(!series[0].normalized_deaths.is_nan());
    }

    #[test]
    fn test_summary_and_country_totals_agree() {
        let records = testland();
        let stats = Stats::new(&records);
        let summary = stats.month_summary(Month::April);
        assert_eq!(summary.max_cases, stats.max_cases(Month::April));
        assert_eq!(summary.max_deaths, stats.max_deaths(Month::April));
        assert_eq!(summary.totals.cases, stats.total_cases(Month::April));
        assert_eq!(summary.records, 4);

        let per_country = stats.country_totals(Month::April);
        assert_eq!(per_country["Testland"], Totals { cases: 60, deaths: 6 });
        assert!(!per_country.contains_key("Nowhereland"));
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let records = testland();
        let stats = Stats::new(&records);
        assert_eq!(
            stats.daily_series("Testland", Month::April),
            stats.daily_series("Testland", Month::April)
        );
        assert_eq!(stats.month_summary(Month::May), stats.month_summary(Month::May));
    }

    fn arb_record() -> impl Strategy<Value = CaseRecord> {
        (
            prop::sample::select(vec!["Aland", "Bland", "Cland", "Dland"]),
            1u32..=366,
            prop::option::weighted(0.9, 0i64..1_000_000),
            prop::option::weighted(0.9, 0i64..10_000),
        )
            .prop_map(|(country, ordinal, cases, deaths)| CaseRecord {
                country: country.to_string(),
                date: NaiveDate::from_yo_opt(2020, ordinal).unwrap(),
                cases: cases.map(Count::new).unwrap_or(Count::INVALID),
                deaths: deaths.map(Count::new).unwrap_or(Count::INVALID),
            })
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_of_countries(records in prop::collection::vec(arb_record(), 0..200)) {
            let stats = Stats::new(&records);
            for month in Month::ALL {
                let by_country: i64 = ["Aland", "Bland", "Cland", "Dland"]
                    .iter()
                    .map(|c| stats.total_cases_for_country(c, month))
                    .sum();
                prop_assert_eq!(stats.total_cases(month), by_country);
                let by_map: i64 = stats.country_totals(month).values().map(|t| t.deaths).sum();
                prop_assert_eq!(stats.total_deaths(month), by_map);
            }
        }

        #[test]
        fn prop_month_filter_bounds(records in prop::collection::vec(arb_record(), 0..200)) {
            let stats = Stats::new(&records);
            for month in Month::ALL {
                let (from, to) = month.window().literal_bounds();
                for r in stats.records_for_month(month) {
                    let text = r.date.format("%Y-%m-%d").to_string();
                    prop_assert!(text >= from && text <= to);
                }
            }
        }

        #[test]
        fn prop_max_dominates(records in prop::collection::vec(arb_record(), 1..200)) {
            let stats = Stats::new(&records);
            for month in Month::ALL {
                let max = stats.max_cases(month);
                for r in stats.records_for_month(month) {
                    if let Some(c) = r.cases.get() {
                        prop_assert!(max.is_some_and(|m| m >= c));
                    }
                }
            }
        }
    }
}
