use crate::data::Dataset;
use crate::stats::scale::{radius_scale, OpacityScale};
use crate::stats::{Month, MonthSummary, SeriesPoint, Totals};
use rayon::prelude::*;

/// How one country is drawn for the selected month
#[derive(Clone, Debug, PartialEq)]
pub struct CountryMark {
    pub name: String,
    /// Case share of the world, unclamped
    pub fill_opacity: f64,
    /// Death marker radius in braille pixels
    pub radius: f64,
    /// Death share of the world, unclamped
    pub circle_opacity: f64,
    pub totals: Totals,
}

/// Everything the map layer needs for one month, in feature order
#[derive(Clone, Debug, PartialEq)]
pub struct MapScene {
    pub month: Month,
    pub summary: MonthSummary,
    pub marks: Vec<CountryMark>,
}

impl MapScene {
    pub fn build(dataset: &Dataset, month: Month) -> Self {
        let stats = dataset.stats();
        let summary = stats.month_summary(month);
        let per_country = stats.country_totals(month);

        let radius = radius_scale(summary.max_deaths);
        let fill = OpacityScale::cases(summary.max_cases, summary.totals.cases);
        let circle = OpacityScale::deaths(summary.max_deaths, summary.totals.deaths);

        let marks = dataset
            .features()
            .par_iter()
            .map(|feature| {
                // Unmatched names aggregate to zero rather than failing
                let totals = per_country.get(feature.name.as_str()).copied().unwrap_or_default();
                CountryMark {
                    name: feature.name.clone(),
                    fill_opacity: fill.ratio(totals.cases),
                    radius: radius.scale(totals.deaths as f64),
                    circle_opacity: circle.ratio(totals.deaths),
                    totals,
                }
            })
            .collect();

        tracing::debug!(%month, records = summary.records, "map scene built");
        Self { month, summary, marks }
    }

    pub fn mark(&self, name: &str) -> Option<&CountryMark> {
        self.marks.iter().find(|m| m.name == name)
    }
}

/// Text panel contents for the selected country
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub country: String,
    pub month: Month,
    pub total_cases: i64,
    pub total_deaths: i64,
    /// False when the country has no rows in the month
    pub has_data: bool,
}

/// Drill-down for one country and month
#[derive(Clone, Debug, PartialEq)]
pub struct DetailScene {
    pub summary: Summary,
    pub series: Vec<SeriesPoint>,
}

impl DetailScene {
    pub fn build(dataset: &Dataset, country: &str, month: Month) -> Self {
        let stats = dataset.stats();
        let series = stats.daily_series(country, month);
        let summary = Summary {
            country: country.to_string(),
            month,
            total_cases: stats.total_cases_for_country(country, month),
            total_deaths: stats.total_deaths_for_country(country, month),
            has_data: !series.is_empty(),
        };
        tracing::debug!(country, %month, points = series.len(), "detail scene built");
        Self { summary, series }
    }
}
