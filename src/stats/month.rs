use crate::error::MonthParseError;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Every record in the source table falls in this year
pub const DATA_YEAR: i32 = 2020;

/// Calendar month as offered by the month selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Month {
    January,
    February,
    March,
    #[default]
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// 1-based month number
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Following month, December wraps to January
    pub fn next(self) -> Month {
        Self::ALL[(self as usize + 1) % 12]
    }

    /// Preceding month, January wraps to December
    pub fn prev(self) -> Month {
        Self::ALL[(self as usize + 11) % 12]
    }

    pub fn window(self) -> MonthWindow {
        MonthWindow::new(self, DATA_YEAR)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    /// Accepts full names and three-letter abbreviations, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| {
                let name = m.name().to_ascii_lowercase();
                name == wanted || (wanted.len() == 3 && name.starts_with(&wanted))
            })
            .ok_or_else(|| MonthParseError(s.to_string()))
    }
}

/// Inclusive date range covered by one month of the data year
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthWindow {
    pub fn new(month: Month, year: i32) -> Self {
        let first = NaiveDate::from_ymd_opt(year, month.number(), 1).unwrap_or(NaiveDate::MIN);
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(first);
        Self { first, last }
    }

    #[inline(always)]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    /// The fixed-width string bounds `YYYY-MM-01 ..= YYYY-MM-31` that the
    /// dashboard has always filtered with. Lexicographic comparison against
    /// these matches [`MonthWindow::contains`] for every real calendar date.
    pub fn literal_bounds(&self) -> (String, String) {
        let prefix = format!("{:04}-{:02}", self.first.year(), self.first.month());
        (format!("{prefix}-01"), format!("{prefix}-31"))
    }
}
