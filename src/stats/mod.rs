mod month;
mod query;
pub mod scale;

pub use month::{Month, MonthWindow, DATA_YEAR};
pub use query::{MonthSummary, SeriesPoint, Stats, Totals};
