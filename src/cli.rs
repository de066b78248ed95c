use clap::Parser;
use covid_map::data::DataSources;
use covid_map::stats::Month;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Terminal world map of monthly COVID-19 cases and deaths")]
pub struct Cli {
    /// Country boundaries, TopoJSON or GeoJSON
    #[arg(long, value_name = "PATH", default_value = "data/countries.json")]
    pub countries: PathBuf,

    /// Daily case table (CSV with name_en, date, cases, deaths)
    #[arg(long, value_name = "PATH", default_value = "data/covid.csv")]
    pub cases: PathBuf,

    /// Month shown at startup, full name or three-letter abbreviation
    #[arg(long, default_value_t = Month::April)]
    pub month: Month,

    /// Topology object holding the countries
    #[arg(long, default_value = "countries")]
    pub object: String,

    /// Log file; the terminal belongs to the dashboard
    #[arg(long, value_name = "PATH", default_value = "covid-map.log")]
    pub log_file: PathBuf,
}

impl Cli {
    pub fn sources(&self) -> DataSources {
        DataSources {
            countries: self.countries.clone(),
            cases: self.cases.clone(),
            object: self.object.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["covid-map"]).unwrap();
        assert_eq!(cli.month, Month::April);
        assert_eq!(cli.sources().object, "countries");
        assert_eq!(cli.cases, PathBuf::from("data/covid.csv"));
    }

    #[test]
    fn test_month_argument() {
        let cli = Cli::try_parse_from(["covid-map", "--month", "sep"]).unwrap();
        assert_eq!(cli.month, Month::September);
        assert!(Cli::try_parse_from(["covid-map", "--month", "Smarch"]).is_err());
    }
}
