use crate::data::Dataset;
use crate::stats::{Month, SeriesPoint};
use crate::view::scene::{DetailScene, MapScene, Summary};
use crate::view::state::ViewState;
use std::sync::Arc;

/// The drawing side of the dashboard. Each call fully replaces what that
/// panel showed before.
pub trait RenderSink {
    fn render_map(&mut self, scene: &MapScene);
    fn render_line_chart(&mut self, series: &[SeriesPoint]);
    fn render_summary_panel(&mut self, summary: &Summary);
    /// Blank both the line chart and the summary panel
    fn clear_detail(&mut self);
}

/// Owns the [`ViewState`] and turns user selections into render calls
pub struct Controller {
    dataset: Arc<Dataset>,
    state: ViewState,
}

impl Controller {
    pub fn new(dataset: Arc<Dataset>, month: Month) -> Self {
        Self {
            dataset,
            state: ViewState::new(month),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// First paint after both datasets are loaded
    pub fn start(&mut self, sink: &mut impl RenderSink) {
        tracing::info!(month = %self.state.month, "initial render");
        self.render(sink);
    }

    /// Month selector changed: the old drill-down no longer matches, so the
    /// country is dropped along with the detail panels.
    pub fn select_month(&mut self, month: Month, sink: &mut impl RenderSink) {
        tracing::debug!(from = %self.state.month, to = %month, "select month");
        self.state.month = month;
        self.state.country = None;
        self.render(sink);
    }

    pub fn next_month(&mut self, sink: &mut impl RenderSink) {
        self.select_month(self.state.month.next(), sink);
    }

    pub fn prev_month(&mut self, sink: &mut impl RenderSink) {
        self.select_month(self.state.month.prev(), sink);
    }

    /// A country mark was clicked. The map is left as is.
    pub fn select_country(&mut self, country: &str, sink: &mut impl RenderSink) {
        tracing::debug!(country, month = %self.state.month, "select country");
        self.state.country = Some(country.to_string());
        if let Some(detail) = self.detail_scene() {
            sink.render_line_chart(&detail.series);
            sink.render_summary_panel(&detail.summary);
        }
    }

    /// Dismiss the drill-down without touching the month
    pub fn clear_country(&mut self, sink: &mut impl RenderSink) {
        if self.state.country.take().is_some() {
            sink.clear_detail();
        }
    }

    pub fn map_scene(&self) -> MapScene {
        MapScene::build(&self.dataset, self.state.month)
    }

    pub fn detail_scene(&self) -> Option<DetailScene> {
        self.state
            .country
            .as_deref()
            .map(|country| DetailScene::build(&self.dataset, country, self.state.month))
    }

    /// Draw everything the current state implies
    pub fn render(&self, sink: &mut impl RenderSink) {
        sink.render_map(&self.map_scene());
        match self.detail_scene() {
            Some(detail) => {
                sink.render_line_chart(&detail.series);
                sink.render_summary_panel(&detail.summary);
            }
            None => sink.clear_detail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CaseRecord, CountryFeature};
    use chrono::NaiveDate;

    #[derive(Debug, PartialEq)]
    enum Call {
        Map(Month),
        Chart(usize),
        Summary(String, Month, i64, i64),
        Clear,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        last_map: Option<MapScene>,
    }

    impl RenderSink for Recorder {
        fn render_map(&mut self, scene: &MapScene) {
            self.calls.push(Call::Map(scene.month));
            self.last_map = Some(scene.clone());
        }
        fn render_line_chart(&mut self, series: &[SeriesPoint]) {
            self.calls.push(Call::Chart(series.len()));
        }
        fn render_summary_panel(&mut self, s: &Summary) {
            self.calls.push(Call::Summary(s.country.clone(), s.month, s.total_cases, s.total_deaths));
        }
        fn clear_detail(&mut self) {
            self.calls.push(Call::Clear);
        }
    }

    fn controller() -> Controller {
        let date = |m, d| NaiveDate::from_ymd_opt(2020, m, d).unwrap();
        let feature = |name: &str| CountryFeature {
            id: name.to_string(),
            name: name.to_string(),
            polygons: Vec::new(),
        };
        let dataset = Dataset::new(
            vec![feature("Testland"), feature("Otherland")],
            vec![
                CaseRecord::new("Testland", date(4, 1), 10, 1),
                CaseRecord::new("Testland", date(4, 2), 20, 2),
                CaseRecord::new("Testland", date(4, 3), 30, 3),
                CaseRecord::new("Testland", date(5, 3), 70, 7),
                CaseRecord::new("Otherland", date(5, 3), 1, 0),
            ],
        );
        Controller::new(Arc::new(dataset), Month::default())
    }

    #[test]
    fn test_initial_render() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.start(&mut sink);
        assert_eq!(sink.calls, vec![Call::Map(Month::April), Call::Clear]);
        assert_eq!(c.state().country(), None);
    }

    #[test]
    fn test_select_country_renders_detail_only() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.select_country("Testland", &mut sink);
        assert_eq!(
            sink.calls,
            vec![Call::Chart(3), Call::Summary("Testland".into(), Month::April, 60, 6)]
        );
        assert_eq!(c.state().country(), Some("Testland"));
    }

    #[test]
    fn test_select_month_clears_country() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.select_country("Testland", &mut sink);
        sink.calls.clear();

        c.select_month(Month::May, &mut sink);
        assert_eq!(sink.calls, vec![Call::Map(Month::May), Call::Clear]);
        assert_eq!(c.state().country(), None);
        assert_eq!(c.state().month(), Month::May);

        // The next click uses the new month
        sink.calls.clear();
        c.select_country("Testland", &mut sink);
        assert_eq!(sink.calls[1], Call::Summary("Testland".into(), Month::May, 70, 7));
    }

    #[test]
    fn test_month_stepping_wraps() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.select_month(Month::December, &mut sink);
        c.next_month(&mut sink);
        assert_eq!(c.state().month(), Month::January);
        c.prev_month(&mut sink);
        assert_eq!(c.state().month(), Month::December);
    }

    #[test]
    fn test_clear_country() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.clear_country(&mut sink);
        assert!(sink.calls.is_empty());

        c.select_country("Otherland", &mut sink);
        sink.calls.clear();
        c.clear_country(&mut sink);
        assert_eq!(sink.calls, vec![Call::Clear]);
        assert_eq!(c.state().month(), Month::April);
    }

    #[test]
    fn test_unknown_country_renders_zeros() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.select_country("Nowhereland", &mut sink);
        assert_eq!(
            sink.calls,
            vec![Call::Chart(0), Call::Summary("Nowhereland".into(), Month::April, 0, 0)]
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut c = controller();
        let mut sink = Recorder::default();
        c.select_country("Testland", &mut sink);
        assert_eq!(c.detail_scene(), c.detail_scene());

        c.render(&mut sink);
        let first = sink.last_map.take();
        c.render(&mut sink);
        assert_eq!(first, sink.last_map);
    }
}
