use crate::ui::{self, Areas};
use covid_map::data::Dataset;
use covid_map::map::{MapRenderer, Viewport};
use covid_map::stats::{Month, SeriesPoint};
use covid_map::view::{Controller, MapScene, RenderSink, Summary};
use ratatui::layout::{Position, Rect};
use std::sync::Arc;

/// What the dashboard panels currently show, filled in by the controller
#[derive(Default)]
pub struct Panels {
    pub map: Option<MapScene>,
    pub chart: Option<Vec<SeriesPoint>>,
    pub summary: Option<Summary>,
}

impl RenderSink for Panels {
    fn render_map(&mut self, scene: &MapScene) {
        self.map = Some(scene.clone());
    }

    fn render_line_chart(&mut self, series: &[SeriesPoint]) {
        self.chart = Some(series.to_vec());
    }

    fn render_summary_panel(&mut self, summary: &Summary) {
        self.summary = Some(summary.clone());
    }

    fn clear_detail(&mut self) {
        self.chart = None;
        self.summary = None;
    }
}

pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub controller: Controller,
    pub panels: Panels,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Set once the button moves, so release does not count as a click
    dragged: bool,
    /// Current mouse position for hover lookup
    pub mouse_pos: Option<(u16, u16)>,
    areas: Areas,
}

impl App {
    pub fn new(dataset: Arc<Dataset>, month: Month, width: u16, height: u16) -> Self {
        let mut app = Self {
            viewport: Viewport::world(0, 0),
            map_renderer: MapRenderer::new(dataset.clone()),
            controller: Controller::new(dataset, month),
            panels: Panels::default(),
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            areas: Areas::default(),
        };
        app.resize(width, height);
        app
    }

    /// First paint of every panel
    pub fn start(&mut self) {
        self.controller.start(&mut self.panels);
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.areas = ui::layout(Rect::new(0, 0, width, height));
        // Braille gives 2x4 resolution per character
        let inner = self.areas.map_inner();
        self.viewport.width = inner.width as usize * 2;
        self.viewport.height = inner.height as usize * 4;
    }

    /// Back to the whole-world view, keeping month and selection
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_by(1.5);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_by(1.0 / 1.5);
    }

    /// Zoom towards a screen position (terminal column/row)
    pub fn zoom_at(&mut self, col: u16, row: u16, factor: f64) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_at(px, py, factor);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn next_month(&mut self) {
        self.controller.next_month(&mut self.panels);
    }

    pub fn prev_month(&mut self) {
        self.controller.prev_month(&mut self.panels);
    }

    pub fn clear_country(&mut self) {
        self.controller.clear_country(&mut self.panels);
    }

    pub fn toggle_fills(&mut self) {
        self.map_renderer.settings.show_fills ^= true;
    }

    pub fn toggle_borders(&mut self) {
        self.map_renderer.settings.show_borders ^= true;
    }

    pub fn toggle_circles(&mut self) {
        self.map_renderer.settings.show_circles ^= true;
    }

    /// Terminal cell to braille pixel inside the map, if the cell is on the map
    fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let inner = self.areas.map_inner();
        if !inner.contains(Position::new(col, row)) {
            return None;
        }
        let px = (col - inner.x) as i32 * 2 + 1;
        let py = (row - inner.y) as i32 * 4 + 2;
        Some((px, py))
    }

    fn country_under(&self, col: u16, row: u16) -> Option<&str> {
        let (px, py) = self.map_pixel(col, row)?;
        let (lon, lat) = self.viewport.unproject(px, py);
        self.map_renderer.country_name_at(lon, lat)
    }

    /// Country under the mouse cursor
    pub fn hovered_country(&self) -> Option<&str> {
        let (col, row) = self.mouse_pos?;
        self.country_under(col, row)
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    pub fn begin_press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Pan by the mouse delta, scaled so the map follows the cursor
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Button released: a press without movement is a click
    pub fn end_press(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            self.click(col, row);
        }
    }

    /// Click on a month row selects it; click on a country drills down
    pub fn click(&mut self, col: u16, row: u16) {
        let months = self.areas.months_inner();
        if months.contains(Position::new(col, row)) {
            // Re-picking the current month is not a change
            if let Some(&month) = Month::ALL.get((row - months.y) as usize) {
                if month != self.controller.state().month() {
                    self.controller.select_month(month, &mut self.panels);
                }
            }
            return;
        }

        if let Some(country) = self.country_under(col, row).map(str::to_owned) {
            self.controller.select_country(&country, &mut self.panels);
        }
    }
}
