use crate::app::App;
use covid_map::braille::BrailleCanvas;
use covid_map::map::MapLayers;
use covid_map::stats::Month;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Widget},
    Frame,
};

const CASE_GREEN: (u8, u8, u8) = (76, 175, 80);
const DEATH_RED: (u8, u8, u8) = (229, 57, 53);

/// Screen regions of the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Areas {
    pub map: Rect,
    pub months: Rect,
    pub summary: Rect,
    pub chart: Rect,
    pub status: Rect,
}

impl Areas {
    /// Map drawing area inside its border
    pub fn map_inner(&self) -> Rect {
        self.map.inner(Margin::new(1, 1))
    }

    /// Month list rows inside its border
    pub fn months_inner(&self) -> Rect {
        self.months.inner(Margin::new(1, 1))
    }
}

/// Split the terminal: map on the left, selector, summary and chart on the right
pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(42)])
        .split(rows[0]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(Month::ALL.len() as u16 + 2),
            Constraint::Length(6),
            Constraint::Min(5),
        ])
        .split(columns[1]);

    Areas {
        map: columns[0],
        months: side[0],
        summary: side[1],
        chart: side[2],
        status: rows[1],
    }
}

/// Blend a base color toward black by ink (0 = black, 1 = full color)
fn shade((r, g, b): (u8, u8, u8), ink: f32) -> Color {
    let k = ink.clamp(0.0, 1.0);
    let c = |v: u8| (v as f32 * (0.25 + 0.75 * k)) as u8;
    Color::Rgb(c(r), c(g), c(b))
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area());
    render_map(frame, app, areas.map);
    render_months(frame, app, areas.months);
    render_summary(frame, app, areas.summary);
    render_chart(frame, app, areas.chart);
    render_status_bar(frame, app, areas.status);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("COVID-19 · {}", app.controller.state().month());
    let block = titled(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        app.panels.map.as_ref(),
        app.controller.state().country(),
    );
    frame.render_widget(MapWidget { layers }, inner);
}

/// Braille map layers composited into the frame buffer
struct MapWidget {
    layers: MapLayers,
}

fn paint(canvas: &BrailleCanvas, area: Rect, buf: &mut Buffer, color: impl Fn(f32) -> Color) {
    for (cx, cy, cell) in canvas.cells() {
        if cx >= area.width as usize || cy >= area.height as usize {
            continue;
        }
        let (x, y) = (area.x + cx as u16, area.y + cy as u16);
        buf[(x, y)].set_char(cell.glyph).set_fg(color(cell.ink));
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: fills, borders, selected outline, death markers
        paint(&self.layers.fills, area, buf, |ink| shade(CASE_GREEN, ink));
        paint(&self.layers.borders, area, buf, |_| Color::DarkGray);
        paint(&self.layers.highlight, area, buf, |_| Color::Yellow);
        paint(&self.layers.circles, area, buf, |ink| shade(DEATH_RED, ink));
    }
}

fn render_months(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.controller.state().month();
    let items: Vec<ListItem> = Month::ALL
        .iter()
        .map(|&month| {
            let style = if month == selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(Span::styled(format!(" {month}"), style)))
        })
        .collect();
    frame.render_widget(List::new(items).block(titled("Month [ ]")), area);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let block = titled("Country");
    let lines = match &app.panels.summary {
        Some(summary) => {
            let label = Style::default().fg(Color::DarkGray);
            let mut lines = vec![
                Line::from(vec![Span::styled("Country: ", label), Span::raw(summary.country.clone())]),
                Line::from(vec![Span::styled("Month:   ", label), Span::raw(summary.month.to_string())]),
                Line::from(vec![
                    Span::styled("Cases:   ", label),
                    Span::styled(summary.total_cases.to_string(), Style::default().fg(shade(CASE_GREEN, 1.0))),
                ]),
                Line::from(vec![
                    Span::styled("Deaths:  ", label),
                    Span::styled(summary.total_deaths.to_string(), Style::default().fg(shade(DEATH_RED, 1.0))),
                ]),
            ];
            if !summary.has_data {
                lines[0].spans.push(Span::styled(" (no data)", label));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "Click a country for details",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = titled("Daily, share of month peak");
    let Some(series) = &app.panels.chart else {
        frame.render_widget(block, area);
        return;
    };

    let cases: Vec<(f64, f64)> = series.iter().map(|p| (p.day as f64, p.normalized_cases)).collect();
    let deaths: Vec<(f64, f64)> = series.iter().map(|p| (p.day as f64, p.normalized_deaths)).collect();
    let datasets = vec![
        Dataset::default()
            .name("cases")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(shade(CASE_GREEN, 1.0)))
            .data(&cases),
        Dataset::default()
            .name("deaths")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(shade(DEATH_RED, 1.0)))
            .data(&deaths),
    ];

    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([1.0, 31.0])
                .labels(["1", "16", "31"]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, 1.0])
                .labels(["0", "0.5", "1"]),
        );
    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let settings = &app.map_renderer.settings;
    let toggle = |on: bool, text: &'static str| Span::styled(text, Style::default().fg(if on { Color::Green } else { Color::DarkGray }));

    let mut spans = Vec::new();
    if let Some(scene) = &app.panels.map {
        spans.push(Span::styled(" World: ", dim));
        spans.push(Span::styled(scene.summary.totals.cases.to_string(), Style::default().fg(shade(CASE_GREEN, 1.0))));
        spans.push(Span::styled(" cases ", dim));
        spans.push(Span::styled(scene.summary.totals.deaths.to_string(), Style::default().fg(shade(DEATH_RED, 1.0))));
        spans.push(Span::styled(" deaths | ", dim));
    }
    spans.push(Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)));
    spans.push(Span::styled(" ", dim));
    spans.push(toggle(settings.show_fills, "[f]ill "));
    spans.push(toggle(settings.show_borders, "[b]order "));
    spans.push(toggle(settings.show_circles, "[c]ircle "));
    if let Some(name) = app.hovered_country() {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(name.to_string(), Style::default().fg(Color::White)));
    }
    spans.push(Span::styled(" | []:month click:country hjkl:pan +/-:zoom q:quit", dim));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
