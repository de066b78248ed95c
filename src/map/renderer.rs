use crate::braille::BrailleCanvas;
use crate::data::{CountryFeature, Dataset};
use crate::map::geometry::{draw_disc, draw_line, Bbox};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use crate::stats::scale::clamp_unit;
use crate::view::MapScene;
use std::sync::Arc;

/// Grid cell size for the country lookup index, in degrees
const GRID_CELL_DEGREES: f64 = 5.0;

/// Display toggles for the map layers
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_fills: bool,
    pub show_borders: bool,
    pub show_circles: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_fills: true,
            show_borders: true,
            show_circles: true,
        }
    }
}

/// Rendered layers, drawn back to front by the UI
pub struct MapLayers {
    /// Whole cells shaded by case opacity
    pub fills: BrailleCanvas,
    pub borders: BrailleCanvas,
    /// Outline of the selected country
    pub highlight: BrailleCanvas,
    /// Death circles, ink is marker opacity
    pub circles: BrailleCanvas,
}

/// Draws country boundaries, fills and death markers for a [`MapScene`]
pub struct MapRenderer {
    dataset: Arc<Dataset>,
    bboxes: Vec<Bbox>,
    centroids: Vec<Option<(f64, f64)>>,
    grid: FeatureGrid,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let bboxes: Vec<Bbox> = dataset.features().iter().map(CountryFeature::bbox).collect();
        let centroids = dataset.features().iter().map(CountryFeature::centroid).collect();
        let grid = FeatureGrid::build(bboxes.iter(), GRID_CELL_DEGREES);
        Self {
            dataset,
            bboxes,
            centroids,
            grid,
            settings: DisplaySettings::default(),
        }
    }

    /// Index of the country containing the point, if any
    pub fn country_at(&self, lon: f64, lat: f64) -> Option<usize> {
        let features = self.dataset.features();
        self.grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .find(|&idx| self.bboxes[idx].contains(lon, lat) && features[idx].contains(lon, lat))
    }

    /// Name of the country containing the point, if any
    pub fn country_name_at(&self, lon: f64, lat: f64) -> Option<&str> {
        self.country_at(lon, lat)
            .map(|idx| self.dataset.features()[idx].name.as_str())
    }

    /// Render every layer into canvases of `width` x `height` characters.
    /// Without a scene only borders are drawn.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        scene: Option<&MapScene>,
        selected: Option<&str>,
    ) -> MapLayers {
        let mut layers = MapLayers {
            fills: BrailleCanvas::new(width, height),
            borders: BrailleCanvas::new(width, height),
            highlight: BrailleCanvas::new(width, height),
            circles: BrailleCanvas::new(width, height),
        };
        let features = self.dataset.features();

        // Marks are built in feature order; fall back to a name lookup if
        // the scene came from a different feature list
        let mark_for = |idx: usize| {
            let scene = scene?;
            let name = &features[idx].name;
            scene
                .marks
                .get(idx)
                .filter(|m| &m.name == name)
                .or_else(|| scene.mark(name))
        };

        if self.settings.show_fills && scene.is_some() {
            for cy in 0..height {
                for cx in 0..width {
                    let (lon, lat) = viewport.cell_center(cx, cy);
                    let Some(idx) = self.country_at(lon, lat) else {
                        continue;
                    };
                    let ink = mark_for(idx).map_or(0.0, |m| clamp_unit(m.fill_opacity));
                    if ink > 0.0 {
                        layers.fills.fill_cell(cx, cy, ink as f32);
                    }
                }
            }
        }

        for feature in features {
            let is_selected = selected == Some(feature.name.as_str());
            if self.settings.show_borders || is_selected {
                let canvas = if is_selected { &mut layers.highlight } else { &mut layers.borders };
                for ring in feature.polygons.iter().flatten() {
                    draw_ring(canvas, ring, viewport);
                }
            }
        }

        if self.settings.show_circles {
            for (idx, centroid) in self.centroids.iter().enumerate() {
                let (Some((lon, lat)), Some(mark)) = (centroid, mark_for(idx)) else {
                    continue;
                };
                let (px, py) = viewport.project(*lon, *lat);
                let ink = clamp_unit(mark.circle_opacity) as f32;
                draw_disc(&mut layers.circles, px, py, mark.radius, ink);
            }
        }

        layers
    }
}

/// Draw a ring with viewport culling. Segments longer than the canvas are
/// skipped; they are antimeridian wraps, not real edges.
fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(f64, f64)], viewport: &Viewport) {
    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in ring {
        let p = viewport.project(lon, lat);
        if let Some(q) = prev {
            let dist = ((p.0 - q.0).abs() + (p.1 - q.1).abs()) as usize;
            if dist < viewport.width && viewport.segment_might_be_visible(q, p) {
                draw_line(canvas, q.0, q.1, p.0, p.1, 1.0);
            }
        }
        prev = Some(p);
    }
}
