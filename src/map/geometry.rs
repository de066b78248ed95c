use crate::braille::BrailleCanvas;
use glam::DVec2;

/// Axis-aligned lon/lat bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bbox {
    pub const EMPTY: Bbox = Bbox {
        min_lon: f64::INFINITY,
        min_lat: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
        max_lat: f64::NEG_INFINITY,
    };

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    #[inline(always)]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Crossing-number point-in-ring test (ring may or may not repeat its first point)
pub fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Area-weighted centroid of a ring, paired with its absolute area.
/// Degenerate rings fall back to the vertex mean.
pub fn ring_centroid(ring: &[(f64, f64)]) -> Option<((f64, f64), f64)> {
    if ring.is_empty() {
        return None;
    }

    let points: Vec<DVec2> = ring.iter().map(|&(x, y)| DVec2::new(x, y)).collect();
    let mut twice_area = 0.0;
    let mut weighted = DVec2::ZERO;
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        let cross = a.perp_dot(*b);
        twice_area += cross;
        weighted += (*a + *b) * cross;
    }

    if twice_area.abs() < f64::EPSILON {
        let mean = points.iter().copied().sum::<DVec2>() / points.len() as f64;
        return Some(((mean.x, mean.y), 0.0));
    }

    let center = weighted / (3.0 * twice_area);
    Some(((center.x, center.y), twice_area.abs() / 2.0))
}

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32, ink: f32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);
    loop {
        canvas.stamp(x, y, ink);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled disc (death markers). Radius 0 draws nothing.
pub fn draw_disc(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: f64, ink: f32) {
    if radius.is_nan() || radius <= 0.0 {
        return;
    }
    let r = radius.ceil() as i32;
    let r2 = radius * radius;
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f64 <= r2 {
                canvas.stamp(cx + dx, cy + dy, ink);
            }
        }
    }
}
