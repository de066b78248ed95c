use std::f64::consts::PI;

/// Mercator blows up at the poles; Antarctica is clipped here
const MAX_LAT: f64 = 85.0;

/// Normalized Web Mercator y in [0, 1] (0 at the north edge)
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Visible map area in braille pixels, centered on a lon/lat with a zoom factor
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    /// 1.0 fits the whole world horizontally
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole-world view, nudged north since little data sits below 60°S
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(10.0, 25.0, 1.0, width, height)
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let step = 360.0 / self.scale();
        self.center_lon += dx as f64 * step;
        self.center_lat -= dy as f64 * step * 0.5; // Mercator distortion

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = self.center_lat.clamp(-MAX_LAT, MAX_LAT);
    }

    /// Zoom by factor, keeping the point under (px, py) fixed on screen
    pub fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(0.5, 40.0);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Zoom around the canvas center
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom_at(self.width as i32 / 2, self.height as i32 / 2, factor);
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let px = ((x - center_x) * self.scale() + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * self.scale() + self.height as f64 / 2.0) as i32;
        (px, py)
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / self.scale() + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / self.scale() + center_y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
        (lon, lat)
    }

    /// Geographic position at the middle of a character cell
    pub fn cell_center(&self, cx: usize, cy: usize) -> (f64, f64) {
        self.unproject(cx as i32 * 2 + 1, cy as i32 * 4 + 2)
    }

    /// Rough bounding-box visibility check for a segment
    pub fn segment_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        p1.0.max(p2.0) >= 0
            && p1.0.min(p2.0) < self.width as i32
            && p1.1.max(p2.1) >= 0
            && p1.1.min(p2.1) < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_roundtrip_near_center() {
        let vp = Viewport::new(20.0, 40.0, 2.0, 400, 200);
        let (px, py) = vp.project(21.0, 41.0);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - 21.0).abs() < 0.5);
        assert!((lat - 41.0).abs() < 0.5);
    }

    #[test]
    fn test_poles_stay_finite() {
        let vp = Viewport::world(200, 100);
        let (_, y_south) = vp.project(0.0, -90.0);
        let (_, y_north) = vp.project(0.0, 90.0);
        assert!(y_south > y_north);
        assert!(y_south < i32::MAX);
    }

    #[test]
    fn test_pan_wraps_longitude() {
        let mut vp = Viewport::new(179.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon < 0.0);
        vp.pan(0, -100_000);
        assert_eq!(vp.center_lat, MAX_LAT);
    }

    #[test]
    fn test_zoom_keeps_anchor() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 200, 100);
        let before = vp.unproject(150, 50);
        vp.zoom_at(150, 50, 2.0);
        let after = vp.unproject(150, 50);
        assert_eq!(vp.zoom, 2.0);
        assert!((before.0 - after.0).abs() < 2.0);
        vp.zoom_by(1000.0);
        assert_eq!(vp.zoom, 40.0);
    }
}
