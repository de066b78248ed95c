use crate::map::geometry::Bbox;
use std::collections::HashMap;

/// Spatial index over country bounding boxes.
/// Each feature is inserted into every cell its bbox overlaps, so a point
/// query never misses a feature; false positives are left for the caller's
/// exact polygon test.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes, indexed by position. Empty boxes
    /// (features without geometry) are left out.
    pub fn build<'b>(bboxes: impl Iterator<Item = &'b Bbox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(bbox.min_lon, bbox.min_lat);
            let max_cell = grid.to_cell(bbox.max_lon, bbox.max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate features whose bbox cell covers the point
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Bbox {
        Bbox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    #[test]
    fn test_point_query() {
        let boxes = [bbox(0.0, 0.0, 12.0, 3.0), bbox(-20.0, -20.0, -15.0, -15.0), Bbox::EMPTY];
        let grid = FeatureGrid::build(boxes.iter(), 5.0);
        assert_eq!(grid.query_point(11.0, 1.0), &[0]);
        assert_eq!(grid.query_point(-16.0, -16.0), &[1]);
        assert!(grid.query_point(100.0, 50.0).is_empty());
    }

    #[test]
    fn test_overlapping_boxes() {
        let boxes = [bbox(0.0, 0.0, 4.0, 4.0), bbox(3.0, 3.0, 6.0, 6.0)];
        let grid = FeatureGrid::build(boxes.iter(), 5.0);
        assert_eq!(grid.query_point(3.5, 3.5), &[0, 1]);
    }
}
