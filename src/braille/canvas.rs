/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots) and carries an
/// ink level in [0, 1] that the UI turns into a color intensity.
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<u8>,
    ink: Vec<f32>,
}

/// One rendered character cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub ink: f32,
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
            ink: vec![0.0; width * height],
        }
    }

    /// Set a dot and raise the cell's ink to at least `ink`.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    /// Negative or out-of-range coordinates are ignored.
    pub fn stamp(&mut self, x: i32, y: i32, ink: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            _ => 0x80,
        };

        let idx = cy * self.width + cx;
        self.dots[idx] |= bit;
        self.ink[idx] = self.ink[idx].max(ink);
    }

    /// Fill a whole character cell (all 8 dots) at character coordinates
    pub fn fill_cell(&mut self, cx: usize, cy: usize, ink: f32) {
        if cx >= self.width || cy >= self.height {
            return;
        }
        let idx = cy * self.width + cx;
        self.dots[idx] = 0xFF;
        self.ink[idx] = self.ink[idx].max(ink);
    }

    /// Cell at character coordinates, `None` when blank or out of range
    pub fn cell(&self, cx: usize, cy: usize) -> Option<Cell> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        let idx = cy * self.width + cx;
        let bits = self.dots[idx];
        (bits != 0).then(|| Cell {
            glyph: char::from_u32(0x2800 + bits as u32).unwrap_or(' '),
            ink: self.ink[idx],
        })
    }

    pub fn is_blank(&self) -> bool {
        self.dots.iter().all(|&b| b == 0)
    }

    /// Iterate non-blank cells as (column, row, cell)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        (0..self.height).flat_map(move |cy| (0..self.width).filter_map(move |cx| self.cell(cx, cy).map(|c| (cx, cy, c))))
    }

    /// Convert the canvas to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.dots
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' ')).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dot() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.stamp(0, 0, 0.5);
        assert_eq!(canvas.to_string(), "⠁");
        assert_eq!(canvas.cell(0, 0).unwrap().ink, 0.5);
    }

    #[test]
    fn test_diagonal() {
        let mut canvas = BrailleCanvas::new(2, 1);
        for i in 0..4 {
            canvas.stamp(i, i, 1.0);
        }
        // First char: (0,0) and (1,1) = 0x01 | 0x10 = 0x11
        // Second char: (0,2) and (1,3) = 0x04 | 0x80 = 0x84
        assert_eq!(canvas.to_string(), "⠑⢄");
    }

    #[test]
    fn test_ink_keeps_max() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.stamp(0, 0, 0.8);
        canvas.stamp(1, 1, 0.2);
        assert_eq!(canvas.cell(0, 0).unwrap().ink, 0.8);
    }

    #[test]
    fn test_fill_and_bounds() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.fill_cell(1, 1, 0.3);
        canvas.fill_cell(5, 5, 1.0);
        canvas.stamp(-1, 0, 1.0);
        assert_eq!(canvas.cell(1, 1).unwrap().glyph, '⣿');
        assert_eq!(canvas.cells().count(), 1);
        assert!(canvas.cell(0, 0).is_none());
    }
}
