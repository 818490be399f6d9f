/// Pixel mapping for the 2D intensity image of a pane group
///
/// The image is a grid of `width` columns by `height` rows. Columns run in
/// display order (left to right on screen); rows are sub-spectra with the
/// first sub-spectrum at the bottom. The visible window is a sub-rectangle
/// of that grid: `x_view1..=x_view2` columns and `y_view1..=y_view2` rows
/// counted from the top.

use crate::data::{coordinate, Spectrum};

/// One block of the coarse intensity grid handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageCell {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    /// Normalised grey level in `0..=1`.
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageView {
    pub x_pixel0: i32,
    pub y_pixel0: i32,
    pub x_pixel1: i32,
    pub y_pixel1: i32,
    pub x_pixels: i32,
    pub y_pixels: i32,
    width: usize,
    height: usize,
    x_view1: usize,
    x_view2: usize,
    y_view1: usize,
    y_view2: usize,
    /// Data x of the left and right image columns.
    x_left: f64,
    x_right: f64,
    pub min_z: f64,
    pub max_z: f64,
    row_y: Vec<f64>,
}

impl ImageView {
    /// Image over every row of `spec`, spanning `[min_x, max_x]`.
    pub fn new(spec: &Spectrum, min_x: f64, max_x: f64, left_to_right: bool) -> Self {
        let rows = spec.sub_spectra();
        let width = rows.first().map(|r| r.coords.len()).unwrap_or(0).max(2);
        let height = rows.len().max(1);
        let (x_left, x_right) = if left_to_right { (min_x, max_x) } else { (max_x, min_x) };
        let mut min_z = f64::MAX;
        let mut max_z = f64::MIN;
        for r in rows {
            let last = r.coords.len().saturating_sub(1);
            min_z = min_z.min(coordinate::min_y(&r.coords, 0, last));
            max_z = max_z.max(coordinate::max_y(&r.coords, 0, last));
        }
        if min_z > max_z {
            min_z = 0.0;
            max_z = 1.0;
        }
        Self {
            x_pixel0: 0,
            y_pixel0: 0,
            x_pixel1: 1,
            y_pixel1: 1,
            x_pixels: 2,
            y_pixels: 2,
            width,
            height,
            x_view1: 0,
            x_view2: width - 1,
            y_view1: 0,
            y_view2: height - 1,
            x_left,
            x_right,
            min_z,
            max_z,
            row_y: rows.iter().map(|r| r.y_2d).collect(),
        }
    }

    pub fn set_pixel_width_height(&mut self, w: i32, h: i32) {
        self.x_pixels = w.max(2);
        self.y_pixels = h.max(2);
    }

    pub fn set_xy0(&mut self, x: i32, y: i32) {
        self.x_pixel0 = x;
        self.y_pixel0 = y;
        self.x_pixel1 = x + self.x_pixels - 1;
        self.y_pixel1 = y + self.y_pixels - 1;
    }

    pub fn row_count(&self) -> usize {
        self.height
    }

    /// Visible sub-spectrum range, lowest first.
    pub fn visible_rows(&self) -> (usize, usize) {
        (self.row_to_index(self.y_view2), self.row_to_index(self.y_view1))
    }

    fn row_to_index(&self, row: usize) -> usize {
        self.height - 1 - row.min(self.height - 1)
    }

    fn col_to_x(&self, col: f64) -> f64 {
        self.x_left + (self.x_right - self.x_left) * col / (self.width - 1) as f64
    }

    fn x_to_col(&self, x: f64) -> f64 {
        (x - self.x_left) / (self.x_right - self.x_left) * (self.width - 1) as f64
    }

    fn span(a: usize, b: usize) -> f64 {
        (b as f64 - a as f64).max(1.0)
    }

    // ── Window-relative mapping ──

    pub fn to_x(&self, x_pixel: i32) -> f64 {
        let f = (x_pixel - self.x_pixel0) as f64 / (self.x_pixels - 1) as f64;
        self.col_to_x(self.x_view1 as f64 + f * Self::span(self.x_view1, self.x_view2))
    }

    pub fn to_pixel_x(&self, x: f64) -> i32 {
        let f = (self.x_to_col(x) - self.x_view1 as f64) / Self::span(self.x_view1, self.x_view2);
        self.x_pixel0 + (f * (self.x_pixels - 1) as f64).round() as i32
    }

    pub fn to_subspectrum_index(&self, y_pixel: i32) -> usize {
        let f = (y_pixel - self.y_pixel0) as f64 / (self.y_pixels - 1) as f64;
        let row = (self.y_view1 as f64 + f * Self::span(self.y_view1, self.y_view2)).round();
        self.row_to_index(row.max(0.0) as usize)
    }

    pub fn sub_index_to_pixel_y(&self, index: usize) -> i32 {
        let row = self.row_to_index(index) as f64;
        let f = (row - self.y_view1 as f64) / Self::span(self.y_view1, self.y_view2);
        self.y_pixel0 + (f * (self.y_pixels - 1) as f64).round() as i32
    }

    /// Indirect-axis value of the row under `y_pixel`.
    pub fn to_y(&self, y_pixel: i32) -> f64 {
        self.row_y.get(self.to_subspectrum_index(y_pixel)).copied().unwrap_or(f64::NAN)
    }

    // ── Full-extent mapping ──

    pub fn to_x0(&self, x_pixel: i32) -> f64 {
        let f = (x_pixel - self.x_pixel0) as f64 / (self.x_pixels - 1) as f64;
        self.col_to_x(f * (self.width - 1) as f64)
    }

    pub fn to_pixel_x0(&self, x: f64) -> i32 {
        let f = self.x_to_col(x) / (self.width - 1) as f64;
        self.x_pixel0 + (f * (self.x_pixels - 1) as f64).round() as i32
    }

    pub fn to_pixel_y0(&self, index: usize) -> i32 {
        let row = self.row_to_index(index) as f64;
        let f = row / Self::span(0, self.height - 1);
        self.y_pixel0 + (f * (self.y_pixels - 1) as f64).round() as i32
    }

    fn col0(&self, x_pixel: i32) -> usize {
        let f = (self.fix_x(x_pixel) - self.x_pixel0) as f64 / (self.x_pixels - 1) as f64;
        (f * (self.width - 1) as f64).round() as usize
    }

    fn row0(&self, y_pixel: i32) -> usize {
        let f = (self.fix_y(y_pixel) - self.y_pixel0) as f64 / (self.y_pixels - 1) as f64;
        (f * (self.height - 1) as f64).round() as usize
    }

    pub fn fix_x(&self, x_pixel: i32) -> i32 {
        x_pixel.clamp(self.x_pixel0, self.x_pixel1)
    }

    pub fn fix_y(&self, y_pixel: i32) -> i32 {
        y_pixel.clamp(self.y_pixel0, self.y_pixel1)
    }

    pub fn is_x_within_range(&self, x_pixel: i32) -> bool {
        x_pixel >= self.x_pixel0 && x_pixel <= self.x_pixel1
    }

    pub fn contains(&self, x_pixel: i32, y_pixel: i32) -> bool {
        self.is_x_within_range(x_pixel) && y_pixel >= self.y_pixel0 && y_pixel <= self.y_pixel1
    }

    // ── Windowing ──

    /// Set the window from two corners given in full-extent pixels.
    pub fn set_view0(&mut self, x_pixel0: i32, y_pixel0: i32, x_pixel1: i32, y_pixel1: i32) {
        let (c0, c1) = (self.col0(x_pixel0), self.col0(x_pixel1));
        let (r0, r1) = (self.row0(y_pixel0), self.row0(y_pixel1));
        if c0 != c1 {
            self.x_view1 = c0.min(c1);
            self.x_view2 = c0.max(c1);
        }
        self.y_view1 = r0.min(r1);
        self.y_view2 = r0.max(r1);
    }

    /// Narrow the window to two corners given in window pixels.
    pub fn set_zoom(&mut self, x_pixel0: i32, y_pixel0: i32, x_pixel1: i32, y_pixel1: i32) {
        let col = |px: i32| {
            let f = (self.fix_x(px) - self.x_pixel0) as f64 / (self.x_pixels - 1) as f64;
            (self.x_view1 as f64 + f * Self::span(self.x_view1, self.x_view2)).round() as usize
        };
        let row = |py: i32| {
            let f = (self.fix_y(py) - self.y_pixel0) as f64 / (self.y_pixels - 1) as f64;
            (self.y_view1 as f64 + f * Self::span(self.y_view1, self.y_view2)).round() as usize
        };
        let (c0, c1, r0, r1) = (col(x_pixel0), col(x_pixel1), row(y_pixel0), row(y_pixel1));
        if c0 == c1 {
            return;
        }
        self.x_view1 = c0.min(c1);
        self.x_view2 = c0.max(c1).min(self.width - 1);
        self.y_view1 = r0.min(r1);
        self.y_view2 = r0.max(r1).min(self.height - 1);
    }

    /// Data x range of the window, in display order.
    pub fn view_x_range(&self) -> (f64, f64) {
        (self.col_to_x(self.x_view1 as f64), self.col_to_x(self.x_view2 as f64))
    }

    /// Clamp a sub-spectrum index into the visible rows.
    pub fn fix_sub_index(&self, index: usize) -> usize {
        let (lo, hi) = self.visible_rows();
        index.clamp(lo, hi)
    }

    pub fn reset_view(&mut self) {
        self.x_view1 = 0;
        self.x_view2 = self.width - 1;
        self.y_view1 = 0;
        self.y_view2 = self.height - 1;
    }

    pub fn set_z_range(&mut self, min_z: f64, max_z: f64) {
        if min_z < max_z {
            self.min_z = min_z;
            self.max_z = max_z;
        }
    }

    /// Coarse intensity blocks covering the window, at most `nx` by `ny`.
    pub fn cells(&self, spec: &Spectrum, nx: usize, ny: usize) -> Vec<ImageCell> {
        let rows = spec.sub_spectra();
        if rows.is_empty() || self.max_z <= self.min_z {
            return Vec::new();
        }
        let nx = nx.clamp(1, self.x_pixels.max(1) as usize);
        let ny = ny.clamp(1, (self.y_view2 - self.y_view1 + 1).max(1));
        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            let y0 = self.y_pixel0 + (j as i32 * self.y_pixels) / ny as i32;
            let y1 = self.y_pixel0 + ((j as i32 + 1) * self.y_pixels) / ny as i32 - 1;
            let row = &rows[self.to_subspectrum_index((y0 + y1) / 2).min(rows.len() - 1)];
            for i in 0..nx {
                let x0 = self.x_pixel0 + (i as i32 * self.x_pixels) / nx as i32;
                let x1 = self.x_pixel0 + ((i as i32 + 1) * self.x_pixels) / nx as i32 - 1;
                if row.coords.is_empty() {
                    continue;
                }
                let x = self.to_x((x0 + x1) / 2);
                let z = row.coords[coordinate::nearest_index_for_x(&row.coords, x)].y;
                let level = ((z - self.min_z) / (self.max_z - self.min_z)).clamp(0.0, 1.0);
                cells.push(ImageCell { x0, y0, x1, y1, level });
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Coordinate, Nucleus, SubSpectrum};

    /// 11 rows of 101 points over x in [0, 10], row i peaking at x = i.
    fn grid() -> Spectrum {
        let rows = (0..11)
            .map(|r| SubSpectrum {
                coords: (0..101)
                    .map(|i| {
                        let x = i as f64 * 0.1;
                        Coordinate::new(x, 1.0 / (1.0 + (x - r as f64).powi(2)))
                    })
                    .collect(),
                y_2d: 20.0 + r as f64,
            })
            .collect();
        Spectrum::new_nmr_2d("g", Nucleus::H1, Nucleus::C13, 400.0, rows)
    }

    fn placed(ltr: bool) -> ImageView {
        let mut iv = ImageView::new(&grid(), 0.0, 10.0, ltr);
        iv.set_pixel_width_height(201, 101);
        iv.set_xy0(100, 50);
        iv
    }

    #[test]
    fn test_pixel_extent() {
        let iv = placed(true);
        assert_eq!(iv.x_pixel1, 300);
        assert_eq!(iv.y_pixel1, 150);
        assert!(iv.contains(150, 60));
        assert!(!iv.contains(301, 60));
    }

    #[test]
    fn test_x_mapping_both_directions() {
        let iv = placed(true);
        assert!((iv.to_x(100) - 0.0).abs() < 1e-9);
        assert!((iv.to_x(300) - 10.0).abs() < 1e-9);
        assert_eq!(iv.to_pixel_x(5.0), 200);
        let iv = placed(false);
        assert!((iv.to_x(100) - 10.0).abs() < 1e-9);
        assert_eq!(iv.to_pixel_x(2.5), 250);
    }

    #[test]
    fn test_rows_run_bottom_up() {
        let iv = placed(true);
        assert_eq!(iv.to_subspectrum_index(150), 0);
        assert_eq!(iv.to_subspectrum_index(50), 10);
        assert_eq!(iv.sub_index_to_pixel_y(0), 150);
        assert_eq!(iv.sub_index_to_pixel_y(10), 50);
        assert_eq!(iv.to_pixel_y0(5), 100);
        assert_eq!(iv.to_y(150), 20.0);
    }

    #[test]
    fn test_zoom_window_and_reset() {
        let mut iv = placed(true);
        iv.set_zoom(150, 50, 250, 100);
        let (x0, x1) = iv.view_x_range();
        assert!((x0 - 2.5).abs() < 1e-9);
        assert!((x1 - 7.5).abs() < 1e-9);
        assert_eq!(iv.visible_rows(), (5, 10));
        assert_eq!(iv.fix_sub_index(0), 5);
        assert!((iv.to_x(100) - 2.5).abs() < 1e-9);
        // full-extent mapping ignores the window
        assert!((iv.to_x0(100) - 0.0).abs() < 1e-9);
        iv.reset_view();
        assert_eq!(iv.visible_rows(), (0, 10));
    }

    #[test]
    fn test_degenerate_zoom_ignored() {
        let mut iv = placed(true);
        iv.set_zoom(150, 50, 150, 100);
        assert_eq!(iv.view_x_range(), (0.0, 10.0));
    }

    #[test]
    fn test_cells_cover_window() {
        let iv = placed(true);
        let cells = iv.cells(&grid(), 10, 11);
        assert_eq!(cells.len(), 110);
        assert!(cells.iter().all(|c| (0.0..=1.0).contains(&c.level)));
        assert!(cells.iter().any(|c| c.level > 0.75));
        assert!(cells.iter().any(|c| c.level < 0.1));
    }
}
