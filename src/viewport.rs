use crate::geometry::Point;

/// Smallest half-extent, in world units, that auto-fit will zoom to.
const MIN_HALF_EXTENT: f64 = 100.0;
const FIT_MARGIN: f64 = 1.2;
/// Pixels per world unit that manual zoom stays within.
pub const MIN_SCALE: f64 = 1.0e-3;
pub const MAX_SCALE: f64 = 64.0;

/// Maps canvas-centered world units onto a pixel grid and back.
///
/// `aspect` is the on-screen height of one pixel relative to its width
/// (2.0 for one pixel per terminal cell, ~1.0 for half-block or braille).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    /// Pixels per world unit along x.
    pub scale: f64,
    pub aspect: f64,
}

impl Viewport {
    pub fn new(width: usize, height: usize, scale: f64, aspect: f64) -> Self {
        Self {
            width,
            height,
            scale: sanitize(scale, 1.0),
            aspect: sanitize(aspect, 1.0),
        }
    }

    /// Picks a scale at which `points` (and their mirror about the origin)
    /// fit inside the grid with some margin.
    pub fn fit(width: usize, height: usize, aspect: f64, points: &[Point]) -> Self {
        let aspect = sanitize(aspect, 1.0);
        let (mut hx, mut hy) = (MIN_HALF_EXTENT, MIN_HALF_EXTENT);
        for p in points {
            hx = hx.max(p.x.abs());
            hy = hy.max(p.y.abs());
        }
        let sx = width as f64 / (2.0 * hx * FIT_MARGIN);
        let sy = height as f64 * aspect / (2.0 * hy * FIT_MARGIN);
        Self::new(width, height, sx.min(sy), aspect)
    }

    pub fn resized(self, width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }

    pub fn scale_y(&self) -> f64 {
        self.scale / self.aspect
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn world_to_pixel(&self, p: Point) -> (f64, f64) {
        let (cx, cy) = self.center();
        (cx + p.x * self.scale, cy + p.y * self.scale_y())
    }

    /// Host pixel coordinates are re-centered on the grid middle, then unscaled.
    pub fn pixel_to_world(&self, px: f64, py: f64) -> Point {
        let (cx, cy) = self.center();
        Point::new((px - cx) / self.scale, (py - cy) / self.scale_y())
    }

    pub fn zoomed(self, factor: f64) -> Self {
        let scale = sanitize(self.scale * factor, self.scale).clamp(MIN_SCALE, MAX_SCALE);
        Self::new(self.width, self.height, scale, self.aspect)
    }
}

fn sanitize(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

/// Pixels covered by one terminal cell for a given renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    pub px_per_col: usize,
    pub px_per_row: usize,
}

impl CellGrid {
    pub fn pixel_size(&self, cols: u16, rows: u16) -> (usize, usize) {
        (
            (cols as usize).saturating_mul(self.px_per_col),
            (rows as usize).saturating_mul(self.px_per_row),
        )
    }

    /// Aspect of one pixel, assuming terminal cells are twice as tall as wide.
    pub fn pixel_aspect(&self) -> f64 {
        2.0 * self.px_per_col as f64 / self.px_per_row.max(1) as f64
    }

    /// Pixel-space center of the cell at 0-based `(col, row)`.
    pub fn cell_center(&self, col: u16, row: u16) -> (f64, f64) {
        (
            (col as f64 + 0.5) * self.px_per_col as f64,
            (row as f64 + 0.5) * self.px_per_row as f64,
        )
    }
}
