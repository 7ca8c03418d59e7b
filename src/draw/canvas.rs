use super::{Color, Surface};
use std::f64::consts::TAU;

const MAX_ARC_SEGMENTS: usize = 720;

#[derive(Debug, Clone, Copy)]
struct Transform {
    ox: f64,
    oy: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    const IDENTITY: Self = Self {
        ox: 0.0,
        oy: 0.0,
        sx: 1.0,
        sy: 1.0,
    };

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.ox + x * self.sx, self.oy + y * self.sy)
    }
}

/// RGBA software surface. Paths are flattened to device-space polylines when
/// they are built, then rasterized on `stroke`.
pub struct Canvas {
    w: usize,
    h: usize,
    pixels: Vec<u8>,
    xf: Transform,
    color: Color,
    line_width: f64,
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        let mut canvas = Self {
            w,
            h,
            pixels: vec![0u8; w * h * 4],
            xf: Transform::IDENTITY,
            color: Color::WHITE,
            line_width: 1.0,
            subpaths: Vec::new(),
        };
        canvas.clear();
        canvas
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        if (w, h) == (self.w, self.h) {
            return;
        }
        self.w = w;
        self.h = h;
        self.pixels = vec![0u8; w * h * 4];
        self.clear();
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let i = (y * self.w + x) * 4;
        Some(Color::rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    fn device_width(&self) -> f64 {
        let s = ((self.xf.sx.abs() + self.xf.sy.abs()) / 2.0).max(f64::EPSILON);
        (self.line_width * s).max(1.0)
    }

    #[inline]
    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.w as i64 || y >= self.h as i64 {
            return;
        }
        let i = (y as usize * self.w + x as usize) * 4;
        self.pixels[i] = self.color.r;
        self.pixels[i + 1] = self.color.g;
        self.pixels[i + 2] = self.color.b;
        self.pixels[i + 3] = 255;
    }

    /// Fills a disk of diameter `width`, clipped to the canvas. Returns the
    /// number of pixels written.
    fn stamp(&mut self, x: f64, y: f64, width: f64) -> usize {
        if width <= 1.0 {
            let (px, py) = (x.floor() as i64, y.floor() as i64);
            if px < 0 || py < 0 || px >= self.w as i64 || py >= self.h as i64 {
                return 0;
            }
            self.plot(px, py);
            return 1;
        }
        let r = width / 2.0;
        let Some((y0, y1)) = self.row_range(y - r, y + r) else {
            return 0;
        };
        let mut written = 0;
        for py in y0..=y1 {
            let dy = py as f64 + 0.5 - y;
            let Some(half) = chord(r, dy) else {
                continue;
            };
            written += self.span(py, x - half, x + half);
        }
        written
    }

    /// Fills the capsule around `a-b` row by row. Work is bounded by the
    /// clipped area, not by the segment length or the zoom.
    fn segment(&mut self, a: (f64, f64), b: (f64, f64), width: f64) -> usize {
        let pad = width;
        let Some((a, b)) = clip_segment(
            a,
            b,
            -pad,
            -pad,
            self.w as f64 + pad,
            self.h as f64 + pad,
        ) else {
            return 0;
        };
        let r = (width / 2.0).max(0.5);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len2 = dx * dx + dy * dy;
        if len2 < 1e-12 {
            return self.stamp(a.0, a.1, width);
        }
        let len = len2.sqrt();
        let Some((y0, y1)) = self.row_range(a.1.min(b.1) - r, a.1.max(b.1) + r) else {
            return 0;
        };
        let mut written = 0;
        for py in y0..=y1 {
            let yc = py as f64 + 0.5;
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for (cx, cy) in [a, b] {
                if let Some(half) = chord(r, yc - cy) {
                    lo = lo.min(cx - half);
                    hi = hi.max(cx + half);
                }
            }
            // Body of the capsule: projection in [0, len2], distance to the axis <= r.
            let along = linear_range(dx, (yc - a.1) * dy - a.0 * dx, 0.0, len2);
            let across = linear_range(
                -dy,
                dx * (yc - a.1) + dy * a.0,
                -r * len,
                r * len,
            );
            if let (Some(p), Some(q)) = (along, across) {
                let (l, h) = (p.0.max(q.0), p.1.min(q.1));
                if l <= h {
                    lo = lo.min(l);
                    hi = hi.max(h);
                }
            }
            if lo <= hi {
                written += self.span(py, lo, hi);
            }
        }
        written
    }

    fn row_range(&self, top: f64, bottom: f64) -> Option<(i64, i64)> {
        if self.h == 0 || !(top.is_finite() && bottom.is_finite()) {
            return None;
        }
        let y0 = (top.floor() as i64).max(0);
        let y1 = (bottom.ceil() as i64).min(self.h as i64 - 1);
        (y0 <= y1).then_some((y0, y1))
    }

    /// Plots row `py` for every pixel whose center lies in `[lo, hi]`.
    fn span(&mut self, py: i64, lo: f64, hi: f64) -> usize {
        let x0 = ((lo - 0.5).ceil() as i64).max(0);
        let x1 = ((hi - 0.5).floor() as i64).min(self.w as i64 - 1);
        if x0 > x1 {
            return 0;
        }
        for px in x0..=x1 {
            self.plot(px, py);
        }
        (x1 - x0 + 1) as usize
    }
}

/// Half-width of a circle of radius `r` at vertical offset `dy`.
fn chord(r: f64, dy: f64) -> Option<f64> {
    let d = r * r - dy * dy;
    (d >= 0.0).then(|| d.sqrt())
}

/// Values of `x` with `lo <= k * x + m <= hi`.
fn linear_range(k: f64, m: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if k.abs() < 1e-12 {
        return (lo <= m && m <= hi).then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let (p, q) = ((lo - m) / k, (hi - m) / k);
    Some((p.min(q), p.max(q)))
}

impl Surface for Canvas {
    fn clear(&mut self) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
        self.xf = Transform::IDENTITY;
        self.color = Color::WHITE;
        self.line_width = 1.0;
        self.subpaths.clear();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let (ox, oy) = self.xf.apply(dx, dy);
        self.xf.ox = ox;
        self.xf.oy = oy;
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.xf.sx *= sx;
        self.xf.sy *= sy;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.line_width = width;
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.xf.apply(x, y);
        self.subpaths.push(vec![p]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.xf.apply(x, y);
        match self.subpaths.last_mut() {
            Some(sp) => sp.push(p),
            None => self.subpaths.push(vec![p]),
        }
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64) {
        let (dcx, dcy) = self.xf.apply(cx, cy);
        let rx = (radius * self.xf.sx).abs();
        let ry = (radius * self.xf.sy).abs();
        let segs = ((rx.max(ry) * 1.5).ceil() as usize).clamp(8, MAX_ARC_SEGMENTS);
        let sp = (0..=segs)
            .map(|i| {
                let a = TAU * i as f64 / segs as f64;
                (dcx + rx * a.cos(), dcy + ry * a.sin())
            })
            .collect();
        self.subpaths.push(sp);
    }

    fn stroke(&mut self) {
        let width = self.device_width();
        let subpaths = std::mem::take(&mut self.subpaths);
        for sp in &subpaths {
            match sp.as_slice() {
                [] => {}
                [p] => {
                    self.stamp(p.0, p.1, width);
                }
                pts => {
                    for pair in pts.windows(2) {
                        self.segment(pair[0], pair[1], width);
                    }
                }
            }
        }
        // Like a canvas context, the path survives a stroke.
        self.subpaths = subpaths;
    }
}

/// Liang-Barsky clip of segment `a-b` against an axis-aligned box.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
) -> Option<((f64, f64), (f64, f64))> {
    if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
        return None;
    }
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.0 - xmin),
        (dx, xmax - a.0),
        (-dy, a.1 - ymin),
        (dy, ymax - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}
