//! Points -> padded samples -> DFT coefficients -> sorted gears.
//!
//! Every stage accepts an empty input and returns an empty output.

use crate::geometry::{ComplexPoint, Point};
use std::f64::consts::TAU;

/// One rotating vector of the epicycle chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gear {
    /// Recentered frequency bin, in `[-N/2, N/2)`.
    pub angular_index: i64,
    /// Coefficient magnitude divided by the sample count.
    pub radius: f64,
    /// Coefficient argument.
    pub phase: f64,
}

impl Gear {
    pub fn angle_at(&self, t: f64) -> f64 {
        self.angular_index as f64 * t + self.phase
    }

    /// Displacement this gear adds to the chain at time `t`.
    pub fn offset_at(&self, t: f64) -> Point {
        let a = self.angle_at(t);
        Point::new(self.radius * a.cos(), self.radius * a.sin())
    }
}

/// Result of one full recomputation.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub padded: Vec<Point>,
    pub coefficients: Vec<ComplexPoint>,
    pub gears: Vec<Gear>,
}

impl Pipeline {
    pub fn run(points: &[Point]) -> Self {
        let padded = pad_to_power_of_two(points);
        let samples = padded.iter().map(|p| p.to_complex()).collect::<Vec<_>>();
        let coefficients = dft(&samples);
        let gears = derive_gears(&coefficients);
        Self {
            padded,
            coefficients,
            gears,
        }
    }
}

/// Length the padder grows a sequence of `len` points to.
pub fn padded_len(len: usize) -> usize {
    if len == 0 { 0 } else { len.next_power_of_two() }
}

/// Copies `points` and inserts midpoints until the length is a power of two.
///
/// Midpoints go between consecutive pairs scanned from the front, so the
/// first `padded_len(n) - n` gaps of the path each receive one point and the
/// originals keep their relative order.
pub fn pad_to_power_of_two(points: &[Point]) -> Vec<Point> {
    let target = padded_len(points.len());
    let inserts = target - points.len();
    let mut out = Vec::with_capacity(target);
    for (i, &p) in points.iter().enumerate() {
        out.push(p);
        if i < inserts {
            // inserts < len whenever len is not already a power of two, so i + 1 is in range.
            out.push(p.midpoint(points[i + 1]));
        }
    }
    out
}

/// Forward DFT, computed pairwise in O(N^2).
///
/// `F[i] = sum_k x[k] * exp(-2*pi*i*k*i / N)`
pub fn dft(samples: &[ComplexPoint]) -> Vec<ComplexPoint> {
    let n = samples.len();
    (0..n)
        .map(|i| {
            samples
                .iter()
                .enumerate()
                .map(|(k, &x)| x * twiddle(k * i % n, n, -1.0))
                .sum::<ComplexPoint>()
        })
        .collect()
}

/// Inverse of [`dft`], scaled by `1/N`.
pub fn inverse_dft(coefficients: &[ComplexPoint]) -> Vec<ComplexPoint> {
    let n = coefficients.len();
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / n as f64;
    (0..n)
        .map(|k| {
            let s: ComplexPoint = coefficients
                .iter()
                .enumerate()
                .map(|(i, &f)| f * twiddle(k * i % n, n, 1.0))
                .sum();
            s * scale
        })
        .collect()
}

#[inline]
fn twiddle(step: usize, n: usize, sign: f64) -> ComplexPoint {
    ComplexPoint::from_polar(1.0, sign * TAU * step as f64 / n as f64)
}

/// Turns DFT coefficients into gears sorted by descending radius.
///
/// Bin `(I + N/2) mod N` becomes a gear spinning at `I + N/2 - N`, which
/// recenters the bins around zero. Ties keep build order (`I` descending).
pub fn derive_gears(coefficients: &[ComplexPoint]) -> Vec<Gear> {
    let n = coefficients.len();
    if n == 0 {
        return Vec::new();
    }
    let half = n / 2;
    let len = n as f64;
    let mut gears = (0..n)
        .rev()
        .map(|i| {
            let c = coefficients[(i + half) % n];
            let angular_index = if n == 1 {
                // A lone DC term stays put.
                0
            } else {
                i as i64 + half as i64 - n as i64
            };
            Gear {
                angular_index,
                radius: c.norm() / len,
                phase: c.im.atan2(c.re),
            }
        })
        .collect::<Vec<_>>();
    gears.sort_by(|a, b| b.radius.total_cmp(&a.radius));
    gears
}

/// Tip of the gear chain at time `t`.
pub fn reconstruct(gears: &[Gear], t: f64) -> Point {
    gears.iter().fold(Point::ORIGIN, |acc, g| {
        let d = g.offset_at(t);
        Point::new(acc.x + d.x, acc.y + d.y)
    })
}
