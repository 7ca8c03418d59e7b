use rustfft::num_complex::Complex64;

/// Complex sample: real part is x, imaginary part is y.
pub type ComplexPoint = Complex64;

/// A 2D point in world units, relative to the canvas center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn to_complex(self) -> ComplexPoint {
        ComplexPoint::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<ComplexPoint> for Point {
    fn from(c: ComplexPoint) -> Self {
        Self { x: c.re, y: c.im }
    }
}
