//! Built-in startup shape: the letters "JS1K" traced as one closed stroke.

use crate::geometry::Point;

/// Each byte packs a grid point as `0b10xxxyy`.
const PACKED: &str = "@DGCBCGDPHIRSKWTQTW[XZ]Z_Z[SRIHDD";

const CELL: f64 = 50.0;
const OFFSET_X: f64 = -950.0;
const OFFSET_Y: f64 = -90.0;

pub fn builtin_points() -> Vec<Point> {
    PACKED.bytes().map(decode).collect()
}

fn decode(b: u8) -> Point {
    Point::new(
        CELL * f64::from(b >> 2) + OFFSET_X,
        CELL * f64::from(b & 3) + OFFSET_Y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_first_and_last_glyph_points() {
        let pts = builtin_points();
        assert_eq!(pts.len(), 33);
        // '@' = 0b1000000 -> grid (0, 0)
        assert_eq!(pts[0], Point::new(-150.0, -90.0));
        // 'D' = 0b1000100 -> grid (1, 0)
        assert_eq!(pts[32], Point::new(-100.0, -90.0));
    }
}
