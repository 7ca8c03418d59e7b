//! Plain-text point sets: one `x y` pair per line, `#` starts a comment.

use crate::geometry::Point;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointsFileError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub fn parse_points(text: &str) -> Result<Vec<Point>, PointsFileError> {
    let mut points = Vec::new();
    for (line_idx, raw) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty());
        let (Some(xs), Some(ys), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(PointsFileError::Parse {
                line: line_no,
                message: "expected `<x> <y>`".to_string(),
            });
        };
        let x = parse_coord(xs, line_no)?;
        let y = parse_coord(ys, line_no)?;
        points.push(Point::new(x, y));
    }
    Ok(points)
}

fn parse_coord(raw: &str, line: usize) -> Result<f64, PointsFileError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PointsFileError::Parse {
            line,
            message: format!("`{raw}` is not a finite number"),
        }),
    }
}

pub fn format_points(points: &[Point]) -> String {
    let mut body = String::from("# epicycles point set v1\n");
    for p in points {
        body.push_str(&format!("{} {}\n", p.x, p.y));
    }
    body
}

pub fn load_points(path: &Path) -> Result<Vec<Point>, PointsFileError> {
    let text = std::fs::read_to_string(path).map_err(|e| PointsFileError::Io(e.to_string()))?;
    parse_points(&text)
}

/// Writes through a temp file and renames it into place.
pub fn save_points(path: &Path, points: &[Point]) -> Result<(), PointsFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PointsFileError::Io(e.to_string()))?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, format_points(points)).map_err(|e| PointsFileError::Io(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| PointsFileError::Io(e.to_string()))
}
