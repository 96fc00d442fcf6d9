use serde_derive::{Deserialize, Serialize};

use super::error::{LookupError, Result};

// A single pen sample
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x: x, y: y }
    }

    // Manhattan distance, which all shape metrics are built on
    pub fn manhattan(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn euclid(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// One continuous pen contact, points in time order
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Stroke {
        Stroke { points: points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One character's ink: strokes in drawing order.
///
/// Neither the stroke order nor the point order inside a stroke is ever
/// changed by the recognizer; normalization and resampling produce new
/// patterns.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    pub strokes: Vec<Stroke>,
}

impl Pattern {
    pub fn new(strokes: Vec<Stroke>) -> Pattern {
        Pattern { strokes: strokes }
    }

    /// Number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total number of points over all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.len()).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.strokes.iter().flat_map(|s| s.points.iter())
    }

    /// Builds a pattern from the nested-array form used by the dataset and
    /// by JS callers: strokes of points of `[x, y]`.
    pub fn from_nested(nested: &[Vec<Vec<f64>>]) -> Result<Pattern> {
        let mut strokes: Vec<Stroke> = Vec::with_capacity(nested.len());
        for (stroke_ix, raw_stroke) in nested.iter().enumerate() {
            let mut points: Vec<Point> = Vec::with_capacity(raw_stroke.len());
            for (point_ix, raw_point) in raw_stroke.iter().enumerate() {
                if raw_point.len() != 2 {
                    return Err(LookupError::MalformedPoint {
                        stroke: stroke_ix,
                        point: point_ix,
                        len: raw_point.len(),
                    });
                }
                if !raw_point[0].is_finite() || !raw_point[1].is_finite() {
                    return Err(LookupError::NonFiniteCoordinate {
                        stroke: stroke_ix,
                        point: point_ix,
                    });
                }
                points.push(Point::new(raw_point[0], raw_point[1]));
            }
            strokes.push(Stroke::new(points));
        }
        Ok(Pattern::new(strokes))
    }

    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        self.strokes
            .iter()
            .map(|s| s.points.iter().map(|p| vec![p.x, p.y]).collect())
            .collect()
    }
}
