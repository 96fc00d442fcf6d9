use super::entities::*;

/// Default spacing of extracted points, in canonical units.
pub const DEFAULT_INTERVAL: f64 = 20f64;

// Trailing point is only kept if the leftover arc length exceeds this share of the interval
const TRAILING_POINT_RATIO: f64 = 0.75;

// Resamples one stroke at roughly regular arc-length intervals
fn extract_stroke(stroke: &Stroke, interval: f64) -> Stroke {
    let points = &stroke.points;
    if points.is_empty() {
        return Stroke::default();
    }
    // The first point is always kept
    let mut res: Vec<Point> = vec![points[0]];
    let mut dist = 0f64;
    for j in 1..points.len() {
        dist += points[j - 1].euclid(&points[j]);
        if dist >= interval && j > 1 {
            dist -= interval;
            res.push(points[j]);
        }
    }
    let last = points[points.len() - 1];
    // Never collapse a stroke to a single point
    if res.len() == 1 {
        res.push(last);
    } else if dist > TRAILING_POINT_RATIO * interval {
        res.push(last);
    }
    Stroke::new(res)
}

/// Replaces every stroke by a sparser sequence of points spaced about
/// `interval` apart along the stroke. Raw points are kept as-is, never
/// interpolated.
pub fn extract_features(pattern: &Pattern, interval: f64) -> Pattern {
    Pattern::new(pattern.strokes.iter().map(|s| extract_stroke(s, interval)).collect())
}
