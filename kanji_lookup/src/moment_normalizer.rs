//! Moment normalization into the canonical 256x256 frame.
//!
//! Ink is centred on its centroid and scaled by its second-order moments
//! rather than stretched to its bounding box. Extreme aspect ratios are only
//! partly compensated, through a sine-shaped correction of the target box.

use super::entities::*;

/// Side of the canonical square frame.
pub const CANONICAL_SIZE: f64 = 256f64;

struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    fn height(&self) -> f64 {
        (self.bottom - self.top).abs()
    }
}

// The box starts as the inverted canonical frame, so it always reaches
// at least to 256 on the low side and to 0 on the high side
fn get_bounding_rect(pattern: &Pattern) -> Option<Rect> {
    if pattern.points().next().is_none() {
        return None;
    }
    let mut res = Rect {
        top: CANONICAL_SIZE,
        bottom: 0f64,
        left: CANONICAL_SIZE,
        right: 0f64,
    };
    for pt in pattern.points() {
        if pt.x < res.left { res.left = pt.x; }
        if pt.x > res.right { res.right = pt.x; }
        if pt.y < res.top { res.top = pt.y; }
        if pt.y > res.bottom { res.bottom = pt.y; }
    }
    Some(res)
}

/// Aspect ratio correction factor: `sqrt(sin(pi/2 * short/long))`.
/// 1 for square (or zero-size) ink, approaching 0 for a very thin one.
pub fn aspect_correction(width: f64, height: f64) -> f64 {
    let long = width.max(height);
    if long <= 0f64 {
        return 1f64;
    }
    let r1 = width.min(height) / long;
    (std::f64::consts::FRAC_PI_2 * r1).sin().sqrt()
}

// Scale that maps a standard deviation onto a quarter of the target side;
// zero when the ink has no spread along this axis
fn scale_factor(target_side: f64, central_moment: f64, m00: f64) -> f64 {
    let denom = 4f64 * (central_moment / m00).sqrt();
    let factor = target_side / denom;
    if denom == 0f64 || !factor.is_finite() {
        0f64
    } else {
        factor
    }
}

/// Maps raw ink into the canonical frame. The input is not modified; a
/// pattern without points comes back as an identical copy.
///
/// Coordinates are not clamped: thin or skewed ink may land outside 0..256.
pub fn moment_normalize(pattern: &Pattern) -> Pattern {
    let bounding_rect = match get_bounding_rect(pattern) {
        Some(rect) => rect,
        None => return pattern.clone(),
    };
    let old_width = bounding_rect.width();
    let old_height = bounding_rect.height();

    // Only the shorter side of the target box shrinks
    let r2 = aspect_correction(old_width, old_height);
    let mut box_width = CANONICAL_SIZE;
    let mut box_height = CANONICAL_SIZE;
    if old_height > old_width {
        box_width = r2 * CANONICAL_SIZE;
    } else {
        box_height = r2 * CANONICAL_SIZE;
    }
    let x_offset = (CANONICAL_SIZE - box_width) / 2f64;
    let y_offset = (CANONICAL_SIZE - box_height) / 2f64;

    // Raw moments and centroid
    let m00 = pattern.point_count() as f64;
    let m10: f64 = pattern.points().map(|p| p.x).sum();
    let m01: f64 = pattern.points().map(|p| p.y).sum();
    let xc = m10 / m00;
    let yc = m01 / m00;

    // Central second moments
    let mu20: f64 = pattern.points().map(|p| (p.x - xc) * (p.x - xc)).sum();
    let mu02: f64 = pattern.points().map(|p| (p.y - yc) * (p.y - yc)).sum();

    let alpha = scale_factor(box_width, mu20, m00);
    let beta = scale_factor(box_height, mu02, m00);

    let strokes = pattern
        .strokes
        .iter()
        .map(|stroke| {
            Stroke::new(
                stroke
                    .points
                    .iter()
                    .map(|p| {
                        Point::new(
                            alpha * (p.x - xc) + box_width / 2f64 + x_offset,
                            beta * (p.y - yc) + box_height / 2f64 + y_offset,
                        )
                    })
                    .collect(),
            )
        })
        .collect();
    Pattern::new(strokes)
}
