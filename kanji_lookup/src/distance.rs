//! Distance metrics between point sequences and between whole patterns.
//!
//! Every metric is defined for every input: if either side has no points the
//! distance is 0, so degenerate ink degrades to poor scores instead of failing.

use super::entities::*;
use super::stroke_map::*;

/// A distance between two point sequences (a stroke, or several strokes
/// concatenated). Lower is more similar.
pub type DistanceMetric = fn(&[Point], &[Point]) -> f64;

/// Manhattan distance between the two first points plus between the two last points.
pub fn end_point_distance(a: &[Point], b: &[Point]) -> f64 {
    let (first_a, first_b) = match (a.first(), b.first()) {
        (Some(fa), Some(fb)) => (fa, fb),
        _ => return 0f64,
    };
    let last_a = &a[a.len() - 1];
    let last_b = &b[b.len() - 1];
    first_a.manhattan(first_b) + last_a.manhattan(last_b)
}

/// Point-by-point Manhattan distance over the common prefix, scaled up by
/// how much longer the longer sequence is.
pub fn initial_distance(a: &[Point], b: &[Point]) -> f64 {
    let lmin = a.len().min(b.len());
    let lmax = a.len().max(b.len());
    if lmin == 0 {
        return 0f64;
    }
    let mut dist = 0f64;
    for i in 0..lmin {
        dist += a[i].manhattan(&b[i]);
    }
    dist * (lmax as f64 / lmin as f64)
}

/// Walks the shorter sequence and pairs each of its points with the longer
/// sequence sampled at an integer stride; mean Manhattan distance, truncated.
pub fn whole_whole_distance(a: &[Point], b: &[Point]) -> f64 {
    let (longer, shorter) = larger_and_smaller(a, b);
    let n = longer.len();
    let m = shorter.len();
    if m == 0 {
        return 0f64;
    }
    let stride = n / m;
    let mut dist = 0f64;
    for i in 0..m {
        dist += longer[stride * i].manhattan(&shorter[i]);
    }
    (dist / m as f64).trunc()
}

// Concatenates the points of a run of strokes
fn concat_run(strokes: &[Stroke]) -> Vec<Point> {
    let mut res: Vec<Point> = Vec::with_capacity(strokes.iter().map(|s| s.len()).sum());
    for stroke in strokes {
        res.extend_from_slice(&stroke.points);
    }
    res
}

// Target stroke's points for a run; an unassigned run compares against nothing
fn target_points(smaller: &[Stroke], target: Option<usize>) -> &[Point] {
    match target {
        Some(ix) => &smaller[ix].points,
        None => &[],
    }
}

/// Overall distance between two patterns under a completed stroke map: each
/// run of larger-pattern strokes sharing a target is concatenated and scored
/// against that target.
pub fn compute_distance(p1: &Pattern, p2: &Pattern, metric: DistanceMetric, map: &StrokeMap) -> f64 {
    let (larger, smaller) = larger_and_smaller(&p1.strokes, &p2.strokes);
    let mut dist = 0f64;
    for run in map.runs() {
        let stroke_concat = concat_run(&larger[run.start..run.stop]);
        dist += metric(target_points(smaller, run.target), &stroke_concat);
    }
    dist
}

/// Like [`compute_distance`] with [`whole_whole_distance`], but a run that
/// merges several strokes is penalized by the ratio of the longer to the
/// shorter point count.
pub fn compute_whole_distance_weighted(p1: &Pattern, p2: &Pattern, map: &StrokeMap) -> f64 {
    let (larger, smaller) = larger_and_smaller(&p1.strokes, &p2.strokes);
    let mut dist = 0f64;
    for run in map.runs() {
        let stroke_idx = target_points(smaller, run.target);
        let stroke_concat = concat_run(&larger[run.start..run.stop]);
        let mut dist_idx = whole_whole_distance(stroke_idx, &stroke_concat);
        if run.stop > run.start + 1 {
            let mut mm = stroke_idx.len();
            let mut nn = stroke_concat.len();
            if nn < mm {
                std::mem::swap(&mut nn, &mut mm);
            }
            if mm > 0 {
                dist_idx *= nn as f64 / mm as f64;
            }
        }
        dist += dist_idx;
    }
    dist
}
