//! Elastic M:N stroke correspondence between two patterns.
//!
//! The map is indexed by stroke position in the larger pattern and points at
//! strokes of the smaller one. It is built in three steps: a greedy
//! one-to-one seed, a few passes of pairwise local improvement, and finally
//! completion of the strokes left over, so that runs of consecutive larger
//! strokes end up merged against one smaller stroke.
//!
//! Iteration order and tie-breaking (first minimum wins) decide the result;
//! candidate ranking depends on both.

use super::distance::DistanceMetric;
use super::entities::*;

// Greedy seeding ignores any pairing at or above this distance
const GREEDY_DISTANCE_CEILING: f64 = 10_000_000f64;
// Initial best score when searching for the split point of a gap
const SPLIT_DISTANCE_CEILING: f64 = 1_000_000f64;

/// Default number of local improvement passes.
pub const DEFAULT_REFINEMENT_PASSES: usize = 3;

/// Orders two sequences as (larger, smaller). The first argument counts as
/// larger unless it is strictly shorter.
pub fn larger_and_smaller<'a, T>(a: &'a [T], b: &'a [T]) -> (&'a [T], &'a [T]) {
    if a.len() < b.len() {
        (b, a)
    } else {
        (a, b)
    }
}

/// A maximal run of consecutive larger-pattern strokes sharing one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run {
    pub start: usize,
    // Exclusive
    pub stop: usize,
    pub target: Option<usize>,
}

/// Mapping from the larger pattern's strokes to the smaller pattern's strokes.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeMap {
    targets: Vec<Option<usize>>,
}

impl StrokeMap {
    /// A map over `n` larger-pattern strokes with nothing assigned.
    pub fn unassigned(n: usize) -> StrokeMap {
        StrokeMap {
            targets: vec![None; n],
        }
    }

    pub fn from_targets(targets: Vec<Option<usize>>) -> StrokeMap {
        StrokeMap { targets: targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, ix: usize) -> Option<usize> {
        self.targets[ix]
    }

    pub fn targets(&self) -> &[Option<usize>] {
        &self.targets
    }

    /// True when every larger-pattern stroke has a target.
    pub fn is_complete(&self) -> bool {
        self.targets.iter().all(|t| t.is_some())
    }

    fn set(&mut self, ix: usize, target: Option<usize>) {
        self.targets[ix] = target;
    }

    /// Maximal runs of equal targets, in order.
    pub fn runs(&self) -> Vec<Run> {
        let mut res: Vec<Run> = Vec::new();
        let mut idx = 0;
        while idx < self.targets.len() {
            let target = self.targets[idx];
            let start = idx;
            let mut stop = start + 1;
            while stop < self.targets.len() && self.targets[stop] == target {
                stop += 1;
            }
            res.push(Run {
                start: start,
                stop: stop,
                target: target,
            });
            idx = stop;
        }
        res
    }
}

fn concat(strokes: &[Stroke]) -> Vec<Point> {
    let mut res: Vec<Point> = Vec::new();
    for stroke in strokes {
        res.extend_from_slice(&stroke.points);
    }
    res
}

/// Greedy one-to-one seed: each smaller stroke, in order, takes the free
/// larger stroke it is closest to.
pub fn init_stroke_map(p1: &Pattern, p2: &Pattern, metric: DistanceMetric) -> StrokeMap {
    let (larger, smaller) = larger_and_smaller(&p1.strokes, &p2.strokes);
    let n = larger.len();
    let mut map = StrokeMap::unassigned(n);
    let mut free: Vec<bool> = vec![true; n];
    for (i, target) in smaller.iter().enumerate() {
        let mut min_dist = GREEDY_DISTANCE_CEILING;
        let mut min_j: Option<usize> = None;
        for j in 0..n {
            if !free[j] {
                continue;
            }
            let d = metric(&larger[j].points, &target.points);
            if d < min_dist {
                min_dist = d;
                min_j = Some(j);
            }
        }
        if let Some(j) = min_j {
            free[j] = false;
            map.set(j, Some(i));
        }
    }
    map
}

/// Greedy seed followed by `passes` rounds of local improvement: swapping
/// the targets of two assigned strokes, or handing a target over to an
/// unassigned stroke, whenever that strictly lowers the cost.
pub fn get_map(p1: &Pattern, p2: &Pattern, metric: DistanceMetric, passes: usize) -> StrokeMap {
    let (larger, smaller) = larger_and_smaller(&p1.strokes, &p2.strokes);
    let mut map = init_stroke_map(p1, p2, metric);
    let n = map.len();
    for _ in 0..passes {
        for i in 0..n {
            let Some(first_target) = map.get(i) else {
                continue;
            };
            let mut dii = metric(&larger[i].points, &smaller[first_target].points);
            for j in 0..n {
                // map[i] may have been handed over earlier in this loop
                let Some(ti) = map.get(i) else {
                    continue;
                };
                match map.get(j) {
                    Some(tj) => {
                        let djj = metric(&larger[j].points, &smaller[tj].points);
                        let dij = metric(&larger[j].points, &smaller[ti].points);
                        let dji = metric(&larger[i].points, &smaller[tj].points);
                        if dji + dij < dii + djj {
                            map.set(j, Some(ti));
                            map.set(i, Some(tj));
                            dii = dij;
                        }
                    }
                    None => {
                        let dij = metric(&larger[j].points, &smaller[ti].points);
                        if dij < dii {
                            map.set(j, Some(ti));
                            map.set(i, None);
                            dii = dij;
                        }
                    }
                }
            }
        }
    }
    map
}

/// Turns a one-to-one map into a total M:N map. Leading and trailing
/// unassigned strokes join the nearest assigned run; an interior gap is split
/// between its two neighbouring targets at the point where the two merged
/// runs fit their targets best.
pub fn complete_map(p1: &Pattern, p2: &Pattern, metric: DistanceMetric, mut map: StrokeMap) -> StrokeMap {
    if map.is_complete() {
        return map;
    }
    let (larger, smaller) = larger_and_smaller(&p1.strokes, &p2.strokes);
    let n = map.len();

    let (first_assigned, last_assigned) = match (
        (0..n).find(|&i| map.get(i).is_some()),
        (0..n).rev().find(|&i| map.get(i).is_some()),
    ) {
        (Some(first), Some(last)) => (first, last),
        // Nothing to anchor on (empty smaller pattern)
        _ => return map,
    };

    // Complete at the end
    let map_last_to = map.get(last_assigned);
    for i in last_assigned + 1..n {
        map.set(i, map_last_to);
    }
    // Complete at the beginning
    let map_first_to = map.get(first_assigned);
    for i in 0..first_assigned {
        map.set(i, map_first_to);
    }

    // Remaining gaps are interior: start and stop are both assigned
    for i in 0..n {
        if i + 1 >= n || map.get(i + 1).is_some() {
            continue;
        }
        let start = i;
        let mut stop = i + 1;
        while stop < n && map.get(stop).is_none() {
            stop += 1;
        }
        let (Some(start_target), Some(stop_target)) = (map.get(start), map.get(stop)) else {
            continue;
        };

        let mut div = start;
        let mut best_dist = SPLIT_DISTANCE_CEILING;
        for j in start..stop {
            let stroke_ab = concat(&larger[start..=j]);
            let stroke_bc = concat(&larger[j + 1..=stop]);
            let d_ab = metric(&stroke_ab, &smaller[start_target].points);
            let d_bc = metric(&stroke_bc, &smaller[stop_target].points);
            if d_ab + d_bc < best_dist {
                div = j;
                best_dist = d_ab + d_bc;
            }
        }
        for j in start..=div {
            map.set(j, Some(start_target));
        }
        for j in div + 1..stop {
            map.set(j, Some(stop_target));
        }
    }
    map
}

/// Full alignment: seed and refine with `seed_metric`, then complete gaps
/// with `gap_metric`.
pub fn align(
    p1: &Pattern,
    p2: &Pattern,
    seed_metric: DistanceMetric,
    gap_metric: DistanceMetric,
    passes: usize,
) -> StrokeMap {
    let map = get_map(p1, p2, seed_metric, passes);
    complete_map(p1, p2, gap_metric, map)
}

#[cfg(test)]
mod tests {
    use super::super::distance::*;
    use super::*;

    fn pattern(json: &str) -> Pattern {
        let nested: Vec<Vec<Vec<f64>>> = serde_json::from_str(json).unwrap();
        Pattern::from_nested(&nested).unwrap()
    }

    // Three horizontal bars, top to bottom
    static THREE_BARS: &str = "[[[20,40],[120,40],[220,40]],[[20,128],[120,128],[220,128]],[[20,216],[120,216],[220,216]]]";
    // Five strokes: the middle bar drawn in three pieces
    static FIVE_PIECES: &str = "[[[20,40],[120,40],[220,40]],[[20,128],[80,128]],[[90,128],[150,128]],[[160,128],[220,128]],[[20,216],[120,216],[220,216]]]";

    fn assert_runs_contiguous(map: &StrokeMap) {
        let mut seen: Vec<usize> = Vec::new();
        for run in map.runs() {
            let target = run.target.expect("Run must be assigned.");
            assert!(!seen.contains(&target), "Target {} appears in two separate runs.", target);
            seen.push(target);
        }
    }

    #[test]
    fn test_larger_and_smaller() {
        let a = [1, 2, 3];
        let b = [4, 5];
        assert_eq!(larger_and_smaller(&a, &b), (&a[..], &b[..]));
        assert_eq!(larger_and_smaller(&b, &a), (&a[..], &b[..]));
        // Ties keep the first argument as larger
        let c = [6, 7, 8];
        assert_eq!(larger_and_smaller(&c, &a).0, &c[..]);
    }

    #[test]
    fn test_runs() {
        let map = StrokeMap::from_targets(vec![Some(0), Some(0), Some(1), None, None, Some(1)]);
        let runs = map.runs();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0], Run { start: 0, stop: 2, target: Some(0) });
        assert_eq!(runs[2], Run { start: 3, stop: 5, target: None });
        assert!(!map.is_complete());
    }

    #[test]
    fn test_identity_alignment() {
        let p = pattern(THREE_BARS);
        let map = align(&p, &p, end_point_distance, end_point_distance, DEFAULT_REFINEMENT_PASSES);
        assert_eq!(map.targets(), &[Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_greedy_seed_follows_geometry_not_order() {
        let p = pattern(THREE_BARS);
        let reversed = pattern("[[[20,216],[120,216],[220,216]],[[20,128],[120,128],[220,128]],[[20,40],[120,40],[220,40]]]");
        let map = init_stroke_map(&p, &reversed, end_point_distance);
        assert_eq!(map.targets(), &[Some(2), Some(1), Some(0)]);
    }

    #[test]
    fn test_greedy_seed_leaves_extra_strokes_unassigned() {
        let larger = pattern(FIVE_PIECES);
        let smaller = pattern(THREE_BARS);
        let map = get_map(&larger, &smaller, end_point_distance, DEFAULT_REFINEMENT_PASSES);
        assert_eq!(map.len(), 5);
        assert_eq!(map.targets().iter().filter(|t| t.is_some()).count(), 3);
        assert_eq!(map.get(0), Some(0));
        assert_eq!(map.get(4), Some(2));
    }

    #[test]
    fn test_complete_map_merges_pieces() {
        let larger = pattern(FIVE_PIECES);
        let smaller = pattern(THREE_BARS);
        for &(seed, gap) in &[
            (end_point_distance as DistanceMetric, end_point_distance as DistanceMetric),
            (initial_distance as DistanceMetric, whole_whole_distance as DistanceMetric),
        ] {
            let map = align(&larger, &smaller, seed, gap, DEFAULT_REFINEMENT_PASSES);
            assert!(map.is_complete());
            assert_eq!(map.targets(), &[Some(0), Some(1), Some(1), Some(1), Some(2)]);
            assert_runs_contiguous(&map);
            // Argument order only changes which side is called larger, not the map
            assert_eq!(align(&smaller, &larger, seed, gap, DEFAULT_REFINEMENT_PASSES), map);
        }
    }

    #[test]
    fn test_complete_map_fills_leading_and_trailing_gaps() {
        let larger = pattern("[[[0,0],[1,0]],[[0,0],[2,0]],[[0,0],[3,0]],[[0,0],[4,0]]]");
        let smaller = pattern("[[[0,0],[2,0]]]");
        let map = complete_map(&larger, &smaller, end_point_distance, StrokeMap::from_targets(vec![None, Some(0), None, None]));
        assert_eq!(map.targets(), &[Some(0), Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_complete_map_picks_best_split() {
        // Strokes 1 and 2 are unassigned between two anchors; stroke 1 continues
        // the left target, stroke 2 starts the right one.
        let larger = pattern("[[[0,0],[10,0]],[[10,0],[20,0]],[[100,0],[110,0]],[[110,0],[120,0]]]");
        let smaller = pattern("[[[0,0],[20,0]],[[100,0],[120,0]]]");
        let seed = StrokeMap::from_targets(vec![Some(0), None, None, Some(1)]);
        let map = complete_map(&larger, &smaller, end_point_distance, seed);
        assert_eq!(map.targets(), &[Some(0), Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_complete_map_with_empty_smaller_pattern() {
        let larger = pattern(THREE_BARS);
        let empty = Pattern::default();
        let map = align(&larger, &empty, end_point_distance, end_point_distance, DEFAULT_REFINEMENT_PASSES);
        assert_eq!(map.len(), 3);
        assert!(map.targets().iter().all(|t| t.is_none()));
    }

    #[test]
    fn test_refinement_hands_target_to_unassigned_stroke() {
        // Points on a line: larger at x = -4, -3, 0, -5; smaller at x = -1, 5
        let larger = pattern("[[[-4,0]],[[-3,0]],[[0,0]],[[-5,0]]]");
        let smaller = pattern("[[[-1,0]],[[5,0]]]");
        let seed = init_stroke_map(&larger, &smaller, end_point_distance);
        assert_eq!(seed.targets(), &[None, Some(1), Some(0), None]);
        // Pass 1: stroke 1 swaps with stroke 2, then hands target 0 to stroke 3;
        // stroke 3 hands it on to stroke 0 and skips the rest of its scan
        let one_pass = get_map(&larger, &smaller, end_point_distance, 1);
        assert_eq!(one_pass.targets(), &[Some(0), None, Some(1), None]);
        // Pass 2: stroke 0 hands target 0 over to stroke 1
        let refined = get_map(&larger, &smaller, end_point_distance, DEFAULT_REFINEMENT_PASSES);
        assert_eq!(refined.targets(), &[None, Some(0), Some(1), None]);
        for map in [&one_pass, &refined] {
            for target in 0..smaller.len() {
                assert_eq!(map.targets().iter().filter(|t| **t == Some(target)).count(), 1);
            }
        }
    }

    #[test]
    fn test_refinement_swaps_greedy_choice() {
        // Greedy gives the first smaller stroke its nearest partner and leaves
        // the second one with a poor match; swapping is cheaper overall.
        let larger = pattern("[[[1,0]],[[-2,0]]]");
        let smaller = pattern("[[[0,0]],[[3,0]]]");
        let seed = init_stroke_map(&larger, &smaller, end_point_distance);
        assert_eq!(seed.targets(), &[Some(0), Some(1)]);
        let refined = get_map(&larger, &smaller, end_point_distance, 1);
        assert_eq!(refined.targets(), &[Some(1), Some(0)]);
        assert_eq!(compute_distance(&larger, &smaller, end_point_distance, &seed), 12.0);
        assert_eq!(compute_distance(&larger, &smaller, end_point_distance, &refined), 8.0);
        // No passes means no refinement
        assert_eq!(get_map(&larger, &smaller, end_point_distance, 0), seed);
    }
}
