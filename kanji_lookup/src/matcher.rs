use log::debug;

use super::config::RecognizerConfig;
use super::distance::*;
use super::entities::*;
use super::error::Result;
use super::feature_extractor::extract_features;
use super::match_collector::*;
use super::moment_normalizer::moment_normalize;
use super::reference_db::*;
use super::stroke_map::align;
use super::{CandidateScore, Match};

/// Two-phase classifier over a reference database: a cheap endpoint-based
/// coarse pass over every reference in the stroke-count window, then a
/// whole-shape fine pass over the best coarse survivors.
///
/// A matcher only reads its database, so one database can serve any number
/// of matchers on any number of threads.
pub struct Matcher<'a> {
    db: &'a ReferenceDatabase,
    config: RecognizerConfig,
}

impl<'a> Matcher<'a> {
    pub fn new(db: &'a ReferenceDatabase) -> Matcher<'a> {
        Matcher {
            db: db,
            config: RecognizerConfig::default(),
        }
    }

    pub fn with_config(db: &'a ReferenceDatabase, config: RecognizerConfig) -> Result<Matcher<'a>> {
        config.validate()?;
        Ok(Matcher { db: db, config: config })
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Normalizes and resamples raw ink into the form reference patterns are
    /// stored in.
    pub fn prepare(&self, pattern: &Pattern) -> Pattern {
        extract_features(&moment_normalize(pattern), self.config.interval)
    }

    /// Scores every reference admitted by the stroke-count window using
    /// endpoint geometry. Returns all of them, best first.
    pub fn coarse_classification(&self, input: &Pattern) -> Vec<CandidateScore> {
        let input_len = input.len();
        let mut candidates: Vec<CandidateScore> = Vec::new();
        for (i, entry) in self.db.iter().enumerate() {
            if !self.config.admits(input_len, entry.stroke_count) {
                continue;
            }
            let map = align(
                &entry.pattern,
                input,
                end_point_distance,
                end_point_distance,
                self.config.refinement_passes,
            );
            let dist = compute_distance(&entry.pattern, input, end_point_distance, &map);
            // Declared vs stored stroke count of the reference
            let m = entry.stroke_count.min(entry.pattern.len());
            let n = entry.stroke_count.max(entry.pattern.len());
            let score = if n == 0 { dist } else { dist * (m as f64 / n as f64) };
            candidates.push(CandidateScore { index: i, score: score });
        }
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        debug!(
            "Coarse pass: {} of {} references in stroke window for {} input strokes",
            candidates.len(),
            self.db.len(),
            input_len
        );
        candidates
    }

    /// Re-ranks the best coarse candidates using the full shape of every
    /// stroke. Returns at most `max_results` scored labels, best first.
    pub fn fine_classification(&self, input: &Pattern, coarse: &[CandidateScore]) -> Vec<Match> {
        let input_len = input.len();
        let mut best: Vec<CandidateScore> = Vec::with_capacity(self.config.max_results.min(coarse.len()));
        let mut collector = MatchCollector::new(&mut best, self.config.max_results);
        for candidate in coarse.iter().take(self.config.coarse_candidates) {
            let entry = match self.db.get(candidate.index) {
                Some(entry) => entry,
                None => continue,
            };
            if !self.config.admits(input_len, entry.stroke_count) {
                continue;
            }
            let map = align(
                &entry.pattern,
                input,
                initial_distance,
                whole_whole_distance,
                self.config.refinement_passes,
            );
            let mut dist = compute_whole_distance_weighted(&entry.pattern, input, &map);
            let m = input_len.min(entry.pattern.len());
            if m > 0 {
                dist /= m as f64;
            }
            collector.file_match(CandidateScore {
                index: candidate.index,
                score: dist,
            });
        }
        debug!(
            "Fine pass: kept {} of {} coarse candidates",
            best.len(),
            coarse.len().min(self.config.coarse_candidates)
        );
        best.iter()
            .filter_map(|c| {
                self.db.get(c.index).map(|entry| Match {
                    label: entry.label.clone(),
                    score: c.score,
                })
            })
            .collect()
    }

    /// Recognizes raw ink; scored result, best first. Empty ink gives an
    /// empty result.
    pub fn recognize_scored(&self, pattern: &Pattern) -> Vec<Match> {
        if pattern.is_empty() {
            debug!("Empty ink, nothing to recognize");
            return Vec::new();
        }
        let features = self.prepare(pattern);
        let coarse = self.coarse_classification(&features);
        self.fine_classification(&features, &coarse)
    }

    /// Recognizes raw ink; labels only, best first.
    pub fn recognize(&self, pattern: &Pattern) -> Vec<String> {
        self.recognize_scored(pattern).into_iter().map(|m| m.label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pattern(json: &str) -> Pattern {
        let nested: Vec<Vec<Vec<f64>>> = serde_json::from_str(json).unwrap();
        Pattern::from_nested(&nested).unwrap()
    }

    // Raw ink, in screen pixels
    static ICHI: &str = "[[[40,150],[80,151],[120,150],[160,152],[200,151],[240,150],[280,149]]]";
    static NI: &str = "[[[70,90],[110,91],[150,90],[190,92],[230,90]],[[40,210],[100,211],[160,210],[220,212],[280,210]]]";
    static SAN: &str = "[[[80,60],[120,61],[160,60],[200,61]],[[90,140],[130,141],[170,140],[210,140]],[[40,230],[100,231],[160,230],[220,231],[280,230]]]";
    static JUU: &str = "[[[40,150],[100,151],[160,150],[220,151],[280,150]],[[160,40],[161,90],[160,140],[159,190],[160,240],[161,280]]]";
    static KUCHI: &str = "[[[60,60],[60,120],[60,180],[60,240]],[[60,60],[130,60],[200,60],[240,60],[240,120],[240,180],[240,240]],[[60,240],[130,240],[200,240],[240,240]]]";
    static HITO: &str = "[[[160,40],[150,100],[130,160],[100,210],[60,260]],[[150,130],[180,180],[220,230],[260,270]]]";

    // Database entries are stored normalized and resampled, like the input
    fn build_db(samples: &[(&str, &str)]) -> ReferenceDatabase {
        let db = ReferenceDatabase::default();
        let matcher = Matcher::new(&db);
        ReferenceDatabase::new(
            samples
                .iter()
                .map(|(label, json)| {
                    let prepared = matcher.prepare(&pattern(json));
                    ReferenceEntry::new(label, prepared.len(), prepared)
                })
                .collect(),
        )
    }

    fn sample_db() -> ReferenceDatabase {
        build_db(&[
            ("一", ICHI),
            ("二", NI),
            ("三", SAN),
            ("十", JUU),
            ("口", KUCHI),
            ("人", HITO),
        ])
    }

    #[test]
    fn test_self_match_scores_zero() {
        let db = sample_db();
        let matcher = Matcher::new(&db);
        for (label, json) in [("二", NI), ("三", SAN), ("十", JUU), ("口", KUCHI), ("人", HITO)].iter() {
            let res = matcher.recognize_scored(&pattern(json));
            assert!(!res.is_empty());
            assert_eq!(res[0].label, *label);
            assert_abs_diff_eq!(res[0].score, 0.0);
        }
    }

    #[test]
    fn test_stroke_window_filters_coarse_candidates() {
        let db = sample_db();
        let matcher = Matcher::new(&db);
        // One stroke admits references of 0..=3 strokes
        let input = matcher.prepare(&pattern(ICHI));
        let coarse = matcher.coarse_classification(&input);
        assert_eq!(coarse.len(), db.len());
        // Six strokes admit only references of 5..=8 strokes; there are none
        let six = pattern("[[[0,0],[9,0]],[[0,10],[9,10]],[[0,20],[9,20]],[[0,30],[9,30]],[[0,40],[9,40]],[[0,50],[9,50]]]");
        let coarse = matcher.coarse_classification(&matcher.prepare(&six));
        assert!(coarse.is_empty());
        for candidate in matcher.coarse_classification(&matcher.prepare(&pattern(NI))) {
            let entry = db.get(candidate.index).unwrap();
            assert!(matcher.config().admits(2, entry.stroke_count));
        }
    }

    #[test]
    fn test_coarse_is_sorted() {
        let db = sample_db();
        let matcher = Matcher::new(&db);
        let coarse = matcher.coarse_classification(&matcher.prepare(&pattern(JUU)));
        for pair in coarse.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
        assert_eq!(db.get(coarse[0].index).unwrap().label, "十");
    }

    #[test]
    fn test_max_results_limits_output() {
        let db = sample_db();
        let config = RecognizerConfig {
            max_results: 2,
            ..RecognizerConfig::default()
        };
        let matcher = Matcher::with_config(&db, config).unwrap();
        let res = matcher.recognize(&pattern(SAN));
        assert_eq!(res.len(), 2);
        assert_eq!(res[0], "三");
    }

    #[test]
    fn test_unbounded_limits() {
        let db = sample_db();
        let config = RecognizerConfig {
            max_results: usize::MAX,
            coarse_candidates: usize::MAX,
            window_above: usize::MAX,
            window_below: usize::MAX,
            ..RecognizerConfig::default()
        };
        let matcher = Matcher::with_config(&db, config).unwrap();
        let res = matcher.recognize(&pattern(NI));
        assert_eq!(res.len(), db.len());
        assert_eq!(res[0], "二");
    }

    #[test]
    fn test_coarse_candidates_limit_fine_pass() {
        let db = sample_db();
        let config = RecognizerConfig {
            coarse_candidates: 1,
            ..RecognizerConfig::default()
        };
        let matcher = Matcher::with_config(&db, config).unwrap();
        assert_eq!(matcher.recognize(&pattern(KUCHI)), vec!["口".to_string()]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let db = sample_db();
        let config = RecognizerConfig {
            max_results: 0,
            ..RecognizerConfig::default()
        };
        assert!(Matcher::with_config(&db, config).is_err());
    }

    #[test]
    fn test_empty_ink_and_empty_database() {
        let db = sample_db();
        let matcher = Matcher::new(&db);
        assert!(matcher.recognize(&Pattern::default()).is_empty());
        let empty_db = ReferenceDatabase::default();
        let matcher = Matcher::new(&empty_db);
        assert!(matcher.recognize(&pattern(ICHI)).is_empty());
    }

    #[test]
    fn test_recognize_does_not_modify_input() {
        let db = sample_db();
        let matcher = Matcher::new(&db);
        let ink = pattern(HITO);
        let copy = ink.clone();
        let _ = matcher.recognize(&ink);
        assert_eq!(ink, copy);
    }
}
