use super::CandidateScore;

/// Keeps the best `max` candidates seen so far, ordered best (lowest
/// distance) first. Candidates with equal scores stay in filing order.
pub struct MatchCollector<'a> {
    max: usize,
    matches: &'a mut Vec<CandidateScore>,
}

impl<'a> MatchCollector<'a> {
    pub fn new(matches: &mut Vec<CandidateScore>, max: usize) -> MatchCollector {
        assert!(max > 0, "Expected a positive number for the maximum number of matches.");
        assert!(matches.len() == 0, "The pre-existing matches vector must be empty.");
        MatchCollector {
            max: max,
            matches: matches,
        }
    }

    pub fn file_match(&mut self, mc: CandidateScore) {
        // Already at limit: don't bother if new match is no better than the current worst
        if self.matches.len() == self.max {
            if let Some(worst) = self.matches.last() {
                if !(mc.score < worst.score) {
                    return;
                }
            }
        }
        // Goes before the first strictly worse match; keeps the array sorted smallest score first
        let ix = self.matches.iter().position(|x| x.score > mc.score);
        match ix {
            Some(ix) => self.matches.insert(ix, mc),
            None => self.matches.push(mc),
        }
        // Beyond limit? Drop last item.
        if self.matches.len() > self.max {
            self.matches.pop();
        }
    }
}
