//! Greedy diminishing-returns selection shared by the coverage metrics.

use tracing::{debug, debug_span};

use crate::selection::{ScoreKey, ScoredWord, WordFeatures};

/// Per-pass mask state of a greedy metric.
///
/// Created fresh for every ranking pass; `mark` records what a selected word
/// covers so `score` stops rewarding it for the remaining candidates.
pub(crate) trait CoverageState {
    fn score(&self, word: &WordFeatures) -> ScoreKey;

    fn mark(&mut self, word: &WordFeatures);
}

/// Select up to `n` words one at a time.
///
/// Every round rescores the remaining candidates against the current mask,
/// stable-sorts them and takes the first. The remaining candidates keep the
/// sorted order into the next round, so ties resolve by the previous round's
/// ranking.
pub(crate) fn greedy_select<S: CoverageState>(
    metric: &str,
    mut remaining: Vec<WordFeatures>,
    n: usize,
    descending: bool,
    state: &mut S,
) -> Vec<ScoredWord> {
    let _span = debug_span!("greedy_select", metric, candidates = remaining.len(), n).entered();
    let mut selected = Vec::with_capacity(n.min(remaining.len()));

    while selected.len() < n && !remaining.is_empty() {
        let mut order: Vec<(ScoreKey, usize)> =
            remaining.iter().map(|wf| state.score(wf)).zip(0..).collect();
        if descending {
            order.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            order.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut slots: Vec<Option<WordFeatures>> = remaining.into_iter().map(Some).collect();
        let mut ranked = order
            .into_iter()
            .filter_map(|(score, i)| slots[i].take().map(|wf| (score, wf)));

        let Some((score, best)) = ranked.next() else {
            break;
        };
        remaining = ranked.map(|(_, wf)| wf).collect();

        state.mark(&best);
        selected.push(ScoredWord::new(score, best.word));
    }

    if selected.len() < n {
        debug!(
            selected = selected.len(),
            shortfall = n - selected.len(),
            "candidate pool exhausted"
        );
    }
    selected
}
