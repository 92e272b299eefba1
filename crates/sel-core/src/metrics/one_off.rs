use std::collections::{HashMap, HashSet};

use tracing::{debug, debug_span, warn};

use super::greedy::{greedy_select, CoverageState};
use super::{best_analysis, require_oracle, Metric};
use crate::oracle::Oracle;
use crate::selection::{FeatureNeeds, ScoreKey, ScoredWord, SelectionError, WordFeatures};
use crate::settings::settings;

/// Morph weights from pairs of lexicon morphs one character apart.
///
/// For a morph `x` whose tail (`x` minus its first char) or head (`x` minus
/// its last char) is also a morph `y`, both `x` and `y` gain
/// `count(x) * count(y)`.
pub(crate) fn one_off_weights(
    lexicon: impl IntoIterator<Item = (String, Vec<u64>)>,
    max_len: usize,
) -> HashMap<String, u64> {
    let mut by_length: HashMap<usize, HashMap<String, u64>> = HashMap::new();
    let mut longest = 0;
    for (morph, counts) in lexicon {
        let len = morph.chars().count();
        if len > max_len {
            continue;
        }
        let total = counts.iter().fold(0u64, |acc, c| acc.saturating_add(*c));
        by_length.entry(len).or_default().insert(morph, total);
        longest = longest.max(len);
    }

    let empty = HashMap::new();
    let mut weights: HashMap<String, u64> = HashMap::new();
    for len in 2..=longest {
        let Some(longer) = by_length.get(&len) else {
            continue;
        };
        let shorter = by_length.get(&(len - 1)).unwrap_or(&empty);
        for (morph, &count_longer) in longer {
            for sub in [drop_first(morph), drop_last(morph)] {
                if let Some(&count_sub) = shorter.get(sub) {
                    let weight = count_longer.saturating_mul(count_sub);
                    for key in [morph.as_str(), sub] {
                        let w = weights.entry(key.to_string()).or_default();
                        *w = w.saturating_add(weight);
                    }
                }
            }
        }
    }
    weights
}

fn drop_first(morph: &str) -> &str {
    let mut chars = morph.chars();
    chars.next();
    chars.as_str()
}

fn drop_last(morph: &str) -> &str {
    let mut chars = morph.chars();
    chars.next_back();
    chars.as_str()
}

/// Greedy coverage of morphs that differ from another lexicon morph by one
/// boundary character, with uncertainty as the tie-breaker.
#[derive(Debug, Clone)]
pub struct OneOffBoundaryMetric {
    name: String,
    max_morph_len: usize,
    weights: Option<HashMap<String, u64>>,
}

impl Default for OneOffBoundaryMetric {
    fn default() -> Self {
        Self::new("std")
    }
}

impl OneOffBoundaryMetric {
    pub fn new(suffix: &str) -> Self {
        Self {
            name: format!("oneoffboundary_{suffix}"),
            max_morph_len: settings().selection.oneoff_max_morph_len,
            weights: None,
        }
    }

    pub fn weight(&self, morph: &str) -> u64 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(morph).copied())
            .unwrap_or(0)
    }
}

struct MorphMask<'m> {
    weights: &'m HashMap<String, u64>,
    covered: HashSet<String>,
}

impl CoverageState for MorphMask<'_> {
    fn score(&self, word: &WordFeatures) -> ScoreKey {
        let total: u64 = best_analysis(&word.features)
            .iter()
            .filter(|m| !self.covered.contains(&m.morph))
            .map(|m| self.weights.get(&m.morph).copied().unwrap_or(0))
            .fold(0, u64::saturating_add);
        ScoreKey::pair(total as f64, word.features.uncertainty.unwrap_or_default())
    }

    fn mark(&mut self, word: &WordFeatures) {
        self.covered
            .extend(best_analysis(&word.features).iter().map(|m| m.morph.clone()));
    }
}

impl Metric for OneOffBoundaryMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::with_forward(1)
    }

    fn descending(&self) -> bool {
        true
    }

    fn is_configurable(&self) -> bool {
        true
    }

    fn is_configured(&self) -> bool {
        self.weights.is_some()
    }

    fn is_greedy(&self) -> bool {
        true
    }

    fn configure(
        &mut self,
        _words: &[String],
        seen: &HashSet<String>,
        oracle: Option<&dyn Oracle>,
    ) -> Result<(), SelectionError> {
        let _span = debug_span!("configure", metric = %self.name).entered();
        let oracle = require_oracle(&self.name, oracle)?;
        let mut weights = one_off_weights(oracle.lexicon(), self.max_morph_len);
        debug!(weighted = weights.len(), "one-off morph weights built");

        for word in seen {
            match oracle.viterbi_analyze(word) {
                Ok(best) => {
                    for m in best.analysis {
                        weights.insert(m.morph, 0);
                    }
                }
                Err(e) if e.is_unanalyzable() => {
                    warn!(error = %e, "skipping seen word");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.weights = Some(weights);
        Ok(())
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        let Some(weights) = self.weights.as_ref() else {
            return Box::new(std::iter::empty());
        };
        let mask = MorphMask {
            weights,
            covered: HashSet::new(),
        };
        Box::new(
            features
                .iter()
                .map(move |wf| ScoredWord::new(mask.score(wf), wf.word.as_str())),
        )
    }

    fn rank(
        &mut self,
        features: Vec<WordFeatures>,
        n: Option<usize>,
    ) -> Result<Vec<ScoredWord>, SelectionError> {
        let n = n.ok_or_else(|| SelectionError::MissingCount {
            metric: self.name.clone(),
        })?;
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| SelectionError::NotConfigured {
                metric: self.name.clone(),
            })?;
        let mut mask = MorphMask {
            weights,
            covered: HashSet::new(),
        };
        Ok(greedy_select(&self.name, features, n, true, &mut mask))
    }
}
