use std::collections::{HashMap, HashSet};

use tracing::{debug, debug_span};

use super::greedy::{greedy_select, CoverageState};
use super::Metric;
use crate::oracle::Oracle;
use crate::selection::{FeatureNeeds, ScoreKey, ScoredWord, SelectionError, WordFeatures};
use crate::settings::settings;

/// Initial and final substrings of `word`, shortest first, for char lengths
/// `minlen..=min(maxlen, len)`.
pub(crate) fn affixes(word: &str, minlen: usize, maxlen: usize) -> (Vec<&str>, Vec<&str>) {
    let bounds: Vec<usize> = word
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(word.len()))
        .collect();
    let len = bounds.len() - 1;
    let end = maxlen.min(len);
    if minlen > end {
        return (Vec::new(), Vec::new());
    }
    let initial = (minlen..=end).map(|i| &word[..bounds[i]]).collect();
    let last = (minlen..=end).map(|i| &word[bounds[len - i]..]).collect();
    (initial, last)
}

/// Corpus weights of initial and final substrings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstringWeights {
    pub initial: HashMap<String, f64>,
    pub last: HashMap<String, f64>,
}

impl SubstringWeights {
    /// Count substrings over `words`, optionally normalize, then zero every
    /// substring of a `seen` word.
    pub fn build<'w>(
        words: impl IntoIterator<Item = &'w str>,
        seen: &HashSet<String>,
        minlen: usize,
        maxlen: usize,
        normalize: bool,
    ) -> Self {
        let mut weights = Self::default();
        for word in words {
            let (initial, last) = affixes(word, minlen, maxlen);
            for sub in initial {
                *weights.initial.entry(sub.to_string()).or_default() += 1.0;
            }
            for sub in last {
                *weights.last.entry(sub.to_string()).or_default() += 1.0;
            }
        }
        if normalize {
            normalize_by_length(&mut weights.initial);
            normalize_by_length(&mut weights.last);
        }
        for word in seen {
            let (initial, last) = affixes(word, minlen, maxlen);
            for sub in initial {
                weights.initial.insert(sub.to_string(), 0.0);
            }
            for sub in last {
                weights.last.insert(sub.to_string(), 0.0);
            }
        }
        weights
    }

    pub fn initial(&self, sub: &str) -> f64 {
        self.initial.get(sub).copied().unwrap_or(0.0)
    }

    pub fn last(&self, sub: &str) -> f64 {
        self.last.get(sub).copied().unwrap_or(0.0)
    }
}

/// Divide each count by the average count of substrings of the same length.
fn normalize_by_length(counts: &mut HashMap<String, f64>) {
    let mut sum_by_len: HashMap<usize, f64> = HashMap::new();
    let mut distinct_by_len: HashMap<usize, usize> = HashMap::new();
    for (sub, count) in counts.iter() {
        let len = sub.chars().count();
        *sum_by_len.entry(len).or_default() += count;
        *distinct_by_len.entry(len).or_default() += 1;
    }
    for (sub, count) in counts.iter_mut() {
        let len = sub.chars().count();
        let sum = sum_by_len[&len];
        if sum > 0.0 {
            *count = *count / sum * distinct_by_len[&len] as f64;
        }
    }
}

/// Greedy coverage of word-initial and word-final substrings.
///
/// A word scores the summed weights of its substrings that no earlier pick
/// has covered yet. Needs no model features.
#[derive(Debug, Clone)]
pub struct IFSubstringMetric {
    name: String,
    normalize: bool,
    minlen: usize,
    maxlen: usize,
    weights: Option<SubstringWeights>,
}

impl IFSubstringMetric {
    pub fn new(normalize: bool, suffix: &str, maxlen: usize) -> Self {
        Self {
            name: format!("ifsubstrings_{suffix}"),
            normalize,
            minlen: settings().selection.substring_min_len,
            maxlen,
            weights: None,
        }
    }

    pub fn with_minlen(mut self, minlen: usize) -> Self {
        self.minlen = minlen;
        self
    }

    pub fn weights(&self) -> Option<&SubstringWeights> {
        self.weights.as_ref()
    }

    /// Unmasked score of `word` against the configured weights; zero before
    /// configuration.
    pub fn score_word(&self, word: &str) -> f64 {
        match &self.weights {
            Some(weights) => SubstringMask::new(self, weights).score_str(word),
            None => 0.0,
        }
    }
}

struct SubstringMask<'m> {
    weights: &'m SubstringWeights,
    minlen: usize,
    maxlen: usize,
    initial: HashSet<String>,
    last: HashSet<String>,
}

impl<'m> SubstringMask<'m> {
    fn new(metric: &IFSubstringMetric, weights: &'m SubstringWeights) -> Self {
        Self {
            weights,
            minlen: metric.minlen,
            maxlen: metric.maxlen,
            initial: HashSet::new(),
            last: HashSet::new(),
        }
    }

    fn score_str(&self, word: &str) -> f64 {
        let (initial, last) = affixes(word, self.minlen, self.maxlen);
        let i_score: f64 = initial
            .into_iter()
            .filter(|sub| !self.initial.contains(*sub))
            .map(|sub| self.weights.initial(sub))
            .sum();
        let f_score: f64 = last
            .into_iter()
            .filter(|sub| !self.last.contains(*sub))
            .map(|sub| self.weights.last(sub))
            .sum();
        i_score + f_score
    }
}

impl CoverageState for SubstringMask<'_> {
    fn score(&self, word: &WordFeatures) -> ScoreKey {
        ScoreKey::scalar(self.score_str(&word.word))
    }

    fn mark(&mut self, word: &WordFeatures) {
        let (initial, last) = affixes(&word.word, self.minlen, self.maxlen);
        self.initial.extend(initial.into_iter().map(str::to_string));
        self.last.extend(last.into_iter().map(str::to_string));
    }
}

impl Metric for IFSubstringMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::NONE
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
        words: &[String],
        seen: &HashSet<String>,
        _oracle: Option<&dyn Oracle>,
    ) -> Result<(), SelectionError> {
        let _span = debug_span!("configure", metric = %self.name, words = words.len()).entered();
        let weights = SubstringWeights::build(
            words.iter().map(String::as_str),
            seen,
            self.minlen,
            self.maxlen,
            self.normalize,
        );
        debug!(
            initial = weights.initial.len(),
            last = weights.last.len(),
            "substring tables built"
        );
        self.weights = Some(weights);
        Ok(())
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        Box::new(
            features
                .iter()
                .map(|wf| ScoredWord::new(self.score_word(&wf.word), wf.word.as_str())),
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
        let mut mask = SubstringMask::new(self, weights);
        Ok(greedy_select(&self.name, features, n, true, &mut mask))
    }
}
