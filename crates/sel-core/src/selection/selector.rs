use std::collections::HashSet;

use tracing::{debug, debug_span, info, warn};

use super::{FeatureBundle, FeatureNeeds, ScoredWord, SelectionError, WordFeatures};
use crate::metrics::Metric;
use crate::oracle::Oracle;
use crate::pool::Pool;

/// Candidate words for a ranking pass: a plain word list or a named pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates(pub Vec<String>);

impl From<Vec<String>> for Candidates {
    fn from(words: Vec<String>) -> Self {
        Self(words)
    }
}

impl From<&[String]> for Candidates {
    fn from(words: &[String]) -> Self {
        Self(words.to_vec())
    }
}

impl From<&[&str]> for Candidates {
    fn from(words: &[&str]) -> Self {
        Self(words.iter().map(|w| w.to_string()).collect())
    }
}

impl From<Vec<&str>> for Candidates {
    fn from(words: Vec<&str>) -> Self {
        words.as_slice().into()
    }
}

impl From<Pool> for Candidates {
    fn from(pool: Pool) -> Self {
        Self(pool.words)
    }
}

impl From<&Pool> for Candidates {
    fn from(pool: &Pool) -> Self {
        Self(pool.words.clone())
    }
}

/// Counts from one ranking pass, for callers that want to know why they got
/// fewer words than they asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankReport {
    pub candidates: usize,
    /// Words the model could not analyse (skipped).
    pub unanalyzable: usize,
    pub requested: Option<usize>,
    pub returned: usize,
}

impl RankReport {
    /// How many fewer words were returned than requested.
    pub fn shortfall(&self) -> usize {
        self.requested
            .map(|n| n.saturating_sub(self.returned))
            .unwrap_or(0)
    }
}

struct Progress<'o> {
    every: usize,
    callback: Box<dyn FnMut(usize) + 'o>,
}

/// Turns candidate words into a ranked selection using one metric.
pub struct Selector<'o> {
    metric: Box<dyn Metric + 'o>,
    oracle: Option<&'o dyn Oracle>,
    progress: Option<Progress<'o>>,
}

impl<'o> Selector<'o> {
    pub fn new(
        metric: Box<dyn Metric + 'o>,
        oracle: Option<&'o dyn Oracle>,
    ) -> Result<Self, SelectionError> {
        let needs = metric.needs();
        if !needs.is_valid() {
            return Err(SelectionError::InvalidNeeds {
                metric: metric.name().to_string(),
                reason: "forward probability requires nbest >= 1".to_string(),
            });
        }
        if needs.needs_oracle() && oracle.is_none() {
            return Err(SelectionError::MissingOracle {
                metric: metric.name().to_string(),
            });
        }
        Ok(Self {
            metric,
            oracle,
            progress: None,
        })
    }

    /// Call `callback(done)` every `every` words of feature extraction and
    /// once when it finishes.
    pub fn with_progress(mut self, every: usize, callback: impl FnMut(usize) + 'o) -> Self {
        self.progress = Some(Progress {
            every: every.max(1),
            callback: Box::new(callback),
        });
        self
    }

    pub fn metric(&self) -> &dyn Metric {
        self.metric.as_ref()
    }

    pub fn metric_mut(&mut self) -> &mut (dyn Metric + 'o) {
        self.metric.as_mut()
    }

    /// Features for each word, computed lazily as the iterator is consumed.
    ///
    /// The iterator is single-pass; oracle failures are yielded as errors
    /// for the caller to handle.
    pub fn calculate_features<'s>(&'s mut self, words: &'s [String]) -> FeatureIter<'s, 'o> {
        FeatureIter {
            words: words.iter(),
            metric: self.metric.as_ref(),
            oracle: self.oracle,
            needs: self.metric.needs(),
            progress: self.progress.as_mut(),
            done: 0,
        }
    }

    /// Build the metric's corpus statistics. No-op for metrics without any.
    pub fn configure(
        &mut self,
        words: &[String],
        seen: &HashSet<String>,
    ) -> Result<(), SelectionError> {
        self.metric.configure(words, seen, self.oracle)
    }

    /// Rank `words`, best first, keeping at most `n` of them.
    pub fn rank(
        &mut self,
        words: impl Into<Candidates>,
        seen: &HashSet<String>,
        n: Option<usize>,
    ) -> Result<Vec<ScoredWord>, SelectionError> {
        self.rank_with_report(words, seen, n).map(|(ranked, _)| ranked)
    }

    pub fn rank_with_report(
        &mut self,
        words: impl Into<Candidates>,
        seen: &HashSet<String>,
        n: Option<usize>,
    ) -> Result<(Vec<ScoredWord>, RankReport), SelectionError> {
        let Candidates(words) = words.into();
        let _span =
            debug_span!("rank", metric = self.metric.name(), candidates = words.len()).entered();
        self.metric.check_ready()?;

        if self.metric.is_configurable() && !self.metric.is_configured() {
            info!(metric = self.metric.name(), "configuring metric from the candidate pool");
            self.metric.configure(&words, seen, self.oracle)?;
        }

        let mut features = Vec::with_capacity(words.len());
        let mut unanalyzable = 0;
        for result in self.calculate_features(&words) {
            match result {
                Ok(wf) => features.push(wf),
                Err(SelectionError::Oracle(e)) if e.is_unanalyzable() => {
                    warn!(error = %e, "skipping word");
                    unanalyzable += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let mut ranked = self.metric.rank(features, n)?;
        if let Some(n) = n {
            ranked.truncate(n);
        }

        let report = RankReport {
            candidates: words.len(),
            unanalyzable,
            requested: n,
            returned: ranked.len(),
        };
        if report.shortfall() > 0 {
            info!(
                metric = self.metric.name(),
                requested = n,
                returned = report.returned,
                "ranking returned fewer words than requested"
            );
        }
        debug!(?report);
        Ok((ranked, report))
    }
}

/// Lazy per-word feature extraction; see `Selector::calculate_features`.
pub struct FeatureIter<'s, 'o> {
    words: std::slice::Iter<'s, String>,
    metric: &'s (dyn Metric + 'o),
    oracle: Option<&'o dyn Oracle>,
    needs: FeatureNeeds,
    progress: Option<&'s mut Progress<'o>>,
    done: usize,
}

impl Iterator for FeatureIter<'_, '_> {
    type Item = Result<WordFeatures, SelectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(word) = self.words.next() else {
            if let Some(p) = self.progress.take() {
                (p.callback)(self.done);
            }
            return None;
        };
        let result = extract(self.metric, self.oracle, self.needs, word);
        self.done += 1;
        if let Some(p) = self.progress.as_mut() {
            if self.done % p.every == 0 {
                (p.callback)(self.done);
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.words.size_hint()
    }
}

fn extract(
    metric: &dyn Metric,
    oracle: Option<&dyn Oracle>,
    needs: FeatureNeeds,
    word: &str,
) -> Result<WordFeatures, SelectionError> {
    let mut bundle = FeatureBundle::default();

    if needs.needs_oracle() {
        let oracle = oracle.ok_or_else(|| SelectionError::MissingOracle {
            metric: metric.name().to_string(),
        })?;
        match needs.nbest {
            0 => {}
            1 => bundle.viterbi = vec![oracle.viterbi_analyze(word)?],
            k => bundle.viterbi = oracle.viterbi_nbest(word, k)?,
        }
        if needs.forward {
            let forward_logp = oracle.forward_logprob(word)?;
            let best = bundle.best().map(|r| r.logp).ok_or_else(|| {
                SelectionError::InvalidNeeds {
                    metric: metric.name().to_string(),
                    reason: format!("no Viterbi analysis for {word:?} to derive uncertainty"),
                }
            })?;
            bundle.forward_logp = Some(forward_logp);
            bundle.uncertainty = Some((best - forward_logp).max(0.0));
        }
    }

    if let Some(custom) = metric.features(word, &bundle, oracle)? {
        bundle.custom = Some((metric.name().to_string(), custom));
    }

    Ok(WordFeatures {
        word: word.to_string(),
        features: bundle,
    })
}
