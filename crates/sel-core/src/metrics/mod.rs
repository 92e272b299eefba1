//! Selection metrics.
//!
//! Every metric declares which model features it needs and whether a higher
//! score is better. Most metrics score each word independently and rank by
//! a single sort. Two of them (`IFSubstringMetric`, `OneOffBoundaryMetric`)
//! rank greedily: each pick masks the features it covers, devaluing the
//! remaining candidates that share them.

mod alpha_bracket;
mod filtered;
mod greedy;
mod morph_logp;
mod one_off;
mod probability;
mod registry;
mod substrings;
#[cfg(test)]
mod tests;

pub use alpha_bracket::{AlphaBracketMetric, BracketVariant};
pub use filtered::{CategoryMetric, NoStmMetric};
pub use morph_logp::{Extremum, MorphLogpMetric};
pub use one_off::OneOffBoundaryMetric;
pub use probability::{LogpMetric, MarginMetric, UncertaintyMetric};
pub use registry::{alpha_bracket_by_name, metric_by_name, metric_names};
pub use substrings::{IFSubstringMetric, SubstringWeights};

use std::collections::HashSet;

use crate::oracle::Oracle;
use crate::selection::score::sort_scored;
use crate::selection::{
    FeatureBundle, FeatureNeeds, MetricFeature, ScoredWord, SelectionError, WordFeatures,
};

/// A word-selection strategy.
///
/// Configurable metrics carry corpus statistics built by `configure`; they
/// must be configured before `rank` (the `Selector` does this lazily from
/// the candidate pool). Greedy metrics need `n` in `rank`.
pub trait Metric {
    /// Feature-group key and output name.
    fn name(&self) -> &str;

    fn needs(&self) -> FeatureNeeds;

    /// Higher raw score is better.
    fn descending(&self) -> bool;

    fn is_configurable(&self) -> bool {
        false
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn is_greedy(&self) -> bool {
        false
    }

    /// Fails if the metric lacks something it cannot run without.
    fn check_ready(&self) -> Result<(), SelectionError> {
        Ok(())
    }

    /// Build corpus statistics from `words`, discounting `seen` ones.
    fn configure(
        &mut self,
        _words: &[String],
        _seen: &HashSet<String>,
        _oracle: Option<&dyn Oracle>,
    ) -> Result<(), SelectionError> {
        Ok(())
    }

    /// Metric-specific features for one word, computed after the generic ones.
    fn features(
        &self,
        _word: &str,
        _bundle: &FeatureBundle,
        _oracle: Option<&dyn Oracle>,
    ) -> Result<Option<MetricFeature>, SelectionError> {
        Ok(None)
    }

    /// Unordered scores. Words a metric filters out are simply absent.
    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a>;

    /// All scored words, best first. `n` is only a hint for sort-based metrics.
    fn rank(
        &mut self,
        features: Vec<WordFeatures>,
        _n: Option<usize>,
    ) -> Result<Vec<ScoredWord>, SelectionError> {
        let mut scored: Vec<ScoredWord> = self.score(&features).collect();
        sort_scored(&mut scored, self.descending());
        Ok(scored)
    }
}

pub(crate) fn require_oracle<'o>(
    metric: &str,
    oracle: Option<&'o dyn Oracle>,
) -> Result<&'o dyn Oracle, SelectionError> {
    oracle.ok_or_else(|| SelectionError::MissingOracle {
        metric: metric.to_string(),
    })
}

/// The Viterbi analysis of a bundle, which every nbest >= 1 metric relies on.
pub(crate) fn best_analysis(bundle: &FeatureBundle) -> &[crate::analysis::ConstrainedMorph] {
    bundle
        .best()
        .map(|r| r.analysis.as_slice())
        .unwrap_or(&[])
}
