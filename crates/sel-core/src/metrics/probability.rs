//! Metrics scored directly from the model's probabilities.

use super::Metric;
use crate::selection::{FeatureNeeds, ScoredWord, WordFeatures};

/// Viterbi cost minus forward cost: how much probability mass lies outside
/// the best analysis. Most uncertain first.
#[derive(Debug, Default, Clone, Copy)]
pub struct UncertaintyMetric;

impl Metric for UncertaintyMetric {
    fn name(&self) -> &str {
        "uncertainty"
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::with_forward(1)
    }

    fn descending(&self) -> bool {
        true
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        Box::new(features.iter().filter_map(|wf| {
            let uncertainty = wf.features.uncertainty?;
            Some(ScoredWord::new(uncertainty, wf.word.as_str()))
        }))
    }
}

/// Difference between the posterior probabilities of the two best
/// analyses. Smallest margin first; words with a single analysis are left
/// out.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarginMetric;

impl Metric for MarginMetric {
    fn name(&self) -> &str {
        "margin"
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::with_forward(2)
    }

    fn descending(&self) -> bool {
        false
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        Box::new(features.iter().filter_map(|wf| {
            let bundle = &wf.features;
            let [best, second, ..] = bundle.viterbi.as_slice() else {
                return None;
            };
            let forward = bundle.forward_logp?;
            // exp(-a) / exp(-f) computed as exp(f - a) to stay in range.
            let margin = (forward - best.logp).exp() - (forward - second.logp).exp();
            Some(ScoredWord::new(margin, wf.word.as_str()))
        }))
    }
}

/// Viterbi cost per character. Least probable first.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogpMetric;

impl Metric for LogpMetric {
    fn name(&self) -> &str {
        "logp"
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::nbest(1)
    }

    fn descending(&self) -> bool {
        true
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        Box::new(features.iter().filter_map(|wf| {
            let best = wf.features.best()?;
            let len = wf.word.chars().count().max(1);
            Some(ScoredWord::new(best.logp / len as f64, wf.word.as_str()))
        }))
    }
}
