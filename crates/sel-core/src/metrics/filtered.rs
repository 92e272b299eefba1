//! Uncertainty ranking restricted to words whose best analysis has a
//! suspicious category pattern.

use super::{best_analysis, Metric};
use crate::analysis::{Category, ConstrainedMorph};
use crate::oracle::Oracle;
use crate::selection::{
    FeatureBundle, FeatureNeeds, MetricFeature, ScoredWord, SelectionError, WordFeatures,
};

/// Keeps words whose analysis has two adjacent stem-like (STM or ZZZ)
/// morphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryMetric;

/// Keeps words whose analysis has no STM morph at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStmMetric;

fn has_adjacent_stems(analysis: &[ConstrainedMorph]) -> bool {
    analysis
        .windows(2)
        .any(|pair| pair[0].category.is_stem_like() && pair[1].category.is_stem_like())
}

fn has_stem(analysis: &[ConstrainedMorph]) -> bool {
    analysis.iter().any(|m| m.category == Category::Stm)
}

/// Uncertainty scores for the words whose flag equals `keep`.
fn score_flagged<'a>(
    name: &'a str,
    features: &'a [WordFeatures],
    keep: bool,
) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
    Box::new(features.iter().filter_map(move |wf| {
        match wf.features.custom(name) {
            Some(MetricFeature::Flag(flag)) if *flag == keep => {}
            _ => return None,
        }
        let uncertainty = wf.features.uncertainty?;
        Some(ScoredWord::new(uncertainty, wf.word.as_str()))
    }))
}

impl Metric for CategoryMetric {
    fn name(&self) -> &str {
        "category"
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::with_forward(1)
    }

    fn descending(&self) -> bool {
        true
    }

    fn features(
        &self,
        _word: &str,
        bundle: &FeatureBundle,
        _oracle: Option<&dyn Oracle>,
    ) -> Result<Option<MetricFeature>, SelectionError> {
        Ok(Some(MetricFeature::Flag(has_adjacent_stems(
            best_analysis(bundle),
        ))))
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        score_flagged(self.name(), features, true)
    }
}

impl Metric for NoStmMetric {
    fn name(&self) -> &str {
        "nostm"
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::with_forward(1)
    }

    fn descending(&self) -> bool {
        true
    }

    /// The flag records whether an STM is present; flagged words are dropped.
    fn features(
        &self,
        _word: &str,
        bundle: &FeatureBundle,
        _oracle: Option<&dyn Oracle>,
    ) -> Result<Option<MetricFeature>, SelectionError> {
        Ok(Some(MetricFeature::Flag(has_stem(best_analysis(bundle)))))
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        score_flagged(self.name(), features, false)
    }
}
