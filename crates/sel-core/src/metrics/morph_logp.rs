use super::{best_analysis, require_oracle, Metric};
use crate::oracle::Oracle;
use crate::selection::{
    FeatureBundle, FeatureNeeds, MetricFeature, ScoreKey, ScoredWord, SelectionError,
    WordFeatures,
};

/// Which end of the emission costs a `MorphLogpMetric` ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    fn pick(self, values: &[f64]) -> Option<f64> {
        let mut it = values.iter().copied();
        let first = it.next()?;
        Some(match self {
            Self::Min => it.fold(first, f64::min),
            Self::Max => it.fold(first, f64::max),
        })
    }
}

/// Ranks by the min or max emission cost among the Viterbi morphs, with
/// uncertainty as the tie-breaker.
#[derive(Debug, Clone)]
pub struct MorphLogpMetric {
    name: String,
    extremum: Extremum,
}

impl MorphLogpMetric {
    pub fn new(extremum: Extremum) -> Self {
        Self {
            name: format!("morphlogp_{}", extremum.as_str()),
            extremum,
        }
    }

    pub fn extremum(&self) -> Extremum {
        self.extremum
    }
}

impl Metric for MorphLogpMetric {
    fn name(&self) -> &str {
        &self.name
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
        oracle: Option<&dyn Oracle>,
    ) -> Result<Option<MetricFeature>, SelectionError> {
        let oracle = require_oracle(&self.name, oracle)?;
        let emissions = best_analysis(bundle)
            .iter()
            .map(|m| oracle.log_emission(m.category, &m.morph))
            .collect();
        Ok(Some(MetricFeature::Emissions(emissions)))
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        Box::new(features.iter().filter_map(|wf| {
            let Some(MetricFeature::Emissions(emissions)) = wf.features.custom(&self.name) else {
                return None;
            };
            let primary = self.extremum.pick(emissions)?;
            let uncertainty = wf.features.uncertainty?;
            Some(ScoredWord::new(
                ScoreKey::pair(primary, uncertainty),
                wf.word.as_str(),
            ))
        }))
    }
}
