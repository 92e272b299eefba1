use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::Metric;
use crate::analysis::Analysis;
use crate::oracle::Oracle;
use crate::selection::{
    FeatureBundle, FeatureNeeds, MetricFeature, ScoredWord, SelectionError, WordFeatures,
};

/// How each model's confidence in its own analysis is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BracketVariant {
    /// Viterbi cost per character.
    #[default]
    Logp,
    /// Raw Viterbi cost.
    Unnorm,
    /// Viterbi cost minus forward cost.
    Uncert,
}

impl BracketVariant {
    pub const ALL: [BracketVariant; 3] = [Self::Logp, Self::Unnorm, Self::Uncert];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logp => "logp",
            Self::Unnorm => "unnorm",
            Self::Uncert => "uncert",
        }
    }
}

impl fmt::Display for BracketVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BracketVariant {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| SelectionError::UnknownMetric(format!("alphabracket_{s}")))
    }
}

/// Disagreement between two models trained with different smoothing
/// (a "low" and a "hi" model).
///
/// Words both models segment identically are dropped; the rest are ranked by
/// the sum of the two confidence values, most probable first. The metric
/// queries its own models and ignores the selector's oracle.
#[derive(Clone)]
pub struct AlphaBracketMetric {
    name: String,
    variant: BracketVariant,
    models: Option<(Arc<dyn Oracle>, Arc<dyn Oracle>)>,
}

impl AlphaBracketMetric {
    pub fn new(variant: BracketVariant) -> Self {
        Self {
            name: format!("alphabracket_{variant}"),
            variant,
            models: None,
        }
    }

    pub fn variant(&self) -> BracketVariant {
        self.variant
    }

    pub fn set_models(&mut self, low: Arc<dyn Oracle>, hi: Arc<dyn Oracle>) {
        self.models = Some((low, hi));
    }

    pub fn with_models(mut self, low: Arc<dyn Oracle>, hi: Arc<dyn Oracle>) -> Self {
        self.set_models(low, hi);
        self
    }

    fn confidence(
        &self,
        model: &dyn Oracle,
        word: &str,
    ) -> Result<(f64, Analysis), SelectionError> {
        let best = model.viterbi_analyze(word)?;
        let value = match self.variant {
            BracketVariant::Logp => best.logp / word.chars().count().max(1) as f64,
            BracketVariant::Unnorm => best.logp,
            BracketVariant::Uncert => best.logp - model.forward_logprob(word)?,
        };
        Ok((value, best.analysis))
    }
}

impl fmt::Debug for AlphaBracketMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaBracketMetric")
            .field("name", &self.name)
            .field("models", &self.models.is_some())
            .finish()
    }
}

impl Metric for AlphaBracketMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn needs(&self) -> FeatureNeeds {
        FeatureNeeds::NONE
    }

    fn descending(&self) -> bool {
        false
    }

    fn check_ready(&self) -> Result<(), SelectionError> {
        match self.models {
            Some(_) => Ok(()),
            None => Err(SelectionError::MissingModels {
                metric: self.name.clone(),
            }),
        }
    }

    fn features(
        &self,
        word: &str,
        _bundle: &FeatureBundle,
        _oracle: Option<&dyn Oracle>,
    ) -> Result<Option<MetricFeature>, SelectionError> {
        let (low_model, hi_model) = self.models.as_ref().ok_or_else(|| {
            SelectionError::MissingModels {
                metric: self.name.clone(),
            }
        })?;
        let (low, low_analysis) = self.confidence(low_model.as_ref(), word)?;
        let (hi, hi_analysis) = self.confidence(hi_model.as_ref(), word)?;
        Ok(Some(MetricFeature::Bracket {
            low,
            hi,
            matched: low_analysis == hi_analysis,
        }))
    }

    fn score<'a>(
        &'a self,
        features: &'a [WordFeatures],
    ) -> Box<dyn Iterator<Item = ScoredWord> + 'a> {
        Box::new(features.iter().filter_map(|wf| {
            match wf.features.custom(&self.name) {
                Some(MetricFeature::Bracket {
                    low,
                    hi,
                    matched: false,
                }) => Some(ScoredWord::new(hi + low, wf.word.as_str())),
                _ => None,
            }
        }))
    }
}
