use crate::analysis::ViterbiResult;

/// Model outputs a metric needs for each word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureNeeds {
    /// Viterbi depth: 0 = none, 1 = best analysis, N = N-best list.
    pub nbest: usize,
    /// Forward probability (and the derived uncertainty).
    pub forward: bool,
}

impl FeatureNeeds {
    pub const NONE: FeatureNeeds = FeatureNeeds {
        nbest: 0,
        forward: false,
    };

    pub const fn nbest(nbest: usize) -> Self {
        Self {
            nbest,
            forward: false,
        }
    }

    pub const fn with_forward(nbest: usize) -> Self {
        Self {
            nbest,
            forward: true,
        }
    }

    /// Uncertainty is derived from the best Viterbi cost, so forward needs nbest >= 1.
    pub fn is_valid(&self) -> bool {
        !self.forward || self.nbest >= 1
    }

    pub fn needs_oracle(&self) -> bool {
        self.nbest > 0 || self.forward
    }
}

/// Metric-specific feature group, stored under the metric's name.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricFeature {
    Flag(bool),
    Emissions(Vec<f64>),
    Bracket { low: f64, hi: f64, matched: bool },
}

/// Features for one word.
///
/// `viterbi` holds as many analyses as the metric asked for (fewer if the
/// model has fewer). `forward_logp` and `uncertainty` are present exactly
/// when the metric asked for forward probabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBundle {
    pub viterbi: Vec<ViterbiResult>,
    pub forward_logp: Option<f64>,
    pub uncertainty: Option<f64>,
    pub custom: Option<(String, MetricFeature)>,
}

impl FeatureBundle {
    pub fn best(&self) -> Option<&ViterbiResult> {
        self.viterbi.first()
    }

    /// The metric-specific group stored under `name`.
    pub fn custom(&self, name: &str) -> Option<&MetricFeature> {
        match &self.custom {
            Some((key, feature)) if key == name => Some(feature),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordFeatures {
    pub word: String,
    pub features: FeatureBundle,
}

impl WordFeatures {
    /// Word with no model features, for metrics that only look at the surface.
    pub fn bare(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            features: FeatureBundle::default(),
        }
    }
}
