//! Active-learning selection: feature extraction, scoring and ranking.
//!
//! A `Selector` pairs one `Metric` with a model oracle. It pulls the model
//! outputs the metric declares it needs, hands the resulting feature
//! bundles to the metric, and returns the ranked `(score, word)` pairs.

mod features;
pub mod io;
pub(crate) mod score;
mod selector;

pub use features::{FeatureBundle, FeatureNeeds, MetricFeature, WordFeatures};
pub use score::{ScoreKey, ScoredWord};
pub use selector::{Candidates, RankReport, Selector};

use std::io as stdio;

use crate::oracle::OracleError;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("metric {metric} ranks greedily and requires the number of words to select")]
    MissingCount { metric: String },

    #[error("metric {metric} requires two models; call set_models first")]
    MissingModels { metric: String },

    #[error("metric {metric} requires a model oracle")]
    MissingOracle { metric: String },

    #[error("metric {metric} must be configured before ranking")]
    NotConfigured { metric: String },

    #[error("metric {metric} declares invalid feature needs: {reason}")]
    InvalidNeeds { metric: String, reason: String },

    #[error("unknown metric {0:?}")]
    UnknownMetric(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("IO error: {0}")]
    Io(#[from] stdio::Error),
}
