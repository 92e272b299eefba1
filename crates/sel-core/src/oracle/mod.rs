//! Model oracle: the probabilistic segmentation model queried by the selector.
//!
//! The `Oracle` trait is the only thing the ranking core knows about a model.
//! `LexiconOracle` is a small concrete model: a unigram morph/category
//! lexicon searched with N-best Viterbi over a morph lattice, with a forward
//! pass for the total probability mass.

mod cost;
mod lattice;
mod lexicon;
mod model;
mod viterbi;

pub use lexicon::MorphLexicon;
pub use model::LexiconOracle;

use std::io;

use crate::analysis::{Category, ViterbiResult};

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("cannot analyze {word:?}: symbol {symbol:?} is outside the model alphabet")]
    Unanalyzable { word: String, symbol: char },

    #[error("cannot analyze an empty word")]
    EmptyWord,

    #[error("lexicon contains no morphs")]
    EmptyLexicon,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected MSLX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),
}

impl OracleError {
    /// The word itself cannot be analysed under the model (a data error).
    pub fn is_unanalyzable(&self) -> bool {
        matches!(self, Self::Unanalyzable { .. } | Self::EmptyWord)
    }
}

/// Query interface of a segmentation model. Costs follow the crate-wide
/// convention: negative log-probabilities, lower is more probable.
pub trait Oracle: Send + Sync {
    /// Best analysis and its cost.
    fn viterbi_analyze(&self, word: &str) -> Result<ViterbiResult, OracleError>;

    /// Up to `k` distinct analyses, best first.
    fn viterbi_nbest(&self, word: &str, k: usize) -> Result<Vec<ViterbiResult>, OracleError>;

    /// Cost of the total probability mass over all analyses.
    fn forward_logprob(&self, word: &str) -> Result<f64, OracleError>;

    /// Morph → occurrence counts, one per category in `Category::ALL` order.
    fn lexicon(&self) -> Vec<(String, Vec<u64>)>;

    /// Emission cost of `morph` given `category`.
    fn log_emission(&self, category: Category, morph: &str) -> f64;
}
