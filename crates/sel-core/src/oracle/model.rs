use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use super::cost::CategoryCostFunction;
use super::lattice::build_lattice;
use super::lexicon::MorphLexicon;
use super::viterbi::{forward, viterbi_nbest};
use super::{Oracle, OracleError};
use crate::analysis::{Category, ViterbiResult};
use crate::numeric::zlog;
use crate::settings::settings;

/// Unigram morph/category model over a `MorphLexicon`.
///
/// A morph's path cost is `-ln(count / total)` plus the configured segment
/// penalty; category transitions are scored by `CategoryCostFunction`.
pub struct LexiconOracle {
    lexicon: MorphLexicon,
    alphabet: HashSet<char>,
    category_totals: [u64; 4],
    total: u64,
    max_morph_len: usize,
    unknown_morph_cost: f64,
    cost_fn: CategoryCostFunction,
}

impl LexiconOracle {
    pub fn new(lexicon: MorphLexicon) -> Result<Self, OracleError> {
        let category_totals = lexicon.category_totals();
        let total = category_totals.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
        if lexicon.is_empty() || total == 0 {
            return Err(OracleError::EmptyLexicon);
        }
        let alphabet = lexicon.iter().flat_map(|(m, _)| m.chars()).collect();
        let longest = lexicon
            .iter()
            .map(|(m, _)| m.chars().count())
            .max()
            .unwrap_or(1);
        let s = &settings().oracle;
        Ok(Self {
            lexicon,
            alphabet,
            category_totals,
            total,
            max_morph_len: longest.min(s.max_morph_len),
            unknown_morph_cost: s.unknown_morph_cost,
            cost_fn: CategoryCostFunction {
                segment_penalty: s.segment_penalty,
                bad_transition_penalty: s.bad_transition_penalty,
            },
        })
    }

    /// Load a text or compiled lexicon file.
    pub fn open(path: &Path) -> Result<Self, OracleError> {
        let oracle = Self::new(MorphLexicon::open_any(path)?)?;
        info!(
            path = %path.display(),
            morphs = oracle.lexicon.len(),
            tokens = oracle.total,
            "loaded lexicon oracle"
        );
        Ok(oracle)
    }

    pub fn lexicon_ref(&self) -> &MorphLexicon {
        &self.lexicon
    }

    pub(crate) fn in_alphabet(&self, c: char) -> bool {
        self.alphabet.contains(&c)
    }

    pub(crate) fn max_morph_len(&self) -> usize {
        self.max_morph_len
    }

    pub(crate) fn unknown_morph_cost(&self) -> f64 {
        self.unknown_morph_cost
    }

    /// Path cost of a morph seen `count` times.
    pub(crate) fn joint_cost(&self, count: u64) -> f64 {
        zlog(count as f64 / self.total as f64)
    }
}

impl Oracle for LexiconOracle {
    fn viterbi_analyze(&self, word: &str) -> Result<ViterbiResult, OracleError> {
        let lattice = build_lattice(self, word)?;
        // A connected lattice always yields a path.
        viterbi_nbest(&lattice, &self.cost_fn, 1)
            .into_iter()
            .next()
            .ok_or(OracleError::EmptyWord)
    }

    fn viterbi_nbest(&self, word: &str, k: usize) -> Result<Vec<ViterbiResult>, OracleError> {
        let lattice = build_lattice(self, word)?;
        Ok(viterbi_nbest(&lattice, &self.cost_fn, k))
    }

    fn forward_logprob(&self, word: &str) -> Result<f64, OracleError> {
        let lattice = build_lattice(self, word)?;
        Ok(forward(&lattice, &self.cost_fn))
    }

    fn lexicon(&self) -> Vec<(String, Vec<u64>)> {
        self.lexicon
            .iter()
            .map(|(m, c)| (m.to_string(), c.to_vec()))
            .collect()
    }

    fn log_emission(&self, category: Category, morph: &str) -> f64 {
        let count = self.lexicon.count(morph, category);
        if count == 0 {
            return self.unknown_morph_cost;
        }
        zlog(count as f64 / self.category_totals[category.index()] as f64)
    }
}
