use std::collections::HashMap;

use crate::analysis::{Category, ConstrainedMorph, ViterbiResult};
use crate::oracle::{LexiconOracle, MorphLexicon, Oracle, OracleError};

/// Shared test lexicon: a handful of English stems and affixes.
pub fn test_lexicon() -> MorphLexicon {
    let mut lex = MorphLexicon::new();
    for (morph, cat, count) in [
        ("walk", Category::Stm, 20),
        ("run", Category::Stm, 15),
        ("jump", Category::Stm, 10),
        ("talk", Category::Stm, 8),
        ("kind", Category::Stm, 5),
        ("book", Category::Stm, 4),
        ("able", Category::Stm, 3),
        ("un", Category::Pre, 10),
        ("re", Category::Pre, 8),
        ("ed", Category::Suf, 12),
        ("ing", Category::Suf, 15),
        ("s", Category::Suf, 20),
        ("er", Category::Suf, 6),
        ("able", Category::Suf, 4),
        ("n", Category::Zzz, 1),
    ] {
        lex.insert(morph, cat, count);
    }
    lex
}

pub fn test_oracle() -> LexiconOracle {
    LexiconOracle::new(test_lexicon()).unwrap()
}

pub fn stm(m: &str) -> ConstrainedMorph {
    ConstrainedMorph::new(m, Category::Stm)
}

pub fn cm(m: &str, category: Category) -> ConstrainedMorph {
    ConstrainedMorph::new(m, category)
}

/// Oracle with scripted answers, for exact feature values.
#[derive(Default)]
pub struct ScriptedOracle {
    pub nbest: HashMap<String, Vec<ViterbiResult>>,
    pub forward: HashMap<String, f64>,
    pub lexicon: Vec<(String, Vec<u64>)>,
    pub emissions: HashMap<String, f64>,
}

impl ScriptedOracle {
    /// Register a word with its n-best list `(analysis, cost)` and forward cost.
    pub fn word(mut self, word: &str, nbest: Vec<(Vec<ConstrainedMorph>, f64)>, fwd: f64) -> Self {
        self.nbest.insert(
            word.to_string(),
            nbest
                .into_iter()
                .map(|(analysis, logp)| ViterbiResult { analysis, logp })
                .collect(),
        );
        self.forward.insert(word.to_string(), fwd);
        self
    }

    /// Single-analysis shorthand.
    pub fn single(self, word: &str, analysis: Vec<ConstrainedMorph>, logp: f64, fwd: f64) -> Self {
        self.word(word, vec![(analysis, logp)], fwd)
    }

    pub fn lexicon_entry(mut self, morph: &str, counts: [u64; 4]) -> Self {
        self.lexicon.push((morph.to_string(), counts.to_vec()));
        self
    }

    pub fn emission(mut self, morph: &str, cost: f64) -> Self {
        self.emissions.insert(morph.to_string(), cost);
        self
    }

    fn lookup(&self, word: &str) -> Result<&Vec<ViterbiResult>, OracleError> {
        self.nbest
            .get(word)
            .ok_or_else(|| OracleError::Unanalyzable {
                word: word.to_string(),
                symbol: word.chars().next().unwrap_or('?'),
            })
    }
}

impl Oracle for ScriptedOracle {
    fn viterbi_analyze(&self, word: &str) -> Result<ViterbiResult, OracleError> {
        Ok(self.lookup(word)?[0].clone())
    }

    fn viterbi_nbest(&self, word: &str, k: usize) -> Result<Vec<ViterbiResult>, OracleError> {
        Ok(self.lookup(word)?.iter().take(k).cloned().collect())
    }

    fn forward_logprob(&self, word: &str) -> Result<f64, OracleError> {
        self.lookup(word)?;
        Ok(self.forward[word])
    }

    fn lexicon(&self) -> Vec<(String, Vec<u64>)> {
        self.lexicon.clone()
    }

    fn log_emission(&self, _category: Category, morph: &str) -> f64 {
        self.emissions.get(morph).copied().unwrap_or(10.0)
    }
}
