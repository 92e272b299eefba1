use tracing::{debug, debug_span};

use super::model::LexiconOracle;
use super::OracleError;
use crate::analysis::Category;

/// A morph hypothesis spanning `start..end` (char indices).
#[derive(Debug, Clone)]
pub(crate) struct LatticeNode {
    pub start: usize,
    pub end: usize,
    pub morph: String,
    pub category: Category,
    /// Emission cost (lower = more preferred)
    pub cost: f64,
}

/// All morph hypotheses for one word, indexed by boundary position.
pub(crate) struct Lattice {
    pub nodes: Vec<LatticeNode>,
    ends_at: Vec<Vec<usize>>,
    starts_at: Vec<Vec<usize>>,
    /// Word length in chars.
    pub len: usize,
}

impl Lattice {
    fn with_len(len: usize) -> Self {
        Self {
            nodes: Vec::new(),
            ends_at: vec![Vec::new(); len + 1],
            starts_at: vec![Vec::new(); len],
            len,
        }
    }

    fn push(&mut self, node: LatticeNode) {
        let idx = self.nodes.len();
        self.ends_at[node.end].push(idx);
        self.starts_at[node.start].push(idx);
        self.nodes.push(node);
    }

    /// Indices of nodes whose morph begins at boundary `pos`.
    pub fn starting_at(&self, pos: usize) -> &[usize] {
        &self.starts_at[pos]
    }

    /// Indices of nodes whose morph finishes at boundary `pos`.
    pub fn ending_at(&self, pos: usize) -> &[usize] {
        &self.ends_at[pos]
    }
}

/// Build a lattice from every lexicon morph occurring in `word`.
///
/// Adds a 1-char ZZZ fallback node wherever no lexicon morph covers exactly
/// one character, so every position stays reachable. Characters outside the
/// model alphabet cannot be covered and fail the whole word.
pub(crate) fn build_lattice(model: &LexiconOracle, word: &str) -> Result<Lattice, OracleError> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let _span = debug_span!("build_lattice", len = chars.len()).entered();
    if chars.is_empty() {
        return Err(OracleError::EmptyWord);
    }
    if let Some(&(_, symbol)) = chars.iter().find(|(_, c)| !model.in_alphabet(*c)) {
        return Err(OracleError::Unanalyzable {
            word: word.to_string(),
            symbol,
        });
    }

    let byte_at = |pos: usize| chars.get(pos).map_or(word.len(), |&(b, _)| b);
    let mut lattice = Lattice::with_len(chars.len());
    let longest = model.max_morph_len();

    for start in 0..lattice.len {
        let mut covered = false;
        for end in start + 1..=(start + longest).min(lattice.len) {
            let morph = &word[byte_at(start)..byte_at(end)];
            let Some(counts) = model.lexicon_ref().counts(morph) else {
                continue;
            };
            for category in Category::ALL {
                let count = counts[category.index()];
                if count > 0 {
                    covered |= end == start + 1;
                    lattice.push(LatticeNode {
                        start,
                        end,
                        morph: morph.to_string(),
                        category,
                        cost: model.joint_cost(count),
                    });
                }
            }
        }

        if !covered {
            lattice.push(LatticeNode {
                start,
                end: start + 1,
                morph: word[byte_at(start)..byte_at(start + 1)].to_string(),
                category: Category::Zzz,
                cost: model.unknown_morph_cost(),
            });
        }
    }

    debug!(nodes = lattice.nodes.len());
    Ok(lattice)
}
