//! Named word pools.

use std::collections::HashSet;
use std::path::Path;

use crate::selection::io::read_wordlist;
use crate::selection::SelectionError;

/// A word collection, optionally tagged with the metric that selected it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    pub id: String,
    pub metric: Option<String>,
    pub words: Vec<String>,
}

impl Pool {
    pub fn new(id: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            id: id.into(),
            metric: None,
            words,
        }
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    /// Pool from a word-list file.
    pub fn load(id: impl Into<String>, path: &Path) -> Result<Self, SelectionError> {
        Ok(Self::new(id, read_wordlist(path)?))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// The pool without any `seen` word; order and tags are kept.
pub fn filter_pool(pool: &Pool, seen: &HashSet<String>) -> Pool {
    Pool {
        id: pool.id.clone(),
        metric: pool.metric.clone(),
        words: pool
            .words
            .iter()
            .filter(|w| !seen.contains(*w))
            .cloned()
            .collect(),
    }
}

/// Concatenate pools under a new id, keeping the first occurrence of each word.
pub fn combine_pools<'p>(id: impl Into<String>, pools: impl IntoIterator<Item = &'p Pool>) -> Pool {
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for pool in pools {
        for word in &pool.words {
            if seen.insert(word.as_str()) {
                words.push(word.clone());
            }
        }
    }
    Pool::new(id, words)
}
