//! Interleaving several pre-ranked lists into one.

use std::collections::HashSet;
use std::hash::Hash;

/// Takes one item from each source in turn, dropping exhausted sources.
///
/// `ABC`, `D`, `EF` interleave to `A D E B F C`.
pub struct RoundRobin<I> {
    sources: Vec<I>,
    cursor: usize,
}

impl<I: Iterator> Iterator for RoundRobin<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        while !self.sources.is_empty() {
            let idx = self.cursor % self.sources.len();
            match self.sources[idx].next() {
                Some(item) => {
                    self.cursor = idx + 1;
                    return Some(item);
                }
                None => {
                    self.sources.remove(idx);
                    self.cursor = idx;
                }
            }
        }
        None
    }
}

pub fn roundrobin<S>(sources: impl IntoIterator<Item = S>) -> RoundRobin<S::IntoIter>
where
    S: IntoIterator,
{
    RoundRobin {
        sources: sources.into_iter().map(IntoIterator::into_iter).collect(),
        cursor: 0,
    }
}

/// Items in order, skipping any already yielded.
pub fn unique_everseen<I>(items: I) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
    I::Item: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(move |item| seen.insert(item.clone()))
}

/// Interleave ranked word lists, dropping repeats, and keep the first `n`.
pub fn merge_rankings(lists: Vec<Vec<String>>, n: usize) -> Vec<String> {
    unique_everseen(roundrobin(lists)).take(n).collect()
}
