use std::cmp::Ordering;
use std::fmt;

/// Composite ranking key: a primary score with an optional tie-breaker.
///
/// Ordering is lexicographic over (primary, secondary) using IEEE total
/// order, so NaN never makes a ranking inconsistent. A missing secondary
/// sorts before any present one.
#[derive(Debug, Clone, Copy)]
pub struct ScoreKey {
    pub primary: f64,
    pub secondary: Option<f64>,
}

impl ScoreKey {
    pub fn scalar(primary: f64) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn pair(primary: f64, secondary: f64) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }
}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| match (self.secondary, other.secondary) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoreKey {}

impl From<f64> for ScoreKey {
    fn from(primary: f64) -> Self {
        Self::scalar(primary)
    }
}

impl fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.secondary {
            None => write!(f, "{}", self.primary),
            Some(secondary) => write!(f, "({}, {})", self.primary, secondary),
        }
    }
}

/// A word with the score a metric gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredWord {
    pub score: ScoreKey,
    pub word: String,
}

impl ScoredWord {
    pub fn new(score: impl Into<ScoreKey>, word: impl Into<String>) -> Self {
        Self {
            score: score.into(),
            word: word.into(),
        }
    }
}

/// Stable sort by score; equal scores keep their input order.
pub(crate) fn sort_scored(scored: &mut [ScoredWord], descending: bool) {
    if descending {
        scored.sort_by(|a, b| b.score.cmp(&a.score));
    } else {
        scored.sort_by(|a, b| a.score.cmp(&b.score));
    }
}
