//! Segmentation analyses produced by a model oracle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Morph category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Prefix
    Pre,
    /// Stem
    Stm,
    /// Suffix
    Suf,
    /// Non-morpheme / other
    Zzz,
}

impl Category {
    /// All categories, in the order used by lexicon count vectors.
    pub const ALL: [Category; 4] = [Category::Pre, Category::Stm, Category::Suf, Category::Zzz];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "PRE",
            Self::Stm => "STM",
            Self::Suf => "SUF",
            Self::Zzz => "ZZZ",
        }
    }

    /// Position of this category in `Category::ALL`.
    pub fn index(self) -> usize {
        match self {
            Self::Pre => 0,
            Self::Stm => 1,
            Self::Suf => 2,
            Self::Zzz => 3,
        }
    }

    /// STM and ZZZ are the categories that can stand as a free morph.
    pub fn is_stem_like(self) -> bool {
        matches!(self, Self::Stm | Self::Zzz)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category tag {0:?} (expected PRE, STM, SUF or ZZZ)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE" => Ok(Self::Pre),
            "STM" => Ok(Self::Stm),
            "SUF" => Ok(Self::Suf),
            "ZZZ" => Ok(Self::Zzz),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// A morph together with its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstrainedMorph {
    pub morph: String,
    pub category: Category,
}

impl ConstrainedMorph {
    pub fn new(morph: impl Into<String>, category: Category) -> Self {
        Self {
            morph: morph.into(),
            category,
        }
    }
}

impl fmt::Display for ConstrainedMorph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.morph, self.category)
    }
}

/// Ordered morphs whose concatenation is the analysed word.
pub type Analysis = Vec<ConstrainedMorph>;

/// Concatenated surface form of an analysis.
pub fn surface(analysis: &[ConstrainedMorph]) -> String {
    analysis.iter().map(|m| m.morph.as_str()).collect()
}

/// Tagged form: `morph/CAT morph/CAT ...`.
pub fn format_tagged(analysis: &[ConstrainedMorph]) -> String {
    analysis
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Untagged form: `morph + morph + ...`.
pub fn format_detagged(analysis: &[ConstrainedMorph]) -> String {
    analysis
        .iter()
        .map(|m| m.morph.as_str())
        .collect::<Vec<_>>()
        .join(" + ")
}

/// An analysis with its cost (negative log-probability; lower = more probable).
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiResult {
    pub analysis: Analysis,
    pub logp: f64,
}
