use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::OracleError;
use crate::analysis::Category;

const MAGIC: &[u8; 4] = b"MSLX";
const VERSION: u8 = 1;

/// Morph → per-category occurrence counts.
///
/// Text form is one `morph<TAB>CAT<TAB>count` record per line; repeated
/// records for the same (morph, category) are summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphLexicon {
    counts: BTreeMap<String, [u64; 4]>,
}

impl MorphLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, morph: impl Into<String>, category: Category, count: u64) {
        let slot = &mut self.counts.entry(morph.into()).or_default()[category.index()];
        *slot = slot.saturating_add(count);
    }

    pub fn counts(&self, morph: &str) -> Option<&[u64; 4]> {
        self.counts.get(morph)
    }

    pub fn count(&self, morph: &str, category: Category) -> u64 {
        self.counts
            .get(morph)
            .map(|c| c[category.index()])
            .unwrap_or(0)
    }

    pub fn contains(&self, morph: &str) -> bool {
        self.counts.contains_key(morph)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Morphs in lexicographic order with their count vectors.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u64; 4])> {
        self.counts.iter().map(|(m, c)| (m.as_str(), c))
    }

    /// Total count per category.
    pub fn category_totals(&self) -> [u64; 4] {
        let mut totals = [0u64; 4];
        for counts in self.counts.values() {
            for (t, c) in totals.iter_mut().zip(counts) {
                *t = t.saturating_add(*c);
            }
        }
        totals
    }

    /// Parse the text form. Malformed lines are logged and skipped.
    pub fn from_text(text: &str) -> Self {
        let mut lexicon = Self::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_record(line) {
                Ok((morph, category, count)) => lexicon.insert(morph, category, count),
                Err(reason) => warn!(line = lineno + 1, %reason, "skipping lexicon record"),
            }
        }
        debug!(morphs = lexicon.len(), "parsed lexicon");
        lexicon
    }

    pub fn load_text(path: &Path) -> Result<Self, OracleError> {
        Ok(Self::from_text(&fs::read_to_string(path)?))
    }

    /// Text form, one record per non-zero (morph, category) pair.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (morph, counts) in self.iter() {
            for cat in Category::ALL {
                let count = counts[cat.index()];
                if count > 0 {
                    out.push_str(&format!("{morph}\t{cat}\t{count}\n"));
                }
            }
        }
        out
    }

    /// Serialize to bytes (MSLX format).
    pub fn to_bytes(&self) -> Result<Vec<u8>, OracleError> {
        let body = bincode::serialize(self).map_err(OracleError::Serialize)?;
        let mut buf = Vec::with_capacity(5 + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Deserialize from bytes (MSLX format).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OracleError> {
        if bytes.len() < 5 {
            return Err(OracleError::InvalidHeader);
        }
        if &bytes[0..4] != MAGIC {
            return Err(OracleError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(OracleError::UnsupportedVersion(bytes[4]));
        }
        bincode::deserialize(&bytes[5..]).map_err(OracleError::Deserialize)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), OracleError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, OracleError> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Open either form, sniffing the magic bytes.
    pub fn open_any(path: &Path) -> Result<Self, OracleError> {
        let bytes = fs::read(path)?;
        if bytes.starts_with(MAGIC) {
            return Self::from_bytes(&bytes);
        }
        let text = String::from_utf8(bytes)
            .map_err(|e| OracleError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        Ok(Self::from_text(&text))
    }
}

fn parse_record(line: &str) -> Result<(&str, Category, u64), String> {
    let mut fields = line.split('\t');
    let (Some(morph), Some(cat), Some(count), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err("expected 3 tab-separated fields".to_string());
    };
    let morph = morph.trim();
    if morph.is_empty() {
        return Err("empty morph".to_string());
    }
    let category: Category = cat.trim().parse().map_err(|e| format!("{e}"))?;
    let count: u64 = count
        .trim()
        .parse()
        .map_err(|_| format!("invalid count {count:?}"))?;
    Ok((morph, category, count))
}
