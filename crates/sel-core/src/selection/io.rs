//! Word lists in and selections out.
//!
//! Every writer replaces its target atomically (temp file + rename) and
//! creates missing parent directories.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{ScoredWord, SelectionError};
use crate::analysis::format_detagged;
use crate::oracle::Oracle;

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), SelectionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// One `word<TAB>score` line per ranked word.
pub fn write_scores(ranked: &[ScoredWord], path: &Path) -> Result<(), SelectionError> {
    let mut out = String::new();
    for scored in ranked {
        out.push_str(&format!("{}\t{}\n", scored.word, scored.score));
    }
    write_atomic(path, &out)?;
    debug!(path = %path.display(), words = ranked.len(), "wrote scores");
    Ok(())
}

/// Write the first `n` ranked words, one per line, and return them.
pub fn write_selected(
    ranked: &[ScoredWord],
    path: &Path,
    n: usize,
) -> Result<Vec<String>, SelectionError> {
    let selected: Vec<String> = ranked.iter().take(n).map(|s| s.word.clone()).collect();
    write_words(&selected, path)?;
    Ok(selected)
}

pub fn write_words(words: &[String], path: &Path) -> Result<(), SelectionError> {
    let mut out = String::new();
    for word in words {
        out.push_str(word);
        out.push('\n');
    }
    write_atomic(path, &out)?;
    info!(path = %path.display(), words = words.len(), "wrote word list");
    Ok(())
}

/// `word<TAB>m1 + m2 + ...` from the oracle's best analysis of each word.
///
/// Words the oracle cannot analyse are skipped.
pub fn write_predictions(
    words: &[String],
    oracle: &dyn Oracle,
    path: &Path,
) -> Result<(), SelectionError> {
    let mut out = String::new();
    for word in words {
        match oracle.viterbi_analyze(word) {
            Ok(best) => {
                out.push_str(&format!("{}\t{}\n", word, format_detagged(&best.analysis)));
            }
            Err(e) if e.is_unanalyzable() => warn!(error = %e, "no prediction"),
            Err(e) => return Err(e.into()),
        }
    }
    write_atomic(path, &out)
}

/// First tab-separated column of each line, trimmed. Blank lines are skipped.
pub fn read_wordlist(path: &Path) -> Result<Vec<String>, SelectionError> {
    Ok(parse_wordlist(&fs::read_to_string(path)?))
}

pub fn parse_wordlist(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let word = line.split('\t').next().unwrap_or_default().trim();
        if word.is_empty() {
            debug!(line = lineno + 1, "skipping blank line");
            continue;
        }
        words.push(word.to_string());
    }
    words
}
