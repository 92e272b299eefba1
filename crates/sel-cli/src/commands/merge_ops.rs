use std::path::{Path, PathBuf};

use sel_core::representative::{representative_sampling, SamplingOptions};
use sel_core::roundrobin::merge_rankings;
use sel_core::selection::io::{read_wordlist, write_words};

use super::CliError;

/// Diversify the top `truncate` words of a ranked list down to `n`.
pub fn run_representative(
    infile: &Path,
    outfile: &Path,
    truncate: usize,
    n: usize,
    seed: Option<u64>,
) -> Result<Vec<String>, CliError> {
    let mut words = read_wordlist(infile)?;
    words.truncate(truncate);
    let mut options = SamplingOptions::default();
    options.seed = seed.or(options.seed);
    let selected = representative_sampling(&words, n, options);
    write_words(&selected, outfile)?;
    Ok(selected)
}

pub fn representative_cmd(
    infile: &Path,
    outfile: &Path,
    truncate: usize,
    n: usize,
    seed: Option<u64>,
) {
    let selected = die!(
        run_representative(infile, outfile, truncate, n, seed),
        "Error: {}"
    );
    eprintln!("Wrote {} words to {}", selected.len(), outfile.display());
}

/// Interleave several ranked lists, dropping repeats, and keep the first `n`.
pub fn run_roundrobin(
    infiles: &[PathBuf],
    outfile: &Path,
    n: usize,
) -> Result<Vec<String>, CliError> {
    let lists = infiles
        .iter()
        .map(|path| read_wordlist(path))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = merge_rankings(lists, n);
    write_words(&merged, outfile)?;
    Ok(merged)
}

pub fn roundrobin_cmd(infiles: &[PathBuf], outfile: &Path, n: usize) {
    let merged = die!(run_roundrobin(infiles, outfile, n), "Error: {}");
    eprintln!("Wrote {} words to {}", merged.len(), outfile.display());
}
