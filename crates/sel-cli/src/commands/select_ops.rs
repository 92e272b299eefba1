use std::collections::HashSet;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use sel_core::metrics::{alpha_bracket_by_name, metric_by_name, Metric};
use sel_core::oracle::{LexiconOracle, Oracle};
use sel_core::pool::{filter_pool, Pool};
use sel_core::representative::{representative_sampling, SamplingOptions};
use sel_core::selection::io::{read_wordlist, write_predictions, write_scores, write_words};
use sel_core::selection::Selector;
use sel_core::settings::settings;

use super::CliError;

/// Inputs of one select-for-elicitation run.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub lexicon: PathBuf,
    pub pool: PathBuf,
    pub metric: String,
    pub n: usize,
    /// Words annotated in earlier rounds.
    pub seen: Option<PathBuf>,
    /// Words annotators rejected as non-words.
    pub nonwords: Option<PathBuf>,
    /// Corpus to configure the metric from instead of the pool.
    pub config_corpus: Option<PathBuf>,
    /// Words that already have annotations: selectable, but not elicited again.
    pub old_oracle: Option<PathBuf>,
    /// Shortlist size for representative sampling.
    pub representative: Option<usize>,
    pub seed: Option<u64>,
    pub low_lexicon: Option<PathBuf>,
    pub hi_lexicon: Option<PathBuf>,
    pub outdir: PathBuf,
    /// Output file stem; defaults to the metric name.
    pub out_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub scores: PathBuf,
    pub selected: PathBuf,
    pub unseen: PathBuf,
    pub predictions: PathBuf,
}

impl OutputFiles {
    pub fn new(outdir: &Path, stem: &str) -> Self {
        let file = |suffix: &str| outdir.join(format!("{stem}.{suffix}"));
        Self {
            scores: file("all.scores"),
            selected: file("all.selected"),
            unseen: file("unseen.selected"),
            predictions: file("unseen.predictions"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectOutcome {
    pub ranked: usize,
    pub selected: Vec<String>,
    pub unseen: Vec<String>,
    pub files: OutputFiles,
}

fn read_set(path: Option<&Path>) -> Result<HashSet<String>, CliError> {
    match path {
        Some(path) => Ok(read_wordlist(path)?.into_iter().collect()),
        None => Ok(HashSet::new()),
    }
}

/// Metric by registry name; alpha-bracket metrics get their two models here.
pub fn build_metric(
    name: &str,
    low_lexicon: Option<&Path>,
    hi_lexicon: Option<&Path>,
) -> Result<Box<dyn Metric>, CliError> {
    if let Some(mut metric) = alpha_bracket_by_name(name) {
        let (Some(low), Some(hi)) = (low_lexicon, hi_lexicon) else {
            return Err(CliError::MissingModels(name.to_string()));
        };
        let low: Arc<dyn Oracle> = Arc::new(LexiconOracle::open(low)?);
        let hi: Arc<dyn Oracle> = Arc::new(LexiconOracle::open(hi)?);
        metric.set_models(low, hi);
        return Ok(Box::new(metric));
    }
    metric_by_name(name).ok_or_else(|| CliError::UnknownMetric(name.to_string()))
}

pub fn run_select(opts: &SelectOptions) -> Result<SelectOutcome, CliError> {
    let metric = build_metric(
        &opts.metric,
        opts.low_lexicon.as_deref(),
        opts.hi_lexicon.as_deref(),
    )?;
    let stem = opts.out_name.as_deref().unwrap_or(&opts.metric);
    let files = OutputFiles::new(&opts.outdir, stem);

    let oracle = LexiconOracle::open(&opts.lexicon)?;

    // Annotated words and non-words can never be selected again.
    let mut seen = read_set(opts.seen.as_deref())?;
    seen.extend(read_set(opts.nonwords.as_deref())?);
    let old_oracle = read_set(opts.old_oracle.as_deref())?;

    let pool = Pool::load("train", &opts.pool)?;
    let pool = filter_pool(&pool, &seen);
    info!(candidates = pool.len(), seen = seen.len(), metric = %opts.metric, "ranking pool");

    let mut selector = Selector::new(metric, Some(&oracle as &dyn Oracle))?
        .with_progress(settings().selection.progress_interval, |done| {
            info!(done, "features computed")
        });
    if let Some(corpus) = &opts.config_corpus {
        info!(corpus = %corpus.display(), "configuring metric");
        selector.configure(&read_wordlist(corpus)?, &seen)?;
    }

    let shortlist = opts.representative.filter(|&k| k > 0);
    let rank_n = shortlist.map_or(opts.n, |k| k.max(opts.n));
    // Sort-based metrics score the whole pool anyway; the scores file keeps all of it.
    let limit = selector.metric().is_greedy().then_some(rank_n);
    let ranked = selector.rank(&pool, &seen, limit)?;
    write_scores(&ranked, &files.scores)?;

    let selected: Vec<String> = match shortlist {
        Some(k) => {
            let top: Vec<String> = ranked.iter().take(k).map(|s| s.word.clone()).collect();
            let mut options = SamplingOptions::default();
            options.seed = opts.seed.or(options.seed);
            representative_sampling(&top, opts.n, options)
        }
        None => ranked.iter().take(opts.n).map(|s| s.word.clone()).collect(),
    };
    let unseen: Vec<String> = selected
        .iter()
        .filter(|w| !old_oracle.contains(*w))
        .cloned()
        .collect();

    write_words(&selected, &files.selected)?;
    write_words(&unseen, &files.unseen)?;
    write_predictions(&unseen, &oracle, &files.predictions)?;

    Ok(SelectOutcome {
        ranked: ranked.len(),
        selected,
        unseen,
        files,
    })
}

pub fn select_cmd(opts: &SelectOptions) {
    let outcome = die!(run_select(opts), "Error: {}");
    eprintln!(
        "Selected {} words ({} unseen) from {} ranked, written to {}",
        outcome.selected.len(),
        outcome.unseen.len(),
        outcome.ranked,
        outcome.files.selected.display()
    );
}

/// Top `n` words by initial/final substring coverage, no model needed.
pub fn run_substrings(words: Vec<String>, n: usize) -> Result<Vec<String>, CliError> {
    let metric = build_metric("ifsubstrings_5n", None, None)?;
    let mut selector = Selector::new(metric, None)?;
    let ranked = selector.rank(words, &HashSet::new(), Some(n))?;
    Ok(ranked.into_iter().map(|s| s.word).collect())
}

pub fn substrings_cmd(n: usize) {
    let mut words = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = die!(line, "Error reading stdin: {}");
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    for word in die!(run_substrings(words, n), "Error: {}") {
        println!("{word}");
    }
}
