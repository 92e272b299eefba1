use std::path::Path;

use serde::Serialize;

use sel_core::analysis::{format_tagged, ConstrainedMorph};
use sel_core::metrics::{metric_by_name, metric_names};
use sel_core::oracle::{LexiconOracle, MorphLexicon, Oracle};

use super::CliError;

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub word: String,
    pub forward_logp: f64,
    pub analyses: Vec<RankedAnalysis>,
}

#[derive(Debug, Serialize)]
pub struct RankedAnalysis {
    pub tagged: String,
    pub logp: f64,
    /// Best cost minus forward cost.
    pub uncertainty: f64,
    pub morphs: Vec<ConstrainedMorph>,
}

pub fn run_analyze(lexicon: &Path, word: &str, n: usize) -> Result<AnalysisReport, CliError> {
    let oracle = LexiconOracle::open(lexicon)?;
    let nbest = oracle.viterbi_nbest(word, n.max(1))?;
    let forward_logp = oracle.forward_logprob(word)?;
    let analyses = nbest
        .into_iter()
        .map(|r| RankedAnalysis {
            tagged: format_tagged(&r.analysis),
            logp: r.logp,
            uncertainty: r.logp - forward_logp,
            morphs: r.analysis,
        })
        .collect();
    Ok(AnalysisReport {
        word: word.to_string(),
        forward_logp,
        analyses,
    })
}

pub fn analyze_cmd(lexicon: &Path, word: &str, n: usize, json: bool) {
    let report = die!(run_analyze(lexicon, word, n), "Error: {}");
    if json {
        let out = die!(serde_json::to_string_pretty(&report), "Error: {}");
        println!("{out}");
        return;
    }
    println!("{}  forward={:.4}", report.word, report.forward_logp);
    for (i, a) in report.analyses.iter().enumerate() {
        println!(
            "#{:>2}: {}  logp={:.4}  uncertainty={:.4}",
            i + 1,
            a.tagged,
            a.logp,
            a.uncertainty
        );
    }
}

/// Compile a text lexicon into the binary form. Returns the morph count.
pub fn run_compile_lexicon(input: &Path, output: &Path) -> Result<usize, CliError> {
    let lexicon = MorphLexicon::load_text(input)?;
    lexicon.save(output)?;
    Ok(lexicon.len())
}

pub fn compile_lexicon_cmd(input: &Path, output: &Path) {
    let morphs = die!(run_compile_lexicon(input, output), "Error: {}");
    eprintln!("Wrote {} ({morphs} morphs)", output.display());
}

pub fn metrics_cmd() {
    println!(
        "{:<22} {:>5} {:>7} {:>10} {:>6}",
        "name", "nbest", "forward", "descending", "greedy"
    );
    for name in metric_names() {
        let Some(metric) = metric_by_name(name) else {
            continue;
        };
        let needs = metric.needs();
        println!(
            "{:<22} {:>5} {:>7} {:>10} {:>6}",
            name,
            needs.nbest,
            needs.forward,
            metric.descending(),
            metric.is_greedy()
        );
    }
}
