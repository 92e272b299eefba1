use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use sel_core::oracle::{LexiconOracle, Oracle};
use sel_core::settings::{default_toml, SettingsError};

use super::config_ops::run_settings_validate;
use super::merge_ops::{run_representative, run_roundrobin};
use super::model_ops::{run_analyze, run_compile_lexicon};
use super::select_ops::{build_metric, run_select, run_substrings, SelectOptions};
use super::CliError;

const LEXICON: &str = "\
walk\tSTM\t20
run\tSTM\t15
jump\tSTM\t10
talk\tSTM\t8
un\tPRE\t10
ed\tSUF\t12
ing\tSUF\t15
s\tSUF\t20
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn select_fixture(dir: &Path) -> SelectOptions {
    SelectOptions {
        lexicon: write(dir, "lexicon.txt", LEXICON),
        pool: write(
            dir,
            "pool.txt",
            "walked\nwalking\njumps\ntalks\ntalked\nunwalked\nwalks\n",
        ),
        metric: "logp".to_string(),
        n: 5,
        seen: Some(write(dir, "seen.txt", "walks\n")),
        nonwords: Some(write(dir, "nonwords.txt", "talks\n")),
        old_oracle: Some(write(dir, "old_oracle.txt", "walked\n")),
        outdir: dir.join("out"),
        ..SelectOptions::default()
    }
}

#[test]
fn select_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let opts = select_fixture(dir.path());
    let outcome = run_select(&opts).unwrap();

    assert_eq!(outcome.ranked, 5);
    let selected: HashSet<&str> = outcome.selected.iter().map(String::as_str).collect();
    assert_eq!(
        selected,
        HashSet::from(["walked", "walking", "jumps", "talked", "unwalked"])
    );
    // Already annotated elsewhere: selectable but not elicited again.
    assert!(!outcome.unseen.contains(&"walked".to_string()));
    assert_eq!(outcome.unseen.len(), 4);

    assert_eq!(outcome.files.scores, dir.path().join("out/logp.all.scores"));
    let scores = lines(&outcome.files.scores);
    assert_eq!(scores.len(), 5);
    assert!(scores.iter().all(|l| l.split('\t').count() == 2));
    assert_eq!(lines(&outcome.files.selected), outcome.selected);
    assert_eq!(lines(&outcome.files.unseen), outcome.unseen);

    let predictions = lines(&outcome.files.predictions);
    assert_eq!(predictions.len(), 4);
    for (line, word) in predictions.iter().zip(&outcome.unseen) {
        let (w, analysis) = line.split_once('\t').unwrap();
        assert_eq!(w, word);
        assert_eq!(analysis.replace(" + ", ""), *word);
    }
}

#[test]
fn select_honours_out_name_and_n() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SelectOptions {
        n: 2,
        out_name: Some("round1".to_string()),
        ..select_fixture(dir.path())
    };
    let outcome = run_select(&opts).unwrap();
    assert_eq!(outcome.selected.len(), 2);
    assert!(dir.path().join("out/round1.all.selected").exists());
    assert!(outcome
        .selected
        .iter()
        .all(|w| w != "walks" && w != "talks"));
}

#[test]
fn scores_file_lists_whole_pool_for_sorting_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SelectOptions {
        lexicon: write(dir.path(), "lexicon.txt", LEXICON),
        pool: write(
            dir.path(),
            "pool.txt",
            "walked\nwalking\njumps\ntalks\ntalked\nunwalked\nwalks\nruns\njumped\nrunning\n",
        ),
        metric: "uncertainty".to_string(),
        n: 2,
        outdir: dir.path().join("out"),
        ..SelectOptions::default()
    };
    let outcome = run_select(&opts).unwrap();
    assert_eq!(outcome.ranked, 10);
    assert_eq!(lines(&outcome.files.scores).len(), 10);
    assert_eq!(outcome.selected.len(), 2);
    assert_eq!(lines(&outcome.files.selected), outcome.selected);
}

#[test]
fn scores_file_stops_at_n_for_greedy_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SelectOptions {
        metric: "ifsubstrings_un".to_string(),
        n: 2,
        ..select_fixture(dir.path())
    };
    let outcome = run_select(&opts).unwrap();
    assert_eq!(outcome.ranked, 2);
    assert_eq!(lines(&outcome.files.scores).len(), 2);
}

#[test]
fn select_with_representative_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SelectOptions {
        n: 2,
        representative: Some(4),
        seed: Some(11),
        ..select_fixture(dir.path())
    };
    let outcome = run_select(&opts).unwrap();
    assert_eq!(outcome.ranked, 5);
    assert_eq!(outcome.selected.len(), 2);
    let shortlist: Vec<String> = lines(&outcome.files.scores)
        .iter()
        .take(4)
        .map(|l| l.split('\t').next().unwrap().to_string())
        .collect();
    assert!(outcome.selected.iter().all(|w| shortlist.contains(w)));
    assert_eq!(run_select(&opts).unwrap().selected, outcome.selected);
}

#[test]
fn select_greedy_metric_with_config_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let opts = SelectOptions {
        metric: "ifsubstrings_un".to_string(),
        n: 3,
        config_corpus: Some(write(dir.path(), "corpus.txt", "walking\ntalking\nwalked\n")),
        ..select_fixture(dir.path())
    };
    let outcome = run_select(&opts).unwrap();
    assert_eq!(outcome.selected.len(), 3);
}

#[test]
fn unknown_and_incomplete_metrics_are_rejected() {
    assert!(matches!(
        build_metric("nope", None, None),
        Err(CliError::UnknownMetric(name)) if name == "nope"
    ));
    assert!(matches!(
        build_metric("alphabracket_logp", None, None),
        Err(CliError::MissingModels(_))
    ));
    assert_eq!(build_metric("margin", None, None).unwrap().name(), "margin");
}

#[test]
fn alpha_bracket_loads_both_lexicons() {
    let dir = tempfile::tempdir().unwrap();
    let low = write(dir.path(), "low.txt", LEXICON);
    let hi = write(dir.path(), "hi.txt", LEXICON);
    let metric = build_metric("alphabracket_unnorm", Some(&low), Some(&hi)).unwrap();
    assert_eq!(metric.name(), "alphabracket_unnorm");
    assert!(metric.check_ready().is_ok());
}

#[test]
fn substrings_picks_n_distinct_words() {
    let words = vec![
        "run".to_string(),
        "running".to_string(),
        "runner".to_string(),
        "jump".to_string(),
    ];
    let picked = run_substrings(words.clone(), 2).unwrap();
    assert_eq!(picked.len(), 2);
    assert_ne!(picked[0], picked[1]);
    assert!(picked.iter().all(|w| words.contains(w)));
}

#[test]
fn roundrobin_merges_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.selected", "a\nb\nc\n");
    let b = write(dir.path(), "b.selected", "b\nd\n");
    let out = dir.path().join("merged.selected");
    let merged = run_roundrobin(&[a, b], &out, 3).unwrap();
    assert_eq!(merged, vec!["a", "b", "d"]);
    assert_eq!(lines(&out), merged);
}

#[test]
fn representative_reads_truncated_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "ranked.txt",
        "walk\t3\nwalks\t2\nzzyzx\t1\nzzyzy\t1\nlast\t0\n",
    );
    let out = dir.path().join("rep.selected");
    let picked = run_representative(&input, &out, 4, 2, Some(5)).unwrap();
    assert_eq!(picked.len(), 2);
    assert!(!picked.contains(&"last".to_string()));
    assert_eq!(lines(&out), picked);
}

#[test]
fn analyze_reports_nbest_with_uncertainty() {
    let dir = tempfile::tempdir().unwrap();
    let lexicon = write(dir.path(), "lexicon.txt", LEXICON);
    let report = run_analyze(&lexicon, "walked", 3).unwrap();
    assert_eq!(report.word, "walked");
    assert!(!report.analyses.is_empty() && report.analyses.len() <= 3);
    for pair in report.analyses.windows(2) {
        assert!(pair[0].logp <= pair[1].logp);
    }
    assert!(report.analyses.iter().all(|a| a.uncertainty >= -1e-9));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"word\":\"walked\""));
    assert!(json.contains("\"forward_logp\""));
}

#[test]
fn compiled_lexicon_opens_as_oracle() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "lexicon.txt", LEXICON);
    let output = dir.path().join("lexicon.bin");
    assert_eq!(run_compile_lexicon(&input, &output).unwrap(), 8);

    let compiled = LexiconOracle::open(&output).unwrap();
    let text = LexiconOracle::open(&input).unwrap();
    let a = compiled.viterbi_analyze("walked").unwrap();
    let b = text.viterbi_analyze("walked").unwrap();
    assert_eq!(a.analysis, b.analysis);
}

#[test]
fn settings_validation_reports_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.toml", default_toml());
    assert_eq!(run_settings_validate(&good).unwrap().selection.default_count, 50);

    let bad = write(
        dir.path(),
        "bad.toml",
        &default_toml().replace("default_count = 50", "default_count = 0"),
    );
    let err = run_settings_validate(&bad).unwrap_err();
    assert!(matches!(
        err,
        CliError::Settings(SettingsError::InvalidValue { .. })
    ));
    assert!(err.to_string().contains("selection.default_count"));

    assert!(matches!(
        run_settings_validate(&dir.path().join("missing.toml")),
        Err(CliError::Io(_))
    ));
}
