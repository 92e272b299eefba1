use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::analysis::{Category, ViterbiResult};
use crate::selection::{FeatureBundle, ScoreKey, Selector};
use crate::testutil::{cm, stm, test_oracle, ScriptedOracle};

fn words(ws: &[&str]) -> Vec<String> {
    ws.iter().map(|w| w.to_string()).collect()
}

fn ranked_words(ranked: &[ScoredWord]) -> Vec<&str> {
    ranked.iter().map(|s| s.word.as_str()).collect()
}

fn with_uncertainty(word: &str, uncertainty: f64) -> WordFeatures {
    WordFeatures {
        word: word.to_string(),
        features: FeatureBundle {
            uncertainty: Some(uncertainty),
            ..FeatureBundle::default()
        },
    }
}

// --- IFSubstring ---

#[test]
fn substrings_run_family() {
    let pool = words(&["running", "run", "runner", "jump"]);
    let mut metric = IFSubstringMetric::new(false, "un", 3).with_minlen(2);
    metric.configure(&pool, &HashSet::new(), None).unwrap();

    // Initial ru/run are shared by three words.
    assert_eq!(metric.score_word("running"), 3.0 + 3.0 + 1.0 + 1.0);
    assert_eq!(metric.score_word("run"), 8.0);
    assert_eq!(metric.score_word("jump"), 4.0);

    let features = pool.iter().map(|w| WordFeatures::bare(w.as_str())).collect();
    let ranked = metric.rank(features, Some(4)).unwrap();
    assert_eq!(ranked_words(&ranked), vec!["running", "jump", "run", "runner"]);
    let scores: Vec<f64> = ranked.iter().map(|s| s.score.primary).collect();
    // After "running", run and runner only keep their final substrings.
    assert_eq!(scores, vec![8.0, 4.0, 2.0, 2.0]);
}

#[test]
fn substrings_seen_words_devalue_shared_affixes() {
    let pool = words(&["running", "jumping", "jumped"]);
    let seen: HashSet<String> = ["jumps".to_string()].into();
    let mut metric = IFSubstringMetric::new(false, "un", 3).with_minlen(2);
    metric.configure(&pool, &seen, None).unwrap();
    // ju/jum are zeroed; ng/ing still count twice.
    assert_eq!(metric.score_word("jumping"), 2.0 + 2.0);
    assert_eq!(metric.score_word("running"), 1.0 + 1.0 + 2.0 + 2.0);
}

#[test]
fn greedy_requires_count() {
    let mut metric = IFSubstringMetric::new(true, "norm", 4);
    metric.configure(&words(&["abc"]), &HashSet::new(), None).unwrap();
    let err = metric.rank(vec![WordFeatures::bare("abc")], None).unwrap_err();
    assert!(matches!(err, SelectionError::MissingCount { .. }));
}

#[test]
fn greedy_requires_configuration() {
    let mut metric = IFSubstringMetric::new(true, "norm", 4);
    let err = metric.rank(vec![WordFeatures::bare("abc")], Some(1)).unwrap_err();
    assert!(matches!(err, SelectionError::NotConfigured { .. }));

    let mut metric = OneOffBoundaryMetric::default();
    let err = metric.rank(Vec::new(), Some(1)).unwrap_err();
    assert!(matches!(err, SelectionError::NotConfigured { .. }));
}

#[test]
fn greedy_stops_when_pool_is_exhausted() {
    let pool = words(&["abc", "abd"]);
    let mut metric = IFSubstringMetric::new(true, "norm", 4);
    metric.configure(&pool, &HashSet::new(), None).unwrap();
    let features = pool.iter().map(|w| WordFeatures::bare(w.as_str())).collect();
    assert_eq!(metric.rank(features, Some(10)).unwrap().len(), 2);
}

#[test]
fn selector_configures_substrings_without_oracle() {
    let mut selector = Selector::new(metric_by_name("ifsubstrings_5n").unwrap(), None).unwrap();
    let ranked = selector
        .rank(vec!["walking", "walked", "talking"], &HashSet::new(), Some(2))
        .unwrap();
    assert_eq!(ranked.len(), 2);
    assert!(selector.metric().is_configured());
}

// --- OneOffBoundary ---

fn oneoff_oracle() -> ScriptedOracle {
    ScriptedOracle::default()
        .lexicon_entry("walk", [0, 10, 0, 0])
        .lexicon_entry("walks", [0, 2, 0, 0])
        .lexicon_entry("ed", [0, 0, 3, 0])
        .lexicon_entry("e", [0, 0, 1, 0])
        .lexicon_entry("s", [0, 0, 5, 0])
        .single("walked", vec![stm("walk"), cm("ed", Category::Suf)], 3.1, 3.0)
        .single("walks", vec![stm("walks")], 2.2, 2.0)
        .single("talked", vec![stm("talk"), cm("ed", Category::Suf)], 4.5, 4.0)
        .single("jumps", vec![stm("jump"), cm("s", Category::Suf)], 5.0, 4.0)
}

#[test]
fn oneoff_weights_from_lexicon() {
    let oracle = oneoff_oracle();
    let mut metric = OneOffBoundaryMetric::default();
    metric.configure(&[], &HashSet::new(), Some(&oracle)).unwrap();
    assert_eq!(metric.weight("walk"), 20);
    assert_eq!(metric.weight("walks"), 20);
    assert_eq!(metric.weight("ed"), 3);
    assert_eq!(metric.weight("e"), 3);
    assert_eq!(metric.weight("s"), 0);
}

#[test]
fn oneoff_greedy_masks_selected_morphs() {
    let oracle = oneoff_oracle();
    let metric = Box::new(OneOffBoundaryMetric::default());
    let mut selector = Selector::new(metric, Some(&oracle)).unwrap();
    let ranked = selector
        .rank(vec!["jumps", "talked", "walks", "walked"], &HashSet::new(), Some(4))
        .unwrap();
    assert_eq!(ranked_words(&ranked), vec!["walked", "walks", "jumps", "talked"]);
    assert_eq!(ranked[0].score.primary, 23.0);
    // "talked" lost its "ed" weight to "walked"; uncertainty breaks the tie.
    assert_eq!(ranked[2].score.primary, 0.0);
    assert!(ranked[2].score > ranked[3].score);
}

#[test]
fn oneoff_seen_morphs_are_zeroed() {
    let oracle = oneoff_oracle();
    let seen: HashSet<String> = ["walks".to_string(), "unknown".to_string()].into();
    let mut metric = OneOffBoundaryMetric::default();
    metric.configure(&[], &seen, Some(&oracle)).unwrap();
    assert_eq!(metric.weight("walks"), 0);
    assert_eq!(metric.weight("walk"), 20);
}

#[test]
fn oneoff_requires_oracle() {
    let mut metric = OneOffBoundaryMetric::default();
    let err = metric.configure(&[], &HashSet::new(), None).unwrap_err();
    assert!(matches!(err, SelectionError::MissingOracle { .. }));
}

// --- Probability metrics ---

#[test]
fn uncertainty_most_uncertain_first() {
    let features = vec![
        with_uncertainty("a", 0.5),
        with_uncertainty("b", 2.0),
        with_uncertainty("c", 0.5),
    ];
    let ranked = UncertaintyMetric.rank(features, None).unwrap();
    assert_eq!(ranked_words(&ranked), vec!["b", "a", "c"]);
}

#[test]
fn uncertainty_is_non_negative_with_lexicon_oracle() {
    let oracle = test_oracle();
    let mut selector = Selector::new(Box::new(UncertaintyMetric), Some(&oracle)).unwrap();
    let pool = words(&["walked", "unwalkable", "running", "rebooks", "kinder"]);
    for result in selector.calculate_features(&pool) {
        let wf = result.unwrap();
        assert!(wf.features.uncertainty.unwrap() >= 0.0, "{}", wf.word);
    }
}

#[test]
fn margin_skips_single_analysis_words() {
    let oracle = ScriptedOracle::default()
        .word("ab", vec![(vec![stm("ab")], 1.0), (vec![stm("a"), stm("b")], 2.0)], 0.5)
        .single("c", vec![stm("c")], 1.0, 1.0)
        .word("de", vec![(vec![stm("de")], 1.0), (vec![stm("d"), stm("e")], 1.1)], 0.5);
    let mut selector = Selector::new(Box::new(MarginMetric), Some(&oracle)).unwrap();
    let ranked = selector.rank(vec!["ab", "c", "de"], &HashSet::new(), None).unwrap();

    assert_eq!(ranked_words(&ranked), vec!["de", "ab"]);
    let expected = (-0.5f64).exp() - (-1.5f64).exp();
    assert!((ranked[1].score.primary - expected).abs() < 1e-12);
}

#[test]
fn logp_is_normalized_by_chars() {
    let oracle = ScriptedOracle::default()
        .single("äö", vec![stm("äö")], 4.0, 4.0)
        .single("abcd", vec![stm("abcd")], 6.0, 6.0);
    let mut selector = Selector::new(Box::new(LogpMetric), Some(&oracle)).unwrap();
    let ranked = selector.rank(vec!["abcd", "äö"], &HashSet::new(), None).unwrap();
    assert_eq!(ranked_words(&ranked), vec!["äö", "abcd"]);
    assert_eq!(ranked[0].score, ScoreKey::scalar(2.0));
    assert_eq!(ranked[1].score, ScoreKey::scalar(1.5));
}

// --- Filtered metrics ---

fn category_oracle() -> ScriptedOracle {
    ScriptedOracle::default()
        .single("abxy", vec![stm("ab"), cm("xy", Category::Zzz)], 3.0, 1.0)
        .single("abed", vec![stm("ab"), cm("ed", Category::Suf)], 5.0, 1.0)
        .single("unxy", vec![cm("un", Category::Pre), cm("xy", Category::Zzz)], 2.0, 1.0)
        .single("abcd", vec![stm("ab"), stm("cd")], 4.0, 1.0)
}

#[test]
fn category_keeps_adjacent_stem_like_pairs() {
    let oracle = category_oracle();
    let mut selector = Selector::new(Box::new(CategoryMetric), Some(&oracle)).unwrap();
    let ranked = selector
        .rank(vec!["abxy", "abed", "unxy", "abcd"], &HashSet::new(), None)
        .unwrap();
    assert_eq!(ranked_words(&ranked), vec!["abcd", "abxy"]);
}

#[test]
fn nostm_keeps_words_without_stems() {
    let oracle = category_oracle();
    let mut selector = Selector::new(Box::new(NoStmMetric), Some(&oracle)).unwrap();
    let ranked = selector
        .rank(vec!["abxy", "abed", "unxy", "abcd"], &HashSet::new(), None)
        .unwrap();
    assert_eq!(ranked_words(&ranked), vec!["unxy"]);
    assert_eq!(ranked[0].score, ScoreKey::scalar(1.0));
}

// --- MorphLogp ---

#[test]
fn morph_logp_ranks_by_extremum_then_uncertainty() {
    let oracle = ScriptedOracle::default()
        .single("ab", vec![stm("a"), stm("b")], 2.0, 1.0)
        .single("cd", vec![stm("c"), stm("d")], 3.0, 1.0)
        .single("ef", vec![stm("e"), stm("f")], 2.0, 1.0)
        .emission("a", 1.0)
        .emission("b", 7.0)
        .emission("c", 1.0)
        .emission("d", 7.0)
        .emission("e", 3.0)
        .emission("f", 4.0);

    let metric = Box::new(MorphLogpMetric::new(Extremum::Min));
    let mut min = Selector::new(metric, Some(&oracle)).unwrap();
    let ranked = min.rank(vec!["ab", "cd", "ef"], &HashSet::new(), None).unwrap();
    assert_eq!(ranked_words(&ranked), vec!["ef", "cd", "ab"]);
    assert_eq!(ranked[1].score, ScoreKey::pair(1.0, 2.0));

    let metric = Box::new(MorphLogpMetric::new(Extremum::Max));
    let mut max = Selector::new(metric, Some(&oracle)).unwrap();
    let ranked = max.rank(vec!["ab", "cd", "ef"], &HashSet::new(), None).unwrap();
    assert_eq!(ranked_words(&ranked), vec!["cd", "ab", "ef"]);
}

// --- AlphaBracket ---

#[test]
fn alpha_bracket_ranks_disagreements() {
    let low: Arc<dyn Oracle> = Arc::new(
        ScriptedOracle::default()
            .single("abcd", vec![stm("abcd")], 8.0, 6.0)
            .single("wxyz", vec![stm("wx"), stm("yz")], 4.0, 3.0)
            .single("same", vec![stm("same")], 1.0, 1.0),
    );
    let hi: Arc<dyn Oracle> = Arc::new(
        ScriptedOracle::default()
            .single("abcd", vec![stm("ab"), stm("cd")], 12.0, 10.0)
            .single("wxyz", vec![stm("wxyz")], 2.0, 1.0)
            .single("same", vec![stm("same")], 2.0, 1.0),
    );

    let metric = AlphaBracketMetric::new(BracketVariant::Logp).with_models(low.clone(), hi.clone());
    let mut selector = Selector::new(Box::new(metric), None).unwrap();
    let ranked = selector
        .rank(vec!["abcd", "wxyz", "same"], &HashSet::new(), None)
        .unwrap();
    assert_eq!(ranked_words(&ranked), vec!["wxyz", "abcd"]);
    assert_eq!(ranked[0].score, ScoreKey::scalar(1.0 + 0.5));
    assert_eq!(ranked[1].score, ScoreKey::scalar(2.0 + 3.0));

    let metric = AlphaBracketMetric::new(BracketVariant::Uncert).with_models(low, hi);
    let mut selector = Selector::new(Box::new(metric), None).unwrap();
    let ranked = selector
        .rank(vec!["abcd", "wxyz", "same"], &HashSet::new(), None)
        .unwrap();
    assert_eq!(ranked_words(&ranked), vec!["wxyz", "abcd"]);
    assert_eq!(ranked[1].score, ScoreKey::scalar(2.0 + 2.0));
}

#[test]
fn alpha_bracket_without_models_fails_before_extraction() {
    let metric = metric_by_name("alphabracket_unnorm").unwrap();
    let mut selector = Selector::new(metric, None).unwrap();
    let err = selector.rank(vec!["abc"], &HashSet::new(), Some(1)).unwrap_err();
    assert!(matches!(err, SelectionError::MissingModels { .. }));
}

// --- Properties ---

proptest! {
    #[test]
    fn default_rank_is_monotonic(values in prop::collection::vec(-50.0f64..50.0, 0..40)) {
        let features: Vec<WordFeatures> = values
            .iter()
            .enumerate()
            .map(|(i, v)| with_uncertainty(&format!("w{i}"), *v))
            .collect();
        let ranked = UncertaintyMetric.rank(features, None).unwrap();
        prop_assert_eq!(ranked.len(), values.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn ascending_rank_is_monotonic(
        costs in prop::collection::vec((0.0f64..30.0, 0.0f64..5.0, 0.0f64..5.0), 0..40),
    ) {
        let features: Vec<WordFeatures> = costs
            .iter()
            .enumerate()
            .map(|(i, &(forward, gap, next))| {
                let word = format!("w{i}");
                let best = forward + gap;
                WordFeatures {
                    features: FeatureBundle {
                        viterbi: vec![
                            ViterbiResult {
                                analysis: vec![stm(&word)],
                                logp: best,
                            },
                            ViterbiResult {
                                analysis: vec![stm("w"), stm("x")],
                                logp: best + next,
                            },
                        ],
                        forward_logp: Some(forward),
                        ..FeatureBundle::default()
                    },
                    word,
                }
            })
            .collect();
        prop_assert!(!MarginMetric.descending());
        let ranked = MarginMetric.rank(features, None).unwrap();
        prop_assert_eq!(ranked.len(), costs.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score <= pair[1].score);
        }
    }

    #[test]
    fn greedy_pick_scores_never_increase(
        pool in prop::collection::hash_set("[abc]{1,6}", 1..25),
        n in 1usize..30,
    ) {
        let pool: Vec<String> = pool.into_iter().collect();
        let mut metric = IFSubstringMetric::new(true, "norm", 4);
        metric.configure(&pool, &HashSet::new(), None).unwrap();
        let features = pool.iter().map(|w| WordFeatures::bare(w.as_str())).collect();
        let ranked = metric.rank(features, Some(n)).unwrap();

        prop_assert_eq!(ranked.len(), n.min(pool.len()));
        for pick in &ranked {
            // Masked score never exceeds the word's fresh score.
            prop_assert!(pick.score.primary <= metric.score_word(&pick.word) + 1e-9);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score.primary + 1e-9 >= pair[1].score.primary);
        }
    }
}
