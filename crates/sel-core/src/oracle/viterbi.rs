use std::collections::HashSet;

use tracing::{debug, debug_span};

use super::cost::CostFunction;
use super::lattice::Lattice;
use crate::analysis::{format_tagged, Analysis, ConstrainedMorph, ViterbiResult};
use crate::numeric::neg_log_sum_exp;

/// One of the k best partial paths ending in a node. `from` points at the
/// predecessor node and the rank of the path it extends there.
#[derive(Clone, Copy)]
struct Hyp {
    cost: f64,
    from: Option<(usize, usize)>,
}

/// Cost of entering `idx` from the word start, if it begins there.
fn initial_cost(lattice: &Lattice, cost_fn: &dyn CostFunction, idx: usize) -> f64 {
    let node = &lattice.nodes[idx];
    cost_fn.word_cost(node) + cost_fn.bos_cost(node)
}

/// Up to `n` distinct analyses, cheapest first. Ties keep lattice order.
pub(crate) fn viterbi_nbest(
    lattice: &Lattice,
    cost_fn: &dyn CostFunction,
    n: usize,
) -> Vec<ViterbiResult> {
    let _span = debug_span!("viterbi_nbest", n, len = lattice.len).entered();
    if lattice.len == 0 || n == 0 {
        return Vec::new();
    }

    let mut beams: Vec<Vec<Hyp>> = vec![Vec::new(); lattice.nodes.len()];
    for &idx in lattice.starting_at(0) {
        beams[idx].push(Hyp {
            cost: initial_cost(lattice, cost_fn, idx),
            from: None,
        });
    }

    for boundary in 1..lattice.len {
        for &to in lattice.starting_at(boundary) {
            let to_node = &lattice.nodes[to];
            let emit = cost_fn.word_cost(to_node);
            for &from in lattice.ending_at(boundary) {
                let step = cost_fn.transition_cost(&lattice.nodes[from], to_node) + emit;
                for rank in 0..beams[from].len() {
                    let hyp = Hyp {
                        cost: beams[from][rank].cost + step,
                        from: Some((from, rank)),
                    };
                    push_bounded(&mut beams[to], n, hyp);
                }
            }
        }
    }

    let mut finals: Vec<(f64, usize, usize)> = lattice
        .ending_at(lattice.len)
        .iter()
        .flat_map(|&idx| {
            let eos = cost_fn.eos_cost(&lattice.nodes[idx]);
            beams[idx]
                .iter()
                .enumerate()
                .map(move |(rank, hyp)| (hyp.cost + eos, idx, rank))
        })
        .collect();
    finals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut distinct = HashSet::new();
    let results: Vec<ViterbiResult> = finals
        .into_iter()
        .map(|(logp, idx, rank)| ViterbiResult {
            analysis: trace_back(lattice, &beams, idx, rank),
            logp,
        })
        .filter(|r| distinct.insert(format_tagged(&r.analysis)))
        .take(n)
        .collect();

    debug!(
        found = results.len(),
        best = results.first().map(|r| r.logp)
    );
    results
}

/// Cost of the summed probability of every path through the lattice.
pub(crate) fn forward(lattice: &Lattice, cost_fn: &dyn CostFunction) -> f64 {
    let _span = debug_span!("forward", len = lattice.len).entered();
    if lattice.len == 0 {
        return f64::INFINITY;
    }

    let mut alpha = vec![f64::INFINITY; lattice.nodes.len()];
    for &idx in lattice.starting_at(0) {
        alpha[idx] = initial_cost(lattice, cost_fn, idx);
    }

    for boundary in 1..lattice.len {
        for &to in lattice.starting_at(boundary) {
            let to_node = &lattice.nodes[to];
            let emit = cost_fn.word_cost(to_node);
            // Same association as the Viterbi step, so alpha never exceeds the best path.
            let incoming = neg_log_sum_exp(lattice.ending_at(boundary).iter().map(|&from| {
                alpha[from] + (cost_fn.transition_cost(&lattice.nodes[from], to_node) + emit)
            }));
            alpha[to] = incoming;
        }
    }

    neg_log_sum_exp(
        lattice
            .ending_at(lattice.len)
            .iter()
            .map(|&idx| alpha[idx] + cost_fn.eos_cost(&lattice.nodes[idx])),
    )
}

/// Keep `beam` sorted ascending and at most `k` long. A new hypothesis
/// ranks behind existing ones of equal cost.
fn push_bounded(beam: &mut Vec<Hyp>, k: usize, hyp: Hyp) {
    let at = beam.partition_point(|h| h.cost <= hyp.cost);
    if at < k {
        beam.insert(at, hyp);
        beam.truncate(k);
    }
}

fn trace_back(lattice: &Lattice, beams: &[Vec<Hyp>], idx: usize, rank: usize) -> Analysis {
    let mut path = vec![idx];
    let mut cursor = beams[idx][rank].from;
    while let Some((prev, prev_rank)) = cursor {
        path.push(prev);
        cursor = beams[prev][prev_rank].from;
    }
    path.iter()
        .rev()
        .map(|&i| {
            let node = &lattice.nodes[i];
            ConstrainedMorph::new(node.morph.clone(), node.category)
        })
        .collect()
}
