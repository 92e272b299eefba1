//! Cost-convention numerics.
//!
//! Log-probabilities throughout the crate are costs: `-ln(p)`, so lower is
//! more probable and `exp(-cost)` recovers a probability.

/// Finite stand-in for `-ln(0)`.
pub const LOGPROB_ZERO: f64 = 1_000_000.0;

/// `-ln(x)`, with `LOGPROB_ZERO` instead of infinity for `x == 0`.
pub fn zlog(x: f64) -> f64 {
    debug_assert!(x >= 0.0, "zlog of a negative probability: {x}");
    if x <= 0.0 {
        return LOGPROB_ZERO;
    }
    -x.ln()
}

/// `-ln(sum(exp(-c)))` over costs, computed around the minimum for stability.
///
/// Returns `f64::INFINITY` for an empty input (no probability mass).
pub fn neg_log_sum_exp(costs: impl IntoIterator<Item = f64>) -> f64 {
    let costs: Vec<f64> = costs.into_iter().filter(|c| c.is_finite()).collect();
    let Some(min) = costs.iter().copied().min_by(f64::total_cmp) else {
        return f64::INFINITY;
    };
    let sum: f64 = costs.iter().map(|c| (min - c).exp()).sum();
    min - sum.ln()
}
