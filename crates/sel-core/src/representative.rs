//! Representative sampling: k-medoids clustering of a shortlist under edit
//! distance, keeping one medoid word per cluster.

use tracing::{debug, debug_span};

use crate::roundrobin::unique_everseen;
use crate::settings::settings;

/// Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Symmetric pairwise distance matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    n: usize,
    cells: Vec<u32>,
}

impl DistanceMatrix {
    pub fn from_words(words: &[String]) -> Self {
        let n = words.len();
        let mut cells = vec![0u32; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = u32::try_from(levenshtein(&words[i], &words[j])).unwrap_or(u32::MAX);
                cells[i * n + j] = d;
                cells[j * n + i] = d;
            }
        }
        Self { n, cells }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.n + j]
    }
}

/// One k-medoids solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Medoid index per cluster.
    pub medoids: Vec<usize>,
    /// Member indices per cluster.
    pub clusters: Vec<Vec<usize>>,
    /// Sum over clusters of squared member-to-medoid distances.
    pub cost: f64,
}

fn assign(dist: &DistanceMatrix, medoids: &[usize]) -> Vec<Vec<usize>> {
    let mut clusters = vec![Vec::new(); medoids.len()];
    for point in 0..dist.len() {
        let nearest = medoids
            .iter()
            .enumerate()
            .min_by_key(|&(_, &m)| dist.get(point, m))
            .map(|(c, _)| c);
        if let Some(c) = nearest {
            clusters[c].push(point);
        }
    }
    clusters
}

/// The member with the smallest total distance to the rest of its cluster.
fn cluster_medoid(dist: &DistanceMatrix, members: &[usize]) -> Option<usize> {
    members
        .iter()
        .copied()
        .min_by_key(|&i| members.iter().map(|&j| u64::from(dist.get(i, j))).sum::<u64>())
}

/// One run of k-medoids from a random start.
///
/// Stops when the medoids no longer change or after `max_iterations`
/// updates; in the latter case clusters are reassigned to the final medoids.
/// A cluster that ends up empty keeps its medoid.
pub fn k_medoids(
    dist: &DistanceMatrix,
    k: usize,
    max_iterations: usize,
    rng: &mut fastrand::Rng,
) -> Clustering {
    let k = k.min(dist.len());
    let mut order: Vec<usize> = (0..dist.len()).collect();
    rng.shuffle(&mut order);
    let mut medoids: Vec<usize> = order.into_iter().take(k).collect();

    let mut clusters = assign(dist, &medoids);
    let mut converged = false;
    for _ in 0..max_iterations {
        let updated: Vec<usize> = clusters
            .iter()
            .zip(&medoids)
            .map(|(members, &old)| cluster_medoid(dist, members).unwrap_or(old))
            .collect();
        if updated == medoids {
            converged = true;
            break;
        }
        medoids = updated;
        clusters = assign(dist, &medoids);
    }
    if !converged {
        debug!(max_iterations, "k-medoids did not converge");
    }

    let cost = clusters
        .iter()
        .zip(&medoids)
        .map(|(members, &m)| {
            members
                .iter()
                .map(|&i| f64::from(dist.get(i, m)).powi(2))
                .sum::<f64>()
        })
        .sum();
    Clustering {
        medoids,
        clusters,
        cost,
    }
}

/// Lowest-cost clustering over `restarts` random starts.
pub fn best_of(
    dist: &DistanceMatrix,
    k: usize,
    restarts: usize,
    max_iterations: usize,
    rng: &mut fastrand::Rng,
) -> Clustering {
    let mut best = k_medoids(dist, k, max_iterations, rng);
    for _ in 1..restarts {
        let candidate = k_medoids(dist, k, max_iterations, rng);
        if candidate.cost < best.cost {
            best = candidate;
        }
    }
    best
}

/// Knobs for `representative_sampling`; defaults come from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingOptions {
    pub restarts: usize,
    pub max_iterations: usize,
    pub seed: Option<u64>,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        let s = &settings().representative;
        Self {
            restarts: s.restarts,
            max_iterations: s.max_iterations,
            seed: s.seed,
        }
    }
}

/// `k` mutually dissimilar words from `words` (all of them if there are at
/// most `k` distinct words), in medoid order.
pub fn representative_sampling(
    words: &[String],
    k: usize,
    options: SamplingOptions,
) -> Vec<String> {
    let words: Vec<String> = unique_everseen(words.iter().cloned()).collect();
    let _span = debug_span!("representative_sampling", words = words.len(), k).entered();
    if k >= words.len() {
        return words;
    }
    if k == 0 {
        return Vec::new();
    }

    let mut rng = match options.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let dist = DistanceMatrix::from_words(&words);
    let best = best_of(&dist, k, options.restarts.max(1), options.max_iterations, &mut rng);
    debug!(cost = best.cost, "best clustering");
    best.medoids.into_iter().map(|m| words[m].clone()).collect()
}
