use crate::analysis::Category;

use super::lattice::LatticeNode;

/// Trait for scoring lattice paths during Viterbi and forward search.
pub(crate) trait CostFunction: Send + Sync {
    fn word_cost(&self, node: &LatticeNode) -> f64;
    fn transition_cost(&self, prev: &LatticeNode, next: &LatticeNode) -> f64;
    fn bos_cost(&self, node: &LatticeNode) -> f64;
    fn eos_cost(&self, node: &LatticeNode) -> f64;
}

/// Emission cost plus a per-morph penalty, with a flat penalty on category
/// transitions a word should not contain.
pub(crate) struct CategoryCostFunction {
    pub segment_penalty: f64,
    pub bad_transition_penalty: f64,
}

impl CostFunction for CategoryCostFunction {
    fn word_cost(&self, node: &LatticeNode) -> f64 {
        node.cost + self.segment_penalty
    }

    fn transition_cost(&self, prev: &LatticeNode, next: &LatticeNode) -> f64 {
        match (prev.category, next.category) {
            (Category::Suf, Category::Pre) | (Category::Pre, Category::Suf) => {
                self.bad_transition_penalty
            }
            _ => 0.0,
        }
    }

    fn bos_cost(&self, node: &LatticeNode) -> f64 {
        if node.category == Category::Suf {
            self.bad_transition_penalty
        } else {
            0.0
        }
    }

    fn eos_cost(&self, node: &LatticeNode) -> f64 {
        if node.category == Category::Pre {
            self.bad_transition_penalty
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(category: Category) -> LatticeNode {
        LatticeNode {
            start: 0,
            end: 1,
            morph: "x".to_string(),
            category,
            cost: 2.0,
        }
    }

    fn cost_fn() -> CategoryCostFunction {
        CategoryCostFunction {
            segment_penalty: 0.5,
            bad_transition_penalty: 5.0,
        }
    }

    #[test]
    fn word_cost_adds_penalty() {
        assert!((cost_fn().word_cost(&node(Category::Stm)) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn bad_transitions() {
        let f = cost_fn();
        assert_eq!(
            f.transition_cost(&node(Category::Suf), &node(Category::Pre)),
            5.0
        );
        assert_eq!(
            f.transition_cost(&node(Category::Pre), &node(Category::Suf)),
            5.0
        );
        assert_eq!(
            f.transition_cost(&node(Category::Stm), &node(Category::Suf)),
            0.0
        );
        assert_eq!(f.bos_cost(&node(Category::Suf)), 5.0);
        assert_eq!(f.bos_cost(&node(Category::Pre)), 0.0);
        assert_eq!(f.eos_cost(&node(Category::Pre)), 5.0);
        assert_eq!(f.eos_cost(&node(Category::Suf)), 0.0);
    }
}
