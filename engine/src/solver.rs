//! Backward-induction solver
//!
//! Runs the resolver with a maximizing decision rule. The first child
//! (in list order) reaching the greatest subvalue wins; a later child with
//! an equal value never displaces it.

use crate::error::{Error, Result};
use crate::node::{DecisionTree, NodeId};
use crate::resolver::{resolve, DecisionRule, Evaluation};
use crate::strategy::Strategy;
use crate::validate::validate;

/// Decision rule: take the child with the strictly greatest subvalue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Maximize;

impl DecisionRule for Maximize {
    fn decide(
        &self,
        _tree: &DecisionTree,
        node: NodeId,
        children: &[NodeId],
        values: &[f64],
    ) -> Result<(NodeId, f64)> {
        let (&first, rest) = children
            .split_first()
            .ok_or_else(|| Error::malformed(node, "decision node has no children"))?;
        let mut choice = first;
        let mut best = values[first as usize];
        for &child in rest {
            let v = values[child as usize];
            if v > best {
                best = v;
                choice = child;
            }
        }
        Ok((choice, best))
    }
}

/// Optimal strategy together with the subvalues it induces
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub strategy: Strategy,
    pub evaluation: Evaluation,
}

impl Solution {
    /// Optimal expected value of the whole problem
    pub fn value(&self) -> f64 {
        self.evaluation.root_value()
    }
}

/// Validate `tree` and find the strategy maximizing expected payoff.
pub fn solve(tree: &DecisionTree) -> Result<Solution> {
    validate(tree)?;
    let evaluation = resolve(tree, &Maximize)?;
    let strategy = Strategy::from_choices(evaluation.choices().to_vec());
    log::info!(
        "solved {} nodes in {} passes, root value {}",
        tree.len(),
        evaluation.passes(),
        evaluation.root_value()
    );
    Ok(Solution {
        strategy,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::test_tree::{
        build_coin_flip, build_gamble_or_sure, build_layered_tree, build_test_tree,
        build_two_terminals, optimal_values,
    };

    #[test]
    fn test_picks_larger_terminal() {
        let tree = build_two_terminals();
        let solution = solve(&tree).unwrap();
        assert_eq!(solution.strategy.choice(0), Some(2));
        assert!((solution.value() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_chance_root_expectation() {
        let tree = build_coin_flip();
        let solution = solve(&tree).unwrap();
        assert!((solution.value() - 70.0).abs() < 1e-10);
        assert_eq!(solution.strategy.choice(0), None);
    }

    #[test]
    fn test_prefers_gamble_over_sure_thing() {
        let tree = build_gamble_or_sure();
        let solution = solve(&tree).unwrap();
        assert!((solution.evaluation.subvalue(1).unwrap() - 5.0).abs() < 1e-10);
        assert_eq!(solution.strategy.choice(0), Some(1));
        assert!((solution.value() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_solve_golden_values() {
        let tree = build_test_tree();
        let solution = solve(&tree).unwrap();
        for (id, expected) in optimal_values().iter().enumerate() {
            let got = solution.evaluation.subvalue(id as NodeId).unwrap();
            assert!((got - expected).abs() < 1e-9, "node {} value {} != {}", id, got, expected);
        }
        assert_eq!(solution.strategy.choice(0), Some(1));
        assert_eq!(solution.strategy.choice(3), Some(4));
        assert!(solution.strategy.check(&tree).is_ok());
    }

    #[test]
    fn test_tie_keeps_first_child() {
        let tree = build_test_tree();
        let solution = solve(&tree).unwrap();
        // bonds and savings both pay 8
        assert_eq!(solution.strategy.choice(8), Some(9));

        let reversed = DecisionTree::from_nodes(vec![
            Node::decision("root", vec![2, 1, 3]),
            Node::terminal("a", 5.0),
            Node::terminal("b", 5.0),
            Node::terminal("c", 1.0),
        ]);
        let solution = solve(&reversed).unwrap();
        assert_eq!(solution.strategy.choice(0), Some(2));
    }

    #[test]
    fn test_chosen_child_dominates_siblings() {
        let tree = build_layered_tree(6, 3);
        let solution = solve(&tree).unwrap();
        let values = solution.evaluation.subvalues();
        for id in tree.decisions() {
            let chosen = solution.strategy.choice(id).unwrap();
            let children = tree.get(id).unwrap().children();
            let pos = children.iter().position(|&c| c == chosen).unwrap();
            for (k, &c) in children.iter().enumerate() {
                assert!(values[chosen as usize] >= values[c as usize]);
                if k < pos {
                    assert!(values[c as usize] < values[chosen as usize], "earlier tie at node {}", id);
                }
            }
            assert_eq!(values[id as usize], values[chosen as usize]);
        }
    }

    #[test]
    fn test_rejects_malformed_tree() {
        let tree = DecisionTree::from_nodes(vec![
            Node::chance("flip", vec![1, 2], vec![0.4, 0.4]),
            Node::terminal("a", 0.0),
            Node::terminal("b", 1.0),
        ]);
        assert!(matches!(solve(&tree), Err(Error::MalformedTree { node: 0, .. })));
    }

    #[test]
    fn test_does_not_mutate_tree() {
        let tree = build_test_tree();
        let before = tree.clone();
        solve(&tree).unwrap();
        assert_eq!(tree, before);
    }
}
