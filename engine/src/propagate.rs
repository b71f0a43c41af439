//! Fixed-strategy value propagation
//!
//! Values an arbitrary (possibly suboptimal) strategy: each decision node
//! takes the subvalue of the child the strategy names, with no maximization.

use crate::error::{Error, Result};
use crate::node::{DecisionTree, NodeId};
use crate::resolver::{resolve, DecisionRule, Evaluation};
use crate::strategy::Strategy;
use crate::validate::validate;

/// Decision rule: follow a fixed strategy.
#[derive(Debug, Clone, Copy)]
pub struct Follow<'s> {
    strategy: &'s Strategy,
}

impl<'s> Follow<'s> {
    pub fn new(strategy: &'s Strategy) -> Self {
        Follow { strategy }
    }
}

impl DecisionRule for Follow<'_> {
    fn decide(
        &self,
        _tree: &DecisionTree,
        node: NodeId,
        children: &[NodeId],
        values: &[f64],
    ) -> Result<(NodeId, f64)> {
        match self.strategy.choice(node) {
            Some(choice) if children.contains(&choice) => Ok((choice, values[choice as usize])),
            Some(choice) => Err(Error::strategy(
                node,
                format!("{} is not among children {:?}", choice, children),
            )),
            None => Err(Error::strategy(node, "no choice for decision node")),
        }
    }
}

/// Validate `tree` and `strategy`, then compute every subvalue under `strategy`.
pub fn evaluate(strategy: &Strategy, tree: &DecisionTree) -> Result<Evaluation> {
    validate(tree)?;
    strategy.check(tree)?;
    let evaluation = resolve(tree, &Follow::new(strategy))?;
    log::info!("strategy {} has root value {}", strategy, evaluation.root_value());
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;
    use crate::test_tree::{build_coin_flip, build_layered_tree, build_test_tree, build_two_terminals};

    #[test]
    fn test_suboptimal_strategy_value() {
        let tree = build_two_terminals();
        let strategy = Strategy::parse(&tree, "0:1").unwrap();
        let eval = evaluate(&strategy, &tree).unwrap();
        assert!((eval.root_value() - 10.0).abs() < 1e-10);
        assert_eq!(eval.choice(0), Some(1));
    }

    #[test]
    fn test_chance_root_needs_no_choices() {
        let tree = build_coin_flip();
        let eval = evaluate(&Strategy::empty(tree.len()), &tree).unwrap();
        assert!((eval.root_value() - 70.0).abs() < 1e-10);
    }

    #[test]
    fn test_hand_entered_strategy() {
        let tree = build_test_tree();
        // Hold through the bust and pick savings when keeping cash
        let strategy = Strategy::parse(&tree, "0:1,3:5,8:10").unwrap();
        let eval = evaluate(&strategy, &tree).unwrap();
        assert!((eval.subvalue(3).unwrap() - -10.0).abs() < 1e-10);
        // 0.6 * 30 + 0.4 * -10
        assert!((eval.root_value() - 14.0).abs() < 1e-10);
        assert!((eval.subvalue(8).unwrap() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_reproduces_solver_value() {
        for tree in [build_test_tree(), build_layered_tree(6, 3)] {
            let solution = solve(&tree).unwrap();
            let eval = evaluate(&solution.strategy, &tree).unwrap();
            assert_eq!(eval.root_value(), solution.value());
            assert_eq!(eval.subvalues(), solution.evaluation.subvalues());
        }
    }

    #[test]
    fn test_foreign_choice_rejected() {
        let tree = build_test_tree();
        let strategy = Strategy::parse(&tree, "0:1,3:10,8:9").unwrap();
        match evaluate(&strategy, &tree) {
            Err(Error::InvalidStrategy { node, .. }) => assert_eq!(node, 3),
            other => panic!("expected InvalidStrategy, got {:?}", other),
        }
    }

    #[test]
    fn test_follow_rule_checks_membership() {
        let tree = build_two_terminals();
        let mut strategy = Strategy::empty(tree.len());
        strategy.set(0, 0);
        let values = vec![0.0, 10.0, 20.0];
        let rule = Follow::new(&strategy);
        assert!(rule.decide(&tree, 0, &[1, 2], &values).is_err());
    }

    #[test]
    fn test_independent_evaluations_of_one_tree() {
        let tree = build_test_tree();
        let optimal = solve(&tree).unwrap();
        let other = Strategy::parse(&tree, "0:8,3:5,8:10").unwrap();
        let eval = evaluate(&other, &tree).unwrap();
        assert!((eval.root_value() - 8.0).abs() < 1e-10);
        // The solver's annotations are untouched by the second run
        assert!((optimal.value() - 16.0).abs() < 1e-9);
    }
}
