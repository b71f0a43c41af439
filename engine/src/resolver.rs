//! Fixed-point resolver: bottom-up evaluation shared by solver and propagator
//!
//! Terminal nodes start resolved with their payoff. Each pass scans the
//! unresolved nodes in ID order and resolves every node whose children are
//! all resolved: chance nodes take the probability-weighted sum of their
//! children, decision nodes defer to a `DecisionRule`. Passes repeat until
//! the root is resolved.
//!
//! On an acyclic tree every pass resolves at least one node, so the loop
//! finishes within `n` passes. A pass that resolves nothing while the root
//! is still open means the input has a cycle; it is reported as
//! `MalformedTree` rather than looping forever.
//!
//! Resolution flags and subvalues belong to the run, not to the tree, so
//! any number of evaluations may read the same tree at once.

use crate::error::{Error, Result};
use crate::node::{DecisionTree, Kind, NodeId};

/// Policy applied at decision nodes once all children are resolved.
pub trait DecisionRule {
    /// Pick a child of `node` and return it with the node's subvalue.
    ///
    /// `values` holds the subvalue of every resolved node, indexed by ID;
    /// entries for all of `children` are final.
    fn decide(
        &self,
        tree: &DecisionTree,
        node: NodeId,
        children: &[NodeId],
        values: &[f64],
    ) -> Result<(NodeId, f64)>;
}

/// Subvalues produced by one resolver run
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    subvalues: Vec<f64>,
    choices: Vec<Option<NodeId>>,
    passes: usize,
}

impl Evaluation {
    /// Subvalue of `node`
    pub fn subvalue(&self, node: NodeId) -> Option<f64> {
        self.subvalues.get(node as usize).copied()
    }

    /// Subvalue of the root: the value of the whole problem
    pub fn root_value(&self) -> f64 {
        self.subvalues[0]
    }

    /// All subvalues, indexed by node ID
    pub fn subvalues(&self) -> &[f64] {
        &self.subvalues
    }

    /// Child picked by the decision rule at `node`
    pub fn choice(&self, node: NodeId) -> Option<NodeId> {
        self.choices.get(node as usize).copied().flatten()
    }

    /// Per-node decision choices
    pub fn choices(&self) -> &[Option<NodeId>] {
        &self.choices
    }

    /// Number of scan passes the run needed
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Evaluate every node of `tree` bottom-up under `rule`.
///
/// The tree is not validated here; `solve` and `evaluate` do that first.
pub fn resolve<R: DecisionRule + ?Sized>(tree: &DecisionTree, rule: &R) -> Result<Evaluation> {
    let n = tree.len();
    if n == 0 {
        return Err(Error::malformed(0, "tree has no nodes"));
    }

    let mut resolved = vec![false; n];
    let mut subvalues = vec![0.0_f64; n];
    let mut choices: Vec<Option<NodeId>> = vec![None; n];

    for (index, node) in tree.nodes.iter().enumerate() {
        if let Kind::Terminal { payoff } = node.kind {
            resolved[index] = true;
            subvalues[index] = payoff;
        }
    }

    let mut passes = 0;
    while !resolved[0] {
        passes += 1;
        let mut progress = 0usize;

        for index in 0..n {
            if resolved[index] {
                continue;
            }
            let id = index as NodeId;
            let node = &tree.nodes[index];
            let children = node.children();
            if let Some(&bad) = children.iter().find(|&&c| c as usize >= n) {
                return Err(Error::malformed(id, format!("child {} is out of bounds", bad)));
            }
            if !children.iter().all(|&c| resolved[c as usize]) {
                continue;
            }

            let value = match &node.kind {
                Kind::Chance {
                    children,
                    probabilities,
                } => {
                    if probabilities.len() != children.len() {
                        return Err(Error::malformed(id, "probability count differs from child count"));
                    }
                    children
                        .iter()
                        .zip(probabilities)
                        .map(|(&c, &p)| p * subvalues[c as usize])
                        .sum()
                }
                Kind::Decision { children } => {
                    let (choice, value) = rule.decide(tree, id, children, &subvalues)?;
                    choices[index] = Some(choice);
                    value
                }
                Kind::Terminal { payoff } => *payoff,
            };
            subvalues[index] = value;
            resolved[index] = true;
            progress += 1;
        }

        log::debug!("resolver pass {} resolved {} nodes", passes, progress);
        if progress == 0 {
            return Err(Error::malformed(
                0,
                format!("no progress on pass {} with the root unresolved (cycle)", passes),
            ));
        }
    }

    Ok(Evaluation {
        subvalues,
        choices,
        passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::test_tree::{build_coin_flip, build_layered_tree, build_test_tree};

    /// Picks the smallest child value; first minimum wins.
    struct Minimize;

    impl DecisionRule for Minimize {
        fn decide(
            &self,
            _tree: &DecisionTree,
            node: NodeId,
            children: &[NodeId],
            values: &[f64],
        ) -> Result<(NodeId, f64)> {
            let mut best = *children
                .first()
                .ok_or_else(|| Error::malformed(node, "no children"))?;
            for &c in children {
                if values[c as usize] < values[best as usize] {
                    best = c;
                }
            }
            Ok((best, values[best as usize]))
        }
    }

    /// Counts how many times each decision node is decided.
    struct Counting(std::cell::RefCell<Vec<usize>>);

    impl DecisionRule for Counting {
        fn decide(
            &self,
            _tree: &DecisionTree,
            node: NodeId,
            children: &[NodeId],
            values: &[f64],
        ) -> Result<(NodeId, f64)> {
            self.0.borrow_mut()[node as usize] += 1;
            Ok((children[0], values[children[0] as usize]))
        }
    }

    #[test]
    fn test_rule_parameterizes_decisions() {
        let tree = build_test_tree();
        let eval = resolve(&tree, &Minimize).unwrap();
        // hold = -10, bust picks hold, market = 0.6*30 + 0.4*-10 = 14
        assert!((eval.subvalue(5).unwrap() - -10.0).abs() < 1e-10);
        assert_eq!(eval.choice(3), Some(5));
        assert!((eval.subvalue(1).unwrap() - 14.0).abs() < 1e-10);
        assert_eq!(eval.choice(8), Some(9));
        // keep cash (8) beats market (14)
        assert_eq!(eval.choice(0), Some(8));
        assert!((eval.root_value() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_chance_only_tree() {
        let tree = build_coin_flip();
        let eval = resolve(&tree, &Minimize).unwrap();
        assert!((eval.root_value() - 70.0).abs() < 1e-10);
        assert_eq!(eval.passes(), 1);
        assert!(eval.choices().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_terminal_root_needs_no_pass() {
        let tree = DecisionTree::from_nodes(vec![Node::terminal("only", 3.5)]);
        let eval = resolve(&tree, &Minimize).unwrap();
        assert_eq!(eval.passes(), 0);
        assert_eq!(eval.root_value(), 3.5);
    }

    #[test]
    fn test_each_decision_resolved_once() {
        let tree = build_layered_tree(5, 3);
        let rule = Counting(std::cell::RefCell::new(vec![0; tree.len()]));
        let eval = resolve(&tree, &rule).unwrap();
        for (id, node) in tree.nodes.iter().enumerate() {
            let expected = if node.is_decision() { 1 } else { 0 };
            assert_eq!(rule.0.borrow()[id], expected, "node {} decided wrong number of times", id);
        }
        assert!(eval.passes() <= tree.len());
    }

    #[test]
    fn test_passes_bounded_by_node_count() {
        // Chain 0 -> 1 -> ... -> n-1 with parents before children, so every
        // index-order pass can only resolve the deepest open node.
        let n = 12u32;
        let mut nodes: Vec<Node> = (0..n - 1)
            .map(|id| Node::decision(format!("d{}", id), vec![id + 1]))
            .collect();
        nodes.push(Node::terminal("leaf", 1.0));
        let tree = DecisionTree::from_nodes(nodes);
        let eval = resolve(&tree, &Minimize).unwrap();
        assert_eq!(eval.passes(), (n - 1) as usize);
        assert!(eval.passes() <= tree.len());
        assert_eq!(eval.root_value(), 1.0);
    }

    #[test]
    fn test_cycle_detected_without_spinning() {
        let tree = DecisionTree::from_nodes(vec![
            Node::decision("a", vec![1]),
            Node::decision("b", vec![0]),
        ]);
        match resolve(&tree, &Minimize) {
            Err(Error::MalformedTree { .. }) => {}
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_bounds_child_reported() {
        let tree = DecisionTree::from_nodes(vec![Node::decision("a", vec![4])]);
        assert!(matches!(
            resolve(&tree, &Minimize),
            Err(Error::MalformedTree { node: 0, .. })
        ));
    }
}
