//! Structural validation of a decision tree
//!
//! A tree is valid when:
//! - it has at least one node, and node 0 (the root) has no parent
//! - decision and chance nodes have at least one child, every child ID is
//!   in bounds, and the root is nobody's child
//! - every non-root node is listed as a child exactly once, by the node its
//!   `parent` field names
//! - chance probabilities match the child count, lie in [0, 1] and sum to 1
//!   within `PROBABILITY_TOLERANCE`
//! - terminal payoffs are finite
//! - a breadth-first walk from the root reaches every node exactly once
//!   (no cycles, no detached components)

use crate::error::{Error, Result};
use crate::node::{DecisionTree, Kind, NodeId};
use crate::PROBABILITY_TOLERANCE;

/// Check every structural invariant, reporting the first violation found.
pub fn validate(tree: &DecisionTree) -> Result<()> {
    if tree.is_empty() {
        return Err(Error::malformed(0, "tree has no nodes"));
    }
    if let Some(parent) = tree.nodes[0].parent {
        return Err(Error::malformed(0, format!("root has parent {}", parent)));
    }

    let n = tree.len();
    let mut listed_by: Vec<Option<NodeId>> = vec![None; n];

    for (index, node) in tree.nodes.iter().enumerate() {
        let id = index as NodeId;
        match &node.kind {
            Kind::Terminal { payoff } => {
                if !payoff.is_finite() {
                    return Err(Error::malformed(id, format!("payoff {} is not finite", payoff)));
                }
            }
            Kind::Decision { children } => check_children(id, children, n, &mut listed_by)?,
            Kind::Chance {
                children,
                probabilities,
            } => {
                check_children(id, children, n, &mut listed_by)?;
                check_probabilities(id, children.len(), probabilities)?;
            }
        }
    }

    for (index, node) in tree.nodes.iter().enumerate().skip(1) {
        let id = index as NodeId;
        match (listed_by[index], node.parent) {
            (None, _) => {
                return Err(Error::malformed(id, "node is not a child of any node"));
            }
            (Some(listed), Some(parent)) if listed == parent => {}
            (Some(listed), parent) => {
                return Err(Error::malformed(
                    id,
                    format!("parent is {:?} but node is listed by {}", parent, listed),
                ));
            }
        }
    }

    let reached = tree.reachable();
    if reached.len() != n {
        let mut seen = vec![false; n];
        for id in reached {
            seen[id as usize] = true;
        }
        let first = seen.iter().position(|&s| !s).unwrap_or(0);
        return Err(Error::malformed(
            first as NodeId,
            "node is not reachable from the root (cycle)",
        ));
    }
    Ok(())
}

fn check_children(
    id: NodeId,
    children: &[NodeId],
    n: usize,
    listed_by: &mut [Option<NodeId>],
) -> Result<()> {
    if children.is_empty() {
        return Err(Error::malformed(id, "non-terminal node has no children"));
    }
    for &child in children {
        if child as usize >= n {
            return Err(Error::malformed(
                id,
                format!("child {} is out of bounds for {} nodes", child, n),
            ));
        }
        if child == 0 {
            return Err(Error::malformed(id, "root listed as a child"));
        }
        if let Some(other) = listed_by[child as usize] {
            return Err(Error::malformed(
                child,
                format!("listed as a child by both {} and {}", other, id),
            ));
        }
        listed_by[child as usize] = Some(id);
    }
    Ok(())
}

fn check_probabilities(id: NodeId, count: usize, probabilities: &[f64]) -> Result<()> {
    if probabilities.len() != count {
        return Err(Error::malformed(
            id,
            format!("{} probabilities for {} children", probabilities.len(), count),
        ));
    }
    if let Some(p) = probabilities
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        return Err(Error::malformed(id, format!("probability {} outside [0, 1]", p)));
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(Error::malformed(id, format!("probabilities sum to {}", sum)));
    }
    Ok(())
}
