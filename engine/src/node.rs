//! Node definitions for the decision tree
//!
//! This module defines the Node types that represent positions in a
//! decision tree. Nodes carry only the problem description (structure,
//! probabilities, payoffs); evaluated subvalues live in a separate
//! `Evaluation` produced by each resolver run.

use std::collections::VecDeque;

/// Node ID type (index into flat array storage)
pub type NodeId = u32;

/// Kind-specific payload of a node
///
/// Each variant holds exactly the fields that kind needs, so a terminal
/// node can never carry children and a decision node can never carry
/// probabilities.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// Controlled choice among the children
    Decision {
        /// Child node IDs, in tie-break and display order
        children: Vec<NodeId>,
    },
    /// Stochastic branch drawn from a fixed distribution
    Chance {
        /// Child node IDs
        children: Vec<NodeId>,
        /// Probability of each child, parallel to `children`
        probabilities: Vec<f64>,
    },
    /// Leaf with a fixed payoff
    Terminal {
        /// Payoff received when play ends here
        payoff: f64,
    },
}

impl Kind {
    /// Single-letter tag used by the text format and renderers
    pub fn tag(&self) -> char {
        match self {
            Kind::Decision { .. } => 'd',
            Kind::Chance { .. } => 'n',
            Kind::Terminal { .. } => 't',
        }
    }
}

/// Represents a node in the decision tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Label shown to the user
    pub name: String,
    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,
    /// Kind-specific data
    pub kind: Kind,
}

impl Node {
    /// Create a decision node with no parent link yet
    pub fn decision(name: impl Into<String>, children: Vec<NodeId>) -> Self {
        Node {
            name: name.into(),
            parent: None,
            kind: Kind::Decision { children },
        }
    }

    /// Create a chance node with no parent link yet
    pub fn chance(name: impl Into<String>, children: Vec<NodeId>, probabilities: Vec<f64>) -> Self {
        Node {
            name: name.into(),
            parent: None,
            kind: Kind::Chance {
                children,
                probabilities,
            },
        }
    }

    /// Create a terminal node with no parent link yet
    pub fn terminal(name: impl Into<String>, payoff: f64) -> Self {
        Node {
            name: name.into(),
            parent: None,
            kind: Kind::Terminal { payoff },
        }
    }

    /// Get the parent node ID
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Get child node IDs
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            Kind::Decision { children } => children,
            Kind::Chance { children, .. } => children,
            Kind::Terminal { .. } => &[],
        }
    }

    /// Branch probabilities (only present on Chance nodes)
    pub fn probabilities(&self) -> Option<&[f64]> {
        match &self.kind {
            Kind::Chance { probabilities, .. } => Some(probabilities),
            _ => None,
        }
    }

    /// Payoff (only present on Terminal nodes)
    pub fn payoff(&self) -> Option<f64> {
        match self.kind {
            Kind::Terminal { payoff } => Some(payoff),
            _ => None,
        }
    }

    /// Check if this is a terminal node
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, Kind::Terminal { .. })
    }

    /// Check if this is a decision node
    pub fn is_decision(&self) -> bool {
        matches!(self.kind, Kind::Decision { .. })
    }

    /// Check if this is a chance node
    pub fn is_chance(&self) -> bool {
        matches!(self.kind, Kind::Chance { .. })
    }
}

/// Decision tree wrapper
///
/// Contains a flat array of nodes; index 0 is the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionTree {
    /// Flat array of nodes indexed by NodeId
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        DecisionTree { nodes: Vec::new() }
    }

    /// Wrap a node list and recompute every parent link from the children lists.
    ///
    /// The result is not validated; call `validate` before evaluating it.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut tree = DecisionTree { nodes };
        tree.link_parents();
        tree
    }

    /// Overwrite each node's `parent` with the last node that lists it as a child.
    pub fn link_parents(&mut self) {
        let mut parents: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            for &child in node.children() {
                if let Some(slot) = parents.get_mut(child as usize) {
                    *slot = Some(id as NodeId);
                }
            }
        }
        for (node, parent) in self.nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// The root node, if the tree is not empty
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// IDs of every terminal node, in index order
    pub fn terminals(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_terminal())
            .map(|(id, _)| id as NodeId)
    }

    /// IDs of every decision node, in index order
    pub fn decisions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_decision())
            .map(|(id, _)| id as NodeId)
    }

    /// Pre-order walk from the root yielding `(id, depth)` pairs.
    pub fn walk(&self) -> Walk<'_> {
        self.walk_from(0)
    }

    /// Pre-order walk of the subtree rooted at `start`.
    pub fn walk_from(&self, start: NodeId) -> Walk<'_> {
        let stack = if self.get(start).is_some() {
            vec![(start, 0)]
        } else {
            vec![]
        };
        Walk {
            tree: self,
            stack,
            steps: 0,
        }
    }

    /// Breadth-first order of nodes reachable from the root.
    ///
    /// Stops expanding a node the second time it is reached, so the walk
    /// terminates even on cyclic input.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.len()];
        let mut order = Vec::with_capacity(self.len());
        let mut queue = VecDeque::new();
        if !self.is_empty() {
            queue.push_back(0);
        }
        while let Some(id) = queue.pop_front() {
            match seen.get_mut(id as usize) {
                Some(flag) if !*flag => *flag = true,
                _ => continue,
            }
            order.push(id);
            queue.extend(self.nodes[id as usize].children().iter().copied());
        }
        order
    }
}

/// Lazy iterative pre-order traversal, children in list order.
///
/// Yields at most `tree.len()` items so a malformed (cyclic) tree cannot
/// make a consumer loop forever.
pub struct Walk<'a> {
    tree: &'a DecisionTree,
    stack: Vec<(NodeId, usize)>,
    steps: usize,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.steps >= self.tree.len() {
            return None;
        }
        let (id, depth) = self.stack.pop()?;
        self.steps += 1;
        if let Some(node) = self.tree.get(id) {
            self.stack.extend(
                node.children()
                    .iter()
                    .rev()
                    .filter(|&&child| self.tree.get(child).is_some())
                    .map(|&child| (child, depth + 1)),
            );
        }
        Some((id, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_tree::build_test_tree;

    #[test]
    fn test_accessors_match_kind() {
        let tree = build_test_tree();
        let root = tree.root().unwrap();
        assert!(root.is_decision());
        assert_eq!(root.children(), &[1, 8]);
        assert!(root.probabilities().is_none());
        assert!(root.payoff().is_none());

        let chance = tree.get(1).unwrap();
        assert!(chance.is_chance());
        assert_eq!(chance.probabilities().unwrap().len(), chance.children().len());

        let leaf = tree.get(2).unwrap();
        assert!(leaf.is_terminal());
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.payoff(), Some(30.0));
    }

    #[test]
    fn test_from_nodes_links_parents() {
        let tree = DecisionTree::from_nodes(vec![
            Node::decision("root", vec![2, 1]),
            Node::terminal("a", 1.0),
            Node::terminal("b", 2.0),
        ]);
        assert_eq!(tree.get(0).unwrap().parent(), None);
        assert_eq!(tree.get(1).unwrap().parent(), Some(0));
        assert_eq!(tree.get(2).unwrap().parent(), Some(0));
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let tree = build_test_tree();
        let walked: Vec<(NodeId, usize)> = tree.walk().collect();
        assert_eq!(walked.len(), tree.len());
        assert_eq!(walked[0], (0, 0));
        assert_eq!(walked[1], (1, 1));
        assert_eq!(walked[2], (2, 2));
        // Second child of the root comes after the whole first subtree
        let pos = walked.iter().position(|&(id, _)| id == 8).unwrap();
        assert!(walked[..pos].iter().all(|&(id, _)| id < 8));
        assert_eq!(walked[pos].1, 1);
    }

    #[test]
    fn test_walk_bounded_on_cycle() {
        let tree = DecisionTree::from_nodes(vec![
            Node::decision("a", vec![1]),
            Node::decision("b", vec![0]),
        ]);
        assert_eq!(tree.walk().count(), 2);
    }

    #[test]
    fn test_terminal_and_decision_ids() {
        let tree = build_test_tree();
        let terminals: Vec<NodeId> = tree.terminals().collect();
        let decisions: Vec<NodeId> = tree.decisions().collect();
        for id in &terminals {
            assert!(tree.get(*id).unwrap().is_terminal());
        }
        for id in &decisions {
            assert!(tree.get(*id).unwrap().is_decision());
        }
        assert!(decisions.contains(&0));
    }

    #[test]
    fn test_reachable_visits_each_once() {
        let tree = build_test_tree();
        let mut order = tree.reachable();
        assert_eq!(order.len(), tree.len());
        order.sort_unstable();
        order.dedup();
        assert_eq!(order.len(), tree.len());
    }
}
