//! Pure strategies: one chosen child per decision node
//!
//! A strategy references tree IDs but never owns or mutates the tree.
//! It is produced by the solver or entered by hand, and checked against a
//! tree before it is used.

use crate::error::{Error, Result};
use crate::node::{DecisionTree, NodeId};
use std::fmt;

/// Choice of child at every decision node (`None` at other nodes)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Strategy {
    choices: Vec<Option<NodeId>>,
}

impl Strategy {
    /// A strategy with no choices for a tree of `len` nodes
    pub fn empty(len: usize) -> Self {
        Strategy {
            choices: vec![None; len],
        }
    }

    /// Wrap a per-node choice vector
    pub fn from_choices(choices: Vec<Option<NodeId>>) -> Self {
        Strategy { choices }
    }

    /// Chosen child at `node`, if any
    pub fn choice(&self, node: NodeId) -> Option<NodeId> {
        self.choices.get(node as usize).copied().flatten()
    }

    /// Set the choice at `node`, growing the vector if needed
    pub fn set(&mut self, node: NodeId, choice: NodeId) {
        let index = node as usize;
        if index >= self.choices.len() {
            self.choices.resize(index + 1, None);
        }
        self.choices[index] = Some(choice);
    }

    /// Per-node choices, indexed by node ID
    pub fn choices(&self) -> &[Option<NodeId>] {
        &self.choices
    }

    /// Number of node slots
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Parse a `node:choice` list such as `"0:1,3:5"`.
    ///
    /// Only syntax and ID bounds are checked here; use `check` to verify
    /// the choices against the tree.
    pub fn parse(tree: &DecisionTree, text: &str) -> Result<Self> {
        let mut strategy = Strategy::empty(tree.len());
        for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (node, choice) = pair
                .split_once(':')
                .ok_or_else(|| Error::strategy(0, format!("expected node:choice, got '{}'", pair)))?;
            let node: NodeId = node
                .trim()
                .parse()
                .map_err(|_| Error::strategy(0, format!("bad node id '{}'", node)))?;
            let choice: NodeId = choice
                .trim()
                .parse()
                .map_err(|_| Error::strategy(node, format!("bad choice '{}'", choice)))?;
            if tree.get(node).is_none() {
                return Err(Error::strategy(node, "node is not in the tree"));
            }
            strategy.set(node, choice);
        }
        Ok(strategy)
    }

    /// Verify that every decision node maps to one of its own children and
    /// that no other node carries a choice.
    pub fn check(&self, tree: &DecisionTree) -> Result<()> {
        for (index, choice) in self.choices.iter().enumerate() {
            let id = index as NodeId;
            match (tree.get(id), choice) {
                (None, Some(_)) => return Err(Error::strategy(id, "node is not in the tree")),
                (Some(node), Some(c)) if !node.is_decision() => {
                    return Err(Error::strategy(
                        id,
                        format!("choice {} on a {} node", c, node.kind.tag()),
                    ))
                }
                _ => {}
            }
        }
        for id in tree.decisions() {
            let children = tree.nodes[id as usize].children();
            match self.choice(id) {
                None => return Err(Error::strategy(id, "no choice for decision node")),
                Some(choice) if !children.contains(&choice) => {
                    return Err(Error::strategy(
                        id,
                        format!("{} is not among children {:?}", choice, children),
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Strategy {
    /// Formats as the `node:choice` list accepted by `parse`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .choices
            .iter()
            .enumerate()
            .filter_map(|(node, choice)| choice.map(|c| format!("{}:{}", node, c)))
            .collect();
        write!(f, "{}", pairs.join(","))
    }
}
