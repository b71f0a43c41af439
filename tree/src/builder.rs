//! Two-phase tree construction
//!
//! Phase one collects `NodeSpec` records in ID order, either through the
//! fluent `TreeBuilder` methods or by deserializing a `TreeSpec` from JSON:
//!
//! ```json
//! {"nodes": [
//!   {"name": "choose", "type": "decision", "children": [1, 2]},
//!   {"name": "low",    "type": "terminal", "payoff": 10},
//!   {"name": "high",   "type": "terminal", "payoff": 20}
//! ]}
//! ```
//!
//! Phase two (`build`) links every parent from the children lists and
//! validates the finished tree once.

use crate::error::PersistError;
use arbor_engine::{validate, DecisionTree, Kind, Node, NodeId};
use serde::{Deserialize, Serialize};

/// Kind-specific part of a node specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindSpec {
    Decision {
        children: Vec<NodeId>,
    },
    Chance {
        children: Vec<NodeId>,
        probabilities: Vec<f64>,
    },
    Terminal {
        payoff: f64,
    },
}

impl From<KindSpec> for Kind {
    fn from(spec: KindSpec) -> Self {
        match spec {
            KindSpec::Decision { children } => Kind::Decision { children },
            KindSpec::Chance {
                children,
                probabilities,
            } => Kind::Chance {
                children,
                probabilities,
            },
            KindSpec::Terminal { payoff } => Kind::Terminal { payoff },
        }
    }
}

impl From<&Kind> for KindSpec {
    fn from(kind: &Kind) -> Self {
        match kind {
            Kind::Decision { children } => KindSpec::Decision {
                children: children.clone(),
            },
            Kind::Chance {
                children,
                probabilities,
            } => KindSpec::Chance {
                children: children.clone(),
                probabilities: probabilities.clone(),
            },
            Kind::Terminal { payoff } => KindSpec::Terminal { payoff: *payoff },
        }
    }
}

/// One node as supplied by the caller; the parent is derived later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: KindSpec,
}

/// Complete specification of a tree, node 0 first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

impl TreeSpec {
    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Specification describing an existing tree
    pub fn from_tree(tree: &DecisionTree) -> Self {
        TreeSpec {
            nodes: tree
                .nodes
                .iter()
                .map(|node| NodeSpec {
                    name: node.name.clone(),
                    kind: KindSpec::from(&node.kind),
                })
                .collect(),
        }
    }

    /// Link parents and validate the whole tree.
    pub fn build(self) -> arbor_engine::Result<DecisionTree> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|spec| Node {
                name: spec.name,
                parent: None,
                kind: spec.kind.into(),
            })
            .collect();
        let tree = DecisionTree::from_nodes(nodes);
        validate(&tree)?;
        Ok(tree)
    }
}

/// Fluent collector for node specifications
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    spec: TreeSpec,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID the next pushed node will get
    pub fn next_id(&self) -> NodeId {
        self.spec.nodes.len() as NodeId
    }

    pub fn push(mut self, node: NodeSpec) -> Self {
        self.spec.nodes.push(node);
        self
    }

    pub fn decision(self, name: impl Into<String>, children: impl Into<Vec<NodeId>>) -> Self {
        self.push(NodeSpec {
            name: name.into(),
            kind: KindSpec::Decision {
                children: children.into(),
            },
        })
    }

    pub fn chance(
        self,
        name: impl Into<String>,
        children: impl Into<Vec<NodeId>>,
        probabilities: impl Into<Vec<f64>>,
    ) -> Self {
        self.push(NodeSpec {
            name: name.into(),
            kind: KindSpec::Chance {
                children: children.into(),
                probabilities: probabilities.into(),
            },
        })
    }

    pub fn terminal(self, name: impl Into<String>, payoff: f64) -> Self {
        self.push(NodeSpec {
            name: name.into(),
            kind: KindSpec::Terminal { payoff },
        })
    }

    pub fn spec(&self) -> &TreeSpec {
        &self.spec
    }

    pub fn build(self) -> arbor_engine::Result<DecisionTree> {
        self.spec.build()
    }
}
