//! Hardcoded fixture trees shared by tests and benchmarks
//!
//! The main fixture is an 11-node investment problem:
//!
//!   0:  Decision "invest?"       [market → 1, keep cash → 8]
//!   1:  Chance   "market"        [0.6 → 2, 0.4 → 3]
//!   2:  Terminal "boom"          payoff +30.0
//!   3:  Decision "bust"          [sell → 4, hold → 5]
//!   4:  Terminal "sell"          payoff -5.0
//!   5:  Chance   "hold"          [0.5 → 6, 0.5 → 7]
//!   6:  Terminal "recover"       payoff +10.0
//!   7:  Terminal "default"       payoff -30.0
//!   8:  Decision "keep cash"     [bonds → 9, savings → 10]
//!   9:  Terminal "bonds"         payoff +8.0
//!   10: Terminal "savings"       payoff +8.0
//!
//! Optimal values: hold = -10, bust = -5 (sell), market = 16,
//! keep cash = 8 (bonds, first of a tie), root = 16 (market).

use crate::node::{DecisionTree, Node, NodeId};

/// Build the 11-node investment tree.
/// Nodes are pushed in ID order so that `tree.nodes[id]` is node `id`.
pub fn build_test_tree() -> DecisionTree {
    DecisionTree::from_nodes(vec![
        Node::decision("invest?", vec![1, 8]),
        Node::chance("market", vec![2, 3], vec![0.6, 0.4]),
        Node::terminal("boom", 30.0),
        Node::decision("bust", vec![4, 5]),
        Node::terminal("sell", -5.0),
        Node::chance("hold", vec![6, 7], vec![0.5, 0.5]),
        Node::terminal("recover", 10.0),
        Node::terminal("default", -30.0),
        Node::decision("keep cash", vec![9, 10]),
        Node::terminal("bonds", 8.0),
        Node::terminal("savings", 8.0),
    ])
}

/// Optimal subvalue of every node of `build_test_tree`, by ID.
pub fn optimal_values() -> [f64; 11] {
    [16.0, 16.0, 30.0, -5.0, -5.0, -10.0, 10.0, -30.0, 8.0, 8.0, 8.0]
}

/// Root decision between terminals paying 10 and 20.
pub fn build_two_terminals() -> DecisionTree {
    DecisionTree::from_nodes(vec![
        Node::decision("choose", vec![1, 2]),
        Node::terminal("low", 10.0),
        Node::terminal("high", 20.0),
    ])
}

/// Root chance node paying 0 with 0.3 and 100 with 0.7.
pub fn build_coin_flip() -> DecisionTree {
    DecisionTree::from_nodes(vec![
        Node::chance("flip", vec![1, 2], vec![0.3, 0.7]),
        Node::terminal("miss", 0.0),
        Node::terminal("hit", 100.0),
    ])
}

/// Root decision between a fair gamble over {0, 10} and a sure 4.
pub fn build_gamble_or_sure() -> DecisionTree {
    DecisionTree::from_nodes(vec![
        Node::decision("choose", vec![1, 4]),
        Node::chance("gamble", vec![2, 3], vec![0.5, 0.5]),
        Node::terminal("lose", 0.0),
        Node::terminal("win", 10.0),
        Node::terminal("sure", 4.0),
    ])
}

/// Build a complete tree alternating decision and chance layers.
///
/// Every internal node has `branching` children; chance nodes are uniform.
/// Terminal payoffs are a deterministic function of their ID so results
/// are reproducible across runs.
pub fn build_layered_tree(depth: usize, branching: usize) -> DecisionTree {
    let mut nodes: Vec<Node> = vec![Node::terminal("", 0.0)];
    let mut frontier: Vec<(NodeId, usize)> = vec![(0, 0)];
    while let Some((id, level)) = frontier.pop() {
        let name = format!("n{}", id);
        if level == depth {
            let payoff = ((id as u64 * 7919) % 101) as f64 - 50.0;
            nodes[id as usize] = Node::terminal(name, payoff);
            continue;
        }
        let first = nodes.len() as NodeId;
        let children: Vec<NodeId> = (first..first + branching as NodeId).collect();
        for &child in &children {
            nodes.push(Node::terminal("", 0.0));
            frontier.push((child, level + 1));
        }
        nodes[id as usize] = if level % 2 == 0 {
            Node::decision(name, children)
        } else {
            Node::chance(name, children, vec![1.0 / branching as f64; branching])
        };
    }
    DecisionTree::from_nodes(nodes)
}
