//! Text renderers
//!
//! Every renderer except `path` consumes the lazy `(node, depth)` pre-order
//! walk of `DecisionTree::walk` and returns the text instead of printing it.

use crate::persist::format_float;
use arbor_engine::{DecisionTree, Error, Evaluation, Kind, Node, NodeId, Result, Strategy};
use std::fmt::Write;

const LEVEL: &str = "   ";
const STEP: &str = "  ";

fn label(id: NodeId, node: &Node) -> String {
    let parent = node.parent.map_or(-1, i64::from);
    format!("{}-{}#{}", id, node.name, parent)
}

fn suffix(kind: &Kind) -> String {
    match kind {
        Kind::Terminal { payoff } => format!("(t){}", format_float(*payoff)),
        Kind::Decision { .. } => "(d)".to_string(),
        Kind::Chance { probabilities, .. } => {
            let probs: Vec<String> = probabilities.iter().map(|p| format_float(*p)).collect();
            format!("(n)[{}]", probs.join(","))
        }
    }
}

/// One line per node: `{indent}{id}-{name}#{parent}` and the kind suffix.
pub fn show(tree: &DecisionTree) -> String {
    let mut out = String::new();
    for (id, depth) in tree.walk() {
        let node = &tree.nodes[id as usize];
        let _ = writeln!(out, "{}{}{}", LEVEL.repeat(depth), label(id, node), suffix(&node.kind));
    }
    out
}

/// `show` with each node's subvalue appended as `(V){value}`, separated by
/// a space except after a chance node's probability list.
pub fn show_values(tree: &DecisionTree, evaluation: &Evaluation) -> String {
    let mut out = String::new();
    for (id, depth) in tree.walk() {
        let node = &tree.nodes[id as usize];
        let value = evaluation
            .subvalue(id)
            .map_or_else(|| "?".to_string(), format_float);
        let gap = if node.is_chance() { "" } else { " " };
        let _ = writeln!(
            out,
            "{}{}{}{}(V){}",
            LEVEL.repeat(depth),
            label(id, node),
            suffix(&node.kind),
            gap,
            value
        );
    }
    out
}

/// Tree listing with the chosen child of each decision node starred.
pub fn show_strategy(tree: &DecisionTree, strategy: &Strategy) -> String {
    let mut out = String::new();
    for (id, depth) in tree.walk() {
        let node = &tree.nodes[id as usize];
        let chosen = match node.parent {
            Some(p) if tree.get(p).is_some_and(Node::is_decision) => strategy.choice(p) == Some(id),
            _ => false,
        };
        let mark = if chosen { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{}{}{}-{}{}{}",
            mark,
            LEVEL.repeat(depth),
            id,
            mark,
            node.name,
            suffix(&node.kind)
        );
    }
    out
}

/// What happens under `strategy`: decisions follow their choice, chance
/// nodes list their probabilities and expand every branch, terminals show
/// their payoff.
pub fn path(tree: &DecisionTree, strategy: &Strategy) -> Result<String> {
    let mut out = String::new();
    let mut stack: Vec<(NodeId, usize)> = Vec::new();
    if !tree.is_empty() {
        stack.push((0, 0));
    }
    let mut steps = 0;
    while let Some((id, depth)) = stack.pop() {
        steps += 1;
        if steps > tree.len() {
            return Err(Error::MalformedTree {
                node: id,
                reason: "path revisits nodes (cycle)".into(),
            });
        }
        let node = tree.get(id).ok_or_else(|| Error::MalformedTree {
            node: id,
            reason: "path reached a node outside the tree".into(),
        })?;
        let indent = STEP.repeat(depth);
        match &node.kind {
            Kind::Terminal { payoff } => {
                let _ = writeln!(out, "{}{} {}", indent, node.name, format_float(*payoff));
            }
            Kind::Decision { children } => {
                let _ = writeln!(out, "{}{}", indent, node.name);
                let choice = strategy
                    .choice(id)
                    .filter(|c| children.contains(c))
                    .ok_or_else(|| Error::InvalidStrategy {
                        node: id,
                        reason: "no valid choice for decision node".into(),
                    })?;
                stack.push((choice, depth + 1));
            }
            Kind::Chance {
                children,
                probabilities,
            } => {
                let _ = writeln!(out, "{}{} {:?}", indent, node.name, probabilities);
                stack.extend(children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
    }
    Ok(out)
}
