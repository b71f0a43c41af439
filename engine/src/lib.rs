//! arbor Engine - Core decision tree types and algorithms
//!
//! This crate contains the tree model and its validation, the fixed-point
//! resolver shared by the backward-induction solver and the fixed-strategy
//! propagator, and the Monte-Carlo policy simulator.
//!
//! The engine performs no I/O; persistence and rendering live in `arbor-tree`.

pub mod error;
pub mod node;
pub mod propagate;
pub mod resolver;
pub mod sampler;
pub mod simulator;
pub mod solver;
pub mod strategy;
pub mod test_tree;
pub mod validate;

pub use error::{Error, Result};
pub use node::{DecisionTree, Kind, Node, NodeId};
pub use propagate::evaluate;
pub use resolver::{resolve, DecisionRule, Evaluation};
pub use sampler::sample_branch;
pub use simulator::{play, sim, sim_decisions, sim_decisions_parallel, Outcome, SimConfig, SimReport};
pub use solver::{solve, Solution};
pub use strategy::Strategy;
pub use validate::validate;

/// Allowed distance between a chance node's probability sum and 1.0
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;
