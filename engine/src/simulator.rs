//! Policy simulator: single plays and Monte-Carlo trials
//!
//! A play walks from a start node to a terminal: decision nodes follow the
//! strategy, chance nodes draw a branch from the injected random source.
//! Batched runs tally how often each terminal is reached and derive the
//! empirical expected value, which converges on the analytic root value
//! of `evaluate` at rate O(1/sqrt(trials)).
//!
//! The parallel variant gives every batch its own `SmallRng` seeded from
//! the config seed and the batch index, so results depend only on the
//! config, never on thread scheduling.

use crate::error::{Error, Result};
use crate::node::{DecisionTree, Kind, NodeId};
use crate::sampler::draw;
use crate::strategy::Strategy;
use crate::validate::validate;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Terminal reached by one play
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub node: NodeId,
    pub name: String,
    pub payoff: f64,
}

/// Monte-Carlo run parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Total number of plays
    pub trials: u64,
    /// Plays per rayon task
    pub batch: u64,
    /// Base seed; batch `b` uses `seed + b`
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            trials: 1_000_000,
            batch: 65_536,
            seed: 0x5eed,
        }
    }
}

/// Aggregated result of a batch of plays
#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    /// Number of plays
    pub trials: u64,
    /// Times each node ended a play (non-zero only at terminals)
    pub counts: Vec<u64>,
    /// Payoff of each terminal node, 0.0 elsewhere
    pub payoffs: Vec<f64>,
    /// Empirical expected value: sum of frequency times payoff
    pub expected_value: f64,
}

impl SimReport {
    fn from_counts(tree: &DecisionTree, counts: Vec<u64>, trials: u64) -> Self {
        let payoffs: Vec<f64> = tree
            .nodes
            .iter()
            .map(|node| node.payoff().unwrap_or(0.0))
            .collect();
        let expected_value = if trials == 0 {
            0.0
        } else {
            counts
                .iter()
                .zip(&payoffs)
                .map(|(&c, &p)| c as f64 / trials as f64 * p)
                .sum()
        };
        SimReport {
            trials,
            counts,
            payoffs,
            expected_value,
        }
    }

    /// Empirical probability of ending at `node`
    pub fn frequency(&self, node: NodeId) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.counts.get(node as usize).copied().unwrap_or(0) as f64 / self.trials as f64
    }

    /// Empirical probability of ending at each node, indexed by ID
    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.counts.len() as NodeId).map(|id| self.frequency(id)).collect()
    }

    /// Standard error of `expected_value` (infinite for an empty run)
    pub fn standard_error(&self) -> f64 {
        if self.trials == 0 {
            return f64::INFINITY;
        }
        let second: f64 = self
            .frequencies()
            .iter()
            .zip(&self.payoffs)
            .map(|(f, p)| f * p * p)
            .sum();
        let variance = (second - self.expected_value * self.expected_value).max(0.0);
        (variance / self.trials as f64).sqrt()
    }
}

/// Walk from `start` to a terminal and return its ID.
fn walk<R: Rng + ?Sized>(
    strategy: &Strategy,
    tree: &DecisionTree,
    start: NodeId,
    rng: &mut R,
) -> Result<NodeId> {
    let mut current = start;
    // An acyclic tree reaches a terminal in fewer than `len` moves
    for _ in 0..=tree.len() {
        let node = tree
            .get(current)
            .ok_or_else(|| Error::malformed(current, "play reached a node outside the tree"))?;
        current = match &node.kind {
            Kind::Terminal { .. } => return Ok(current),
            Kind::Decision { children } => match strategy.choice(current) {
                Some(choice) if children.contains(&choice) => choice,
                Some(choice) => {
                    return Err(Error::strategy(
                        current,
                        format!("{} is not among children {:?}", choice, children),
                    ))
                }
                None => return Err(Error::strategy(current, "no choice for decision node")),
            },
            Kind::Chance {
                children,
                probabilities,
            } => {
                let branch = draw(current, probabilities, rng)?;
                *children.get(branch).ok_or_else(|| Error::SamplingDegenerate {
                    node: current,
                    reason: format!("branch {} has no child", branch),
                })?
            }
        };
    }
    Err(Error::malformed(start, "play did not reach a terminal (cycle)"))
}

/// Play `tree` once from `start` under `strategy`.
pub fn play<R: Rng + ?Sized>(
    strategy: &Strategy,
    tree: &DecisionTree,
    start: NodeId,
    rng: &mut R,
) -> Result<Outcome> {
    let node = walk(strategy, tree, start, rng)?;
    let terminal = &tree.nodes[node as usize];
    Ok(Outcome {
        node,
        name: terminal.name.clone(),
        payoff: terminal.payoff().unwrap_or(0.0),
    })
}

/// Play `trials` independent times from the root, keeping every outcome.
pub fn sim<R: Rng + ?Sized>(
    strategy: &Strategy,
    tree: &DecisionTree,
    trials: usize,
    rng: &mut R,
) -> Result<Vec<Outcome>> {
    validate(tree)?;
    strategy.check(tree)?;
    (0..trials).map(|_| play(strategy, tree, 0, rng)).collect()
}

/// Play `trials` times from the root and tally terminal frequencies.
pub fn sim_decisions<R: Rng + ?Sized>(
    trials: u64,
    tree: &DecisionTree,
    strategy: &Strategy,
    rng: &mut R,
) -> Result<SimReport> {
    validate(tree)?;
    strategy.check(tree)?;
    let counts = tally(trials, tree, strategy, rng)?;
    let report = SimReport::from_counts(tree, counts, trials);
    log::info!(
        "{} trials, empirical value {:.6} (se {:.6})",
        trials,
        report.expected_value,
        report.standard_error()
    );
    Ok(report)
}

/// `sim_decisions` split into seeded batches run on the rayon pool.
pub fn sim_decisions_parallel(
    config: &SimConfig,
    tree: &DecisionTree,
    strategy: &Strategy,
) -> Result<SimReport> {
    validate(tree)?;
    strategy.check(tree)?;
    let n = tree.len();
    let batch = config.batch.max(1);
    let batches = config.trials.div_ceil(batch);

    let counts = (0..batches)
        .into_par_iter()
        .map(|b| -> Result<Vec<u64>> {
            let size = batch.min(config.trials - b * batch);
            let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(b));
            let counts = tally(size, tree, strategy, &mut rng)?;
            log::debug!("batch {} of {} finished {} plays", b + 1, batches, size);
            Ok(counts)
        })
        .try_reduce(
            || vec![0u64; n],
            |mut acc, counts| {
                for (a, c) in acc.iter_mut().zip(counts) {
                    *a += c;
                }
                Ok(acc)
            },
        )?;

    let report = SimReport::from_counts(tree, counts, config.trials);
    log::info!(
        "{} trials in {} batches, empirical value {:.6} (se {:.6})",
        config.trials,
        batches,
        report.expected_value,
        report.standard_error()
    );
    Ok(report)
}

fn tally<R: Rng + ?Sized>(
    trials: u64,
    tree: &DecisionTree,
    strategy: &Strategy,
    rng: &mut R,
) -> Result<Vec<u64>> {
    let mut counts = vec![0u64; tree.len()];
    for _ in 0..trials {
        let node = walk(strategy, tree, 0, rng)?;
        counts[node as usize] += 1;
    }
    Ok(counts)
}
