//! Outcome sampler for chance nodes
//!
//! Inverse-CDF linear scan: branch `i` is drawn when
//! `cum[0..i) <= u < cum[0..=i)` for a uniform `u` in [0, 1).

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::PROBABILITY_TOLERANCE;
use rand::Rng;

/// Map a uniform draw `u` in [0, 1) onto a branch index.
///
/// Fails with `SamplingDegenerate` on an empty list, a negative or
/// non-finite weight, a list with no positive weight, or weights whose sum
/// is more than `PROBABILITY_TOLERANCE` away from 1. When rounding leaves
/// `u` at or above the total, the last positive-weight branch is returned,
/// so the result is always a valid index.
pub fn sample_branch(probabilities: &[f64], u: f64) -> Result<usize> {
    sample_at(0, probabilities, u)
}

/// Draw a branch for chance node `node` using `rng`.
pub fn draw<R: Rng + ?Sized>(node: NodeId, probabilities: &[f64], rng: &mut R) -> Result<usize> {
    let u: f64 = rng.random();
    sample_at(node, probabilities, u)
}

fn sample_at(node: NodeId, probabilities: &[f64], u: f64) -> Result<usize> {
    if probabilities.is_empty() {
        return Err(degenerate(node, "no branches"));
    }
    if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(degenerate(node, format!("weight {} is negative or not finite", p)));
    }
    let last = probabilities
        .iter()
        .rposition(|&p| p > 0.0)
        .ok_or_else(|| degenerate(node, "every weight is zero"))?;
    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(degenerate(node, format!("weights sum to {}", total)));
    }

    let mut cumulative = 0.0;
    for (i, &p) in probabilities.iter().enumerate() {
        let lower = cumulative;
        cumulative += p;
        if lower <= u && u < cumulative {
            return Ok(i);
        }
    }
    Ok(last)
}

fn degenerate(node: NodeId, reason: impl Into<String>) -> Error {
    Error::SamplingDegenerate {
        node,
        reason: reason.into(),
    }
}
