//! Log-probability and entropy of (possibly composite) action distributions.
//!
//! A policy over a tuple of independent actions (e.g. a discrete gear plus a
//! continuous throttle) produces one distribution per tuple element. The total
//! log-probability is the sum of each element's log-probability, itself summed
//! over every non-batch dimension; entropy is reduced the same way.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rl_utils::distributions::{log_probability, ActionDistribution, ActionValue};
//!
//! let dists = [ActionDistribution::from(gear), ActionDistribution::from(throttle)];
//! let actions = [ActionValue::Discrete(gear_idx), ActionValue::Continuous(throttle_val)];
//! let log_pi = log_probability(&dists, &actions)?; // [batch]
//! ```

pub mod categorical;
pub mod gaussian;


pub use categorical::Categorical;
pub use gaussian::DiagonalGaussian;

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::error::{Result, UtilsError};

/// One element of an action tuple.
#[derive(Debug, Clone)]
pub enum ActionValue<B: Backend> {
    /// Discrete action indices: [batch]
    Discrete(Tensor<B, 1, Int>),
    /// Continuous action vectors: [batch, action_dim]
    Continuous(Tensor<B, 2>),
}

impl<B: Backend> ActionValue<B> {
    fn kind(&self) -> &'static str {
        match self {
            ActionValue::Discrete(_) => "discrete",
            ActionValue::Continuous(_) => "continuous",
        }
    }
}

/// One element of a distribution tuple.
#[derive(Debug, Clone)]
pub enum ActionDistribution<B: Backend> {
    /// Categorical over discrete actions.
    Categorical(Categorical<B>),
    /// Diagonal Gaussian over continuous actions.
    Gaussian(DiagonalGaussian<B>),
}

impl<B: Backend> From<Categorical<B>> for ActionDistribution<B> {
    fn from(d: Categorical<B>) -> Self {
        ActionDistribution::Categorical(d)
    }
}

impl<B: Backend> From<DiagonalGaussian<B>> for ActionDistribution<B> {
    fn from(d: DiagonalGaussian<B>) -> Self {
        ActionDistribution::Gaussian(d)
    }
}

impl<B: Backend> ActionDistribution<B> {
    fn kind(&self) -> &'static str {
        match self {
            ActionDistribution::Categorical(_) => "discrete",
            ActionDistribution::Gaussian(_) => "continuous",
        }
    }

    /// Log probability reduced over non-batch dimensions: [batch]
    pub fn log_prob(&self, action: &ActionValue<B>) -> Result<Tensor<B, 1>> {
        match (self, action) {
            (ActionDistribution::Categorical(d), ActionValue::Discrete(a)) => d.log_prob(a.clone()),
            (ActionDistribution::Gaussian(d), ActionValue::Continuous(a)) => d.log_prob(a.clone()),
            _ => Err(UtilsError::StructureMismatch(format!(
                "{} distribution given a {} action",
                self.kind(),
                action.kind()
            ))),
        }
    }

    /// Entropy reduced over non-batch dimensions: [batch]
    pub fn entropy(&self) -> Tensor<B, 1> {
        match self {
            ActionDistribution::Categorical(d) => d.entropy(),
            ActionDistribution::Gaussian(d) => d.entropy(),
        }
    }

    /// Most likely action.
    pub fn mode(&self) -> ActionValue<B> {
        match self {
            ActionDistribution::Categorical(d) => ActionValue::Discrete(d.mode()),
            ActionDistribution::Gaussian(d) => ActionValue::Continuous(d.mode()),
        }
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        match self {
            ActionDistribution::Categorical(d) => d.batch_size(),
            ActionDistribution::Gaussian(d) => d.batch_size(),
        }
    }
}

/// Total log probability of an action tuple under a distribution tuple: [batch]
///
/// # Errors
///
/// `StructureMismatch` when the tuples differ in length or element kinds or
/// batch sizes, `InvalidArgument` when they are empty.
pub fn log_probability<B: Backend>(
    distributions: &[ActionDistribution<B>],
    actions: &[ActionValue<B>],
) -> Result<Tensor<B, 1>> {
    if distributions.len() != actions.len() {
        return Err(UtilsError::StructureMismatch(format!(
            "{} distributions for {} actions",
            distributions.len(),
            actions.len()
        )));
    }
    check_batch_sizes(distributions)?;

    let mut total: Option<Tensor<B, 1>> = None;
    for (dist, action) in distributions.iter().zip(actions) {
        let log_prob = dist.log_prob(action)?;
        total = Some(match total {
            Some(sum) => sum + log_prob,
            None => log_prob,
        });
    }
    total.ok_or_else(|| UtilsError::invalid("distributions", "empty action tuple"))
}

/// Total entropy of a distribution tuple, assuming independent elements: [batch]
pub fn entropy<B: Backend>(distributions: &[ActionDistribution<B>]) -> Result<Tensor<B, 1>> {
    check_batch_sizes(distributions)?;
    distributions
        .iter()
        .map(ActionDistribution::entropy)
        .reduce(|a, b| a + b)
        .ok_or_else(|| UtilsError::invalid("distributions", "empty action tuple"))
}

fn check_batch_sizes<B: Backend>(distributions: &[ActionDistribution<B>]) -> Result<()> {
    let Some(first) = distributions.first() else {
        return Ok(());
    };
    let batch_size = first.batch_size();
    for (i, dist) in distributions.iter().enumerate().skip(1) {
        if dist.batch_size() != batch_size {
            return Err(UtilsError::StructureMismatch(format!(
                "distribution #{} has batch size {}, expected {}",
                i,
                dist.batch_size(),
                batch_size
            )));
        }
    }
    Ok(())
}
