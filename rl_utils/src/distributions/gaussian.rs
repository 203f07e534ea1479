//! Diagonal Gaussian distribution for continuous actions.
//!
//! ```text
//! log N(x; μ, σ) = -0.5 * ((x - μ)/σ)² - log(σ) - 0.5 * log(2π)
//! H = 0.5 * D * (1 + log(2π)) + Σ log(σ)
//! ```

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, UtilsError};

const LOG_STD_MIN: f32 = -20.0;
const LOG_STD_MAX: f32 = 2.0;

/// Batched Gaussian with independent dimensions.
#[derive(Debug, Clone)]
pub struct DiagonalGaussian<B: Backend> {
    /// Mean: [batch, action_dim]
    pub mean: Tensor<B, 2>,
    /// Log standard deviation: [batch, action_dim]
    pub log_std: Tensor<B, 2>,
}

impl<B: Backend> DiagonalGaussian<B> {
    /// Create from mean and log standard deviation of equal shape.
    pub fn new(mean: Tensor<B, 2>, log_std: Tensor<B, 2>) -> Result<Self> {
        let (mean_dims, std_dims) = (mean.dims(), log_std.dims());
        if mean_dims != std_dims {
            return Err(UtilsError::shape("log_std", &mean_dims, &std_dims));
        }
        Ok(Self { mean, log_std })
    }

    /// Like [`new`](Self::new), with `log_std` clamped to `[-20, 2]` as a
    /// policy head would before sampling.
    pub fn new_clamped(mean: Tensor<B, 2>, log_std: Tensor<B, 2>) -> Result<Self> {
        Self::new(mean, log_std.clamp(LOG_STD_MIN, LOG_STD_MAX))
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        self.mean.dims()[0]
    }

    /// Action dimension.
    pub fn action_dim(&self) -> usize {
        self.mean.dims()[1]
    }

    /// Per-dimension log density of `actions`: [batch, action_dim]
    pub fn log_prob_per_dim(&self, actions: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let (expected, got) = (self.mean.dims(), actions.dims());
        if expected != got {
            return Err(UtilsError::shape("gaussian actions", &expected, &got));
        }

        let log_2pi = (2.0 * std::f32::consts::PI).ln();
        let std = self.log_std.clone().exp();
        let normalized = (actions - self.mean.clone()) / std;
        Ok(normalized.powf_scalar(2.0).mul_scalar(-0.5) - self.log_std.clone() - 0.5 * log_2pi)
    }

    /// Per-dimension entropy: [batch, action_dim]
    pub fn entropy_per_dim(&self) -> Tensor<B, 2> {
        let log_2pi = (2.0 * std::f32::consts::PI).ln();
        self.log_std.clone().add_scalar(0.5 * (1.0 + log_2pi))
    }

    /// Log probability summed over action dimensions: [batch]
    pub fn log_prob(&self, actions: Tensor<B, 2>) -> Result<Tensor<B, 1>> {
        let batch_size = self.batch_size();
        Ok(self.log_prob_per_dim(actions)?.sum_dim(1).reshape([batch_size]))
    }

    /// Entropy summed over action dimensions: [batch]
    pub fn entropy(&self) -> Tensor<B, 1> {
        let batch_size = self.batch_size();
        self.entropy_per_dim().sum_dim(1).reshape([batch_size])
    }

    /// Most likely action (the mean): [batch, action_dim]
    pub fn mode(&self) -> Tensor<B, 2> {
        self.mean.clone()
    }
}
