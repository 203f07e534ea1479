//! Categorical distribution over `n` discrete actions.

use burn::tensor::activation::{log_softmax, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::error::{Result, UtilsError};
use crate::ops::to_i64_vec;

/// Batched categorical distribution parameterised by logits.
#[derive(Debug, Clone)]
pub struct Categorical<B: Backend> {
    /// Unnormalized log probabilities: [batch, n_actions]
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> Categorical<B> {
    /// Create from logits.
    pub fn new(logits: Tensor<B, 2>) -> Self {
        Self { logits }
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        self.logits.dims()[0]
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.logits.dims()[1]
    }

    /// Action probabilities: [batch, n_actions]
    pub fn probs(&self) -> Tensor<B, 2> {
        softmax(self.logits.clone(), 1)
    }

    /// Log probability of `actions` ([batch], each in `[0, n_actions)`): [batch]
    pub fn log_prob(&self, actions: Tensor<B, 1, Int>) -> Result<Tensor<B, 1>> {
        let batch_size = self.batch_size();
        let n_actions = self.n_actions();
        let [len] = actions.dims();
        if len != batch_size {
            return Err(UtilsError::shape("categorical actions", &[batch_size], &[len]));
        }
        for action in to_i64_vec(actions.clone())? {
            if action < 0 || action >= n_actions as i64 {
                return Err(UtilsError::ActionOutOfRange {
                    action,
                    dim: 0,
                    num_actions: n_actions,
                });
            }
        }

        let log_probs = log_softmax(self.logits.clone(), 1);
        Ok(log_probs
            .gather(1, actions.reshape([batch_size, 1]))
            .reshape([batch_size]))
    }

    /// Entropy `-Σ p log p`: [batch]
    pub fn entropy(&self) -> Tensor<B, 1> {
        let batch_size = self.batch_size();
        let log_probs = log_softmax(self.logits.clone(), 1);
        let probs = log_probs.clone().exp();
        (probs * log_probs).sum_dim(1).neg().reshape([batch_size])
    }

    /// Most likely action: [batch]
    pub fn mode(&self) -> Tensor<B, 1, Int> {
        let batch_size = self.batch_size();
        self.logits.clone().argmax(1).reshape([batch_size])
    }
}
