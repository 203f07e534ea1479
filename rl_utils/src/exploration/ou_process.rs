//! Zero-mean Ornstein-Uhlenbeck noise for continuous-action exploration.
//!
//! The process is a damped random walk producing temporally correlated noise,
//! the velocity of a particle in Brownian motion under friction:
//!
//! ```text
//! x_next = (1 - damping) * x + N(0, stddev)
//! ```
//!
//! `damping = 0` gives an undamped random walk, `damping = 1` gives
//! uncorrelated Gaussian noise. Small non-zero values are typical.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{check_unit_interval, Result, UtilsError};
use crate::ops::from_f32_vec;

/// Parameters of an [`OUProcess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OUConfig {
    /// Rate at which the trajectory is pulled back to zero, in `[0, 1]`.
    pub damping: f32,
    /// Standard deviation of the Gaussian increment.
    pub stddev: f32,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for OUConfig {
    fn default() -> Self {
        Self {
            damping: 0.15,
            stddev: 0.2,
            seed: None,
        }
    }
}

impl OUConfig {
    /// Set the damping.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Set the increment standard deviation.
    pub fn with_stddev(mut self, stddev: f32) -> Self {
        self.stddev = stddev;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        check_unit_interval("damping", self.damping)?;
        if !self.stddev.is_finite() || self.stddev < 0.0 {
            return Err(UtilsError::invalid(
                "stddev",
                format!("must be finite and non-negative, got {}", self.stddev),
            ));
        }
        Ok(())
    }
}

/// Stateful Ornstein-Uhlenbeck noise process over a tensor of any shape.
#[derive(Debug)]
pub struct OUProcess<B: Backend, const D: usize> {
    x: Tensor<B, D>,
    damping: f32,
    stddev: f32,
    rng: StdRng,
}

impl<B: Backend, const D: usize> OUProcess<B, D> {
    /// Start a process at `initial_value`.
    pub fn new(initial_value: Tensor<B, D>, config: &OUConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            x: initial_value,
            damping: config.damping,
            stddev: config.stddev,
            rng,
        })
    }

    /// Advance one step and return the new state.
    pub fn sample(&mut self) -> Tensor<B, D> {
        let dims = self.x.dims();
        let n: usize = dims.iter().product();
        let noise: Vec<f32> = (0..n)
            .map(|_| self.stddev * self.rng.sample::<f32, _>(StandardNormal))
            .collect();
        let noise = from_f32_vec::<B, D>(noise, dims, &self.x.device());

        self.x = self.x.clone().mul_scalar(1.0 - self.damping) + noise;
        self.x.clone()
    }

    /// Current state without advancing.
    pub fn state(&self) -> Tensor<B, D> {
        self.x.clone()
    }

    /// Damping coefficient.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Increment standard deviation.
    pub fn stddev(&self) -> f32 {
        self.stddev
    }
}

/// Build an Ornstein-Uhlenbeck noise process starting at `initial_value`.
pub fn ornstein_uhlenbeck_process<B: Backend, const D: usize>(
    initial_value: Tensor<B, D>,
    config: &OUConfig,
) -> Result<OUProcess<B, D>> {
    OUProcess::new(initial_value, config)
}
