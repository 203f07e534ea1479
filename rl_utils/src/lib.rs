//! # rl_utils: numeric helpers for reinforcement learning on Burn
//!
//! Small, independent routines shared by RL agents: target-network soft
//! updates, action indexing, periodic triggers, Ornstein-Uhlenbeck
//! exploration noise, discounted returns, log-probability and entropy of
//! composite action distributions, tensor summaries and checkpoints.
//!
//! Everything is generic over a Burn [`Backend`](burn::tensor::backend::Backend);
//! no threads or global state are introduced.
//!
//! ## Modules
//!
//! ```text
//! core          counters, name scopes, Periodically, soft/hard target updates
//! ops           index_with_actions, BoundedSpec clipping/scaling, replicate, losses
//! exploration   OUProcess
//! returns       discounted sums, shift_values, compute_returns, episode masks
//! distributions Categorical, DiagonalGaussian, log_probability, entropy
//! metrics       generate_tensor_summaries
//! checkpoint    Checkpointer with bounded retention
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rl_utils::{TargetUpdater, TargetUpdaterConfig, discounted_future_sum};
//!
//! let updater = TargetUpdater::new(TargetUpdaterConfig::soft(0.005))?;
//! target = updater.maybe_update(&online, target)?;
//!
//! let n_step = discounted_future_sum(rewards, 0.99, 5)?;
//! ```

pub mod core;
pub mod ops;
pub mod exploration;
pub mod returns;
pub mod distributions;
pub mod metrics;
pub mod checkpoint;
pub mod error;

pub use error::{Result, UtilsError};

pub use core::{
    create_counter, hard_copy, join_scope, periodically, soft_update, soft_variables_update,
    Counter, NameScope, NamedVariable, Periodically, SharedCounter, TargetUpdater,
    TargetUpdaterConfig,
};
pub use ops::{
    clip_to_spec, convert_q_logits_to_values, element_wise_huber_loss, element_wise_squared_loss,
    index_with_actions, index_with_multi_dim_actions, replicate, scale_to_spec, BoundedSpec,
};
pub use exploration::{ornstein_uhlenbeck_process, OUConfig, OUProcess};
pub use returns::{
    compute_returns, compute_returns_batched, contiguous_sub_episodes, discounted_future_sum,
    discounted_future_sum_masked, episode_mask, shift_values, StepType,
};
pub use distributions::{
    entropy, log_probability, ActionDistribution, ActionValue, Categorical, DiagonalGaussian,
};
pub use metrics::{generate_tensor_summaries, TensorSummary};
pub use checkpoint::{CheckpointInfo, Checkpointer, CheckpointerConfig};
