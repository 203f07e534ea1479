//! Discounted returns and episode masks.
//!
//! All batched routines take batch-major `[batch_size, total_steps]` tensors.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rl_utils::returns::{discounted_future_sum, shift_values};
//!
//! // n-step targets: n-step reward sum plus the discounted bootstrap value
//! let reward_sum = discounted_future_sum(rewards, 0.99, 5)?;
//! let bootstrap = shift_values(values, 0.99, 5, Some(last_values))?;
//! let targets = reward_sum + bootstrap;
//! ```

pub mod discounted;
pub mod masks;

#[cfg(test)]
mod tests;

pub use discounted::{
    compute_returns, compute_returns_batched, discounted_future_sum,
    discounted_future_sum_masked, shift_values,
};
pub use masks::{contiguous_sub_episodes, episode_mask, StepType};
