//! Discounted sums and returns over batch-major `[batch_size, total_steps]` data.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, UtilsError};
use crate::ops::{from_f32_vec, to_f32_vec};

/// Discounted sum of the next `num_steps` values, zero-padded past the end.
///
/// ```text
/// out[i, j] = Σ_{k=0}^{n-1} γ^k * values[i, j + k],   n = min(num_steps, total_steps)
/// ```
///
/// For `values = [5, 6, 7]` and `γ = 0.9` this gives
/// `[5 + 6*0.9 + 7*0.9^2, 6 + 7*0.9, 7]`.
///
/// Equivalent to convolving a `[γ^0, .., γ^(n-1)]` kernel along the time axis,
/// built from shifted copies so gradients flow back to `values`.
pub fn discounted_future_sum<B: Backend>(
    values: Tensor<B, 2>,
    gamma: f32,
    num_steps: usize,
) -> Result<Tensor<B, 2>> {
    if num_steps == 0 {
        return Err(UtilsError::invalid("num_steps", "must be positive"));
    }

    let [batch_size, total_steps] = values.dims();
    let n = num_steps.min(total_steps);
    let device = values.device();

    let mut sum = values.clone();
    let mut discount = 1.0f32;
    for k in 1..n {
        discount *= gamma;
        let shifted = Tensor::cat(
            vec![
                values.clone().slice([0..batch_size, k..total_steps]),
                Tensor::zeros([batch_size, k], &device),
            ],
            1,
        );
        sum = sum + shifted.mul_scalar(discount);
    }
    Ok(sum)
}

/// [`discounted_future_sum`] with every value at or after a row's episode
/// length zeroed first.
///
/// # Arguments
///
/// * `episode_lengths` - number of valid steps per row, one entry per batch row
pub fn discounted_future_sum_masked<B: Backend>(
    values: Tensor<B, 2>,
    gamma: f32,
    num_steps: usize,
    episode_lengths: &[usize],
) -> Result<Tensor<B, 2>> {
    let [batch_size, total_steps] = values.dims();
    if episode_lengths.len() != batch_size {
        return Err(UtilsError::shape(
            "episode_lengths",
            &[batch_size],
            &[episode_lengths.len()],
        ));
    }

    let mask: Vec<f32> = episode_lengths
        .iter()
        .flat_map(|&len| (0..total_steps).map(move |t| if t < len { 1.0 } else { 0.0 }))
        .collect();
    let mask = from_f32_vec::<B, 2>(mask, [batch_size, total_steps], &values.device());

    discounted_future_sum(values * mask, gamma, num_steps)
}

/// Shift values `num_steps` into the future, discounting by `γ^num_steps`.
///
/// ```text
/// out[i, j] = γ^n * values[i, j + n]          if j + n < total_steps
///           = γ^(total_steps - j) * final[i]   otherwise
/// ```
///
/// with `n = min(num_steps, total_steps)`. `final_values` is `[batch_size]` and
/// defaults to zeros.
pub fn shift_values<B: Backend>(
    values: Tensor<B, 2>,
    gamma: f32,
    num_steps: usize,
    final_values: Option<Tensor<B, 1>>,
) -> Result<Tensor<B, 2>> {
    let [batch_size, total_steps] = values.dims();
    let device = values.device();

    let final_values = match final_values {
        Some(f) => {
            let [len] = f.dims();
            if len != batch_size {
                return Err(UtilsError::shape("final_values", &[batch_size], &[len]));
            }
            f
        }
        None => Tensor::zeros([batch_size], &device),
    };

    let n = num_steps.min(total_steps);
    if n == 0 {
        return Ok(values);
    }

    // Exponents n, n-1, .., 1 for the padded tail.
    let pad_discounts: Vec<f32> = (1..=n).rev().map(|e| gamma.powi(e as i32)).collect();
    let pad_discounts = from_f32_vec::<B, 2>(pad_discounts, [1, n], &device).repeat_dim(0, batch_size);
    let final_pad = final_values.reshape([batch_size, 1]).repeat_dim(1, n) * pad_discounts;

    if n == total_steps {
        return Ok(final_pad);
    }

    let head = values
        .slice([0..batch_size, n..total_steps])
        .mul_scalar(gamma.powi(n as i32));
    Ok(Tensor::cat(vec![head, final_pad], 1))
}

/// Return from every index of one episode segment.
///
/// ```text
/// R_t = r_t + d_t * R_{t+1},   R_T = 0
/// ```
///
/// `discounts` should be 0 on the final step of each episode so returns do not
/// leak across episode boundaries. Computed on the host; the result carries no
/// gradient.
pub fn compute_returns<B: Backend>(
    rewards: Tensor<B, 1>,
    discounts: Tensor<B, 1>,
) -> Result<Tensor<B, 1>> {
    let [len] = rewards.dims();
    let [discount_len] = discounts.dims();
    if len != discount_len {
        return Err(UtilsError::shape("discounts", &[len], &[discount_len]));
    }

    let device = rewards.device();
    let returns = accumulate_returns(&to_f32_vec(rewards)?, &to_f32_vec(discounts)?);
    Ok(from_f32_vec::<B, 1>(returns, [len], &device))
}

/// [`compute_returns`] for a `[batch_size, total_steps]` batch, row by row.
pub fn compute_returns_batched<B: Backend>(
    rewards: Tensor<B, 2>,
    discounts: Tensor<B, 2>,
) -> Result<Tensor<B, 2>> {
    let dims = rewards.dims();
    let discount_dims = discounts.dims();
    if dims != discount_dims {
        return Err(UtilsError::shape("discounts", &dims, &discount_dims));
    }
    let [batch_size, total_steps] = dims;
    if batch_size == 0 || total_steps == 0 {
        return Ok(rewards);
    }

    let device = rewards.device();
    let rewards = to_f32_vec(rewards)?;
    let discounts = to_f32_vec(discounts)?;

    let returns: Vec<f32> = rewards
        .chunks(total_steps)
        .zip(discounts.chunks(total_steps))
        .flat_map(|(r, d)| accumulate_returns(r, d))
        .collect();
    Ok(from_f32_vec::<B, 2>(returns, dims, &device))
}

fn accumulate_returns(rewards: &[f32], discounts: &[f32]) -> Vec<f32> {
    let mut returns = vec![0.0f32; rewards.len()];
    let mut next_return = 0.0f32;
    for t in (0..rewards.len()).rev() {
        next_return = rewards[t] + discounts[t] * next_return;
        returns[t] = next_return;
    }
    returns
}
