//! Small tensor helpers: replication, distributional Q-values, element-wise losses.

use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, UtilsError};

/// Replicate `tensor` so that it gains `outer_shape` as leading dimensions.
///
/// For `t` of shape `[2, 3]` and `outer_shape = [2, 1]` the result has shape
/// `[2, 1, 2, 3]` and every `[i, j]` slice equals `t`.
///
/// An empty `outer_shape` returns the input unchanged.
pub fn replicate<B: Backend, const D: usize, const O: usize>(
    tensor: Tensor<B, D>,
    outer_shape: &[usize],
) -> Result<Tensor<B, O>> {
    if outer_shape.len() + D != O {
        return Err(UtilsError::invalid(
            "outer_shape",
            format!(
                "{} outer dims plus rank {} does not give output rank {}",
                outer_shape.len(),
                D,
                O
            ),
        ));
    }

    let inner = tensor.dims();
    let mut target = [0usize; O];
    target[..outer_shape.len()].copy_from_slice(outer_shape);
    target[outer_shape.len()..].copy_from_slice(&inner);

    if outer_shape.is_empty() {
        return Ok(tensor.reshape(target));
    }

    let copies: usize = outer_shape.iter().product();
    let n: usize = inner.iter().product();
    Ok(tensor.reshape([1, n]).repeat_dim(0, copies).reshape(target))
}

/// Expected Q-values from categorical value-distribution logits.
///
/// `out = Σ_atoms softmax(logits) * support` over the last axis.
///
/// # Arguments
///
/// * `logits` - `[.., num_atoms]`
/// * `support` - `[num_atoms]` atom locations
///
/// # Returns
///
/// The logits' outer dimensions (output rank `D - 1`). Burn has no rank-0
/// tensors, so a single `[num_atoms]` distribution yields a `[1]` tensor
/// (output rank 1).
pub fn convert_q_logits_to_values<B: Backend, const D: usize, const O: usize>(
    logits: Tensor<B, D>,
    support: Tensor<B, 1>,
) -> Result<Tensor<B, O>> {
    let single = D == 1 && O == 1;
    if O == 0 || (O + 1 != D && !single) {
        return Err(UtilsError::invalid(
            "logits",
            format!(
                "rank {} must be output rank {} plus the atom axis (rank 1 logits give output rank 1)",
                D, O
            ),
        ));
    }

    let dims = logits.dims();
    let atoms = dims[D - 1];
    let [support_len] = support.dims();
    if support_len != atoms {
        return Err(UtilsError::shape("support", &[atoms], &[support_len]));
    }

    let mut outer = [1usize; O];
    if !single {
        outer.copy_from_slice(&dims[..O]);
    }
    let rows: usize = outer.iter().product();

    let probabilities = softmax(logits.reshape([rows, atoms]), 1);
    let support = support.reshape([1, atoms]).repeat_dim(0, rows);
    Ok((probabilities * support).sum_dim(1).reshape(outer))
}

/// Unreduced squared error `(x - y)^2`.
pub fn element_wise_squared_loss<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
) -> Tensor<B, D> {
    (x - y).powf_scalar(2.0)
}

/// Unreduced Huber loss with δ = 1.
///
/// `0.5 * d^2` for `|d| <= 1`, `|d| - 0.5` otherwise.
pub fn element_wise_huber_loss<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
) -> Tensor<B, D> {
    let abs_error = (x - y).abs();
    let quadratic = abs_error.clone().clamp_max(1.0);
    let linear = abs_error - quadratic.clone();
    quadratic.powf_scalar(2.0).mul_scalar(0.5) + linear
}
