//! Index Q-values with actions.
//!
//! Both functions support any number of outer dimensions (time, batch, ...).
//! Indices are validated on the host before the gather, so an out-of-range
//! action is an error instead of undefined backend behavior.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use super::to_i64_vec;
use crate::error::{Result, UtilsError};

/// Select `q_values[i.., actions[i..]]` for scalar actions.
///
/// # Arguments
///
/// * `q_values` - `[outer_1, .., outer_K, num_actions]`
/// * `actions` - `[outer_1, .., outer_K]`, each in `[0, num_actions)`
///
/// # Returns
///
/// `[outer_1, .., outer_K]`
pub fn index_with_actions<B: Backend, const D: usize, const K: usize>(
    q_values: Tensor<B, D>,
    actions: Tensor<B, K, Int>,
) -> Result<Tensor<B, K>> {
    if D != K + 1 {
        return Err(UtilsError::invalid(
            "q_values",
            format!("rank {} does not match actions rank {} plus one action axis", D, K),
        ));
    }

    let q_dims = q_values.dims();
    let outer = actions.dims();
    check_outer("q_values", &q_dims[..K], &outer)?;

    let num_actions = q_dims[K];
    let flat_indices = to_i64_vec(actions)?
        .into_iter()
        .map(|a| check_action(a, 0, num_actions))
        .collect::<Result<Vec<_>>>()?;

    Ok(gather_rows(q_values, flat_indices, num_actions).reshape(outer))
}

/// Select `q_values[i.., a_1, .., a_J]` for multi-dimensional actions.
///
/// # Arguments
///
/// * `q_values` - `[outer_1, .., outer_O, A_1, .., A_J]`
/// * `actions` - `[outer_1, .., outer_O, J]`; the last axis holds one index per
///   action dimension, `a_j` in `[0, A_j)`
///
/// # Returns
///
/// `[outer_1, .., outer_O]`
pub fn index_with_multi_dim_actions<B: Backend, const D: usize, const K: usize, const O: usize>(
    q_values: Tensor<B, D>,
    actions: Tensor<B, K, Int>,
) -> Result<Tensor<B, O>> {
    if K == 0 || O + 1 != K {
        return Err(UtilsError::invalid(
            "actions",
            format!("rank {} must be output rank {} plus one", K, O),
        ));
    }

    let q_dims = q_values.dims();
    let action_dims = actions.dims();
    let num_dims = action_dims[K - 1];
    if num_dims == 0 {
        return Err(UtilsError::invalid("actions", "last axis must hold at least one index"));
    }
    if O + num_dims != D {
        return Err(UtilsError::invalid(
            "q_values",
            format!(
                "rank {} does not match {} outer dims plus {} action dims",
                D, O, num_dims
            ),
        ));
    }

    let mut outer = [0usize; O];
    outer.copy_from_slice(&action_dims[..O]);
    check_outer("q_values", &q_dims[..O], &outer)?;

    // Row-major strides over the action axes of q_values.
    let sizes = &q_dims[O..];
    let mut strides = vec![1usize; num_dims];
    for j in (0..num_dims - 1).rev() {
        strides[j] = strides[j + 1] * sizes[j + 1];
    }
    let row_len: usize = sizes.iter().product();

    let raw = to_i64_vec(actions)?;
    let mut flat_indices = Vec::with_capacity(raw.len() / num_dims);
    for row in raw.chunks(num_dims) {
        let mut flat = 0i64;
        for (j, &a) in row.iter().enumerate() {
            flat += check_action(a, j, sizes[j])? * strides[j] as i64;
        }
        flat_indices.push(flat);
    }

    Ok(gather_rows(q_values, flat_indices, row_len).reshape(outer))
}

fn check_outer(what: &str, got: &[usize], expected: &[usize]) -> Result<()> {
    if got != expected {
        return Err(UtilsError::shape(
            format!("{} outer dimensions", what),
            expected,
            got,
        ));
    }
    Ok(())
}

fn check_action(action: i64, dim: usize, num_actions: usize) -> Result<i64> {
    if action < 0 || action >= num_actions as i64 {
        return Err(UtilsError::ActionOutOfRange {
            action,
            dim,
            num_actions,
        });
    }
    Ok(action)
}

/// Flatten to `[rows, row_len]` and gather one column per row.
fn gather_rows<B: Backend, const D: usize>(
    q_values: Tensor<B, D>,
    flat_indices: Vec<i64>,
    row_len: usize,
) -> Tensor<B, 1> {
    let device = q_values.device();
    let rows = flat_indices.len();
    let table: Tensor<B, 2> = q_values.reshape([rows, row_len]);
    let indices: Tensor<B, 2, Int> =
        Tensor::<B, 1, Int>::from_ints(flat_indices.as_slice(), &device).reshape([rows, 1]);
    table.gather(1, indices).reshape([rows])
}
