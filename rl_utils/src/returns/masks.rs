//! Episode masks.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ops::{from_f32_vec, to_f32_vec};

/// Position of a time step within its episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i64)]
pub enum StepType {
    /// First step of an episode.
    First = 0,
    /// Any step between the first and the last.
    Mid = 1,
    /// Final step of an episode.
    Last = 2,
}

impl StepType {
    /// Integer encoding used in step-type tensors.
    pub fn as_int(self) -> i64 {
        self as i64
    }

    /// Encode a sequence of step types as an int tensor.
    pub fn to_tensor<B: Backend>(steps: &[StepType], device: &B::Device) -> Tensor<B, 1, Int> {
        let encoded: Vec<i64> = steps.iter().map(|s| s.as_int()).collect();
        Tensor::<B, 1, Int>::from_ints(encoded.as_slice(), device)
    }
}

/// Mask that is 0.0 on final steps and 1.0 elsewhere.
pub fn episode_mask<B: Backend, const D: usize>(step_types: Tensor<B, D, Int>) -> Tensor<B, D> {
    step_types.not_equal_elem(StepType::Last.as_int()).float()
}

/// Mask keeping only the first contiguous sub-episode of each row.
///
/// `next_discounts` is `[batch_size, total_steps]`, the environment discount of
/// each next time step; a discount of 0 marks an episode end. Each output row
/// has the form `[1.0] * a + [0.0] * b` with `a >= 1`: ones up to and including
/// the first episode end, zeros after it.
pub fn contiguous_sub_episodes<B: Backend>(next_discounts: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
    let dims = next_discounts.dims();
    let [_, total_steps] = dims;
    let device = next_discounts.device();
    if total_steps == 0 {
        return Ok(next_discounts);
    }

    let discounts = to_f32_vec(next_discounts)?;
    let mut mask = Vec::with_capacity(discounts.len());
    for row in discounts.chunks(total_steps) {
        // Exclusive cumulative product of "not an episode end".
        let mut running = 1.0f32;
        for &d in row {
            mask.push(running);
            if d == 0.0 {
                running = 0.0;
            }
        }
    }
    Ok(from_f32_vec::<B, 2>(mask, dims, &device))
}
