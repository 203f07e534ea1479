//! Tensor operations: action indexing, spec bounds, and small helpers.

pub mod bounds;
pub mod indexing;
pub mod tensor;


pub use bounds::{clip_to_spec, scale_to_spec, BoundedSpec};
pub use indexing::{index_with_actions, index_with_multi_dim_actions};
pub use tensor::{
    convert_q_logits_to_values, element_wise_huber_loss, element_wise_squared_loss, replicate,
};

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::error::{Result, UtilsError};

/// Read a float tensor back to the host as `f32`.
pub(crate) fn to_f32_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| UtilsError::Data(format!("{:?}", e)))
}

/// Read an int tensor back to the host as `i64`.
pub(crate) fn to_i64_vec<B: Backend, const D: usize>(
    tensor: Tensor<B, D, Int>,
) -> Result<Vec<i64>> {
    tensor
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| UtilsError::Data(format!("{:?}", e)))
}

/// Build a float tensor of shape `dims` from row-major host values.
pub(crate) fn from_f32_vec<B: Backend, const D: usize>(
    values: Vec<f32>,
    dims: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    Tensor::<B, 1>::from_floats(values.as_slice(), device).reshape(dims)
}
