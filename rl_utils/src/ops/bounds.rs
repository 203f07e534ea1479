//! Bounded action specs: clipping and scaling into `[minimum, maximum]`.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UtilsError};

/// Shape and per-element bounds of a continuous action.
///
/// Bounds are either scalars (one value shared by every element) or one value
/// per element of `shape`, in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedSpec {
    shape: Vec<usize>,
    minimum: Vec<f32>,
    maximum: Vec<f32>,
}

impl BoundedSpec {
    /// Create a spec with per-element (or scalar) bounds.
    pub fn new(shape: Vec<usize>, minimum: Vec<f32>, maximum: Vec<f32>) -> Result<Self> {
        let n: usize = shape.iter().product();
        for (name, bound) in [("minimum", &minimum), ("maximum", &maximum)] {
            if bound.len() != 1 && bound.len() != n {
                return Err(UtilsError::invalid(
                    name,
                    format!("expected 1 or {} values, got {}", n, bound.len()),
                ));
            }
            if bound.iter().any(|b| b.is_nan()) {
                return Err(UtilsError::invalid("bounds", "NaN bound"));
            }
        }

        let spec = Self {
            shape,
            minimum,
            maximum,
        };
        for i in 0..n {
            if spec.min_at(i) > spec.max_at(i) {
                return Err(UtilsError::invalid(
                    "bounds",
                    format!(
                        "minimum {} exceeds maximum {} at element {}",
                        spec.min_at(i),
                        spec.max_at(i),
                        i
                    ),
                ));
            }
        }
        Ok(spec)
    }

    /// Create a spec with the same bounds for every element.
    pub fn uniform(shape: Vec<usize>, minimum: f32, maximum: f32) -> Result<Self> {
        Self::new(shape, vec![minimum], vec![maximum])
    }

    /// Spec shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements in one action.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    fn min_at(&self, i: usize) -> f32 {
        if self.minimum.len() == 1 {
            self.minimum[0]
        } else {
            self.minimum[i]
        }
    }

    fn max_at(&self, i: usize) -> f32 {
        if self.maximum.len() == 1 {
            self.maximum[0]
        } else {
            self.maximum[i]
        }
    }

    /// Lower bounds expanded to one value per element.
    pub fn minimum(&self) -> Vec<f32> {
        (0..self.num_elements()).map(|i| self.min_at(i)).collect()
    }

    /// Upper bounds expanded to one value per element.
    pub fn maximum(&self) -> Vec<f32> {
        (0..self.num_elements()).map(|i| self.max_at(i)).collect()
    }

    fn bound_rows<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let n = self.num_elements();
        let low = Tensor::<B, 1>::from_floats(self.minimum().as_slice(), device).reshape([1, n]);
        let high = Tensor::<B, 1>::from_floats(self.maximum().as_slice(), device).reshape([1, n]);
        (low, high)
    }

    fn check_batch(&self, dims: [usize; 2]) -> Result<()> {
        if dims[1] != self.num_elements() {
            return Err(UtilsError::shape(
                "flattened action",
                &[dims[0], self.num_elements()],
                &dims,
            ));
        }
        Ok(())
    }
}

/// Clip a `[batch, n]` batch of flattened actions into the bounds of `spec`.
pub fn clip_to_spec<B: Backend>(value: Tensor<B, 2>, spec: &BoundedSpec) -> Result<Tensor<B, 2>> {
    let dims = value.dims();
    spec.check_batch(dims)?;

    let (low, high) = spec.bound_rows::<B>(&value.device());
    let low = low.repeat_dim(0, dims[0]);
    let high = high.repeat_dim(0, dims[0]);
    Ok(value.max_pair(low).min_pair(high))
}

/// Map a `[batch, n]` batch with values in `[-1, 1]` onto the bounds of `spec`.
///
/// `out = (max + min) / 2 + (max - min) / 2 * tensor`
pub fn scale_to_spec<B: Backend>(tensor: Tensor<B, 2>, spec: &BoundedSpec) -> Result<Tensor<B, 2>> {
    let dims = tensor.dims();
    spec.check_batch(dims)?;

    let (low, high) = spec.bound_rows::<B>(&tensor.device());
    let means = (high.clone() + low.clone()).div_scalar(2.0).repeat_dim(0, dims[0]);
    let magnitudes = (high - low).div_scalar(2.0).repeat_dim(0, dims[0]);
    Ok(means + magnitudes * tensor)
}
