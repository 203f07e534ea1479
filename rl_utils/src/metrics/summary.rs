//! Scalar and histogram summaries of a tensor.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UtilsError};
use crate::ops::to_f32_vec;

/// Number of histogram buckets.
pub const DEFAULT_BUCKET_COUNT: usize = 30;

/// One histogram bucket covering `[left, right)` (the last bucket is closed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub left: f32,
    pub right: f32,
    pub count: usize,
}

/// Summary statistics of a tensor, tagged with a name scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorSummary {
    /// Scope the summaries are reported under.
    pub tag: String,
    pub mean: f32,
    pub mean_abs: f32,
    pub max: f32,
    pub min: f32,
    pub histogram: Vec<HistogramBucket>,
}

impl TensorSummary {
    /// Total number of elements counted in the histogram.
    pub fn count(&self) -> usize {
        self.histogram.iter().map(|b| b.count).sum()
    }

    /// Scalar entries as `(tag/name, value)` pairs.
    pub fn scalars(&self) -> [(String, f32); 4] {
        [
            (format!("{}/mean", self.tag), self.mean),
            (format!("{}/mean_abs", self.tag), self.mean_abs),
            (format!("{}/max", self.tag), self.max),
            (format!("{}/min", self.tag), self.min),
        ]
    }
}

/// Compute mean, mean absolute value, max, min and a histogram of `tensor`
/// and log them at `info` under `tag`.
///
/// # Errors
///
/// `InvalidArgument` for an empty tensor.
pub fn generate_tensor_summaries<B: Backend, const D: usize>(
    tag: &str,
    tensor: Tensor<B, D>,
) -> Result<TensorSummary> {
    let values = to_f32_vec(tensor)?;
    let summary = summarize(tag, &values, DEFAULT_BUCKET_COUNT)?;

    log::info!(
        "{}: mean={:.6} mean_abs={:.6} max={:.6} min={:.6} count={}",
        summary.tag,
        summary.mean,
        summary.mean_abs,
        summary.max,
        summary.min,
        summary.count()
    );
    Ok(summary)
}

fn summarize(tag: &str, values: &[f32], bucket_count: usize) -> Result<TensorSummary> {
    if values.is_empty() {
        return Err(UtilsError::invalid("tensor", "cannot summarize an empty tensor"));
    }

    let n = values.len() as f64;
    let mean = (values.iter().map(|&v| v as f64).sum::<f64>() / n) as f32;
    let mean_abs = (values.iter().map(|&v| (v as f64).abs()).sum::<f64>() / n) as f32;
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);

    Ok(TensorSummary {
        tag: tag.to_string(),
        mean,
        mean_abs,
        max,
        min,
        histogram: histogram(values, min, max, bucket_count),
    })
}

fn histogram(values: &[f32], min: f32, max: f32, bucket_count: usize) -> Vec<HistogramBucket> {
    let range = max - min;
    if !range.is_finite() || range == 0.0 {
        return vec![HistogramBucket {
            left: min,
            right: max,
            count: values.len(),
        }];
    }

    let width = range / bucket_count as f32;
    let mut counts = vec![0usize; bucket_count];
    for &v in values {
        let index = (((v - min) / width) as usize).min(bucket_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBucket {
            left: min + width * i as f32,
            right: if i + 1 == bucket_count { max } else { min + width * (i + 1) as f32 },
            count,
        })
        .collect()
}
