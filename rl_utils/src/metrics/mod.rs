//! Tensor summaries.
//!
//! [`generate_tensor_summaries`] reduces a tensor to a [`TensorSummary`]
//! (mean, mean absolute value, max, min, histogram) and reports it through
//! the `log` facade.

pub mod summary;

pub use summary::{generate_tensor_summaries, HistogramBucket, TensorSummary, DEFAULT_BUCKET_COUNT};
