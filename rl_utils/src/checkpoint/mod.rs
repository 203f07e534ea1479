//! Model checkpointing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rl_utils::checkpoint::{Checkpointer, CheckpointerConfig};
//!
//! let config = CheckpointerConfig::new("./checkpoints").with_max_to_keep(5);
//! let mut checkpointer = Checkpointer::new(config)?;
//!
//! // Resume if a previous run left a checkpoint behind.
//! let (model, start) = checkpointer.initialize_or_restore(Model::new(&device), &device)?;
//!
//! // In training loop:
//! checkpointer.save(&model, step)?;
//! ```

pub mod checkpointer;

pub use checkpointer::{CheckpointInfo, Checkpointer, CheckpointerConfig};
