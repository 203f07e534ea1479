//! Exploration noise processes.

pub mod ou_process;

pub use ou_process::{ornstein_uhlenbeck_process, OUConfig, OUProcess};
