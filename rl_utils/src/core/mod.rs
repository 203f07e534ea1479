//! Counters, periodic triggers and target-network updates.

pub mod counter;
pub mod periodic;
pub mod target_network;

pub use counter::{create_counter, join_scope, Counter, NameScope, SharedCounter};
pub use periodic::{periodically, Periodically};
pub use target_network::{
    hard_copy, soft_update, soft_variables_update, NamedVariable, TargetUpdater,
    TargetUpdaterConfig,
};
