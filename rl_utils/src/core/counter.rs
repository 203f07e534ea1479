//! Named step counters and scope names.
//!
//! Counters drive periodic triggers and global-step bookkeeping. Each counter
//! carries a name unique within the [`NameScope`] that created it, so several
//! triggers built in the same scope never collide (`counter`, `counter_1`, ...).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Join a parent and child scope with `/`, skipping empty parts.
///
/// ```
/// use rl_utils::core::join_scope;
///
/// assert_eq!(join_scope("agent", "critic"), "agent/critic");
/// assert_eq!(join_scope("", "critic"), "critic");
/// assert_eq!(join_scope("agent", ""), "agent");
/// ```
pub fn join_scope(parent_scope: &str, child_scope: &str) -> String {
    if parent_scope.is_empty() {
        return child_scope.to_string();
    }
    if child_scope.is_empty() {
        return parent_scope.to_string();
    }
    format!("{}/{}", parent_scope, child_scope)
}

/// Hands out names unique within one scope.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    prefix: String,
    used: HashMap<String, usize>,
}

impl NameScope {
    /// Create a scope rooted at `prefix` (may be empty).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            used: HashMap::new(),
        }
    }

    /// Scope prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Open a child scope. The child keeps its own name table.
    pub fn child(&self, name: &str) -> Self {
        Self::new(join_scope(&self.prefix, name))
    }

    /// Return `prefix/name`, suffixed with `_N` when `name` was already taken.
    pub fn unique_name(&mut self, name: &str) -> String {
        let count = self.used.entry(name.to_string()).or_insert(0);
        let local = if *count == 0 {
            name.to_string()
        } else {
            format!("{}_{}", name, count)
        };
        *count += 1;
        join_scope(&self.prefix, &local)
    }
}

/// Atomic, monotonically increasing integer counter.
///
/// Reset only by creating a new counter.
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicI64,
}

impl Counter {
    /// Create a counter starting at `initial_value`.
    pub fn new(name: impl Into<String>, initial_value: i64) -> Self {
        Self {
            name: name.into(),
            value: AtomicI64::new(initial_value),
        }
    }

    /// Counter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increment by one and return the new value.
    pub fn increment(&self) -> i64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current value without incrementing.
    pub fn current(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Shared counter (thread-safe reference).
pub type SharedCounter = Arc<Counter>;

/// Create a shared counter whose name is unique within `scope`.
pub fn create_counter(scope: &mut NameScope, name: &str, initial_value: i64) -> SharedCounter {
    Arc::new(Counter::new(scope.unique_name(name), initial_value))
}
