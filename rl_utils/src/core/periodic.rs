//! Periodic execution of a callable.
//!
//! With `n` the number of times the trigger has been called, the body runs
//! when `n` is a positive multiple of the period. A period of `None` never
//! runs the body; a period of 1 runs it on every call without touching the
//! counter.
//!
//! # Usage
//!
//! ```ignore
//! let mut log_every_100 = periodically(|| log::info!("tick"), Some(100))?;
//! for _ in 0..1000 {
//!     log_every_100.call(); // body runs at calls 100, 200, ...
//! }
//! ```

use crate::core::counter::{create_counter, NameScope, SharedCounter};
use crate::error::{Result, UtilsError};

/// Runs `body` every `period` calls.
pub struct Periodically<F> {
    body: F,
    period: Option<u64>,
    counter: SharedCounter,
}

impl<T, F: FnMut() -> T> Periodically<F> {
    /// Create a trigger in the default `periodically` scope.
    pub fn new(body: F, period: Option<u64>) -> Result<Self> {
        Self::with_scope(body, period, &mut NameScope::new("periodically"))
    }

    /// Create a trigger whose counter is named within `scope`.
    pub fn with_scope(body: F, period: Option<u64>, scope: &mut NameScope) -> Result<Self> {
        if period == Some(0) {
            return Err(UtilsError::invalid("period", "must be positive"));
        }
        Ok(Self {
            body,
            period,
            counter: create_counter(scope, "counter", 0),
        })
    }

    /// Advance the trigger. Returns the body's output when it ran.
    pub fn call(&mut self) -> Option<T> {
        let period = self.period?;
        if period == 1 {
            return Some((self.body)());
        }

        let n = self.counter.increment();
        if n % period as i64 == 0 {
            log::debug!("{} fired at call {}", self.counter.name(), n);
            Some((self.body)())
        } else {
            None
        }
    }

    /// Configured period.
    pub fn period(&self) -> Option<u64> {
        self.period
    }

    /// Number of counted calls so far.
    pub fn calls(&self) -> i64 {
        self.counter.current()
    }

    /// Handle to the internal counter, e.g. for checkpointing it.
    pub fn counter(&self) -> &SharedCounter {
        &self.counter
    }
}

/// Build a [`Periodically`] trigger for `body`.
pub fn periodically<T, F: FnMut() -> T>(body: F, period: Option<u64>) -> Result<Periodically<F>> {
    Periodically::new(body, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_multiples_of_period() {
        let mut fired_at = Vec::new();
        let mut step = 0;
        let mut trigger = periodically(|| (), Some(3)).unwrap();
        for _ in 0..10 {
            step += 1;
            if trigger.call().is_some() {
                fired_at.push(step);
            }
        }
        assert_eq!(fired_at, vec![3, 6, 9]);
        assert_eq!(trigger.calls(), 10);
    }

    #[test]
    fn test_period_one_runs_every_call_without_counting() {
        let mut runs = 0;
        {
            let mut trigger = periodically(|| runs += 1, Some(1)).unwrap();
            for _ in 0..5 {
                assert!(trigger.call().is_some());
            }
            assert_eq!(trigger.calls(), 0);
        }
        assert_eq!(runs, 5);
    }

    #[test]
    fn test_period_none_never_runs() {
        let mut runs = 0;
        {
            let mut trigger = periodically(|| runs += 1, None).unwrap();
            for _ in 0..5 {
                assert!(trigger.call().is_none());
            }
            assert_eq!(trigger.calls(), 0);
        }
        assert_eq!(runs, 0);
    }

    #[test]
    fn test_period_zero_rejected() {
        assert!(periodically(|| (), Some(0)).is_err());
    }

    #[test]
    fn test_body_output_returned() {
        let mut value = 0;
        let mut trigger = periodically(
            || {
                value += 10;
                value
            },
            Some(2),
        )
        .unwrap();
        assert_eq!(trigger.call(), None);
        assert_eq!(trigger.call(), Some(10));
        assert_eq!(trigger.call(), None);
        assert_eq!(trigger.call(), Some(20));
    }

    #[test]
    fn test_scoped_counters_are_distinct() {
        let mut scope = NameScope::new("agent");
        let a = Periodically::with_scope(|| (), Some(2), &mut scope).unwrap();
        let b = Periodically::with_scope(|| (), Some(2), &mut scope).unwrap();
        assert_eq!(a.counter().name(), "agent/counter");
        assert_eq!(b.counter().name(), "agent/counter_1");
    }
}
