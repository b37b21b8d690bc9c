//! Listener records and the callback type
//!
//! A `Listener` pairs a callback with its execution bookkeeping: how many
//! times it has fired so far, and how many times it may fire before the
//! registry drops it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Callback invoked on dispatch.
///
/// The leading `Option<&Value>` is the receiver bound by
/// [`dispatch_with`](crate::EventRegistry::dispatch_with) (`None` for plain
/// dispatch); the slice carries the dispatch arguments. The registry never
/// consumes a return value.
///
/// Callbacks are shared `Arc`s: the same allocation can be registered on
/// several events (or several times on one event) and later removed by
/// identity with [`detach`](crate::EventRegistry::detach).
pub type Callback = Arc<dyn Fn(Option<&Value>, &[Value]) + Send + Sync>;

/// Wrap a closure into a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(Option<&Value>, &[Value]) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// How many times a listener may fire before the registry removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionLimit {
    /// Fire on every dispatch until explicitly detached.
    Unlimited,
    /// Fire at most this many times, then drop out of the registry.
    AtMost(u64),
}

impl ExecutionLimit {
    /// True when a listener that has fired `executions` times has used up
    /// this limit. `AtMost(0)` is spent before it ever fires.
    pub fn is_spent_at(self, executions: u64) -> bool {
        match self {
            ExecutionLimit::Unlimited => false,
            ExecutionLimit::AtMost(n) => executions >= n,
        }
    }
}

/// A registered callback plus its execution bookkeeping.
pub struct Listener {
    callback: Callback,
    executions: u64,
    limit: ExecutionLimit,
}

impl Listener {
    pub(crate) fn new(callback: Callback, limit: ExecutionLimit) -> Self {
        Self {
            callback,
            executions: 0,
            limit,
        }
    }

    /// The shared callback handle.
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Times this listener has fired so far.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    /// The configured execution limit.
    pub fn limit(&self) -> ExecutionLimit {
        self.limit
    }

    /// Count one execution. The registry calls this before invoking the
    /// callback, so the counter already reflects the in-flight round.
    pub(crate) fn record_execution(&mut self) {
        self.executions += 1;
    }

    /// True once the execution count has reached the limit.
    pub fn is_exhausted(&self) -> bool {
        self.limit.is_spent_at(self.executions)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("executions", &self.executions)
            .field("limit", &self.limit)
            .finish()
    }
}
