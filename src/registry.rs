//! Listener registry and synchronous dispatch
//!
//! `EventRegistry` owns the map from event name to its ordered listener
//! sequence. Registration appends, dispatch walks the sequence in insertion
//! order, and limited listeners drop out once their execution budget is
//! used up.
//!
//! Dispatch uses snapshot semantics: listener bookkeeping (counting plus
//! removal of exhausted entries) happens under the lock before any callback
//! runs, and the lock is released during invocation. Callbacks may
//! therefore re-enter the registry freely:
//! - a listener detached mid-round still fires in that round
//! - a listener registered mid-round first fires in the next round
//! - a reentrant dispatch cannot double-fire a limited listener
//!
//! Panics inside a callback propagate to the dispatch caller and abort the
//! remainder of that round; there is no error isolation at this level.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::listener::{Callback, ExecutionLimit, Listener};
use crate::pattern::{is_pattern, EventPattern};

/// Registry of named events and their listeners.
///
/// Cheap to clone: clones share the same underlying map, so a callback can
/// capture a clone and mutate the registry it is being dispatched from.
#[derive(Clone, Default)]
pub struct EventRegistry {
    listeners: Arc<Mutex<HashMap<Arc<str>, Vec<Listener>>>>,
}

impl EventRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for `event`, creating the sequence if absent.
    ///
    /// Duplicate callbacks are tracked as independent entries. A limit of
    /// `AtMost(0)` can never fire and is dropped on the spot.
    pub fn register(&self, event: &str, callback: Callback, limit: ExecutionLimit) {
        if limit.is_spent_at(0) {
            debug!(event, "listener has zero execution budget, dropping");
            return;
        }
        let mut map = self.listeners.lock();
        let seq = map.entry(Arc::from(event)).or_default();
        seq.push(Listener::new(callback, limit));
        debug!(event, listeners = seq.len(), "listener registered");
    }

    /// Register a listener that fires exactly once.
    pub fn register_once(&self, event: &str, callback: Callback) {
        self.register(event, callback, ExecutionLimit::AtMost(1));
    }

    /// Register a listener that fires at most `executions` times.
    pub fn register_exactly(&self, executions: u64, event: &str, callback: Callback) {
        self.register(event, callback, ExecutionLimit::AtMost(executions));
    }

    /// Delete the entire sequence for `event`; later dispatches of the name
    /// are no-ops. Idempotent.
    pub fn unregister_event(&self, event: &str) {
        let removed = self.listeners.lock().remove(event);
        if let Some(seq) = removed {
            debug!(event, listeners = seq.len(), "event unregistered");
        }
    }

    /// Remove every listener on `event` whose callback is the same `Arc`
    /// allocation as `callback`. No-op when the event or callback is
    /// unknown; other listeners on the event are untouched.
    pub fn detach(&self, event: &str, callback: &Callback) {
        let mut map = self.listeners.lock();
        let Some(seq) = map.get_mut(event) else {
            return;
        };
        let before = seq.len();
        seq.retain(|listener| !Arc::ptr_eq(listener.callback(), callback));
        if seq.len() != before {
            debug!(event, detached = before - seq.len(), "listeners detached");
        }
    }

    /// Invoke every current listener for `event` in insertion order,
    /// passing `args`. Unknown names are silent no-ops; names containing
    /// `*` with no direct sequence dispatch by wildcard match over the
    /// registered names.
    pub fn dispatch(&self, event: &str, args: &[Value]) {
        self.dispatch_with(event, None, args);
    }

    /// Like [`dispatch`](Self::dispatch), but each callback receives
    /// `context` as its receiver argument. `None` behaves exactly like
    /// plain dispatch.
    pub fn dispatch_with(&self, event: &str, context: Option<&Value>, args: &[Value]) {
        let fired = self.snapshot_round(event);
        if fired.is_empty() {
            return;
        }
        debug!(event, listeners = fired.len(), "dispatching");
        for callback in fired {
            callback(context, args);
        }
    }

    /// Take one dispatch round under the lock: resolve target sequences,
    /// count an execution on every live listener, drop the exhausted ones,
    /// and return the callbacks to invoke.
    fn snapshot_round(&self, event: &str) -> Vec<Callback> {
        let mut map = self.listeners.lock();

        // A direct sequence wins, even one drained down to empty.
        if let Some(seq) = map.get_mut(event) {
            let mut fired = Vec::with_capacity(seq.len());
            collect_round(seq, &mut fired);
            return fired;
        }

        if !is_pattern(event) {
            return Vec::new();
        }

        let pattern = match EventPattern::parse(event) {
            Ok(pattern) => pattern,
            Err(err) => {
                debug!(event, error = %err, "wildcard dispatch with unparsable pattern");
                return Vec::new();
            }
        };

        // Invocation order across matched names is unspecified; within each
        // name it is insertion order.
        let matched: Vec<Arc<str>> = map
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect();

        let mut fired = Vec::new();
        for name in &matched {
            if let Some(seq) = map.get_mut(name.as_ref()) {
                collect_round(seq, &mut fired);
            }
        }
        fired
    }

    /// Live listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }

    /// Number of registered event names. Names whose sequences have drained
    /// to empty still count until explicitly unregistered.
    pub fn event_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// True when no event name is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Registered event names, in no particular order.
    pub fn event_names(&self) -> Vec<Arc<str>> {
        self.listeners.lock().keys().cloned().collect()
    }

    /// Drop every sequence and key.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }
}

/// Walk one sequence: count an execution on each listener, snapshot its
/// callback, then drop the entries that reached their limit.
fn collect_round(seq: &mut Vec<Listener>, fired: &mut Vec<Callback>) {
    for listener in seq.iter_mut() {
        listener.record_execution();
        fired.push(Arc::clone(listener.callback()));
    }
    seq.retain(|listener| !listener.is_exhausted());
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.event_count())
            .finish()
    }
}
