//! Relay - in-process publish/subscribe event dispatcher

pub mod listener;
pub mod pattern;
pub mod registry;

pub use listener::{callback, Callback, ExecutionLimit, Listener};
pub use pattern::{is_pattern, EventPattern, PatternError};
pub use registry::EventRegistry;
