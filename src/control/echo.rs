//! Recognition of the feed's echoes of our own writes.

use crate::core::{SignalPath, SignalValue};
use std::collections::{HashMap, VecDeque};

/// Outstanding echoes kept per path before the oldest is forgotten.
const MAX_OUTSTANDING: usize = 32;

/// Values this controller committed that the live feed has not yet echoed.
///
/// An echo older than a newer local write must not overwrite it, otherwise
/// a lagging feed briefly rolls the cache back to a stale value.
#[derive(Debug, Default)]
pub struct EchoTracker {
    pending: HashMap<SignalPath, VecDeque<SignalValue>>,
}

impl EchoTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a value successfully written to the store.
    pub fn expect(&mut self, path: SignalPath, value: SignalValue) {
        let queue = self.pending.entry(path).or_default();
        if queue.len() == MAX_OUTSTANDING {
            queue.pop_front();
        }
        queue.push_back(value);
    }

    /// Decide whether a feed value should reach the cache.
    ///
    /// Returns `false` only for an echo superseded by a newer local write.
    /// Anything that does not match the oldest outstanding echo is treated
    /// as an external change and clears the path's outstanding echoes.
    pub fn should_apply(&mut self, path: SignalPath, value: &SignalValue) -> bool {
        let Some(queue) = self.pending.get_mut(&path) else {
            return true;
        };
        if queue.front() != Some(value) {
            self.pending.remove(&path);
            return true;
        }
        queue.pop_front();
        if queue.is_empty() {
            self.pending.remove(&path);
            return true;
        }
        false
    }

    pub fn outstanding(&self, path: SignalPath) -> usize {
        self.pending.get(&path).map_or(0, VecDeque::len)
    }
}
