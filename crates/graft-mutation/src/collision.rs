//! Serial submission of mutations that share a collision key.
//!
//! A sender holding a [`CollisionQueue`] pushes every mutation it is asked to
//! send, takes whatever is ready, and reports completion per key:
//!
//! - mutations with the same key go out one at a time, in push order;
//! - mutations without a key never wait.

use std::collections::{HashMap, HashSet, VecDeque};

/// Pending mutations grouped by collision key.
#[derive(Debug)]
pub struct CollisionQueue<T> {
    unkeyed: VecDeque<T>,
    keyed: HashMap<String, VecDeque<T>>,
    /// Keys appear here in the order they first received a mutation.
    key_order: Vec<String>,
    in_flight: HashSet<String>,
}

impl<T> Default for CollisionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CollisionQueue<T> {
    pub fn new() -> Self {
        Self {
            unkeyed: VecDeque::new(),
            keyed: HashMap::new(),
            key_order: Vec::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn push(&mut self, collision_key: Option<String>, mutation: T) {
        match collision_key {
            None => self.unkeyed.push_back(mutation),
            Some(key) => {
                if !self.keyed.contains_key(&key) {
                    self.key_order.push(key.clone());
                }
                self.keyed.entry(key).or_default().push_back(mutation);
            }
        }
    }

    /// Everything that may be sent now, marking keyed entries as in flight.
    pub fn take_ready(&mut self) -> Vec<(Option<String>, T)> {
        let mut ready: Vec<(Option<String>, T)> =
            self.unkeyed.drain(..).map(|mutation| (None, mutation)).collect();

        for key in &self.key_order {
            if self.in_flight.contains(key) {
                continue;
            }
            let Some(mutation) = self.keyed.get_mut(key).and_then(VecDeque::pop_front) else {
                continue;
            };
            self.in_flight.insert(key.clone());
            ready.push((Some(key.clone()), mutation));
        }

        self.prune();
        ready
    }

    /// The in-flight mutation for `collision_key` finished (either way).
    pub fn complete(&mut self, collision_key: &str) {
        if !self.in_flight.remove(collision_key) {
            tracing::warn!(
                collision_key,
                "Completed a collision key with nothing in flight"
            );
        }
        self.prune();
    }

    pub fn is_in_flight(&self, collision_key: &str) -> bool {
        self.in_flight.contains(collision_key)
    }

    /// Mutations not yet handed out.
    pub fn pending(&self) -> usize {
        self.unkeyed.len() + self.keyed.values().map(VecDeque::len).sum::<usize>()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0 && self.in_flight.is_empty()
    }

    fn prune(&mut self) {
        let in_flight = &self.in_flight;
        self.keyed
            .retain(|key, queue| !queue.is_empty() || in_flight.contains(key));
        let keyed = &self.keyed;
        self.key_order.retain(|key| keyed.contains_key(key));
    }
}
