//! Bounded memoisation of decision weight vectors.

use crate::weighting::ProbabilityWeighting;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Cache of decision weights keyed by `(losses, gains)`.
///
/// Holds at most `capacity` vectors and evicts the oldest entry first. A
/// vector is a pure function of its key, so eviction only costs recomputation.
#[derive(Debug)]
pub struct WeightCache {
    weighting: ProbabilityWeighting,
    capacity: usize,
    entries: HashMap<(usize, usize), Arc<[f64]>>,
    order: VecDeque<(usize, usize)>,
    hits: u64,
    misses: u64,
}

impl WeightCache {
    /// Create an empty cache; a zero capacity is raised to one.
    pub fn new(weighting: ProbabilityWeighting, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            weighting,
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Decision weights for `losses` and `gains`, computed on first use.
    pub fn get(&mut self, losses: usize, gains: usize) -> Arc<[f64]> {
        let key = (losses, gains);
        if let Some(weights) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(weights);
        }

        self.misses += 1;
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        let weights: Arc<[f64]> = self.weighting.decision_weights(losses, gains).into();
        self.entries.insert(key, Arc::clone(&weights));
        self.order.push_back(key);
        weights
    }

    /// Drop every cached vector.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of cached vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached vectors.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lookups served from the cache since construction.
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute since construction.
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
