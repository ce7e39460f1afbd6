//! Chaos delivery for cellmesh testing
//!
//! Simulates an adversarial scheduler over many mailboxes:
//! - Random interleaving across lanes
//! - Duplication
//!
//! Items pushed on the same lane are always delivered in push order, the
//! same guarantee a single mpsc channel gives between one sender and one
//! receiver.

use std::collections::{BTreeMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chaos delivery configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ChaosConfig {
    /// Probability that the next delivery comes from a random lane
    /// instead of the lane holding the oldest item (0.0 - 1.0)
    pub reorder_prob: f64,
    /// Probability that a delivered item is queued again once (0.0 - 1.0)
    pub duplicate_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig::calm()
    }
}

impl ChaosConfig {
    /// Global FIFO delivery, no duplicates
    pub fn calm() -> Self {
        ChaosConfig {
            reorder_prob: 0.0,
            duplicate_prob: 0.0,
            seed: 42,
        }
    }

    /// Frequent interleaving, rare duplicates
    pub fn rough() -> Self {
        ChaosConfig {
            reorder_prob: 0.3,
            duplicate_prob: 0.02,
            seed: 42,
        }
    }

    /// Almost every delivery picks a random lane
    pub fn hostile() -> Self {
        ChaosConfig {
            reorder_prob: 0.9,
            duplicate_prob: 0.1,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Chaos delivery statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChaosStats {
    pub pushed: u64,
    pub delivered: u64,
    pub shuffled: u64,
    pub duplicated: u64,
}

impl ChaosStats {
    pub fn duplicate_rate(&self) -> f64 {
        if self.delivered == 0 {
            0.0
        } else {
            self.duplicated as f64 / self.delivered as f64
        }
    }
}

#[derive(Clone, Debug)]
struct Queued<T> {
    seq: u64,
    item: T,
    duplicate: bool,
}

/// Multi-lane delivery queue driven by a seeded RNG
///
/// Lanes live in a `BTreeMap` so that a given seed always produces the
/// same delivery order. Empty lanes are removed eagerly.
pub struct ChaosQueue<K, T> {
    config: ChaosConfig,
    rng: StdRng,
    lanes: BTreeMap<K, VecDeque<Queued<T>>>,
    next_seq: u64,
    stats: ChaosStats,
}

impl<K: Ord + Clone, T: Clone> ChaosQueue<K, T> {
    pub fn new(config: ChaosConfig) -> Self {
        ChaosQueue {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            lanes: BTreeMap::new(),
            next_seq: 0,
            stats: ChaosStats::default(),
        }
    }

    /// Queue an item at the back of `lane`
    pub fn push(&mut self, lane: K, item: T) {
        self.stats.pushed += 1;
        self.enqueue(lane, item, false);
    }

    /// Take the next item to deliver
    pub fn pop(&mut self) -> Option<(K, T)> {
        if self.lanes.is_empty() {
            return None;
        }

        let key = if self.rng.gen::<f64>() < self.config.reorder_prob {
            self.stats.shuffled += 1;
            let n = self.rng.gen_range(0..self.lanes.len());
            self.lanes.keys().nth(n).cloned()?
        } else {
            self.lanes
                .iter()
                .min_by_key(|(_, lane)| lane.front().map(|q| q.seq))
                .map(|(key, _)| key.clone())?
        };

        let lane = self.lanes.get_mut(&key)?;
        let queued = lane.pop_front()?;
        if lane.is_empty() {
            self.lanes.remove(&key);
        }

        // a duplicate is never duplicated again
        if !queued.duplicate && self.rng.gen::<f64>() < self.config.duplicate_prob {
            self.stats.duplicated += 1;
            self.enqueue(key.clone(), queued.item.clone(), true);
        }

        self.stats.delivered += 1;
        Some((key, queued.item))
    }

    /// Items waiting for delivery
    pub fn len(&self) -> usize {
        self.lanes.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    pub fn config(&self) -> &ChaosConfig {
        &self.config
    }

    fn enqueue(&mut self, lane: K, item: T, duplicate: bool) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.lanes.entry(lane).or_default().push_back(Queued {
            seq,
            item,
            duplicate,
        });
    }
}
