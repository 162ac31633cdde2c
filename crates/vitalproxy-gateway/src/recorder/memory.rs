//! Bounded in-memory metric buffer (fallback tier).
//!
//! FIFO eviction: once `capacity` is exceeded the oldest inserted entry is
//! dropped. A std mutex guards the deque; it is never held across an await.

use std::collections::VecDeque;
use std::sync::Mutex;

use vitalproxy_core::domain::{sort_newest_first, Metric};

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug)]
pub struct MemoryMetricStore {
    capacity: usize,
    inner: Mutex<VecDeque<Metric>>,
}

impl MemoryMetricStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append, evicting the oldest entries beyond capacity.
    /// Returns false only if the lock is poisoned (the metric is dropped).
    pub fn push(&self, metric: Metric) -> bool {
        let Ok(mut buf) = self.inner.lock() else {
            return false;
        };
        buf.push_back(metric);
        while buf.len() > self.capacity {
            buf.pop_front();
        }
        true
    }

    /// Snapshot ordered newest-first by timestamp; equal timestamps keep
    /// most-recent-insertion first.
    pub fn list(&self) -> Vec<Metric> {
        let mut out: Vec<Metric> = match self.inner.lock() {
            Ok(buf) => buf.iter().rev().cloned().collect(),
            Err(_) => return Vec::new(),
        };
        sort_newest_first(&mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryMetricStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
