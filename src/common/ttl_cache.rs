// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent map whose entries expire a fixed `ttl` after insertion.
///
/// Expired entries are dropped lazily on lookup and swept when the map grows
/// to the sweep mark. After a sweep the mark moves to twice the surviving
/// size (never below `sweep_threshold`). Concurrent inserts for the same key
/// are last-write-wins.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
    sweep_threshold: usize,
    next_sweep_at: AtomicUsize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_sweep_threshold(ttl, 4_096)
    }

    pub fn with_sweep_threshold(ttl: Duration, sweep_threshold: usize) -> Self {
        let sweep_threshold = sweep_threshold.max(1);
        Self {
            entries: DashMap::new(),
            ttl,
            sweep_threshold,
            next_sweep_at: AtomicUsize::new(sweep_threshold),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
        }
        self.entries
            .remove_if(key, |_, e| e.inserted_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if self.entries.len() >= self.next_sweep_at.load(Ordering::Relaxed) {
            self.purge_expired();
            let mark = self
                .entries
                .len()
                .saturating_mul(2)
                .max(self.sweep_threshold);
            self.next_sweep_at.store(mark, Ordering::Relaxed);
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
