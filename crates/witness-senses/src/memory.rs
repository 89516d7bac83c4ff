//! Per-observer perception memory.
//!
//! Each observer keeps an append-only log of what it perceived, bounded two
//! ways: at most `capacity` events, and nothing older than `window`. An
//! append prunes that observer's log against the new event's timestamp;
//! [`PerceptionLog::prune`] prunes every log against a clock the caller
//! supplies, so quiet observers forget too.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use witness_types::{EntityId, PerceptionEvent};

/// Default events retained per observer.
pub const DEFAULT_CAPACITY: usize = 64;

/// Default retention window in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 300;

/// Bounds for a [`PerceptionLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum events kept per observer.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Events older than this are dropped.
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
}

const fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

const fn default_window_secs() -> i64 {
    DEFAULT_WINDOW_SECS
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Bounded, time-windowed perception logs keyed by observer.
#[derive(Debug, Clone, Default)]
pub struct PerceptionLog {
    config: MemoryConfig,
    by_observer: BTreeMap<EntityId, VecDeque<PerceptionEvent>>,
}

impl PerceptionLog {
    /// An empty log with the given bounds.
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            by_observer: BTreeMap::new(),
        }
    }

    /// The bounds in force.
    pub const fn config(&self) -> MemoryConfig {
        self.config
    }

    fn window(&self) -> Duration {
        Duration::try_seconds(self.config.window_secs).unwrap_or(Duration::MAX)
    }

    /// Append an event to its observer's log, then prune that log.
    ///
    /// Returns how many older events were dropped.
    pub fn record(&mut self, event: PerceptionEvent) -> usize {
        let observer = event.observer;
        let now = event.timestamp;
        let window = self.window();
        let capacity = self.config.capacity;
        let log = self.by_observer.entry(observer).or_default();
        log.push_back(event);
        let dropped = prune_log(log, now, window, capacity);
        if dropped > 0 {
            tracing::debug!(%observer, dropped, retained = log.len(), "pruned perception memory");
        }
        dropped
    }

    /// Drop expired events from every log and forget empty observers.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let window = self.window();
        let capacity = self.config.capacity;
        let mut dropped: usize = 0;
        for log in self.by_observer.values_mut() {
            dropped = dropped.saturating_add(prune_log(log, now, window, capacity));
        }
        self.by_observer.retain(|_, log| !log.is_empty());
        dropped
    }

    /// Everything an observer still remembers, oldest first.
    pub fn events_for(&self, observer: EntityId) -> impl Iterator<Item = &PerceptionEvent> {
        self.by_observer.get(&observer).into_iter().flatten()
    }

    /// The most recent event an observer remembers.
    pub fn latest(&self, observer: EntityId) -> Option<&PerceptionEvent> {
        self.by_observer.get(&observer).and_then(VecDeque::back)
    }

    /// Number of events an observer remembers.
    pub fn len_for(&self, observer: EntityId) -> usize {
        self.by_observer.get(&observer).map_or(0, VecDeque::len)
    }

    /// Observers with at least one remembered event.
    pub fn observers(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.by_observer.keys().copied()
    }
}

fn prune_log(
    log: &mut VecDeque<PerceptionEvent>,
    now: DateTime<Utc>,
    window: Duration,
    capacity: usize,
) -> usize {
    let cutoff = now.checked_sub_signed(window);
    let mut dropped: usize = 0;
    while let Some(front) = log.front() {
        let expired = cutoff.is_some_and(|cutoff| front.timestamp < cutoff);
        if expired || log.len() > capacity {
            log.pop_front();
            dropped = dropped.saturating_add(1);
        } else {
            break;
        }
    }
    dropped
}
