//! Single-slot snapshot cache.
//!
//! # Broadcast Channel Behavior
//!
//! Every successful [`SnapshotCache::replace`] is broadcast to all
//! subscribers. Key characteristics:
//!
//! - **Buffer size**: configurable (default: 100)
//! - **Message loss**: if a subscriber falls behind and the buffer fills,
//!   its oldest pending snapshots are dropped
//! - **No blocking**: a slow subscriber never blocks a writer
//!
//! Each subscriber observes replacements in installation order; the send
//! happens while the write lock is held, so two racing writers cannot
//! deliver notifications in an order different from the installs.

use std::sync::RwLock;

use tokio::sync::broadcast;

use verdure_types::Snapshot;

/// Default broadcast buffer size.
pub const DEFAULT_BROADCAST_BUFFER: usize = 100;

/// Holds the one currently displayed [`Snapshot`].
///
/// The acquisition loop and the history selector are the only writers;
/// everything else reads. Snapshots are installed wholesale — a reader
/// sees either the fully-old or the fully-new value, never a mix of
/// fields, and the last replace wins.
pub struct SnapshotCache {
    current: RwLock<Snapshot>,
    updates_tx: broadcast::Sender<Snapshot>,
}

impl SnapshotCache {
    /// Create a cache with the default broadcast buffer.
    ///
    /// Initial state: every metric unavailable, scope live.
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BROADCAST_BUFFER)
    }

    /// Create a cache with an explicit broadcast buffer size.
    pub fn with_buffer(buffer: usize) -> Self {
        let (updates_tx, _) = broadcast::channel(buffer);
        Self {
            current: RwLock::new(Snapshot::default()),
            updates_tx,
        }
    }

    /// Atomically install `snapshot` as current and notify subscribers.
    pub fn replace(&self, snapshot: Snapshot) {
        // Snapshot is Copy; nothing in this critical section can panic,
        // so the lock cannot be poisoned by a writer.
        let mut current = self.current.write().unwrap();
        *current = snapshot;
        let _ = self.updates_tx.send(snapshot);
    }

    /// The currently installed snapshot.
    pub fn current(&self) -> Snapshot {
        *self.current.read().unwrap()
    }

    /// Subscribe to snapshot replacements.
    ///
    /// The receiver sees every replace made after this call, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.updates_tx.subscribe()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use verdure_types::{CalendarDate, MetricValue, Reading, SnapshotScope};

    fn uniform_reading(value: f64) -> Reading {
        Reading {
            ambient_temp: MetricValue::Value(value),
            water_temp: MetricValue::Value(value),
            ph: MetricValue::Value(value),
            ec: MetricValue::Value(value),
            lux_top: MetricValue::Value(value),
            lux_bottom: MetricValue::Value(value),
        }
    }

    #[test]
    fn test_initial_state_is_unavailable_live() {
        let cache = SnapshotCache::new();
        let snapshot = cache.current();
        assert!(snapshot.reading.is_unavailable());
        assert_eq!(snapshot.scope, SnapshotScope::Live);
    }

    #[test]
    fn test_replace_installs_wholesale() {
        let cache = SnapshotCache::new();
        let date = CalendarDate::new(2024, 3, 1).unwrap();

        cache.replace(Snapshot::as_of(uniform_reading(6.1), date));

        let snapshot = cache.current();
        assert_eq!(snapshot.reading, uniform_reading(6.1));
        assert_eq!(snapshot.scope, SnapshotScope::AsOf { date });
    }

    #[test]
    fn test_last_replace_wins() {
        let cache = SnapshotCache::new();
        cache.replace(Snapshot::live(uniform_reading(1.0)));
        cache.replace(Snapshot::live(uniform_reading(2.0)));
        assert_eq!(cache.current().reading, uniform_reading(2.0));
    }

    #[tokio::test]
    async fn test_subscribers_observe_replacements_in_order() {
        let cache = SnapshotCache::new();
        let mut rx = cache.subscribe();

        cache.replace(Snapshot::live(uniform_reading(1.0)));
        cache.replace(Snapshot::live(uniform_reading(2.0)));

        assert_eq!(rx.recv().await.unwrap().reading, uniform_reading(1.0));
        assert_eq!(rx.recv().await.unwrap().reading, uniform_reading(2.0));
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_get_every_replacement() {
        let cache = SnapshotCache::new();
        let mut rx1 = cache.subscribe();
        let mut rx2 = cache.subscribe();

        cache.replace(Snapshot::live(uniform_reading(3.0)));

        assert_eq!(rx1.recv().await.unwrap().reading, uniform_reading(3.0));
        assert_eq!(rx2.recv().await.unwrap().reading, uniform_reading(3.0));
    }

    #[test]
    fn test_slow_subscriber_never_blocks_writers() {
        let cache = SnapshotCache::with_buffer(4);
        let mut rx = cache.subscribe();

        // Far more replacements than the buffer holds; none of them block.
        for i in 0..64 {
            cache.replace(Snapshot::live(uniform_reading(i as f64)));
        }

        // The receiver lags rather than stalling the writer.
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(_))
        ));
        assert_eq!(cache.current().reading, uniform_reading(63.0));
    }

    #[test]
    fn test_concurrent_replaces_never_produce_a_hybrid() {
        let cache = Arc::new(SnapshotCache::new());

        std::thread::scope(|scope| {
            for i in 0..16u32 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for _ in 0..100 {
                        cache.replace(Snapshot::live(uniform_reading(f64::from(i))));
                    }
                });
            }
        });

        // The final snapshot must be exactly one of the installed
        // readings: all six fields equal, never fields from two writers.
        let reading = cache.current().reading;
        let first = reading.ambient_temp;
        for (_, value) in reading.metrics() {
            assert_eq!(value, first);
        }
    }
}
