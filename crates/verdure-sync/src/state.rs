//! Application state shared across components.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::debug;

use verdure_store::Store;
use verdure_types::Snapshot;

use crate::availability::AvailabilityIndex;
use crate::cache::SnapshotCache;
use crate::config::Config;

/// Number of plant positions on a cultivation unit.
pub const UNIT_COUNT: u8 = 6;

/// Shared application state.
///
/// One instance per process, created at startup and injected into every
/// component that needs it — the acquisition loop, the history selector,
/// and the presentation layer all see the same snapshot cache and
/// availability index.
pub struct AppState {
    /// The data store (shared handle, serialized access).
    pub store: Arc<Mutex<Store>>,
    /// Configuration (RwLock for runtime updates).
    pub config: RwLock<Config>,
    /// The single-slot snapshot cache.
    pub snapshot: SnapshotCache,
    /// Calendar days known to have data.
    pub availability: AvailabilityIndex,
    /// Acquisition loop control state.
    pub collector: CollectorState,
    /// Which plant position is selected (1-based).
    selected_unit: AtomicU8,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        let buffer = config.acquisition.broadcast_buffer;
        Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
            config: RwLock::new(config),
            snapshot: SnapshotCache::with_buffer(buffer),
            availability: AvailabilityIndex::new(),
            collector: CollectorState::new(),
            selected_unit: AtomicU8::new(1),
        })
    }

    /// Prime the snapshot cache and availability index at startup.
    ///
    /// Installs the latest stored reading (or the all-unavailable one for
    /// an empty store) and populates the availability index, so the
    /// presentation layer has something to show before the first
    /// acquisition tick.
    pub async fn prime(&self) -> verdure_store::Result<()> {
        let reading = {
            let store = self.store.lock().await;
            let reading = store.latest_reading()?;
            self.availability.refresh(&store)?;
            reading
        };

        self.snapshot.replace(Snapshot::live(reading));
        debug!("State primed from store");
        Ok(())
    }

    /// The selected plant position (1-based).
    pub fn selected_unit(&self) -> u8 {
        self.selected_unit.load(Ordering::SeqCst)
    }

    /// Select a plant position; out-of-range values are clamped to
    /// 1..=[`UNIT_COUNT`].
    pub fn set_selected_unit(&self, unit: u8) {
        self.selected_unit
            .store(unit.clamp(1, UNIT_COUNT), Ordering::SeqCst);
    }
}

/// State for tracking and controlling the acquisition loop.
pub struct CollectorState {
    /// Whether the loop is currently running.
    running: AtomicBool,
    /// When the loop was started (Unix timestamp).
    started_at: AtomicU64,
    /// Channel to signal the loop to stop.
    stop_tx: watch::Sender<bool>,
    /// Receiver for stop signal (cloned by the loop task).
    stop_rx: watch::Receiver<bool>,
    /// Poll statistics.
    pub stats: RwLock<PollStats>,
}

impl CollectorState {
    /// Create a new collector state.
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            stop_tx,
            stop_rx,
            stats: RwLock::new(PollStats::default()),
        }
    }

    /// Check if the loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the loop as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the loop start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    /// Get a receiver for the stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal the loop to stop after its in-flight cycle.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Reset the stop signal (for restarting).
    pub fn reset_stop(&self) {
        let _ = self.stop_tx.send(false);
    }

    /// Record a successful poll.
    pub async fn record_success(&self) {
        let mut stats = self.stats.write().await;
        stats.success_count += 1;
        stats.last_poll_at = Some(OffsetDateTime::now_utc());
    }

    /// Record a failed poll.
    pub async fn record_failure(&self, error: impl ToString) {
        let mut stats = self.stats.write().await;
        stats.failure_count += 1;
        stats.last_error_at = Some(OffsetDateTime::now_utc());
        stats.last_error = Some(error.to_string());
    }
}

impl Default for CollectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Acquisition loop statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PollStats {
    /// Time of last successful poll.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_poll_at: Option<OffsetDateTime>,
    /// Time of last failed poll.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total successful polls.
    pub success_count: u64,
    /// Total failed polls.
    pub failure_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use verdure_types::{CalendarDate, MetricValue, Reading, SnapshotScope};

    #[tokio::test]
    async fn test_app_state_new() {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, Config::default());

        assert!(state.snapshot.current().reading.is_unavailable());
        assert!(state.availability.is_empty());
        assert_eq!(state.selected_unit(), 1);
        assert!(!state.collector.is_running());
    }

    #[tokio::test]
    async fn test_prime_installs_latest_and_availability() {
        let store = Store::open_in_memory().unwrap();
        let reading = Reading {
            ambient_temp: MetricValue::Value(24.5),
            ..Reading::unavailable()
        };
        store
            .insert_reading(&reading, datetime!(2024-03-01 12:00:00 UTC))
            .unwrap();

        let state = AppState::new(store, Config::default());
        state.prime().await.unwrap();

        let snapshot = state.snapshot.current();
        assert_eq!(snapshot.reading, reading);
        assert_eq!(snapshot.scope, SnapshotScope::Live);
        assert!(
            state
                .availability
                .contains(CalendarDate::new(2024, 3, 1).unwrap())
        );
    }

    #[tokio::test]
    async fn test_prime_on_empty_store_is_unavailable() {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, Config::default());

        state.prime().await.unwrap();

        assert!(state.snapshot.current().reading.is_unavailable());
        assert!(state.availability.is_empty());
    }

    #[test]
    fn test_selected_unit_clamps_to_range() {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, Config::default());

        state.set_selected_unit(4);
        assert_eq!(state.selected_unit(), 4);

        state.set_selected_unit(0);
        assert_eq!(state.selected_unit(), 1);

        state.set_selected_unit(200);
        assert_eq!(state.selected_unit(), UNIT_COUNT);
    }

    #[test]
    fn test_collector_state() {
        let collector = CollectorState::new();
        assert!(!collector.is_running());
        assert!(collector.started_at().is_none());

        collector.set_running(true);
        assert!(collector.is_running());
        assert!(collector.started_at().is_some());

        collector.set_running(false);
        assert!(!collector.is_running());
    }

    #[test]
    fn test_collector_state_stop_and_reset() {
        let collector = CollectorState::new();
        let rx = collector.subscribe_stop();

        assert!(!*rx.borrow());

        collector.signal_stop();
        assert!(*rx.borrow());

        collector.reset_stop();
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn test_poll_stats_recording() {
        let collector = CollectorState::new();

        collector.record_success().await;
        collector.record_success().await;
        collector.record_failure("sensor offline").await;

        let stats = collector.stats.read().await;
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.failure_count, 1);
        assert_eq!(stats.last_error.as_deref(), Some("sensor offline"));
        assert!(stats.last_poll_at.is_some());
        assert!(stats.last_error_at.is_some());
    }
}
