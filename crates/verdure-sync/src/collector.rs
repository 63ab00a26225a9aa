//! Background acquisition loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use verdure_types::Snapshot;

use crate::source::SensorSource;
use crate::state::AppState;

/// Background loop that periodically publishes a fresh reading into the
/// snapshot cache.
///
/// The loop runs independently of any consumer; consumers only ever
/// observe the cache. A failed cycle logs, keeps the previous snapshot
/// intact, and waits for the next scheduled tick — it never terminates
/// the loop. The stop signal lets an in-flight cycle finish before the
/// task exits.
pub struct Collector {
    state: Arc<AppState>,
    source: Arc<dyn SensorSource>,
}

impl Collector {
    /// Create a new collector over the given sensor source.
    pub fn new(state: Arc<AppState>, source: Arc<dyn SensorSource>) -> Self {
        Self { state, source }
    }

    /// Spawn the acquisition loop task.
    ///
    /// The first poll happens immediately, then once per configured
    /// interval. Returns the task handle; await it after
    /// [`CollectorState::signal_stop`](crate::state::CollectorState::signal_stop)
    /// for a clean shutdown.
    pub fn spawn(self) -> JoinHandle<()> {
        let Self { state, source } = self;
        state.collector.reset_stop();
        state.collector.set_running(true);
        tokio::spawn(run(state, source))
    }
}

async fn run(state: Arc<AppState>, source: Arc<dyn SensorSource>) {
    let poll_interval = state.config.read().await.acquisition.poll_interval;
    info!("Starting acquisition loop (interval: {}s)", poll_interval);

    let mut ticker = interval(Duration::from_secs(poll_interval));
    let mut stop_rx = state.collector.subscribe_stop();
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    break;
                }
                continue;
            }
        }

        match source.sample().await {
            Ok(reading) => {
                consecutive_failures = 0;
                state.snapshot.replace(Snapshot::live(reading));
                state.collector.record_success().await;
                debug!("Published live reading");
            }
            Err(e) => {
                consecutive_failures += 1;
                state.collector.record_failure(&e).await;
                if consecutive_failures <= 3 {
                    warn!("Failed to poll sensors: {} (attempt {})", e, consecutive_failures);
                } else if consecutive_failures == 4 {
                    error!(
                        "Failed to poll sensors after {} attempts, will continue trying silently",
                        consecutive_failures
                    );
                }
                // Keep the last good snapshot; try again next tick
            }
        }
    }

    state.collector.set_running(false);
    info!("Acquisition loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::time::{sleep, timeout};

    use verdure_store::Store;
    use verdure_types::{CalendarDate, MetricValue, Reading, SnapshotScope};

    use crate::config::Config;
    use crate::source::SourceError;

    struct StaticSource(Reading);

    #[async_trait]
    impl SensorSource for StaticSource {
        async fn sample(&self) -> Result<Reading, SourceError> {
            Ok(self.0)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SensorSource for FailingSource {
        async fn sample(&self) -> Result<Reading, SourceError> {
            Err(SourceError::Sensor("sensor offline".to_string()))
        }
    }

    /// Succeeds on the first call, fails on every call after that.
    struct FlakySource {
        reading: Reading,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SensorSource for FlakySource {
        async fn sample(&self) -> Result<Reading, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(self.reading)
            } else {
                Err(SourceError::Sensor("sensor offline".to_string()))
            }
        }
    }

    fn test_state() -> Arc<AppState> {
        let store = Store::open_in_memory().unwrap();
        AppState::new(store, Config::default())
    }

    fn test_reading() -> Reading {
        Reading {
            ambient_temp: MetricValue::Value(24.5),
            water_temp: MetricValue::Value(21.3),
            ..Reading::unavailable()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_collector_publishes_into_cache() {
        let state = test_state();
        let source = Arc::new(StaticSource(test_reading()));

        let handle = Collector::new(Arc::clone(&state), source).spawn();
        sleep(Duration::from_secs(1)).await;

        let snapshot = state.snapshot.current();
        assert_eq!(snapshot.reading, test_reading());
        assert_eq!(snapshot.scope, SnapshotScope::Live);
        assert!(state.collector.stats.read().await.success_count >= 1);

        state.collector.signal_stop();
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_snapshot_and_loop_alive() {
        let state = test_state();
        let before = Snapshot::live(test_reading());
        state.snapshot.replace(before);

        let handle = Collector::new(Arc::clone(&state), Arc::new(FailingSource)).spawn();

        // Several intervals' worth of failed cycles.
        sleep(Duration::from_secs(200)).await;

        assert_eq!(state.snapshot.current(), before);
        assert!(state.collector.is_running());

        let stats = state.collector.stats.read().await;
        assert!(stats.failure_count >= 3);
        assert_eq!(stats.success_count, 0);
        assert_eq!(stats.last_error.as_deref(), Some("Sensor failure: sensor offline"));
        drop(stats);

        state.collector.signal_stop();
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_good_reading_survives_later_failures() {
        let state = test_state();
        let source = Arc::new(FlakySource {
            reading: test_reading(),
            calls: AtomicU32::new(0),
        });

        let handle = Collector::new(Arc::clone(&state), source).spawn();
        sleep(Duration::from_secs(200)).await;

        // First cycle published; every failure after it left the value.
        assert_eq!(state.snapshot.current().reading, test_reading());

        let stats = state.collector.stats.read().await;
        assert_eq!(stats.success_count, 1);
        assert!(stats.failure_count >= 2);
        drop(stats);

        state.collector.signal_stop();
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_signal_terminates_cleanly() {
        let state = test_state();
        let handle = Collector::new(Arc::clone(&state), Arc::new(StaticSource(test_reading()))).spawn();

        sleep(Duration::from_secs(1)).await;
        assert!(state.collector.is_running());

        state.collector.signal_stop();
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(!state.collector.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_publish_overrides_pinned_date() {
        let state = test_state();
        let date = CalendarDate::new(2024, 3, 1).unwrap();
        state
            .snapshot
            .replace(Snapshot::as_of(Reading::unavailable(), date));

        let handle = Collector::new(Arc::clone(&state), Arc::new(StaticSource(test_reading()))).spawn();
        sleep(Duration::from_secs(1)).await;

        // The single display slot snaps back to live data.
        let snapshot = state.snapshot.current();
        assert_eq!(snapshot.scope, SnapshotScope::Live);
        assert_eq!(snapshot.reading, test_reading());

        state.collector.signal_stop();
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }
}
