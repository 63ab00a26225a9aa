//! User-driven historical date selection.

use std::sync::Arc;

use tracing::info;

use verdure_types::{CalendarDate, Reading, Snapshot};

use crate::state::AppState;

/// Errors from a historical date selection.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The date has no recorded data; no query was issued and the
    /// snapshot cache was left unchanged. Ask for a different date.
    #[error("No data recorded for {0}")]
    NoDataForDate(CalendarDate),

    /// The lookup failed; the snapshot cache was left unchanged so the
    /// display keeps the last good value.
    #[error("Failed to load reading: {0}")]
    Storage(#[from] verdure_store::Error),
}

/// Handles date selections from the presentation layer.
///
/// Runs on whatever task issues the request; callers on a UI-facing
/// thread should spawn the future rather than block on it.
pub struct HistorySelector {
    state: Arc<AppState>,
}

impl HistorySelector {
    /// Create a selector over the shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Pin the snapshot cache to the reading recorded on `date`.
    ///
    /// The date is validated against the availability index first; a day
    /// without data is rejected before any query is issued. On success
    /// the cache is replaced with the day's most recent reading, scoped
    /// [`AsOf`](verdure_types::SnapshotScope::AsOf), and subscribers are
    /// notified. The pin lasts until the acquisition loop's next live
    /// publish.
    pub async fn select_date(&self, date: CalendarDate) -> Result<Reading, HistoryError> {
        if !self.state.availability.contains(date) {
            return Err(HistoryError::NoDataForDate(date));
        }

        let reading = {
            let store = self.state.store.lock().await;
            store.reading_on(date)?
        };

        self.state.snapshot.replace(Snapshot::as_of(reading, date));
        info!("Snapshot pinned to {}", date);
        Ok(reading)
    }
}
