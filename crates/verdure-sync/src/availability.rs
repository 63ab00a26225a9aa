//! Calendar-date availability index.

use std::collections::HashSet;
use std::sync::RwLock;

use tracing::info;

use verdure_store::Store;
use verdure_types::CalendarDate;

/// The set of calendar days known to have at least one stored reading.
///
/// Populated from the store at startup and on explicit [`refresh`]
/// calls; it is not updated incrementally when the acquisition loop
/// writes new rows, so callers that need the new day visible must
/// refresh. Historical queries are validated against this set before any
/// query is issued.
///
/// [`refresh`]: AvailabilityIndex::refresh
#[derive(Default)]
pub struct AvailabilityIndex {
    dates: RwLock<HashSet<CalendarDate>>,
}

impl AvailabilityIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-populate from the store, replacing the whole set at once.
    ///
    /// Readers never observe a partially rebuilt set: the new set is
    /// fetched first and swapped in under the write lock. On failure the
    /// previous set is left intact.
    pub fn refresh(&self, store: &Store) -> verdure_store::Result<()> {
        let fresh = store.dates_with_data()?;
        info!("Availability index refreshed: {} day(s) with data", fresh.len());
        *self.dates.write().unwrap() = fresh;
        Ok(())
    }

    /// Whether the given day has any recorded data.
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.dates.read().unwrap().contains(&date)
    }

    /// Number of days with data.
    pub fn len(&self) -> usize {
        self.dates.read().unwrap().len()
    }

    /// Whether no day has data.
    pub fn is_empty(&self) -> bool {
        self.dates.read().unwrap().is_empty()
    }

    /// Clone out the current set, for calendar rendering.
    pub fn dates(&self) -> HashSet<CalendarDate> {
        self.dates.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use verdure_types::Reading;

    #[test]
    fn test_empty_store_yields_empty_index() {
        let store = Store::open_in_memory().unwrap();
        let index = AvailabilityIndex::new();

        index.refresh(&store).unwrap();

        assert!(index.is_empty());
        assert!(!index.contains(CalendarDate::new(2024, 3, 1).unwrap()));
    }

    #[test]
    fn test_refresh_picks_up_stored_days() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reading(&Reading::unavailable(), datetime!(2024-03-01 12:00:00 UTC))
            .unwrap();

        let index = AvailabilityIndex::new();
        index.refresh(&store).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.contains(CalendarDate::new(2024, 3, 1).unwrap()));
        assert!(!index.contains(CalendarDate::new(2024, 3, 2).unwrap()));
    }

    #[test]
    fn test_refresh_replaces_the_whole_set() {
        let first = Store::open_in_memory().unwrap();
        first
            .insert_reading(&Reading::unavailable(), datetime!(2024-03-01 12:00:00 UTC))
            .unwrap();

        let second = Store::open_in_memory().unwrap();
        second
            .insert_reading(&Reading::unavailable(), datetime!(2024-04-15 12:00:00 UTC))
            .unwrap();

        let index = AvailabilityIndex::new();
        index.refresh(&first).unwrap();
        index.refresh(&second).unwrap();

        assert!(!index.contains(CalendarDate::new(2024, 3, 1).unwrap()));
        assert!(index.contains(CalendarDate::new(2024, 4, 15).unwrap()));
    }

    #[test]
    fn test_dates_clones_out_the_set() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reading(&Reading::unavailable(), datetime!(2024-03-01 12:00:00 UTC))
            .unwrap();

        let index = AvailabilityIndex::new();
        index.refresh(&store).unwrap();

        let dates = index.dates();
        assert_eq!(dates.len(), 1);
        assert!(dates.contains(&CalendarDate::new(2024, 3, 1).unwrap()));
    }
}
