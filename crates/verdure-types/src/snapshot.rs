//! The snapshot published to consumers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::date::CalendarDate;
use crate::reading::Reading;

/// Which point in time a snapshot describes.
///
/// The display slot is shared between the live stream and historical
/// selections, so the mode travels with every snapshot instead of being an
/// implicit side effect: a background publish after a pinned date shows up
/// as a scope change from `AsOf` back to `Live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum SnapshotScope {
    /// The latest known values.
    Live,
    /// The values recorded on a user-selected past date.
    AsOf {
        /// The pinned calendar date.
        date: CalendarDate,
    },
}

impl SnapshotScope {
    /// Whether this snapshot is pinned to a past date.
    pub fn is_pinned(&self) -> bool {
        matches!(self, SnapshotScope::AsOf { .. })
    }
}

/// A reading together with its scope — the unit installed into the
/// snapshot cache and delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// The sensor values.
    pub reading: Reading,
    /// Live or pinned to a date.
    pub scope: SnapshotScope,
}

impl Snapshot {
    /// A live snapshot of the given reading.
    pub fn live(reading: Reading) -> Self {
        Self {
            reading,
            scope: SnapshotScope::Live,
        }
    }

    /// A snapshot pinned to a calendar date.
    pub fn as_of(reading: Reading, date: CalendarDate) -> Self {
        Self {
            reading,
            scope: SnapshotScope::AsOf { date },
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::live(Reading::unavailable())
    }
}
