//! Background acquisition and snapshot synchronization for Verdure
//! cultivation units.
//!
//! This crate keeps an in-memory snapshot of a unit's sensor state in
//! sync with its persisted readings:
//!
//! - [`Collector`] polls a [`SensorSource`] on a fixed interval and
//!   publishes each fresh reading into the [`SnapshotCache`]
//! - [`HistorySelector`] pins the cache to a past date, validated
//!   against the [`AvailabilityIndex`]
//! - subscribers (the presentation layer) receive every cache
//!   replacement through a broadcast channel
//!
//! Both writers share the one cache slot: a live publish after a pinned
//! date selection snaps the display back to live data, visible as a
//! scope change on the snapshot.
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/verdure/sync.toml`:
//!
//! ```toml
//! [storage]
//! path = "~/.local/share/verdure/data.db"
//!
//! [acquisition]
//! poll_interval = 60
//! ```

pub mod availability;
pub mod cache;
pub mod collector;
pub mod config;
pub mod history;
pub mod source;
pub mod state;

pub use availability::AvailabilityIndex;
pub use cache::SnapshotCache;
pub use collector::Collector;
pub use config::{AcquisitionConfig, Config, ConfigError, StorageConfig, ValidationError};
pub use history::{HistoryError, HistorySelector};
pub use source::{SensorSource, SourceError, StoreSource};
pub use state::{AppState, CollectorState, PollStats, UNIT_COUNT};
