//! Platform-agnostic types for Verdure cultivation-unit sensor data.
//!
//! This crate provides the shared value types used by the storage and
//! synchronization crates:
//!
//! - [`Reading`] — the six environmental metrics of a cultivation unit,
//!   each either a numeric value or explicitly [`MetricValue::Unavailable`]
//! - [`CalendarDate`] — a plain year-month-day value in canonical
//!   `YYYY-MM-DD` form
//! - [`Snapshot`] and [`SnapshotScope`] — the currently displayed reading
//!   and whether it is live or pinned to a past date
//!
//! # Example
//!
//! ```
//! use verdure_types::{Metric, MetricValue, Reading};
//!
//! let reading = Reading {
//!     ambient_temp: MetricValue::Value(24.5),
//!     ..Reading::unavailable()
//! };
//!
//! assert_eq!(reading.get(Metric::AmbientTemperature), MetricValue::Value(24.5));
//! assert_eq!(reading.get(Metric::Ph), MetricValue::Unavailable);
//! ```

pub mod date;
pub mod error;
pub mod reading;
pub mod snapshot;

pub use date::CalendarDate;
pub use error::{ParseError, ParseResult};
pub use reading::{Metric, MetricValue, Reading};
pub use snapshot::{Snapshot, SnapshotScope};
