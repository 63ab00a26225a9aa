//! Local data persistence for Verdure sensor readings.
//!
//! This crate provides SQLite-based storage for cultivation-unit sensor
//! data: one `sensor_data` row per sample, with lookups for the most
//! recent reading, the most recent reading on a given calendar day, and
//! the set of days that have any data at all.
//!
//! # Example
//!
//! ```no_run
//! use verdure_store::Store;
//!
//! let store = Store::open_default()?;
//! let latest = store.latest_reading()?;
//! let days = store.dates_with_data()?;
//! # Ok::<(), verdure_store::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::StoredReading;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/verdure/data.db`
/// - macOS: `~/Library/Application Support/verdure/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\verdure\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("verdure")
        .join("data.db")
}
