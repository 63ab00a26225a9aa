//! Sensor source abstraction.
//!
//! The acquisition loop pulls each sample through the [`SensorSource`]
//! trait so deployments can choose where fresh readings come from: the
//! default [`StoreSource`] re-queries the persistence layer for its
//! newest row (the sensor rig writes rows independently), while a
//! deployment with direct hardware access can plug its reader in behind
//! the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use verdure_store::Store;
use verdure_types::Reading;

/// Errors from a sensor source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backing store could not be queried.
    #[error("Failed to read store: {0}")]
    Storage(#[from] verdure_store::Error),

    /// The sensor hardware failed to produce a sample.
    #[error("Sensor failure: {0}")]
    Sensor(String),
}

/// Anything that can produce a fresh [`Reading`] on demand.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Produce one sample, or fail.
    async fn sample(&self) -> Result<Reading, SourceError>;
}

/// Source that reads the newest stored row.
pub struct StoreSource {
    store: Arc<Mutex<Store>>,
}

impl StoreSource {
    /// Create a source over the shared store handle.
    pub fn new(store: Arc<Mutex<Store>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SensorSource for StoreSource {
    async fn sample(&self) -> Result<Reading, SourceError> {
        let store = self.store.lock().await;
        Ok(store.latest_reading()?)
    }
}
